use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// One row of the generated products table. Field names are the column names.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ProductRow {
    #[serde(rename = "ProductID")]
    product_id: String,
    weight: Option<f64>,
    fat_content: &'static str,
    visibility: f64,
    product_type: &'static str,
    #[serde(rename = "MRP")]
    mrp: f64,
    #[serde(rename = "OutletID")]
    outlet_id: &'static str,
    establishment_year: i64,
    outlet_size: Option<&'static str>,
    location_type: &'static str,
    outlet_type: &'static str,
    outlet_sales: f64,
}

/// (id, establishment year, size, location, type)
const OUTLETS: [(&str, i64, Option<&str>, &str, &str); 10] = [
    ("OUT010", 1998, None, "Tier 3", "Grocery Store"),
    ("OUT013", 1987, Some("High"), "Tier 3", "Supermarket Type1"),
    ("OUT017", 2007, None, "Tier 2", "Supermarket Type1"),
    ("OUT018", 2009, Some("Medium"), "Tier 3", "Supermarket Type2"),
    ("OUT019", 1985, Some("Small"), "Tier 1", "Grocery Store"),
    ("OUT027", 1985, Some("Medium"), "Tier 3", "Supermarket Type3"),
    ("OUT035", 2004, Some("Small"), "Tier 2", "Supermarket Type1"),
    ("OUT045", 2002, None, "Tier 2", "Supermarket Type1"),
    ("OUT046", 1997, Some("Small"), "Tier 1", "Supermarket Type1"),
    ("OUT049", 1999, Some("Medium"), "Tier 1", "Supermarket Type1"),
];

const PRODUCT_TYPES: [&str; 16] = [
    "Fruits and Vegetables",
    "Snack Foods",
    "Household",
    "Frozen Foods",
    "Dairy",
    "Canned",
    "Baking Goods",
    "Health and Hygiene",
    "Soft Drinks",
    "Meat",
    "Breads",
    "Hard Drinks",
    "Others",
    "Starchy Foods",
    "Breakfast",
    "Seafood",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn round_to(v: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (v * scale).round() / scale
}

fn generate_rows(n: usize, rng: &mut SimpleRng) -> Vec<ProductRow> {
    let mut rows = Vec::with_capacity(n + 1);
    for i in 0..n {
        let &(outlet_id, year, size, location, outlet_type) = rng.pick(&OUTLETS);
        let product_type = *rng.pick(&PRODUCT_TYPES);
        let mrp = round_to(rng.range(31.0, 267.0), 4);
        // Grocery stores sell far less than supermarkets.
        let scale = if outlet_type == "Grocery Store" { 0.25 } else { 1.0 };
        let weight = (rng.next_f64() > 0.17).then(|| round_to(rng.range(4.5, 21.5), 3));

        rows.push(ProductRow {
            product_id: format!("{}{:03}", &product_type[..2].to_ascii_uppercase(), i % 1000),
            weight,
            fat_content: *rng.pick(&["Low Fat", "Regular"]),
            visibility: round_to(rng.range(0.0, 0.33), 6),
            product_type,
            mrp,
            outlet_id,
            establishment_year: year,
            outlet_size: size,
            location_type: location,
            outlet_type,
            outlet_sales: round_to(mrp * rng.range(1.0, 25.0) * scale, 4),
        });
    }
    // One exact duplicate for the duplicate check.
    if let Some(first) = rows.first().cloned() {
        rows.push(first);
    }
    rows
}

fn write_csv(path: &str, rows: &[ProductRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &str, rows: &[ProductRow]) -> Result<()> {
    let text = |f: fn(&ProductRow) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let real = |f: fn(&ProductRow) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("ProductID", DataType::Utf8, false),
        Field::new("Weight", DataType::Float64, true),
        Field::new("FatContent", DataType::Utf8, false),
        Field::new("Visibility", DataType::Float64, false),
        Field::new("ProductType", DataType::Utf8, false),
        Field::new("MRP", DataType::Float64, false),
        Field::new("OutletID", DataType::Utf8, false),
        Field::new("EstablishmentYear", DataType::Int64, false),
        Field::new("OutletSize", DataType::Utf8, true),
        Field::new("LocationType", DataType::Utf8, false),
        Field::new("OutletType", DataType::Utf8, false),
        Field::new("OutletSales", DataType::Float64, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        text(|r| r.product_id.as_str()),
        Arc::new(Float64Array::from(
            rows.iter().map(|r| r.weight).collect::<Vec<_>>(),
        )),
        text(|r| r.fat_content),
        real(|r| r.visibility),
        text(|r| r.product_type),
        real(|r| r.mrp),
        text(|r| r.outlet_id),
        Arc::new(Int64Array::from(
            rows.iter().map(|r| r.establishment_year).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            rows.iter().map(|r| r.outlet_size).collect::<Vec<_>>(),
        )),
        text(|r| r.location_type),
        text(|r| r.outlet_type),
        real(|r| r.outlet_sales),
    ];

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(8522, &mut rng);

    write_csv("Products.csv", &rows)?;
    write_parquet("Products.parquet", &rows)?;

    println!(
        "Wrote {} records ({} outlets) to Products.csv and Products.parquet",
        rows.len(),
        OUTLETS.len()
    );
    Ok(())
}
