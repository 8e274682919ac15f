use std::collections::{HashMap, HashSet};

use super::error::ShapeError;
use super::model::{
    ColumnKind, Row, SalesTable, Value, ESTABLISHMENT_YEAR, LOCATION_TYPE, OUTLET_SALES,
    OUTLET_SIZE, PRODUCT_TYPE, WEIGHT,
};

// ---------------------------------------------------------------------------
// Aggregation pipeline
// ---------------------------------------------------------------------------

/// A grouped view: one aggregate per key, in display order.
pub type Grouped<T> = Vec<(Value, T)>;

/// Hand-maintained category counts shown next to the live counts.
pub const REFERENCE_CATEGORY_COUNTS: [(&str, u32); 16] = [
    ("Фрукты и овощи", 1232),
    ("Закуски", 1200),
    ("Товары для дома", 910),
    ("Замороженные продукты", 856),
    ("Молочные продукты", 682),
    ("Консервы", 649),
    ("Выпечка", 648),
    ("Здоровье и гигиена", 520),
    ("Безалкогольные напитки", 445),
    ("Мясо", 425),
    ("Хлеб", 251),
    ("Крепкие напитки", 214),
    ("Другое", 169),
    ("Бакалея", 148),
    ("Завтрак", 110),
    ("Морепродукты", 64),
];

// -- Null audit & imputation --

/// Null count of every column, in column order.
pub fn null_audit(table: &SalesTable) -> Vec<(String, usize)> {
    table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let nulls = table.rows.iter().filter(|row| row[idx].is_null()).count();
            (name.clone(), nulls)
        })
        .collect()
}

/// What [`impute_missing`] changed.
#[derive(Debug, Clone, PartialEq)]
pub struct ImputationReport {
    /// Mean of the non-null weights, `None` if there were none.
    pub weight_fill: Option<f64>,
    pub weights_filled: usize,
    pub sizes_filled: usize,
}

/// Fill null weights with the mean weight and null outlet sizes with
/// `size_fill`, in place.
///
/// The mean is taken over the weights present before any cell is filled.
/// Running it again finds no nulls and changes nothing.
pub fn impute_missing(
    table: &mut SalesTable,
    size_fill: &str,
) -> Result<ImputationReport, ShapeError> {
    let weight_idx = table.column_index(WEIGHT)?;
    let size_idx = table.column_index(OUTLET_SIZE)?;

    let mut total = 0.0;
    let mut present = 0usize;
    for (row_no, row) in table.rows.iter().enumerate() {
        let cell = &row[weight_idx];
        if cell.is_null() {
            continue;
        }
        total += cell.as_f64().ok_or_else(|| ShapeError::NotNumeric {
            column: WEIGHT.to_string(),
            row: row_no,
        })?;
        present += 1;
    }
    let weight_fill = (present > 0).then(|| total / present as f64);

    let mut weights_filled = 0;
    let mut sizes_filled = 0;
    for row in &mut table.rows {
        if let Some(mean) = weight_fill.filter(|_| row[weight_idx].is_null()) {
            row[weight_idx] = Value::Float(mean);
            weights_filled += 1;
        }
        if row[size_idx].is_null() {
            row[size_idx] = Value::Text(size_fill.to_string());
            sizes_filled += 1;
        }
    }

    // An all-integer weight column now holds a fractional mean.
    if weights_filled > 0 && table.kinds[weight_idx] == ColumnKind::Integer {
        table.kinds[weight_idx] = ColumnKind::Float;
    }

    log::debug!(
        "imputed {weights_filled} weights (fill {weight_fill:?}) and {sizes_filled} outlet sizes"
    );

    Ok(ImputationReport {
        weight_fill,
        weights_filled,
        sizes_filled,
    })
}

/// Rows equal in every column to some earlier row.
pub fn duplicate_count(table: &SalesTable) -> usize {
    let mut seen: HashSet<&Row> = HashSet::with_capacity(table.len());
    table.rows.iter().filter(|row| !seen.insert(*row)).count()
}

// -- Grouping helpers --

/// Fold every row into its key's accumulator. Groups come out in order of
/// first appearance; rows with a null key are skipped.
fn group_fold<'a, T, F>(
    table: &SalesTable,
    key_column: &str,
    rows: impl Iterator<Item = (usize, &'a Row)>,
    mut fold: F,
) -> Result<Grouped<T>, ShapeError>
where
    T: Default,
    F: FnMut(&mut T, usize, &Row) -> Result<(), ShapeError>,
{
    let key_idx = table.column_index(key_column)?;
    let mut slots: HashMap<&'a Value, usize> = HashMap::new();
    let mut groups: Grouped<T> = Vec::new();

    for (row_no, row) in rows {
        let key = &row[key_idx];
        if key.is_null() {
            continue;
        }
        let slot = *slots.entry(key).or_insert_with(|| {
            groups.push((key.clone(), T::default()));
            groups.len() - 1
        });
        fold(&mut groups[slot].1, row_no, row)?;
    }
    Ok(groups)
}

fn count_by(table: &SalesTable, key_column: &str) -> Result<Grouped<usize>, ShapeError> {
    group_fold(table, key_column, table.rows.iter().enumerate(), |n, _, _| {
        *n += 1;
        Ok(())
    })
}

fn sales_sum_by<'a>(
    table: &'a SalesTable,
    key_column: &str,
    rows: impl Iterator<Item = (usize, &'a Row)>,
) -> Result<Grouped<f64>, ShapeError> {
    let sales_idx = table.column_index(OUTLET_SALES)?;
    group_fold(table, key_column, rows, |sum, row_no, row| {
        *sum += row[sales_idx]
            .as_f64()
            .ok_or_else(|| ShapeError::NotNumeric {
                column: OUTLET_SALES.to_string(),
                row: row_no,
            })?;
        Ok(())
    })
}

/// Stable descending sort: ties keep first-appearance order.
fn rank_descending<T: PartialOrd>(groups: &mut Grouped<T>) {
    groups.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
}

fn sort_by_key(groups: &mut Grouped<f64>) {
    groups.sort_by(|a, b| a.0.cmp(&b.0));
}

fn truncate_sums(groups: &[(Value, f64)]) -> Grouped<i64> {
    groups
        .iter()
        .map(|(key, sum)| (key.clone(), sum.trunc() as i64))
        .collect()
}

// -- Views --

#[derive(Debug, Clone, PartialEq)]
pub struct YearSalesBreakdown {
    /// Records per establishment year, most frequent first.
    pub counts: Grouped<usize>,
    /// Truncated sales per establishment year, ascending by year.
    pub sums: Grouped<i64>,
}

pub fn year_sales_breakdown(table: &SalesTable) -> Result<YearSalesBreakdown, ShapeError> {
    let mut counts = count_by(table, ESTABLISHMENT_YEAR)?;
    rank_descending(&mut counts);

    let mut sums = sales_sum_by(table, ESTABLISHMENT_YEAR, table.rows.iter().enumerate())?;
    sort_by_key(&mut sums);

    Ok(YearSalesBreakdown {
        counts,
        sums: truncate_sums(&sums),
    })
}

/// Sales by product type for the outlets founded in one year.
#[derive(Debug, Clone, PartialEq)]
pub struct TopCategories {
    pub year: i64,
    /// Native sums, largest first.
    pub ranked: Grouped<f64>,
}

impl TopCategories {
    /// The `limit` largest sums, truncated to integers.
    pub fn truncated(&self, limit: usize) -> Grouped<i64> {
        truncate_sums(&self.ranked[..limit.min(self.ranked.len())])
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

pub fn top_categories_for_year(table: &SalesTable, year: i64) -> Result<TopCategories, ShapeError> {
    let year_idx = table.column_index(ESTABLISHMENT_YEAR)?;
    let rows = table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row[year_idx].as_i64() == Some(year));

    let mut ranked = sales_sum_by(table, PRODUCT_TYPE, rows)?;
    rank_descending(&mut ranked);
    Ok(TopCategories { year, ranked })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductTypeStats {
    /// Records per product type, most frequent first.
    pub counts: Grouped<usize>,
    /// Sales per product type, largest first.
    pub revenue: Grouped<f64>,
}

pub fn product_type_stats(table: &SalesTable) -> Result<ProductTypeStats, ShapeError> {
    let mut counts = count_by(table, PRODUCT_TYPE)?;
    rank_descending(&mut counts);

    let mut revenue = sales_sum_by(table, PRODUCT_TYPE, table.rows.iter().enumerate())?;
    rank_descending(&mut revenue);

    Ok(ProductTypeStats { counts, revenue })
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationSales {
    /// Ascending by location type, for the bar chart.
    pub by_key: Grouped<f64>,
    /// Largest first, for the pie chart.
    pub ranked: Grouped<f64>,
}

pub fn location_sales_breakdown(table: &SalesTable) -> Result<LocationSales, ShapeError> {
    let grouped = sales_sum_by(table, LOCATION_TYPE, table.rows.iter().enumerate())?;

    let mut by_key = grouped.clone();
    sort_by_key(&mut by_key);
    let mut ranked = grouped;
    rank_descending(&mut ranked);

    Ok(LocationSales { by_key, ranked })
}

/// The reference category counts, grouped by category name for charting.
pub fn reference_chart_order() -> Vec<(&'static str, u32)> {
    let mut rows = REFERENCE_CATEGORY_COUNTS.to_vec();
    rows.sort_by(|a, b| a.0.cmp(b.0));
    rows
}

// -- Table overview --

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub non_null: usize,
    pub dtype: &'static str,
}

pub fn column_info(table: &SalesTable) -> Vec<ColumnInfo> {
    null_audit(table)
        .into_iter()
        .zip(&table.kinds)
        .map(|((name, nulls), kind)| ColumnInfo {
            name,
            non_null: table.len() - nulls,
            dtype: kind.dtype_name(),
        })
        .collect()
}

/// The first `n` rows rendered as text.
pub fn preview(table: &SalesTable, n: usize) -> Vec<Vec<String>> {
    table
        .rows
        .iter()
        .take(n)
        .map(|row| row.iter().map(|v| v.to_string()).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::data::model::tests::{product_row, product_table};

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn sample_table() -> SalesTable {
        product_table(vec![
            product_row("FDA15", "Dairy", 1985, "Tier 3", 100.0),
            product_row("FDA16", "Dairy", 1985, "Tier 3", 50.0),
            product_row("FDX07", "Snacks", 1990, "Tier 1", 30.0),
        ])
    }

    #[test]
    fn end_to_end_focus_year_and_year_sums() {
        let table = sample_table();

        let top = top_categories_for_year(&table, 1985).unwrap();
        assert_eq!(top.truncated(16), vec![(text("Dairy"), 150)]);

        let years = year_sales_breakdown(&table).unwrap();
        assert_eq!(
            years.sums,
            vec![(Value::Integer(1985), 150), (Value::Integer(1990), 30)]
        );
        assert_eq!(
            years.counts,
            vec![(Value::Integer(1985), 2), (Value::Integer(1990), 1)]
        );
    }

    #[test]
    fn focus_year_without_rows_is_empty() {
        let table = product_table(vec![product_row("FDX07", "Snacks", 1990, "Tier 1", 30.0)]);
        let top = top_categories_for_year(&table, 1985).unwrap();
        assert!(top.is_empty());
        assert!(top.truncated(12).is_empty());
    }

    #[test]
    fn focus_year_is_ranked_truncated_and_limited() {
        let mut rows = Vec::new();
        for i in 0..20 {
            rows.push(product_row("FD", &format!("Type{i:02}"), 1985, "Tier 1", i as f64 + 0.9));
        }
        let table = product_table(rows);
        let top = top_categories_for_year(&table, 1985).unwrap();

        let chart = top.truncated(12);
        assert_eq!(chart.len(), 12);
        assert_eq!(chart[0], (text("Type19"), 19));
        assert_eq!(chart[11], (text("Type08"), 8));
        assert_eq!(top.truncated(16).len(), 16);
    }

    #[test]
    fn year_sums_add_up_to_grand_total() {
        let table = product_table(vec![
            product_row("A", "Dairy", 1999, "Tier 1", 10.25),
            product_row("B", "Meat", 1987, "Tier 2", 20.5),
            product_row("C", "Dairy", 1999, "Tier 3", 30.25),
            product_row("D", "Breads", 2004, "Tier 1", 40.0),
        ]);
        let years = year_sales_breakdown(&table).unwrap();
        assert_eq!(
            years.sums,
            vec![
                (Value::Integer(1987), 20),
                (Value::Integer(1999), 40),
                (Value::Integer(2004), 40),
            ]
        );

        let mut per_year: BTreeMap<i64, f64> = BTreeMap::new();
        for row in &table.rows {
            *per_year.entry(row[7].as_i64().unwrap()).or_default() += row[11].as_f64().unwrap();
        }
        let expected: i64 = per_year.values().map(|s| s.trunc() as i64).sum();
        let total: i64 = years.sums.iter().map(|(_, s)| s).sum();
        assert_eq!(total, expected);

        // Truncation drops less than one unit per year from the grand total.
        let grand_total: f64 = table
            .column(OUTLET_SALES)
            .unwrap()
            .filter_map(Value::as_f64)
            .sum();
        let lost = grand_total - total as f64;
        assert!((0.0..years.sums.len() as f64).contains(&lost), "lost {lost}");
    }

    #[test]
    fn ties_keep_first_appearance_order() {
        let table = product_table(vec![
            product_row("A", "Snacks", 1999, "Tier 2", 5.0),
            product_row("B", "Dairy", 1999, "Tier 1", 5.0),
            product_row("C", "Meat", 1999, "Tier 3", 7.0),
        ]);
        let stats = product_type_stats(&table).unwrap();
        assert_eq!(
            stats.revenue,
            vec![(text("Meat"), 7.0), (text("Snacks"), 5.0), (text("Dairy"), 5.0)]
        );
        assert_eq!(
            stats.counts,
            vec![(text("Snacks"), 1), (text("Dairy"), 1), (text("Meat"), 1)]
        );
    }

    #[test]
    fn product_type_counts_cover_every_row() {
        let table = product_table(vec![
            product_row("A", "Snacks", 1999, "Tier 2", 1.0),
            product_row("B", "Dairy", 1999, "Tier 1", 2.0),
            product_row("C", "Snacks", 1987, "Tier 3", 3.0),
            product_row("D", "Snacks", 1987, "Tier 3", 4.0),
        ]);
        let stats = product_type_stats(&table).unwrap();
        assert_eq!(stats.counts[0], (text("Snacks"), 3));
        let total: usize = stats.counts.iter().map(|(_, n)| n).sum();
        assert_eq!(total, table.len());
        assert_eq!(stats.revenue[0], (text("Snacks"), 8.0));
    }

    #[test]
    fn location_views_use_key_and_rank_order() {
        let table = product_table(vec![
            product_row("A", "Dairy", 1999, "Tier 2", 10.0),
            product_row("B", "Dairy", 1999, "Tier 3", 30.0),
            product_row("C", "Dairy", 1999, "Tier 1", 20.0),
        ]);
        let loc = location_sales_breakdown(&table).unwrap();
        let keys: Vec<_> = loc.by_key.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, ["Tier 1", "Tier 2", "Tier 3"]);
        let ranked: Vec<_> = loc.ranked.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(ranked, ["Tier 3", "Tier 1", "Tier 2"]);
    }

    fn table_with_nulls() -> SalesTable {
        let mut rows = vec![
            product_row("A", "Dairy", 1999, "Tier 1", 1.0),
            product_row("B", "Dairy", 1999, "Tier 1", 2.0),
            product_row("C", "Dairy", 1999, "Tier 1", 3.0),
        ];
        rows[0][1] = Value::Float(6.0);
        rows[1][1] = Value::Float(9.0);
        rows[2][1] = Value::Null;
        rows[2][8] = Value::Null;
        product_table(rows)
    }

    #[test]
    fn null_audit_counts_per_column() {
        let audit = null_audit(&table_with_nulls());
        assert_eq!(audit.len(), 12);
        assert_eq!(audit[1], (WEIGHT.to_string(), 1));
        assert_eq!(audit[8], (OUTLET_SIZE.to_string(), 1));
        assert_eq!(audit[0].1, 0);
    }

    #[test]
    fn imputation_fills_mean_weight_and_default_size() {
        let mut table = table_with_nulls();
        let report = impute_missing(&mut table, "Средний").unwrap();

        assert_eq!(report.weight_fill, Some(7.5));
        assert_eq!(report.weights_filled, 1);
        assert_eq!(report.sizes_filled, 1);
        assert_eq!(table.rows[2][1], Value::Float(7.5));
        assert_eq!(table.rows[2][8], text("Средний"));
        assert!(null_audit(&table).iter().all(|(_, n)| *n == 0));
    }

    #[test]
    fn nan_weights_count_as_missing() {
        let mut rows = vec![
            product_row("A", "Dairy", 1999, "Tier 1", 1.0),
            product_row("B", "Dairy", 1999, "Tier 1", 2.0),
            product_row("C", "Dairy", 1999, "Tier 1", 3.0),
            product_row("D", "Dairy", 1999, "Tier 1", 4.0),
        ];
        rows[0][1] = Value::Float(10.0);
        rows[1][1] = Value::Float(f64::NAN);
        rows[2][1] = Value::Float(20.0);
        rows[3][1] = Value::Null;
        let mut table = product_table(rows);

        assert_eq!(null_audit(&table)[1], (WEIGHT.to_string(), 2));
        let report = impute_missing(&mut table, "Средний").unwrap();
        assert_eq!(report.weight_fill, Some(15.0));
        assert_eq!(report.weights_filled, 2);
        assert_eq!(table.rows[1][1], Value::Float(15.0));
        assert_eq!(null_audit(&table)[1].1, 0);
    }

    #[test]
    fn imputation_is_idempotent() {
        let mut once = table_with_nulls();
        impute_missing(&mut once, "Средний").unwrap();
        let mut twice = once.clone();
        let report = impute_missing(&mut twice, "Средний").unwrap();

        assert_eq!(once, twice);
        assert_eq!(report.weights_filled, 0);
        assert_eq!(report.sizes_filled, 0);
    }

    #[test]
    fn imputation_without_weights_leaves_nulls() {
        let mut table = table_with_nulls();
        for row in &mut table.rows {
            row[1] = Value::Null;
        }
        let report = impute_missing(&mut table, "Средний").unwrap();
        assert_eq!(report.weight_fill, None);
        assert_eq!(null_audit(&table)[1].1, 3);
    }

    #[test]
    fn imputation_requires_weight_column() {
        let mut table = table_with_nulls();
        table.columns[1] = "ItemWeight".to_string();
        assert_eq!(
            impute_missing(&mut table, "Средний"),
            Err(ShapeError::MissingColumn(WEIGHT.to_string()))
        );
    }

    #[test]
    fn duplicates_count_repeats_only() {
        let mut table = sample_table();
        assert_eq!(duplicate_count(&table), 0);

        table.rows.push(table.rows[1].clone());
        assert_eq!(duplicate_count(&table), 1);
    }

    #[test]
    fn missing_group_column_is_a_shape_error() {
        let mut table = sample_table();
        table.columns[9] = "Tier".to_string();
        assert_eq!(
            location_sales_breakdown(&table),
            Err(ShapeError::MissingColumn(LOCATION_TYPE.to_string()))
        );
    }

    #[test]
    fn non_numeric_sales_is_a_shape_error() {
        let mut table = sample_table();
        table.rows[2][11] = text("n/a");
        assert!(matches!(
            product_type_stats(&table),
            Err(ShapeError::NotNumeric { row: 2, .. })
        ));
    }

    #[test]
    fn reference_chart_is_sorted_by_name() {
        let chart = reference_chart_order();
        assert_eq!(chart.len(), REFERENCE_CATEGORY_COUNTS.len());
        assert!(chart.windows(2).all(|w| w[0].0 <= w[1].0));
        assert_eq!(chart[0], ("Бакалея", 148));
    }

    #[test]
    fn column_info_reports_non_null_and_dtype() {
        let info = column_info(&table_with_nulls());
        assert_eq!(info[1].name, WEIGHT);
        assert_eq!(info[1].non_null, 2);
        assert_eq!(info[1].dtype, "float64");
        assert_eq!(info[7].dtype, "int64");
    }

    #[test]
    fn preview_takes_leading_rows() {
        let rows = preview(&sample_table(), 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], "FDA15");
        assert_eq!(rows[1][7], "1985");
    }
}
