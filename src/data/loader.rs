use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{ColumnKind, Row, SalesTable, Value, PRODUCT_COLUMNS};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a products table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line, empty or NA cell = null
/// * `.json`    – `[{ "ProductID": "FDA15", "Weight": 9.3, ... }, ...]`
/// * `.parquet` – flat schema, one column per field
///
/// The table is validated before it is returned.
pub fn load_file(path: &Path) -> Result<SalesTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let mut table = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    table.normalize_years();
    table
        .validate()
        .with_context(|| format!("validating {}", path.display()))?;
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Every column gets one kind, inferred over all of its cells.
fn load_csv(path: &Path) -> Result<SalesTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let raw: Vec<csv::StringRecord> = reader
        .records()
        .enumerate()
        .map(|(row_no, rec)| rec.with_context(|| format!("CSV row {row_no}")))
        .collect::<Result<_>>()?;

    let kinds: Vec<ColumnKind> = (0..columns.len())
        .map(|idx| ColumnKind::infer(raw.iter().map(|rec| rec.get(idx).unwrap_or("").trim())))
        .collect();

    let rows = raw
        .iter()
        .map(|rec| {
            kinds
                .iter()
                .enumerate()
                .map(|(idx, kind)| kind.parse(rec.get(idx).unwrap_or("").trim()))
                .collect()
        })
        .collect();

    Ok(SalesTable::new(columns, kinds, rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "ProductID": "FDA15", "Weight": 9.3, "OutletSize": null, ... },
///   ...
/// ]
/// ```
///
/// The known product columns come first, in their usual order; any other
/// keys follow alphabetically.
fn load_json(path: &Path) -> Result<SalesTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        objects.push(
            rec.as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?,
        );
    }

    let mut columns: Vec<String> = PRODUCT_COLUMNS
        .iter()
        .filter(|c| objects.iter().any(|o| o.contains_key(**c)))
        .map(|c| c.to_string())
        .collect();
    let mut extra: Vec<String> = objects
        .iter()
        .flat_map(|o| o.keys())
        .filter(|k| !PRODUCT_COLUMNS.contains(&k.as_str()))
        .cloned()
        .collect();
    extra.sort();
    extra.dedup();
    columns.extend(extra);

    let mut rows: Vec<Row> = objects
        .iter()
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map(json_to_value).unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    let kinds: Vec<ColumnKind> = (0..columns.len())
        .map(|idx| kind_of_cells(rows.iter().map(|r| &r[idx])))
        .collect();

    for row in &mut rows {
        for (cell, kind) in row.iter_mut().zip(&kinds) {
            if *kind != ColumnKind::Float {
                continue;
            }
            if let Value::Integer(i) = *cell {
                *cell = Value::Float(i as f64);
            }
        }
    }

    Ok(SalesTable::new(columns, kinds, rows))
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::Text(other.to_string()),
    }
}

/// Kind of an already typed column. Integers mixed with floats widen to
/// float; the caller converts the integer cells.
fn kind_of_cells<'a>(cells: impl Iterator<Item = &'a Value>) -> ColumnKind {
    let mut kind = None;
    for cell in cells {
        let this = match cell {
            Value::Null => continue,
            Value::Integer(_) => ColumnKind::Integer,
            Value::Float(_) => ColumnKind::Float,
            Value::Bool(_) => ColumnKind::Bool,
            Value::Text(_) => ColumnKind::Text,
        };
        kind = Some(match (kind, this) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(ColumnKind::Integer), ColumnKind::Float)
            | (Some(ColumnKind::Float), ColumnKind::Integer) => ColumnKind::Float,
            _ => ColumnKind::Text,
        });
    }
    kind.unwrap_or(ColumnKind::Float)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding the products table.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<SalesTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let schema = builder.schema().clone();
    let columns: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
    let kinds: Vec<ColumnKind> = schema
        .fields()
        .iter()
        .map(|f| arrow_kind(f.data_type()))
        .collect();

    let reader = builder.build().context("building parquet reader")?;
    let mut rows: Vec<Row> = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .zip(&columns)
                .map(|(col, name)| {
                    extract_value(col, row).with_context(|| format!("Row {row}, column '{name}'"))
                })
                .collect::<Result<Row>>()?;
            rows.push(cells);
        }
    }

    Ok(SalesTable::new(columns, kinds, rows))
}

// -- Parquet / Arrow helpers --

fn arrow_kind(data_type: &DataType) -> ColumnKind {
    match data_type {
        DataType::Int32 | DataType::Int64 => ColumnKind::Integer,
        DataType::Float32 | DataType::Float64 => ColumnKind::Float,
        DataType::Boolean => ColumnKind::Bool,
        _ => ColumnKind::Text,
    }
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &Arc<dyn Array>, row: usize) -> Result<Value> {
    if col.is_null(row) {
        return Ok(Value::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Value::Text(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => Value::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            Value::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            Value::Integer(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            Value::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            Value::Float(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col
                .as_any()
                .downcast_ref::<BooleanArray>()
                .context("expected BooleanArray")?;
            Value::Bool(arr.value(row))
        }
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(value)
}
