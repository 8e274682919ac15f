/// Data layer: table model, loading, and the aggregation pipeline.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SalesTable, validate schema
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ SalesTable  │  ordered columns, Vec<Row> of Value cells
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ pipeline  │  null audit → imputation → grouped views
///   └──────────┘
/// ```

pub mod error;
pub mod loader;
pub mod model;
pub mod pipeline;
