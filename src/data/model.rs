use std::fmt;

use super::error::ShapeError;

// ---------------------------------------------------------------------------
// Schema of the products table
// ---------------------------------------------------------------------------

pub const PRODUCT_ID: &str = "ProductID";
pub const WEIGHT: &str = "Weight";
pub const FAT_CONTENT: &str = "FatContent";
pub const VISIBILITY: &str = "Visibility";
pub const PRODUCT_TYPE: &str = "ProductType";
pub const MRP: &str = "MRP";
pub const OUTLET_ID: &str = "OutletID";
pub const ESTABLISHMENT_YEAR: &str = "EstablishmentYear";
pub const OUTLET_SIZE: &str = "OutletSize";
pub const LOCATION_TYPE: &str = "LocationType";
pub const OUTLET_TYPE: &str = "OutletType";
pub const OUTLET_SALES: &str = "OutletSales";

/// The 12 columns every products table must carry, in file order.
pub const PRODUCT_COLUMNS: [&str; 12] = [
    PRODUCT_ID,
    WEIGHT,
    FAT_CONTENT,
    VISIBILITY,
    PRODUCT_TYPE,
    MRP,
    OUTLET_ID,
    ESTABLISHMENT_YEAR,
    OUTLET_SIZE,
    LOCATION_TYPE,
    OUTLET_TYPE,
    OUTLET_SALES,
];

/// Columns that may never hold a null.
pub const NON_NULL_COLUMNS: [&str; 3] = [PRODUCT_ID, OUTLET_ID, OUTLET_SALES];

/// Raw cells read as missing, the same set `pandas.read_csv` treats as NA.
const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Whether a raw text cell stands for a missing value.
fn is_na(cell: &str) -> bool {
    NA_TOKENS.contains(&cell)
}

// ---------------------------------------------------------------------------
// Value – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring common dataframe dtypes.
/// Used as a group key and compared for duplicates, so `Value` must be
/// `Ord` and `Hash`.
#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can use Value as a map key --
// Floats compare by total order, so NaN cells match each other.

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Text(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.4}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Null, or a float NaN from a typed source.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(v) => v.is_nan(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnKind – the inferred dtype of a whole column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Bool,
    Text,
}

impl ColumnKind {
    /// Pick the narrowest kind that every non-missing cell parses as.
    pub fn infer<'a>(cells: impl IntoIterator<Item = &'a str>) -> Self {
        let mut all_int = true;
        let mut all_float = true;
        let mut all_bool = true;
        for cell in cells.into_iter().filter(|c| !is_na(c)) {
            all_int &= cell.parse::<i64>().is_ok();
            all_float &= cell.parse::<f64>().is_ok();
            all_bool &= cell == "true" || cell == "false";
            if !all_int && !all_float && !all_bool {
                return ColumnKind::Text;
            }
        }
        if all_int {
            ColumnKind::Integer
        } else if all_float {
            ColumnKind::Float
        } else if all_bool {
            ColumnKind::Bool
        } else {
            ColumnKind::Text
        }
    }

    /// Convert one raw cell according to this kind; NA tokens mean null.
    pub fn parse(self, cell: &str) -> Value {
        if is_na(cell) {
            return Value::Null;
        }
        match self {
            ColumnKind::Integer => cell
                .parse()
                .map(Value::Integer)
                .unwrap_or_else(|_| Value::Text(cell.to_string())),
            ColumnKind::Float => cell
                .parse()
                .map(Value::Float)
                .unwrap_or_else(|_| Value::Text(cell.to_string())),
            ColumnKind::Bool => Value::Bool(cell == "true"),
            ColumnKind::Text => Value::Text(cell.to_string()),
        }
    }

    pub fn dtype_name(self) -> &'static str {
        match self {
            ColumnKind::Integer => "int64",
            ColumnKind::Float => "float64",
            ColumnKind::Bool => "bool",
            ColumnKind::Text => "object",
        }
    }
}

// ---------------------------------------------------------------------------
// SalesTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// One row of the source table, cells aligned with `SalesTable::columns`.
pub type Row = Vec<Value>;

/// The products table: ordered columns and their rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesTable {
    pub columns: Vec<String>,
    pub kinds: Vec<ColumnKind>,
    pub rows: Vec<Row>,
}

impl SalesTable {
    pub fn new(columns: Vec<String>, kinds: Vec<ColumnKind>, rows: Vec<Row>) -> Self {
        SalesTable {
            columns,
            kinds,
            rows,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Position of `name` among the columns.
    pub fn column_index(&self, name: &str) -> Result<usize, ShapeError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ShapeError::MissingColumn(name.to_string()))
    }

    /// Iterate over the cells of one column.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &Value> + '_, ShapeError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Store a year column read as whole-number floats (`1985.0`) as integers.
    /// Anything else in the column leaves it untouched for `validate` to judge.
    pub fn normalize_years(&mut self) {
        let Ok(idx) = self.column_index(ESTABLISHMENT_YEAR) else {
            return;
        };
        let whole = |cell: &Value| match cell {
            Value::Float(v) => v.is_nan() || v.fract() == 0.0,
            Value::Integer(_) | Value::Null => true,
            _ => false,
        };
        if self.kinds[idx] == ColumnKind::Integer || !self.rows.iter().all(|row| whole(&row[idx])) {
            return;
        }
        for row in &mut self.rows {
            if let Value::Float(v) = row[idx] {
                row[idx] = if v.is_nan() {
                    Value::Null
                } else {
                    Value::Integer(v as i64)
                };
            }
        }
        self.kinds[idx] = ColumnKind::Integer;
    }

    /// Check the schema and the non-null / non-negative / year invariants.
    pub fn validate(&self) -> Result<(), ShapeError> {
        for col in PRODUCT_COLUMNS {
            self.column_index(col)?;
        }
        for col in NON_NULL_COLUMNS {
            if let Some(row) = self.column(col)?.position(Value::is_null) {
                return Err(ShapeError::UnexpectedNull {
                    column: col.to_string(),
                    row,
                });
            }
        }
        for (row, cell) in self.column(OUTLET_SALES)?.enumerate() {
            match cell.as_f64() {
                Some(v) if v < 0.0 => return Err(ShapeError::NegativeSales { row, value: v }),
                Some(_) => {}
                None => {
                    return Err(ShapeError::NotNumeric {
                        column: OUTLET_SALES.to_string(),
                        row,
                    })
                }
            }
        }
        for (row, cell) in self.column(ESTABLISHMENT_YEAR)?.enumerate() {
            match cell {
                Value::Integer(year) if (1000..=9999).contains(year) => {}
                cell if cell.is_null() => {}
                other => {
                    return Err(ShapeError::InvalidYear {
                        row,
                        value: other.to_string(),
                    })
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a full 12-column row with the given grouping fields.
    pub(crate) fn product_row(
        product_id: &str,
        product_type: &str,
        year: i64,
        location: &str,
        sales: f64,
    ) -> Row {
        vec![
            Value::Text(product_id.to_string()),
            Value::Float(9.3),
            Value::Text("Low Fat".to_string()),
            Value::Float(0.016),
            Value::Text(product_type.to_string()),
            Value::Float(249.8),
            Value::Text(format!("OUT{year}")),
            Value::Integer(year),
            Value::Text("Medium".to_string()),
            Value::Text(location.to_string()),
            Value::Text("Supermarket Type1".to_string()),
            Value::Float(sales),
        ]
    }

    pub(crate) fn product_table(rows: Vec<Row>) -> SalesTable {
        let kinds = vec![
            ColumnKind::Text,
            ColumnKind::Float,
            ColumnKind::Text,
            ColumnKind::Float,
            ColumnKind::Text,
            ColumnKind::Float,
            ColumnKind::Text,
            ColumnKind::Integer,
            ColumnKind::Text,
            ColumnKind::Text,
            ColumnKind::Text,
            ColumnKind::Float,
        ];
        SalesTable::new(
            PRODUCT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            kinds,
            rows,
        )
    }

    #[test]
    fn infer_picks_narrowest_kind() {
        assert_eq!(ColumnKind::infer(["1985", "", "1999"]), ColumnKind::Integer);
        assert_eq!(ColumnKind::infer(["9.3", "12"]), ColumnKind::Float);
        assert_eq!(ColumnKind::infer(["true", "false"]), ColumnKind::Bool);
        assert_eq!(ColumnKind::infer(["Dairy", "3"]), ColumnKind::Text);
    }

    #[test]
    fn parse_treats_empty_as_null() {
        assert_eq!(ColumnKind::Float.parse(""), Value::Null);
        assert_eq!(ColumnKind::Float.parse("12"), Value::Float(12.0));
        assert_eq!(ColumnKind::Integer.parse("1985"), Value::Integer(1985));
    }

    #[test]
    fn parse_treats_na_tokens_as_null() {
        for token in ["NaN", "nan", "NA", "N/A", "null", "None", "<NA>"] {
            assert_eq!(ColumnKind::Float.parse(token), Value::Null, "{token}");
        }
        assert_eq!(ColumnKind::infer(["10.0", "NaN", "NA", "20"]), ColumnKind::Float);
        assert_eq!(ColumnKind::infer(["1985", "NA"]), ColumnKind::Integer);
        assert!(Value::Float(f64::NAN).is_null());
        assert!(!Value::Float(0.0).is_null());
    }

    #[test]
    fn values_order_and_compare_within_kind() {
        assert!(Value::Integer(1985) < Value::Integer(1987));
        assert!(Value::Null < Value::Text("a".into()));
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Integer(1), Value::Float(1.0));
    }

    #[test]
    fn validate_accepts_well_formed_table() {
        let table = product_table(vec![product_row("FDA15", "Dairy", 1999, "Tier 1", 3735.1)]);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn validate_reports_missing_column() {
        let mut table = product_table(vec![]);
        table.columns[11] = "Sales".to_string();
        assert_eq!(
            table.validate(),
            Err(ShapeError::MissingColumn(OUTLET_SALES.to_string()))
        );
    }

    #[test]
    fn validate_rejects_null_identifier_and_negative_sales() {
        let mut row = product_row("FDA15", "Dairy", 1999, "Tier 1", 10.0);
        row[0] = Value::Null;
        let table = product_table(vec![row]);
        assert!(matches!(
            table.validate(),
            Err(ShapeError::UnexpectedNull { row: 0, .. })
        ));

        let table = product_table(vec![product_row("FDA15", "Dairy", 1999, "Tier 1", -1.0)]);
        assert!(matches!(
            table.validate(),
            Err(ShapeError::NegativeSales { row: 0, .. })
        ));
    }

    #[test]
    fn whole_float_years_become_integers() {
        let mut rows = vec![
            product_row("A", "Dairy", 1985, "Tier 1", 1.0),
            product_row("B", "Dairy", 1990, "Tier 1", 2.0),
            product_row("C", "Dairy", 1985, "Tier 1", 3.0),
        ];
        rows[0][7] = Value::Float(1985.0);
        rows[1][7] = Value::Float(1990.0);
        rows[2][7] = Value::Float(f64::NAN);
        let mut table = product_table(rows);
        table.kinds[7] = ColumnKind::Float;

        table.normalize_years();
        assert_eq!(table.kinds[7], ColumnKind::Integer);
        assert_eq!(table.rows[0][7], Value::Integer(1985));
        assert_eq!(table.rows[1][7], Value::Integer(1990));
        assert_eq!(table.rows[2][7], Value::Null);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn validate_rejects_fractional_and_short_years() {
        let mut row = product_row("A", "Dairy", 1985, "Tier 1", 1.0);
        row[7] = Value::Float(1985.5);
        let mut table = product_table(vec![row]);
        table.kinds[7] = ColumnKind::Float;
        table.normalize_years();
        assert_eq!(
            table.validate(),
            Err(ShapeError::InvalidYear {
                row: 0,
                value: "1985.5000".to_string()
            })
        );

        let table = product_table(vec![
            product_row("A", "Dairy", 1985, "Tier 1", 1.0),
            product_row("B", "Dairy", 85, "Tier 1", 1.0),
        ]);
        assert!(matches!(
            table.validate(),
            Err(ShapeError::InvalidYear { row: 1, .. })
        ));
    }
}
