use std::path::Path;

use anyhow::Result;

use crate::config::DashboardConfig;
use crate::data::error::ShapeError;
use crate::data::loader::load_file;
use crate::data::model::SalesTable;
use crate::data::pipeline::{
    self, ColumnInfo, ImputationReport, LocationSales, ProductTypeStats, TopCategories,
    YearSalesBreakdown,
};

// ---------------------------------------------------------------------------
// Sections offered by the selector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Preview,
    Info,
    NullAnalysis,
    YearSales,
    FocusYear,
    CategoryAnalysis,
    BestSelling,
    Revenue,
    Location,
    Conclusions,
}

impl Section {
    /// Fixed render order, also used by "show all".
    pub const ALL: [Section; 10] = [
        Section::Preview,
        Section::Info,
        Section::NullAnalysis,
        Section::YearSales,
        Section::FocusYear,
        Section::CategoryAnalysis,
        Section::BestSelling,
        Section::Revenue,
        Section::Location,
        Section::Conclusions,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::Preview => "Просмотр данных",
            Section::Info => "Информация о данных",
            Section::NullAnalysis => "Анализ нулевых значений",
            Section::YearSales => "Анализ продаж по годам основания",
            Section::FocusYear => "Анализ самого прибыльного магазина по году основания",
            Section::CategoryAnalysis => "Анализ по категориям продуктов",
            Section::BestSelling => "Самые продаваемые категории товаров",
            Section::Revenue => "Объем выручки по категориям товаров",
            Section::Location => "Локация магазина с самыми большими продажами",
            Section::Conclusions => "Выводы",
        }
    }
}

// ---------------------------------------------------------------------------
// Derived views, computed once per loaded table
// ---------------------------------------------------------------------------

/// Every view of one session. A view whose columns are missing keeps its
/// error; the others still render.
pub struct SessionViews {
    pub raw_nulls: Vec<(String, usize)>,
    pub imputation: Result<ImputationReport, ShapeError>,
    pub clean_nulls: Vec<(String, usize)>,
    pub duplicates: usize,
    pub columns: Vec<ColumnInfo>,
    pub years: Result<YearSalesBreakdown, ShapeError>,
    pub focus_year: Result<TopCategories, ShapeError>,
    pub product_types: Result<ProductTypeStats, ShapeError>,
    pub locations: Result<LocationSales, ShapeError>,
}

/// A loaded table together with its views.
pub struct Session {
    pub source: String,
    /// Imputed table; immutable once the session is built.
    pub table: SalesTable,
    pub views: SessionViews,
}

impl Session {
    /// Audit, impute once, then compute every view.
    pub fn new(source: String, mut table: SalesTable, config: &DashboardConfig) -> Self {
        let raw_nulls = pipeline::null_audit(&table);
        let imputation = pipeline::impute_missing(&mut table, &config.outlet_size_fill);
        match &imputation {
            Ok(report) => log::info!(
                "Imputed {} weights (mean {:?}) and {} outlet sizes",
                report.weights_filled,
                report.weight_fill,
                report.sizes_filled
            ),
            Err(e) => log::error!("Imputation skipped: {e}"),
        }

        let views = SessionViews {
            raw_nulls,
            imputation,
            clean_nulls: pipeline::null_audit(&table),
            duplicates: pipeline::duplicate_count(&table),
            columns: pipeline::column_info(&table),
            years: logged("year breakdown", pipeline::year_sales_breakdown(&table)),
            focus_year: logged(
                "focus year",
                pipeline::top_categories_for_year(&table, config.focus_year),
            ),
            product_types: logged("product types", pipeline::product_type_stats(&table)),
            locations: logged("locations", pipeline::location_sales_breakdown(&table)),
        };

        Session {
            source,
            table,
            views,
        }
    }

    pub fn from_file(path: &Path, config: &DashboardConfig) -> Result<Self> {
        let table = load_file(path)?;
        log::info!(
            "Loaded {} records with columns {:?} from {}",
            table.len(),
            table.columns,
            path.display()
        );
        Ok(Session::new(path.display().to_string(), table, config))
    }
}

fn logged<T>(view: &str, result: Result<T, ShapeError>) -> Result<T, ShapeError> {
    if let Err(e) = &result {
        log::error!("Cannot compute {view}: {e}");
    }
    result
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    pub session: Session,

    /// Section picked in the selector; `None` shows the prompt.
    pub section: Option<Section>,

    /// Render every section top to bottom instead of the selected one.
    pub show_all: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig, session: Session) -> Self {
        Self {
            config,
            session,
            section: None,
            show_all: false,
            status_message: None,
        }
    }

    /// Replace the session with a newly loaded file. On failure the current
    /// session stays and the error is shown.
    pub fn open(&mut self, path: &Path) {
        match Session::from_file(path, &self.config) {
            Ok(session) => {
                self.session = session;
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Sections to draw this frame.
    pub fn visible_sections(&self) -> Vec<Section> {
        if self.show_all {
            Section::ALL.to_vec()
        } else {
            self.section.into_iter().collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{product_row, product_table};
    use crate::data::model::Value;

    fn session() -> Session {
        let mut rows = vec![
            product_row("FDA15", "Dairy", 1985, "Tier 3", 100.0),
            product_row("FDA16", "Dairy", 1985, "Tier 3", 50.0),
            product_row("FDX07", "Snacks", 1990, "Tier 1", 30.0),
        ];
        rows[2][1] = Value::Null;
        rows[2][8] = Value::Null;
        Session::new("test".into(), product_table(rows), &DashboardConfig::default())
    }

    #[test]
    fn session_audits_before_imputing() {
        let session = session();
        assert_eq!(session.views.raw_nulls[1].1, 1);
        assert_eq!(session.views.raw_nulls[8].1, 1);
        assert!(session.views.clean_nulls.iter().all(|(_, n)| *n == 0));
        assert_eq!(session.table.rows[2][8], Value::Text("Средний".into()));
    }

    #[test]
    fn session_computes_focus_year_from_config() {
        let session = session();
        let top = session.views.focus_year.as_ref().unwrap();
        assert_eq!(top.year, 1985);
        assert_eq!(top.truncated(16), vec![(Value::Text("Dairy".into()), 150)]);
    }

    #[test]
    fn missing_column_only_breaks_its_views() {
        let mut table = product_table(vec![product_row("A", "Dairy", 1985, "Tier 1", 1.0)]);
        table.columns[9] = "Tier".to_string();
        let session = Session::new("test".into(), table, &DashboardConfig::default());
        assert!(session.views.locations.is_err());
        assert!(session.views.years.is_ok());
    }

    #[test]
    fn show_all_lists_every_section_in_order() {
        let mut state = AppState::new(DashboardConfig::default(), session());
        assert!(state.visible_sections().is_empty());

        state.section = Some(Section::Revenue);
        assert_eq!(state.visible_sections(), vec![Section::Revenue]);

        state.show_all = true;
        assert_eq!(state.visible_sections(), Section::ALL.to_vec());
    }

    #[test]
    fn failed_open_keeps_current_session() {
        let mut state = AppState::new(DashboardConfig::default(), session());
        state.open(Path::new("does-not-exist.csv"));
        assert!(state.status_message.is_some());
        assert_eq!(state.session.source, "test");
    }
}
