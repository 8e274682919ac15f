/// Rendering: side/top panels, one renderer per section, charts, tables.
pub mod panels;
pub mod plot;
pub mod sections;
pub mod table;
