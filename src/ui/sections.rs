use eframe::egui::{Color32, RichText, Ui};

use crate::data::error::ShapeError;
use crate::data::model::{Value, ESTABLISHMENT_YEAR, LOCATION_TYPE, OUTLET_SALES, PRODUCT_TYPE};
use crate::data::pipeline::{self, REFERENCE_CATEGORY_COUNTS};
use crate::state::{AppState, Section};
use crate::ui::plot::{bar_chart, pie_chart, BarSpec, Orientation, Series};
use crate::ui::table::{pairs_table, text_table};

// ---------------------------------------------------------------------------
// Static text
// ---------------------------------------------------------------------------

const COLUMN_DESCRIPTIONS: [(&str, &str); 12] = [
    ("ProductID", "уникальный идентификатор товара"),
    ("Weight", "вес продуктов"),
    ("FatContent", "указывает, содержит ли продукт мало жира или нет"),
    (
        "Visibility",
        "процент от общей площади витрины всех товаров в магазине, отведенный для конкретного продукта",
    ),
    ("ProductType", "категория, к которой относится товар"),
    ("MRP", "максимальная розничная цена (указанная цена) на продукты"),
    ("OutletID", "уникальный идентификатор магазина"),
    ("EstablishmentYear", "год основания торговых точек"),
    ("OutletSize", "размер магазина с точки зрения занимаемой площади"),
    ("LocationType", "тип города, в котором расположен магазин"),
    (
        "OutletType",
        "указывает, является ли торговая точка просто продуктовым магазином или каким-то супермаркетом",
    ),
    ("OutletSales", "(целевая переменная) продажи товара в конкретном магазине"),
];

const CONCLUSIONS: [(&str, &str); 9] = [
    ("Просмотр данных", "Вы можете просматривать первые строки данных."),
    (
        "Информация о данных",
        "Дает общую информацию о данных, включая типы данных и наличие пропущенных значений.",
    ),
    (
        "Анализ нулевых значений",
        "Позволяет проанализировать и заполнить пропущенные значения.",
    ),
    (
        "Анализ продаж по годам основания",
        "Показывает количество продаж по годам основания магазинов.",
    ),
    (
        "Анализ самого прибыльного магазина по году основания",
        "Анализирует продажи по самым прибыльным категориям товаров для магазина, основанного в выбранном году.",
    ),
    (
        "Анализ по категориям продуктов",
        "Предоставляет анализ продаж и количества товаров по категориям продуктов.",
    ),
    (
        "Самые продаваемые категории товаров",
        "Показывает самые популярные категории товаров по количеству продаж.",
    ),
    (
        "Объем выручки по категориям товаров",
        "Анализирует общий объем выручки по различным категориям товаров.",
    ),
    (
        "Локация магазина с самыми большими продажами",
        "Отображает продажи магазинов в зависимости от их локации.",
    ),
];

pub const PROMPT: &str = "Выберите раздел для анализа в меню слева.";

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Render one section from the cached session views.
pub fn show(ui: &mut Ui, state: &AppState, section: Section) {
    ui.heading(section.label());
    ui.add_space(4.0);
    match section {
        Section::Preview => preview(ui, state, "preview"),
        Section::Info => info(ui, state),
        Section::NullAnalysis => null_analysis(ui, state),
        Section::YearSales => year_sales(ui, state),
        Section::FocusYear => focus_year(ui, state),
        Section::CategoryAnalysis => category_analysis(ui, state),
        Section::BestSelling => best_selling(ui, state),
        Section::Revenue => revenue(ui, state),
        Section::Location => location(ui, state),
        Section::Conclusions => bullet_list(ui, &CONCLUSIONS),
    }
}

fn subheading(ui: &mut Ui, text: &str) {
    ui.add_space(8.0);
    ui.label(RichText::new(text).size(16.0).strong());
}

fn shape_error(ui: &mut Ui, e: &ShapeError) {
    ui.label(RichText::new(format!("Ошибка: {e}")).color(Color32::RED));
}

fn bullet_list(ui: &mut Ui, items: &[(&str, &str)]) {
    for (name, text) in items {
        ui.horizontal_wrapped(|ui: &mut Ui| {
            ui.label("•");
            ui.label(RichText::new(*name).strong());
            ui.label(format!(": {text}"));
        });
    }
}

fn series_of<T>(
    grouped: &[(Value, T)],
    value: impl Fn(&T) -> f64,
    label: impl Fn(&T) -> String,
) -> Series {
    let mut series = Series::default();
    for (key, agg) in grouped {
        series.push(key.to_string(), value(agg), label(agg));
    }
    series
}

fn head<T>(grouped: &[T], n: usize) -> &[T] {
    &grouped[..n.min(grouped.len())]
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

fn preview(ui: &mut Ui, state: &AppState, id: &str) {
    let table = &state.session.table;
    let headers: Vec<&str> = table.columns.iter().map(String::as_str).collect();
    let rows = pipeline::preview(table, state.config.preview_rows);
    text_table(ui, id, &headers, &rows);
}

fn info(ui: &mut Ui, state: &AppState) {
    bullet_list(ui, &COLUMN_DESCRIPTIONS);

    let session = &state.session;
    subheading(ui, "Информация о данных");
    ui.label(format!("Источник: {}", session.source));
    ui.label(format!("RangeIndex: {} entries", session.table.len()));
    ui.label(format!(
        "Data columns (total {} columns)",
        session.views.columns.len()
    ));
    let rows: Vec<Vec<String>> = session
        .views
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            vec![
                i.to_string(),
                c.name.clone(),
                format!("{} non-null", c.non_null),
                c.dtype.to_string(),
            ]
        })
        .collect();
    text_table(ui, "info", &["#", "Column", "Non-Null Count", "Dtype"], &rows);
}

fn null_analysis(ui: &mut Ui, state: &AppState) {
    let views = &state.session.views;

    subheading(ui, "Нулевые значения в столбцах");
    pairs_table(ui, "raw_nulls", ["Столбец", "Пропуски"], &views.raw_nulls);

    match &views.imputation {
        Ok(report) => {
            if let Some(mean) = report.weight_fill {
                ui.label(format!(
                    "Weight: заполнено {} значений средним {mean:.4}",
                    report.weights_filled
                ));
            }
            ui.label(format!(
                "OutletSize: заполнено {} значений категорией «{}»",
                report.sizes_filled, state.config.outlet_size_fill
            ));
        }
        Err(e) => shape_error(ui, e),
    }

    subheading(ui, "Проверка проделанной работы");
    pairs_table(ui, "clean_nulls", ["Столбец", "Пропуски"], &views.clean_nulls);
    preview(ui, state, "imputed_preview");

    subheading(ui, "Проверка дубликатов");
    ui.label(format!("Количество дубликатов: {}", views.duplicates));
}

fn year_sales(ui: &mut Ui, state: &AppState) {
    let years = match &state.session.views.years {
        Ok(years) => years,
        Err(e) => return shape_error(ui, e),
    };

    pairs_table(ui, "year_counts", [ESTABLISHMENT_YEAR, "count"], &years.counts);
    pairs_table(ui, "year_sums", [ESTABLISHMENT_YEAR, OUTLET_SALES], &years.sums);

    let series = series_of(&years.sums, |s| *s as f64, |s| s.to_string());
    bar_chart(
        ui,
        &BarSpec {
            id: "year_sums_chart",
            title: "Продажи по годам основания",
            category_axis: "Год основания",
            value_axis: "Сумма продаж",
            color: Color32::DARK_GRAY,
            orientation: Orientation::Vertical,
        },
        &series,
    );
}

fn focus_year(ui: &mut Ui, state: &AppState) {
    let top = match &state.session.views.focus_year {
        Ok(top) => top,
        Err(e) => return shape_error(ui, e),
    };
    let config = &state.config;
    if top.is_empty() {
        ui.label(format!("Нет магазинов, основанных в {} году", top.year));
    }

    pairs_table(
        ui,
        "focus_table",
        [PRODUCT_TYPE, OUTLET_SALES],
        &top.truncated(config.table_top_n),
    );

    subheading(
        ui,
        &format!("Объем выручки по категориям товаров для {} года", top.year),
    );
    let series = series_of(
        head(&top.ranked, config.chart_top_n),
        |s| *s,
        |s| format!("{:.0}", s.round()),
    );
    bar_chart(
        ui,
        &BarSpec {
            id: "focus_bar",
            title: "Объем выручки",
            category_axis: "Категории товаров",
            value_axis: "Сумма продаж",
            color: Color32::GRAY,
            orientation: Orientation::Horizontal,
        },
        &series,
    );

    subheading(
        ui,
        &format!("Круговая диаграмма по категориям товаров для {} года", top.year),
    );
    pie_chart(ui, "Доля выручки", &series);
}

fn category_analysis(ui: &mut Ui, state: &AppState) {
    match &state.session.views.product_types {
        Ok(stats) => pairs_table(ui, "type_counts", [PRODUCT_TYPE, "count"], &stats.counts),
        Err(e) => shape_error(ui, e),
    }

    subheading(ui, "Создание новой таблицы для анализа категорий товаров");
    pairs_table(
        ui,
        "reference_counts",
        ["Категория товара", "Количество"],
        &REFERENCE_CATEGORY_COUNTS,
    );

    subheading(ui, "Количество продаж товара по категориям");
    let mut series = Series::default();
    for (category, count) in pipeline::reference_chart_order() {
        series.push(category.to_string(), count as f64, count.to_string());
    }
    bar_chart(
        ui,
        &BarSpec {
            id: "reference_chart",
            title: "Количество",
            category_axis: "Категория товара",
            value_axis: "Количество",
            color: Color32::from_rgb(128, 0, 128),
            orientation: Orientation::Vertical,
        },
        &series,
    );
}

fn best_selling(ui: &mut Ui, state: &AppState) {
    let stats = match &state.session.views.product_types {
        Ok(stats) => stats,
        Err(e) => return shape_error(ui, e),
    };
    let series = series_of(&stats.counts, |n| *n as f64, |n| n.to_string());
    bar_chart(
        ui,
        &BarSpec {
            id: "best_selling",
            title: "Самые продаваемые категории товаров",
            category_axis: "Категории товаров",
            value_axis: "Количество продаж",
            color: Color32::RED,
            orientation: Orientation::Horizontal,
        },
        &series,
    );
}

fn revenue(ui: &mut Ui, state: &AppState) {
    let stats = match &state.session.views.product_types {
        Ok(stats) => stats,
        Err(e) => return shape_error(ui, e),
    };
    let series = series_of(
        head(&stats.revenue, state.config.chart_top_n),
        |s| *s,
        |s| s.to_string(),
    );
    bar_chart(
        ui,
        &BarSpec {
            id: "revenue",
            title: "Объем выручки по категориям товаров",
            category_axis: "Категории товаров",
            value_axis: "Сумма продаж",
            color: Color32::DARK_GREEN,
            orientation: Orientation::Horizontal,
        },
        &series,
    );
}

fn location(ui: &mut Ui, state: &AppState) {
    let locations = match &state.session.views.locations {
        Ok(locations) => locations,
        Err(e) => return shape_error(ui, e),
    };

    let bars = series_of(&locations.by_key, |s| *s, |s| s.to_string());
    bar_chart(
        ui,
        &BarSpec {
            id: "location_bar",
            title: "Продажи магазина по локации",
            category_axis: "Локация",
            value_axis: "Сумма продаж",
            color: Color32::BLUE,
            orientation: Orientation::Vertical,
        },
        &bars,
    );

    let slices = series_of(&locations.ranked, |s| *s, |s| s.to_string());
    pie_chart(ui, &format!("{LOCATION_TYPE}: доля продаж"), &slices);
}
