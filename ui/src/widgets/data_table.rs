//! Generic server-driven data table.
//!
//! Stateless over the controller: everything rendered here is derived from
//! [`TableController`] state, and every interaction is collected into a set
//! of intents applied after rendering, since the render closures hold shared
//! borrows of the controller.
//!
//! Render order: toolbar, header row (sort targets + per-column filters),
//! body (skeleton / error / empty / data rows, mutually exclusive in that
//! priority), pagination control.

use chrono::Utc;
use egui::{Color32, RichText, TextEdit, Ui};
use egui_extras::{Column, TableBuilder, TableRow};
use serde::de::DeserializeOwned;
use ustr::Ustr;
use walletboard_business::{FilterDef, FilterKeys, FilterKind, SortDirection, TableController};

use super::pagination::pagination_controls;

pub const ROW_HEIGHT: f32 = 28.0;
pub const HEADER_HEIGHT: f32 = 52.0;
const SKELETON_ROWS: usize = 5;
const RANGE_INPUT_WIDTH: f32 = 52.0;

pub const PAGE_SIZE_CHOICES: [usize; 4] = [10, 25, 50, 100];

/// Error color matching the login form.
const COLOR_ERROR: Color32 = Color32::from_rgb(220, 53, 69);

#[derive(Debug, Clone, Copy)]
pub enum ColumnWidth {
    Exact(f32),
    Remainder { min: f32 },
}

/// Static description of one rendered column. `id` ties the column to its
/// filter definition on the controller, if any.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub id: &'static str,
    pub title: &'static str,
    pub width: ColumnWidth,
    pub sortable: bool,
}

impl ColumnSpec {
    pub fn new(id: &'static str, title: &'static str, width: ColumnWidth) -> Self {
        Self {
            id,
            title,
            width,
            sortable: false,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }
}

/// User interactions collected during one frame, applied after rendering.
#[derive(Default)]
struct TableIntents {
    page_size: Option<usize>,
    search: Option<String>,
    clear_search: bool,
    refresh: bool,
    reset_filters: bool,
    sort: Option<usize>,
    go_to: Option<u64>,
    filters: Vec<(Ustr, String)>,
}

/// Renders the table and applies any interaction to the controller.
pub fn data_table<T, F>(
    ui: &mut Ui,
    table_id: &str,
    controller: &mut TableController<T>,
    columns: &[ColumnSpec],
    empty_message: &str,
    render_cell: F,
) where
    T: DeserializeOwned + Send + 'static,
    F: Fn(&mut Ui, &T, usize),
{
    let mut intents = TableIntents::default();

    toolbar(ui, table_id, controller, &mut intents);
    ui.add_space(4.0);
    render_grid(
        ui,
        table_id,
        controller,
        columns,
        empty_message,
        &render_cell,
        &mut intents,
    );
    ui.add_space(4.0);
    if let Some(target) = pagination_controls(ui, &controller.summary()) {
        intents.go_to = Some(target);
    }

    apply_intents(controller, intents);
}

fn toolbar<T>(
    ui: &mut Ui,
    table_id: &str,
    controller: &TableController<T>,
    intents: &mut TableIntents,
) where
    T: DeserializeOwned + Send + 'static,
{
    ui.horizontal(|ui| {
        ui.label("Show");
        let mut page_size = controller.page_size();
        egui::ComboBox::from_id_salt((table_id, "page_size"))
            .selected_text(page_size.to_string())
            .width(64.0)
            .show_ui(ui, |ui| {
                for choice in PAGE_SIZE_CHOICES {
                    if ui
                        .selectable_value(&mut page_size, choice, choice.to_string())
                        .clicked()
                    {
                        intents.page_size = Some(choice);
                    }
                }
            });
        ui.label("entries");

        ui.separator();

        let mut search_text = controller.search().pending().to_owned();
        let response = ui.add(
            TextEdit::singleline(&mut search_text)
                .hint_text("Search…")
                .desired_width(180.0),
        );
        if response.changed() {
            intents.search = Some(search_text.clone());
        }
        if !search_text.is_empty() && ui.button("✖").on_hover_text("Clear search").clicked() {
            intents.clear_search = true;
        }

        if controller.filters().is_active() {
            if ui
                .button("Reset filters")
                .on_hover_text("Clear all filters, search, and paging")
                .clicked()
            {
                intents.reset_filters = true;
            }
        }

        if ui.button("⟳").on_hover_text("Refresh").clicked() {
            intents.refresh = true;
        }

        if controller.is_loading() {
            ui.spinner();
        }
    });
}

fn render_grid<T, F>(
    ui: &mut Ui,
    table_id: &str,
    controller: &TableController<T>,
    columns: &[ColumnSpec],
    empty_message: &str,
    render_cell: &F,
    intents: &mut TableIntents,
) where
    T: DeserializeOwned + Send + 'static,
    F: Fn(&mut Ui, &T, usize),
{
    let loading = controller.is_loading();
    let error = controller.error().map(str::to_owned);
    let rows = controller.rows();

    // The message row (error/empty) goes into the widest column.
    let message_column = columns
        .iter()
        .position(|spec| matches!(spec.width, ColumnWidth::Remainder { .. }))
        .unwrap_or(0);

    let mut builder = TableBuilder::new(ui)
        .id_salt(table_id)
        .striped(true)
        .vscroll(false);
    for spec in columns {
        builder = builder.column(match spec.width {
            ColumnWidth::Exact(width) => Column::exact(width),
            ColumnWidth::Remainder { min } => Column::remainder().at_least(min),
        });
    }

    builder
        .header(HEADER_HEIGHT, |mut header| {
            for (index, spec) in columns.iter().enumerate() {
                header.col(|ui| {
                    header_cell(ui, table_id, controller, spec, index, intents);
                });
            }
        })
        .body(|mut body| {
            if loading {
                body.rows(ROW_HEIGHT, SKELETON_ROWS, |mut row| {
                    for _ in columns {
                        row.col(|ui| {
                            ui.add(egui::Label::new(RichText::new("———").weak()));
                        });
                    }
                });
            } else if let Some(message) = error {
                message_row(&mut body, columns.len(), message_column, |ui| {
                    ui.colored_label(COLOR_ERROR, message.as_str());
                });
            } else if rows.is_empty() {
                message_row(&mut body, columns.len(), message_column, |ui| {
                    ui.weak(empty_message);
                });
            } else {
                body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                    let item = &rows[row.index()];
                    for column_index in 0..columns.len() {
                        row.col(|ui| {
                            render_cell(ui, item, column_index);
                        });
                    }
                });
            }
        });
}

fn message_row(
    body: &mut egui_extras::TableBody<'_>,
    column_count: usize,
    message_column: usize,
    render: impl FnOnce(&mut Ui),
) {
    let mut render = Some(render);
    body.row(ROW_HEIGHT, |mut row: TableRow<'_, '_>| {
        for index in 0..column_count {
            row.col(|ui| {
                if index == message_column {
                    if let Some(render) = render.take() {
                        render(ui);
                    }
                }
            });
        }
    });
}

fn header_cell<T>(
    ui: &mut Ui,
    table_id: &str,
    controller: &TableController<T>,
    spec: &ColumnSpec,
    column_index: usize,
    intents: &mut TableIntents,
) where
    T: DeserializeOwned + Send + 'static,
{
    ui.vertical(|ui| {
        if spec.sortable {
            let indicator = if controller.sort_column() == column_index {
                match controller.sort_direction() {
                    SortDirection::Asc => " ⏶",
                    SortDirection::Desc => " ⏷",
                }
            } else {
                ""
            };
            let label = RichText::new(format!("{}{indicator}", spec.title)).strong();
            if ui.add(egui::Button::new(label).frame(false)).clicked() {
                intents.sort = Some(column_index);
            }
        } else {
            ui.strong(spec.title);
        }

        if let Some(def) = controller.filters().def_for_column(Ustr::from(spec.id)) {
            filter_input(ui, table_id, controller, def, intents);
        }
    });
}

fn filter_input<T>(
    ui: &mut Ui,
    table_id: &str,
    controller: &TableController<T>,
    def: &FilterDef,
    intents: &mut TableIntents,
) where
    T: DeserializeOwned + Send + 'static,
{
    match (&def.kind, def.keys()) {
        (FilterKind::Text, FilterKeys::Single(key)) => {
            let mut value = controller.filters().value(key).to_owned();
            let response = ui.add(
                TextEdit::singleline(&mut value)
                    .hint_text(def.label.as_str())
                    .desired_width(f32::INFINITY),
            );
            if response.changed() {
                intents.filters.push((key, value));
            }
        }
        (FilterKind::Select { options }, FilterKeys::Single(key)) => {
            let current = controller.filters().value(key).to_owned();
            let current_label = options
                .iter()
                .find(|option| option.value == current)
                .map_or("All", |option| option.label.as_str());
            egui::ComboBox::from_id_salt((table_id, "filter", key.as_str()))
                .selected_text(current_label)
                .width(ui.available_width())
                .show_ui(ui, |ui| {
                    let mut selected = current.clone();
                    for option in options {
                        if ui
                            .selectable_value(
                                &mut selected,
                                option.value.clone(),
                                option.label.as_str(),
                            )
                            .clicked()
                            && selected != current
                        {
                            intents.filters.push((key, selected.clone()));
                        }
                    }
                });
        }
        (FilterKind::NumberRange, FilterKeys::Range { low, high }) => {
            range_inputs(ui, controller, intents, low, high, "min", "max");
        }
        (FilterKind::DateRange, FilterKeys::Range { low, high }) => {
            range_inputs(ui, controller, intents, low, high, "from", "to");
        }
        // A range kind always resolves to a key pair and a single kind to a
        // single key; nothing else reaches here.
        _ => {}
    }
}

fn range_inputs<T>(
    ui: &mut Ui,
    controller: &TableController<T>,
    intents: &mut TableIntents,
    low: Ustr,
    high: Ustr,
    low_hint: &str,
    high_hint: &str,
) where
    T: DeserializeOwned + Send + 'static,
{
    ui.horizontal(|ui| {
        for (key, hint) in [(low, low_hint), (high, high_hint)] {
            let mut value = controller.filters().value(key).to_owned();
            let response = ui.add(
                TextEdit::singleline(&mut value)
                    .hint_text(hint)
                    .desired_width(RANGE_INPUT_WIDTH),
            );
            if response.changed() {
                intents.filters.push((key, value));
            }
        }
    });
}

fn apply_intents<T>(controller: &mut TableController<T>, intents: TableIntents)
where
    T: DeserializeOwned + Send + 'static,
{
    let now = Utc::now();

    if let Some(page_size) = intents.page_size {
        controller.set_page_size(page_size);
    }
    if intents.clear_search {
        controller.clear_search();
    } else if let Some(search) = intents.search {
        controller.set_search_input(&search, now);
    }
    for (key, value) in intents.filters {
        controller.set_filter(key, value);
    }
    if let Some(column) = intents.sort {
        controller.toggle_sort(column);
    }
    if intents.reset_filters {
        controller.reset_filters();
    }
    if intents.refresh {
        controller.refresh();
    }
    if let Some(target) = intents.go_to {
        controller.go_to_page(target);
    }
}
