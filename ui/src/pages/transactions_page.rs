//! The transactions table page.

use egui::{Color32, Ui};
use walletboard_business::{Direction, Transaction};

use crate::state::AppState;
use crate::widgets::{ColumnSpec, ColumnWidth, data_table};

const COLOR_IN: Color32 = Color32::from_rgb(34, 139, 34);
const COLOR_OUT: Color32 = Color32::from_rgb(220, 53, 69);

/// Column layout; indices double as sort-column indices on the wire.
fn columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("id", "ID", ColumnWidth::Exact(60.0)).sortable(),
        ColumnSpec::new("created_at", "Date", ColumnWidth::Exact(150.0)).sortable(),
        ColumnSpec::new("wallet", "Wallet", ColumnWidth::Remainder { min: 120.0 }),
        ColumnSpec::new(
            "counterparty",
            "Counterparty",
            ColumnWidth::Remainder { min: 120.0 },
        ),
        ColumnSpec::new("direction", "Direction", ColumnWidth::Exact(90.0)),
        ColumnSpec::new("amount", "Amount", ColumnWidth::Exact(100.0)).sortable(),
        ColumnSpec::new("status", "Status", ColumnWidth::Exact(90.0)),
    ]
}

pub fn transactions_page(state: &mut AppState, ui: &mut Ui) {
    ui.heading("Transactions");
    ui.add_space(8.0);

    data_table(
        ui,
        "transactions",
        &mut state.transactions,
        &columns(),
        "No transactions found.",
        render_cell,
    );
}

fn render_cell(ui: &mut Ui, tx: &Transaction, column_index: usize) {
    match column_index {
        0 => {
            ui.monospace(tx.id.to_string());
        }
        1 => {
            ui.label(tx.created_at.format("%Y-%m-%d %H:%M").to_string());
        }
        2 => {
            ui.label(&tx.wallet);
        }
        3 => {
            ui.label(&tx.counterparty);
        }
        4 => {
            let color = match tx.direction {
                Direction::In => COLOR_IN,
                Direction::Out => COLOR_OUT,
            };
            ui.colored_label(color, tx.direction.label());
        }
        5 => {
            ui.monospace(format!("{:.2}", tx.amount));
        }
        _ => {
            ui.label(&tx.status);
        }
    }
}
