//! Pagination control: row summary plus compacted page buttons.

use egui::Ui;
use walletboard_business::{PageItem, PageSummary, page_items};

/// Renders the pagination row. Returns the 1-based page the user asked for,
/// if any.
pub fn pagination_controls(ui: &mut Ui, summary: &PageSummary) -> Option<u64> {
    let mut target: Option<u64> = None;

    ui.horizontal(|ui| {
        ui.label(summary_text(summary));

        ui.separator();

        let at_first = summary.current_page <= 1;
        if ui.add_enabled(!at_first, egui::Button::new("‹")).clicked() {
            target = Some(summary.current_page - 1);
        }

        for item in page_items(summary.total_pages, summary.current_page) {
            match item {
                PageItem::Page(page) => {
                    let selected = page == summary.current_page;
                    if ui.selectable_label(selected, page.to_string()).clicked() && !selected {
                        target = Some(page);
                    }
                }
                PageItem::Ellipsis => {
                    ui.label("…");
                }
            }
        }

        let at_last = summary.current_page >= summary.total_pages;
        if ui.add_enabled(!at_last, egui::Button::new("›")).clicked() {
            target = Some(summary.current_page + 1);
        }
    });

    target
}

fn summary_text(summary: &PageSummary) -> String {
    if summary.total_for_display == 0 {
        "No entries".to_owned()
    } else {
        format!(
            "Showing {} to {} of {} entries",
            summary.current_from, summary.current_to, summary.total_for_display
        )
    }
}
