//! Build version label for the top bar.

use egui::{Response, Ui};
use walletboard_utils::version_info;

pub fn version_label(ui: &mut Ui) -> Response {
    ui.weak(version_info::format_version())
}
