//! Login page for unauthenticated operators.
//!
//! Displays a centered sign-in form. The submit action is disabled while a
//! login attempt is in flight, and both the attempt's failure message and
//! the session-expired notice surface through the same error slot.

use egui::{Align, Color32, Layout, Response, TextEdit, Ui};

use crate::state::AppState;

/// Error color shared with the table error row.
const COLOR_ERROR: Color32 = Color32::from_rgb(220, 53, 69);

pub fn login_page(state: &mut AppState, ui: &mut Ui) -> Response {
    let mut should_login = false;
    let authenticating = state.login.is_authenticating();
    let error = state.login.status().error().map(str::to_owned);

    let response = ui
        .with_layout(Layout::top_down(Align::Center), |ui| {
            ui.add_space(40.0);
            ui.heading("Walletboard");
            ui.label("Wallet administration console");
            ui.add_space(24.0);

            if let Some(message) = &error {
                ui.colored_label(COLOR_ERROR, message);
                ui.add_space(8.0);
            }

            ui.horizontal(|ui| {
                ui.label("Email:");
                ui.add_enabled(
                    !authenticating,
                    TextEdit::singleline(&mut state.email_input).desired_width(220.0),
                );
            });

            ui.add_space(8.0);

            ui.horizontal(|ui| {
                ui.label("Password:");
                let password_response = ui.add_enabled(
                    !authenticating,
                    TextEdit::singleline(&mut state.password_input)
                        .password(true)
                        .desired_width(220.0),
                );
                if password_response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter))
                {
                    should_login = true;
                }
            });

            ui.add_space(16.0);

            if authenticating {
                ui.spinner();
                ui.label("Signing in…");
            } else {
                let can_login =
                    !state.email_input.trim().is_empty() && !state.password_input.is_empty();
                if ui
                    .add_enabled(can_login, egui::Button::new("Sign in"))
                    .clicked()
                {
                    should_login = true;
                }
            }
        })
        .response;

    if should_login && !authenticating {
        let email = state.email_input.clone();
        let password = state.password_input.clone();
        state
            .login
            .begin(&state.client, state.fetcher.as_ref(), &email, &password);
    }

    response
}
