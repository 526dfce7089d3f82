//! The eframe application shell.

use chrono::Utc;
use egui::{Align, Layout};
use log::info;
use walletboard_business::AuthStatus;
use walletboard_business::session::{self, StoredSession};

use crate::pages;
use crate::state::{AppState, Page};
use crate::widgets;

pub struct WalletboardApp {
    state: AppState,
}

impl WalletboardApp {
    /// Called once before the first frame; restores a persisted session when
    /// its token is still live.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut state = AppState::default();
        if let Some(storage) = cc.storage {
            if let Some(stored) = session::load(|key| storage.get_string(key), Utc::now()) {
                state.login.restore(stored.profile, stored.token);
            }
        }
        Self { state }
    }

    /// Builds the app around prepared state; used by tests.
    pub fn with_state(state: AppState) -> Self {
        Self { state }
    }

    pub fn state(&mut self) -> &mut AppState {
        &mut self.state
    }
}

impl eframe::App for WalletboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let state = &mut self.state;
        let now = Utc::now();

        // One 401 anywhere in the transport produces exactly one notice.
        if state.session_expired.take() {
            state.login.expire();
            state.reports.clear();
        }
        state.login.poll();

        let authenticated = state.login.status().is_authenticated();
        let mut sign_out = false;

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.strong("Walletboard");
                if authenticated {
                    ui.separator();
                    let mut page = state.active_page;
                    ui.selectable_value(&mut page, Page::Transactions, "Transactions");
                    ui.selectable_value(&mut page, Page::Reports, "Reports");
                    state.active_page = page;
                }

                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    widgets::version_label(ui);
                    if let Some(profile) = state.login.status().profile() {
                        if ui.button("Sign out").clicked() {
                            sign_out = true;
                        }
                        ui.label(&profile.name);
                    }
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if authenticated {
                match state.active_page {
                    Page::Transactions => pages::transactions_page(state, ui),
                    Page::Reports => {
                        egui::ScrollArea::vertical().show(ui, |ui| {
                            pages::reports_page(state, ui);
                        });
                    }
                }
            } else {
                pages::login_page(state, ui);
            }
        });

        if sign_out {
            info!("app: operator signed out");
            state.login.logout();
            state.reports.clear();
        }

        // Drive the fetch lifecycles.
        let token = state.login.token().map(str::to_owned);
        state.transactions.process(
            now,
            &state.client,
            state.fetcher.as_ref(),
            token.as_deref(),
        );
        state.reports.top_transactions.poll();
        state.reports.top_users.poll();
        if let Some(token) = token.as_deref() {
            state
                .reports
                .volume
                .poll(&state.client, state.fetcher.as_ref(), token);
        }

        // Keep polling without user input while work is pending.
        let busy = state.transactions.wants_tick()
            || state.login.is_authenticating()
            || state.reports.top_transactions.is_loading()
            || state.reports.top_users.is_loading()
            || state.reports.volume.is_loading();
        if busy {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }

    /// Persists (or clears) the session in the platform key-value storage.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        match self.state.login.status() {
            AuthStatus::Authenticated { profile, token } => {
                let stored = StoredSession {
                    token: token.clone(),
                    profile: profile.clone(),
                };
                session::save(|key, value| storage.set_string(key, value), &stored);
            }
            _ => {
                session::clear(|key, value| storage.set_string(key, value));
            }
        }
    }
}
