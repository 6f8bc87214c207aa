//! Keyboard input handling for the TUI.
//!
//! Keys go to whatever the access gate currently shows, not to the requested
//! route, so nothing behind the interstitial can be driven blind.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use billdesk_core::gate::{Landing, Route};

use crate::app::{
    can_add_body_newline, can_add_email_char, can_add_field_char, can_add_password_char, App,
    AppState, DashboardPanel, EditorField, LoginFocus,
};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    match app.view() {
        Landing::Interstitial => {
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                app.request_quit();
            }
        }
        Landing::Show(Route::Login) => handle_login_input(app, key),
        Landing::Show(Route::Dashboard) => handle_dashboard_input(app, key),
        Landing::Show(Route::NewTemplate | Route::EditTemplate(_)) => handle_editor_input(app, key),
    }
    Ok(false)
}

fn handle_login_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.request_quit(),
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Email,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Email,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => app.login_focus = LoginFocus::Password,
            // Enter in the password field submits, like a web form
            LoginFocus::Password | LoginFocus::Button => app.attempt_login(),
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login_email.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => {
                if can_add_email_char(app.login_email.chars().count(), c) {
                    app.login_email.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
}

fn handle_dashboard_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.request_quit(),
        KeyCode::Char('L') => app.logout(),
        KeyCode::Char('u') => app.refresh_dashboard(),
        KeyCode::Char('n') => app.navigate(Route::NewTemplate),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
            app.dashboard_panel = match app.dashboard_panel {
                DashboardPanel::Templates => DashboardPanel::Bills,
                DashboardPanel::Bills => DashboardPanel::Templates,
            };
        }
        KeyCode::Char('j') | KeyCode::Down => match app.dashboard_panel {
            DashboardPanel::Templates => {
                let max = app.templates.len().saturating_sub(1);
                app.template_selection = (app.template_selection + 1).min(max);
            }
            DashboardPanel::Bills => {
                let max = app.unpaid.companies.len().saturating_sub(1);
                app.company_selection = (app.company_selection + 1).min(max);
            }
        },
        KeyCode::Char('k') | KeyCode::Up => match app.dashboard_panel {
            DashboardPanel::Templates => {
                app.template_selection = app.template_selection.saturating_sub(1);
            }
            DashboardPanel::Bills => {
                app.company_selection = app.company_selection.saturating_sub(1);
            }
        },
        KeyCode::Home => match app.dashboard_panel {
            DashboardPanel::Templates => app.template_selection = 0,
            DashboardPanel::Bills => app.company_selection = 0,
        },
        KeyCode::End => match app.dashboard_panel {
            DashboardPanel::Templates => {
                app.template_selection = app.templates.len().saturating_sub(1);
            }
            DashboardPanel::Bills => {
                app.company_selection = app.unpaid.companies.len().saturating_sub(1);
            }
        },
        KeyCode::Enter | KeyCode::Char(' ') => match app.dashboard_panel {
            DashboardPanel::Templates => app.edit_selected_template(),
            DashboardPanel::Bills => app.toggle_selected_company(),
        },
        _ => {}
    }
}

fn handle_editor_input(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.navigate(Route::Dashboard);
        return;
    }
    if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.save_template();
        return;
    }
    if app.editor.loading {
        return;
    }

    let focus = app.editor.focus;
    match key.code {
        KeyCode::Tab => app.editor.focus = focus.next(),
        KeyCode::BackTab => app.editor.focus = focus.prev(),
        KeyCode::Down if focus == EditorField::Companies => {
            let max = app.editor_companies().len().saturating_sub(1);
            app.editor.company_selection = (app.editor.company_selection + 1).min(max);
        }
        KeyCode::Up if focus == EditorField::Companies => {
            app.editor.company_selection = app.editor.company_selection.saturating_sub(1);
        }
        KeyCode::Down => app.editor.focus = focus.next(),
        KeyCode::Up => app.editor.focus = focus.prev(),
        KeyCode::Enter => match focus {
            EditorField::Save => app.save_template(),
            EditorField::Body => {
                if let Some(body) = app.editor.field_mut(EditorField::Body) {
                    if can_add_body_newline(body.chars().count()) {
                        body.push('\n');
                    }
                }
            }
            EditorField::Companies => toggle_selected_company(app),
            _ => app.editor.focus = focus.next(),
        },
        KeyCode::Char(' ') if focus == EditorField::Companies => toggle_selected_company(app),
        KeyCode::Char('a') if focus == EditorField::Companies => {
            let all: Vec<i64> = app.editor_companies().iter().map(|c| c.id).collect();
            app.editor.toggle_all_companies(&all);
        }
        KeyCode::Backspace => {
            if let Some(value) = app.editor.field_mut(focus) {
                value.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(value) = app.editor.field_mut(focus) {
                if can_add_field_char(focus, value.chars().count(), c) {
                    value.push(c);
                }
            }
        }
        _ => {}
    }
}

fn toggle_selected_company(app: &mut App) {
    let id = app
        .editor_companies()
        .get(app.editor.company_selection)
        .map(|c| c.id);
    if let Some(id) = id {
        app.editor.toggle_company(id);
    }
}
