//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes. Session operations are only started here;
//! their results arrive later through `App::tick`.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use habitrack_core::{GuardDecision, Route};

use crate::app::{App, AppState, LoginFocus, RegisterFocus};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::ShowingNotice => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                app.dismiss_notice();
            }
            return Ok(false);
        }
        AppState::ConfirmingLogout => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_logout(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
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
        AppState::Quitting => return Ok(true),
        AppState::Normal => {}
    }

    // Only quitting is possible behind the loading indicator
    if app.decision == GuardDecision::Loading {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
            app.state = AppState::ConfirmingQuit;
        }
        return Ok(false);
    }

    match app.current_route() {
        Route::Login => handle_login_input(app, key),
        Route::Register => handle_register_input(app, key),
        Route::Home | Route::Habits | Route::Profile => handle_tabs_input(app, key),
        Route::Entry => Ok(false),
    }
}

fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    if key.code == KeyCode::Esc {
        // Quit if on login screen
        app.state = AppState::Quitting;
        return Ok(true);
    }
    // Form is disabled while a request is pending
    if app.is_busy() {
        return Ok(false);
    }

    match key.code {
        KeyCode::Down | KeyCode::Tab => app.login_focus = app.login_focus.next(),
        KeyCode::Up | KeyCode::BackTab => app.login_focus = app.login_focus.prev(),
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email | LoginFocus::Password => app.login_focus = app.login_focus.next(),
            LoginFocus::Button => app.submit_login(),
            LoginFocus::RegisterLink => app.open_register(),
        },
        KeyCode::Backspace => {
            if let Some(field) = app.login_focus.field() {
                app.login_form.pop_char(field);
            }
        }
        KeyCode::Char(c) => {
            if let Some(field) = app.login_focus.field() {
                app.login_form.push_char(field, c);
            }
        }
        _ => {}
    }
    Ok(false)
}

fn handle_register_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    if app.is_busy() {
        return Ok(false);
    }

    match key.code {
        KeyCode::Esc => {
            if !app.go_back() {
                app.state = AppState::ConfirmingQuit;
            }
        }
        KeyCode::Down | KeyCode::Tab => app.register_focus = app.register_focus.next(),
        KeyCode::Up | KeyCode::BackTab => app.register_focus = app.register_focus.prev(),
        KeyCode::Enter => match app.register_focus {
            RegisterFocus::Button => app.submit_register(),
            _ => app.register_focus = app.register_focus.next(),
        },
        KeyCode::Backspace => {
            if let Some(field) = app.register_focus.field() {
                app.register_form.pop_char(field);
            }
        }
        KeyCode::Char(c) => {
            if let Some(field) = app.register_focus.field() {
                app.register_form.push_char(field, c);
            }
        }
        _ => {}
    }
    Ok(false)
}

fn handle_tabs_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('1') => app.select_tab(Route::Home),
        KeyCode::Char('2') => app.select_tab(Route::Habits),
        KeyCode::Char('3') => app.select_tab(Route::Profile),
        KeyCode::Tab | KeyCode::Right => app.next_tab(),
        KeyCode::BackTab | KeyCode::Left => app.prev_tab(),
        KeyCode::Char('o') | KeyCode::Enter if app.current_route() == Route::Profile => {
            app.request_logout();
        }
        _ => {}
    }
    Ok(false)
}
