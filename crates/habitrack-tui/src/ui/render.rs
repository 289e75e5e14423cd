use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use habitrack_core::{GuardDecision, Route};

use crate::app::{App, AppState};

use super::styles;
use super::tabs::{habits, home, profile};
use super::forms;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn spinner_frame(tick: usize) -> &'static str {
    SPINNER[tick % SPINNER.len()]
}

pub fn render(frame: &mut Frame, app: &App) {
    // Nothing but the loading indicator until the session is resolved
    if app.decision == GuardDecision::Loading || app.current_route() == Route::Entry {
        render_loading(frame, app);
    } else {
        let route = app.current_route();
        let show_tabs = route.is_protected();

        let mut constraints = vec![Constraint::Length(3)]; // Title bar
        if show_tabs {
            constraints.push(Constraint::Length(3)); // Tabs
        }
        constraints.push(Constraint::Min(10)); // Main content
        constraints.push(Constraint::Length(2)); // Status bar

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(frame.area());

        render_title_bar(frame, app, chunks[0]);
        let content = if show_tabs {
            render_tabs(frame, app, chunks[1]);
            chunks[2]
        } else {
            chunks[1]
        };
        render_main_content(frame, app, content);
        render_status_bar(frame, app, chunks[chunks.len() - 1]);
    }

    // Render overlays
    match app.state {
        AppState::ShowingNotice => render_notice_overlay(frame, app),
        AppState::ConfirmingLogout => render_logout_overlay(frame),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::Normal | AppState::Quitting => {}
    }
}

fn render_loading(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(30, 3, frame.area());
    let line = Line::from(vec![
        Span::styled(spinner_frame(app.spinner_tick), styles::title_style()),
        Span::styled(" Loading...", styles::muted_style()),
    ]);
    frame.render_widget(Paragraph::new(vec![Line::from(""), line]).centered(), area);
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Habitrack";
    let screen = app.current_route().title();

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + screen.len() + 2),
        )),
        Span::styled(screen, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let current = app.current_route();

    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in Route::TABS.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        spans.push(Span::styled(
            format!("[{}] {}", i + 1, tab.title()),
            styles::tab_style(*tab == current),
        ));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_route() {
        Route::Login => forms::render_login(frame, app, area),
        Route::Register => forms::render_register(frame, app, area),
        Route::Home => home::render(frame, app, area),
        Route::Habits => habits::render(frame, app, area),
        Route::Profile => profile::render(frame, app, area),
        Route::Entry => {}
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = match app.identity() {
        Some(identity) => format!(" Signed in as {} ", identity.email.as_deref().unwrap_or(identity.display_name())),
        None => " Not signed in ".to_string(),
    };

    let shortcuts = match app.current_route() {
        Route::Login => "[Tab] next field | [Enter] select | [Esc] quit",
        Route::Register => "[Tab] next field | [Enter] select | [Esc] back",
        Route::Profile => "[1-3] tabs | [o] logout | [q]uit",
        _ => "[1-3] tabs | [q]uit",
    };
    let right_text = format!(" {} ", shortcuts);

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);

    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

fn render_notice_overlay(frame: &mut Frame, app: &App) {
    let Some(notice) = &app.notice else { return };

    let area = centered_rect_fixed(46, 9, frame.area());
    frame.render_widget(Clear, area);

    let title_style = if notice.is_error {
        styles::error_style()
    } else {
        styles::success_style()
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!(" {}", notice.message), styles::text_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Press ", styles::muted_style()),
            Span::styled("[Enter]", styles::help_key_style()),
            Span::styled(" to continue", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(Span::styled(format!(" {} ", notice.title), title_style))
        .borders(Borders::ALL)
        .border_style(title_style);

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_logout_overlay(frame: &mut Frame) {
    render_confirm_overlay(frame, "Logout", "Are you sure you want to logout?", "logout");
}

fn render_quit_overlay(frame: &mut Frame) {
    render_confirm_overlay(frame, "Quit", "Are you sure you want to quit?", "quit");
}

fn render_confirm_overlay(frame: &mut Frame, title: &str, question: &str, action: &str) {
    let area = centered_rect_fixed(46, 8, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("   {}", question), styles::highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(format!(" to {}, ", action), styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(Span::styled(format!(" {} ", title), styles::title_style()))
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
