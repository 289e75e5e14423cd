use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use habitrack_core::Identity;

use crate::app::{App, PendingOp};
use crate::ui::styles;

use super::card;

const LABEL_WIDTH: usize = 20;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    // The guard never renders this tab without a session
    let Some(identity) = app.identity() else { return };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(5), // Account information
            Constraint::Length(5), // Settings
            Constraint::Length(2), // Logout
            Constraint::Length(1), // Version
            Constraint::Min(0),
        ])
        .split(area);

    render_header(frame, &identity, chunks[0]);
    render_account_info(frame, &identity, chunks[1]);
    render_settings(frame, chunks[2]);
    render_logout(frame, app, chunks[3]);

    let version = Paragraph::new(Line::from(Span::styled(
        format!("Version {}", env!("CARGO_PKG_VERSION")),
        styles::muted_style(),
    )))
    .centered();
    frame.render_widget(version, chunks[4]);
}

fn render_header(frame: &mut Frame, identity: &Identity, area: Rect) {
    let mut lines = Vec::new();
    if let Some(name) = &identity.name {
        lines.push(Line::from(Span::styled(format!(" {}", name), styles::title_style())));
    }
    if let Some(email) = &identity.email {
        lines.push(Line::from(Span::styled(format!(" {}", email), styles::muted_style())));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_account_info(frame: &mut Frame, identity: &Identity, area: Rect) {
    let verification_style = if identity.email_verified {
        styles::success_style()
    } else {
        styles::highlight_style()
    };

    let lines = vec![
        info_line("User ID", &identity.id, styles::text_style()),
        info_line("Member Since", &identity.member_since(), styles::text_style()),
        info_line("Email Verification", identity.verification_label(), verification_style),
    ];
    frame.render_widget(Paragraph::new(lines).block(card("Account Information")), area);
}

fn render_settings(frame: &mut Frame, area: Rect) {
    let lines = ["Notifications", "Privacy", "Help & Support"]
        .into_iter()
        .map(|setting| {
            Line::from(vec![
                Span::styled(format!(" {:<width$}", setting, width = LABEL_WIDTH), styles::text_style()),
                Span::styled("›", styles::muted_style()),
            ])
        })
        .collect::<Vec<_>>();
    frame.render_widget(Paragraph::new(lines).block(card("Settings")), area);
}

fn render_logout(frame: &mut Frame, app: &App, area: Rect) {
    let logging_out = app.pending == Some(PendingOp::Logout);
    let label = if logging_out { "Logging out..." } else { "[o] Logout" };
    let logout = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(label, styles::error_style())),
    ])
    .centered();
    frame.render_widget(logout, area);
}

fn info_line(label: &str, value: &str, value_style: ratatui::style::Style) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {:<width$}", label, width = LABEL_WIDTH), styles::muted_style()),
        Span::styled(value.to_string(), value_style),
    ])
}
