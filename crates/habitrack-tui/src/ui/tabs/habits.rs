use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

use super::card;

const FEATURES: [&str; 4] = [
    "Create custom habits",
    "Track daily completion",
    "View streaks and progress",
    "Set reminders",
];

pub fn render(frame: &mut Frame, _app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Empty state
            Constraint::Length(FEATURES.len() as u16 + 5),
            Constraint::Min(0),
        ])
        .split(area);

    let empty_state = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("✔ No Habits Yet", styles::title_style())),
        Line::from(Span::styled(
            "Start building better habits by creating your first one!",
            styles::muted_style(),
        )),
    ])
    .centered();
    frame.render_widget(empty_state, chunks[0]);

    let mut lines = vec![
        Line::from(Span::styled(
            " This is where you'll track your daily habits. You can add features like:",
            styles::text_style(),
        )),
        Line::from(""),
    ];
    lines.extend(FEATURES.iter().map(|feature| {
        Line::from(vec![
            Span::styled("   ✓ ", styles::success_style()),
            Span::styled(*feature, styles::text_style()),
        ])
    }));

    let getting_started = Paragraph::new(lines)
        .block(card("Getting Started"))
        .wrap(Wrap { trim: false });
    frame.render_widget(getting_started, chunks[1]);
}
