use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::ui::styles;

use super::card;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Welcome
            Constraint::Length(5), // Today's progress
            Constraint::Length(5), // Quick actions
            Constraint::Length(3), // Tip
            Constraint::Min(0),
        ])
        .split(area);

    render_welcome(frame, app, chunks[0]);
    render_progress(frame, chunks[1]);
    render_quick_actions(frame, chunks[2]);

    let tip = Paragraph::new(Line::from(Span::styled(
        " 💡 Tip: Build consistent habits by tracking them daily!",
        styles::highlight_style(),
    )));
    frame.render_widget(tip, chunks[3]);
}

fn render_welcome(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![Line::from(Span::styled(" Welcome Back!", styles::title_style()))];
    if let Some(name) = app.identity().and_then(|identity| identity.name) {
        lines.push(Line::from(Span::styled(format!(" {}", name), styles::heading_style())));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_progress(frame: &mut Frame, area: Rect) {
    let block = card("Today's Progress");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    // No habit data exists yet, so both counters read zero.
    for (area, label) in halves.iter().zip(["Habits Completed", "Current Streak"]) {
        let stat = Paragraph::new(vec![
            Line::from(Span::styled("0", styles::title_style())),
            Line::from(Span::styled(label, styles::muted_style())),
        ])
        .centered();
        frame.render_widget(stat, *area);
    }
}

fn render_quick_actions(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(" Your habits tracker is ready! 🎉", styles::text_style())),
        Line::from(Span::styled(
            " Start by creating your first habit in the Habits tab.",
            styles::muted_style(),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).block(card("Quick Actions")), area);
}
