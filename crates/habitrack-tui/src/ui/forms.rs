//! Login and registration screens.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use habitrack_core::forms::FormField;

use crate::app::{App, LoginFocus, PendingOp, RegisterFocus};

use super::render::centered_rect_fixed;
use super::styles;

/// Visible width of a text field, in characters
const FIELD_WIDTH: usize = 28;

const DIALOG_WIDTH: u16 = 50;

pub fn render_login(frame: &mut Frame, app: &App, area: Rect) {
    let area = centered_rect_fixed(DIALOG_WIDTH, 16, area);
    frame.render_widget(Clear, area);

    let busy = app.pending == Some(PendingOp::Login);
    let form = &app.login_form;
    let focus = app.login_focus;

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("  Welcome Back", styles::title_style())),
        Line::from(Span::styled("  Sign in to continue", styles::muted_style())),
        Line::from(""),
        field_line("Email", &form.email, FormField::Email, focus == LoginFocus::Email, busy),
        Line::from(""),
        field_line(
            "Password",
            &form.password,
            FormField::Password,
            focus == LoginFocus::Password,
            busy,
        ),
        Line::from(""),
        button_line(
            if busy { "Signing in..." } else { "Login" },
            focus == LoginFocus::Button,
            app.is_busy(),
        ),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Don't have an account? ", styles::muted_style()),
            Span::styled("Register", styles::link_style(focus == LoginFocus::RegisterLink)),
        ]),
    ];

    if busy {
        lines.push(Line::from(""));
        lines.push(spinner_line(app, "Contacting server"));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

pub fn render_register(frame: &mut Frame, app: &App, area: Rect) {
    let area = centered_rect_fixed(DIALOG_WIDTH, 19, area);
    frame.render_widget(Clear, area);

    let busy = app.pending == Some(PendingOp::Register);
    let form = &app.register_form;
    let focus = app.register_focus;

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("  Create Account", styles::title_style())),
        Line::from(Span::styled("  Sign up to get started", styles::muted_style())),
        Line::from(""),
        field_line("Name", &form.name, FormField::Name, focus == RegisterFocus::Name, busy),
        field_line("Email", &form.email, FormField::Email, focus == RegisterFocus::Email, busy),
        field_line(
            "Password",
            &form.password,
            FormField::Password,
            focus == RegisterFocus::Password,
            busy,
        ),
        field_line(
            "Confirm",
            &form.confirm_password,
            FormField::ConfirmPassword,
            focus == RegisterFocus::ConfirmPassword,
            busy,
        ),
        Line::from(""),
        Line::from(Span::styled(
            "  Password must be at least 8 characters long",
            styles::muted_style(),
        )),
        Line::from(""),
        button_line(
            if busy { "Creating account..." } else { "Register" },
            focus == RegisterFocus::Button,
            app.is_busy(),
        ),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Already have an account? ", styles::muted_style()),
            Span::styled("[Esc]", styles::help_key_style()),
            Span::styled(" Login", styles::muted_style()),
        ]),
    ];

    if busy {
        lines.push(Line::from(""));
        lines.push(spinner_line(app, "Contacting server"));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn field_line(label: &str, value: &str, field: FormField, focused: bool, disabled: bool) -> Line<'static> {
    let style = if disabled {
        styles::muted_style()
    } else if focused {
        styles::selected_style()
    } else {
        styles::text_style()
    };
    let cursor = if focused && !disabled { "▌" } else { " " };
    let shown = visible_value(value, field.is_secret(), FIELD_WIDTH);

    Line::from(vec![
        Span::styled(format!("  {:<9}[", label), styles::muted_style()),
        Span::styled(format!("{:<width$}", format!("{}{}", shown, cursor), width = FIELD_WIDTH + 1), style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn button_line(label: &str, focused: bool, disabled: bool) -> Line<'static> {
    let text = if focused && !disabled {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    let padding = (DIALOG_WIDTH as usize).saturating_sub(text.chars().count() + 2) / 2;
    Line::from(vec![
        Span::raw(" ".repeat(padding)),
        Span::styled(text, styles::button_style(focused, disabled)),
    ])
}

fn spinner_line(app: &App, label: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("  {} {}...", super::render::spinner_frame(app.spinner_tick), label),
        styles::muted_style(),
    ))
}

/// Text shown inside a field: masked when secret, scrolled so the end
/// of the value stays visible.
fn visible_value(value: &str, secret: bool, width: usize) -> String {
    let count = value.chars().count();
    let skip = count.saturating_sub(width);
    if secret {
        "•".repeat(count - skip)
    } else {
        value.chars().skip(skip).collect()
    }
}
