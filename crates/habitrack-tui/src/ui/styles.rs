use ratatui::style::{Color, Modifier, Style};

// Color palette
pub const PRIMARY: Color = Color::Rgb(0, 122, 255);
pub const SUCCESS: Color = Color::Rgb(52, 199, 89);
pub const ACCENT: Color = Color::Rgb(255, 149, 0);
pub const ERROR: Color = Color::Rgb(255, 59, 48);
pub const MUTED: Color = Color::Rgb(142, 142, 147);
pub const HIGHLIGHT: Color = Color::Rgb(40, 48, 72);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn heading_style() -> Style {
    Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().bg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

pub fn text_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn success_style() -> Style {
    Style::default().fg(SUCCESS)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn link_style(focused: bool) -> Style {
    let style = Style::default().fg(PRIMARY).add_modifier(Modifier::UNDERLINED);
    if focused {
        style.bg(HIGHLIGHT).add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

/// Primary action button; dimmed while an operation is pending
pub fn button_style(focused: bool, disabled: bool) -> Style {
    if disabled {
        Style::default().fg(MUTED)
    } else if focused {
        Style::default()
            .fg(Color::White)
            .bg(PRIMARY)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(PRIMARY)
    }
}

pub fn tab_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(PRIMARY)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        muted_style()
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(32, 32, 40)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}
