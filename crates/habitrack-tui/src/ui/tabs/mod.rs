//! Content of the signed-in tabs.

pub mod habits;
pub mod home;
pub mod profile;

use ratatui::widgets::{Block, Borders};

use super::styles;

/// Bordered card with a title, shared by the tab screens
pub(crate) fn card(title: &str) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title))
        .title_style(styles::heading_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false))
}
