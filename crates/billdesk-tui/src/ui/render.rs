use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use billdesk_core::cache::CacheAges;
use billdesk_core::gate::{Landing, Route};

use crate::app::{App, AppState};

use super::styles;
use super::views::{dashboard, editor, login};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    let view = app.view();

    render_title_bar(frame, app, view, chunks[0]);
    match view {
        Landing::Interstitial => render_interstitial(frame, app, chunks[1]),
        Landing::Show(Route::Login) => login::render(frame, app, chunks[1]),
        Landing::Show(Route::Dashboard) => dashboard::render(frame, app, chunks[1]),
        Landing::Show(Route::NewTemplate | Route::EditTemplate(_)) => {
            editor::render(frame, app, chunks[1])
        }
    }
    render_status_bar(frame, app, view, chunks[2]);

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, view: Landing, area: Rect) {
    let title = match view {
        Landing::Show(route) => format!("  billdesk · {}", route.title()),
        Landing::Interstitial => "  billdesk".to_string(),
    };
    let right = match app.session.identity() {
        Some(identity) => identity.display_name(),
        None => app.session.status().label().to_string(),
    };

    let title_line = Line::from(vec![
        Span::styled(title.clone(), styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.chars().count() + right.chars().count() + 2),
        )),
        Span::styled(right, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

/// Shown while the session is unknown or being verified. Nothing that
/// depends on the session is drawn behind it.
fn render_interstitial(frame: &mut Frame, app: &App, area: Rect) {
    let message = if app.signing_in {
        "Signing in…"
    } else {
        "Checking session…"
    };
    let dialog = centered_rect_fixed(40, 5, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("   {}", message), styles::highlight_style())),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), dialog);
}

fn render_status_bar(frame: &mut Frame, app: &App, view: Landing, area: Rect) {
    let shortcuts = match view {
        Landing::Interstitial => "[q]uit",
        Landing::Show(Route::Login) => "[Tab] next field | [Enter] submit | [Esc] quit",
        Landing::Show(Route::Dashboard) => "[n]ew | [u]pdate | [L]ogout | [q]uit",
        Landing::Show(_) => "[Tab] next field | [Ctrl+S] save | [Esc] back",
    };

    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else if app.refreshing {
        " Updating… ".to_string()
    } else if matches!(view, Landing::Show(Route::Dashboard)) {
        format!(" {} ", freshness_label(&app.cache_ages))
    } else {
        String::new()
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
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

/// "Updated 5m ago", flagged once cached data is past the staleness window.
fn freshness_label(ages: &CacheAges) -> String {
    let updated = ages.last_updated();
    if ages.stale && (ages.templates.is_some() || ages.unpaid_bills.is_some()) {
        format!("Updated {} (stale, [u] to refresh)", updated)
    } else {
        format!("Updated {}", updated)
    }
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());

    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freshness_label() {
        assert_eq!(freshness_label(&CacheAges::default()), "Updated never");

        let fresh = CacheAges {
            templates: Some("5m ago".to_string()),
            unpaid_bills: Some("5m ago".to_string()),
            stale: false,
        };
        assert_eq!(freshness_label(&fresh), "Updated 5m ago");

        let stale = CacheAges {
            stale: true,
            ..fresh
        };
        assert_eq!(freshness_label(&stale), "Updated 5m ago (stale, [u] to refresh)");

        // Nothing cached yet is not worth flagging
        let empty = CacheAges {
            stale: true,
            ..Default::default()
        };
        assert_eq!(freshness_label(&empty), "Updated never");
    }

    #[test]
    fn test_centered_rect_fixed() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect_fixed(40, 10, outer);
        assert_eq!(inner, Rect::new(30, 15, 40, 10));

        // Clamped to the available area
        let small = Rect::new(5, 5, 20, 4);
        let clamped = centered_rect_fixed(40, 10, small);
        assert_eq!(clamped, Rect::new(5, 5, 20, 4));
    }
}
