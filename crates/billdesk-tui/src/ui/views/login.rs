use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, LoginFocus};
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;

use super::tail;

/// Visible width of the input fields.
const FIELD_WIDTH: usize = 24;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let height = if app.login_error.is_some() { 11 } else { 9 };
    let dialog = centered_rect_fixed(50, height, area);

    frame.render_widget(Clear, dialog);

    let mut lines = vec![Line::from("")];

    let email_focused = app.login_focus == LoginFocus::Email;
    lines.push(field_line(
        "   Email: [",
        &tail(&app.login_email, FIELD_WIDTH),
        email_focused,
    ));

    let password_focused = app.login_focus == LoginFocus::Password;
    let masked = "*".repeat(app.login_password.chars().count().min(FIELD_WIDTH));
    lines.push(field_line("Password: [", &masked, password_focused));

    let button_focused = app.login_focus == LoginFocus::Button;
    lines.push(Line::from(""));
    let label = if button_focused { " ▶ Login ◀ " } else { "   Login   " };
    lines.push(Line::from(vec![
        Span::raw("                 ["),
        Span::styled(label, styles::field_style(button_focused)),
        Span::raw("]"),
    ]));

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .title(" Sign in ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), dialog);
}

fn field_line<'a>(label: &'a str, value: &str, focused: bool) -> Line<'a> {
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::raw("  "),
        Span::styled(label, styles::muted_style()),
        Span::styled(
            format!("{:<width$}{}", value, cursor, width = FIELD_WIDTH),
            styles::field_style(focused),
        ),
        Span::styled("]", styles::muted_style()),
    ])
}
