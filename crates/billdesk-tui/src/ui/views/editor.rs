use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, EditorField};
use crate::ui::styles;

use super::{tail, truncate};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let editor = &app.editor;
    let title = match editor.template_id {
        Some(id) => format!(" Edit Template #{} ", id),
        None => " New Template ".to_string(),
    };

    if editor.loading {
        let block = Block::default()
            .title(title)
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true));
        let loading = Paragraph::new(Line::from(Span::styled(
            " Loading template…",
            styles::muted_style(),
        )))
        .block(block);
        frame.render_widget(loading, area);
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    render_form(frame, app, &title, columns[0]);
    render_companies(frame, app, columns[1]);
}

fn render_form(frame: &mut Frame, app: &App, title: &str, area: Rect) {
    let editor = &app.editor;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Name
            Constraint::Length(3), // Mail
            Constraint::Length(3), // Subject
            Constraint::Min(4),    // Body
            Constraint::Length(3), // Save + error
        ])
        .split(area);

    for (i, field) in EditorField::TEXT_FIELDS.into_iter().enumerate() {
        let focused = editor.focus == field;
        let value = editor.field(field).unwrap_or_default();
        let cursor = if focused { "▌" } else { "" };
        let block_title = if i == 0 {
            format!("{}· {} ", title, field.label())
        } else {
            format!(" {} ", field.label())
        };
        let block = Block::default()
            .title(block_title)
            .title_style(if focused {
                styles::title_style()
            } else {
                styles::muted_style()
            })
            .borders(Borders::ALL)
            .border_style(styles::border_style(focused));

        let paragraph = if field == EditorField::Body {
            Paragraph::new(format!("{}{}", value, cursor))
                .style(styles::list_item_style())
                .wrap(Wrap { trim: false })
        } else {
            let width = rows[i].width.saturating_sub(3) as usize;
            Paragraph::new(format!("{}{}", tail(value, width), cursor)).style(styles::list_item_style())
        };
        frame.render_widget(paragraph.block(block), rows[i]);
    }

    let save_focused = editor.focus == EditorField::Save;
    let button = if editor.is_saving() {
        "  Saving…  "
    } else if save_focused {
        " ▶ Save ◀ "
    } else {
        "   Save   "
    };
    let mut spans = vec![
        Span::raw(" ["),
        Span::styled(button, styles::field_style(save_focused)),
        Span::raw("]  "),
    ];
    if let Some(ref error) = editor.error {
        spans.push(Span::styled(error.clone(), styles::error_style()));
    }
    let footer = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(save_focused));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(footer), rows[4]);
}

fn render_companies(frame: &mut Frame, app: &App, area: Rect) {
    let editor = &app.editor;
    let focused = editor.focus == EditorField::Companies;
    let companies = app.editor_companies();
    let width = area.width.saturating_sub(8) as usize;

    let items: Vec<ListItem> = companies
        .iter()
        .enumerate()
        .map(|(i, company)| {
            let checked = if editor.is_company_selected(company.id) {
                "[x]"
            } else {
                "[ ]"
            };
            let style = if focused && i == editor.company_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(Line::from(format!("{} {}", checked, truncate(&company.name, width))))
                .style(style)
        })
        .collect();

    let selected = companies
        .iter()
        .filter(|c| editor.is_company_selected(c.id))
        .count();
    let block = Block::default()
        .title(format!(" Companies ({}/{}) ", selected, companies.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    if items.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            " No companies available",
            styles::muted_style(),
        )))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let list = List::new(items).block(block);
    let mut state = ListState::default();
    state.select(Some(editor.company_selection));
    frame.render_stateful_widget(list, area, &mut state);
}
