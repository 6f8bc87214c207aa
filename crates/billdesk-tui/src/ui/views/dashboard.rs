use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{App, DashboardPanel};
use crate::ui::styles;

use super::{format_amount, truncate};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_templates(frame, app, chunks[0]);
    render_unpaid_bills(frame, app, chunks[1]);
}

fn render_templates(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.dashboard_panel == DashboardPanel::Templates;
    let width = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = app
        .templates
        .iter()
        .enumerate()
        .map(|(i, template)| {
            let style = if focused && i == app.template_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            let lines = vec![
                Line::from(truncate(&template.name, width)),
                Line::from(Span::styled(
                    format!("  {}", truncate(&template.subject, width.saturating_sub(2))),
                    styles::muted_style(),
                )),
            ];
            ListItem::new(lines).style(style)
        })
        .collect();

    let block = Block::default()
        .title(format!(" Templates ({}) ", app.templates.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    if items.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            " No templates yet. Press n to create one.",
            styles::muted_style(),
        )))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let list = List::new(items).block(block);
    let mut state = ListState::default();
    state.select(Some(app.template_selection));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_unpaid_bills(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.dashboard_panel == DashboardPanel::Bills;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let mut items: Vec<ListItem> = Vec::new();
    let mut selected_row = 0;

    for (i, company) in app.unpaid.companies.iter().enumerate() {
        let expanded = app.expanded_companies.contains(&company.id);
        let marker = if expanded { "▼" } else { "▶" };
        let style = if focused && i == app.company_selection {
            selected_row = items.len();
            styles::selected_style()
        } else {
            styles::list_item_style()
        };

        items.push(
            ListItem::new(Line::from(vec![
                Span::raw(format!("{} {:<28} ", marker, truncate(&company.name, 28))),
                Span::styled(
                    format!("{:>3} bills  ", company.bills.len()),
                    styles::muted_style(),
                ),
                Span::styled(format_amount(company.amount_unpaid()), styles::amount_style()),
            ]))
            .style(style),
        );

        if expanded {
            for bill in &company.bills {
                items.push(ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("    {:<26} ", truncate(&bill.inv_no, 26)),
                        styles::muted_style(),
                    ),
                    Span::raw(format_amount(bill.amount_unpaid)),
                ])));
            }
        }
    }

    let block = Block::default()
        .title(format!(" Unpaid Bills ({} companies) ", app.unpaid.companies.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    if items.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            " Nothing outstanding.",
            styles::success_style(),
        )))
        .block(block);
        frame.render_widget(empty, chunks[0]);
    } else {
        let list = List::new(items).block(block);
        let mut state = ListState::default();
        state.select(Some(selected_row));
        frame.render_stateful_widget(list, chunks[0], &mut state);
    }

    let totals = Line::from(vec![
        Span::styled(" Total: ", styles::highlight_style()),
        Span::styled(format_amount(app.unpaid.total_amount), styles::amount_style()),
        Span::styled(
            format!("  across {} bills", app.unpaid.total_count),
            styles::muted_style(),
        ),
    ]);
    let totals_block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(totals).block(totals_block), chunks[1]);
}
