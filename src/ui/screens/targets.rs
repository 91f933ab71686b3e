use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};

use super::dashboard::render_target_chart;
use super::{render_empty, render_loading, table_rows, titled_block};
use crate::ui::app::{App, Screen};
use crate::ui::theme;
use crate::ui::util::format_amount;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(page) = &app.targets else {
        render_loading(f, area, "Targets");
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Percentage(45),
            Constraint::Min(6),
        ])
        .split(area);

    let current = match &page.current {
        Some(t) => Line::from(vec![
            Span::styled(format!("{}: ", t.month_key().long_label()), theme::dim_style()),
            Span::styled(format_amount(t.amount), theme::money_style()),
        ]),
        None => Line::from(Span::styled(
            "No target for this month. Set one with :target <amount>",
            theme::dim_style(),
        )),
    };
    f.render_widget(
        Paragraph::new(current).block(titled_block("Current Target")),
        chunks[0],
    );

    render_target_chart(f, chunks[1], &page.chart);

    if page.targets.is_empty() {
        render_empty(f, chunks[2], "Target History (0)", &["No targets set yet"]);
        return;
    }

    let cursor = app.cursor(Screen::Targets);
    let header = Row::new(
        ["Month", "Target", "Set On"]
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    );
    let rows: Vec<Row> = page
        .targets
        .iter()
        .enumerate()
        .skip(cursor.scroll)
        .take(table_rows(chunks[2]))
        .map(|(i, t)| {
            Row::new(vec![
                Cell::from(t.month_key().long_label()),
                Cell::from(format_amount(t.amount)),
                Cell::from(t.created_at.format("%Y-%m-%d").to_string()),
            ])
            .style(theme::row_style(i, Some(cursor.index)))
        })
        .collect();

    let widths = [
        Constraint::Length(18),
        Constraint::Length(18),
        Constraint::Min(12),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(titled_block(format!("Target History ({})", page.targets.len())));
    f.render_widget(table, chunks[2]);
}
