use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::Span,
    widgets::{Cell, Row, Table},
    Frame,
};

use super::{render_card, render_empty, render_loading, table_rows, titled_block};
use crate::ui::app::{App, Screen};
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(page) = &app.savings else {
        render_loading(f, area, "Savings");
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(5)])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[0]);

    render_card(
        f,
        top[0],
        "Total Savings",
        page.total_savings,
        theme::GREEN,
        Some(format!("{} contributions", page.history.len())),
    );
    render_empty(
        f,
        top[1],
        "How to pay",
        &[&format!(
            "{} Paybill {} · use your username as the account",
            app.payment.provider, app.payment.paybill
        )],
    );

    if page.history.is_empty() {
        render_empty(
            f,
            chunks[1],
            "History (0)",
            &["No savings recorded yet", "Record one with :save <amount> [note]"],
        );
        return;
    }

    let cursor = app.cursor(Screen::Savings);
    let header = Row::new(
        ["Date", "Amount", "Description"]
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    );

    let rows: Vec<Row> = page
        .history
        .iter()
        .enumerate()
        .skip(cursor.scroll)
        .take(table_rows(chunks[1]))
        .map(|(i, s)| {
            Row::new(vec![
                Cell::from(s.saved_at.format("%Y-%m-%d %H:%M").to_string()),
                Cell::from(Span::styled(format_amount(s.amount), theme::money_style())),
                Cell::from(truncate(&s.description, 48)),
            ])
            .style(theme::row_style(i, Some(cursor.index)))
        })
        .collect();

    let widths = [
        Constraint::Length(18),
        Constraint::Length(18),
        Constraint::Min(20),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(titled_block(format!("History ({})", page.history.len())));
    f.render_widget(table, chunks[1]);
}
