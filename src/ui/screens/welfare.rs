use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Cell, Row, Table},
    Frame,
};

use super::{render_card, render_empty, render_loading, table_rows, titled_block};
use crate::models::WelfareContribution;
use crate::ui::app::{App, Screen};
use crate::ui::theme;
use crate::ui::util::format_amount;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(page) = &app.welfare else {
        render_loading(f, area, "Welfare");
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
        "My Welfare Contributions",
        page.summary.total,
        theme::GREEN,
        Some(format!("as of {}", page.month.long_label())),
    );
    render_empty(
        f,
        top[1],
        "Contribute",
        &["Add to the welfare fund with :contribute <amount>"],
    );

    let contributions = &page.summary.contributions;
    if contributions.is_empty() {
        render_empty(f, chunks[1], "History (0)", &["No welfare contributions yet"]);
        return;
    }

    let cursor = app.cursor(Screen::Welfare);
    let table = contribution_table(
        contributions,
        cursor.scroll,
        Some(cursor.index),
        table_rows(chunks[1]),
        false,
    )
    .block(titled_block(format!("History ({})", contributions.len())));
    f.render_widget(table, chunks[1]);
}

pub(crate) fn contribution_table(
    rows: &[WelfareContribution],
    scroll: usize,
    cursor: Option<usize>,
    height: usize,
    with_member: bool,
) -> Table<'static> {
    let mut headers = vec!["Date"];
    if with_member {
        headers.push("Member");
    }
    headers.push("Amount");
    let header = Row::new(
        headers
            .into_iter()
            .map(|h| Cell::from(h).style(theme::header_style())),
    );

    let body: Vec<Row> = rows
        .iter()
        .enumerate()
        .skip(scroll)
        .take(height)
        .map(|(i, c)| {
            let mut cells = vec![Cell::from(
                c.contributed_at.format("%Y-%m-%d %H:%M").to_string(),
            )];
            if with_member {
                cells.push(Cell::from(c.username.clone()));
            }
            cells.push(Cell::from(format_amount(c.amount)).style(theme::money_style()));
            Row::new(cells).style(theme::row_style(i, cursor))
        })
        .collect();

    let mut widths = vec![Constraint::Length(18)];
    if with_member {
        widths.push(Constraint::Length(18));
    }
    widths.push(Constraint::Min(16));

    Table::new(body, widths).header(header)
}
