use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use super::admin_savings::{render_filter_line, render_monthly_chart};
use super::welfare::contribution_table;
use super::{render_empty, render_loading, table_rows, titled_block};
use crate::ui::app::{App, Screen};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(page) = &app.welfare_fund else {
        render_loading(f, area, "Welfare Fund");
        return;
    };
    let summary = &page.summary;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(10),
            Constraint::Min(5),
        ])
        .split(area);

    render_filter_line(f, chunks[0], &page.filter, summary.total, "Welfare Fund");
    render_monthly_chart(f, chunks[1], &summary.monthly, "Monthly Contributions");

    if summary.contributions.is_empty() {
        render_empty(f, chunks[2], "Contributions (0)", &["No contributions match the filter"]);
        return;
    }
    let cursor = app.cursor(Screen::WelfareFund);
    let table = contribution_table(
        &summary.contributions,
        cursor.scroll,
        Some(cursor.index),
        table_rows(chunks[2]),
        true,
    )
    .block(titled_block(format!(
        "Contributions ({})",
        summary.contributions.len()
    )));
    f.render_widget(table, chunks[2]);
}
