use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Cell, Paragraph, Row, Table},
    Frame,
};

use super::{render_empty, render_loading, table_rows, titled_block};
use crate::aggregate::chart_points;
use crate::models::{MonthTotal, RecordFilter};
use crate::ui::app::{App, Screen};
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(page) = &app.savings_overview else {
        render_loading(f, area, "Savings Overview");
        return;
    };
    let overview = &page.overview;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(10)])
        .split(area);
    render_filter_line(f, chunks[0], &page.filter, overview.total, "Total Savings");

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(cols[0]);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(5)])
        .split(cols[1]);

    // Per-member totals
    let header = Row::new(
        ["Member", "Total"]
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    );
    let rows: Vec<Row> = overview
        .per_user
        .iter()
        .take(table_rows(left[0]))
        .enumerate()
        .map(|(i, u)| {
            Row::new(vec![
                Cell::from(u.username.clone()),
                Cell::from(format_amount(u.total)),
            ])
            .style(theme::row_style(i, None))
        })
        .collect();
    f.render_widget(
        Table::new(rows, [Constraint::Min(12), Constraint::Length(18)])
            .header(header)
            .block(titled_block("Savings per Member")),
        left[0],
    );

    // Who met this month's target
    let header = Row::new(
        ["Member", "Saved", "Target", ""]
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    );
    let rows: Vec<Row> = page
        .members
        .iter()
        .take(table_rows(left[1]))
        .enumerate()
        .map(|(i, m)| {
            let mark = if m.met_target {
                Span::styled("✓", Style::default().fg(theme::GREEN))
            } else {
                Span::styled("✗", Style::default().fg(theme::RED))
            };
            Row::new(vec![
                Cell::from(m.username.clone()),
                Cell::from(format_amount(m.saved)),
                Cell::from(format_amount(m.target)),
                Cell::from(mark),
            ])
            .style(theme::row_style(i, None))
        })
        .collect();
    f.render_widget(
        Table::new(
            rows,
            [
                Constraint::Min(10),
                Constraint::Length(16),
                Constraint::Length(16),
                Constraint::Length(2),
            ],
        )
        .header(header)
        .block(titled_block(format!("{} Targets", page.month.label()))),
        left[1],
    );

    render_monthly_chart(f, right[0], &overview.monthly, "Monthly Savings");

    if overview.records.is_empty() {
        render_empty(f, right[1], "Records (0)", &["No savings match the filter"]);
        return;
    }
    let cursor = app.cursor(Screen::SavingsOverview);
    let header = Row::new(
        ["Date", "Member", "Amount", "Description"]
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    );
    let rows: Vec<Row> = overview
        .records
        .iter()
        .enumerate()
        .skip(cursor.scroll)
        .take(table_rows(right[1]))
        .map(|(i, s)| {
            Row::new(vec![
                Cell::from(s.saved_at.format("%Y-%m-%d").to_string()),
                Cell::from(s.username.clone()),
                Cell::from(format_amount(s.amount)),
                Cell::from(truncate(&s.description, 24)),
            ])
            .style(theme::row_style(i, Some(cursor.index)))
        })
        .collect();
    f.render_widget(
        Table::new(
            rows,
            [
                Constraint::Length(11),
                Constraint::Length(12),
                Constraint::Length(16),
                Constraint::Min(10),
            ],
        )
        .header(header)
        .block(titled_block(format!("Records ({})", overview.records.len()))),
        right[1],
    );
}

/// Active filter and the grand total it produces.
pub(crate) fn render_filter_line(
    f: &mut Frame,
    area: Rect,
    filter: &RecordFilter,
    total: rust_decimal::Decimal,
    label: &str,
) {
    let filter_text = if filter.is_empty() {
        "none (:member, :from, :to)".to_string()
    } else {
        filter.describe()
    };
    let line = Line::from(vec![
        Span::styled(format!("{label}: "), theme::dim_style()),
        Span::styled(
            format_amount(total),
            theme::money_style().add_modifier(Modifier::BOLD),
        ),
        Span::styled("   Filter: ", theme::dim_style()),
        Span::styled(filter_text, theme::normal_style()),
    ]);
    f.render_widget(Paragraph::new(line).block(titled_block("Overview")), area);
}

pub(crate) fn render_monthly_chart(f: &mut Frame, area: Rect, series: &[MonthTotal], title: &str) {
    let points = chart_points(series);
    if points.is_empty() {
        render_empty(f, area, title, &["No data yet"]);
        return;
    }

    let fit = (area.width.saturating_sub(2) / 9).max(1) as usize;
    let skip = points.len().saturating_sub(fit);
    let bars: Vec<Bar> = points
        .iter()
        .skip(skip)
        .map(|(label, value)| {
            let value = if value.is_finite() && *value > 0.0 {
                value.round() as u64
            } else {
                0
            };
            Bar::default()
                .value(value)
                .label(Line::from(label.clone()))
                .style(Style::default().fg(theme::ACCENT))
                .text_value(String::new())
        })
        .collect();

    let chart = BarChart::default()
        .block(titled_block(title))
        .data(BarGroup::default().bars(&bars))
        .bar_width(8)
        .bar_gap(1);
    f.render_widget(chart, area);
}
