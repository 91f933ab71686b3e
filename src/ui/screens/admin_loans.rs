use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::loans::{filter_label, loan_table};
use super::{render_empty, render_loading, table_rows, titled_block};
use crate::ui::app::{App, Screen};
use crate::ui::theme;
use crate::ui::util::format_amount;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(page) = &app.loan_review else {
        render_loading(f, area, "Loan Review");
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    let mut summary: Vec<Span> = Vec::new();
    for s in &page.summary {
        summary.push(Span::styled(
            format!(" {} ", s.status.label()),
            theme::loan_status_style(s.status),
        ));
        summary.push(Span::styled(
            format!("{} · {}   ", s.count, format_amount(s.total)),
            Style::default().fg(theme::TEXT),
        ));
    }
    f.render_widget(
        Paragraph::new(Line::from(summary)).block(titled_block("All Loans")),
        chunks[0],
    );

    let title = format!("{} Loans ({})", filter_label(page.status), page.loans.len());
    if page.loans.is_empty() {
        render_empty(
            f,
            chunks[1],
            title,
            &["Nothing to review", "Press f or use :status to change the filter"],
        );
        return;
    }

    let cursor = app.cursor(Screen::LoanReview);
    let table = loan_table(
        &page.loans,
        cursor.scroll,
        Some(cursor.index),
        table_rows(chunks[1]),
        true,
    )
    .block(titled_block(title));
    f.render_widget(table, chunks[1]);
}
