use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::Span,
    widgets::{Cell, Row, Table},
    Frame,
};

use super::{render_card, render_empty, render_loading, table_rows, titled_block};
use crate::models::{Loan, LoanStatus};
use crate::ui::app::{App, Screen};
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn filter_label(status: Option<LoanStatus>) -> &'static str {
    status.map_or("All", |s| s.label())
}

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(page) = &app.loans else {
        render_loading(f, area, "Loans");
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(5)])
        .split(area);
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    let total_savings = app.apply.as_ref().map(|a| a.total_savings);
    render_card(
        f,
        cards[0],
        "Loan Limit",
        page.loan_limit,
        theme::ACCENT,
        Some("3 × total savings".to_string()),
    );
    if let Some(total) = total_savings {
        render_card(f, cards[1], "Total Savings", total, theme::GREEN, None);
    }

    let title = format!("{} Loans ({})", filter_label(page.status), page.loans.len());
    if page.loans.is_empty() {
        render_empty(
            f,
            chunks[1],
            title,
            &["No loans here", "Apply with :apply <amount> <purpose>, f to change filter"],
        );
        return;
    }

    let cursor = app.cursor(Screen::Loans);
    let table = loan_table(&page.loans, cursor.scroll, Some(cursor.index), table_rows(chunks[1]), false)
        .block(titled_block(title));
    f.render_widget(table, chunks[1]);
}

/// Loan rows; the member column is only shown to staff.
pub(crate) fn loan_table(
    loans: &[Loan],
    scroll: usize,
    cursor: Option<usize>,
    height: usize,
    with_member: bool,
) -> Table<'static> {
    let mut headers = vec!["#", "Applied"];
    if with_member {
        headers.push("Member");
    }
    headers.extend(["Amount", "Purpose", "Status", "Due", "Decided By"]);
    let header = Row::new(
        headers
            .into_iter()
            .map(|h| Cell::from(h).style(theme::header_style())),
    );

    let rows: Vec<Row> = loans
        .iter()
        .enumerate()
        .skip(scroll)
        .take(height)
        .map(|(i, loan)| {
            let mut cells = vec![
                Cell::from(loan.id.map(|id| id.to_string()).unwrap_or_default()),
                Cell::from(loan.date_applied.format("%Y-%m-%d").to_string()),
            ];
            if with_member {
                cells.push(Cell::from(loan.username.clone()));
            }
            let decided = match (&loan.approver_name, loan.approval_date) {
                (Some(name), Some(at)) => format!("{name} {}", at.format("%Y-%m-%d")),
                (Some(name), None) => name.clone(),
                _ => String::new(),
            };
            cells.extend([
                Cell::from(format_amount(loan.amount)),
                Cell::from(truncate(&loan.purpose, 30)),
                Cell::from(Span::styled(
                    loan.status.label(),
                    theme::loan_status_style(loan.status),
                )),
                Cell::from(loan.due_date.to_string()),
                Cell::from(decided),
            ]);
            Row::new(cells).style(theme::row_style(i, cursor))
        })
        .collect();

    let mut widths = vec![Constraint::Length(5), Constraint::Length(11)];
    if with_member {
        widths.push(Constraint::Length(14));
    }
    widths.extend([
        Constraint::Length(16),
        Constraint::Min(16),
        Constraint::Length(9),
        Constraint::Length(11),
        Constraint::Length(22),
    ]);

    Table::new(rows, widths).header(header)
}
