use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use rust_decimal::Decimal;

use crate::ui::theme;
use crate::ui::util::format_amount;

pub(crate) mod admin_loans;
pub(crate) mod admin_savings;
pub(crate) mod admin_welfare;
pub(crate) mod dashboard;
pub(crate) mod loans;
pub(crate) mod login;
pub(crate) mod savings;
pub(crate) mod targets;
pub(crate) mod welfare;

pub(crate) fn titled_block(title: impl Into<String>) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            format!(" {} ", title.into()),
            theme::title_style(),
        ))
}

/// A bordered box with centred, dimmed hint lines.
pub(crate) fn render_empty(f: &mut Frame, area: Rect, title: impl Into<String>, hints: &[&str]) {
    let mut lines = vec![Line::from("")];
    for hint in hints {
        lines.push(Line::from(Span::styled(hint.to_string(), theme::dim_style())));
        lines.push(Line::from(""));
    }
    f.render_widget(
        Paragraph::new(lines).centered().block(titled_block(title)),
        area,
    );
}

pub(crate) fn render_loading(f: &mut Frame, area: Rect, title: &str) {
    render_empty(f, area, title, &["Loading…"]);
}

/// A headline figure in a bordered card.
pub(crate) fn render_card(
    f: &mut Frame,
    area: Rect,
    title: &str,
    amount: Decimal,
    color: Color,
    subtitle: Option<String>,
) {
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format_amount(amount),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(subtitle.unwrap_or_default(), theme::dim_style())),
    ])
    .centered()
    .block(titled_block(title));

    f.render_widget(text, area);
}

/// Rows of a table that fit in `area` below its border and header.
pub(crate) fn table_rows(area: Rect) -> usize {
    area.height.saturating_sub(3) as usize
}
