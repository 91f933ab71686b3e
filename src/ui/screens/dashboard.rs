use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Gauge, Paragraph},
    Frame,
};

use super::{render_card, render_empty, render_loading, titled_block};
use crate::aggregate::TargetChart;
use crate::pages::{ApplyLoanPage, DashboardPage};
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, ratio};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(page) = &app.dashboard else {
        render_loading(f, area, "Dashboard");
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Summary cards
            Constraint::Length(4), // Progress
            Constraint::Min(8),    // Target chart
        ])
        .split(area);

    render_summary_cards(f, chunks[0], page, app.apply.as_ref());
    render_progress(f, chunks[1], page);
    render_target_chart(f, chunks[2], &page.chart);
}

fn render_summary_cards(f: &mut Frame, area: Rect, page: &DashboardPage, apply: Option<&ApplyLoanPage>) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let progress = &page.month.progress;
    let month = page.month.month.label();

    render_card(
        f,
        cards[0],
        "Saved",
        progress.saved,
        theme::GREEN,
        Some(month.clone()),
    );
    render_card(
        f,
        cards[1],
        "Target",
        progress.target,
        theme::ACCENT,
        Some(if page.month.target.is_some() {
            month
        } else {
            "not set".to_string()
        }),
    );
    render_card(
        f,
        cards[2],
        "Remaining",
        progress.remaining,
        theme::YELLOW,
        None,
    );
    if let Some(apply) = apply {
        render_card(
            f,
            cards[3],
            "Loan Limit",
            apply.loan_limit,
            theme::ACCENT,
            Some(format!("savings {}", format_amount(apply.total_savings))),
        );
    }
}

fn render_progress(f: &mut Frame, area: Rect, page: &DashboardPage) {
    let month = &page.month;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1)])
        .split(area);

    let title = format!("{} progress", month.month.long_label());
    if month.target.is_none() {
        let hint = Paragraph::new(Line::from(Span::styled(
            "No target for this month. Set one with :target <amount>",
            theme::dim_style(),
        )))
        .block(titled_block(title));
        f.render_widget(hint, rows[0]);
    } else {
        let p = &month.progress;
        let gauge = Gauge::default()
            .block(titled_block(title))
            .gauge_style(Style::default().fg(theme::GREEN).bg(theme::SURFACE))
            .ratio(ratio(p.saved, p.target))
            .label(format!(
                "{}% of {} ({} to go)",
                p.percent,
                format_amount(p.target),
                format_amount(p.remaining)
            ));
        f.render_widget(gauge, rows[0]);
    }

    if month.warning {
        let warning = Paragraph::new(Line::from(Span::styled(
            " You haven't saved anything this month. Record a contribution with :save",
            theme::warning_style(),
        )));
        f.render_widget(warning, rows[1]);
    }
}

/// Saved (green) beside target (blue) for every month a target exists.
pub(crate) fn render_target_chart(f: &mut Frame, area: Rect, chart: &TargetChart) {
    if chart.is_empty() {
        render_empty(
            f,
            area,
            "Savings vs Target",
            &["No targets yet. Set one with :target <amount>"],
        );
        return;
    }

    // Most recent months that fit, two bars and a gap each
    let fit = (area.width.saturating_sub(2) / 13).max(1) as usize;
    let skip = chart.labels.len().saturating_sub(fit);

    let groups: Vec<BarGroup> = chart
        .labels
        .iter()
        .zip(chart.savings.iter().zip(chart.targets.iter()))
        .skip(skip)
        .map(|(label, (saved, target))| {
            BarGroup::default()
                .label(Line::from(label.clone()))
                .bars(&[bar(*saved, theme::GREEN), bar(*target, theme::ACCENT)])
        })
        .collect();

    let mut widget = BarChart::default()
        .block(titled_block("Savings vs Target"))
        .bar_width(5)
        .bar_gap(1)
        .group_gap(2)
        .value_style(
            Style::default()
                .fg(theme::HEADER_BG)
                .add_modifier(Modifier::BOLD),
        );
    for group in groups {
        widget = widget.data(group);
    }

    f.render_widget(widget, area);
}

fn bar(value: f64, color: ratatui::style::Color) -> Bar<'static> {
    let value = if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    };
    Bar::default()
        .value(value)
        .style(Style::default().fg(color))
        .text_value(String::new())
}
