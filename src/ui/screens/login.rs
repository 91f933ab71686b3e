use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::titled_block;
use crate::ui::app::{App, InputMode, LoginField};
use crate::ui::theme;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let form = &app.login;
    let title = if form.registering {
        "Create member account"
    } else {
        "Sign in"
    };

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(10),
            Constraint::Min(0),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(48),
            Constraint::Min(0),
        ])
        .split(vertical[1]);
    let panel = horizontal[1];

    let field_line = |label: &str, value: String, field: LoginField| {
        let active = form.field == field;
        let marker = if active { "▸ " } else { "  " };
        let value_style = if active {
            Style::default().fg(theme::TEXT).add_modifier(Modifier::BOLD)
        } else {
            theme::normal_style()
        };
        Line::from(vec![
            Span::styled(format!("{marker}{label:<10}"), theme::dim_style()),
            Span::styled(value, value_style),
        ])
    };

    let masked = "•".repeat(form.password.chars().count());
    let toggle_hint = if form.registering {
        "Ctrl-r back to sign in"
    } else {
        "Ctrl-r create an account"
    };

    let lines = vec![
        Line::from(""),
        field_line("Username", form.username.clone(), LoginField::Username),
        field_line("Password", masked, LoginField::Password),
        Line::from(""),
        Line::from(Span::styled(
            "Enter submit · Tab switch field",
            theme::dim_style(),
        )),
        Line::from(Span::styled(toggle_hint, theme::dim_style())),
    ];

    f.render_widget(Paragraph::new(lines).block(titled_block(title)), panel);

    if app.input_mode == InputMode::Normal {
        let (row, len) = match form.field {
            LoginField::Username => (2, form.username.chars().count()),
            LoginField::Password => (3, form.password.chars().count()),
        };
        // Border plus the marker and label columns
        let x = panel.x + 1 + 12 + len as u16;
        if x < panel.x + panel.width.saturating_sub(1) {
            f.set_cursor_position((x, panel.y + row));
        }
    }
}
