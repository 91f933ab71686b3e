use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::auth;
use crate::clock;
use crate::config::Config;
use crate::db::Database;
use crate::models::{LoanDecision, LoanStatus};
use crate::ui::app::{App, InputMode, LoginField, Screen};
use crate::ui::commands;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

pub(crate) fn as_tui(db: &Database, config: &Config) -> Result<()> {
    let mut app = App::new(config.payment.clone());
    log::info!("TUI session started");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, db);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        log::error!("TUI aborted: {e:#}");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    db: &Database,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            let content_height = f.area().height.saturating_sub(3) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            if app.show_help {
                app.show_help = false;
                continue;
            }
            if app.show_nav {
                handle_nav_input(key, app, db)?;
                continue;
            }
            match app.input_mode {
                InputMode::Normal if app.screen == Screen::Login => {
                    handle_login_input(key, app, db)?
                }
                InputMode::Normal => handle_normal_input(key, app, db)?,
                InputMode::Command => handle_command_input(key, app, db)?,
                InputMode::Confirm => handle_confirm_input(key, app, db)?,
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.code == KeyCode::Char(c) && key.modifiers.contains(KeyModifiers::CONTROL)
}

fn handle_login_input(key: KeyEvent, app: &mut App, db: &Database) -> Result<()> {
    if is_ctrl(&key, 'q') || is_ctrl(&key, 'c') {
        app.running = false;
        return Ok(());
    }
    if is_ctrl(&key, 'r') {
        app.login.registering = !app.login.registering;
        app.set_status(if app.login.registering {
            "Choose a username and password for your member account"
        } else {
            "Sign in"
        });
        return Ok(());
    }

    match key.code {
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => app.login.toggle_field(),
        KeyCode::Enter => {
            if app.login.field == LoginField::Username {
                app.login.toggle_field();
            } else {
                let result = submit_login(app, db);
                commands::report(result, app)?;
            }
        }
        KeyCode::Esc => {
            app.login.password.clear();
            app.login.field = Default::default();
        }
        KeyCode::Backspace => {
            app.login.active_input().pop();
        }
        KeyCode::Char(c) => app.login.active_input().push(c),
        _ => {}
    }
    Ok(())
}

fn submit_login(app: &mut App, db: &Database) -> Result<()> {
    let username = app.login.username.trim().to_string();
    let password = app.login.password.clone();
    // Wipe the typed password whether or not it works
    app.login.password.clear();

    if app.login.registering {
        auth::register(db, &username, &password, false, None, clock::now())?;
    }
    let actor = auth::authenticate(db, &username, &password)?;
    app.sign_in(actor, db)?;
    Ok(())
}

fn handle_normal_input(key: KeyEvent, app: &mut App, db: &Database) -> Result<()> {
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => page_down(app),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => page_up(app),
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('g') | KeyCode::Home => handle_goto_top(app),
        KeyCode::Char('G') | KeyCode::End => handle_goto_bottom(app),
        KeyCode::Char(c @ '1'..='9') => {
            let idx = (c as usize) - ('1' as usize);
            if let Some(&screen) = app.tabs().get(idx) {
                commands::switch_screen(app, db, screen)?;
            }
        }
        KeyCode::Tab => cycle_tab(app, db, true)?,
        KeyCode::BackTab => cycle_tab(app, db, false)?,
        KeyCode::Char('f') if matches!(app.screen, Screen::Loans | Screen::LoanReview) => {
            app.loan_filter = next_loan_filter(app.loan_filter);
            commands::report(app.refresh(db).map_err(Into::into), app)?;
            app.set_status(format!(
                "Showing {} loans",
                app.loan_filter
                    .map_or("all".to_string(), |s| s.label().to_lowercase())
            ));
        }
        KeyCode::Char('a') if app.screen == Screen::LoanReview => {
            let result = commands::request_decision("", app, db, LoanDecision::Approve);
            commands::report(result, app)?;
        }
        KeyCode::Char('x') if app.screen == Screen::LoanReview => {
            let result = commands::request_decision("", app, db, LoanDecision::Reject);
            commands::report(result, app)?;
        }
        KeyCode::Esc => app.set_status(""),
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: KeyEvent, app: &mut App, db: &Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, db)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let trimmed = app.command_input.trim_end();
            if let Some(pos) = trimmed.rfind(' ') {
                app.command_input.truncate(pos + 1);
            } else {
                app.command_input.clear();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_nav_input(key: KeyEvent, app: &mut App, db: &Database) -> Result<()> {
    let screens = app.tabs();
    match key.code {
        KeyCode::Char(c @ '1'..='9') => {
            let idx = (c as usize) - ('1' as usize);
            if let Some(&screen) = screens.get(idx) {
                app.show_nav = false;
                commands::switch_screen(app, db, screen)?;
            }
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.nav_index + 1 < screens.len() {
                app.nav_index += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.nav_index = app.nav_index.saturating_sub(1);
        }
        KeyCode::Enter => {
            if let Some(&screen) = screens.get(app.nav_index) {
                app.show_nav = false;
                commands::switch_screen(app, db, screen)?;
            }
        }
        _ => {
            app.show_nav = false;
        }
    }
    Ok(())
}

fn handle_confirm_input(key: KeyEvent, app: &mut App, db: &Database) -> Result<()> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => commands::confirm_pending(app, db)?,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => commands::cancel_pending(app),
        _ => {}
    }
    Ok(())
}

// ── Navigation helpers ───────────────────────────────────────

fn cycle_tab(app: &mut App, db: &Database, forward: bool) -> Result<()> {
    let screens = app.tabs();
    let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
    let next = if forward {
        (idx + 1) % screens.len()
    } else if idx == 0 {
        screens.len() - 1
    } else {
        idx - 1
    };
    commands::switch_screen(app, db, screens[next])
}

/// Pending → Approved → Rejected → all → Pending.
fn next_loan_filter(current: Option<LoanStatus>) -> Option<LoanStatus> {
    match current {
        Some(LoanStatus::Pending) => Some(LoanStatus::Approved),
        Some(LoanStatus::Approved) => Some(LoanStatus::Rejected),
        Some(LoanStatus::Rejected) => None,
        None => Some(LoanStatus::Pending),
    }
}

fn handle_move_down(app: &mut App) {
    let (len, page) = (app.list_len(app.screen), app.page_size());
    let cursor = app.cursor_mut(app.screen);
    scroll_down(&mut cursor.index, &mut cursor.scroll, len, page);
}

fn handle_move_up(app: &mut App) {
    let cursor = app.cursor_mut(app.screen);
    scroll_up(&mut cursor.index, &mut cursor.scroll);
}

fn page_down(app: &mut App) {
    let (len, page) = (app.list_len(app.screen), app.page_size());
    let cursor = app.cursor_mut(app.screen);
    for _ in 0..page {
        scroll_down(&mut cursor.index, &mut cursor.scroll, len, page);
    }
}

fn page_up(app: &mut App) {
    let page = app.page_size();
    let cursor = app.cursor_mut(app.screen);
    for _ in 0..page {
        scroll_up(&mut cursor.index, &mut cursor.scroll);
    }
}

fn handle_goto_top(app: &mut App) {
    let cursor = app.cursor_mut(app.screen);
    scroll_to_top(&mut cursor.index, &mut cursor.scroll);
}

fn handle_goto_bottom(app: &mut App) {
    let (len, page) = (app.list_len(app.screen), app.page_size());
    let cursor = app.cursor_mut(app.screen);
    scroll_to_bottom(&mut cursor.index, &mut cursor.scroll, len, page);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loan_filter_cycle_returns_to_pending() {
        let mut filter = Some(LoanStatus::Pending);
        let mut seen = Vec::new();
        for _ in 0..4 {
            filter = next_loan_filter(filter);
            seen.push(filter);
        }
        assert_eq!(
            seen,
            vec![
                Some(LoanStatus::Approved),
                Some(LoanStatus::Rejected),
                None,
                Some(LoanStatus::Pending),
            ]
        );
    }
}
