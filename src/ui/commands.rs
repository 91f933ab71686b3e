use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use super::app::{App, InputMode, PendingAction, Screen};
use crate::db::Database;
use crate::error::SaccoError;
use crate::export::{self, Ledger};
use crate::models::{parse_amount, Actor, LoanDecision, LoanStatus};
use crate::ui::util::format_amount;
use crate::{auth, clock, loans, savings, targets, welfare};

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &Database) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit Sacco", cmd_quit, r);
    register_command!("quit", "Quit Sacco", cmd_quit, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!("nav", "Open screen navigator", cmd_nav, r);
    register_command!("logout", "Sign out", cmd_logout, r);
    register_command!("refresh", "Reload the current screen", cmd_refresh, r);

    register_command!("d", "Go to Dashboard", cmd_dashboard, r);
    register_command!("dashboard", "Go to Dashboard", cmd_dashboard, r);
    register_command!("s", "Go to Savings", cmd_savings, r);
    register_command!("savings", "Go to Savings", cmd_savings, r);
    register_command!("t", "Go to Targets", cmd_targets, r);
    register_command!("targets", "Go to Targets", cmd_targets, r);
    register_command!("l", "Go to Loans", cmd_loans, r);
    register_command!("loans", "Go to Loans", cmd_loans, r);
    register_command!("w", "Go to Welfare", cmd_welfare, r);
    register_command!("welfare", "Go to Welfare", cmd_welfare, r);

    register_command!(
        "save",
        "Record savings (e.g. :save 1000 January)",
        cmd_save,
        r
    );
    register_command!(
        "target",
        "Set this month's target (e.g. :target 5000)",
        cmd_target,
        r
    );
    register_command!(
        "apply",
        "Apply for a loan (e.g. :apply 2500 school fees)",
        cmd_apply,
        r
    );
    register_command!(
        "contribute",
        "Contribute to welfare (e.g. :contribute 200)",
        cmd_contribute,
        r
    );
    register_command!(
        "status",
        "Filter loans (pending, approved, rejected, all)",
        cmd_status,
        r
    );

    register_command!(
        "approve",
        "Approve selected loan (or :approve <id>)",
        cmd_approve,
        r
    );
    register_command!(
        "reject",
        "Reject selected loan (or :reject <id>)",
        cmd_reject,
        r
    );
    register_command!(
        "promote",
        "Grant staff role (e.g. :promote alice)",
        cmd_promote,
        r
    );
    register_command!(
        "member",
        "Filter records by member (e.g. :member ali)",
        cmd_member,
        r
    );
    register_command!(
        "from",
        "Filter records from date (e.g. :from 2024-01-01)",
        cmd_from,
        r
    );
    register_command!(
        "to",
        "Filter records up to date (e.g. :to 2024-01-31)",
        cmd_to,
        r
    );
    register_command!(
        "clear-filter",
        "Clear member and date filters",
        cmd_clear_filter,
        r
    );
    register_command!(
        "export",
        "Export ledger to CSV (e.g. :export savings ~/savings.csv)",
        cmd_export,
        r
    );

    r
});

/// Run a `:` command. Mistakes the user can fix end up in the status bar;
/// store failures propagate.
pub(crate) fn handle_command(input: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        report((cmd.run)(args, app, db), app)
    } else {
        // Try fuzzy match
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
        Ok(())
    }
}

/// Show user-facing domain errors instead of aborting the session.
pub(crate) fn report(result: anyhow::Result<()>, app: &mut App) -> anyhow::Result<()> {
    match result {
        Err(e) => match e.downcast_ref::<SaccoError>() {
            Some(err) if err.is_user_facing() => {
                app.set_status(err.to_string());
                Ok(())
            }
            _ => Err(e),
        },
        ok => ok,
    }
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

fn signed_in(app: &App) -> Result<Actor, SaccoError> {
    app.actor.clone().ok_or(SaccoError::Unauthenticated)
}

fn staff(app: &App) -> Result<Actor, SaccoError> {
    let actor = signed_in(app)?;
    actor.require_staff()?;
    Ok(actor)
}

/// Switch to `screen` if the signed-in role has it.
pub(crate) fn switch_screen(app: &mut App, db: &Database, screen: Screen) -> anyhow::Result<()> {
    if !app.tabs().contains(&screen) {
        app.set_status(format!("{screen} is not available here"));
        return Ok(());
    }
    app.screen = screen;
    app.refresh(db)?;
    app.set_status(format!("{screen}"));
    Ok(())
}

/// Member screen, or its staff counterpart for staff accounts.
fn go(app: &mut App, db: &Database, member: Screen, staff: Screen) -> anyhow::Result<()> {
    let target = if app.is_staff() { staff } else { member };
    switch_screen(app, db, target)
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _db: &Database) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _db: &Database) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_nav(_args: &str, app: &mut App, _db: &Database) -> anyhow::Result<()> {
    app.nav_index = app
        .tabs()
        .iter()
        .position(|s| *s == app.screen)
        .unwrap_or(0);
    app.show_nav = true;
    Ok(())
}

fn cmd_logout(_args: &str, app: &mut App, _db: &Database) -> anyhow::Result<()> {
    app.sign_out();
    Ok(())
}

fn cmd_refresh(_args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    app.refresh(db)?;
    app.set_status("Refreshed");
    Ok(())
}

fn cmd_dashboard(_args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    go(app, db, Screen::Dashboard, Screen::LoanReview)
}

fn cmd_savings(_args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    go(app, db, Screen::Savings, Screen::SavingsOverview)
}

fn cmd_targets(_args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    go(app, db, Screen::Targets, Screen::SavingsOverview)
}

fn cmd_loans(_args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    go(app, db, Screen::Loans, Screen::LoanReview)
}

fn cmd_welfare(_args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    go(app, db, Screen::Welfare, Screen::WelfareFund)
}

fn cmd_save(args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    let actor = signed_in(app)?;
    let (amount, note) = args.split_once(' ').unwrap_or((args, ""));
    if amount.is_empty() {
        app.set_status("Usage: :save <amount> [note]");
        return Ok(());
    }
    let amount = parse_amount(amount)?;
    let (_, instruction) =
        savings::contribute(db, &actor, amount, note, &app.payment, clock::now())?;
    app.refresh_all(db)?;
    app.set_status(instruction.to_string());
    Ok(())
}

fn cmd_target(args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    let actor = signed_in(app)?;
    if args.is_empty() {
        app.set_status("Usage: :target <amount>");
        return Ok(());
    }
    let amount = parse_amount(args)?;
    let target = targets::set_target(db, &actor, amount, clock::now())?;
    app.refresh_all(db)?;
    app.set_status(format!(
        "Target set to {} for {}",
        format_amount(target.amount),
        target.month_key().long_label()
    ));
    Ok(())
}

fn cmd_apply(args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    let actor = signed_in(app)?;
    let Some((amount, purpose)) = args.split_once(' ') else {
        app.set_status("Usage: :apply <amount> <purpose>");
        return Ok(());
    };
    let amount = parse_amount(amount)?;
    let loan = loans::submit(db, &actor, amount, purpose, clock::now())?;
    app.refresh_all(db)?;
    app.set_status(format!(
        "Loan application submitted: {} for {}, due {}",
        format_amount(loan.amount),
        loan.purpose,
        loan.due_date
    ));
    Ok(())
}

fn cmd_contribute(args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    let actor = signed_in(app)?;
    if args.is_empty() {
        app.set_status("Usage: :contribute <amount>");
        return Ok(());
    }
    let amount = parse_amount(args)?;
    let (_, instruction) = welfare::contribute(db, &actor, amount, &app.payment, clock::now())?;
    app.refresh_all(db)?;
    app.set_status(instruction.to_string());
    Ok(())
}

fn cmd_status(args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    signed_in(app)?;
    app.loan_filter = LoanStatus::parse_filter(args)?;
    let screen = if app.is_staff() {
        Screen::LoanReview
    } else {
        Screen::Loans
    };
    switch_screen(app, db, screen)?;
    app.set_status(format!(
        "Showing {} loans",
        app.loan_filter
            .map_or("all".to_string(), |s| s.label().to_lowercase())
    ));
    Ok(())
}

fn cmd_approve(args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    request_decision(args, app, db, LoanDecision::Approve)
}

fn cmd_reject(args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    request_decision(args, app, db, LoanDecision::Reject)
}

/// Ask for confirmation before deciding a loan: the one named in `args`,
/// otherwise the one under the cursor on the review screen.
pub(crate) fn request_decision(
    args: &str,
    app: &mut App,
    db: &Database,
    decision: LoanDecision,
) -> anyhow::Result<()> {
    staff(app)?;
    let loan = if args.is_empty() {
        if app.screen != Screen::LoanReview {
            app.set_status("Select a loan on Loan Review first");
            return Ok(());
        }
        app.selected_review_loan().cloned()
    } else {
        let id: i64 = args
            .trim_start_matches('#')
            .parse()
            .map_err(|_| SaccoError::validation(format!("'{args}' is not a loan number")))?;
        Some(db.get_loan(id)?.ok_or(SaccoError::LoanNotFound(id))?)
    };

    let Some(loan) = loan else {
        app.set_status("No loan selected");
        return Ok(());
    };
    let Some(id) = loan.id else {
        return Ok(());
    };
    if loan.is_decided() {
        return Err(SaccoError::AlreadyDecided {
            id,
            status: loan.status,
        }
        .into());
    }

    let verb = decision.verb();
    app.confirm_message = format!(
        "{}{} loan #{id} ({}, {} for {})?",
        verb[..1].to_uppercase(),
        &verb[1..],
        loan.username,
        format_amount(loan.amount),
        loan.purpose
    );
    app.pending_action = Some(PendingAction::DecideLoan { id, decision });
    app.input_mode = InputMode::Confirm;
    Ok(())
}

/// Carry out the confirmed action.
pub(crate) fn confirm_pending(app: &mut App, db: &Database) -> anyhow::Result<()> {
    let Some(action) = app.pending_action.take() else {
        return Ok(());
    };
    app.input_mode = InputMode::Normal;
    app.confirm_message.clear();

    let result = match action {
        PendingAction::DecideLoan { id, decision } => decide(app, db, id, decision),
    };
    report(result, app)
}

fn decide(app: &mut App, db: &Database, id: i64, decision: LoanDecision) -> anyhow::Result<()> {
    let actor = staff(app)?;
    let loan = loans::decide(db, &actor, id, decision, clock::now())?;
    app.refresh_all(db)?;
    app.set_status(format!(
        "Loan #{id} {} for {}",
        loan.status.label().to_lowercase(),
        loan.username
    ));
    Ok(())
}

pub(crate) fn cancel_pending(app: &mut App) {
    app.pending_action = None;
    app.input_mode = InputMode::Normal;
    app.confirm_message.clear();
    app.set_status("Cancelled");
}

fn cmd_promote(args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    let actor = staff(app)?;
    if args.is_empty() {
        app.set_status("Usage: :promote <username>");
        return Ok(());
    }
    let user = auth::promote(db, &actor, args)?;
    app.refresh_all(db)?;
    app.set_status(format!("{} is now staff", user.username));
    Ok(())
}

fn cmd_member(args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    staff(app)?;
    app.record_filter.set_username(args);
    refresh_filtered(app, db)
}

fn cmd_from(args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    staff(app)?;
    app.record_filter.set_start(args)?;
    refresh_filtered(app, db)
}

fn cmd_to(args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    staff(app)?;
    app.record_filter.set_end(args)?;
    refresh_filtered(app, db)
}

fn cmd_clear_filter(_args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    staff(app)?;
    app.record_filter = Default::default();
    refresh_filtered(app, db)
}

fn refresh_filtered(app: &mut App, db: &Database) -> anyhow::Result<()> {
    if !matches!(app.screen, Screen::SavingsOverview | Screen::WelfareFund) {
        app.screen = Screen::SavingsOverview;
    }
    app.refresh_screen(db, Screen::SavingsOverview)?;
    app.refresh_screen(db, Screen::WelfareFund)?;
    app.set_status(if app.record_filter.is_empty() {
        "Filter cleared".to_string()
    } else {
        format!("Filter: {}", app.record_filter.describe())
    });
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, db: &Database) -> anyhow::Result<()> {
    let actor = staff(app)?;
    let Some((ledger, path)) = args.split_once(' ') else {
        app.set_status("Usage: :export <savings|welfare> <path>");
        return Ok(());
    };
    let Some(ledger) = Ledger::parse(ledger) else {
        app.set_status(format!("Unknown ledger '{ledger}'. Use savings or welfare"));
        return Ok(());
    };
    let path = crate::run::shellexpand(path.trim());
    let count = export::export(db, &actor, ledger, &app.record_filter, Path::new(&path))?;
    app.set_status(format!("Exported {count} {ledger} rows to {path}"));
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
