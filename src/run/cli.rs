use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::config::Config;
use crate::db::Database;
use crate::export::{self, Ledger};
use crate::models::{parse_amount, Actor, LoanDecision, Loan, RecordFilter, WelfareContribution};
use crate::ui::util::{format_amount, progress_bar, ratio, truncate};
use crate::{auth, clock, loans, pages, savings, targets, welfare};

/// Flags that take a value; everything else that doesn't start with `--` is positional.
const VALUE_FLAGS: &[&str] = &["--user", "--note", "--status", "--member", "--from", "--to"];

pub(crate) fn as_cli(args: &[String], db: &Database, config: &Config) -> Result<()> {
    let rest = &args[2..];
    match args[1].as_str() {
        "register" => cli_register(rest, db),
        "dashboard" | "d" => cli_dashboard(rest, db),
        "save" => cli_save(rest, db, config),
        "target" => cli_target(rest, db),
        "targets" => cli_targets(rest, db),
        "limit" => cli_limit(rest, db),
        "apply" => cli_apply(rest, db),
        "loans" => cli_loans(rest, db),
        "welfare" => cli_welfare(rest, db, config),
        "admin" => cli_admin(rest, db),
        "approve" => cli_decide(rest, db, LoanDecision::Approve),
        "reject" => cli_decide(rest, db, LoanDecision::Reject),
        "promote" => cli_promote(rest, db),
        "export" => cli_export(rest, db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("sacco {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("Sacco — savings, loans and welfare for a savings group");
    println!();
    println!("Usage: sacco [command] [--user <name>]");
    println!();
    println!("Commands:");
    println!("  (none)                          Launch interactive TUI");
    println!("  register <username> [--staff]   Create an account (staff needs a staff --user,");
    println!("                                  except for the very first one)");
    println!("  dashboard                       This month's target, savings and loan limit");
    println!("  save <amount> [--note <text>]   Record a savings contribution");
    println!("  target <amount>                 Set this month's savings target");
    println!("  targets                         Target history against actual savings");
    println!("  limit                           Show your loan limit");
    println!("  apply <amount> <purpose...>     Apply for a loan");
    println!("  loans [--status <s>]            Your loans (pending, approved, rejected, all)");
    println!("  welfare [amount]                Welfare summary, or contribute an amount");
    println!();
    println!("Staff:");
    println!("  admin loans [--status <s>]      Loan applications (default: pending)");
    println!("  admin savings [filters]         Savings overview");
    println!("  admin welfare [filters]         Welfare fund overview");
    println!("  admin members                   List member accounts");
    println!("  approve <id> | reject <id>      Decide a pending loan");
    println!("  promote <username>              Grant the staff role");
    println!("  export savings|welfare <path> [filters]");
    println!("                                  Write a ledger to CSV");
    println!("  filters: --member <text> --from <YYYY-MM-DD> --to <YYYY-MM-DD>");
    println!();
    println!("  --help, -h                      Show this help");
    println!("  --version, -V                   Show version");
    println!();
    println!("Passwords are read from SACCO_PASSWORD (SACCO_NEW_PASSWORD when registering)");
    println!("or prompted for on stdin.");
}

// ── Argument helpers ─────────────────────────────────────────

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
        } else if VALUE_FLAGS.contains(&arg.as_str()) {
            skip_next = true;
        } else if !arg.starts_with("--") {
            out.push(arg.as_str());
        }
    }
    out
}

fn record_filter(args: &[String]) -> Result<RecordFilter> {
    let mut filter = RecordFilter::default();
    if let Some(member) = flag_value(args, "--member") {
        filter.set_username(member);
    }
    if let Some(from) = flag_value(args, "--from") {
        filter.set_start(from)?;
    }
    if let Some(to) = flag_value(args, "--to") {
        filter.set_end(to)?;
    }
    Ok(filter)
}

fn read_secret(env_key: &str, prompt: &str) -> Result<String> {
    if let Ok(value) = std::env::var(env_key) {
        return Ok(value);
    }
    eprint!("{prompt}");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Authenticate the `--user` given on the command line.
fn acting_user(args: &[String], db: &Database) -> Result<Actor> {
    let username = flag_value(args, "--user")
        .map(str::to_string)
        .or_else(|| std::env::var("SACCO_USER").ok())
        .ok_or_else(|| anyhow::anyhow!("This command needs --user <name>"))?;
    let password = read_secret("SACCO_PASSWORD", &format!("Password for {username}: "))?;
    Ok(auth::authenticate(db, &username, &password)?)
}

fn amount_arg(args: &[String], usage: &str) -> Result<rust_decimal::Decimal> {
    let raw = positionals(args)
        .first()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("Usage: {usage}"))?;
    Ok(parse_amount(raw)?)
}

// ── Member commands ──────────────────────────────────────────

fn cli_register(args: &[String], db: &Database) -> Result<()> {
    let username = positionals(args)
        .first()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("Usage: sacco register <username> [--staff] [--user <staff>]"))?;
    let staff = has_flag(args, "--staff");

    let creator = if flag_value(args, "--user").is_some() {
        Some(acting_user(args, db)?)
    } else {
        None
    };
    let password = read_secret(
        "SACCO_NEW_PASSWORD",
        &format!("New password for {username}: "),
    )?;

    let user = auth::register(db, username, &password, staff, creator.as_ref(), clock::now())?;
    println!("Created {} account '{}'", user.role(), user.username);
    Ok(())
}

fn cli_dashboard(args: &[String], db: &Database) -> Result<()> {
    let actor = acting_user(args, db)?;
    let today = clock::now().date();
    let page = pages::dashboard(db, &actor, today)?;
    let apply = pages::apply_loan(db, &actor)?;
    let month = &page.month;
    let p = &month.progress;

    println!("Sacco — {} ({})", actor.username, month.month.long_label());
    println!("{}", "─".repeat(40));
    match &month.target {
        Some(_) => {
            println!("  Target:      {}", format_amount(p.target));
            println!("  Saved:       {}", format_amount(p.saved));
            println!(
                "  Progress:    {} {}%",
                progress_bar(ratio(p.saved, p.target), 20),
                p.percent
            );
            println!("  Remaining:   {}", format_amount(p.remaining));
        }
        None => {
            println!("  Saved:       {}", format_amount(p.saved));
            println!("  No target set for this month (sacco target <amount>)");
        }
    }
    println!("  Total saved: {}", format_amount(apply.total_savings));
    println!("  Loan limit:  {}", format_amount(apply.loan_limit));
    if month.warning {
        println!();
        println!("  ! You haven't saved anything this month.");
    }
    Ok(())
}

fn cli_save(args: &[String], db: &Database, config: &Config) -> Result<()> {
    let amount = amount_arg(args, "sacco save <amount> [--note <text>]")?;
    let actor = acting_user(args, db)?;
    let note = flag_value(args, "--note").unwrap_or("");
    let (record, instruction) =
        savings::contribute(db, &actor, amount, note, &config.payment, clock::now())?;
    println!(
        "Recorded {} on {}",
        format_amount(record.amount),
        record.saved_at.format("%Y-%m-%d %H:%M")
    );
    println!("{instruction}");
    Ok(())
}

fn cli_target(args: &[String], db: &Database) -> Result<()> {
    let amount = amount_arg(args, "sacco target <amount>")?;
    let actor = acting_user(args, db)?;
    let target = targets::set_target(db, &actor, amount, clock::now())?;
    println!(
        "Target for {} set to {}",
        target.month_key().long_label(),
        format_amount(target.amount)
    );
    Ok(())
}

fn cli_targets(args: &[String], db: &Database) -> Result<()> {
    let actor = acting_user(args, db)?;
    let page = pages::target_history(db, &actor, clock::now().date())?;
    if page.targets.is_empty() {
        println!("No targets set");
        return Ok(());
    }

    println!("{:<10} {:>18} {:>18}", "Month", "Target", "Saved");
    println!("{}", "─".repeat(48));
    let chart = &page.chart;
    for (i, label) in chart.labels.iter().enumerate() {
        let target = chart.targets.get(i).copied().unwrap_or_default();
        let saved = chart.savings.get(i).copied().unwrap_or_default();
        println!("{label:<10} {target:>18.2} {saved:>18.2}");
    }
    Ok(())
}

fn cli_limit(args: &[String], db: &Database) -> Result<()> {
    let actor = acting_user(args, db)?;
    let page = pages::apply_loan(db, &actor)?;
    println!("Total savings: {}", format_amount(page.total_savings));
    println!(
        "Loan limit:    {} ({}× savings)",
        format_amount(page.loan_limit),
        loans::LOAN_LIMIT_MULTIPLIER
    );
    Ok(())
}

fn cli_apply(args: &[String], db: &Database) -> Result<()> {
    let usage = "sacco apply <amount> <purpose...>";
    let amount = amount_arg(args, usage)?;
    let purpose = positionals(args)[1..].join(" ");
    let actor = acting_user(args, db)?;
    let loan = loans::submit(db, &actor, amount, &purpose, clock::now())?;
    println!(
        "Loan #{} for {} submitted, due {}. Status: {}",
        loan.id.unwrap_or_default(),
        format_amount(loan.amount),
        loan.due_date,
        loan.status
    );
    Ok(())
}

fn cli_loans(args: &[String], db: &Database) -> Result<()> {
    let actor = acting_user(args, db)?;
    let status = pages::loan_filter(flag_value(args, "--status"))?;
    let page = pages::user_loans(db, &actor, status)?;
    println!("Loan limit: {}", format_amount(page.loan_limit));
    print_loans(&page.loans, false);
    Ok(())
}

fn cli_welfare(args: &[String], db: &Database, config: &Config) -> Result<()> {
    let actor = acting_user(args, db)?;
    if let Some(raw) = positionals(args).first() {
        let amount = parse_amount(raw)?;
        let (_, instruction) =
            welfare::contribute(db, &actor, amount, &config.payment, clock::now())?;
        println!("Recorded welfare contribution of {}", format_amount(amount));
        println!("{instruction}");
        return Ok(());
    }

    let page = pages::welfare(db, &actor, clock::now().date())?;
    println!("Welfare contributions: {}", format_amount(page.summary.total));
    print_contributions(&page.summary.contributions, false);
    Ok(())
}

// ── Staff commands ───────────────────────────────────────────

fn cli_admin(args: &[String], db: &Database) -> Result<()> {
    let Some(view) = args.first() else {
        anyhow::bail!("Usage: sacco admin loans|savings|welfare|members [options]");
    };
    let rest = &args[1..];
    match view.as_str() {
        "loans" => {
            let actor = acting_user(rest, db)?;
            let status = pages::loan_filter(flag_value(rest, "--status"))?;
            let page = pages::admin_dashboard(db, &actor, status)?;
            for s in &page.summary {
                println!("  {:<9} {:>4}  {}", s.status.label(), s.count, format_amount(s.total));
            }
            println!();
            print_loans(&page.loans, true);
        }
        "savings" => {
            let filter = record_filter(rest)?;
            let actor = acting_user(rest, db)?;
            let page = pages::admin_savings(db, &actor, &filter, clock::now().date())?;
            let overview = &page.overview;
            if !filter.is_empty() {
                println!("Filter: {}", filter.describe());
            }
            println!("Total savings: {}", format_amount(overview.total));
            println!();
            println!("Per member:");
            for u in &overview.per_user {
                println!("  {:<20} {}", u.username, format_amount(u.total));
            }
            println!();
            println!("{} targets:", page.month.long_label());
            for m in &page.members {
                println!(
                    "  {:<20} {:>18} of {:>18} {}",
                    m.username,
                    format_amount(m.saved),
                    format_amount(m.target),
                    if m.met_target { "met" } else { "" }
                );
            }
            println!();
            println!("Monthly:");
            for m in &overview.monthly {
                println!("  {:<10} {}", m.month.label(), format_amount(m.total));
            }
            println!();
            println!("{:<17} {:<16} {:>18}  Description", "Date", "Member", "Amount");
            println!("{}", "─".repeat(72));
            for s in &overview.records {
                println!(
                    "{:<17} {:<16} {:>18}  {}",
                    s.saved_at.format("%Y-%m-%d %H:%M"),
                    truncate(&s.username, 16),
                    format_amount(s.amount),
                    truncate(&s.description, 30)
                );
            }
        }
        "welfare" => {
            let filter = record_filter(rest)?;
            let actor = acting_user(rest, db)?;
            let page = pages::admin_welfare(db, &actor, &filter)?;
            if !filter.is_empty() {
                println!("Filter: {}", filter.describe());
            }
            println!("Welfare fund: {}", format_amount(page.summary.total));
            println!();
            println!("Monthly:");
            for m in &page.summary.monthly {
                println!("  {:<10} {}", m.month.label(), format_amount(m.total));
            }
            println!();
            print_contributions(&page.summary.contributions, true);
        }
        "members" => {
            let actor = acting_user(rest, db)?;
            actor.require_staff()?;
            let members = auth::list_members(db)?;
            if members.is_empty() {
                println!("No members");
            }
            for m in &members {
                println!("  {:<20} joined {}", m.username, m.date_joined.format("%Y-%m-%d"));
            }
        }
        other => anyhow::bail!(
            "Unknown admin view: {other} (expected loans, savings, welfare or members)"
        ),
    }
    Ok(())
}

fn cli_decide(args: &[String], db: &Database, decision: LoanDecision) -> Result<()> {
    let id: i64 = positionals(args)
        .first()
        .and_then(|s| s.trim_start_matches('#').parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Usage: sacco {} <loan id>", decision.verb()))?;
    let actor = acting_user(args, db)?;
    let loan = loans::decide(db, &actor, id, decision, clock::now())?;
    println!(
        "Loan #{id} for {} ({}) is now {}",
        loan.username,
        format_amount(loan.amount),
        loan.status
    );
    Ok(())
}

fn cli_promote(args: &[String], db: &Database) -> Result<()> {
    let username = positionals(args)
        .first()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("Usage: sacco promote <username>"))?;
    let actor = acting_user(args, db)?;
    let user = auth::promote(db, &actor, username)?;
    println!("'{}' is now {}", user.username, user.role());
    Ok(())
}

fn cli_export(args: &[String], db: &Database) -> Result<()> {
    let usage = "Usage: sacco export savings|welfare <path> [filters]";
    let pos = positionals(args);
    let (Some(ledger), Some(path)) = (pos.first(), pos.get(1)) else {
        anyhow::bail!(usage);
    };
    let ledger =
        Ledger::parse(ledger).ok_or_else(|| anyhow::anyhow!("Unknown ledger '{ledger}'. {usage}"))?;
    let filter = record_filter(args)?;
    let actor = acting_user(args, db)?;

    let path = shellexpand(path);
    let count = export::export(db, &actor, ledger, &filter, Path::new(&path))?;
    if count == 0 {
        println!("No {ledger} records match");
    } else {
        println!("Exported {count} {ledger} records to {path}");
    }
    Ok(())
}

// ── Output ───────────────────────────────────────────────────

fn print_loans(loans: &[Loan], with_member: bool) {
    if loans.is_empty() {
        println!("No loans");
        return;
    }
    for loan in loans {
        let member = if with_member {
            format!("{:<16} ", truncate(&loan.username, 16))
        } else {
            String::new()
        };
        let decided = match &loan.approver_name {
            Some(name) => format!(" by {name}"),
            None => String::new(),
        };
        println!(
            "#{:<5} {} {}{:>18}  {:<9}{} due {}  {}",
            loan.id.unwrap_or_default(),
            loan.date_applied.format("%Y-%m-%d"),
            member,
            format_amount(loan.amount),
            loan.status.label(),
            decided,
            loan.due_date,
            truncate(&loan.purpose, 40)
        );
    }
}

fn print_contributions(rows: &[WelfareContribution], with_member: bool) {
    if rows.is_empty() {
        println!("No contributions");
        return;
    }
    for c in rows {
        if with_member {
            println!(
                "{}  {:<16} {:>18}",
                c.contributed_at.format("%Y-%m-%d %H:%M"),
                truncate(&c.username, 16),
                format_amount(c.amount)
            );
        } else {
            println!(
                "{}  {:>18}",
                c.contributed_at.format("%Y-%m-%d %H:%M"),
                format_amount(c.amount)
            );
        }
    }
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_positionals_skip_flag_values() {
        let a = args(&["2500", "--user", "alice", "school", "fees", "--staff"]);
        assert_eq!(positionals(&a), vec!["2500", "school", "fees"]);
        assert_eq!(flag_value(&a, "--user"), Some("alice"));
        assert!(has_flag(&a, "--staff"));
        assert_eq!(flag_value(&a, "--note"), None);
    }

    #[test]
    fn test_record_filter_from_flags() {
        let a = args(&["--member", "ali", "--from", "2024-01-01"]);
        let filter = record_filter(&a).unwrap();
        assert_eq!(filter.username.as_deref(), Some("ali"));
        assert!(filter.start.is_some());
        assert!(filter.end.is_none());

        assert!(record_filter(&args(&["--to", "yesterday"])).is_err());
    }

    #[test]
    fn test_amount_arg() {
        assert_eq!(
            amount_arg(&args(&["1,000"]), "x").unwrap(),
            rust_decimal::Decimal::from(1000)
        );
        assert!(amount_arg(&args(&["--user", "bob"]), "x").is_err());
    }

    #[test]
    fn test_shellexpand_leaves_plain_paths() {
        assert_eq!(shellexpand("/tmp/out.csv"), "/tmp/out.csv");
        assert_eq!(shellexpand("out.csv"), "out.csv");
    }
}
