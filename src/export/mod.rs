//! CSV export of the filtered savings and welfare ledgers.

use anyhow::Context;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::db::Database;
use crate::error::{SaccoError, SaccoResult};
use crate::models::{Actor, RecordFilter, Savings, WelfareContribution};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Which ledger to write out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ledger {
    Savings,
    Welfare,
}

impl Ledger {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "savings" => Some(Self::Savings),
            "welfare" => Some(Self::Welfare),
            _ => None,
        }
    }
}

impl std::fmt::Display for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Savings => write!(f, "savings"),
            Self::Welfare => write!(f, "welfare"),
        }
    }
}

/// Write the filtered ledger to `path`. Staff only. Returns the row count.
/// An unwritable path is reported as a validation error.
pub(crate) fn export(
    db: &Database,
    actor: &Actor,
    ledger: Ledger,
    filter: &RecordFilter,
    path: &Path,
) -> SaccoResult<usize> {
    actor.require_staff()?;
    let cannot_write = |e: &dyn std::fmt::Display| {
        log::warn!("Export to {} failed: {e}", path.display());
        SaccoError::validation(format!("Cannot write {}: {e}", path.display()))
    };

    let count = match ledger {
        Ledger::Savings => {
            let records = db.get_savings(filter)?;
            let file = File::create(path).map_err(|e| cannot_write(&e))?;
            write_savings(file, &records).map_err(|e| cannot_write(&e))?;
            records.len()
        }
        Ledger::Welfare => {
            let records = db.get_welfare(filter)?;
            let file = File::create(path).map_err(|e| cannot_write(&e))?;
            write_welfare(file, &records).map_err(|e| cannot_write(&e))?;
            records.len()
        }
    };
    log::info!(
        "'{}' exported {count} {ledger} rows to {}",
        actor.username,
        path.display()
    );
    Ok(count)
}

pub(crate) fn write_savings<W: Write>(out: W, records: &[Savings]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["id", "username", "amount", "timestamp", "description"])?;
    for s in records {
        wtr.write_record([
            s.id.map(|id| id.to_string()).unwrap_or_default(),
            s.username.clone(),
            s.amount.to_string(),
            s.saved_at.format(TIMESTAMP_FORMAT).to_string(),
            s.description.clone(),
        ])?;
    }
    wtr.flush().context("Failed to write savings CSV")?;
    Ok(())
}

pub(crate) fn write_welfare<W: Write>(out: W, records: &[WelfareContribution]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["id", "username", "amount", "timestamp"])?;
    for w in records {
        wtr.write_record([
            w.id.map(|id| id.to_string()).unwrap_or_default(),
            w.username.clone(),
            w.amount.to_string(),
            w.contributed_at.format(TIMESTAMP_FORMAT).to_string(),
        ])?;
    }
    wtr.flush().context("Failed to write welfare CSV")?;
    Ok(())
}

#[cfg(test)]
mod tests;
