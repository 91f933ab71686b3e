use anyhow::{Context, Result};
use env_logger::{Builder, Target};
use std::fs::OpenOptions;
use std::path::Path;

/// Install the global logger. `SACCO_LOG` (or the configured level) sets the
/// filter. With `log_file` set, output is appended there instead of stderr so
/// it cannot scribble over the TUI.
pub(crate) fn init(level: &str, log_file: Option<&Path>) -> Result<()> {
    let mut builder = Builder::new();
    builder.parse_filters(level);

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
        builder.write_style(env_logger::WriteStyle::Never);
    }

    builder
        .try_init()
        .context("Logger already initialised")?;
    Ok(())
}
