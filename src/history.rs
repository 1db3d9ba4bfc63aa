use std::fs::OpenOptions;
use std::io::{self, Write};

use chrono::prelude::*;

use crate::app_dirs::AppDirs;
use crate::game::Game;
use crate::stats::SessionSummary;

/// Append one row per completed session to the history log. Called after the
/// reflection is saved; failures are the caller's to ignore, a broken log
/// must never interrupt the session flow.
pub fn append_session(game: &Game, summary: &SessionSummary) -> io::Result<()> {
    if let Some(log_path) = AppDirs::log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // If the log doesn't exist, we need to emit a header
        let needs_header = !log_path.exists();

        let mut log_file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(log_path)?;

        if needs_header {
            writeln!(
                log_file,
                "date,rounds,target_secs,mean_error_secs,mean_abs_error_secs,std_dev_secs,tendency,consistency"
            )?;
        }

        writeln!(
            log_file,
            "{},{},{:.1},{:.3},{:.3},{:.3},{},{}",
            Local::now().format("%c"),
            game.results().len(),
            game.config().target_secs(),
            summary.mean_error_secs(),
            summary.mean_abs_error_secs(),
            summary.std_dev_secs(),
            summary.tendency,
            summary.consistency,
        )?;
    }

    Ok(())
}
