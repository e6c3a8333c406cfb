// ABOUTME: Terminal output for the password migrator
// ABOUTME: Formats per-user progress lines and the final migration summary

use colored::*;
use negaihoshi_security::{MigrationOutcome, RowOutcome, UserRow};

pub fn header(database_url: &str) -> String {
    format!(
        "{}\n  Database: {}",
        "Encrypting stored passwords...".bold().cyan(),
        database_url
    )
}

pub fn row_line(row: &UserRow, outcome: &RowOutcome) -> String {
    let status = match outcome {
        RowOutcome::Skipped => format!(
            "{} Password looks already encrypted, skipped",
            "⚠".yellow().bold()
        ),
        RowOutcome::Migrated => format!("{} Password encrypted", "✓".green().bold()),
        RowOutcome::Failed { stage, reason } => format!(
            "{} Failed to {} password: {}",
            "✗".red().bold(),
            stage,
            reason
        ),
    };

    format!(
        "{} Processing user: {} (ID: {})\n   {}",
        "→".cyan(),
        row.username,
        row.id,
        status
    )
}

pub fn summary(outcome: &MigrationOutcome) -> String {
    let mut lines = vec![
        String::new(),
        "Password migration complete".bold().to_string(),
        format!("  {} Migrated: {}", "✓".green().bold(), outcome.migrated),
        format!("  {} Skipped:  {}", "⚠".yellow().bold(), outcome.skipped),
        format!("  {} Failed:   {}", "✗".red().bold(), outcome.failed),
        format!("  Total:      {}", outcome.total),
        String::new(),
    ];

    if outcome.is_success() {
        lines.push(format!(
            "{} All user passwords are encrypted",
            "✓".green().bold()
        ));
    } else {
        lines.push(format!(
            "{} Some passwords were not migrated. Check the log and run the migrator again",
            "⚠".yellow().bold()
        ));
    }

    lines.join("\n")
}
