//! Terminal display helpers for the treesync CLI

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use treesync_sync::SyncReport;

/// Create a spinner for a running sync, `None` in quiet mode
pub fn create_sync_spinner(quiet: bool, message: &str) -> anyhow::Result<Option<ProgressBar>> {
    if quiet {
        return Ok(None);
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(Some(pb))
}

/// Display the summary of a finished sync
pub fn display_sync_summary(report: &SyncReport) {
    let stats = &report.stats;

    println!();
    println!("{}", style("Sync Statistics:").bold().underlined());
    println!("  Files copied: {}", style(stats.files_copied).green());
    println!("  Files unchanged: {}", style(stats.files_unchanged).dim());
    println!(
        "  Bytes copied: {}",
        style(format_bytes(stats.bytes_copied)).green()
    );
    println!(
        "  Directories synced: {}",
        style(stats.directories_synced).green()
    );
    println!(
        "  Symlinks relinked: {}",
        style(stats.symlinks_relinked).cyan()
    );
    if stats.symlinks_failed > 0 {
        println!(
            "  Symlinks failed: {}",
            style(stats.symlinks_failed).red()
        );
    }
    if stats.entries_excluded > 0 {
        println!(
            "  Entries excluded: {}",
            style(stats.entries_excluded).yellow()
        );
    }
    if stats.special_skipped > 0 {
        println!(
            "  Special files skipped: {}",
            style(stats.special_skipped).yellow()
        );
    }
    if stats.copy_retries > 0 {
        println!("  Copy retries: {}", style(stats.copy_retries).yellow());
    }
    println!(
        "  Duration: {}",
        style(format_duration(stats.duration)).blue()
    );
    println!(
        "  Transfer rate: {}",
        style(format!(
            "{:.2} MB/s",
            stats.transfer_rate() / 1024.0 / 1024.0
        ))
        .blue()
    );
}

/// Format bytes in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// Format duration in human-readable format
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{:.2}s", duration.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

/// Display an error message with proper formatting
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), style(message).red());
}

/// Display a success message with proper formatting
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), style(message).green());
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "0.00 B")]
    #[case(512, "512.00 B")]
    #[case(1536, "1.50 KB")]
    #[case(5 * 1024 * 1024, "5.00 MB")]
    fn test_format_bytes(#[case] bytes: u64, #[case] expected: &str) {
        assert_eq!(format_bytes(bytes), expected);
    }

    #[rstest]
    #[case(Duration::from_millis(1500), "1.50s")]
    #[case(Duration::from_secs(125), "2m 5s")]
    #[case(Duration::from_secs(3725), "1h 2m 5s")]
    fn test_format_duration(#[case] duration: Duration, #[case] expected: &str) {
        assert_eq!(format_duration(duration), expected);
    }

    #[test]
    fn test_quiet_mode_has_no_spinner() {
        assert!(create_sync_spinner(true, "Syncing").unwrap().is_none());
    }
}
