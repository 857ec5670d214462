//! Terminal output for the end of a session

use console::style;
use dirmirror_engine::SessionStatistics;
use std::time::Duration;

/// Print session totals
pub fn print_statistics(stats: &SessionStatistics) {
    println!();
    println!("{}", style("Session Statistics:").bold().underlined());
    println!("  Cycles run: {}", style(stats.total_cycles()).green());
    println!("  Changes applied: {}", style(stats.total_changes).green());
    println!("  Idle cycles: {}", style(stats.idle_cycles).cyan());
    println!(
        "  Failed cycles: {}",
        if stats.failed_cycles > 0 {
            style(stats.failed_cycles).red()
        } else {
            style(stats.failed_cycles).green()
        }
    );
    if stats.skipped_entries > 0 {
        println!("  Skipped entries: {}", style(stats.skipped_entries).yellow());
    }
    println!(
        "  Average cycle: {}",
        style(format_duration(stats.average_cycle_time())).blue()
    );
    println!(
        "  Longest cycle: {}",
        style(format_duration(stats.longest_cycle)).blue()
    );
    println!("  Uptime: {}", style(format_duration(stats.uptime())).blue());
}

/// Print a fatal error the way the tool reports every aborting failure
pub fn print_error(error: &anyhow::Error) {
    eprintln!(
        "{} Following error occurred: {:#}",
        style("✗").red().bold(),
        error
    );
}

/// Human-readable duration
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
