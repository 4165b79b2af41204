use crate::output::{format_bytes, LeakReport, Reporter};
use colored::*;

/// Mirrors each leak diagnostic and the aggregate summary to stdout.
pub(crate) struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, report: &LeakReport) -> Result<(), Box<dyn std::error::Error>> {
        for leak in &report.leaks {
            println!("{leak}");
            match &leak.frames {
                Some(frames) if frames.is_empty() => {
                    println!("    {}", "<stack unavailable>".dimmed());
                }
                Some(frames) => {
                    for frame in frames {
                        println!("    {frame}");
                    }
                }
                None => {}
            }
        }

        if report.leaks.is_empty() {
            println!(
                "{} No memory leaks detected ({} allocations tracked)",
                "[memtrail]".blue().bold(),
                report.total_allocations,
            );
        } else {
            println!(
                "{} Allocations tracked: {}, leaks: {} ({})",
                "[memtrail]".blue().bold(),
                report.total_allocations,
                report.leak_count().to_string().red().bold(),
                format_bytes(report.leaked_bytes()),
            );
        }
        println!("📁 See log file: {}", report.log_path);

        Ok(())
    }
}

/// Prints the whole report as a single JSON document on stdout.
#[cfg(feature = "json")]
pub(crate) struct JsonReporter;

#[cfg(feature = "json")]
impl Reporter for JsonReporter {
    fn report(&self, report: &LeakReport) -> Result<(), Box<dyn std::error::Error>> {
        println!("{}", serde_json::to_string(report)?);
        Ok(())
    }
}
