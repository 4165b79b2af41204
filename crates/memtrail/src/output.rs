use std::fmt;

/// One leaked allocation, as surfaced by the end-of-process scan.
///
/// `frames` is `None` when stack capture was off for the run, and an empty
/// vector when capture was requested but no stack could be produced (the
/// report substitutes an "unavailable" marker).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct LeakEntry {
    pub address: usize,
    pub size: usize,
    pub file: String,
    pub line: u32,
    pub func: String,
    pub frames: Option<Vec<String>>,
}

impl fmt::Display for LeakEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Memory leak detected: {:#x} allocated at {}:{} in {}, size: {}",
            self.address, self.file, self.line, self.func, self.size
        )
    }
}

/// The end-of-process leak report handed to a [`Reporter`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct LeakReport {
    pub leaks: Vec<LeakEntry>,
    /// Allocate-class events observed over the whole run (never decremented).
    pub total_allocations: u64,
    /// Where the event log was written.
    pub log_path: String,
}

impl LeakReport {
    pub fn leak_count(&self) -> usize {
        self.leaks.len()
    }

    pub fn leaked_bytes(&self) -> u64 {
        self.leaks.iter().map(|leak| leak.size as u64).sum()
    }
}

/// Trait for implementing custom leak-report output.
///
/// The default console reporter mirrors each leak diagnostic and the summary
/// to stdout. Implement this trait to route the report elsewhere - a CI
/// artifact, a logging system, a custom file format.
///
/// # Examples
///
/// ```rust
/// use memtrail::{LeakReport, Reporter};
/// use std::error::Error;
///
/// struct CountOnly;
///
/// impl Reporter for CountOnly {
///     fn report(&self, report: &LeakReport) -> Result<(), Box<dyn Error>> {
///         println!("{} leaks", report.leak_count());
///         Ok(())
///     }
/// }
/// ```
pub trait Reporter: Send + Sync {
    fn report(&self, report: &LeakReport) -> Result<(), Box<dyn std::error::Error>>;
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes_f = bytes as f64;
    let unit_index = (bytes_f.log(THRESHOLD).floor() as usize).min(UNITS.len() - 1);
    let unit_value = bytes_f / THRESHOLD.powi(unit_index as i32);

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", unit_value, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> LeakReport {
        LeakReport {
            leaks: vec![
                LeakEntry {
                    address: 0x5600_dead_0000,
                    size: 100,
                    file: "src/main.rs".to_string(),
                    line: 10,
                    func: "main".to_string(),
                    frames: None,
                },
                LeakEntry {
                    address: 0x5600_dead_1000,
                    size: 24,
                    file: "src/worker.rs".to_string(),
                    line: 88,
                    func: "spawn_worker".to_string(),
                    frames: Some(vec!["frame #0: spawn_worker".to_string()]),
                },
            ],
            total_allocations: 7,
            log_path: "memtrail.log".to_string(),
        }
    }

    #[test]
    fn test_leak_line_format() {
        let report = sample_report();
        assert_eq!(
            report.leaks[0].to_string(),
            "Memory leak detected: 0x5600dead0000 allocated at src/main.rs:10 in main, size: 100"
        );
    }

    #[test]
    fn test_report_aggregates() {
        let report = sample_report();
        assert_eq!(report.leak_count(), 2);
        assert_eq!(report.leaked_bytes(), 124);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_json_roundtrip() {
        let report = sample_report();
        let json = serde_json::to_string(&report).unwrap();
        let parsed: LeakReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.leak_count(), report.leak_count());
        assert_eq!(parsed.total_allocations, report.total_allocations);
        assert_eq!(parsed.leaks[1].frames.as_deref(), report.leaks[1].frames.as_deref());
    }
}
