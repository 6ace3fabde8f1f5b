use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Jsonl,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "jsonl" | "json" => Ok(ReportFormat::Jsonl),
            other => Err(format!("unknown report format: {other}")),
        }
    }
}

/// Presentation options for a benchmark run.
#[derive(Debug, Clone, Default)]
pub struct ReportOpts {
    pub format: ReportFormat,

    /// ASCII-only markers (no Unicode)
    pub ascii: bool,

    /// Quiet mode (suppress live progress)
    pub quiet: bool,

    /// Enable visual progress bar (disabled for jsonl output)
    pub progress_bar: bool,
}

impl ReportOpts {
    pub fn new(format: ReportFormat, ascii: bool, quiet: bool, no_progress: bool) -> Self {
        // Enable progress bar only for text output (not jsonl) and when not quiet
        let progress_bar = format == ReportFormat::Text && !quiet && !no_progress;
        Self {
            format,
            ascii,
            quiet,
            progress_bar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_only_for_interactive_text() {
        assert!(ReportOpts::new(ReportFormat::Text, false, false, false).progress_bar);
        assert!(!ReportOpts::new(ReportFormat::Jsonl, false, false, false).progress_bar);
        assert!(!ReportOpts::new(ReportFormat::Text, false, true, false).progress_bar);
        assert!(!ReportOpts::new(ReportFormat::Text, false, false, true).progress_bar);
    }

    #[test]
    fn test_report_format_parsing() {
        assert_eq!("JSONL".parse::<ReportFormat>(), Ok(ReportFormat::Jsonl));
        assert_eq!("text".parse::<ReportFormat>(), Ok(ReportFormat::Text));
        assert!("xml".parse::<ReportFormat>().is_err());
    }
}
