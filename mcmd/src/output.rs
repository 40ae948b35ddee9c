//! Logging setup

use color_eyre::eyre::{Result, WrapErr};
use std::fmt;
use std::fs::File;
use std::path::PathBuf;
use std::time::SystemTime as StdSystemTime;
use tracing::info;
use tracing_subscriber::{
    fmt::format::Writer, fmt::layer, fmt::time::FormatTime, layer::SubscriberExt,
    util::SubscriberInitExt, Registry,
};

/// Wall-clock `HH:MM:SS` (UTC) stamp for log lines
struct ClockTime;

impl FormatTime for ClockTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let secs = StdSystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
            % 86_400;
        write!(w, "{:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
    }
}

/// Send the log to `log_file`, or to stdout when none is given
pub fn setup_logging(log_file: Option<&PathBuf>) -> Result<()> {
    match log_file {
        Some(path) => {
            let log = File::create(path)
                .wrap_err_with(|| format!("Could not create log file: {}", path.display()))?;
            let file_layer = layer()
                .with_writer(log)
                .with_timer(ClockTime)
                .with_ansi(false);
            Registry::default().with(file_layer).init();
            info!("Log written to: {}", path.display());
        }
        None => {
            let stdout_layer = layer()
                .with_writer(std::io::stdout)
                .with_timer(ClockTime)
                .with_ansi(true);
            Registry::default().with(stdout_layer).init();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_time_format() {
        let mut stamp = String::new();
        ClockTime.format_time(&mut Writer::new(&mut stamp)).unwrap();
        let fields: Vec<u64> = stamp.split(':').map(|f| f.parse().unwrap()).collect();
        assert_eq!(stamp.len(), 8);
        assert_eq!(fields.len(), 3);
        assert!(fields[0] < 24 && fields[1] < 60 && fields[2] < 60);
    }
}
