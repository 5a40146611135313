use chrono::{DateTime, Local, TimeZone};
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

const LOG_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S%:z";

pub fn format_log_time<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(LOG_TIMESTAMP).to_string()
}

/// Log timestamps in the host's local zone, offset included.
pub struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", format_log_time(&Local::now()))
    }
}
