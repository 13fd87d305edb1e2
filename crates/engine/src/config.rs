use chrono::FixedOffset;

/// Engine configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. In
/// production, override via environment variables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How many days ahead the generator materializes occurrences.
    pub generation_window_days: u16,
    /// Interval between generator runs.
    pub generation_interval: std::time::Duration,
    /// Interval between dispatcher polls.
    pub dispatch_interval: std::time::Duration,
    /// How long before lesson start the reminder goes out.
    pub lead_time: chrono::Duration,
    /// How long past its deadline a never-sent event survives before
    /// being skipped.
    pub stale_after: chrono::Duration,
    /// Per-send delivery timeout.
    pub send_timeout: std::time::Duration,
    /// Fixed offset the school's wall-clock times are interpreted in.
    pub tz: FixedOffset,
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default |
    /// |----------------------------|---------|
    /// | `GENERATION_WINDOW_DAYS`   | `7`     |
    /// | `GENERATION_INTERVAL_SECS` | `3600`  |
    /// | `DISPATCH_INTERVAL_SECS`   | `30`    |
    /// | `LEAD_TIME_MINUTES`        | `30`    |
    /// | `STALE_AFTER_HOURS`        | `24`    |
    /// | `SEND_TIMEOUT_SECS`        | `10`    |
    /// | `TZ_OFFSET_HOURS`          | `0`     |
    pub fn from_env() -> Self {
        let generation_window_days: u16 = env_or("GENERATION_WINDOW_DAYS", "7")
            .parse()
            .expect("GENERATION_WINDOW_DAYS must be a valid u16");

        let generation_interval_secs: u64 = env_or("GENERATION_INTERVAL_SECS", "3600")
            .parse()
            .expect("GENERATION_INTERVAL_SECS must be a valid u64");

        let dispatch_interval_secs: u64 = env_or("DISPATCH_INTERVAL_SECS", "30")
            .parse()
            .expect("DISPATCH_INTERVAL_SECS must be a valid u64");

        let lead_time_minutes: i64 = env_or("LEAD_TIME_MINUTES", "30")
            .parse()
            .expect("LEAD_TIME_MINUTES must be a valid i64");

        let stale_after_hours: i64 = env_or("STALE_AFTER_HOURS", "24")
            .parse()
            .expect("STALE_AFTER_HOURS must be a valid i64");

        let send_timeout_secs: u64 = env_or("SEND_TIMEOUT_SECS", "10")
            .parse()
            .expect("SEND_TIMEOUT_SECS must be a valid u64");

        let tz_offset_hours: i32 = env_or("TZ_OFFSET_HOURS", "0")
            .parse()
            .expect("TZ_OFFSET_HOURS must be a valid i32");

        Self {
            generation_window_days,
            generation_interval: std::time::Duration::from_secs(generation_interval_secs),
            dispatch_interval: std::time::Duration::from_secs(dispatch_interval_secs),
            lead_time: chrono::Duration::minutes(lead_time_minutes),
            stale_after: chrono::Duration::hours(stale_after_hours),
            send_timeout: std::time::Duration::from_secs(send_timeout_secs),
            tz: FixedOffset::east_opt(tz_offset_hours * 3600)
                .expect("TZ_OFFSET_HOURS must be within -12..=14"),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            generation_window_days: 7,
            generation_interval: std::time::Duration::from_secs(3600),
            dispatch_interval: std::time::Duration::from_secs(30),
            lead_time: chrono::Duration::minutes(30),
            stale_after: chrono::Duration::hours(24),
            send_timeout: std::time::Duration::from_secs(10),
            tz: FixedOffset::east_opt(0).expect("zero offset is always valid"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}
