//! Runtime settings for an interaction handler.

use std::time::Duration;

use interplay_common::InteractionConfig;

/// Resolved handler settings.
///
/// Built from [`InteractionConfig`]. Watchers count elapsed time in
/// thousandths of a tick and carry the remainder between polls, so a
/// session with the full countdown expires after
/// `timeout_ticks / ticks_per_second` seconds for any poll interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Countdown every new or refreshed session starts with.
    pub timeout_ticks: i64,
    /// Watcher wake-up period.
    pub poll_interval: Duration,
    /// Game ticks per second of wall-clock time.
    pub ticks_per_second: u32,
    pub help_command: String,
    pub help_aliases: Vec<String>,
    pub no_help_message: String,
}

impl HandlerConfig {
    pub fn from_config(config: &InteractionConfig) -> Self {
        Self {
            timeout_ticks: i64::from(config.timeout_ticks),
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(1)),
            ticks_per_second: config.ticks_per_second.max(1),
            help_command: config.help_command.to_lowercase(),
            help_aliases: config.help_aliases.iter().map(|a| a.to_lowercase()).collect(),
            no_help_message: config.no_help_message.clone(),
        }
    }

    /// Override the countdown.
    pub fn with_timeout_ticks(mut self, ticks: i64) -> Self {
        self.timeout_ticks = ticks;
        self
    }

    /// Thousandths of a tick that elapse between two wake-ups.
    pub fn milliticks_per_poll(&self) -> i64 {
        let poll_ms = i64::try_from(self.poll_interval.as_millis()).unwrap_or(i64::MAX);
        i64::from(self.ticks_per_second.max(1)).saturating_mul(poll_ms.max(1))
    }

    /// Wall-clock time a session lives without a refresh.
    pub fn timeout(&self) -> Duration {
        let per_poll = self.milliticks_per_poll();
        let total = self.timeout_ticks.max(0).saturating_mul(1000);
        let polls = total / per_poll + i64::from(total % per_poll != 0);
        self.poll_interval
            .saturating_mul(u32::try_from(polls).unwrap_or(u32::MAX))
    }
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self::from_config(&InteractionConfig::default())
    }
}

impl From<&InteractionConfig> for HandlerConfig {
    fn from(config: &InteractionConfig) -> Self {
        Self::from_config(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn default_expires_after_twenty_seconds() {
        let config = HandlerConfig::default();
        assert_eq!(config.timeout_ticks, 1200);
        assert_eq!(config.milliticks_per_poll(), 6_000);
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert_eq!(config.timeout(), Duration::from_secs(20));
    }

    #[test]
    fn slow_tick_rate_still_counts_down() {
        let config = HandlerConfig::from_config(&InteractionConfig {
            timeout_ticks: 10,
            ticks_per_second: 5,
            poll_interval_ms: 100,
            ..Default::default()
        });
        assert_eq!(config.milliticks_per_poll(), 500);
        assert_eq!(config.timeout(), Duration::from_secs(2));
    }

    #[test_case(25 ; "25 ms")]
    #[test_case(30 ; "30 ms")]
    #[test_case(70 ; "70 ms")]
    #[test_case(250 ; "250 ms")]
    fn uneven_poll_interval_keeps_wall_clock_timeout(poll_interval_ms: u64) {
        let config = HandlerConfig::from_config(&InteractionConfig {
            poll_interval_ms,
            ..Default::default()
        });
        let timeout = config.timeout();
        assert!(timeout >= Duration::from_secs(20), "{timeout:?}");
        assert!(timeout < Duration::from_secs(20) + config.poll_interval, "{timeout:?}");
    }

    #[test]
    fn help_names_are_lowercased() {
        let config = HandlerConfig::from_config(&InteractionConfig {
            help_command: "Help".into(),
            help_aliases: vec!["CMDS".into()],
            ..Default::default()
        });
        assert_eq!(config.help_command, "help");
        assert_eq!(config.help_aliases, vec!["cmds".to_string()]);
    }
}
