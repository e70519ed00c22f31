//! Logging configuration.

use std::env;
use std::str::FromStr;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Multi-line human-readable output.
    Pretty,
    /// Single-line output.
    #[default]
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Configuration for the tracing subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Output format.
    pub format: LogFormat,
    /// `EnvFilter` directives, e.g. `info` or `warn,nodeflow_engine=debug`.
    pub filter: String,
    /// Include file and line of each event.
    pub include_location: bool,
    /// Emit an event when a span closes, with its busy and idle time.
    pub span_close_events: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: "info".to_string(),
            include_location: false,
            span_close_events: false,
        }
    }
}

impl TracingConfig {
    /// Create configuration from environment variables.
    ///
    /// - `NODEFLOW_LOG_FORMAT`: `json`, `pretty` or `compact`. When unset,
    ///   pretty on a terminal and JSON otherwise.
    /// - `NODEFLOW_LOG_LEVEL` or `RUST_LOG`: filter directives
    /// - `NODEFLOW_LOG_LOCATION`: `true`/`1` to include source locations
    pub fn from_env() -> Self {
        let format = env::var("NODEFLOW_LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse::<LogFormat>().ok())
            .unwrap_or_else(|| {
                if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
                    LogFormat::Pretty
                } else {
                    LogFormat::Json
                }
            });

        let filter = env::var("NODEFLOW_LOG_LEVEL")
            .or_else(|_| env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());

        let include_location = env::var("NODEFLOW_LOG_LOCATION")
            .map(|s| s == "true" || s == "1")
            .unwrap_or(false);

        Self {
            format,
            filter,
            include_location,
            span_close_events: format == LogFormat::Json,
        }
    }

    /// Filter for a `-v` count: 0 is warn, 1 info, 2 debug, 3+ trace.
    pub fn for_verbosity(verbose: u8) -> Self {
        let filter = match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        Self::default().with_filter(filter)
    }

    /// Set the output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the filter directives.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Include source locations.
    pub fn with_location(mut self, include: bool) -> Self {
        self.include_location = include;
        self
    }

    /// Emit span close events.
    pub fn with_span_close_events(mut self, enable: bool) -> Self {
        self.span_close_events = enable;
        self
    }
}
