//! Stderr logging for native hosts

use tracing_subscriber::{fmt, EnvFilter};

/// Output style, picked with `KEETHINGS_LOG_FORMAT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl LogFormat {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "compact" | "plain" => Some(LogFormat::Compact),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }

    fn from_env() -> Self {
        std::env::var("KEETHINGS_LOG_FORMAT")
            .ok()
            .and_then(|value| Self::from_str(&value))
            .unwrap_or_default()
    }
}

pub fn init_logging() {
    init_logging_with("info");
}

/// `RUST_LOG` wins over `default_directive` when set.
pub fn init_logging_with(default_directive: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let _ = match LogFormat::from_env() {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from_str("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::from_str(" plain "), Some(LogFormat::Compact));
        assert_eq!(LogFormat::from_str("pretty"), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::from_str("xml"), None);
    }
}
