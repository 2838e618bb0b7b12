use std::env;

/// Configuration for reading and rendering upload manifests
#[derive(Debug, Clone)]
pub struct OrganizerConfig {
    /// Deepest attribute tree accepted per field (default: 64, the usual
    /// form runtime input nesting limit). The JSON reader refuses documents
    /// nested more than 128 containers deep, and the manifest and field maps
    /// take two of those, so values above 126 behave like 126.
    pub max_nesting_level: usize,

    /// Pretty-print JSON output (default: false)
    pub pretty_output: bool,

    /// Default log filter when RUST_LOG is unset (default: "rust_upload_organizer=info")
    pub log_filter: String,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            max_nesting_level: 64,
            pretty_output: false,
            log_filter: "rust_upload_organizer=info".to_string(),
        }
    }
}

impl OrganizerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_nesting_level: env::var("ORGANIZER_MAX_NESTING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_nesting_level),

            pretty_output: env::var("ORGANIZER_PRETTY")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(default.pretty_output),

            log_filter: env::var("ORGANIZER_LOG_FILTER").unwrap_or(default.log_filter),
        }
    }

    /// Create config for development (readable output, relaxed nesting, verbose logs)
    pub fn development() -> Self {
        Self {
            max_nesting_level: 100,
            pretty_output: true,
            log_filter: "rust_upload_organizer=debug".to_string(),
        }
    }
}
