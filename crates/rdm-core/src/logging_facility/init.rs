//! Subscriber installation
//!
//! Logs always go to stderr: the CLI prints designs and error reports on
//! stdout.

use tracing_subscriber::EnvFilter;

/// Output flavour of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable lines, command boundaries and stack activity
    Development,
    /// One JSON object per line, command boundaries only
    Production,
}

impl Profile {
    /// Filter used when `RUST_LOG` is not set
    pub fn default_directives(self) -> &'static str {
        match self {
            Profile::Development => "rdm_core=debug,rdm_cli=debug",
            Profile::Production => "rdm_core=info,rdm_cli=info",
        }
    }

    fn filter(self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_directives()))
    }
}

/// Install the global subscriber for `profile`
///
/// Returns `false` when a subscriber was already installed, for instance the
/// capture layer of a test; the existing one is kept.
///
/// ```
/// use rdm_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// assert!(!init(Profile::Production));
/// ```
pub fn init(profile: Profile) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(profile.filter());
    match profile {
        Profile::Development => builder.try_init().is_ok(),
        Profile::Production => builder.json().try_init().is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_keeps_first_subscriber() {
        init(Profile::Production);
        assert!(!init(Profile::Development));
    }

    #[test]
    fn test_production_is_quieter() {
        assert!(Profile::Development.default_directives().contains("rdm_core=debug"));
        assert!(Profile::Production.default_directives().contains("rdm_core=info"));
    }
}
