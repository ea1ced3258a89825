//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::SystemConfig;

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
///
/// ```rust,ignore
/// use virtual_stepper::load_config;
///
/// let config = load_config("steppers.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SystemConfig> {
    let content = fs::read_to_string(path.as_ref())
        .map_err(|e| Error::Config(ConfigError::IoError(truncated(&e.to_string()))))?;

    parse_config(&content)
}

/// Parse configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<SystemConfig> {
    let config: SystemConfig = toml::from_str(content)
        .map_err(|e| Error::Config(ConfigError::ParseError(truncated(e.message()))))?;

    super::validation::validate_config(&config)?;

    Ok(config)
}

/// Copy as much of `msg` as fits, cutting on a char boundary.
fn truncated<const N: usize>(msg: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for ch in msg.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
[steppers.vs0]
oid = 0
"#;

        let config = parse_config(toml).unwrap();
        let stepper = config.stepper("vs0").unwrap();
        assert_eq!(stepper.oid, 0);
        assert_eq!(stepper.reset_clock, 0);
        assert_eq!(config.clock_freq_hz, 1_000_000);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
clock_freq_hz = 72000000

[steppers.vs0]
oid = 2
reset_clock = 1000
position = -40

[steppers.vs1]
oid = 3
"#;

        let config = parse_config(toml).unwrap();
        assert_eq!(config.clock_freq_hz, 72_000_000);
        let vs0 = config.stepper("vs0").unwrap();
        assert_eq!(vs0.reset_clock, 1000);
        assert_eq!(vs0.position, -40);
        assert_eq!(config.stepper("vs1").unwrap().oid, 3);
    }

    #[test]
    fn test_parse_rejects_duplicate_oid() {
        let toml = r#"
[steppers.a]
oid = 1

[steppers.b]
oid = 1
"#;

        assert!(matches!(
            parse_config(toml),
            Err(Error::Config(ConfigError::DuplicateOid(1)))
        ));
    }

    #[test]
    fn test_parse_error() {
        let result = parse_config("[steppers.a]\noid = \"zero\"\n");
        assert!(matches!(result, Err(Error::Config(ConfigError::ParseError(_)))));
    }

    #[test]
    fn test_truncated_message() {
        let long = "x".repeat(300);
        let msg: heapless::String<128> = truncated(&long);
        assert_eq!(msg.len(), 128);
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("/nonexistent/virtual_stepper.toml");
        assert!(matches!(result, Err(Error::Config(ConfigError::IoError(_)))));
    }
}
