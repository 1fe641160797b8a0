//! Environment configuration helpers

use std::str::FromStr;
use thiserror::Error;

/// An environment variable was set to a value that does not parse
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid value for {key}: '{value}' ({reason})")]
pub struct EnvError {
    /// Variable name
    pub key: String,
    /// Raw value found
    pub value: String,
    /// Parser message
    pub reason: String,
}

/// Read a non-empty environment variable
pub fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read and parse an environment variable
///
/// Unset or blank variables yield `Ok(None)`; values that fail to parse are
/// reported rather than silently ignored.
pub fn env_parse<T>(key: &str) -> Result<Option<T>, EnvError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_string(key)
        .map(|value| {
            value.parse::<T>().map_err(|e| EnvError {
                key: key.to_string(),
                reason: e.to_string(),
                value,
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_parse() {
        // SAFETY: the variable names are unique to this test
        unsafe {
            std::env::set_var("CREW_UTILS_TEST_SEED", " 42 ");
            std::env::set_var("CREW_UTILS_TEST_BAD", "forty-two");
            std::env::set_var("CREW_UTILS_TEST_BLANK", "  ");
        }

        assert_eq!(env_parse::<u64>("CREW_UTILS_TEST_SEED"), Ok(Some(42)));
        assert_eq!(env_parse::<u64>("CREW_UTILS_TEST_BLANK"), Ok(None));
        assert_eq!(env_parse::<u64>("CREW_UTILS_TEST_UNSET"), Ok(None));

        let err = env_parse::<u64>("CREW_UTILS_TEST_BAD").unwrap_err();
        assert_eq!(err.key, "CREW_UTILS_TEST_BAD");
        assert_eq!(err.value, "forty-two");
    }
}
