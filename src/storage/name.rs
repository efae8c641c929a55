//! Container name validation

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Lowercase letters, digits and hyphens, 3 to 63 characters
const PATTERN: &str = r"^[-a-z0-9]{3,63}$";

static CONTAINER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PATTERN).expect("container name pattern compiles"));

/// A container identifier that has passed validation.
///
/// The pattern is deliberately looser than the storage service's own naming
/// rules (it allows leading, trailing and repeated hyphens); names it admits
/// but the service refuses fail at creation time instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerName(String);

impl ContainerName {
    /// Validate `name` and wrap it
    pub fn parse(name: &str) -> Result<Self> {
        if CONTAINER_NAME.is_match(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(Error::InvalidContainerName(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ContainerName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ContainerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["abc", "my-test-1", "000", "---", "a-b-c-d", &"x".repeat(63)] {
            let parsed = ContainerName::parse(name).unwrap();
            assert_eq!(parsed.as_str(), name);
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in [
            "",
            "ab",
            "AB",
            "Abc",
            "my_container",
            "my.container",
            "my container",
            "ümlaut",
            "abc\n",
            &"x".repeat(64),
        ] {
            assert!(
                matches!(ContainerName::parse(name), Err(Error::InvalidContainerName(_))),
                "{:?} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_from_str() {
        let name: ContainerName = "logs-2024".parse().unwrap();
        assert_eq!(name.to_string(), "logs-2024");
        assert!("Logs".parse::<ContainerName>().is_err());
    }
}
