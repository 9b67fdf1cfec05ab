use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use regex::Regex;
use thiserror::Error;

/// A Databus release version, `YYYY.MM.DD`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReleaseVersion {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl ReleaseVersion {
    pub fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}.{:02}.{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for ReleaseVersion {
    type Err = ReleaseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let re = Regex::new(r"^(\d{4})\.(\d{2})\.(\d{2})$")
            .map_err(|_| ReleaseVersionError::InvalidFormat(s.to_string()))?;
        let caps = re
            .captures(s)
            .ok_or_else(|| ReleaseVersionError::InvalidFormat(s.to_string()))?;

        let year = caps[1].parse().map_err(|_| ReleaseVersionError::InvalidFormat(s.to_string()))?;
        let month: u8 = caps[2].parse().map_err(|_| ReleaseVersionError::InvalidFormat(s.to_string()))?;
        let day: u8 = caps[3].parse().map_err(|_| ReleaseVersionError::InvalidFormat(s.to_string()))?;

        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(ReleaseVersionError::OutOfRange(s.to_string()));
        }

        Ok(ReleaseVersion::new(year, month, day))
    }
}

#[derive(Debug, Error)]
pub enum ReleaseVersionError {
    #[error("Invalid release version '{0}'. Expected: YYYY.MM.DD (e.g., 2018.11.01)")]
    InvalidFormat(String),

    #[error("Release version '{0}' has an out-of-range month or day")]
    OutOfRange(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_version_display() {
        let version = ReleaseVersion::new(2018, 11, 1);
        assert_eq!(version.to_string(), "2018.11.01");
    }

    #[test]
    fn test_release_version_from_str() {
        let version: ReleaseVersion = "2018.11.01".parse().unwrap();
        assert_eq!(version, ReleaseVersion::new(2018, 11, 1));
    }

    #[test]
    fn test_release_version_ordering() {
        let v1: ReleaseVersion = "2018.08.15".parse().unwrap();
        let v2: ReleaseVersion = "2018.11.01".parse().unwrap();
        assert!(v1 < v2);
    }

    #[test]
    fn test_invalid_release_version() {
        assert!(matches!(
            "1.0-SNAPSHOT".parse::<ReleaseVersion>(),
            Err(ReleaseVersionError::InvalidFormat(_))
        ));
        assert!("2018.11".parse::<ReleaseVersion>().is_err());
        assert!("2018.1.01".parse::<ReleaseVersion>().is_err());
        assert!(matches!(
            "2018.13.01".parse::<ReleaseVersion>(),
            Err(ReleaseVersionError::OutOfRange(_))
        ));
    }
}
