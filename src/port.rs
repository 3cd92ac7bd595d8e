use std::{fmt::Display, ops::RangeInclusive, str::FromStr};

use crate::error::ConfigError;

/// Closed interval of ports, `low` and `high` included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    low: u16,
    high: u16,
}

impl PortRange {
    pub fn new(low: u16, high: u16) -> Result<Self, ConfigError> {
        if low > high {
            return Err(ConfigError::InvalidPortRange { low, high });
        }

        Ok(Self { low, high })
    }

    #[inline]
    pub fn single(port: u16) -> Self {
        Self {
            low: port,
            high: port,
        }
    }

    #[inline]
    pub fn low(&self) -> u16 {
        self.low
    }

    #[inline]
    pub fn high(&self) -> u16 {
        self.high
    }

    /// Number of ports in the range. Never zero.
    #[inline]
    pub fn len(&self) -> usize {
        (self.high - self.low) as usize + 1
    }

    /// Ports in ascending order.
    #[inline]
    pub fn iter(&self) -> RangeInclusive<u16> {
        self.low..=self.high
    }
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    raw.trim()
        .parse::<u16>()
        .map_err(|_| ConfigError::InvalidPort(String::from(raw)))
}

impl FromStr for PortRange {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.split_once('-') {
            Some((low, high)) => Self::new(parse_port(low)?, parse_port(high)?),
            None => parse_port(raw).map(Self::single),
        }
    }
}

impl Display for PortRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.low == self.high {
            write!(f, "{}", self.low)
        } else {
            write!(f, "{}-{}", self.low, self.high)
        }
    }
}

impl IntoIterator for PortRange {
    type Item = u16;
    type IntoIter = RangeInclusive<u16>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
