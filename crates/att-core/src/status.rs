//! Work status enum as the single source of truth for status strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The state an employee transitions into at a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WorkStatus {
    WorkOffice,
    WorkRemote,
    Break,
    Off,
}

impl WorkStatus {
    /// All variants in display order.
    pub const ALL: [Self; 4] = [Self::WorkOffice, Self::WorkRemote, Self::Break, Self::Off];

    /// String representation used in fixture files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WorkOffice => "work_office",
            Self::WorkRemote => "work_remote",
            Self::Break => "break",
            Self::Off => "off",
        }
    }

    /// Short human label for timelines and tables.
    pub const fn label(self) -> &'static str {
        match self {
            Self::WorkOffice => "office",
            Self::WorkRemote => "remote",
            Self::Break => "break",
            Self::Off => "off",
        }
    }

    /// Whether time in this status counts as work.
    pub const fn is_work(self) -> bool {
        matches!(self, Self::WorkOffice | Self::WorkRemote)
    }

    /// Whether time in this status counts as a break.
    pub const fn is_break(self) -> bool {
        matches!(self, Self::Break)
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkStatus {
    type Err = UnknownWorkStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "work_office" => Ok(Self::WorkOffice),
            "work_remote" => Ok(Self::WorkRemote),
            "break" => Ok(Self::Break),
            "off" => Ok(Self::Off),
            _ => Err(UnknownWorkStatus(s.to_string())),
        }
    }
}

impl Serialize for WorkStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WorkStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown work status strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownWorkStatus(String);

impl fmt::Display for UnknownWorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown work status: {}", self.0)
    }
}

impl std::error::Error for UnknownWorkStatus {}
