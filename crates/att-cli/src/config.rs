//! Configuration loading and management.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use att_core::{EndOfDay, TimelineConfig};
use chrono::{FixedOffset, NaiveDate, Utc};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the attendance fixture file.
    pub data_path: PathBuf,

    /// Offset absolute status-change timestamps are shown in, in minutes east of UTC.
    pub utc_offset_minutes: i32,

    /// Where an unterminated final segment ends.
    pub end_of_day: EndOfDay,

    /// Narrowest width a segment is drawn at, in percent of the day.
    pub min_segment_width_percent: f64,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            data_path: data_dir.join("attendance.json"),
            utc_offset_minutes: 0,
            end_of_day: EndOfDay::default(),
            min_segment_width_percent: 0.5,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (ATT_*)
        figment = figment.merge(Env::prefixed("ATT_"));

        figment.extract()
    }

    /// Segmentation settings derived from this configuration.
    pub fn timeline_config(&self) -> Result<TimelineConfig> {
        let offset = self
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .with_context(|| {
                format!("utc_offset_minutes out of range: {}", self.utc_offset_minutes)
            })?;
        Ok(TimelineConfig {
            utc_offset: offset,
            end_of_day: self.end_of_day,
        })
    }

    /// Today's date in the configured offset.
    pub fn today(&self) -> Result<NaiveDate> {
        let offset = self.timeline_config()?.utc_offset;
        Ok(Utc::now().with_timezone(&offset).date_naive())
    }
}

/// Returns the platform-specific config directory for att.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("att"))
}

/// Returns the platform-specific data directory for att.
///
/// On Linux: `~/.local/share/att`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("att"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_dirs_data_path_ends_with_att() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "att");
    }

    #[test]
    fn test_default_config_uses_data_dir() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.data_path, data_dir.join("attendance.json"));
        assert_eq!(config.end_of_day, EndOfDay::Midnight);
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"data_path = "/tmp/team.json"
utc_offset_minutes = 540
end_of_day = "next-day-midnight""#
        )
        .unwrap();
        file.flush().unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.data_path, PathBuf::from("/tmp/team.json"));
        assert_eq!(config.end_of_day, EndOfDay::NextDayMidnight);

        let timeline = config.timeline_config().unwrap();
        assert_eq!(timeline.utc_offset.local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn test_out_of_range_offset_is_rejected() {
        let config = Config {
            utc_offset_minutes: 24 * 60,
            ..Config::default()
        };
        assert!(config.timeline_config().is_err());
        assert!(config.today().is_err());
    }
}
