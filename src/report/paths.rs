use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::path::{Path, PathBuf};

use crate::config::ReportConfig;
use crate::constants::report::FILE_EXTENSION;

/// Date-stamped report file naming.
///
/// The date is the calendar date in the schedule timezone, so two runs on the
/// same local day resolve to the same default path and the later write wins.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPaths {
    output_dir: PathBuf,
    file_prefix: String,
    timezone: Tz,
}

impl ReportPaths {
    pub fn new(output_dir: impl Into<PathBuf>, file_prefix: impl Into<String>, timezone: Tz) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_prefix: file_prefix.into(),
            timezone,
        }
    }

    pub fn from_config(config: &ReportConfig, timezone: Tz) -> Self {
        Self::new(config.output_dir.clone(), config.file_prefix.clone(), timezone)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.timezone).date_naive()
    }

    /// `<prefix>_<YYYY-MM-DD>.pdf`
    pub fn file_name(&self, date: NaiveDate) -> String {
        format!(
            "{}_{}.{}",
            self.file_prefix,
            date.format("%Y-%m-%d"),
            FILE_EXTENSION
        )
    }

    /// Path under the configured base directory (startup and scheduled runs)
    pub fn default_path(&self, now: DateTime<Utc>) -> PathBuf {
        self.path_in(&self.output_dir, now)
    }

    /// Path under a caller-supplied directory (on-demand runs)
    pub fn path_in(&self, dir: impl AsRef<Path>, now: DateTime<Utc>) -> PathBuf {
        dir.as_ref().join(self.file_name(self.local_date(now)))
    }
}
