//! # System Constants
//!
//! Reference-deployment defaults. Every value here can be overridden through
//! configuration; these only seed [`SitewatchConfig::default`](crate::config::SitewatchConfig).

/// Probe defaults
pub mod probe {
    /// Single-attempt request timeout
    pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
    pub const USER_AGENT: &str = concat!("sitewatch/", env!("CARGO_PKG_VERSION"));
}

/// Daily schedule defaults
pub mod schedule {
    /// Noon every day (seconds-first cron syntax)
    pub const DEFAULT_CRON: &str = "0 0 12 * * *";
    pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";
}

/// Report file and document defaults
pub mod report {
    pub const DEFAULT_OUTPUT_DIR: &str = ".";
    pub const DEFAULT_FILE_PREFIX: &str = "Website_Status_Report";
    pub const FILE_EXTENSION: &str = "pdf";
    pub const DEFAULT_TITLE: &str = "Website Status Report";

    pub const HEADER_NAME: &str = "Website Name";
    pub const HEADER_URL: &str = "URL";
    pub const HEADER_STATUS: &str = "Status";
}

/// Mail defaults
pub mod mail {
    pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
    /// Implicit TLS
    pub const DEFAULT_SMTP_PORT: u16 = 465;
    pub const DEFAULT_SUBJECT: &str = "Website Status Report";
    pub const DEFAULT_BODY: &str = "Please find the attached website status report.";
    pub const ATTACHMENT_CONTENT_TYPE: &str = "application/pdf";
}

/// HTTP trigger surface defaults
pub mod web {
    pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
    pub const PATH_FIELD: &str = "path";
}

/// Reference roster as `(name, url)` pairs, in report order
pub const DEFAULT_SITES: &[(&str, &str)] = &[
    ("SCPL", "https://scpl.biz/"),
    ("RMC", "https://rmc.in/"),
    ("Spechem", "https://spechem.biz/"),
    ("RMCPC", "https://rmcpc.com/"),
    ("CETL", "https://cetl.in/"),
];
