use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "client-report";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,client_report=info"
}

/// Get the application data directory (platform data dir, or the working
/// directory when none can be determined)
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get the default exports directory
pub fn exports_dir() -> PathBuf {
    app_data_dir().join("exports")
}

/// Get the directory searched for named style profiles
pub fn profiles_dir() -> PathBuf {
    app_data_dir().join("profiles")
}
