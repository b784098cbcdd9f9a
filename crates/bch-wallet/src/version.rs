//! Application name and version.

pub const APP_NAME: &str = "BHD BunnyHedger ";
pub const APP_NAME_SUFFIX: &str = " - there is no winter as crypto winter";
pub const APP_VERSION: f64 = 0.1;

pub const BUILD_TYPE_RELEASE: &str = "RELEASE";
pub const BUILD_TYPE_DEBUG: &str = "DEBUG";

/// True when `version` is later than this build.
pub fn is_newer_version(version: f64) -> bool {
    version > APP_VERSION
}

/// `version` with four decimal places, the form versions are exchanged in.
pub fn to_version_string(version: f64) -> String {
    format!("{:.4}", version)
}

pub fn from_version_string(version: &str) -> Result<f64, std::num::ParseFloatError> {
    version.trim().parse()
}

/// Name, version and motto of this build.
pub fn version_string() -> String {
    format!("{}{}{}", APP_NAME, to_version_string(APP_VERSION), APP_NAME_SUFFIX)
}

pub fn build_type() -> &'static str {
    if cfg!(debug_assertions) {
        BUILD_TYPE_DEBUG
    } else {
        BUILD_TYPE_RELEASE
    }
}
