use crate::error::{Error, Result};
use std::path::PathBuf;

pub const URL_ENV: &str = "RADARR_URL";
pub const API_KEY_ENV: &str = "RADARR_API_KEY";
pub const KEEP_LIST_ENV: &str = "KEEP_LIST_PATH";
pub const DEFAULT_KEEP_LIST: &str = ".keep-list.json";

/// Connection settings for the Radarr server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub url: String,
    pub api_key: String,
}

impl Settings {
    /// Build settings from already-resolved flag/env values, rejecting
    /// missing or blank ones.
    pub fn resolve(url: Option<&str>, api_key: Option<&str>) -> Result<Self> {
        let url = non_blank(url).ok_or_else(|| {
            Error::Configuration(format!(
                "Radarr URL not provided. Set {} environment variable or use --url flag",
                URL_ENV
            ))
        })?;
        let api_key = non_blank(api_key).ok_or_else(|| {
            Error::Configuration(format!(
                "Radarr API key not provided. Set {} environment variable or use --api-key flag",
                API_KEY_ENV
            ))
        })?;
        Ok(Settings {
            url: url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Keep list location: explicit path, then `KEEP_LIST_PATH`, then
/// `.keep-list.json` in the working directory.
pub fn keep_list_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(KEEP_LIST_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_KEEP_LIST))
}
