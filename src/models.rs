use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Current keep list file format version.
pub const KEEP_LIST_VERSION: u32 = 1;

/// A library movie, normalized from the server's raw record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: Option<i64>,
    pub title: String,
    pub year: i64,
    pub genres: Vec<String>,
    pub has_file: bool,
    pub size_on_disk: u64,
}

impl CatalogEntry {
    /// The server id, if usable. An id of 0 counts as missing.
    pub fn movie_id(&self) -> Option<i64> {
        self.id.filter(|id| *id != 0)
    }
}

/// The subset of a raw server movie record the tool reads. Absent,
/// `null` and wrongly typed fields all deserialize to `None`, so one bad
/// field never costs the others.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMovie {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub year: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    pub genres: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient")]
    pub has_file: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub size_on_disk: Option<u64>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl From<RawMovie> for CatalogEntry {
    fn from(raw: RawMovie) -> Self {
        CatalogEntry {
            id: raw.id,
            title: raw.title.unwrap_or_else(|| "Unknown".to_string()),
            year: raw.year.unwrap_or(0),
            genres: raw.genres.unwrap_or_default(),
            has_file: raw.has_file.unwrap_or(false),
            size_on_disk: raw.size_on_disk.unwrap_or(0),
        }
    }
}

/// One keep list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeptRecord {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub added_at: String,
}

/// On-disk layout of the keep list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeepListFile {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub movies: Vec<KeptRecord>,
}

fn default_version() -> u32 {
    KEEP_LIST_VERSION
}

/// Per-title results of a deletion run. `skipped` is part of the
/// result shape but nothing fills it yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionOutcome {
    pub deleted: Vec<String>,
    pub failed: Vec<String>,
    pub skipped: Vec<String>,
}

/// Count and size totals for a scan and its genre subset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibraryStats {
    pub total_count: usize,
    pub filtered_count: usize,
    pub total_size_bytes: u64,
    pub filtered_size_bytes: u64,
}
