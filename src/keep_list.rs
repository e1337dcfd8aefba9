// Keep list: movies the user never wants deleted. The JSON file is the
// only source of truth; every mutation is written through immediately.
// An unreadable file is treated as an empty list so a damaged keep list
// never stops the tool from running; a single unreadable record is
// skipped and the rest are kept.

use crate::error::Result;
use crate::models::{CatalogEntry, KeepListFile, KeptRecord, KEEP_LIST_VERSION};
use chrono::Utc;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub struct KeepList {
    path: PathBuf,
    movies: Vec<KeptRecord>,
}

impl KeepList {
    /// Open the keep list at `path`, loading whatever is there.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let movies = load(&path);
        KeepList { path, movies }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add a movie. Returns false without touching the file when the id
    /// is already kept; the original title is left as is.
    pub fn add(&mut self, movie_id: i64, title: &str) -> Result<bool> {
        if self.movies.iter().any(|m| m.id == movie_id) {
            return Ok(false);
        }
        self.movies.push(KeptRecord {
            id: movie_id,
            title: title.to_string(),
            added_at: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
        });
        self.save()?;
        Ok(true)
    }

    /// Remove by id, or else by case-insensitive title. Returns whether
    /// anything was removed; the file is only written on change.
    pub fn remove(&mut self, movie_id: Option<i64>, title: Option<&str>) -> Result<bool> {
        let before = self.movies.len();
        if let Some(id) = movie_id {
            self.movies.retain(|m| m.id != id);
        } else if let Some(title) = title {
            let title = title.to_lowercase();
            self.movies.retain(|m| m.title.to_lowercase() != title);
        }

        if self.movies.len() < before {
            self.save()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Membership by id, or else by case-insensitive title.
    pub fn is_kept(&self, movie_id: Option<i64>, title: Option<&str>) -> bool {
        if let Some(id) = movie_id {
            return self.movies.iter().any(|m| m.id == id);
        }
        if let Some(title) = title {
            let title = title.to_lowercase();
            return self.movies.iter().any(|m| m.title.to_lowercase() == title);
        }
        false
    }

    pub fn list_all(&self) -> Vec<KeptRecord> {
        self.movies.clone()
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.movies.clear();
        self.save()
    }

    /// Entries whose id is not kept. Entries without an id are retained.
    pub fn filter_kept(&self, movies: &[CatalogEntry]) -> Vec<CatalogEntry> {
        let kept_ids: HashSet<i64> = self.movies.iter().map(|m| m.id).collect();
        movies
            .iter()
            .filter(|m| m.id.map_or(true, |id| !kept_ids.contains(&id)))
            .cloned()
            .collect()
    }

    fn save(&self) -> Result<()> {
        let data = KeepListFile {
            version: KEEP_LIST_VERSION,
            movies: self.movies.clone(),
        };
        let json = serde_json::to_string_pretty(&data)?;
        fs::write(&self.path, json)?;
        log::debug!("Saved {} keep list entries to {}", self.movies.len(), self.path.display());
        Ok(())
    }
}

fn load(path: &Path) -> Vec<KeptRecord> {
    if !path.exists() {
        return Vec::new();
    }
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            log::warn!("Could not read keep list {}: {}", path.display(), e);
            return Vec::new();
        }
    };
    let records = match serde_json::from_str::<Value>(&contents) {
        Ok(Value::Object(mut file)) => match file.remove("movies") {
            Some(Value::Array(records)) => records,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                log::warn!("Ignoring keep list {}: movies is not a list: {}", path.display(), other);
                return Vec::new();
            }
        },
        Ok(other) => {
            log::warn!("Ignoring keep list {}: not a JSON object: {}", path.display(), other);
            return Vec::new();
        }
        Err(e) => {
            log::warn!("Ignoring corrupted keep list {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<KeptRecord>(record.clone()) {
            Ok(kept) => Some(kept),
            Err(e) => {
                log::warn!("Skipping keep list record {} in {}: {}", record, path.display(), e);
                None
            }
        })
        .collect()
}
