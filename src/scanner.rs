use crate::api::{ApiError, MovieApi};
use crate::models::{CatalogEntry, RawMovie};
use crate::ui::Output;

/// Fetches the library and normalizes each record.
pub struct MovieScanner<'a> {
    api: &'a dyn MovieApi,
    out: &'a dyn Output,
}

impl<'a> MovieScanner<'a> {
    pub fn new(api: &'a dyn MovieApi, out: &'a dyn Output) -> Self {
        MovieScanner { api, out }
    }

    pub fn scan(&self) -> Result<Vec<CatalogEntry>, ApiError> {
        let spinner = self.out.progress(None, "Scanning Radarr library...");
        let raw_movies = match self.api.get_movies() {
            Ok(raw) => raw,
            Err(e) => {
                spinner.finish_and_clear();
                return Err(e);
            }
        };

        spinner.set_length(raw_movies.len() as u64);
        spinner.set_message(format!("Processing {} movies...", raw_movies.len()));

        let mut movies = Vec::with_capacity(raw_movies.len());
        for raw in raw_movies {
            movies.push(normalize(raw));
            spinner.inc(1);
        }
        spinner.finish_and_clear();

        log::debug!("Scanned {} movies", movies.len());
        Ok(movies)
    }
}

/// Map a raw record to a `CatalogEntry`. A field with an unexpected type
/// takes its default on its own; a record that is not an object
/// normalizes to all defaults.
pub fn normalize(raw: serde_json::Value) -> CatalogEntry {
    let parsed: RawMovie = serde_json::from_value(raw).unwrap_or_else(|e| {
        log::warn!("Unreadable movie record, using defaults: {}", e);
        RawMovie::default()
    });
    parsed.into()
}
