use crate::api::MovieApi;
use crate::models::{CatalogEntry, DeletionOutcome};
use crate::ui::{Output, Tone};

/// Deletes movies one at a time. A failure is recorded against that
/// movie and the batch carries on.
pub struct MovieDeleter<'a> {
    api: &'a dyn MovieApi,
    out: &'a dyn Output,
}

impl<'a> MovieDeleter<'a> {
    pub fn new(api: &'a dyn MovieApi, out: &'a dyn Output) -> Self {
        MovieDeleter { api, out }
    }

    /// Delete `movies` in order. Files are removed unless `keep_files`;
    /// every deleted movie is also added to the server's import
    /// exclusions. With `dry_run` no request is sent.
    pub fn delete_movies(
        &self,
        movies: &[CatalogEntry],
        keep_files: bool,
        dry_run: bool,
    ) -> DeletionOutcome {
        let mut results = DeletionOutcome::default();

        if movies.is_empty() {
            self.out.print(Tone::Warning, "No movies to delete");
            return results;
        }

        let delete_files = !keep_files;

        if dry_run {
            self.out
                .print(Tone::Warning, "DRY RUN MODE - No actual deletions will occur");
        }
        let file_action = if keep_files {
            "KEEPING files on disk"
        } else {
            "DELETING files from disk"
        };
        self.out
            .print(Tone::Info, &format!("Deletion mode: {}", file_action));

        let verb = if dry_run { "Simulating deletion of" } else { "Deleting" };
        let progress = self.out.progress(
            Some(movies.len() as u64),
            &format!("{} {} movies...", verb, movies.len()),
        );

        for movie in movies {
            let title = movie.title.clone();

            let Some(movie_id) = movie.movie_id() else {
                self.out
                    .print(Tone::Error, &format!("✗ {}: Missing movie ID", title));
                results.failed.push(title);
                progress.inc(1);
                continue;
            };

            if dry_run {
                let action = if delete_files {
                    "delete files and add exclusion"
                } else {
                    "remove from library (keep files) and add exclusion"
                };
                self.out.print(
                    Tone::Info,
                    &format!("Would {} for: {} (ID: {})", action, title, movie_id),
                );
                results.deleted.push(title);
            } else {
                match self.api.delete_movie(movie_id, delete_files, true) {
                    Ok(()) => {
                        log::info!("Deleted movie {} ({})", movie_id, title);
                        self.out.print(Tone::Success, &format!("✓ Deleted: {}", title));
                        results.deleted.push(title);
                    }
                    Err(e) => {
                        log::warn!("Failed to delete movie {} ({}): {}", movie_id, title, e);
                        self.out.print(
                            Tone::Error,
                            &format!("✗ Failed to delete {}: {}", title, e.message),
                        );
                        results.failed.push(title);
                    }
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        self.out.print(Tone::Plain, "");
        self.out.print(Tone::Heading, "Deletion Summary:");
        self.out
            .print(Tone::Success, &format!("  Deleted: {}", results.deleted.len()));
        self.out
            .print(Tone::Error, &format!("  Failed: {}", results.failed.len()));
        self.out
            .print(Tone::Warning, &format!("  Skipped: {}", results.skipped.len()));

        results
    }
}
