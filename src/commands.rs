// Command flows behind the CLI subcommands. Each flow returns the process
// exit code on a handled outcome and an `Error` for anything that should
// abort the run; `report_error` turns the latter into user-facing lines.

use crate::api::MovieApi;
use crate::deleter::MovieDeleter;
use crate::error::{Error, Result};
use crate::filter::{total_size, GenreFilter};
use crate::keep_list::KeepList;
use crate::models::CatalogEntry;
use crate::scanner::{normalize, MovieScanner};
use crate::ui::{bytes_to_gb, Align, Output, Prompter, SelectItem, Table, Tone};
use std::path::PathBuf;

pub const SUCCESS: u8 = 0;
pub const FAILURE: u8 = 1;

/// Collaborators shared by every command.
pub struct Context<'a> {
    pub out: &'a dyn Output,
    pub prompter: &'a dyn Prompter,
    pub keep_list_path: PathBuf,
    pub verbose: bool,
}

impl Context<'_> {
    fn keep_list(&self) -> KeepList {
        KeepList::open(&self.keep_list_path)
    }
}

/// Options of the `delete` command.
#[derive(Debug, Clone)]
pub struct DeleteOptions {
    pub genre: String,
    pub execute: bool,
    pub keep_files: bool,
    pub yes: bool,
    pub ignore_keep_list: bool,
}

fn connect(ctx: &Context, api: &dyn MovieApi) -> Result<()> {
    if ctx.verbose {
        ctx.out.print(Tone::Info, "Testing connection to Radarr...");
    }
    let status = api.test_connection()?;
    if ctx.verbose {
        let version = status
            .get("version")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        ctx.out
            .print(Tone::Success, &format!("Connected to Radarr version {}", version));
        ctx.out.print(Tone::Plain, "");
    }
    Ok(())
}

/// Print `movies` as a table, with a "Kept" column when `keep_list` is given.
pub fn display_movies_table(
    out: &dyn Output,
    movies: &[CatalogEntry],
    verbose: bool,
    keep_list: Option<&KeepList>,
) {
    if movies.is_empty() {
        out.print(Tone::Warning, "No movies found");
        return;
    }

    let mut table = Table::new("Movies Found")
        .column("Title", Align::Left)
        .column("Year", Align::Center)
        .column("Size", Align::Right)
        .column("Genres", Align::Left);
    if keep_list.is_some() {
        table = table.column("Kept", Align::Center);
    }

    for movie in movies {
        let mut row = vec![
            movie.title.clone(),
            movie.year.to_string(),
            bytes_to_gb(movie.size_on_disk),
            movie.genres.join(", "),
        ];
        if let Some(keep_list) = keep_list {
            let kept = if keep_list.is_kept(movie.id, None) { "Y" } else { "" };
            row.push(kept.to_string());
        }
        table.add_row(row);
    }
    out.table(&table);

    if verbose {
        out.print(
            Tone::Heading,
            &format!(
                "Total: {} movies, {}",
                movies.len(),
                bytes_to_gb(total_size(movies))
            ),
        );
    }
}

/// Ask the user which of `movies` to keep. Already kept movies are shown
/// pre-checked; only newly selected ones are returned. Cancelling the
/// prompt selects nothing.
pub fn interactive_keep_selection(
    out: &dyn Output,
    prompter: &dyn Prompter,
    movies: &[CatalogEntry],
    keep_list: &KeepList,
) -> Result<Vec<CatalogEntry>> {
    if movies.is_empty() {
        return Ok(Vec::new());
    }

    let items: Vec<SelectItem> = movies
        .iter()
        .map(|movie| {
            let kept = keep_list.is_kept(movie.id, None);
            let mut label = format!("{} ({})", movie.title, movie.year);
            if kept {
                label.push_str(" [already kept]");
            }
            SelectItem {
                label,
                checked: kept,
            }
        })
        .collect();

    out.print(Tone::Heading, "Select movies to add to keep list:");
    out.print(
        Tone::Dim,
        "Use arrow keys to navigate, Space to select, Enter to confirm",
    );

    let Some(chosen) = prompter.select("(Space to toggle, Enter to confirm)", &items)? else {
        return Ok(Vec::new());
    };

    Ok(chosen
        .into_iter()
        .filter_map(|i| movies.get(i))
        .filter(|movie| !keep_list.is_kept(movie.id, None))
        .cloned()
        .collect())
}

/// Confirmation before a real deletion. `yes` skips the prompt.
pub fn get_confirmation(
    ctx: &Context,
    movie_count: usize,
    total_size_bytes: u64,
    keep_files: bool,
    yes: bool,
) -> Result<bool> {
    if yes {
        return Ok(true);
    }

    let size = bytes_to_gb(total_size_bytes);
    if keep_files {
        ctx.out.print(
            Tone::Warning,
            &format!("This will remove {} movies ({}) from Radarr.", movie_count, size),
        );
        ctx.out.print(Tone::Warning, "Files will be preserved on disk.");
    } else {
        ctx.out.print(
            Tone::Error,
            &format!(
                "WARNING: This will permanently delete {} movies ({}) from your server.",
                movie_count, size
            ),
        );
        ctx.out.print(
            Tone::Error,
            "Files will be removed from disk and cannot be recovered.",
        );
    }

    ctx.prompter.confirm("Continue?")
}

/// `scan`: list movies of `genre`, optionally picking some to keep.
pub fn scan(ctx: &Context, api: &dyn MovieApi, genre: &str, interactive: bool) -> Result<u8> {
    connect(ctx, api)?;

    let all_movies = MovieScanner::new(api, ctx.out).scan()?;
    if all_movies.is_empty() {
        ctx.out.print(Tone::Warning, "No movies found in library");
        return Ok(SUCCESS);
    }

    let genre_filter = GenreFilter::new(genre);
    let filtered = genre_filter.filter(&all_movies);

    ctx.out
        .print(Tone::Heading, &format!("Movies with genre: {}", genre));
    let mut keep_list = ctx.keep_list();
    display_movies_table(ctx.out, &filtered, ctx.verbose, Some(&keep_list));

    let kept_count = filtered
        .iter()
        .filter(|m| keep_list.is_kept(m.id, None))
        .count();
    if kept_count > 0 {
        ctx.out
            .print(Tone::Warning, &format!("{} movies in keep list", kept_count));
    }

    if interactive {
        let newly_kept = interactive_keep_selection(ctx.out, ctx.prompter, &filtered, &keep_list)?;
        if newly_kept.is_empty() {
            ctx.out.print(Tone::Warning, "No new movies selected");
        } else {
            let mut added = 0;
            for movie in &newly_kept {
                let Some(id) = movie.movie_id() else {
                    log::warn!("Not keeping '{}': no movie ID", movie.title);
                    continue;
                };
                if keep_list.add(id, &movie.title)? {
                    added += 1;
                    ctx.out
                        .print(Tone::Success, &format!("Added to keep list: {}", movie.title));
                }
            }
            ctx.out
                .print(Tone::Success, &format!("Added {} movies to keep list", added));
        }
    }

    let stats = genre_filter.statistics(&all_movies, &filtered);
    ctx.out.print(Tone::Info, "Summary:");
    ctx.out.print(
        Tone::Plain,
        &format!(
            "  Found {} {} movies out of {} total",
            stats.filtered_count, genre, stats.total_count
        ),
    );
    ctx.out.print(
        Tone::Plain,
        &format!(
            "  {} movies use {} of {} total storage",
            genre,
            bytes_to_gb(stats.filtered_size_bytes),
            bytes_to_gb(stats.total_size_bytes)
        ),
    );
    Ok(SUCCESS)
}

/// `delete`: remove movies of a genre, honouring the keep list. Dry run
/// unless `execute`. Exit code is 1 when any deletion failed.
pub fn delete(ctx: &Context, api: &dyn MovieApi, opts: &DeleteOptions) -> Result<u8> {
    connect(ctx, api)?;

    let all_movies = MovieScanner::new(api, ctx.out).scan()?;
    if all_movies.is_empty() {
        ctx.out.print(Tone::Warning, "No movies found in library");
        return Ok(SUCCESS);
    }

    let mut candidates = GenreFilter::new(&opts.genre).filter(&all_movies);
    if candidates.is_empty() {
        ctx.out
            .print(Tone::Warning, &format!("No {} movies found", opts.genre));
        return Ok(SUCCESS);
    }

    if !opts.ignore_keep_list {
        let keep_list = ctx.keep_list();
        let kept: Vec<&CatalogEntry> = candidates
            .iter()
            .filter(|m| keep_list.is_kept(m.id, None))
            .collect();
        if !kept.is_empty() {
            ctx.out.print(
                Tone::Warning,
                &format!("Skipped (keep list): {} movies", kept.len()),
            );
            for movie in kept {
                ctx.out.print(Tone::Dim, &format!("  - {}", movie.title));
            }
        }
        candidates = keep_list.filter_kept(&candidates);
    }

    if candidates.is_empty() {
        ctx.out.print(
            Tone::Warning,
            &format!("No {} movies to delete (all are in keep list)", opts.genre),
        );
        return Ok(SUCCESS);
    }

    ctx.out.print(
        Tone::Heading,
        &format!("Movies to be deleted (genre: {}):", opts.genre),
    );
    display_movies_table(ctx.out, &candidates, ctx.verbose, None);

    let dry_run = !opts.execute;
    if dry_run {
        ctx.out.print(Tone::Warning, "DRY RUN MODE");
        ctx.out
            .print(Tone::Warning, "Run with --execute to perform actual deletions");
    } else if !get_confirmation(
        ctx,
        candidates.len(),
        total_size(&candidates),
        opts.keep_files,
        opts.yes,
    )? {
        ctx.out.print(Tone::Warning, "Operation cancelled");
        return Ok(SUCCESS);
    }

    let results = MovieDeleter::new(api, ctx.out).delete_movies(&candidates, opts.keep_files, dry_run);

    ctx.out.print(Tone::Success, "Operation completed");
    if !results.deleted.is_empty() {
        let deleted_size: u64 = candidates
            .iter()
            .filter(|m| results.deleted.contains(&m.title))
            .map(|m| m.size_on_disk)
            .sum();
        let action = if opts.keep_files {
            "Removed from library"
        } else {
            "Deleted"
        };
        ctx.out.print(
            Tone::Plain,
            &format!(
                "{}: {} movies ({})",
                action,
                results.deleted.len(),
                bytes_to_gb(deleted_size)
            ),
        );
    }

    if !results.failed.is_empty() {
        ctx.out.print(
            Tone::Error,
            &format!("Failed: {} movies", results.failed.len()),
        );
        if ctx.verbose {
            for title in &results.failed {
                ctx.out.print(Tone::Error, &format!("  - {}", title));
            }
        }
        return Ok(FAILURE);
    }
    Ok(SUCCESS)
}

/// An id of 0 is treated as no id at all.
fn require_id_or_title(movie_id: Option<i64>, title: Option<&str>) -> Result<Option<i64>> {
    let movie_id = movie_id.filter(|id| *id != 0);
    if movie_id.is_none() && title.is_none() {
        return Err(Error::Validation(
            "Must provide either movie ID or --title".into(),
        ));
    }
    Ok(movie_id)
}

/// Find exactly one library movie by id, or else by case-insensitive title.
fn find_movie(
    movies: Vec<CatalogEntry>,
    movie_id: Option<i64>,
    title: Option<&str>,
) -> Result<CatalogEntry> {
    if let Some(id) = movie_id {
        return movies
            .into_iter()
            .find(|m| m.id == Some(id))
            .ok_or_else(|| Error::Validation(format!("Movie with ID {} not found in Radarr", id)));
    }

    let title = title.unwrap_or_default();
    let wanted = title.to_lowercase();
    let mut matches: Vec<CatalogEntry> = movies
        .into_iter()
        .filter(|m| m.title.to_lowercase() == wanted)
        .collect();

    match matches.len() {
        0 => Err(Error::Validation(format!(
            "No movie found with title '{}'",
            title
        ))),
        1 => Ok(matches.remove(0)),
        _ => {
            let mut message = format!(
                "Multiple movies found with title '{}'. Use movie ID instead.",
                title
            );
            for m in &matches {
                let id = m.id.map_or_else(|| "?".to_string(), |id| id.to_string());
                message.push_str(&format!("\n  ID {}: {} ({})", id, m.title, m.year));
            }
            Err(Error::Validation(message))
        }
    }
}

/// `keep add`: validate against the live library, then keep the movie.
pub fn keep_add(
    ctx: &Context,
    api: &dyn MovieApi,
    movie_id: Option<i64>,
    title: Option<&str>,
) -> Result<u8> {
    let movie_id = require_id_or_title(movie_id, title)?;

    let movies = api.get_movies()?.into_iter().map(normalize).collect();
    let movie = find_movie(movies, movie_id, title)?;
    let Some(id) = movie.movie_id() else {
        return Err(Error::Validation(format!(
            "Movie '{}' has no ID in Radarr",
            movie.title
        )));
    };

    let mut keep_list = ctx.keep_list();
    if keep_list.add(id, &movie.title)? {
        ctx.out.print(
            Tone::Success,
            &format!("Added to keep list: {} (ID: {})", movie.title, id),
        );
    } else {
        ctx.out.print(
            Tone::Warning,
            &format!("'{}' is already in the keep list", movie.title),
        );
    }
    Ok(SUCCESS)
}

/// `keep remove`: drop a movie from the keep list by id or title.
pub fn keep_remove(ctx: &Context, movie_id: Option<i64>, title: Option<&str>) -> Result<u8> {
    let movie_id = require_id_or_title(movie_id, title)?;

    let mut keep_list = ctx.keep_list();
    let removed = keep_list.remove(movie_id, title)?;
    let subject = match movie_id {
        Some(id) => format!("Movie ID {}", id),
        None => format!("'{}'", title.unwrap_or_default()),
    };
    if removed {
        ctx.out
            .print(Tone::Success, &format!("Removed {} from keep list", subject));
    } else {
        ctx.out
            .print(Tone::Warning, &format!("{} was not in the keep list", subject));
    }
    Ok(SUCCESS)
}

/// `keep list`: show every kept movie.
pub fn list_kept(ctx: &Context) -> Result<u8> {
    let movies = ctx.keep_list().list_all();
    if movies.is_empty() {
        ctx.out.print(Tone::Warning, "Keep list is empty");
        return Ok(SUCCESS);
    }

    let mut table = Table::new("Keep List")
        .column("ID", Align::Right)
        .column("Title", Align::Left)
        .column("Added", Align::Left);
    for movie in &movies {
        let added: String = if movie.added_at.is_empty() {
            "N/A".to_string()
        } else {
            movie.added_at.chars().take(10).collect()
        };
        table.add_row(vec![movie.id.to_string(), movie.title.clone(), added]);
    }
    ctx.out.table(&table);
    ctx.out.print(
        Tone::Heading,
        &format!("Total: {} movies in keep list", movies.len()),
    );
    Ok(SUCCESS)
}

/// `keep clear`: empty the keep list after confirmation.
pub fn keep_clear(ctx: &Context, yes: bool) -> Result<u8> {
    let mut keep_list = ctx.keep_list();
    let count = keep_list.len();
    if count == 0 {
        ctx.out.print(Tone::Warning, "Keep list is already empty");
        return Ok(SUCCESS);
    }

    if !yes
        && !ctx.prompter.confirm(&format!(
            "Are you sure you want to clear {} movies from keep list?",
            count
        ))?
    {
        ctx.out.print(Tone::Warning, "Operation cancelled");
        return Ok(SUCCESS);
    }

    keep_list.clear()?;
    ctx.out
        .print(Tone::Success, &format!("Cleared {} movies from keep list", count));
    Ok(SUCCESS)
}

/// Print an aborting error. API errors get their status code and
/// endpoint when `verbose`.
pub fn report_error(out: &dyn Output, err: &Error, verbose: bool) {
    match err {
        Error::Api(api_err) => {
            out.print(Tone::Error, &format!("Radarr API Error: {}", api_err.message));
            if verbose {
                out.print(Tone::Dim, &format!("Status Code: {}", api_err.status_code));
                out.print(Tone::Dim, &format!("Endpoint: {}", api_err.endpoint));
            }
        }
        other => {
            for line in other.to_string().lines() {
                out.print(Tone::Error, line);
            }
            if verbose {
                out.print(Tone::Dim, &format!("{:?}", other));
            }
        }
    }
}
