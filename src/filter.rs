use crate::models::{CatalogEntry, LibraryStats};

/// Selects movies tagged with one genre, ignoring case.
#[derive(Debug, Clone)]
pub struct GenreFilter {
    genre: String,
}

impl Default for GenreFilter {
    fn default() -> Self {
        GenreFilter::new("Horror")
    }
}

impl GenreFilter {
    pub fn new(genre: &str) -> Self {
        GenreFilter {
            genre: genre.to_lowercase(),
        }
    }

    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        entry.genres.iter().any(|g| g.to_lowercase() == self.genre)
    }

    /// Matching movies, in input order.
    pub fn filter(&self, movies: &[CatalogEntry]) -> Vec<CatalogEntry> {
        movies.iter().filter(|m| self.matches(m)).cloned().collect()
    }

    pub fn statistics(&self, movies: &[CatalogEntry], filtered: &[CatalogEntry]) -> LibraryStats {
        LibraryStats {
            total_count: movies.len(),
            filtered_count: filtered.len(),
            total_size_bytes: total_size(movies),
            filtered_size_bytes: total_size(filtered),
        }
    }
}

/// Sum of `size_on_disk` over `movies`.
pub fn total_size(movies: &[CatalogEntry]) -> u64 {
    movies.iter().map(|m| m.size_on_disk).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: i64, title: &str, genres: &[&str], size: u64) -> CatalogEntry {
        CatalogEntry {
            id: Some(id),
            title: title.to_string(),
            year: 2000,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            has_file: size > 0,
            size_on_disk: size,
        }
    }

    fn library() -> Vec<CatalogEntry> {
        vec![
            movie(1, "The Shining", &["Horror", "Drama"], 4_000),
            movie(2, "Toy Story", &["Animation", "Comedy"], 2_000),
            movie(3, "Scream", &["horror", "Mystery"], 3_000),
            movie(4, "No Genres", &[], 1_000),
            movie(5, "Get Out", &["HORROR"], 0),
        ]
    }

    fn ids(movies: &[CatalogEntry]) -> Vec<i64> {
        movies.iter().filter_map(|m| m.id).collect()
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let movies = library();
        let upper = GenreFilter::new("HORROR").filter(&movies);
        let lower = GenreFilter::new("horror").filter(&movies);
        let title = GenreFilter::new("Horror").filter(&movies);

        assert_eq!(ids(&upper), vec![1, 3, 5]);
        assert_eq!(upper, lower);
        assert_eq!(lower, title);
    }

    #[test]
    fn test_movies_without_genres_never_match() {
        let movies = library();
        for genre in ["Horror", "Animation", "Drama"] {
            let filtered = GenreFilter::new(genre).filter(&movies);
            assert!(filtered.iter().all(|m| m.id != Some(4)));
        }
    }

    #[test]
    fn test_match_is_exact_not_partial() {
        let movies = vec![movie(1, "Horror Comedy", &["Horror-Comedy"], 10)];
        assert!(GenreFilter::new("Horror").filter(&movies).is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(GenreFilter::default().filter(&[]).is_empty());
    }

    #[test]
    fn test_statistics() {
        let movies = library();
        let genre_filter = GenreFilter::new("Horror");
        let filtered = genre_filter.filter(&movies);
        let stats = genre_filter.statistics(&movies, &filtered);

        assert_eq!(stats.total_count, 5);
        assert_eq!(stats.filtered_count, 3);
        assert_eq!(stats.total_size_bytes, 10_000);
        assert_eq!(stats.filtered_size_bytes, 7_000);
        assert!(stats.filtered_size_bytes <= stats.total_size_bytes);
    }

    #[test]
    fn test_statistics_on_empty_sets() {
        let stats = GenreFilter::default().statistics(&[], &[]);
        assert_eq!(stats, LibraryStats::default());
    }
}
