use tracing::debug;

use crate::catalog::CatalogIndex;
use crate::config::{RenameConfig, DEFAULT_CUTOFF, DEFAULT_LIMIT};
use crate::fuzzy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate {
    pub entry_id: u64,
    pub search_title: String,
    pub score: u8,
}

/// Scores a filename against every catalog title and keeps the best ones.
#[derive(Debug, Clone)]
pub struct Matcher {
    series_token: String,
    cutoff: u8,
    limit: usize,
}

impl Matcher {
    pub fn new(series_token: impl Into<String>) -> Self {
        Self {
            series_token: series_token.into(),
            cutoff: DEFAULT_CUTOFF,
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn from_config(config: &RenameConfig) -> Self {
        Self::new(config.series_name.clone())
            .with_cutoff(config.cutoff)
            .with_limit(config.limit)
    }

    pub fn with_cutoff(mut self, cutoff: u8) -> Self {
        self.cutoff = cutoff;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Remove the series name, which nearly every filename carries and which
    /// would otherwise dominate the score. Case-sensitive.
    pub fn preprocess(&self, query: &str) -> String {
        if self.series_token.is_empty() {
            return query.to_string();
        }
        query.replace(&self.series_token, "")
    }

    /// Candidates scoring at least the cutoff, best first, ties by ascending
    /// id, at most `limit` of them.
    pub fn find(&self, query: &str, index: &CatalogIndex) -> Vec<MatchCandidate> {
        let search = self.preprocess(query);

        let mut candidates: Vec<MatchCandidate> = index
            .iter()
            .filter_map(|entry| {
                let score = fuzzy::score(&search, &entry.search_title);
                (score >= self.cutoff).then(|| MatchCandidate {
                    entry_id: entry.id,
                    search_title: entry.search_title.clone(),
                    score,
                })
            })
            .collect();

        candidates.sort_by(|a, b| b.score.cmp(&a.score).then(a.entry_id.cmp(&b.entry_id)));
        candidates.truncate(self.limit);

        debug!(
            query,
            search = %search,
            found = candidates.len(),
            "Matched filename against catalog"
        );
        candidates
    }
}
