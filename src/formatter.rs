use crate::catalog::CatalogEntry;
use crate::config::DEFAULT_SERIES_NAME;

/// Builds the canonical, sortable base name for a catalog entry.
#[derive(Debug, Clone)]
pub struct NameFormatter {
    series_name: String,
}

impl NameFormatter {
    pub fn new(series_name: impl Into<String>) -> Self {
        Self { series_name: series_name.into() }
    }

    /// `"<series> 0015 - 03x07 - Title"`
    pub fn format(&self, entry: &CatalogEntry) -> String {
        let new_basename = format!(
            "{} {:04} - {:02}x{:02} - {}",
            self.series_name,
            entry.absolute_number,
            entry.season,
            entry.episode_in_season,
            entry.display_title
        );
        sanitize_basename(&new_basename)
    }
}

impl Default for NameFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_SERIES_NAME)
    }
}

/// Only the path separator is replaced; other characters are kept as the
/// catalog spells them.
pub fn sanitize_basename(name: &str) -> String {
    name.replace('/', " ")
}

pub fn format_name(entry: &CatalogEntry) -> String {
    NameFormatter::default().format(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, absolute: u32, season: u32, episode: u32) -> CatalogEntry {
        CatalogEntry {
            id: 1,
            display_title: title.to_string(),
            season,
            episode_in_season: episode,
            absolute_number: absolute,
            search_title: title.to_string(),
        }
    }

    #[test]
    fn test_format_name() {
        assert_eq!(
            format_name(&entry("Taxi nach Leipzig", 15, 3, 7)),
            "Tatort 0015 - 03x07 - Taxi nach Leipzig"
        );
    }

    #[test]
    fn test_unknown_absolute_number_is_zero_padded() {
        assert_eq!(
            format_name(&entry("Reifezeugnis", 0, 7, 1)),
            "Tatort 0000 - 07x01 - Reifezeugnis"
        );
    }

    #[test]
    fn test_wide_numbers_are_not_truncated() {
        assert_eq!(format_name(&entry("X", 12345, 100, 123)), "Tatort 12345 - 100x123 - X");
    }

    #[test]
    fn test_slash_is_replaced() {
        let name = format_name(&entry("Mord/Totschlag", 1, 1, 1));
        assert_eq!(name, "Tatort 0001 - 01x01 - Mord Totschlag");
        assert!(!name.contains('/'));
    }

    #[test]
    fn test_other_characters_are_kept() {
        assert_eq!(
            format_name(&entry("Wer bin ich? \"Jetzt\": Teil 1", 2, 1, 2)),
            "Tatort 0002 - 01x02 - Wer bin ich? \"Jetzt\": Teil 1"
        );
    }

    #[test]
    fn test_custom_series_prefix() {
        let formatter = NameFormatter::new("Polizeiruf 110");
        assert_eq!(formatter.format(&entry("A", 1, 1, 1)), "Polizeiruf 110 0001 - 01x01 - A");
    }
}
