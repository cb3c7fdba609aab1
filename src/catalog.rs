//! Episode catalog: raw records as delivered by the metadata source, and the
//! in-memory index the matcher works against.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::CatalogError;

/// Raw catalog as delivered by the source: season -> episode -> record.
pub type RawCatalog = BTreeMap<u32, BTreeMap<u32, RawEpisode>>;

/// One episode record as the metadata source spells it. Field names vary
/// between API generations and a record may carry several spellings of the
/// same value, so each spelling gets its own slot and the accessors below
/// merge them: the first usable value wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEpisode {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub season: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub episode: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub absolute: Option<u32>,
    #[serde(flatten)]
    pub spellings: SourceSpellings,
}

/// Alternate field names used by the different TVDB API generations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSpellings {
    #[serde(default, rename = "episodename", skip_serializing_if = "Option::is_none")]
    pub episodename: Option<String>,
    #[serde(default, rename = "episodeName", skip_serializing_if = "Option::is_none")]
    pub episode_name: Option<String>,
    #[serde(
        default,
        rename = "seasonnumber",
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub seasonnumber: Option<u32>,
    #[serde(
        default,
        rename = "seasonNumber",
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub season_number: Option<u32>,
    #[serde(
        default,
        rename = "airedSeason",
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub aired_season: Option<u32>,
    #[serde(
        default,
        rename = "episodenumber",
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub episodenumber: Option<u32>,
    #[serde(
        default,
        rename = "number",
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub number: Option<u32>,
    #[serde(
        default,
        rename = "airedEpisodeNumber",
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub aired_episode_number: Option<u32>,
    #[serde(
        default,
        rename = "absolute_number",
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub absolute_number: Option<u32>,
    #[serde(
        default,
        rename = "absoluteNumber",
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub absolute_number_camel: Option<u32>,
}

impl RawEpisode {
    /// First non-blank title among all spellings.
    pub fn title(&self) -> Option<&str> {
        [&self.name, &self.spellings.episodename, &self.spellings.episode_name]
            .into_iter()
            .filter_map(|name| name.as_deref())
            .map(str::trim)
            .find(|name| !name.is_empty())
    }

    pub fn season_number(&self) -> Option<u32> {
        self.season
            .or(self.spellings.seasonnumber)
            .or(self.spellings.season_number)
            .or(self.spellings.aired_season)
    }

    pub fn episode_number(&self) -> Option<u32> {
        self.episode
            .or(self.spellings.episodenumber)
            .or(self.spellings.number)
            .or(self.spellings.aired_episode_number)
    }

    /// 0 when no spelling carries a usable number.
    pub fn absolute_number(&self) -> u32 {
        self.absolute
            .or(self.spellings.absolute_number)
            .or(self.spellings.absolute_number_camel)
            .unwrap_or(0)
    }
}

// Numbers show up as JSON numbers, numeric strings, empty strings or null.
fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: u64,
    pub display_title: String,
    pub season: u32,
    pub episode_in_season: u32,
    /// 0 when the source does not know it.
    pub absolute_number: u32,
    /// `display_title` with the broadcast metadata prefix stripped.
    pub search_title: String,
}

static STRUCTURED_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+) - (.+) - (.+)$").expect("valid title pattern")
});

/// Reduce a catalog title to the part a filename would contain.
///
/// The source embeds broadcast metadata in the title field, e.g.
/// `"Episode 2016x39 - Janneke & Brix - 05 - Land in dieser Zeit"` becomes
/// `"Land in dieser Zeit"`. Titles without that structure pass through.
pub fn normalize_title(display_title: &str) -> String {
    match STRUCTURED_TITLE.captures(display_title) {
        Some(captures) => captures[3].to_string(),
        None => display_title.to_string(),
    }
}

/// All catalog entries of one run, keyed by episode id.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    entries: BTreeMap<u64, CatalogEntry>,
}

impl CatalogIndex {
    pub fn build(raw: RawCatalog) -> Result<Self, CatalogError> {
        let mut entries = BTreeMap::new();

        for (season_key, episodes) in raw {
            for (episode_key, record) in episodes {
                let Some(display_title) = record.title().map(str::to_string) else {
                    warn!(
                        id = record.id,
                        season = season_key,
                        episode = episode_key,
                        "Skipping catalog record without a title"
                    );
                    continue;
                };

                let search_title = normalize_title(&display_title);
                if search_title.trim().is_empty() {
                    warn!(
                        id = record.id,
                        title = %display_title,
                        "Skipping catalog record with an empty search title"
                    );
                    continue;
                }
                if search_title != display_title {
                    debug!(
                        title = %display_title,
                        search = %search_title,
                        "Normalized catalog title"
                    );
                }

                let entry = CatalogEntry {
                    id: record.id,
                    display_title,
                    season: record.season_number().unwrap_or(season_key),
                    episode_in_season: record.episode_number().unwrap_or(episode_key),
                    absolute_number: record.absolute_number(),
                    search_title,
                };

                if entries.insert(entry.id, entry).is_some() {
                    return Err(CatalogError::DuplicateId(record.id));
                }
            }
        }

        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }

        info!(episodes = entries.len(), "Built catalog index");
        Ok(Self { entries })
    }

    pub fn get(&self, id: u64) -> Option<&CatalogEntry> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }
}
