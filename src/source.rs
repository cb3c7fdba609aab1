//! Where the raw episode catalog comes from: the TVDB v4 API or a JSON
//! snapshot on disk.

use std::path::PathBuf;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::catalog::{CatalogIndex, RawCatalog, RawEpisode};
use crate::config::RenameConfig;
use crate::error::CatalogError;

const TVDB_BASE_URL: &str = "https://api4.thetvdb.com/v4";

#[derive(Debug)]
pub enum CatalogSource {
    /// `{"<season>": {"<episode>": {record}}}`
    Snapshot(PathBuf),
    Tvdb(TvdbClient),
}

impl CatalogSource {
    /// Pick the snapshot when one is given, otherwise the API when a key is
    /// available.
    pub fn select(
        snapshot: Option<PathBuf>,
        api_key: Option<String>,
        config: &RenameConfig,
    ) -> Result<Self, CatalogError> {
        match (snapshot, api_key) {
            (Some(path), _) => Ok(CatalogSource::Snapshot(path)),
            (None, Some(key)) => {
                let client = TvdbClient::new(key, config.show_id, &config.language);
                Ok(CatalogSource::Tvdb(client))
            }
            (None, None) => Err(CatalogError::NoSource),
        }
    }

    pub async fn fetch(&self) -> Result<RawCatalog, CatalogError> {
        match self {
            CatalogSource::Snapshot(path) => load_snapshot(path.clone()).await,
            CatalogSource::Tvdb(client) => client.fetch_catalog().await,
        }
    }

    pub async fn load_index(&self) -> Result<CatalogIndex, CatalogError> {
        CatalogIndex::build(self.fetch().await?)
    }
}

pub async fn load_snapshot(path: PathBuf) -> Result<RawCatalog, CatalogError> {
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| CatalogError::Snapshot { path: path.clone(), source })?;
    let raw: RawCatalog = serde_json::from_str(&content)?;
    info!(path = %path.display(), seasons = raw.len(), "Loaded catalog snapshot");
    Ok(raw)
}

/// Arrange a flat episode list as season -> episode -> record.
///
/// Every record keeps a slot. Records without an episode number, or whose
/// number is already taken, go behind the highest number of their season;
/// `CatalogIndex::build` still prefers the numbers the record carries itself.
pub fn group_episodes(episodes: Vec<RawEpisode>) -> RawCatalog {
    let mut catalog = RawCatalog::new();
    let mut displaced = Vec::new();

    for episode in episodes {
        let season = episode.season_number().unwrap_or(0);
        let slot = catalog.entry(season).or_default();
        match episode.episode_number() {
            Some(number) if !slot.contains_key(&number) => {
                slot.insert(number, episode);
            }
            _ => displaced.push((season, episode)),
        }
    }

    for (season, episode) in displaced {
        let slot = catalog.entry(season).or_default();
        let key = slot
            .keys()
            .next_back()
            .and_then(|last| last.checked_add(1))
            .or_else(|| (1..u32::MAX).find(|key| !slot.contains_key(key)))
            .unwrap_or(0);
        debug!(season, key, id = episode.id, "Placed catalog record in a free episode slot");
        slot.insert(key, episode);
    }

    catalog
}

#[derive(Debug, Deserialize)]
struct TvdbResponse<T> {
    data: Option<T>,
    #[serde(default)]
    links: Option<TvdbLinks>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TvdbLinks {
    next: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TvdbLogin {
    token: String,
}

#[derive(Debug, Deserialize)]
struct TvdbEpisodePage {
    #[serde(default)]
    episodes: Vec<RawEpisode>,
}

/// Minimal TVDB v4 client: log in, then page through a series' episodes.
#[derive(Debug)]
pub struct TvdbClient {
    client: Client,
    api_key: String,
    show_id: u64,
    language: String,
}

impl TvdbClient {
    pub fn new(api_key: String, show_id: u64, language: &str) -> Self {
        Self {
            client: Client::new(),
            api_key,
            show_id,
            language: language.to_string(),
        }
    }

    async fn login(&self) -> Result<String, CatalogError> {
        let url = format!("{}/login", TVDB_BASE_URL);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "apikey": self.api_key }))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(CatalogError::Auth("API key was not accepted".to_string()));
        }
        if !response.status().is_success() {
            return Err(CatalogError::Status { status: response.status(), url });
        }

        let body: TvdbResponse<TvdbLogin> = response.json().await?;
        body.data
            .map(|login| login.token)
            .ok_or_else(|| {
                let message = body.message.unwrap_or_else(|| "no token in response".to_string());
                CatalogError::Auth(message)
            })
    }

    pub async fn fetch_catalog(&self) -> Result<RawCatalog, CatalogError> {
        info!(
            show_id = self.show_id,
            language = %self.language,
            "Fetching episode catalog from TVDB"
        );
        let token = self.login().await?;

        let mut episodes = Vec::new();
        let mut page = 0u32;
        loop {
            let url = format!(
                "{}/series/{}/episodes/default/{}",
                TVDB_BASE_URL, self.show_id, self.language
            );
            let response = self
                .client
                .get(&url)
                .bearer_auth(&token)
                .query(&[("page", page)])
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(CatalogError::Status { status: response.status(), url });
            }

            let body: TvdbResponse<TvdbEpisodePage> = response.json().await?;
            let batch = body.data.map(|data| data.episodes).unwrap_or_default();
            debug!(page, count = batch.len(), "Fetched episode page");
            episodes.extend(batch);

            let has_next = body
                .links
                .and_then(|links| links.next)
                .is_some_and(|next| !next.is_null());
            if !has_next {
                break;
            }
            page += 1;
        }

        info!(episodes = episodes.len(), "Fetched episode records");
        Ok(group_episodes(episodes))
    }
}
