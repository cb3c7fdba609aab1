use std::path::{Path, PathBuf};

use anyhow::Result;

/// Show ID of the Tatort series on thetvdb.com
pub const TATORT_SHOW_ID: u64 = 83214;

pub const DEFAULT_SERIES_NAME: &str = "Tatort";
pub const DEFAULT_LANGUAGE: &str = "deu";
pub const DEFAULT_CUTOFF: u8 = 60;
pub const DEFAULT_LIMIT: usize = 9;
pub const DEFAULT_AUTO_ACCEPT_MARGIN: u8 = 10;
pub const DEFAULT_MAX_PROMPT_ATTEMPTS: usize = 5;

#[derive(Debug, Clone)]
pub struct RenameConfig {
    pub directory: PathBuf,
    /// Token stripped from queries and used as the prefix of new names.
    pub series_name: String,
    pub show_id: u64,
    pub language: String,
    pub cutoff: u8,
    pub limit: usize,
    /// Rank 0 is accepted without asking when it beats rank 1 by more than this.
    pub auto_accept_margin: u8,
    pub max_prompt_attempts: usize,
    pub dry_run: bool,
}

// Configuration builder
pub struct ConfigBuilder {
    directory: Option<PathBuf>,
    series_name: String,
    show_id: u64,
    language: String,
    cutoff: u8,
    limit: usize,
    auto_accept_margin: u8,
    max_prompt_attempts: usize,
    dry_run: bool,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            directory: None,
            series_name: DEFAULT_SERIES_NAME.to_string(),
            show_id: TATORT_SHOW_ID,
            language: DEFAULT_LANGUAGE.to_string(),
            cutoff: DEFAULT_CUTOFF,
            limit: DEFAULT_LIMIT,
            auto_accept_margin: DEFAULT_AUTO_ACCEPT_MARGIN,
            max_prompt_attempts: DEFAULT_MAX_PROMPT_ATTEMPTS,
            dry_run: false,
        }
    }

    pub fn directory<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.directory = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn series_name(mut self, name: impl Into<String>) -> Self {
        self.series_name = name.into();
        self
    }

    pub fn show_id(mut self, show_id: u64) -> Self {
        self.show_id = show_id;
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn cutoff(mut self, cutoff: u8) -> Self {
        self.cutoff = cutoff;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn auto_accept_margin(mut self, margin: u8) -> Self {
        self.auto_accept_margin = margin;
        self
    }

    pub fn max_prompt_attempts(mut self, attempts: usize) -> Self {
        self.max_prompt_attempts = attempts;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn build(self) -> Result<RenameConfig> {
        let directory = self.directory
            .ok_or_else(|| anyhow::anyhow!("Directory is required"))?;

        if self.series_name.trim().is_empty() {
            return Err(anyhow::anyhow!("Series name must not be empty"));
        }
        if self.cutoff > 100 {
            return Err(anyhow::anyhow!("Cutoff must be between 0 and 100, got {}", self.cutoff));
        }
        if self.limit == 0 {
            return Err(anyhow::anyhow!("Candidate limit must be at least 1"));
        }
        if self.max_prompt_attempts == 0 {
            return Err(anyhow::anyhow!("At least one prompt attempt is required"));
        }

        Ok(RenameConfig {
            directory,
            series_name: self.series_name,
            show_id: self.show_id,
            language: self.language,
            cutoff: self.cutoff,
            limit: self.limit,
            auto_accept_margin: self.auto_accept_margin,
            max_prompt_attempts: self.max_prompt_attempts,
            dry_run: self.dry_run,
        })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder_defaults() {
        let config = ConfigBuilder::new()
            .directory("/test/path")
            .build()
            .unwrap();

        assert_eq!(config.directory, PathBuf::from("/test/path"));
        assert_eq!(config.series_name, "Tatort");
        assert_eq!(config.show_id, 83214);
        assert_eq!(config.cutoff, 60);
        assert_eq!(config.limit, 9);
        assert_eq!(config.auto_accept_margin, 10);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_config_builder_requires_directory() {
        assert!(ConfigBuilder::new().build().is_err());
    }

    #[test]
    fn test_config_builder_rejects_bad_values() {
        assert!(ConfigBuilder::new().directory(".").cutoff(101).build().is_err());
        assert!(ConfigBuilder::new().directory(".").limit(0).build().is_err());
        assert!(ConfigBuilder::new().directory(".").series_name("  ").build().is_err());
        assert!(ConfigBuilder::new().directory(".").max_prompt_attempts(0).build().is_err());
    }
}
