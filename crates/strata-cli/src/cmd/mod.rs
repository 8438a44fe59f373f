pub mod config;
pub mod init;
pub mod list;
pub mod new;
pub mod resolve;
pub mod validate;

use anyhow::Context as _;
use std::path::PathBuf;
use strata_core::config::Config;
use strata_core::{PatternType, Resolver, SearchPath};

/// Global flags shared by every subcommand.
pub struct Context {
    pub root: PathBuf,
    pub shipped: Option<PathBuf>,
    pub json: bool,
}

impl Context {
    pub fn config(&self) -> anyhow::Result<Config> {
        Config::load(&self.root).context("failed to load .strata/config.yaml")
    }

    pub fn search_paths(&self, config: &Config) -> Vec<SearchPath> {
        let fallback = crate::root::default_shipped_dir();
        let shipped = config.shipped_dir(&self.root, self.shipped.as_deref(), fallback.as_deref());
        let paths = config.search_paths(&self.root, shipped.as_deref());
        tracing::debug!(root = %self.root.display(), count = paths.len(), "search paths");
        paths
    }

    pub fn resolver(&self) -> anyhow::Result<Resolver> {
        let config = self.config()?;
        Ok(Resolver::new(self.search_paths(&config)))
    }
}

pub fn parse_type(s: &str) -> anyhow::Result<PatternType> {
    Ok(s.parse()?)
}
