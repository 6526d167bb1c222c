pub mod cli;
pub mod profile;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "campus-compare")]
#[command(about = "Compare colleges with weighted categories via a remote scoring service")]
pub struct CliConfig {
    #[arg(long, default_value = "http://localhost:3000/api")]
    pub api_base_url: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Comparison profile (TOML) with categories and colleges.
    #[arg(long)]
    pub profile: Option<String>,

    /// Bearer token for saved-comparison operations. Falls back to the
    /// COMPARE_API_TOKEN environment variable.
    #[arg(long)]
    pub api_token: Option<String>,

    #[arg(long, default_value = "10")]
    pub search_limit: usize,

    #[arg(long, default_value = "500")]
    pub debounce_ms: u64,

    #[arg(long, default_value = "2")]
    pub poll_interval_secs: u64,

    #[arg(long, default_value = "5")]
    pub retry_backoff_secs: u64,

    #[arg(long, default_value = "150")]
    pub max_poll_attempts: u32,

    /// Persist the completed comparison under this name ("" derives one).
    #[arg(long)]
    pub save_as: Option<String>,

    /// List saved comparisons instead of running one.
    #[arg(long)]
    pub list_saved: bool,

    /// Name filter for --list-saved.
    #[arg(long, default_value = "")]
    pub search: String,

    /// Sort order for --list-saved: newest, oldest, a-z, z-a.
    #[arg(long, default_value = "newest")]
    pub sort: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn token(&self) -> Option<String> {
        self.api_token
            .clone()
            .or_else(|| std::env::var("COMPARE_API_TOKEN").ok())
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_base_url", &self.api_base_url)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_range("search_limit", self.search_limit, 1, 50)?;
        validation::validate_positive_number(
            "poll_interval_secs",
            self.poll_interval_secs as usize,
            1,
        )?;
        validation::validate_positive_number(
            "retry_backoff_secs",
            self.retry_backoff_secs as usize,
            1,
        )?;
        validation::validate_positive_number(
            "max_poll_attempts",
            self.max_poll_attempts as usize,
            1,
        )?;
        if let Some(profile) = &self.profile {
            validation::validate_non_empty_string("profile", profile)?;
        }
        Ok(())
    }
}

impl ConfigProvider for CliConfig {
    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn search_limit(&self) -> usize {
        self.search_limit
    }

    fn debounce_ms(&self) -> u64 {
        self.debounce_ms
    }

    fn poll_interval_secs(&self) -> u64 {
        self.poll_interval_secs
    }

    fn retry_backoff_secs(&self) -> u64 {
        self.retry_backoff_secs
    }

    fn max_poll_attempts(&self) -> u32 {
        self.max_poll_attempts
    }
}
