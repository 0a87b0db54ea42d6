use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::clients::genai::DEFAULT_MODEL;
use crate::helpers::retry::RetryPolicy;
use crate::services::nearby_search::PAGE_DELAY;

pub const DEFAULT_LIMIT: usize = 60;

#[derive(Parser, Clone, Debug)]
#[clap(name = "food-near-u", about = "Find restaurants near a location")]
pub struct Config {
    #[clap(env, long, hide_env_values = true)]
    pub google_maps_api_key: String,

    #[clap(env, long, hide_env_values = true)]
    pub genai_key: String,

    #[clap(env, long, default_value = DEFAULT_MODEL)]
    pub genai_model: String,

    /// Postgres connection string; an in-memory catalog is used when unset.
    #[clap(env, long, hide_env_values = true)]
    pub database_url: Option<String>,

    #[clap(env, long, default_value = "out.txt")]
    pub output_path: PathBuf,

    #[clap(env, long, default_value_t = 5)]
    pub retry_limit: usize,

    #[clap(env, long, default_value_t = 3)]
    pub retry_delay_secs: u64,

    /// Seconds to wait before each page continuation, at least 2.
    #[clap(env, long, default_value_t = 2, value_parser = clap::value_parser!(u64).range(2..))]
    pub page_delay_secs: u64,

    /// Street address, city, state. Prompted for when omitted.
    #[clap(long)]
    pub location: Option<String>,

    /// Search radius in miles. Prompted for when omitted.
    #[clap(long)]
    pub radius_miles: Option<f64>,

    /// Food type, e.g. sushi or pizza.
    #[clap(long)]
    pub keyword: Option<String>,

    /// Number of restaurants to report, 60 when omitted.
    #[clap(long)]
    pub limit: Option<usize>,
}

impl Config {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_limit, Duration::from_secs(self.retry_delay_secs))
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_secs(self.page_delay_secs).max(PAGE_DELAY)
    }
}
