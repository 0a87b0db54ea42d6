use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{bail, Context};
use bb8_postgres::bb8::Pool;
use bb8_postgres::tokio_postgres::NoTls;
use bb8_postgres::PostgresConnectionManager;
use clap::Parser;
use dotenv::dotenv;
use time::OffsetDateTime;
use tracing::{info, warn};

use food_near_u::clients::genai::GeminiClient;
use food_near_u::clients::google_maps::GoogleMapsClient;
use food_near_u::clients::PlacesApi;
use food_near_u::config::{Config, DEFAULT_LIMIT};
use food_near_u::helpers::retry::RetryPolicy;
use food_near_u::models::area::Location;
use food_near_u::models::query::{normalize_keyword, SearchQuery, METERS_PER_MILE};
use food_near_u::repositories::memory_repo::MemoryRestaurantStore;
use food_near_u::repositories::postgres_repo::PostgresConnectionRepo;
use food_near_u::repositories::RestaurantStore;
use food_near_u::services::area_resolver::{locate, FormattedAddressResolver};
use food_near_u::services::lookup::RestaurantFinder;
use food_near_u::services::nearby_search::NearbySearch;
use food_near_u::services::report::{Report, NO_RESULTS};
use food_near_u::services::summary::SummaryGenerator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::parse();
    run(config).await
}

async fn run(config: Config) -> anyhow::Result<()> {
    println!("Welcome to Food Near U!");
    let retry = config.retry_policy();

    let places: Arc<dyn PlacesApi> = Arc::new(
        GoogleMapsClient::new(config.google_maps_api_key.clone())
            .context("Failed to build the Google Maps client")?,
    );
    let generator = Arc::new(
        GeminiClient::new(config.genai_key.clone(), config.genai_model.clone())
            .context("Failed to build the GenAI client")?,
    );
    let store = connect_store(&config, retry).await?;

    let interactive = config.location.is_none();
    let (location, center) = resolve_location(places.as_ref(), retry, config.location.as_deref()).await?;

    let radius_miles = match config.radius_miles {
        Some(radius) => radius,
        None => prompt("Please enter the radius to search in miles: ")?
            .parse::<f64>()
            .context("Radius must be a number of miles")?,
    };
    let keyword = flag_or_ask(config.keyword.clone(), interactive, || {
        prompt("Food type? (e.g., sushi, pizza, etc or press enter to skip): ")
    })?;
    let limit = flag_or_ask(config.limit, interactive, || {
        let answer = prompt("How many results would you like? (default 60, press enter to skip): ")?;
        if answer.is_empty() {
            return Ok(DEFAULT_LIMIT);
        }
        answer.parse::<usize>().context("Result count must be a non-negative number")
    })?
    .unwrap_or(DEFAULT_LIMIT);
    let keyword = normalize_keyword(keyword.as_deref());

    let query = SearchQuery::new(center, radius_miles * METERS_PER_MILE, keyword, limit);
    let finder = RestaurantFinder::new(
        store,
        Arc::new(FormattedAddressResolver::new(places.clone(), retry)),
        NearbySearch::new(places, retry, config.page_delay()),
    );
    let restaurants = finder
        .lookup(&query)
        .await
        .context("Restaurant lookup failed")?;

    let summaries = SummaryGenerator::new(generator, retry)
        .summarize(&restaurants, query.limit)
        .await
        .context("Summary generation failed")?;

    let report = Report {
        limit: query.limit,
        restaurants: &restaurants,
        summaries: &summaries,
        location: &location,
        radius_meters: query.radius_meters,
        generated_at: OffsetDateTime::now_utc(),
    };
    report.write_to(&config.output_path)?;

    if report.is_empty() {
        println!("\n{}", NO_RESULTS);
    } else {
        info!("Report written to {}", config.output_path.display());
    }
    Ok(())
}

async fn connect_store(config: &Config, retry: RetryPolicy) -> anyhow::Result<Arc<dyn RestaurantStore>> {
    let Some(database_url) = config.database_url.as_deref() else {
        warn!("DATABASE_URL is not set, cached restaurants will not persist between runs");
        return Ok(Arc::new(MemoryRestaurantStore::new()));
    };

    let manager = PostgresConnectionManager::new_from_stringlike(database_url, NoTls)
        .context("Invalid DATABASE_URL")?;
    let pool = Pool::builder()
        .build(manager)
        .await
        .context("Error building the postgres connection pool")?;

    let repo = PostgresConnectionRepo::new(pool, retry);
    repo.ensure_schema()
        .await
        .context("Failed to prepare the restaurants table")?;
    Ok(Arc::new(repo))
}

/// Geocodes the given location, or keeps prompting until one resolves when
/// none was passed on the command line.
async fn resolve_location(
    places: &dyn PlacesApi,
    retry: RetryPolicy,
    location: Option<&str>,
) -> anyhow::Result<(String, Location)> {
    if let Some(location) = location {
        return match locate(places, retry, location).await? {
            Some(center) => Ok((location.to_string(), center)),
            None => bail!("Could not find a location matching {:?}", location),
        };
    }

    loop {
        let location = prompt("Please enter your current location (street address, city, state): ")?;
        if location.is_empty() {
            continue;
        }
        if let Some(center) = locate(places, retry, &location).await? {
            return Ok((location, center));
        }
    }
}

/// The flag value when given, otherwise the user's answer in an interactive
/// session. Non-interactive runs never block on stdin.
fn flag_or_ask<T>(
    flag: Option<T>,
    interactive: bool,
    ask: impl FnOnce() -> anyhow::Result<T>,
) -> anyhow::Result<Option<T>> {
    match flag {
        Some(value) => Ok(Some(value)),
        None if interactive => ask().map(Some),
        None => Ok(None),
    }
}

fn prompt(message: &str) -> anyhow::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        bail!("Input closed before an answer was given");
    }
    Ok(line.trim().to_string())
}
