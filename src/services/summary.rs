use std::sync::Arc;

use tracing::info;

use crate::clients::TextGenerator;
use crate::error::LookupError;
use crate::helpers::retry::{with_retry, RetryPolicy};
use crate::models::restaurant::{RestaurantRecord, NO_ADDRESS, NO_NAME};

pub const TRAVEL_ADVISOR_PERSONA: &str = "You are a travel advisor who clearly describes restaurants briefly \
    highlighting the atmosphere, local popularity, and popular menu items. \
    You will be given the restaurant name and location";

/// Generates one short description per restaurant.
pub struct SummaryGenerator {
    generator: Arc<dyn TextGenerator>,
    retry: RetryPolicy,
}

impl SummaryGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>, retry: RetryPolicy) -> Self {
        Self { generator, retry }
    }

    /// Summaries for the first `limit` records; `summaries[i]` always
    /// describes `records[i]`.
    ///
    /// A record whose generation still fails after retries aborts the whole
    /// batch with an error naming its index, so no summary is ever shifted
    /// onto the wrong restaurant.
    pub async fn summarize(
        &self,
        records: &[RestaurantRecord],
        limit: usize,
    ) -> Result<Vec<String>, LookupError> {
        let count = limit.min(records.len());
        info!("Generating {} GenAI summaries...", count);

        let mut summaries = Vec::with_capacity(count);
        for (index, record) in records.iter().take(count).enumerate() {
            let content = describe(record);
            let summary = with_retry(self.retry, "summary generation", || {
                self.generator.generate(TRAVEL_ADVISOR_PERSONA, &content)
            })
            .await
            .map_err(|source| LookupError::Summary {
                index,
                name: record.name.clone(),
                source,
            })?;
            summaries.push(summary);
        }

        Ok(summaries)
    }
}

fn describe(record: &RestaurantRecord) -> String {
    let name = if record.name.is_empty() { NO_NAME } else { record.name.as_str() };
    let address = if record.address.is_empty() { NO_ADDRESS } else { record.address.as_str() };
    format!(
        "Here is the data for the restaurant: Restaurant name: {}, Address: {}",
        name, address
    )
}
