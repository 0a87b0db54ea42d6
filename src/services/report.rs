use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::models::query::METERS_PER_MILE;
use crate::models::restaurant::{RestaurantRecord, NO_PRICE_LEVEL};

pub const NO_RESULTS: &str = "No restaurants found in radius. Try with a larger radius";

pub struct Report<'a> {
    pub limit: usize,
    pub restaurants: &'a [RestaurantRecord],
    pub summaries: &'a [String],
    pub location: &'a str,
    pub radius_meters: f64,
    pub generated_at: OffsetDateTime,
}

impl Report<'_> {
    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }

    pub fn render<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        if self.is_empty() {
            writeln!(out, "{}", NO_RESULTS)?;
            return Ok(());
        }

        let separator = "-".repeat(50);
        let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

        writeln!(out, "\n{}\n", separator)?;
        writeln!(
            out,
            "Found {} restaurants near {} within {:.2} miles",
            self.restaurants.len(),
            self.location,
            self.radius_meters / METERS_PER_MILE
        )?;
        writeln!(out, "Generated at {} UTC", self.generated_at.format(format)?)?;
        writeln!(out, "\n{}\n", separator)?;

        for (i, place) in self.restaurants.iter().take(self.limit).enumerate() {
            let rating = place
                .rating
                .map(|rating| format!("{:.1}", rating))
                .unwrap_or_else(|| "N/A".to_string());
            let cost = place
                .price_level
                .as_ref()
                .map(|level| level.render())
                .unwrap_or_else(|| NO_PRICE_LEVEL.to_string());

            writeln!(out, "{}) {}", i + 1, place.name)?;
            writeln!(out, "{}  |  {}", place.address, rating)?;
            writeln!(out, "Cost: {}", cost)?;
            if let Some(summary) = self.summaries.get(i) {
                writeln!(out, "\n{}", summary)?;
            }
            writeln!(out, "\n{}\n", separator)?;
        }

        Ok(())
    }

    /// Writes the report to `path`, replacing any previous report.
    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create report file {}", path.display()))?;
        let mut out = BufWriter::new(file);
        self.render(&mut out)?;
        out.flush()
            .with_context(|| format!("Failed to write report file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::restaurant::PriceLevel;

    fn restaurant(name: &str, price_level: Option<PriceLevel>, rating: Option<f64>) -> RestaurantRecord {
        RestaurantRecord {
            name: name.to_string(),
            address: "12 Elm St, Springfield".to_string(),
            zipcode: Some("12345".to_string()),
            city: Some("Springfield".to_string()),
            rating,
            price_level,
            keyword: None,
        }
    }

    fn render(report: &Report) -> String {
        let mut out = Vec::new();
        report.render(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn report<'a>(limit: usize, restaurants: &'a [RestaurantRecord], summaries: &'a [String]) -> Report<'a> {
        Report {
            limit,
            restaurants,
            summaries,
            location: "Springfield, IL",
            radius_meters: METERS_PER_MILE * 1.5,
            generated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_empty_report_is_a_notice() {
        let text = render(&report(5, &[], &[]));

        assert_eq!(text.trim(), NO_RESULTS);
        assert!(!text.contains("1)"));
    }

    #[test]
    fn test_blocks_are_capped_by_limit() {
        let restaurants = vec![
            restaurant("Slice House", Some(PriceLevel::Level(2)), Some(4.5)),
            restaurant("Noodle Bar", Some(PriceLevel::Opaque("moderate".to_string())), None),
            restaurant("Curry Hut", None, Some(3.9)),
        ];
        let summaries = vec!["Cheesy.".to_string(), "Slurpy.".to_string(), "Spicy.".to_string()];

        let text = render(&report(2, &restaurants, &summaries));

        assert!(text.contains("Found 3 restaurants near Springfield, IL within 1.50 miles"));
        assert!(text.contains("Generated at 1970-01-01 00:00:00 UTC"));
        assert!(text.contains("1) Slice House\n12 Elm St, Springfield  |  4.5\nCost: $$---\n\nCheesy."));
        assert!(text.contains("2) Noodle Bar\n12 Elm St, Springfield  |  N/A\nCost: moderate\n\nSlurpy."));
        assert!(!text.contains("Curry Hut"));
        assert!(!text.contains("Spicy."));
    }

    #[test]
    fn test_whole_rating_keeps_one_decimal() {
        let restaurants = vec![restaurant("Taco Stand", Some(PriceLevel::Level(1)), Some(4.0))];
        let summaries = vec!["Crunchy.".to_string()];

        let text = render(&report(5, &restaurants, &summaries));

        assert!(text.contains("12 Elm St, Springfield  |  4.0\nCost: $----"));
    }

    #[test]
    fn test_missing_price_level_notice() {
        let restaurants = vec![restaurant("Curry Hut", None, Some(3.9))];
        let summaries = vec!["Spicy.".to_string()];

        let text = render(&report(5, &restaurants, &summaries));

        assert!(text.contains(&format!("Cost: {}", NO_PRICE_LEVEL)));
    }

    #[test]
    fn test_write_to_file() {
        let path = std::env::temp_dir().join(format!("food-near-u-report-{}.txt", std::process::id()));

        report(5, &[], &[]).write_to(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(written.contains("No restaurants found"));
    }
}
