//! Filter-based discovery example
//!
//! Discovers new listings matching search filters instead of scraping known
//! URLs. Filter records with a blank `location` are dropped before
//! submission; blank secondary filters are stripped from each record.
//!
//! Requires `API_TOKEN` in the environment.

use dataset_dl::{CollectionJob, Collector, Config, Dataset, DiscoverBy};
use std::collections::BTreeMap;

fn filter(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let token = std::env::var("API_TOKEN")?;
    let collector = Collector::new(token, Config::default())?;

    let job = CollectionJob {
        dataset: Dataset::new("gd_lfqkr8wm13ixtbd8f5")
            .discover_by(DiscoverBy::InputFilters)
            .primary_field("location"),
        inputs: vec![
            filter(&[
                ("location", "92027"),
                ("listingCategory", "Sold"),
                ("HomeType", "Houses"),
            ]),
            filter(&[
                ("location", "New York"),
                ("listingCategory", "House for rent"),
                ("HomeType", "Condos"),
            ]),
            // Blank secondary filters are stripped before submission
            filter(&[("location", "Colorado"), ("listingCategory", ""), ("HomeType", "")]),
        ],
        destination: "zillow_discovered_properties.json".into(),
    };

    if collector.run(&job).await {
        println!("results written to {}", job.destination.display());
    }
    Ok(())
}
