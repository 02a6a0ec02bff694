//! Price history example
//!
//! Collects the price history of known listings. Identical workflow to the
//! property scrape, differing only in the target dataset and output file.
//!
//! Requires `API_TOKEN` in the environment.

use dataset_dl::{CollectionJob, Collector, Config, Dataset};
use std::collections::BTreeMap;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let token = std::env::var("API_TOKEN")?;
    let collector = Collector::new(token, Config::default())?;

    let mut listing = BTreeMap::new();
    listing.insert(
        "url".to_string(),
        "https://www.zillow.com/homedetails/73-Beverly-Park-Ln-Beverly-Hills-CA-90210/20533547_zpid/"
            .to_string(),
    );

    let job = CollectionJob {
        dataset: Dataset::new("gd_lxu1cz9r88uiqsosl"),
        inputs: vec![listing],
        destination: "zillow_price_history.json".into(),
    };

    if collector.run(&job).await {
        println!("results written to {}", job.destination.display());
    }
    Ok(())
}
