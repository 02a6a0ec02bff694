//! Property scrape example
//!
//! Collects full property records for a list of known listing URLs:
//! - Building a scrape job for a specific dataset
//! - Running it end to end (trigger, poll, fetch, persist)
//!
//! Requires `API_TOKEN` in the environment.

use dataset_dl::{CollectionJob, Collector, Config, Dataset};
use std::collections::BTreeMap;

fn listing(url: &str) -> BTreeMap<String, String> {
    let mut record = BTreeMap::new();
    record.insert("url".to_string(), url.to_string());
    record
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let token = std::env::var("API_TOKEN")?;
    let collector = Collector::new(token, Config::default())?;

    let job = CollectionJob {
        dataset: Dataset::new("gd_lfqkr8wm13ixtbd8f5"),
        inputs: vec![
            listing(
                "https://www.zillow.com/homedetails/73-Beverly-Park-Ln-Beverly-Hills-CA-90210/20533547_zpid/",
            ),
            listing(
                "https://www.zillow.com/homedetails/1945-N-Edgemont-St-Los-Angeles-CA-90027/20809871_zpid/",
            ),
        ],
        destination: "zillow_properties.json".into(),
    };

    if collector.run(&job).await {
        println!("results written to {}", job.destination.display());
    } else {
        println!("collection failed, see logs");
    }
    Ok(())
}
