//! URL-seeded discovery example
//!
//! Discovers new listings starting from seed search URLs, then runs the
//! batch entry point to show the aggregate summary.
//!
//! Requires `API_TOKEN` in the environment.

use dataset_dl::{CollectionJob, Collector, Config, Dataset, DiscoverBy};
use std::collections::BTreeMap;

fn seed(url: &str) -> BTreeMap<String, String> {
    let mut record = BTreeMap::new();
    record.insert("url".to_string(), url.to_string());
    record
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let token = std::env::var("API_TOKEN")?;
    let collector = Collector::new(token, Config::default())?;

    let dataset = Dataset::new("gd_lfqkr8wm13ixtbd8f5").discover_by(DiscoverBy::Url);

    let jobs = vec![
        CollectionJob {
            dataset: dataset.clone(),
            inputs: vec![seed("https://www.zillow.com/homes/for_sale/Los-Angeles_rb/")],
            destination: "discovered_la.json".into(),
        },
        CollectionJob {
            dataset,
            inputs: vec![seed("https://www.zillow.com/homes/for_sale/San-Diego_rb/")],
            destination: "discovered_sd.json".into(),
        },
    ];

    let summary = collector.run_batch(&jobs).await;
    println!(
        "{}/{} runs succeeded, {} records collected",
        summary.succeeded, summary.attempted, summary.records_collected
    );
    Ok(())
}
