//! Fetch remote plan templates and print their flattened intervals.
//!
//! Run with: cargo run --example fetch_template --features http -- <url> [<url> ...]

use std::sync::Arc;
use workout_intervals::http::ProgressCallback;
use workout_intervals::{IntervalUnit, PlanFetcher};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let urls: Vec<String> = std::env::args().skip(1).collect();
    if urls.is_empty() {
        eprintln!("usage: fetch_template <url> [<url> ...]");
        std::process::exit(2);
    }

    let fetcher = PlanFetcher::new()?;
    let progress: ProgressCallback = Arc::new(|done: u32, total: u32| eprintln!("  [{}/{}]", done, total));
    let results = fetcher.fetch_templates(urls.clone(), Some(progress)).await;

    for (url, result) in urls.iter().zip(results) {
        println!("\n{}", url);
        let template = match result.and_then(|zepp| zepp.to_template()) {
            Ok(template) => template,
            Err(e) => {
                println!("  error: {}", e);
                continue;
            }
        };

        println!("  {} ({} intervals)", template.title, template.intervals.len());
        for spec in &template.intervals {
            let target = match spec.unit {
                IntervalUnit::Time => format!("{:.0}s", spec.magnitude),
                IntervalUnit::Distance => format!("{:.0}m", spec.magnitude),
            };
            println!("  - {:?} {} {}", spec.interval_type, target, spec.description);
        }
    }

    Ok(())
}
