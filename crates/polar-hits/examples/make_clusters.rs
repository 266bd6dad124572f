//! Build polar clusters for one event described in a JSON file.
//!
//! Usage: `cargo run -p polar-hits --example make_clusters -- <event.json> [report.json]`

use std::{env, path::PathBuf};

#[cfg(not(feature = "tracing"))]
use log::info;

#[cfg(feature = "tracing")]
use tracing::info;

use polar_hits::EventInput;

/// Debug output, minus the per-plane anchor lines.
const DEFAULT_FILTER: &str = "debug,polar_hits::vertex=info";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());

    #[cfg(not(feature = "tracing"))]
    polar_hits::init(filter.parse()?)?;

    #[cfg(feature = "tracing")]
    polar_hits::init_tracing(&filter)?;

    let mut args = env::args().skip(1);
    let input = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata/event.json"));
    let output = args.next().map(PathBuf::from);

    let event = EventInput::load_json(&input)?;
    info!(
        "loaded {} clusters, {} vertex candidates from {}",
        event.clusters.len(),
        event.vertices.len(),
        input.display()
    );

    let report = event.run()?;
    for (i, cluster) in report.clusters.iter().enumerate() {
        info!("cluster {i}: {} points", cluster.len());
    }

    match output {
        Some(path) => {
            report.write_json(&path)?;
            info!("wrote report to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}
