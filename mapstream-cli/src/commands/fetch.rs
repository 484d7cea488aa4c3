//! Fetch command - load one tile through the configured providers.

use std::collections::BTreeMap;

use mapstream::app::MapStreamApp;
use mapstream::config::ConfigFile;
use mapstream::provider::TileRequest;
use mapstream::vector::VectorFeatureCollection;

use super::common::tile_at;
use crate::error::CliError;

/// Run the fetch command.
pub async fn run(config: ConfigFile, lat: f64, lon: f64, json: bool) -> Result<(), CliError> {
    let zoom = config.tiles.data_zoom;
    let coord = tile_at(lat, lon, zoom)?;
    let app = MapStreamApp::from_config(config)?;
    let aggregator = app.aggregator();

    if !json {
        println!(
            "Fetching tile {} at ZL{} from {}",
            coord,
            zoom,
            aggregator.provider_names().join(", ")
        );
    }

    let collection = aggregator
        .get_collection(TileRequest::new(coord, zoom))
        .await?;

    if json {
        let text = serde_json::to_string_pretty(&collection)
            .map_err(|e| CliError::Output(e.to_string()))?;
        println!("{}", text);
    } else {
        print_summary(&collection);
    }
    Ok(())
}

fn print_summary(collection: &VectorFeatureCollection) {
    let nodes = count_by(collection.nodes.iter().map(|n| {
        n.descriptor
            .kind
            .as_ref()
            .map(|k| format!("{:?}", k))
            .unwrap_or_else(|| "Untyped".to_string())
    }));
    let polylines = count_by(
        collection
            .polylines
            .iter()
            .map(|p| format!("{:?}", p.descriptor.kind)),
    );
    let areas = count_by(
        collection
            .areas
            .iter()
            .map(|a| format!("{:?}", a.descriptor.kind)),
    );

    for (title, total, counts) in [
        ("Nodes", collection.nodes.len(), nodes),
        ("Polylines", collection.polylines.len(), polylines),
        ("Areas", collection.areas.len(), areas),
    ] {
        println!("{}: {}", title, total);
        for (kind, count) in counts {
            println!("  {:<24} {:>6}", kind, count);
        }
    }
}

fn count_by(kinds: impl Iterator<Item = String>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for kind in kinds {
        *counts.entry(kind).or_insert(0) += 1;
    }
    counts
}
