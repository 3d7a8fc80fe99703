use anyhow::{Context, Result};
use electmap::{read_topology, AdminLevel};

use crate::commands::load_config;

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::ValidateArgs) -> Result<()> {
    let path = match &args.path {
        Some(path) => path.clone(),
        None => load_config(cli)?.output,
    };

    let topology = read_topology(&path).with_context(|| format!("validating {}", path.display()))?;
    for level in AdminLevel::ALL {
        let name = level.object_name();
        let features = topology.features(name).with_context(|| format!("decoding {name}"))?;
        println!("[validate] {name}: {}", features.len());
    }
    println!("[validate] arcs: {}", topology.arcs.len());
    if let Some([x0, y0, x1, y1]) = topology.bbox {
        println!("[validate] bbox: [{x0}, {y0}, {x1}, {y1}]");
    }

    Ok(())
}
