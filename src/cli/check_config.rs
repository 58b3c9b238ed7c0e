use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use multialign::config::AlignmentConfig;

/// Load and validate a configuration file, then print what it sets up.
pub fn run(file: PathBuf) -> Result<()> {
    info!("Checking {}", file.display());

    let config = AlignmentConfig::from_file(&file)
        .with_context(|| format!("Failed to load {}", file.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", file.display()))?;

    let tolerance = config.tolerance();
    println!("Configuration OK: {}", file.display());
    println!("  Method:          {}", config.method);
    println!(
        "  Mass tolerance:  {}{}",
        config.mass_tolerance,
        if config.use_ppm { " ppm" } else { "" }
    );
    println!("  RT tolerance:    {}", tolerance.rt);
    if config.use_group_weight {
        println!(
            "  Group weight:    alpha {} (grouping window {})",
            config.alpha, config.grouping_rt_tolerance
        );
    } else {
        println!("  Group weight:    off");
    }
    println!("  Parallel:        {}", config.parallel);
    if config.filters.is_empty() {
        println!("  Filters:         none");
    }
    for (i, spec) in config.filters.iter().enumerate() {
        println!("  Filter {}:        {} ({})", i + 1, spec.kind, spec.threshold);
    }
    Ok(())
}
