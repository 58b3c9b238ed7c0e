use anyhow::{bail, Context, Result};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use multialign::alignment::AlignmentPipeline;
use multialign::config::{AlignmentConfig, MethodKind};
use multialign::filter::FilterSpec;
use multialign::model::{ConsensusRow, FeatureKey, Sample, SampleBuilder};

/// Arguments of the `demo` subcommand.
pub struct DemoArgs {
    pub samples: usize,
    pub features: usize,
    pub seed: u64,
    pub config: Option<PathBuf>,
    pub method: Option<MethodKind>,
    pub filters: Vec<String>,
    pub report: Option<PathBuf>,
}

// Synthetic compound space and per-run drift
const MASS_RANGE: (f64, f64) = (100.0, 1000.0);
const RT_RANGE: (f64, f64) = (1.0, 60.0);
const MASS_JITTER: f64 = 0.003;
const RT_JITTER: f64 = 0.15;
const DETECTION_RATE: f64 = 0.8;

#[derive(Serialize)]
struct DemoReport {
    method: MethodKind,
    samples: usize,
    input_features: usize,
    rows: Vec<RowReport>,
    filters: Vec<FilterSummary>,
}

#[derive(Serialize)]
struct RowReport {
    mean_mass: f64,
    mean_rt: f64,
    features: Vec<FeatureKey>,
}

#[derive(Serialize)]
struct FilterSummary {
    label: String,
    input_rows: usize,
    rejected_rows: usize,
}

impl From<&ConsensusRow> for RowReport {
    fn from(row: &ConsensusRow) -> Self {
        Self {
            mean_mass: row.mean_mass(),
            mean_rt: row.mean_rt(),
            features: row.keys().collect(),
        }
    }
}

/// Generate synthetic samples, align them and print a summary.
pub fn run(args: DemoArgs) -> Result<()> {
    if args.samples == 0 {
        bail!("--samples must be at least 1");
    }

    let mut config = match &args.config {
        Some(path) => AlignmentConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => AlignmentConfig::new(0.01, 0.5),
    };
    if let Some(method) = args.method {
        config.method = method;
    }
    for text in &args.filters {
        let spec =
            FilterSpec::parse(text).with_context(|| format!("Invalid filter '{}'", text))?;
        config.filters.push(spec);
    }

    info!(
        "Generating {} samples from {} compounds (seed {})",
        args.samples, args.features, args.seed
    );
    let samples = generate_samples(args.samples, args.features, args.seed);
    let input_features: usize = samples.iter().map(Sample::len).sum();

    let mut pipeline = AlignmentPipeline::from_config(&config, samples, None)
        .context("Failed to set up alignment")?;

    let start = Instant::now();
    let rows = pipeline.align().context("Alignment failed")?;
    let elapsed = start.elapsed();

    let mut sizes = vec![0usize; args.samples + 1];
    for row in rows {
        if let Some(count) = sizes.get_mut(row.len()) {
            *count += 1;
        }
    }

    println!("Alignment complete ({})", config.method);
    println!("  Samples:         {}", args.samples);
    println!("  Input features:  {}", input_features);
    println!("  Consensus rows:  {}", rows.len());
    println!("  Elapsed:         {:.2?}", elapsed);
    println!("  Row sizes:");
    for (size, count) in sizes.iter().enumerate().filter(|(_, c)| **c > 0) {
        println!("    {:>3} features: {}", size, count);
    }
    for report in pipeline.filter_reports() {
        println!(
            "  {}: {} of {} rows rejected",
            report.label,
            report.rejected.len(),
            report.input_rows
        );
    }

    if let Some(path) = &args.report {
        let report = DemoReport {
            method: config.method,
            samples: args.samples,
            input_features,
            rows: pipeline
                .alignment_result()
                .unwrap_or_default()
                .iter()
                .map(RowReport::from)
                .collect(),
            filters: pipeline
                .filter_reports()
                .iter()
                .map(|r| FilterSummary {
                    label: r.label.clone(),
                    input_rows: r.input_rows,
                    rejected_rows: r.rejected.len(),
                })
                .collect(),
        };
        let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Report written to {}", path.display());
    }

    Ok(())
}

/// Every sample sees each compound with a fixed probability, slightly shifted.
fn generate_samples(count: usize, compounds: usize, seed: u64) -> Vec<Sample> {
    let mut rng = StdRng::seed_from_u64(seed);
    let truth: Vec<(f64, f64)> = (0..compounds)
        .map(|_| {
            (
                rng.gen_range(MASS_RANGE.0..MASS_RANGE.1),
                rng.gen_range(RT_RANGE.0..RT_RANGE.1),
            )
        })
        .collect();

    (0..count)
        .map(|id| {
            let drift = rng.gen_range(-RT_JITTER..RT_JITTER);
            let mut builder = SampleBuilder::new(id, format!("sample_{:02}", id));
            for (peak_id, &(mass, rt)) in truth.iter().enumerate() {
                if !rng.gen_bool(DETECTION_RATE) {
                    continue;
                }
                builder = builder.add_feature(
                    peak_id as u32,
                    mass + rng.gen_range(-MASS_JITTER..MASS_JITTER),
                    rt + drift + rng.gen_range(-RT_JITTER..RT_JITTER),
                    rng.gen_range(1.0e3..1.0e6),
                );
            }
            builder.build()
        })
        .collect()
}
