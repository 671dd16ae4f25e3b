use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

use fragment_randomiser_core::{
    run, Distribution, GzJsonFile, Persistence, RandomiserSettings, SeedPolicy, StaticData,
};

#[derive(Debug, Parser)]
#[command(
    name = "fragment-randomiser",
    version,
    about = "Redistributes fragments and the start point across biomes"
)]
struct Args {
    /// World table (JSON file, or a directory containing world.json).
    #[arg(long, required_unless_present = "inspect")]
    data: Option<PathBuf>,

    /// Where the gzip-compressed distribution is written.
    #[arg(long, required_unless_present = "inspect")]
    output: Option<PathBuf>,

    /// Fixed seed. A fresh one is drawn when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Settings file (JSON). Flags below override its values.
    #[arg(long)]
    settings: Option<PathBuf>,

    #[arg(long)]
    max_biomes_per_item: Option<u32>,

    #[arg(long)]
    spawn_chance_min: Option<f32>,

    #[arg(long)]
    spawn_chance_max: Option<f32>,

    #[arg(long)]
    max_items_per_region: Option<u32>,

    #[arg(long, default_value_t = false)]
    randomize_discovery_count: bool,

    #[arg(long, default_value_t = false)]
    recipes_randomized: bool,

    /// "unchanged", "random-reachable", "fully-random" or a region name.
    #[arg(long)]
    start_mode: Option<String>,

    #[arg(long, default_value_t = false)]
    debug: bool,

    /// Debug-only: load a saved distribution and print a summary.
    #[arg(long, value_name = "FILE", hide = true)]
    inspect: Option<PathBuf>,
}

fn build_settings(args: &Args) -> fragment_randomiser_core::Result<RandomiserSettings> {
    let mut settings = match &args.settings {
        Some(path) => RandomiserSettings::from_json_str(&std::fs::read_to_string(path)?)?,
        None => RandomiserSettings::default(),
    };
    if let Some(v) = args.max_biomes_per_item {
        settings.max_biomes_per_item = v;
    }
    if let Some(v) = args.spawn_chance_min {
        settings.spawn_chance_min = v;
    }
    if let Some(v) = args.spawn_chance_max {
        settings.spawn_chance_max = v;
    }
    if let Some(v) = args.max_items_per_region {
        settings.max_items_per_region = v;
    }
    if let Some(mode) = &args.start_mode {
        settings.start_mode = mode.clone();
    }
    settings.randomize_discovery_count |= args.randomize_discovery_count;
    settings.recipes_randomized |= args.recipes_randomized;
    Ok(settings)
}

fn print_summary(dist: &Distribution) {
    println!("seed: {}", dist.seed);
    match dist.start {
        Some(c) => println!("start: ({}, {}, {})", c.x, c.y, c.z),
        None => println!("start: unchanged"),
    }
    for record in dist.placements.values() {
        let regions = record.regions();
        println!("{} -> {} regions: {}", record.item, regions.len(), regions.join(", "));
        if let Some(n) = dist.discovery_overrides.get(&record.item) {
            println!("  discoveries to unlock: {n}");
        }
        for variant in &record.variants {
            println!(
                "  {} total={:.4}",
                variant.class_id,
                variant.total_probability()
            );
        }
    }
}

fn main() {
    let args = Args::parse();

    let level = if args.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    // Debug path: inspect a saved distribution and exit.
    if let Some(path) = args.inspect.as_ref() {
        match GzJsonFile::new(path).load() {
            Ok(dist) => print_summary(&dist),
            Err(e) => {
                eprintln!("Failed to load {:?}: {}", path, e);
                std::process::exit(1);
            }
        }
        return;
    }

    let result = (|| -> fragment_randomiser_core::Result<Distribution> {
        let settings = build_settings(&args)?;
        // clap enforces --data and --output unless --inspect was given.
        let data_path = args.data.clone().unwrap_or_default();
        let output = args.output.clone().unwrap_or_default();
        let data = StaticData::from_path(&data_path)?;
        let policy = args.seed.map_or(SeedPolicy::Fresh, SeedPolicy::Fixed);
        let mut store = GzJsonFile::new(output);
        run(data, settings, policy, &mut store)
    })();

    match result {
        Ok(dist) => {
            if args.debug {
                print_summary(&dist);
            }
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}
