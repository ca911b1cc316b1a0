use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use pmrando::item_pool::generate_itempool;
use pmrando::settings::{load_settings, option_variants, PaperMarioSettings};
use pmrando::spoiler_log::PoolSpoiler;
use pmrando::world::StandaloneWorld;
use pmrando_game::GameData;
use rand::{RngCore, SeedableRng};
use std::path::PathBuf;

#[derive(Parser)]
struct Args {
    #[arg(long)]
    settings: Option<PathBuf>,

    // Directory containing the `data` tables.
    #[arg(long, default_value = "..")]
    data: PathBuf,

    #[arg(long)]
    random_seed: Option<usize>,

    #[arg(long)]
    output_pool: Option<PathBuf>,

    #[arg(long)]
    list_options: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();
    if args.list_options {
        for (option, variants) in option_variants() {
            println!("{option}: {}", variants.join(", "));
        }
        return Ok(());
    }

    let game_data = GameData::load(&args.data)?;
    let settings = match &args.settings {
        Some(path) => load_settings(path)?,
        None => PaperMarioSettings::default(),
    };

    let root_seed = match args.random_seed {
        Some(s) => s,
        None => (rand::rngs::StdRng::from_entropy().next_u64() & 0xFFFFFFFF) as usize,
    };
    let mut rng_seed = [0u8; 32];
    rng_seed[..8].copy_from_slice(&root_seed.to_le_bytes());
    let mut rng = rand::rngs::StdRng::from_seed(rng_seed);
    info!(
        "Generating item pool: settings={}, seed={root_seed}",
        settings.name.as_deref().unwrap_or("(default)")
    );

    let mut world = StandaloneWorld::from_vanilla(&game_data);
    let item_pool = generate_itempool(&mut world, &settings, &game_data, &mut rng)?;
    info!(
        "Item pool has {} items, {} items locked in place",
        world.itempool.len(),
        world.locked_items.len()
    );

    if let Some(output_pool_path) = &args.output_pool {
        println!("Writing item pool to {}", output_pool_path.display());
        let spoiler = PoolSpoiler::new(&item_pool, &world.locations, &settings, root_seed);
        let spoiler_str = serde_json::to_string_pretty(&spoiler)?;
        std::fs::write(output_pool_path, spoiler_str).with_context(|| {
            format!("Unable to write item pool to {}", output_pool_path.display())
        })?;
    }

    Ok(())
}
