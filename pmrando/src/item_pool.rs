mod augment;
pub mod classify;
pub mod exclusion;
pub mod reconcile;

use crate::modify_itempool::{get_randomized_itempool, get_trapped_itempool};
use crate::settings::PaperMarioSettings;
use crate::world::ItemPoolHost;
use anyhow::{Context, Result};
use hashbrown::HashMap;
use log::info;
use pmrando_game::{GameData, Location};
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use self::augment::add_bonus_items;
use self::classify::classify_locations;
use self::exclusion::{get_items_to_exclude, remove_excluded_items};
use self::reconcile::{limit_badges, reconcile_pool_size};

/// Item pools built up while walking the locations. Every shuffled item lands in
/// exactly one bucket; they are only merged once the pool has the right size.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct PoolBuckets {
    pub progression: Vec<String>,
    pub misc_progression: Vec<String>,
    pub coins: Vec<String>,
    pub consumables: Vec<String>,
    pub badges: Vec<String>,
    pub other: Vec<String>,
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSizes {
    pub progression: usize,
    pub misc_progression: usize,
    pub coins: usize,
    pub consumables: usize,
    pub badges: usize,
    pub other: usize,
}

impl PoolBuckets {
    pub fn len(&self) -> usize {
        self.progression.len()
            + self.misc_progression.len()
            + self.coins.len()
            + self.consumables.len()
            + self.badges.len()
            + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sizes(&self) -> BucketSizes {
        BucketSizes {
            progression: self.progression.len(),
            misc_progression: self.misc_progression.len(),
            coins: self.coins.len(),
            consumables: self.consumables.len(),
            badges: self.badges.len(),
            other: self.other.len(),
        }
    }

    /// Remove one copy of `item` from the first bucket that holds it. Coins and
    /// consumables are never touched. Returns whether anything was removed.
    pub fn remove_item(&mut self, item: &str) -> bool {
        for bucket in [
            &mut self.progression,
            &mut self.misc_progression,
            &mut self.badges,
            &mut self.other,
        ] {
            if let Some(idx) = bucket.iter().position(|x| x == item) {
                bucket.remove(idx);
                return true;
            }
        }
        false
    }
}

#[derive(Clone, Debug)]
pub struct ItemPool {
    pub pool: Vec<String>,
    pub placed_items: HashMap<String, String>, // location name -> item name
    pub target_size: usize,
    pub bucket_sizes: BucketSizes,
}

/// Pick a random Tayce T. item that is allowed to be placed as filler.
pub fn get_random_taycet_item<R: Rng>(game_data: &GameData, rng: &mut R) -> Result<String> {
    let candidates: Vec<&String> = game_data
        .taycet_items
        .iter()
        .filter(|x| !game_data.exclude_from_taycet_placement.contains(*x))
        .collect();
    let item = candidates
        .choose(rng)
        .context("No Tayce T. items available for placement")?;
    Ok(item.to_string())
}

pub fn get_pool_core<R: Rng>(
    locations: &mut [Location],
    settings: &PaperMarioSettings,
    game_data: &GameData,
    rng: &mut R,
) -> Result<ItemPool> {
    let (mut buckets, placed_items) = classify_locations(locations, settings, game_data, rng)?;

    // Every location is now either left unshuffled or has contributed exactly one item,
    // so the current size is the number of locations the pool has to fill.
    let target_size = buckets.len();
    info!(
        "Classified locations: {} shuffled, {} placed, buckets {:?}",
        target_size,
        placed_items.len(),
        buckets.sizes()
    );

    add_bonus_items(&mut buckets, settings, game_data)?;
    let excluded_items = get_items_to_exclude(settings, game_data)?;
    remove_excluded_items(&mut buckets, excluded_items);
    info!(
        "Adjusted pool for settings: {} items, buckets {:?}",
        buckets.len(),
        buckets.sizes()
    );

    limit_badges(
        &mut buckets,
        settings.item_pool_settings.badge_pool_limit,
        rng,
    );
    reconcile_pool_size(&mut buckets, target_size, game_data, rng)?;
    let bucket_sizes = buckets.sizes();
    info!("Reconciled pool to {target_size} items, buckets {bucket_sizes:?}");

    let PoolBuckets {
        progression,
        misc_progression,
        coins,
        consumables,
        badges,
        mut other,
    } = buckets;
    other.extend(coins);
    other.extend(consumables);
    other.extend(badges);

    let pool_settings = &settings.item_pool_settings;
    let other = get_randomized_itempool(
        other,
        pool_settings.consumable_item_pool,
        pool_settings.consumable_item_quality,
        pool_settings.beta_items,
        game_data,
        rng,
    )?;
    let other = get_trapped_itempool(
        other,
        pool_settings.item_traps,
        settings.location_settings.koot_favors,
        settings.location_settings.dojo,
        settings.location_settings.keysanity,
        pool_settings.power_stars_enabled(),
        pool_settings.beta_items,
        settings.partner_settings.partner_upgrades,
        game_data,
        rng,
    )?;

    let mut pool = progression;
    pool.extend(other);
    pool.extend(misc_progression);

    Ok(ItemPool {
        pool,
        placed_items,
        target_size,
        bucket_sizes,
    })
}

/// Build the item pool for a host world: the pool is handed over as created items,
/// and every unshuffled item is locked into its vanilla location.
pub fn generate_itempool<H: ItemPoolHost, R: Rng>(
    host: &mut H,
    settings: &PaperMarioSettings,
    game_data: &GameData,
    rng: &mut R,
) -> Result<ItemPool> {
    let item_pool = get_pool_core(host.locations_mut(), settings, game_data, rng)?;

    let items = item_pool
        .pool
        .iter()
        .map(|name| host.create_item(name, false))
        .collect::<Result<Vec<_>>>()?;
    host.set_itempool(items);

    let mut placements: Vec<(&String, &String)> = item_pool.placed_items.iter().collect();
    placements.sort();
    for (location_name, item_name) in placements {
        let item = host.create_item(item_name, true)?;
        host.place_locked_item(location_name, item)
            .with_context(|| format!("Unable to place {item_name} at {location_name}"))?;
    }
    Ok(item_pool)
}
