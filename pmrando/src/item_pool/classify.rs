use anyhow::{Context, Result};
use hashbrown::HashMap;
use pmrando_game::{
    GameData, ItemCategory, ItemClassification, ItemData, Location, LOCATION_GROUP_BLOCK_COIN,
    LOCATION_GROUP_DOJO_REWARD, LOCATION_GROUP_FAVOR_COIN, LOCATION_GROUP_FAVOR_ITEM,
    LOCATION_GROUP_FAVOR_REWARD, LOCATION_GROUP_FOLIAGE_COIN, LOCATION_GROUP_GEAR,
    LOCATION_GROUP_HIDDEN_PANEL, LOCATION_GROUP_LETTER_CHAIN, LOCATION_GROUP_LETTER_REWARD,
    LOCATION_GROUP_OVERWORLD_COIN, LOCATION_GROUP_PARTNER, LOCATION_GROUP_RADIO_TRADE_EVENT,
    LOCATION_GROUP_SHOP_ITEM,
};
use rand::Rng;

use super::{get_random_taycet_item, PoolBuckets};
use crate::settings::{
    GearShuffleMode, PaperMarioSettings, ShuffleKootFavors, ShuffleLetters, StartingHammer,
};

// The hammer bush is never left empty, even when Mario starts with a hammer.
pub const HAMMER_BUSH_LOCATION: &str = "Jr. Troopa's Playground In Hammer Bush";
pub const FINAL_LETTER_CHAIN_LOCATION: &str = "Goomba Village Goompapa Letter Reward 2";
pub const FOREST_PASS_ITEM: &str = "ForestPass";

/// Decide whether the item at a location takes part in the shuffle. Each rule
/// whose location group matches overrides the decision of the rules before it.
pub fn is_shuffle_eligible(
    location_name: &str,
    item: &str,
    settings: &PaperMarioSettings,
    game_data: &GameData,
) -> bool {
    let in_group = |group: &str| game_data.is_in_location_group(group, location_name);
    let loc = &settings.location_settings;
    let gear = &settings.gear_settings;
    let mut shuffle_item = true;

    if in_group(LOCATION_GROUP_OVERWORLD_COIN) {
        shuffle_item = loc.overworld_coins;
    }
    if in_group(LOCATION_GROUP_BLOCK_COIN) {
        shuffle_item = loc.coin_blocks;
    }
    if in_group(LOCATION_GROUP_FOLIAGE_COIN) {
        shuffle_item = loc.foliage_coins;
    }
    if in_group(LOCATION_GROUP_SHOP_ITEM) {
        shuffle_item = loc.include_shops;
    }
    if in_group(LOCATION_GROUP_HIDDEN_PANEL) {
        shuffle_item = loc.shuffle_hidden_panels;
    }
    if in_group(LOCATION_GROUP_FAVOR_REWARD) {
        // Coin rewards are only shuffled along with the other rewards.
        shuffle_item = if in_group(LOCATION_GROUP_FAVOR_COIN) {
            loc.koot_coins && loc.koot_favors != ShuffleKootFavors::Vanilla
        } else {
            loc.koot_favors != ShuffleKootFavors::Vanilla
        };
    }
    if in_group(LOCATION_GROUP_FAVOR_ITEM) {
        shuffle_item = loc.koot_favors == ShuffleKootFavors::FullShuffle;
    }
    if in_group(LOCATION_GROUP_LETTER_REWARD) {
        shuffle_item = if location_name == FINAL_LETTER_CHAIN_LOCATION {
            matches!(
                loc.letter_rewards,
                ShuffleLetters::FinalLetterChainReward | ShuffleLetters::FullShuffle
            )
        } else if in_group(LOCATION_GROUP_LETTER_CHAIN) {
            loc.letter_rewards == ShuffleLetters::FullShuffle
        } else {
            loc.letter_rewards != ShuffleLetters::Vanilla
        };
    }
    if in_group(LOCATION_GROUP_RADIO_TRADE_EVENT) {
        shuffle_item = loc.trading_events;
    }
    if in_group(LOCATION_GROUP_DOJO_REWARD) {
        shuffle_item = loc.dojo;
    }
    if item == FOREST_PASS_ITEM {
        shuffle_item = !settings.world_settings.open_forest;
    }
    if in_group(LOCATION_GROUP_PARTNER) {
        shuffle_item = loc.partners;
    }
    if in_group(LOCATION_GROUP_GEAR) {
        shuffle_item = if location_name == HAMMER_BUSH_LOCATION {
            gear.gear_shuffle_mode != GearShuffleMode::Vanilla
                && gear.starting_hammer == StartingHammer::Hammerless
        } else {
            gear.gear_shuffle_mode != GearShuffleMode::Vanilla
        };
    }
    shuffle_item
}

fn add_to_bucket<R: Rng>(
    buckets: &mut PoolBuckets,
    location_name: &str,
    item: String,
    item_data: &ItemData,
    settings: &PaperMarioSettings,
    game_data: &GameData,
    rng: &mut R,
) -> Result<()> {
    let gear = &settings.gear_settings;
    let include_shops = settings.location_settings.include_shops;

    if location_name == HAMMER_BUSH_LOCATION
        && gear.gear_shuffle_mode == GearShuffleMode::GearLocationShuffle
        && gear.starting_hammer != StartingHammer::Hammerless
    {
        // The bush holds a Tayce T. item instead, which takes the hammer's slot.
        buckets
            .progression
            .push(get_random_taycet_item(game_data, rng)?);
    } else if item_data.classification == ItemClassification::Progression
        || item_data.category == ItemCategory::Gear
        || (include_shops
            && game_data.is_in_location_group(LOCATION_GROUP_SHOP_ITEM, location_name)
            && item.contains("StarPiece"))
    {
        buckets.progression.push(item);
    } else if game_data.progression_miscitems.contains(&item)
        && !buckets.misc_progression.contains(&item)
    {
        // Only one of each is needed, in a location that can be revisited.
        buckets.misc_progression.push(item);
    } else {
        match item_data.category {
            ItemCategory::Coin => buckets.coins.push(item),
            ItemCategory::Item => buckets.consumables.push(item),
            ItemCategory::Badge => buckets.badges.push(item),
            _ => buckets.other.push(item),
        }
    }
    Ok(())
}

/// Sort every location's vanilla item into a pool bucket, or lock it in place and
/// disable the location. Returns the buckets and the locked items by location name.
pub fn classify_locations<R: Rng>(
    locations: &mut [Location],
    settings: &PaperMarioSettings,
    game_data: &GameData,
    rng: &mut R,
) -> Result<(PoolBuckets, HashMap<String, String>)> {
    let mut buckets = PoolBuckets::default();
    let mut placed_items: HashMap<String, String> = HashMap::new();

    for location in locations.iter_mut() {
        let Some(item) = location.vanilla_item.clone() else {
            continue;
        };
        let item_data = game_data
            .get_item_data(&item)
            .with_context(|| format!("Bad vanilla item at {}", location.name))?;

        if is_shuffle_eligible(&location.name, &item, settings, game_data) {
            add_to_bucket(
                &mut buckets,
                &location.name,
                item,
                item_data,
                settings,
                game_data,
                rng,
            )?;
        } else {
            location.disabled = true;
            placed_items.insert(location.name.clone(), item);
        }
    }
    Ok((buckets, placed_items))
}
