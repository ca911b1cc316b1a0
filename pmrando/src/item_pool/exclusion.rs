use anyhow::Result;
use pmrando_game::GameData;

use super::PoolBuckets;
use crate::settings::{
    BowserCastleMode, GearShuffleMode, PaperMarioSettings, PartnerUpgradeShuffle, StartingBoots,
    StartingHammer,
};

pub const RULE_DOJO: &str = "do_randomize_dojo";
pub const RULE_BLUE_HOUSE_OPEN: &str = "startwith_bluehouse_open";
pub const RULE_FOREST_OPEN: &str = "startwith_forest_open";
pub const RULE_MAGICAL_SEEDS: &str = "magical_seeds";
pub const RULE_SHORTEN_BOWSERS_CASTLE: &str = "shorten_bowsers_castle";
pub const RULE_BOSS_RUSH: &str = "boss_rush";
pub const RULE_ALWAYS_SPEEDY_SPIN: &str = "always_speedyspin";
pub const RULE_ALWAYS_ISPY: &str = "always_ispy";
pub const RULE_ALWAYS_PEEKABOO: &str = "always_peekaboo";
pub const RULE_PROGRESSIVE_BADGES: &str = "do_progressive_badges";
pub const RULE_PARTNER_UPGRADE_SHUFFLE: &str = "partner_upgrade_shuffle";

pub const MAX_MAGICAL_SEEDS: usize = 4;

const HAMMER_PROXIES: [&str; 3] = ["HammerProxy1", "HammerProxy2", "HammerProxy3"];
const BOOTS_PROXIES: [&str; 3] = ["BootsProxy1", "BootsProxy2", "BootsProxy3"];

/// List the items that leave the pool because the settings already grant them
/// or make them useless. Names may repeat; each entry removes one copy.
pub fn get_items_to_exclude(
    settings: &PaperMarioSettings,
    game_data: &GameData,
) -> Result<Vec<String>> {
    let mut excluded_items: Vec<String> = vec![];
    let add_rule = |rule: &str, excluded_items: &mut Vec<String>| -> Result<()> {
        excluded_items.extend(game_data.get_exclusion_rule(rule)?.iter().cloned());
        Ok(())
    };
    let world = &settings.world_settings;

    if settings.location_settings.dojo {
        add_rule(RULE_DOJO, &mut excluded_items)?;
    }
    excluded_items.extend(
        settings
            .partner_settings
            .starting_partners()
            .into_iter()
            .map(|x| x.to_string()),
    );
    if world.open_blue_house {
        add_rule(RULE_BLUE_HOUSE_OPEN, &mut excluded_items)?;
    }
    if world.open_forest {
        add_rule(RULE_FOREST_OPEN, &mut excluded_items)?;
    }
    if world.magical_seeds < MAX_MAGICAL_SEEDS {
        // Only the seeds needed to open the Flower Gate stay in the pool.
        let seeds = game_data.get_exclusion_rule(RULE_MAGICAL_SEEDS)?;
        excluded_items.extend(seeds.iter().skip(world.magical_seeds).cloned());
    }
    if world.bowser_castle_mode > BowserCastleMode::Vanilla {
        add_rule(RULE_SHORTEN_BOWSERS_CASTLE, &mut excluded_items)?;
    }
    if world.bowser_castle_mode == BowserCastleMode::BossRush {
        add_rule(RULE_BOSS_RUSH, &mut excluded_items)?;
    }
    if world.always_speedy_spin {
        add_rule(RULE_ALWAYS_SPEEDY_SPIN, &mut excluded_items)?;
    }
    if world.always_ispy {
        add_rule(RULE_ALWAYS_ISPY, &mut excluded_items)?;
    }
    if world.always_peekaboo {
        add_rule(RULE_ALWAYS_PEEKABOO, &mut excluded_items)?;
    }
    if settings.item_pool_settings.progressive_badges {
        add_rule(RULE_PROGRESSIVE_BADGES, &mut excluded_items)?;
    }

    let gear = &settings.gear_settings;
    if gear.gear_shuffle_mode >= GearShuffleMode::GearLocationShuffle {
        let hammer_tier = match gear.starting_hammer {
            StartingHammer::Hammerless => 0,
            StartingHammer::Normal => 1,
            StartingHammer::Super => 2,
            StartingHammer::Ultra => 3,
        };
        let boots_tier = match gear.starting_boots {
            StartingBoots::Jumpless => 0,
            StartingBoots::Normal => 1,
            StartingBoots::Super => 2,
            StartingBoots::Ultra => 3,
        };
        // Starting at a tier grants every proxy up to it.
        for proxies in [&HAMMER_PROXIES[..hammer_tier], &BOOTS_PROXIES[..boots_tier]] {
            excluded_items.extend(proxies.iter().rev().map(|x| x.to_string()));
        }
    }

    if settings.partner_settings.partner_upgrades != PartnerUpgradeShuffle::Vanilla {
        add_rule(RULE_PARTNER_UPGRADE_SHUFFLE, &mut excluded_items)?;
    }
    Ok(excluded_items)
}

pub fn remove_excluded_items(buckets: &mut PoolBuckets, mut excluded_items: Vec<String>) {
    while let Some(item) = excluded_items.pop() {
        buckets.remove_item(&item);
    }
}
