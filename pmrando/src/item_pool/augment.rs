use anyhow::Result;
use log::warn;
use pmrando_game::{GameData, ItemCategory, ITEM_GROUP_PROXY_BADGE};

use super::PoolBuckets;
use crate::settings::{PaperMarioSettings, PartnerUpgradeShuffle, StartingBoots};

const ITEM_POUCHES: [&str; 5] = ["PouchA", "PouchB", "PouchC", "PouchD", "PouchE"];
const FIRST_BOOTS_PROXY: &str = "BootsProxy1";

/// Add the items that have no vanilla location but are enabled by settings.
pub fn add_bonus_items(
    buckets: &mut PoolBuckets,
    settings: &PaperMarioSettings,
    game_data: &GameData,
) -> Result<()> {
    let pool_settings = &settings.item_pool_settings;

    if pool_settings.power_stars_enabled() {
        let total = pool_settings.total_power_stars;
        let power_stars: Vec<String> = game_data
            .items()
            .filter(|(_, data)| data.category == ItemCategory::PowerStar)
            .map(|(name, _)| name.clone())
            .take(total)
            .collect();
        if power_stars.len() < total {
            warn!(
                "Requested {total} power stars but the item table only has {}",
                power_stars.len()
            );
        }
        buckets.progression.extend(power_stars);
    }

    if pool_settings.item_pouches {
        buckets
            .other
            .extend(ITEM_POUCHES.iter().map(|x| x.to_string()));
    }

    if pool_settings.unused_badge_dupes {
        let dupes: Vec<String> = game_data
            .items()
            .filter(|(_, data)| data.unused_dupe && !data.beta)
            .map(|(name, _)| name.clone())
            .collect();
        buckets.badges.extend(dupes);
    }

    if pool_settings.beta_items {
        let beta_items: Vec<String> = game_data
            .items()
            .filter(|(name, data)| {
                data.beta && !data.unused_dupe && !buckets.badges.contains(*name)
            })
            .map(|(name, _)| name.clone())
            .collect();
        buckets.badges.extend(beta_items);
    }

    if pool_settings.progressive_badges {
        let proxies = game_data.get_item_group(ITEM_GROUP_PROXY_BADGE)?;
        buckets.badges.extend(proxies.iter().cloned());
    }

    if settings.gear_settings.starting_boots == StartingBoots::Jumpless {
        buckets.progression.push(FIRST_BOOTS_PROXY.to_string());
    }

    if settings.partner_settings.partner_upgrades != PartnerUpgradeShuffle::Vanilla {
        let upgrades: Vec<String> = game_data
            .items()
            .filter(|(_, data)| data.category == ItemCategory::PartnerUpgrade && !data.unplaceable)
            .map(|(name, _)| name.clone())
            .collect();
        buckets.badges.extend(upgrades);
    }
    Ok(())
}
