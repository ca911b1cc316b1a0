use anyhow::{Context, Result};
use log::info;
use pmrando_game::{
    trap_item_name, GameData, ItemCategory, ITEM_GROUP_DOJO_CARD, ITEM_GROUP_KEY,
    ITEM_GROUP_KOOT_FAVOR_ITEM, ITEM_GROUP_TRAP_DISGUISE,
};
use rand::{seq::SliceRandom, Rng};

use crate::settings::{ConsumableItemPool, ItemTraps, PartnerUpgradeShuffle, ShuffleKootFavors};

pub const MYSTERY_ITEM: &str = "Mystery";

/// Weight of a consumable with quality tier `value` (1 to 5) at the given
/// `quality` (0 to 100). At 0 the worst items dominate, at 100 the best.
pub fn consumable_weight(value: u8, quality: u8) -> u32 {
    let v = value.clamp(1, 5) as u32;
    let q = quality.min(100) as u32;
    (100 - q) * (6 - v) + q * v
}

fn is_consumable(item: &str, game_data: &GameData) -> Result<bool> {
    Ok(game_data.get_item_data(item)?.category == ItemCategory::Item)
}

/// Replace the consumables of `pool` according to the consumable pool setting.
/// The length and the position of every other item are preserved.
pub fn get_randomized_itempool<R: Rng>(
    pool: Vec<String>,
    consumable_item_pool: ConsumableItemPool,
    consumable_item_quality: u8,
    beta_items: bool,
    game_data: &GameData,
    rng: &mut R,
) -> Result<Vec<String>> {
    if consumable_item_pool == ConsumableItemPool::Vanilla {
        return Ok(pool);
    }

    let candidates: Vec<(&String, u32)> = game_data
        .items()
        .filter(|(name, data)| {
            data.category == ItemCategory::Item
                && name.as_str() != MYSTERY_ITEM
                && (beta_items || !data.beta)
        })
        .map(|(name, data)| (name, consumable_weight(data.value, consumable_item_quality)))
        .collect();

    let mut num_replaced = 0;
    let mut out = Vec::with_capacity(pool.len());
    for item in pool {
        if !is_consumable(&item, game_data)? {
            out.push(item);
            continue;
        }
        let new_item = match consumable_item_pool {
            ConsumableItemPool::Vanilla => item,
            ConsumableItemPool::Mystery => MYSTERY_ITEM.to_string(),
            ConsumableItemPool::FullRandom => candidates
                .choose(rng)
                .context("No consumables to choose from")?
                .0
                .clone(),
            ConsumableItemPool::BalancedRandom => candidates
                .choose_weighted(rng, |x| x.1)
                .context("No consumables to choose from")?
                .0
                .clone(),
        };
        num_replaced += 1;
        out.push(new_item);
    }
    info!("Randomized {num_replaced} consumables ({consumable_item_pool:?})");
    Ok(out)
}

/// Items a trap can be disguised as, given the settings that put them in the pool.
pub fn get_trap_disguises(
    koot_favors: ShuffleKootFavors,
    dojo: bool,
    keysanity: bool,
    power_star_hunt: bool,
    beta_items: bool,
    partner_upgrades: PartnerUpgradeShuffle,
    game_data: &GameData,
) -> Result<Vec<String>> {
    let mut disguises: Vec<String> =
        game_data.get_item_group(ITEM_GROUP_TRAP_DISGUISE)?.to_vec();
    if koot_favors != ShuffleKootFavors::Vanilla {
        disguises.extend_from_slice(game_data.get_item_group(ITEM_GROUP_KOOT_FAVOR_ITEM)?);
    }
    if dojo {
        disguises.extend_from_slice(game_data.get_item_group(ITEM_GROUP_DOJO_CARD)?);
    }
    if keysanity {
        disguises.extend_from_slice(game_data.get_item_group(ITEM_GROUP_KEY)?);
    }
    for (name, data) in game_data.items() {
        let include = (power_star_hunt && data.category == ItemCategory::PowerStar)
            || (beta_items && data.beta)
            || (partner_upgrades != PartnerUpgradeShuffle::Vanilla
                && data.category == ItemCategory::PartnerUpgrade
                && !data.unplaceable);
        if include {
            disguises.push(name.clone());
        }
    }
    Ok(disguises)
}

/// Turn randomly chosen coins and consumables of `pool` into traps.
pub fn get_trapped_itempool<R: Rng>(
    mut pool: Vec<String>,
    item_traps: ItemTraps,
    koot_favors: ShuffleKootFavors,
    dojo: bool,
    keysanity: bool,
    power_star_hunt: bool,
    beta_items: bool,
    partner_upgrades: PartnerUpgradeShuffle,
    game_data: &GameData,
    rng: &mut R,
) -> Result<Vec<String>> {
    if item_traps == ItemTraps::NoTraps {
        return Ok(pool);
    }
    let disguises = get_trap_disguises(
        koot_favors,
        dojo,
        keysanity,
        power_star_hunt,
        beta_items,
        partner_upgrades,
        game_data,
    )?;

    let mut replaceable: Vec<usize> = vec![];
    for (i, item) in pool.iter().enumerate() {
        let category = game_data.get_item_data(item)?.category;
        if category == ItemCategory::Coin || category == ItemCategory::Item {
            replaceable.push(i);
        }
    }
    let num_traps = item_traps.trap_count().min(replaceable.len());
    let trap_idxs: Vec<usize> = replaceable
        .choose_multiple(rng, num_traps)
        .copied()
        .collect();
    for i in trap_idxs {
        let disguise = disguises.choose(rng).context("No trap disguises")?;
        pool[i] = trap_item_name(disguise);
    }
    info!("Placed {num_traps} traps ({item_traps})");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item_pool::test_data::small_game_data;
    use pmrando_game::TRAP_ITEM_PREFIX;
    use rand::{rngs::StdRng, SeedableRng};

    fn sample_pool() -> Vec<String> {
        let mut pool = vec![];
        for _ in 0..10 {
            pool.push("Coin".to_string());
            pool.push("Mushroom".to_string());
            pool.push("PowerJump".to_string());
            pool.push("StarPiece".to_string());
        }
        pool
    }

    #[test]
    fn test_consumable_weight() {
        assert_eq!(consumable_weight(1, 0), 500);
        assert_eq!(consumable_weight(5, 0), 100);
        assert_eq!(consumable_weight(5, 100), 500);
        assert_eq!(consumable_weight(3, 50), 300);
        // Unrated items count as the lowest tier.
        assert_eq!(consumable_weight(0, 100), consumable_weight(1, 100));
    }

    #[test]
    fn test_vanilla_pool_unchanged() -> Result<()> {
        let game_data = small_game_data();
        let mut rng = StdRng::seed_from_u64(0);
        let pool = get_randomized_itempool(
            sample_pool(),
            ConsumableItemPool::Vanilla,
            50,
            false,
            &game_data,
            &mut rng,
        )?;
        assert_eq!(pool, sample_pool());
        let pool = get_trapped_itempool(
            sample_pool(),
            ItemTraps::NoTraps,
            ShuffleKootFavors::Vanilla,
            false,
            false,
            false,
            false,
            PartnerUpgradeShuffle::Vanilla,
            &game_data,
            &mut rng,
        )?;
        assert_eq!(pool, sample_pool());
        Ok(())
    }

    #[test]
    fn test_randomized_only_replaces_consumables() -> Result<()> {
        let game_data = small_game_data();
        let mut rng = StdRng::seed_from_u64(5);
        for mode in [
            ConsumableItemPool::BalancedRandom,
            ConsumableItemPool::FullRandom,
            ConsumableItemPool::Mystery,
        ] {
            let original = sample_pool();
            let pool =
                get_randomized_itempool(original.clone(), mode, 80, false, &game_data, &mut rng)?;
            assert_eq!(pool.len(), original.len());
            for (old, new) in original.iter().zip(pool.iter()) {
                if old == "Mushroom" {
                    let data = game_data.get_item_data(new)?;
                    assert_eq!(data.category, ItemCategory::Item);
                    assert!(!data.beta);
                    if mode == ConsumableItemPool::Mystery {
                        assert_eq!(new, MYSTERY_ITEM);
                    } else {
                        assert_ne!(new, MYSTERY_ITEM);
                    }
                } else {
                    assert_eq!(old, new);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_traps_replace_coins_and_consumables() -> Result<()> {
        let game_data = small_game_data();
        let mut rng = StdRng::seed_from_u64(9);
        let original = sample_pool();
        let pool = get_trapped_itempool(
            original.clone(),
            ItemTraps::Sparse,
            ShuffleKootFavors::Vanilla,
            false,
            true,
            false,
            false,
            PartnerUpgradeShuffle::Vanilla,
            &game_data,
            &mut rng,
        )?;
        assert_eq!(pool.len(), original.len());
        let mut num_traps = 0;
        for (old, new) in original.iter().zip(pool.iter()) {
            if new.starts_with(TRAP_ITEM_PREFIX) {
                num_traps += 1;
                assert!(old == "Coin" || old == "Mushroom");
                let disguise = &new[TRAP_ITEM_PREFIX.len()..];
                assert!(["StarPiece", "UltraShroom", "KoopaFortressKey"].contains(&disguise));
            } else {
                assert_eq!(old, new);
            }
        }
        assert_eq!(num_traps, 15);

        // Capped by the number of coins and consumables.
        let pool = get_trapped_itempool(
            original,
            ItemTraps::Plenty,
            ShuffleKootFavors::Vanilla,
            false,
            false,
            false,
            false,
            PartnerUpgradeShuffle::Vanilla,
            &game_data,
            &mut rng,
        )?;
        let num_traps = pool
            .iter()
            .filter(|x| x.starts_with(TRAP_ITEM_PREFIX))
            .count();
        assert_eq!(num_traps, 20);
        Ok(())
    }

    #[test]
    fn test_trap_disguises() -> Result<()> {
        let game_data = small_game_data();
        let disguises = get_trap_disguises(
            ShuffleKootFavors::FullShuffle,
            true,
            false,
            true,
            true,
            PartnerUpgradeShuffle::FullShuffle,
            &game_data,
        )?;
        for name in [
            "StarPiece",
            "KoopaLegends",
            "Diploma",
            "PowerStar01",
            "AttackFXE",
            "KooperUpgrade1",
        ] {
            assert!(disguises.iter().any(|x| x == name), "{name} missing");
        }
        assert!(!disguises.iter().any(|x| x == "KoopaFortressKey"));
        assert!(!disguises.iter().any(|x| x == "GoompaUpgrade1"));
        Ok(())
    }
}
