use anyhow::{bail, Result};
use log::info;
use pmrando_game::GameData;
use rand::{seq::SliceRandom, Rng};

use super::{get_random_taycet_item, PoolBuckets};

// Coins are trimmed first, but some always stay in the pool to keep the economy going.
pub const COIN_TRIM_THRESHOLD: usize = 20;

/// Drop random badges until the badge bucket fits within `limit`.
pub fn limit_badges<R: Rng>(buckets: &mut PoolBuckets, limit: usize, rng: &mut R) {
    if buckets.badges.len() <= limit {
        return;
    }
    info!(
        "Trimming badges from {} to the limit of {limit}",
        buckets.badges.len()
    );
    buckets.badges.shuffle(rng);
    buckets.badges.truncate(limit);
}

/// Bring the total bucket size to exactly `target_size`, by adding Tayce T. filler
/// or by removing coins and consumables. Other buckets are left alone.
pub fn reconcile_pool_size<R: Rng>(
    buckets: &mut PoolBuckets,
    target_size: usize,
    game_data: &GameData,
    rng: &mut R,
) -> Result<()> {
    let current_size = buckets.len();
    if current_size < target_size {
        for _ in current_size..target_size {
            buckets
                .consumables
                .push(get_random_taycet_item(game_data, rng)?);
        }
    } else if current_size > target_size {
        buckets.consumables.shuffle(rng);
        for _ in target_size..current_size {
            if buckets.coins.len() > COIN_TRIM_THRESHOLD {
                buckets.coins.pop();
            } else if buckets.consumables.pop().is_none() {
                bail!(
                    "Unable to shrink item pool from {current_size} to {target_size}: \
                     no coins or consumables left to remove"
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item_pool::test_data::small_game_data;
    use rand::{rngs::StdRng, SeedableRng};

    fn names(name: &str, count: usize) -> Vec<String> {
        vec![name.to_string(); count]
    }

    #[test]
    fn test_fill_short_pool() -> Result<()> {
        let game_data = small_game_data();
        let mut buckets = PoolBuckets {
            progression: names("Kooper", 45),
            consumables: names("Mushroom", 50),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        reconcile_pool_size(&mut buckets, 100, &game_data, &mut rng)?;
        assert_eq!(buckets.len(), 100);
        assert_eq!(buckets.progression.len(), 45);
        assert_eq!(buckets.consumables.len(), 55);
        for item in &buckets.consumables[50..] {
            assert!(item == "FriedShroom" || item == "SpicySoup");
        }
        Ok(())
    }

    #[test]
    fn test_trim_coins_first() -> Result<()> {
        let game_data = small_game_data();
        let mut buckets = PoolBuckets {
            progression: names("Kooper", 38),
            coins: names("Coin", 25),
            consumables: names("Mushroom", 30),
            badges: names("PowerJump", 10),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        reconcile_pool_size(&mut buckets, 100, &game_data, &mut rng)?;
        assert_eq!(buckets.len(), 100);
        assert_eq!(buckets.coins.len(), 22);
        assert_eq!(buckets.consumables.len(), 30);
        Ok(())
    }

    #[test]
    fn test_trim_consumables_below_coin_threshold() -> Result<()> {
        let game_data = small_game_data();
        let mut buckets = PoolBuckets {
            coins: names("Coin", 22),
            consumables: names("Mushroom", 10),
            badges: names("PowerJump", 5),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        reconcile_pool_size(&mut buckets, 30, &game_data, &mut rng)?;
        assert_eq!(buckets.coins.len(), COIN_TRIM_THRESHOLD);
        assert_eq!(buckets.consumables.len(), 5);
        assert_eq!(buckets.badges.len(), 5);
        Ok(())
    }

    #[test]
    fn test_trim_fails_when_nothing_left() {
        let game_data = small_game_data();
        let mut buckets = PoolBuckets {
            progression: names("Kooper", 10),
            consumables: names("Mushroom", 2),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert!(reconcile_pool_size(&mut buckets, 5, &game_data, &mut rng).is_err());
    }

    #[test]
    fn test_fill_fails_without_taycet_items() {
        let mut game_data = small_game_data();
        game_data.taycet_items.clear();
        let mut buckets = PoolBuckets::default();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(reconcile_pool_size(&mut buckets, 1, &game_data, &mut rng).is_err());
    }

    #[test]
    fn test_limit_badges() {
        let mut buckets = PoolBuckets {
            badges: (0..20).map(|i| format!("Badge{i}")).collect(),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        limit_badges(&mut buckets, 12, &mut rng);
        assert_eq!(buckets.badges.len(), 12);
        limit_badges(&mut buckets, 128, &mut rng);
        assert_eq!(buckets.badges.len(), 12);
    }
}
