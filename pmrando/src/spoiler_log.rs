use std::collections::BTreeMap;

use pmrando_game::Location;
use serde::{Deserialize, Serialize};

use crate::item_pool::{BucketSizes, ItemPool};
use crate::settings::PaperMarioSettings;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SpoilerPlacedItem {
    pub location: String,
    pub item: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SpoilerItemCount {
    pub item: String,
    pub count: usize,
}

// Item pool summary ---------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PoolSpoiler {
    pub settings_name: Option<String>,
    pub random_seed: usize,
    pub target_size: usize,
    pub bucket_sizes: BucketSizes,
    pub item_counts: Vec<SpoilerItemCount>,
    pub pool: Vec<String>,
    pub placed_items: Vec<SpoilerPlacedItem>,
    pub disabled_locations: Vec<String>,
}

impl PoolSpoiler {
    pub fn new(
        item_pool: &ItemPool,
        locations: &[Location],
        settings: &PaperMarioSettings,
        random_seed: usize,
    ) -> Self {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for item in &item_pool.pool {
            *counts.entry(item.as_str()).or_default() += 1;
        }
        let item_counts = counts
            .into_iter()
            .map(|(item, count)| SpoilerItemCount {
                item: item.to_string(),
                count,
            })
            .collect();

        let mut placed_items: Vec<SpoilerPlacedItem> = item_pool
            .placed_items
            .iter()
            .map(|(location, item)| SpoilerPlacedItem {
                location: location.clone(),
                item: item.clone(),
            })
            .collect();
        placed_items.sort_by(|a, b| a.location.cmp(&b.location));

        PoolSpoiler {
            settings_name: settings.name.clone(),
            random_seed,
            target_size: item_pool.target_size,
            bucket_sizes: item_pool.bucket_sizes,
            item_counts,
            pool: item_pool.pool.clone(),
            placed_items,
            disabled_locations: locations
                .iter()
                .filter(|x| x.disabled)
                .map(|x| x.name.clone())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashbrown::HashMap;

    #[test]
    fn test_pool_spoiler() -> anyhow::Result<()> {
        let item_pool = ItemPool {
            pool: vec!["Coin".into(), "Kooper".into(), "Coin".into()],
            placed_items: [
                ("Shop B".to_string(), "Mushroom".to_string()),
                ("Shop A".to_string(), "Goombario".to_string()),
            ]
            .into_iter()
            .collect::<HashMap<_, _>>(),
            target_size: 3,
            bucket_sizes: BucketSizes::default(),
        };
        let mut locked = Location::new("Shop A", Some("Goombario"));
        locked.disabled = true;
        let spoiler = PoolSpoiler::new(
            &item_pool,
            &[locked, Location::new("Field", Some("Coin"))],
            &PaperMarioSettings::default(),
            12345,
        );
        assert_eq!(
            spoiler.item_counts,
            vec![
                SpoilerItemCount {
                    item: "Coin".into(),
                    count: 2
                },
                SpoilerItemCount {
                    item: "Kooper".into(),
                    count: 1
                },
            ]
        );
        assert_eq!(spoiler.placed_items[0].location, "Shop A");
        assert_eq!(spoiler.disabled_locations, vec!["Shop A"]);

        let json = serde_json::to_string(&spoiler)?;
        let parsed: PoolSpoiler = serde_json::from_str(&json)?;
        assert_eq!(parsed.pool, spoiler.pool);
        Ok(())
    }
}
