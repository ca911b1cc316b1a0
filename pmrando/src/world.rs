use anyhow::{bail, Context, Result};
use hashbrown::HashMap;
use pmrando_game::{GameData, ItemClassification, Location, TRAP_ITEM_PREFIX};
use serde::Serialize;

/// The world an item pool is generated for. The pool generator reads and updates
/// the world's locations, then hands back the created pool and locked items.
pub trait ItemPoolHost {
    type Item;

    fn locations_mut(&mut self) -> &mut [Location];

    /// Create an item by name. Names outside the item table are only accepted
    /// when `allow_arbitrary_name` is set.
    fn create_item(&self, name: &str, allow_arbitrary_name: bool) -> Result<Self::Item>;

    fn set_itempool(&mut self, items: Vec<Self::Item>);

    fn place_locked_item(&mut self, location_name: &str, item: Self::Item) -> Result<()>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PoolItem {
    pub name: String,
    pub classification: ItemClassification,
}

/// A host that only records what the pool generator produced.
pub struct StandaloneWorld<'a> {
    game_data: &'a GameData,
    pub locations: Vec<Location>,
    pub itempool: Vec<PoolItem>,
    pub locked_items: HashMap<String, PoolItem>,
}

impl<'a> StandaloneWorld<'a> {
    pub fn new(game_data: &'a GameData, locations: Vec<Location>) -> Self {
        StandaloneWorld {
            game_data,
            locations,
            itempool: vec![],
            locked_items: HashMap::new(),
        }
    }

    pub fn from_vanilla(game_data: &'a GameData) -> Self {
        Self::new(game_data, game_data.vanilla_locations.clone())
    }

    pub fn disabled_locations(&self) -> Vec<String> {
        self.locations
            .iter()
            .filter(|x| x.disabled)
            .map(|x| x.name.clone())
            .collect()
    }
}

impl ItemPoolHost for StandaloneWorld<'_> {
    type Item = PoolItem;

    fn locations_mut(&mut self) -> &mut [Location] {
        &mut self.locations
    }

    fn create_item(&self, name: &str, allow_arbitrary_name: bool) -> Result<PoolItem> {
        let classification = if let Ok(data) = self.game_data.get_item_data(name) {
            data.classification
        } else if name
            .strip_prefix(TRAP_ITEM_PREFIX)
            .is_some_and(|x| self.game_data.get_item_data(x).is_ok())
        {
            ItemClassification::Trap
        } else if allow_arbitrary_name {
            ItemClassification::Filler
        } else {
            bail!("Unable to create unknown item: {name}");
        };
        Ok(PoolItem {
            name: name.to_string(),
            classification,
        })
    }

    fn set_itempool(&mut self, items: Vec<PoolItem>) {
        self.itempool = items;
    }

    fn place_locked_item(&mut self, location_name: &str, item: PoolItem) -> Result<()> {
        let location = self
            .locations
            .iter()
            .find(|x| x.name == location_name)
            .with_context(|| format!("Unknown location: {location_name}"))?;
        if !location.disabled {
            bail!("Location {location_name} is still part of the shuffle");
        }
        if self.locked_items.contains_key(location_name) {
            bail!("Location {location_name} already has a locked item");
        }
        self.locked_items.insert(location_name.to_string(), item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item_pool::test_data::small_game_data;

    #[test]
    fn test_create_item() -> Result<()> {
        let game_data = small_game_data();
        let world = StandaloneWorld::new(&game_data, vec![]);
        assert_eq!(
            world.create_item("Kooper", false)?.classification,
            ItemClassification::Progression
        );
        assert_eq!(
            world.create_item("TrapStarPiece", false)?.classification,
            ItemClassification::Trap
        );
        assert!(world.create_item("Victory", false).is_err());
        assert_eq!(
            world.create_item("Victory", true)?.classification,
            ItemClassification::Filler
        );
        Ok(())
    }

    #[test]
    fn test_place_locked_item() -> Result<()> {
        let game_data = small_game_data();
        let mut locked = Location::new("Goomba Road Coin 1", Some("Coin"));
        locked.disabled = true;
        let open = Location::new("Goomba Road Block", Some("Mushroom"));
        let mut world = StandaloneWorld::new(&game_data, vec![locked, open]);

        let coin = world.create_item("Coin", true)?;
        world.place_locked_item("Goomba Road Coin 1", coin.clone())?;
        assert!(world
            .place_locked_item("Goomba Road Coin 1", coin.clone())
            .is_err());
        assert!(world.place_locked_item("Goomba Road Block", coin.clone()).is_err());
        assert!(world.place_locked_item("Nowhere", coin).is_err());
        assert_eq!(world.disabled_locations(), vec!["Goomba Road Coin 1"]);
        Ok(())
    }
}
