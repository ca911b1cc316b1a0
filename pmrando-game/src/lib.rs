use anyhow::{anyhow, bail, ensure, Context, Result};
use hashbrown::{HashMap, HashSet};
use json::{self, JsonValue};
use log::info;
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::hash::Hash;
use std::path::Path;
use std::str::FromStr;
use strum_macros::{EnumString, VariantNames};

pub const LOCATION_GROUP_OVERWORLD_COIN: &str = "OverworldCoin";
pub const LOCATION_GROUP_BLOCK_COIN: &str = "BlockCoin";
pub const LOCATION_GROUP_FOLIAGE_COIN: &str = "FoliageCoin";
pub const LOCATION_GROUP_SHOP_ITEM: &str = "ShopItem";
pub const LOCATION_GROUP_HIDDEN_PANEL: &str = "HiddenPanel";
pub const LOCATION_GROUP_FAVOR_REWARD: &str = "FavorReward";
pub const LOCATION_GROUP_FAVOR_COIN: &str = "FavorCoin";
pub const LOCATION_GROUP_FAVOR_ITEM: &str = "FavorItem";
pub const LOCATION_GROUP_LETTER_REWARD: &str = "LetterReward";
pub const LOCATION_GROUP_LETTER_CHAIN: &str = "LetterChain";
pub const LOCATION_GROUP_RADIO_TRADE_EVENT: &str = "RadioTradeEvent";
pub const LOCATION_GROUP_DOJO_REWARD: &str = "DojoReward";
pub const LOCATION_GROUP_PARTNER: &str = "Partner";
pub const LOCATION_GROUP_GEAR: &str = "Gear";

pub const ITEM_GROUP_PROXY_BADGE: &str = "ProxyBadge";
pub const ITEM_GROUP_KOOT_FAVOR_ITEM: &str = "KootFavorItem";
pub const ITEM_GROUP_DOJO_CARD: &str = "DojoCard";
pub const ITEM_GROUP_KEY: &str = "Key";
pub const ITEM_GROUP_TRAP_DISGUISE: &str = "TrapDisguise";

// Trap items are not part of the item table: they are named after the item they imitate.
pub const TRAP_ITEM_PREFIX: &str = "Trap";

pub type ItemId = usize; // Index into GameData.item_isv.keys

#[derive(Default, Clone, Debug)]
pub struct IndexedVec<T: Hash + Eq> {
    pub keys: Vec<T>,
    pub index_by_key: HashMap<T, usize>,
}

impl<T: Hash + Eq> IndexedVec<T> {
    pub fn add<U: ToOwned<Owned = T> + ?Sized>(&mut self, name: &U) -> usize {
        if !self.index_by_key.contains_key(&name.to_owned()) {
            let idx = self.keys.len();
            self.index_by_key.insert(name.to_owned(), self.keys.len());
            self.keys.push(name.to_owned());
            idx
        } else {
            self.index_by_key[&name.to_owned()]
        }
    }
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, EnumString, VariantNames, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ItemCategory {
    Coin,
    Item,
    Badge,
    Gear,
    Partner,
    PartnerUpgrade,
    KeyItem,
    StarPiece,
    PowerStar,
    Other,
}

// Numeric codes match the host's item classification flags.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize, Default,
)]
#[repr(u8)]
pub enum ItemClassification {
    #[default]
    Filler = 0,
    Progression = 1,
    Useful = 2,
    Trap = 4,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemData {
    pub category: ItemCategory,
    pub classification: ItemClassification,
    pub value: u8, // Quality tier of consumables, 1 (worst) to 5 (best)
    pub beta: bool,
    pub unused_dupe: bool,
    pub unplaceable: bool,
}

impl ItemData {
    pub fn new(category: ItemCategory, classification: ItemClassification) -> Self {
        ItemData {
            category,
            classification,
            value: 0,
            beta: false,
            unused_dupe: false,
            unplaceable: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub vanilla_item: Option<String>,
    #[serde(default)]
    pub disabled: bool,
}

impl Location {
    pub fn new(name: &str, vanilla_item: Option<&str>) -> Self {
        Location {
            name: name.to_string(),
            vanilla_item: vanilla_item.map(|x| x.to_string()),
            disabled: false,
        }
    }
}

pub fn trap_item_name(disguise: &str) -> String {
    format!("{TRAP_ITEM_PREFIX}{disguise}")
}

#[derive(Default, Clone)]
pub struct GameData {
    pub item_isv: IndexedVec<String>,
    pub item_data: Vec<ItemData>, // Indexed by ItemId, in item table order
    pub vanilla_locations: Vec<Location>,
    pub location_groups: HashMap<String, HashSet<String>>,
    pub item_groups: HashMap<String, Vec<String>>,
    pub taycet_items: Vec<String>,
    pub progression_miscitems: HashSet<String>,
    pub exclude_due_to_settings: HashMap<String, Vec<String>>,
    pub exclude_from_taycet_placement: HashSet<String>,
}

fn read_json(path: &Path) -> Result<JsonValue> {
    let file = File::open(path).with_context(|| format!("unable to open {}", path.display()))?;
    let json_str = std::io::read_to_string(file)
        .with_context(|| format!("unable to read {}", path.display()))?;
    let json_data =
        json::parse(&json_str).with_context(|| format!("unable to parse {}", path.display()))?;
    Ok(json_data)
}

fn read_string_list(value: &JsonValue) -> Result<Vec<String>> {
    ensure!(value.is_array());
    value
        .members()
        .map(|x| {
            x.as_str()
                .map(|s| s.to_string())
                .with_context(|| format!("expected string, got {x}"))
        })
        .collect()
}

impl GameData {
    pub fn add_item(&mut self, name: &str, data: ItemData) -> Result<ItemId> {
        if self.item_isv.index_by_key.contains_key(name) {
            bail!("duplicate item table entry: {name}");
        }
        let idx = self.item_isv.add(name);
        self.item_data.push(data);
        Ok(idx)
    }

    pub fn add_location_to_group(&mut self, group: &str, location_name: &str) {
        self.location_groups
            .entry(group.to_string())
            .or_default()
            .insert(location_name.to_string());
    }

    pub fn get_item_data(&self, name: &str) -> Result<&ItemData> {
        let idx = self
            .item_isv
            .index_by_key
            .get(name)
            .with_context(|| format!("unknown item: {name}"))?;
        Ok(&self.item_data[*idx])
    }

    /// Iterate over the item table in table order.
    pub fn items(&self) -> impl Iterator<Item = (&String, &ItemData)> {
        self.item_isv.keys.iter().zip(self.item_data.iter())
    }

    pub fn is_in_location_group(&self, group: &str, location_name: &str) -> bool {
        self.location_groups
            .get(group)
            .is_some_and(|x| x.contains(location_name))
    }

    pub fn get_item_group(&self, group: &str) -> Result<&[String]> {
        self.item_groups
            .get(group)
            .map(|x| x.as_slice())
            .with_context(|| format!("unknown item group: {group}"))
    }

    pub fn get_exclusion_rule(&self, rule: &str) -> Result<&[String]> {
        self.exclude_due_to_settings
            .get(rule)
            .map(|x| x.as_slice())
            .with_context(|| format!("unknown item exclusion rule: {rule}"))
    }

    fn load_items(&mut self, path: &Path) -> Result<()> {
        let items_json = read_json(path)?;
        ensure!(items_json["items"].is_array());
        for item_json in items_json["items"].members() {
            let name = item_json["name"]
                .as_str()
                .with_context(|| format!("item without name in {}", path.display()))?;
            let category_str = item_json["category"]
                .as_str()
                .with_context(|| format!("item {name} has no category"))?;
            let category = ItemCategory::from_str(category_str)
                .with_context(|| format!("item {name} has unknown category {category_str}"))?;
            let classification_code = item_json["classification"].as_u8().unwrap_or(0);
            let classification = ItemClassification::try_from(classification_code)
                .map_err(|_| anyhow!("item {name} has bad classification {classification_code}"))?;
            let data = ItemData {
                category,
                classification,
                value: item_json["value"].as_u8().unwrap_or(0),
                beta: item_json["beta"].as_bool().unwrap_or(false),
                unused_dupe: item_json["unused_dupe"].as_bool().unwrap_or(false),
                unplaceable: item_json["unplaceable"].as_bool().unwrap_or(false),
            };
            self.add_item(name, data)?;
        }
        Ok(())
    }

    fn load_locations(&mut self, path: &Path) -> Result<()> {
        let locations_json = read_json(path)?;
        ensure!(locations_json["locations"].is_array());
        for location_json in locations_json["locations"].members() {
            let name = location_json["name"]
                .as_str()
                .with_context(|| format!("location without name in {}", path.display()))?;
            let vanilla_item = &location_json["vanilla_item"];
            ensure!(vanilla_item.is_null() || vanilla_item.is_string());
            self.vanilla_locations
                .push(Location::new(name, vanilla_item.as_str()));
        }

        ensure!(locations_json["location_groups"].is_object());
        for (group, members) in locations_json["location_groups"].entries() {
            for location_name in read_string_list(members)? {
                self.add_location_to_group(group, &location_name);
            }
        }
        Ok(())
    }

    fn load_item_groups(&mut self, path: &Path) -> Result<()> {
        let groups_json = read_json(path)?;
        ensure!(groups_json["item_groups"].is_object());
        for (group, members) in groups_json["item_groups"].entries() {
            self.item_groups
                .insert(group.to_string(), read_string_list(members)?);
        }
        self.taycet_items = read_string_list(&groups_json["taycet_items"])?;
        self.progression_miscitems = read_string_list(&groups_json["progression_miscitems"])?
            .into_iter()
            .collect();
        Ok(())
    }

    fn load_item_exclusion(&mut self, path: &Path) -> Result<()> {
        let exclusion_json = read_json(path)?;
        ensure!(exclusion_json["exclude_due_to_settings"].is_object());
        for (rule, members) in exclusion_json["exclude_due_to_settings"].entries() {
            self.exclude_due_to_settings
                .insert(rule.to_string(), read_string_list(members)?);
        }
        self.exclude_from_taycet_placement =
            read_string_list(&exclusion_json["exclude_from_taycet_placement"])?
                .into_iter()
                .collect();
        Ok(())
    }

    /// Check that every item named by the location, group and exclusion tables
    /// is present in the item table.
    pub fn validate(&self) -> Result<()> {
        let check = |name: &str, source: &str| -> Result<()> {
            self.get_item_data(name)
                .with_context(|| format!("referenced by {source}"))
                .map(|_| ())
        };
        for location in &self.vanilla_locations {
            if let Some(item) = &location.vanilla_item {
                check(item, &location.name)?;
            }
        }
        for (group, members) in &self.item_groups {
            for item in members {
                check(item, group)?;
            }
        }
        for (rule, members) in &self.exclude_due_to_settings {
            for item in members {
                check(item, rule)?;
            }
        }
        for item in self
            .taycet_items
            .iter()
            .chain(self.progression_miscitems.iter())
            .chain(self.exclude_from_taycet_placement.iter())
        {
            check(item, "item lists")?;
        }
        Ok(())
    }

    pub fn load(base_path: &Path) -> Result<GameData> {
        let mut game_data = GameData::default();

        let items_path = base_path.join("data/items.json");
        let locations_path = base_path.join("data/locations.json");
        let item_groups_path = base_path.join("data/item_groups.json");
        let item_exclusion_path = base_path.join("data/item_exclusion.json");

        game_data.load_items(&items_path)?;
        game_data.load_locations(&locations_path)?;
        game_data.load_item_groups(&item_groups_path)?;
        game_data.load_item_exclusion(&item_exclusion_path)?;
        game_data
            .validate()
            .context("Inconsistent item and location tables")?;

        info!(
            "Loaded {} items, {} locations, {} location groups",
            game_data.item_isv.keys.len(),
            game_data.vanilla_locations.len(),
            game_data.location_groups.len()
        );
        Ok(game_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_category_names() {
        assert_eq!(
            ItemCategory::from_str("PARTNERUPGRADE").unwrap(),
            ItemCategory::PartnerUpgrade
        );
        assert_eq!(ItemCategory::from_str("COIN").unwrap(), ItemCategory::Coin);
        assert!(ItemCategory::from_str("Coin").is_err());
    }

    #[test]
    fn test_duplicate_item_rejected() -> Result<()> {
        let mut game_data = GameData::default();
        game_data.add_item(
            "Mushroom",
            ItemData::new(ItemCategory::Item, ItemClassification::Filler),
        )?;
        assert!(game_data
            .add_item(
                "Mushroom",
                ItemData::new(ItemCategory::Item, ItemClassification::Filler)
            )
            .is_err());
        assert!(game_data.get_item_data("SuperShroom").is_err());
        Ok(())
    }

    #[test]
    fn test_load_shipped_tables() -> Result<()> {
        let game_data = GameData::load(Path::new(".."))?;
        let coin = game_data.get_item_data("Coin")?;
        assert_eq!(coin.category, ItemCategory::Coin);
        assert!(game_data.is_in_location_group(
            LOCATION_GROUP_GEAR,
            "Jr. Troopa's Playground In Hammer Bush"
        ));
        assert_eq!(game_data.get_item_group(ITEM_GROUP_PROXY_BADGE)?.len(), 6);
        assert!(game_data.get_exclusion_rule("no_such_rule").is_err());
        Ok(())
    }
}
