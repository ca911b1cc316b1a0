use std::fmt::Display;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use strum::VariantNames;
use strum_macros::VariantNames;

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Default)]
#[serde(default)]
pub struct PaperMarioSettings {
    pub name: Option<String>,
    pub location_settings: LocationSettings,
    pub gear_settings: GearSettings,
    pub partner_settings: PartnerSettings,
    pub item_pool_settings: ItemPoolSettings,
    pub world_settings: WorldSettings,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(default)]
pub struct LocationSettings {
    // Coins:
    pub overworld_coins: bool,
    pub coin_blocks: bool,
    pub foliage_coins: bool,
    // Shops and panels:
    pub include_shops: bool,
    pub shuffle_hidden_panels: bool,
    // Side quests:
    pub koot_favors: ShuffleKootFavors,
    pub koot_coins: bool,
    pub letter_rewards: ShuffleLetters,
    pub trading_events: bool,
    pub dojo: bool,
    // Other:
    pub partners: bool,
    pub keysanity: bool,
}

impl Default for LocationSettings {
    fn default() -> Self {
        LocationSettings {
            overworld_coins: false,
            coin_blocks: false,
            foliage_coins: false,
            include_shops: true,
            shuffle_hidden_panels: true,
            koot_favors: ShuffleKootFavors::Vanilla,
            koot_coins: false,
            letter_rewards: ShuffleLetters::Vanilla,
            trading_events: false,
            dojo: false,
            partners: true,
            keysanity: true,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(default)]
pub struct GearSettings {
    pub gear_shuffle_mode: GearShuffleMode,
    pub starting_hammer: StartingHammer,
    pub starting_boots: StartingBoots,
}

impl Default for GearSettings {
    fn default() -> Self {
        GearSettings {
            gear_shuffle_mode: GearShuffleMode::GearLocationShuffle,
            starting_hammer: StartingHammer::Normal,
            starting_boots: StartingBoots::Normal,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(default)]
pub struct PartnerSettings {
    pub start_with_goombario: bool,
    pub start_with_kooper: bool,
    pub start_with_bombette: bool,
    pub start_with_parakarry: bool,
    pub start_with_bow: bool,
    pub start_with_watt: bool,
    pub start_with_sushie: bool,
    pub start_with_lakilester: bool,
    pub partner_upgrades: PartnerUpgradeShuffle,
}

impl Default for PartnerSettings {
    fn default() -> Self {
        PartnerSettings {
            start_with_goombario: true,
            start_with_kooper: false,
            start_with_bombette: false,
            start_with_parakarry: false,
            start_with_bow: false,
            start_with_watt: false,
            start_with_sushie: false,
            start_with_lakilester: false,
            partner_upgrades: PartnerUpgradeShuffle::Vanilla,
        }
    }
}

impl PartnerSettings {
    /// Names of the partner items Mario starts with.
    pub fn starting_partners(&self) -> Vec<&'static str> {
        [
            (self.start_with_goombario, "Goombario"),
            (self.start_with_kooper, "Kooper"),
            (self.start_with_bombette, "Bombette"),
            (self.start_with_parakarry, "Parakarry"),
            (self.start_with_bow, "Bow"),
            (self.start_with_watt, "Watt"),
            (self.start_with_sushie, "Sushie"),
            (self.start_with_lakilester, "Lakilester"),
        ]
        .into_iter()
        .filter(|&(enabled, _)| enabled)
        .map(|(_, name)| name)
        .collect()
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(default)]
pub struct ItemPoolSettings {
    pub power_star_hunt: bool,
    pub total_power_stars: usize,
    pub item_pouches: bool,
    pub unused_badge_dupes: bool,
    pub beta_items: bool,
    pub progressive_badges: bool,
    pub badge_pool_limit: usize,
    pub consumable_item_pool: ConsumableItemPool,
    pub consumable_item_quality: u8, // 0 to 100
    pub item_traps: ItemTraps,
}

impl Default for ItemPoolSettings {
    fn default() -> Self {
        ItemPoolSettings {
            power_star_hunt: false,
            total_power_stars: 0,
            item_pouches: false,
            unused_badge_dupes: false,
            beta_items: false,
            progressive_badges: false,
            badge_pool_limit: 128,
            consumable_item_pool: ConsumableItemPool::Vanilla,
            consumable_item_quality: 50,
            item_traps: ItemTraps::NoTraps,
        }
    }
}

impl ItemPoolSettings {
    pub fn power_stars_enabled(&self) -> bool {
        self.power_star_hunt && self.total_power_stars > 0
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(default)]
pub struct WorldSettings {
    pub open_forest: bool,
    pub open_blue_house: bool,
    pub magical_seeds: usize, // Number of magical seeds required to open the Flower Gate, 0 to 4
    pub bowser_castle_mode: BowserCastleMode,
    pub always_speedy_spin: bool,
    pub always_ispy: bool,
    pub always_peekaboo: bool,
}

impl Default for WorldSettings {
    fn default() -> Self {
        WorldSettings {
            open_forest: false,
            open_blue_house: false,
            magical_seeds: 4,
            bowser_castle_mode: BowserCastleMode::Vanilla,
            always_speedy_spin: false,
            always_ispy: false,
            always_peekaboo: false,
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, VariantNames)]
pub enum ShuffleKootFavors {
    Vanilla,
    RewardsOnly,
    FullShuffle,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, VariantNames)]
pub enum ShuffleLetters {
    Vanilla,
    SimpleLetters,
    FinalLetterChainReward,
    FullShuffle,
}

// Variant order matters: the gear options compare tiers with `>=`.
#[derive(
    Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, VariantNames,
)]
pub enum GearShuffleMode {
    Vanilla,
    GearLocationShuffle,
    FullShuffle,
}

#[derive(
    Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, VariantNames,
)]
pub enum StartingHammer {
    Hammerless,
    Normal,
    Super,
    Ultra,
}

#[derive(
    Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, VariantNames,
)]
pub enum StartingBoots {
    Jumpless,
    Normal,
    Super,
    Ultra,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, VariantNames)]
pub enum PartnerUpgradeShuffle {
    Vanilla,
    SuperBlockLocations,
    FullShuffle,
}

#[derive(
    Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, VariantNames,
)]
pub enum BowserCastleMode {
    Vanilla,
    Shortened,
    BossRush,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, VariantNames)]
pub enum ConsumableItemPool {
    Vanilla,
    BalancedRandom,
    FullRandom,
    Mystery,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, VariantNames)]
pub enum ItemTraps {
    NoTraps,
    Sparse,
    Moderate,
    Plenty,
}

impl ItemTraps {
    pub fn trap_count(&self) -> usize {
        match self {
            ItemTraps::NoTraps => 0,
            ItemTraps::Sparse => 15,
            ItemTraps::Moderate => 35,
            ItemTraps::Plenty => 80,
        }
    }
}

impl Display for ItemTraps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Accepted values of each enum-valued option, by option name.
pub fn option_variants() -> Vec<(&'static str, &'static [&'static str])> {
    vec![
        ("koot_favors", ShuffleKootFavors::VARIANTS),
        ("letter_rewards", ShuffleLetters::VARIANTS),
        ("gear_shuffle_mode", GearShuffleMode::VARIANTS),
        ("starting_hammer", StartingHammer::VARIANTS),
        ("starting_boots", StartingBoots::VARIANTS),
        ("partner_upgrades", PartnerUpgradeShuffle::VARIANTS),
        ("bowser_castle_mode", BowserCastleMode::VARIANTS),
        ("consumable_item_pool", ConsumableItemPool::VARIANTS),
        ("item_traps", ItemTraps::VARIANTS),
    ]
}

pub fn parse_settings(settings_json: &str) -> Result<PaperMarioSettings> {
    let settings: PaperMarioSettings =
        serde_json::from_str(settings_json).context("Unable to parse settings")?;
    Ok(settings)
}

pub fn load_settings(path: &Path) -> Result<PaperMarioSettings> {
    let settings_str = std::fs::read_to_string(path)
        .with_context(|| format!("Unable to read settings at {}", path.display()))?;
    parse_settings(&settings_str)
        .with_context(|| format!("Unable to load settings at {}", path.display()))
}

/// Load every settings preset (`*.json`) in a directory, sorted by file name.
pub fn load_presets(presets_path: &Path) -> Result<Vec<PaperMarioSettings>> {
    let mut paths = vec![];
    for entry in std::fs::read_dir(presets_path)
        .with_context(|| format!("Unable to read presets in {}", presets_path.display()))?
    {
        let path = entry?.path();
        if path.extension().is_some_and(|x| x == "json") {
            paths.push(path);
        }
    }
    paths.sort();
    paths.iter().map(|p| load_settings(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() -> Result<()> {
        let settings = parse_settings(
            r#"{
                "location_settings": { "overworld_coins": true },
                "gear_settings": { "starting_boots": "Jumpless" }
            }"#,
        )?;
        assert!(settings.location_settings.overworld_coins);
        assert!(settings.location_settings.include_shops);
        assert_eq!(settings.gear_settings.starting_boots, StartingBoots::Jumpless);
        assert_eq!(settings.gear_settings.starting_hammer, StartingHammer::Normal);
        assert_eq!(settings.item_pool_settings.badge_pool_limit, 128);
        assert_eq!(settings.world_settings.magical_seeds, 4);
        Ok(())
    }

    #[test]
    fn test_unknown_variant_rejected() {
        let result = parse_settings(r#"{ "gear_settings": { "starting_hammer": "Mega" } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_tier_ordering() {
        assert!(StartingHammer::Ultra >= StartingHammer::Super);
        assert!(StartingBoots::Jumpless < StartingBoots::Normal);
        assert!(GearShuffleMode::FullShuffle >= GearShuffleMode::GearLocationShuffle);
        assert!(BowserCastleMode::BossRush > BowserCastleMode::Vanilla);
    }

    #[test]
    fn test_option_variants() {
        let variants = option_variants();
        let (name, traps) = variants[variants.len() - 1];
        assert_eq!(name, "item_traps");
        assert_eq!(traps, &["NoTraps", "Sparse", "Moderate", "Plenty"]);
    }

    #[test]
    fn test_starting_partners() {
        let mut partner_settings = PartnerSettings::default();
        partner_settings.start_with_bow = true;
        assert_eq!(partner_settings.starting_partners(), vec!["Goombario", "Bow"]);
    }
}
