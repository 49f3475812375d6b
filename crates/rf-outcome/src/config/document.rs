//! Serialized game document
//!
//! Field names follow the camelCase convention of the design files. Symbols,
//! components and reel sets are referenced by name; [`super::ConfigLoader`]
//! resolves them.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::award::Award;
use crate::trigger::{Area, CellMultiplier};

/// Top-level game document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDocument {
    pub name: String,
    /// Symbol names; a symbol's code is its index
    pub symbols: Vec<String>,
    /// Symbol name → pay per matched count (index 0 is a count of one)
    #[serde(default)]
    pub paytable: BTreeMap<String, Vec<i64>>,
    /// Row index per reel, one entry per payline
    #[serde(default)]
    pub lines: Vec<Vec<usize>>,
    /// Reel set name → strips of symbol names
    #[serde(default)]
    pub reel_sets: BTreeMap<String, Vec<Vec<String>>>,
    /// Entry component; the first component when unset
    #[serde(default)]
    pub entry: Option<String>,
    #[serde(default)]
    pub max_steps: Option<usize>,
    pub components: Vec<ComponentDocument>,
}

/// One component of the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDocument {
    pub name: String,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(flatten)]
    pub kind: ComponentKindDocument,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ComponentKindDocument {
    Trigger(TriggerDocument),
    Respin(RespinDocument),
    Reels(ReelsDocument),
}

/// Trigger component
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TriggerDocument {
    pub trigger_type: String,
    pub symbols: Vec<String>,
    pub wild_symbols: Vec<String>,
    pub exclude_symbols: Vec<String>,
    pub free_game_symbols: Vec<String>,
    pub bet_type: Option<String>,
    pub min_num: usize,
    pub direction: Option<String>,
    pub pay_as: Option<String>,
    pub area: Option<Area>,
    pub allow_diagonal: bool,
    pub other_mul: Option<CellMultiplier>,
    pub is_reverse: bool,

    pub win_multi: Option<i64>,

    pub respin_num: i64,
    pub respin_num_weight: Vec<(i64, u64)>,
    /// Keyed by matched symbol count
    pub respin_num_with_scatter_num: BTreeMap<CountKey, i64>,
    pub respin_num_weight_with_scatter_num: BTreeMap<CountKey, Vec<(i64, u64)>>,
    pub jump_to_component: Option<String>,
    pub force_to_next: bool,

    pub awards: Vec<Award>,
    pub symbol_awards: Option<SymbolAwardsDocument>,
}

/// Award sets rolled once per matched symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolAwardsDocument {
    pub sets: Vec<Vec<Award>>,
    /// One weight per set
    pub weights: Vec<u64>,
}

/// Respin component
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespinDocument {
    pub main_component: String,
}

/// Reels component
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReelsDocument {
    #[serde(default)]
    pub reel_set: Option<String>,
    /// Weighted reel set choice; takes precedence over `reelSet`
    #[serde(default)]
    pub reel_set_weights: Vec<(String, u64)>,
    pub height: usize,
    #[serde(default)]
    pub multipliers: Vec<(i32, u64)>,
}

/// Symbol-count map key
///
/// Accepts `3` as well as `"3"`: JSON object keys are always strings, and
/// flattened maps arrive buffered whatever the source format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CountKey(pub usize);

impl Serialize for CountKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0 as u64)
    }
}

impl<'de> Deserialize<'de> for CountKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CountKeyVisitor;

        impl Visitor<'_> for CountKeyVisitor {
            type Value = CountKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a symbol count")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<CountKey, E> {
                usize::try_from(v).map(CountKey).map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<CountKey, E> {
                usize::try_from(v).map(CountKey).map_err(E::custom)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<CountKey, E> {
                v.trim().parse().map(CountKey).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(CountKeyVisitor)
    }
}
