use super::preset::EffectLevel;
use crate::error::LatticeResult;
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const PROFILE_STORAGE_KEY: &str = "hyperlattice.preset-profile";

/// The last preset triggered per level.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetProfile {
    #[serde(default)]
    pub active: BTreeMap<EffectLevel, String>,
}

impl PresetProfile {
    pub fn record(&mut self, level: EffectLevel, preset: &str) {
        self.active.insert(level, preset.to_string());
    }

    pub fn active_for(&self, level: EffectLevel) -> Option<&str> {
        self.active.get(&level).map(String::as_str)
    }

    pub fn to_json(&self) -> LatticeResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> LatticeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Minimal key-value persistence for profiles.
pub trait PresetStore {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>>;

    fn save(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryPresetStore {
    entries: FnvHashMap<String, String>,
}

impl MemoryPresetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresetStore for MemoryPresetStore {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
