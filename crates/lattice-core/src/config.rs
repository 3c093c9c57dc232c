//! External configuration document. Every field is optional; anything left
//! out keeps the built-in value.

use crate::authority::{
    DecayRates, InstanceRole, ParameterAuthority, RoleCatalog, RoleModifier, SectionCatalog,
    SectionModifier, DEFAULT_SECTION,
};
use crate::bridge::{EventQueue, SynchronizationBridge};
use crate::constants::{EVENT_QUEUE_CAPACITY, EVENT_QUEUE_RETAIN};
use crate::error::{LatticeError, LatticeResult};
use crate::sink::VariableSink;
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionEntry {
    pub id: String,
    #[serde(flatten)]
    pub modifier: SectionModifier,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueueConfig {
    pub capacity: usize,
    pub retain: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: EVENT_QUEUE_CAPACITY,
            retain: EVENT_QUEUE_RETAIN,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LatticeConfig {
    /// Section active at start.
    pub default_section: Option<String>,
    /// Replaces the built-in section table wholesale, in order.
    pub sections: Option<Vec<SectionEntry>>,
    pub roles: FnvHashMap<InstanceRole, RoleModifier>,
    pub decay: Option<DecayRates>,
    pub queue: QueueConfig,
}

impl LatticeConfig {
    pub fn from_json(json: &str) -> LatticeResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| LatticeError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse `json`, logging and falling back to built-in defaults on error.
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(c) => c,
            Err(e) => {
                log::error!("[config] {}; using built-in defaults", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> LatticeResult<()> {
        if self.queue.capacity == 0 || self.queue.retain == 0 || self.queue.retain > self.queue.capacity {
            return Err(LatticeError::Configuration(format!(
                "queue retain {} must be in 1..={}",
                self.queue.retain, self.queue.capacity
            )));
        }
        if let Some(d) = &self.decay {
            if !d.is_valid() {
                return Err(LatticeError::Configuration(format!(
                    "decay rates must lie in (0, 1): {d:?}"
                )));
            }
        }
        for (role, m) in &self.roles {
            if !(m.grid_scale > 0.0 && m.morph_scale >= 0.0 && m.rotation_scale >= 0.0) {
                return Err(LatticeError::Configuration(format!(
                    "role {} has non-positive scales",
                    role.name()
                )));
            }
        }
        self.section_catalog().map(|_| ())
    }

    pub fn section_catalog(&self) -> LatticeResult<SectionCatalog> {
        let entries = match &self.sections {
            Some(list) => list
                .iter()
                .map(|e| (e.id.clone(), e.modifier.clone()))
                .collect(),
            None => SectionCatalog::builtin_entries(),
        };
        let default_id = match (&self.default_section, &self.sections) {
            (Some(id), _) => id.clone(),
            (None, Some(list)) => list
                .first()
                .map(|e| e.id.clone())
                .unwrap_or_else(|| DEFAULT_SECTION.to_string()),
            (None, None) => DEFAULT_SECTION.to_string(),
        };
        SectionCatalog::from_entries(entries, &default_id)
    }

    pub fn role_catalog(&self) -> RoleCatalog {
        let mut roles = RoleCatalog::builtin();
        for (role, modifier) in &self.roles {
            roles.set(*role, *modifier);
        }
        roles
    }

    pub fn build_authority(&self) -> LatticeResult<ParameterAuthority> {
        Ok(ParameterAuthority::with_catalogs(
            self.section_catalog()?,
            self.role_catalog(),
            self.decay.unwrap_or_default(),
        ))
    }

    pub fn event_queue(&self) -> EventQueue {
        EventQueue::new(self.queue.capacity, self.queue.retain)
    }

    pub fn build_bridge<S: VariableSink>(&self, sink: S) -> LatticeResult<SynchronizationBridge<S>> {
        Ok(SynchronizationBridge::with_queue(
            self.build_authority()?,
            sink,
            self.event_queue(),
        ))
    }
}
