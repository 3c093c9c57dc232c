use lattice_core::effects::PresetStore;
use web_sys as web;

/// Preset profiles persisted in `window.localStorage`.
pub struct LocalStorageStore {
    storage: web::Storage,
}

impl LocalStorageStore {
    pub fn open() -> anyhow::Result<Self> {
        let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
        let storage = window
            .local_storage()
            .map_err(|e| anyhow::anyhow!("localStorage: {:?}", e))?
            .ok_or_else(|| anyhow::anyhow!("localStorage unavailable"))?;
        Ok(Self { storage })
    }
}

impl PresetStore for LocalStorageStore {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| anyhow::anyhow!("getItem {}: {:?}", key, e))
    }

    fn save(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| anyhow::anyhow!("setItem {}: {:?}", key, e))
    }
}
