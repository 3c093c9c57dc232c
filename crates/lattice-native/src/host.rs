use lattice_core::effects::PresetStore;
use lattice_core::{MemorySink, VariableSink, VariableValue};
use std::fs;
use std::path::PathBuf;

/// Keeps the latest live values and traces every write.
#[derive(Default)]
pub struct LogSink {
    values: MemorySink,
}

impl LogSink {
    pub fn scalar(&self, name: &str) -> Option<f32> {
        self.values.scalar(name)
    }
}

impl VariableSink for LogSink {
    fn set(&mut self, name: &str, value: &VariableValue) {
        log::trace!("[vars] --{} = {}", name, value);
        self.values.set(name, value);
    }
}

/// Profiles stored as `<dir>/<key>.json`.
pub struct FilePresetStore {
    dir: PathBuf,
}

impl FilePresetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl PresetStore for FilePresetStore {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn save(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)?;
        Ok(())
    }
}
