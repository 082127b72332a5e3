//! RON preset loader

use crate::error::{Error, Result};
use crate::schema::PresetDef;
use excite_core::MAX_EXCITEMENT;
use indexmap::IndexMap;
use ron::ser::PrettyConfig;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Loaded presets, in load order
#[derive(Debug, Default)]
pub struct PresetDefs {
    /// Presets by name
    pub presets: IndexMap<String, PresetDef>,
}

impl PresetDefs {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a preset by name
    pub fn get(&self, name: &str) -> Option<&PresetDef> {
        self.presets.get(name)
    }

    /// Preset names in load order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

/// Loader for RON preset files
pub struct Loader {
    defs: PresetDefs,
}

impl Loader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            defs: PresetDefs::new(),
        }
    }

    /// Load a single RON file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let added = self.load_str(&content)?;
        debug!(path = %path.display(), presets = added, "preset file loaded");
        Ok(())
    }

    /// Load presets from a RON string
    ///
    /// Accepts either `(presets: [...])` or a single preset. Returns the
    /// number of presets added. Every preset is checked before any is
    /// added, so a failed load leaves the loader unchanged.
    pub fn load_str(&mut self, content: &str) -> Result<usize> {
        #[derive(serde::Deserialize)]
        struct PresetFile {
            presets: Vec<PresetDef>,
        }

        let presets = if is_preset_list(content) {
            ron::from_str::<PresetFile>(content)?.presets
        } else {
            vec![ron::from_str::<PresetDef>(content)?]
        };

        let mut batch: HashSet<&str> = HashSet::new();
        for preset in &presets {
            validate(preset)?;
            if self.defs.presets.contains_key(&preset.name) || !batch.insert(&preset.name) {
                return Err(Error::DuplicatePreset(preset.name.clone()));
            }
        }

        let count = presets.len();
        for preset in presets {
            self.defs.presets.insert(preset.name.clone(), preset);
        }
        Ok(count)
    }

    /// Load all RON files from a directory
    ///
    /// Files are visited in name order so load order does not depend on the
    /// filesystem. If any file fails, every preset added by this call is
    /// dropped again.
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let before = self.defs.len();
        let loaded = self.load_directory_inner(path.as_ref());
        if loaded.is_err() {
            self.defs.presets.truncate(before);
        }
        loaded
    }

    fn load_directory_inner(&mut self, path: &Path) -> Result<()> {
        if !path.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {:?}", path),
            )));
        }

        let mut entries = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        for file_path in entries {
            if file_path.extension().map(|e| e == "ron").unwrap_or(false) {
                self.load_file(&file_path)?;
            } else if file_path.is_dir() {
                self.load_directory_inner(&file_path)?;
            }
        }

        Ok(())
    }

    /// Finish loading and return the presets
    pub fn finish(self) -> PresetDefs {
        info!(presets = self.defs.len(), "presets loaded");
        self.defs
    }

    /// Get the current presets (for inspection during loading)
    pub fn defs(&self) -> &PresetDefs {
        &self.defs
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the content is a `(presets: [...])` list rather than one preset
fn is_preset_list(content: &str) -> bool {
    content
        .trim_start()
        .strip_prefix('(')
        .map(|body| body.trim_start().starts_with("presets"))
        .unwrap_or(false)
}

/// Reject presets that cannot be restored; warn about values the meter
/// will clamp
fn validate(preset: &PresetDef) -> Result<()> {
    if preset.name.trim().is_empty() {
        return Err(Error::InvalidPreset("preset name is empty".to_string()));
    }
    for (index, event) in preset.events.iter().enumerate() {
        if !event.threshold.is_finite() {
            return Err(Error::InvalidPreset(format!(
                "{}: event {} has a non-finite threshold",
                preset.name,
                index + 1
            )));
        }
        if !(0.0..=MAX_EXCITEMENT).contains(&event.threshold) {
            warn!(preset = %preset.name, event = index + 1, threshold = event.threshold, "threshold will be clamped");
        }
    }
    for warning in preset.config.validate() {
        warn!(preset = %preset.name, %warning, "preset configuration will be adjusted");
    }
    Ok(())
}

/// Render a preset as pretty RON
pub fn to_ron_string(preset: &PresetDef) -> Result<String> {
    Ok(ron::ser::to_string_pretty(preset, PrettyConfig::new())?)
}

/// Write a preset to a RON file
pub fn write_file(path: impl AsRef<Path>, preset: &PresetDef) -> Result<()> {
    fs::write(path, to_ron_string(preset)?)?;
    Ok(())
}
