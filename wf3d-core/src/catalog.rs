/// Named and numbered wire-frame models loaded from a configuration.
///
/// When the configuration itself cannot be loaded the catalog falls back to
/// a single bundled model named [`FALLBACK_NAME`]. Individual model failures
/// are reported, not papered over.
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::{ViewSettings, WireFrameConfig, WireFrameEntry};
use crate::error::{Result, WireFrameError};
use crate::mesh::ObjWireFrame;
use crate::obj::{load_obj_file, parse_obj};

/// Name of the bundled fallback model
pub const FALLBACK_NAME: &str = "Default";

const FALLBACK_OBJ: &str = include_str!("../assets/fallback.obj");

/// The bundled fallback model.
pub fn fallback_model() -> Result<ObjWireFrame> {
    let model = parse_obj(FALLBACK_OBJ)?;
    model.validate()?;
    Ok(model)
}

#[derive(Debug, Clone)]
pub struct WireFrameCatalog {
    by_id: BTreeMap<u32, Arc<ObjWireFrame>>,
    by_name: BTreeMap<String, Arc<ObjWireFrame>>,
    default_name: Option<String>,
    settings: ViewSettings,
}

impl WireFrameCatalog {
    /// Loads every model in `config`, resolving relative paths against
    /// `base_dir`.
    #[instrument(skip(config), fields(models = config.wire_frames.len()))]
    pub fn load(config: &WireFrameConfig, base_dir: &Path) -> Result<Self> {
        let mut catalog = Self::empty(config.view.clone());

        for entry in &config.wire_frames {
            info!("Loading wire-frame: {}", entry.name);
            let model = load_entry(entry, base_dir)?;
            catalog.insert(entry.id, entry.name.clone(), Arc::new(model));

            if entry.default {
                // a later default overrides an earlier one
                catalog.default_name = Some(entry.name.clone());
            }
            info!("Wire-frame loaded: {}", entry.name);
        }

        if catalog.default_name.is_none() {
            catalog.default_name = catalog.by_name.keys().next().cloned();
        }

        Ok(catalog)
    }

    /// Loads the configuration at `path`, or the fallback catalog when the
    /// configuration cannot be read or parsed.
    pub fn from_config_file(path: &Path) -> Result<Self> {
        match WireFrameConfig::from_file(path) {
            Ok(config) => {
                let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
                Self::load(&config, base_dir)
            }
            Err(e) => {
                warn!("Failed to load config {:?}: {}; using fallback model", path, e);
                Self::fallback()
            }
        }
    }

    /// A catalog holding only the bundled model as `"Default"`, id 0.
    pub fn fallback() -> Result<Self> {
        let mut catalog = Self::empty(ViewSettings::default());
        catalog.insert(0, FALLBACK_NAME.to_string(), Arc::new(fallback_model()?));
        catalog.default_name = Some(FALLBACK_NAME.to_string());
        Ok(catalog)
    }

    /// A catalog of one model, id 0, with default view settings.
    pub fn single(name: &str, wire_frame: ObjWireFrame) -> Self {
        let mut catalog = Self::empty(ViewSettings::default());
        catalog.insert(0, name.to_string(), Arc::new(wire_frame));
        catalog.default_name = Some(name.to_string());
        catalog
    }

    fn empty(settings: ViewSettings) -> Self {
        Self {
            by_id: BTreeMap::new(),
            by_name: BTreeMap::new(),
            default_name: None,
            settings,
        }
    }

    fn insert(&mut self, id: u32, name: String, model: Arc<ObjWireFrame>) {
        self.by_id.insert(id, Arc::clone(&model));
        self.by_name.insert(name, model);
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Model names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_id.keys().copied()
    }

    pub fn wire_frames(&self) -> impl Iterator<Item = &Arc<ObjWireFrame>> {
        self.by_id.values()
    }

    pub fn get_by_name(&self, name: &str) -> Result<Arc<ObjWireFrame>> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| WireFrameError::UnknownName(name.to_string()))
    }

    pub fn get_by_id(&self, id: u32) -> Result<Arc<ObjWireFrame>> {
        self.by_id
            .get(&id)
            .cloned()
            .ok_or(WireFrameError::UnknownId(id))
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default_name.as_deref()
    }

    pub fn default_wire_frame(&self) -> Option<Arc<ObjWireFrame>> {
        self.default_name
            .as_deref()
            .and_then(|name| self.by_name.get(name).cloned())
    }

    pub fn set_default(&mut self, name: &str) -> Result<()> {
        self.get_by_name(name)?;
        self.default_name = Some(name.to_string());
        Ok(())
    }

    /// The name after `name` in sorted order, wrapping around.
    pub fn next_name(&self, name: &str) -> Option<&str> {
        use std::ops::Bound::{Excluded, Unbounded};

        self.by_name
            .range::<str, _>((Excluded(name), Unbounded))
            .next()
            .or_else(|| self.by_name.iter().next())
            .map(|(name, _)| name.as_str())
    }
}

fn load_entry(entry: &WireFrameEntry, base_dir: &Path) -> Result<ObjWireFrame> {
    let path = base_dir.join(&entry.path);
    let wrap = |source: WireFrameError| WireFrameError::Model {
        path: path.clone(),
        source: Box::new(source),
    };

    let model = load_obj_file(&path).map_err(wrap)?;
    model.validate().map_err(|e| wrap(e.into()))?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_model_is_valid() {
        let model = fallback_model().unwrap();
        assert_eq!(model.vertices.len(), 16);
        assert_eq!(model.normals.len(), 6);
        assert_eq!(model.faces.len(), 11);
    }

    #[test]
    fn test_fallback_catalog() {
        let catalog = WireFrameCatalog::fallback().unwrap();
        assert_eq!(catalog.default_name(), Some(FALLBACK_NAME));
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec![FALLBACK_NAME]);
        assert_eq!(catalog.ids().collect::<Vec<_>>(), vec![0]);
        assert!(catalog.get_by_id(0).is_ok());
        assert!(matches!(
            catalog.get_by_id(7),
            Err(WireFrameError::UnknownId(7))
        ));
        assert!(matches!(
            catalog.get_by_name("van"),
            Err(WireFrameError::UnknownName(_))
        ));
    }

    #[test]
    fn test_set_default_rejects_unknown_names() {
        let mut catalog = WireFrameCatalog::fallback().unwrap();
        assert!(catalog.set_default("van").is_err());
        assert_eq!(catalog.default_name(), Some(FALLBACK_NAME));
    }

    #[test]
    fn test_single_model_catalog() {
        let catalog = WireFrameCatalog::single("cube", ObjWireFrame::cube(1.0));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.default_name(), Some("cube"));
        assert_eq!(
            *catalog.default_wire_frame().unwrap(),
            ObjWireFrame::cube(1.0)
        );
    }

    #[test]
    fn test_next_name_wraps() {
        let catalog = WireFrameCatalog::fallback().unwrap();
        assert_eq!(catalog.next_name(FALLBACK_NAME), Some(FALLBACK_NAME));
    }
}
