//! Column settings persistence.
//!
//! The grid asks a [`ColumnSettingsStore`] to hydrate each column before the
//! first render and tells it about every width or visibility change. Storage
//! failures are logged and the column keeps what it has.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{clamp_width, Column, GridOptions, SettingsMode};

/// Two-method contract for persisting column width and visibility.
pub trait ColumnSettingsStore {
    /// Persist the column's current width and visibility.
    fn save_column(&mut self, column: &Column);

    /// Overwrite width and visibility with persisted values, if any.
    fn update_column(&mut self, column: &mut Column);
}

/// What gets persisted per column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSettings {
    pub width: u32,
    pub visible: bool,
}

impl ColumnSettings {
    pub fn from_column(column: &Column) -> Self {
        Self {
            width: column.width,
            visible: column.visible,
        }
    }

    pub fn apply(&self, column: &mut Column) {
        column.width = clamp_width(self.width);
        column.visible = self.visible;
    }
}

/// String key/value storage backing [`StorageSettings`].
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory storage, used natively and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The browser's `localStorage`.
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    /// `None` when the browser exposes no local storage (or denies it).
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| crate::error::GridError::Storage(format!("{e:?}")))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| crate::error::GridError::Storage(format!("{e:?}")))
    }
}

/// Settings kept in a [`KeyValueStore`] as JSON under `prefix + id`, with a
/// read-through cache.
#[derive(Debug)]
pub struct StorageSettings<S> {
    storage: S,
    prefix: String,
    cache: HashMap<String, ColumnSettings>,
}

impl<S: KeyValueStore> StorageSettings<S> {
    pub fn new(storage: S, prefix: impl Into<String>) -> Self {
        Self {
            storage,
            prefix: prefix.into(),
            cache: HashMap::new(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn key(&self, column: &Column) -> Option<String> {
        column.settings_id().map(|id| format!("{}{id}", self.prefix))
    }

    fn load(&self, key: &str) -> Option<ColumnSettings> {
        let raw = match self.storage.get_item(key) {
            Ok(raw) => raw?,
            Err(err) => {
                tracing::warn!(%err, key, "reading column settings failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(settings) => Some(settings),
            Err(err) => {
                tracing::warn!(%err, key, "ignoring malformed column settings");
                None
            }
        }
    }
}

impl<S: KeyValueStore> ColumnSettingsStore for StorageSettings<S> {
    fn save_column(&mut self, column: &Column) {
        let Some(key) = self.key(column) else {
            return;
        };
        let settings = ColumnSettings::from_column(column);
        self.cache.insert(key.clone(), settings);
        let stored = serde_json::to_string(&settings)
            .map_err(Into::into)
            .and_then(|json| self.storage.set_item(&key, &json));
        if let Err(err) = stored {
            tracing::warn!(%err, key, "saving column settings failed");
        }
    }

    fn update_column(&mut self, column: &mut Column) {
        let Some(key) = self.key(column) else {
            return;
        };
        let settings = match self.cache.get(&key) {
            Some(settings) => Some(*settings),
            None => {
                let loaded = self.load(&key);
                if let Some(settings) = loaded {
                    self.cache.insert(key, settings);
                }
                loaded
            }
        };
        if let Some(settings) = settings {
            settings.apply(column);
        }
    }
}

/// Persists nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSettings;

impl ColumnSettingsStore for NoopSettings {
    fn save_column(&mut self, _column: &Column) {}
    fn update_column(&mut self, _column: &mut Column) {}
}

type SaveFn = Box<dyn FnMut(&Column)>;
type UpdateFn = Box<dyn FnMut(&mut Column)>;

/// Caller-supplied save/update pair.
pub struct CallbackSettings {
    save: SaveFn,
    update: UpdateFn,
}

impl CallbackSettings {
    pub fn new(save: impl FnMut(&Column) + 'static, update: impl FnMut(&mut Column) + 'static) -> Self {
        Self {
            save: Box::new(save),
            update: Box::new(update),
        }
    }
}

impl ColumnSettingsStore for CallbackSettings {
    fn save_column(&mut self, column: &Column) {
        (self.save)(column);
    }

    fn update_column(&mut self, column: &mut Column) {
        (self.update)(column);
    }
}

/// The store a grid builds for itself from its options.
///
/// `local` persists in the browser's local storage when available; natively
/// (or without storage access) it falls back to an in-memory store that lives
/// as long as the grid.
pub fn from_options(options: &GridOptions) -> Box<dyn ColumnSettingsStore> {
    match options.settings {
        SettingsMode::None => Box::new(NoopSettings),
        SettingsMode::Local => {
            #[cfg(target_arch = "wasm32")]
            if let Some(storage) = LocalStorage::open() {
                return Box::new(StorageSettings::new(storage, options.settings_prefix.clone()));
            }
            Box::new(StorageSettings::new(
                MemoryStorage::new(),
                options.settings_prefix.clone(),
            ))
        }
    }
}
