use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::preferences::{PreferenceStore, SELECTED_MODEL_KEY};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOption {
    pub name: String,
    pub value: String,
}

impl ModelOption {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Models offered when the config does not supply its own list.
pub fn builtin_models() -> Vec<ModelOption> {
    vec![
        ModelOption::new("GPT-OSS 120B", "gpt-oss-120b"),
        ModelOption::new("LLaMA 3.3 70B", "llama-3.3-70b"),
        ModelOption::new("Qwen 3 32B", "qwen-3-32b"),
    ]
}

/// The selected backend model, restricted to a fixed catalog.
pub struct ModelSelectionStore {
    catalog: Vec<ModelOption>,
    store: Box<dyn PreferenceStore>,
    selected: String,
}

impl std::fmt::Debug for ModelSelectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSelectionStore")
            .field("catalog", &self.catalog)
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}

impl ModelSelectionStore {
    /// Restore the persisted selection, falling back to `default` and then to
    /// the first catalog entry when the stored value is absent or unknown.
    pub fn new(
        catalog: Vec<ModelOption>,
        store: impl PreferenceStore + 'static,
        default: &str,
    ) -> Self {
        let catalog = if catalog.is_empty() {
            builtin_models()
        } else {
            catalog
        };
        let contains = |id: &str| catalog.iter().any(|model| model.value == id);

        let persisted = store.get(SELECTED_MODEL_KEY);
        let selected = match persisted {
            Some(id) if contains(&id) => id,
            Some(id) => {
                warn!(model = %id, "persisted model is not available, using default");
                fallback(&catalog, default)
            }
            None => fallback(&catalog, default),
        };

        Self {
            catalog,
            store: Box::new(store),
            selected,
        }
    }

    pub fn current(&self) -> &str {
        &self.selected
    }

    pub fn catalog(&self) -> &[ModelOption] {
        &self.catalog
    }

    pub fn contains(&self, id: &str) -> bool {
        self.catalog.iter().any(|model| model.value == id)
    }

    pub fn display_name(&self) -> &str {
        self.catalog
            .iter()
            .find(|model| model.value == self.selected)
            .map(|model| model.name.as_str())
            .unwrap_or(self.selected.as_str())
    }

    /// Switch to `id` and persist it. Unknown ids are logged and ignored.
    pub fn select(&mut self, id: &str) {
        if !self.contains(id) {
            warn!(model = %id, "model is not in the list of available models");
            return;
        }

        self.selected = id.to_string();
        match self.store.set(SELECTED_MODEL_KEY, id) {
            Ok(()) => debug!(model = %id, "model selection saved"),
            Err(err) => warn!(model = %id, error = %err, "could not persist model selection"),
        }
    }

    /// Switch to `id` for this session only, without touching the store.
    pub fn override_for_session(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            warn!(model = %id, "model is not in the list of available models");
            return false;
        }
        self.selected = id.to_string();
        true
    }
}

fn fallback(catalog: &[ModelOption], default: &str) -> String {
    if catalog.iter().any(|model| model.value == default) {
        return default.to_string();
    }
    if !default.is_empty() {
        warn!(model = %default, "default model is not available, using first entry");
    }
    catalog
        .first()
        .map(|model| model.value.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::preferences::{MemoryPreferences, PreferenceError};
    use std::sync::{Arc, Mutex};

    /// Shares its map with the test so writes can be inspected.
    #[derive(Clone, Default)]
    struct SharedPreferences(Arc<Mutex<MemoryPreferences>>);

    impl PreferenceStore for SharedPreferences {
        fn get(&self, key: &str) -> Option<String> {
            self.0.lock().unwrap().get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
            self.0.lock().unwrap().set(key, value)
        }
    }

    #[test]
    fn falls_back_to_default_when_nothing_persisted() {
        let store =
            ModelSelectionStore::new(builtin_models(), MemoryPreferences::new(), "llama-3.3-70b");
        assert_eq!(store.current(), "llama-3.3-70b");
        assert_eq!(store.display_name(), "LLaMA 3.3 70B");
    }

    #[test]
    fn restores_persisted_selection() {
        let prefs = MemoryPreferences::with_value(SELECTED_MODEL_KEY, "qwen-3-32b");
        let store = ModelSelectionStore::new(builtin_models(), prefs, "gpt-oss-120b");
        assert_eq!(store.current(), "qwen-3-32b");
    }

    #[test]
    fn ignores_persisted_value_outside_catalog() {
        let prefs = MemoryPreferences::with_value(SELECTED_MODEL_KEY, "gpt-2");
        let store = ModelSelectionStore::new(builtin_models(), prefs, "gpt-oss-120b");
        assert_eq!(store.current(), "gpt-oss-120b");
    }

    #[test]
    fn invalid_default_uses_first_catalog_entry() {
        let store = ModelSelectionStore::new(builtin_models(), MemoryPreferences::new(), "nope");
        assert_eq!(store.current(), "gpt-oss-120b");
    }

    #[test]
    fn valid_selection_updates_and_persists() {
        let shared = SharedPreferences::default();
        let mut store = ModelSelectionStore::new(builtin_models(), shared.clone(), "gpt-oss-120b");

        store.select("llama-3.3-70b");
        assert_eq!(store.current(), "llama-3.3-70b");
        assert_eq!(shared.get(SELECTED_MODEL_KEY).as_deref(), Some("llama-3.3-70b"));
    }

    #[test]
    fn invalid_selection_keeps_last_known_good() {
        let shared = SharedPreferences::default();
        let mut store = ModelSelectionStore::new(builtin_models(), shared.clone(), "gpt-oss-120b");
        store.select("qwen-3-32b");

        store.select("definitely-not-a-model");
        assert_eq!(store.current(), "qwen-3-32b");
        assert_eq!(shared.get(SELECTED_MODEL_KEY).as_deref(), Some("qwen-3-32b"));
    }

    #[test]
    fn session_override_does_not_persist() {
        let shared = SharedPreferences::default();
        let mut store = ModelSelectionStore::new(builtin_models(), shared.clone(), "gpt-oss-120b");

        assert!(store.override_for_session("qwen-3-32b"));
        assert!(!store.override_for_session("other"));
        assert_eq!(store.current(), "qwen-3-32b");
        assert_eq!(shared.get(SELECTED_MODEL_KEY), None);
    }

    #[test]
    fn custom_catalog_replaces_builtins() {
        let catalog = vec![ModelOption::new("Local", "local-7b")];
        let mut store = ModelSelectionStore::new(catalog, MemoryPreferences::new(), "local-7b");
        store.select("gpt-oss-120b");
        assert_eq!(store.current(), "local-7b");
    }
}
