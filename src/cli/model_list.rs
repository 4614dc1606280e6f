//! Model listing and the persisted selection.

use crate::core::model_selection::ModelSelectionStore;

/// One line per catalog entry, the current selection marked with `*`.
pub fn model_lines(models: &ModelSelectionStore) -> Vec<String> {
    let width = models
        .catalog()
        .iter()
        .map(|model| model.value.len())
        .max()
        .unwrap_or(0);
    models
        .catalog()
        .iter()
        .map(|model| {
            let marker = if model.value == models.current() { '*' } else { ' ' };
            format!("{marker} {:<width$}  {}", model.value, model.name)
        })
        .collect()
}

pub fn list_models(models: &ModelSelectionStore) {
    println!("Available models:");
    for line in model_lines(models) {
        println!("  {line}");
    }
}

/// Validate `id` against the catalog and make it the saved selection.
pub fn set_model(models: &mut ModelSelectionStore, id: &str) -> Result<String, String> {
    let id = id.trim();
    if !models.contains(id) {
        return Err(format!(
            "Unknown model: {id} (run `chatdesk models` to see the list)"
        ));
    }
    models.select(id);
    Ok(format!("Model set: {} ({id})", models.display_name()))
}
