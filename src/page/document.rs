//! In-memory page
//!
//! A flat map of element id to content. Input elements hold their value,
//! containers hold their inner markup. Clones share the same page.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{FIELD_IDS, FormSource, OUTPUT_ID, Renderer};
use crate::error::{CivicError, Result};
use crate::predictor::CivicInputs;

#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: Arc<Mutex<HashMap<String, String>>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page with the five civic inputs filled in and an empty output container.
    pub fn civic_form(inputs: &CivicInputs) -> Self {
        let doc = Self::new();
        for (id, value) in FIELD_IDS.iter().zip(inputs.values()) {
            doc.set(id, value);
        }
        doc.set(OUTPUT_ID, "");
        doc
    }

    pub fn with_element(self, id: &str, content: &str) -> Self {
        self.set(id, content);
        self
    }

    /// Create or overwrite an element.
    pub fn set(&self, id: &str, content: &str) {
        self.lock().insert(id.to_string(), content.to_string());
    }

    pub fn remove(&self, id: &str) -> Option<String> {
        self.lock().remove(id)
    }

    /// Content of an element, if it exists.
    pub fn get(&self, id: &str) -> Option<String> {
        self.lock().get(id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A panicked writer leaves a complete map behind; keep using it.
        self.elements.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl FormSource for Document {
    fn field_value(&self, id: &str) -> Result<String> {
        self.get(id).ok_or_else(|| CivicError::element_not_found(id))
    }
}

impl Renderer for Document {
    fn replace_inner(&self, container_id: &str, markup: &str) -> Result<()> {
        let mut elements = self.lock();
        match elements.get_mut(container_id) {
            Some(content) => {
                *content = markup.to_string();
                Ok(())
            }
            None => Err(CivicError::element_not_found(container_id)),
        }
    }
}
