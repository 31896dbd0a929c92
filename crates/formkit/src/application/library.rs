//! Form Library
//!
//! The saved-forms collection, persisted through an injected [`FormStore`].

use std::sync::Arc;
use tracing::{info, warn};

use crate::application::session::FormSession;
use crate::domain::aggregates::{FormBuilder, FormSchema};
use crate::domain::services::DerivedFieldEngine;
use crate::ports::outbound::FormStore;
use crate::{FormsError, Result};

pub struct FormLibrary {
    store: Arc<dyn FormStore>,
    forms: Vec<FormSchema>,
    /// False while the stored collection could not be read
    loaded: bool,
    engine: DerivedFieldEngine,
}

impl FormLibrary {
    /// Load the collection from `store`.
    ///
    /// A collection that cannot be read is logged and treated as empty.
    /// Writes stay blocked until the store loads successfully, so an
    /// unreadable collection is never overwritten.
    pub fn open(store: Arc<dyn FormStore>) -> Self {
        let (forms, loaded) = match store.load() {
            Ok(forms) => (forms, true),
            Err(e) => {
                warn!(error = %e, "Failed to load saved forms, starting empty");
                (vec![], false)
            }
        };
        info!(count = forms.len(), "Form library opened");
        Self {
            store,
            forms,
            loaded,
            engine: DerivedFieldEngine::new(),
        }
    }

    /// Retry a failed initial load before the first write
    fn ensure_loaded(&mut self) -> Result<()> {
        if !self.loaded {
            self.forms = self.store.load()?;
            self.loaded = true;
            info!(count = self.forms.len(), "Saved forms reloaded");
        }
        Ok(())
    }

    /// Engine handed to sessions opened from this library
    pub fn with_engine(mut self, engine: DerivedFieldEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn forms(&self) -> &[FormSchema] { &self.forms }
    pub fn len(&self) -> usize { self.forms.len() }
    pub fn is_empty(&self) -> bool { self.forms.is_empty() }

    pub fn get(&self, id: &str) -> Option<&FormSchema> {
        self.forms.iter().find(|f| f.id() == id)
    }

    /// Freeze the draft into a new saved form, persist, and clear the draft.
    ///
    /// On failure both the draft and the collection are left unchanged.
    pub fn save_draft(&mut self, draft: &mut FormBuilder) -> Result<&FormSchema> {
        let schema = draft.build()?;
        self.ensure_loaded()?;

        self.forms.push(schema);
        if let Err(e) = self.store.save(&self.forms) {
            self.forms.pop();
            return Err(e.into());
        }
        draft.clear();

        let saved = &self.forms[self.forms.len() - 1];
        info!(form_id = saved.id(), name = saved.name(), "Form saved");
        Ok(saved)
    }

    /// Delete a saved form
    pub fn delete(&mut self, id: &str) -> Result<FormSchema> {
        self.ensure_loaded()?;
        let index = self
            .forms
            .iter()
            .position(|f| f.id() == id)
            .ok_or(FormsError::FormNotFound)?;

        let removed = self.forms.remove(index);
        if let Err(e) = self.store.save(&self.forms) {
            self.forms.insert(index, removed);
            return Err(e.into());
        }
        info!(form_id = id, "Form deleted");
        Ok(removed)
    }

    /// Load a saved form into a draft for editing; saving it creates a new form
    pub fn edit(&self, id: &str, draft: &mut FormBuilder) -> Result<()> {
        let schema = self.get(id).ok_or(FormsError::FormNotFound)?;
        draft.edit(schema);
        Ok(())
    }

    /// Start filling in a saved form
    pub fn open_session(&self, id: &str) -> Result<FormSession> {
        let schema = self.get(id).ok_or(FormsError::FormNotFound)?;
        Ok(FormSession::open_with_engine(schema, self.engine.clone()))
    }
}
