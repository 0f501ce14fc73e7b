use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use infodocs_core::keys;
use infodocs_core::models::template::Template;
use infodocs_storage::error::StorageError;
use infodocs_storage::records;
use uuid::Uuid;

use crate::error::ExportError;

/// Memoised template reads. Owned by the renderer; the write path calls
/// [`TemplateCache::invalidate`] after changing a template.
#[derive(Debug)]
pub struct TemplateCache {
    records_dir: PathBuf,
    by_id: RwLock<HashMap<Uuid, Arc<Template>>>,
    public: RwLock<Option<Arc<Vec<Template>>>>,
    /// Bumped under the `by_id` write lock by every invalidation. A read
    /// that straddles a bump is returned but not cached.
    generation: AtomicU64,
}

impl TemplateCache {
    pub fn new(records_dir: impl Into<PathBuf>) -> Self {
        Self {
            records_dir: records_dir.into(),
            by_id: RwLock::new(HashMap::new()),
            public: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// An active template by id.
    pub fn get(&self, id: Uuid) -> Result<Arc<Template>, ExportError> {
        if let Some(template) = self
            .by_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
        {
            return Ok(Arc::clone(template));
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let template: Template = match records::load_record(&self.records_dir, &keys::template(id)) {
            Ok(template) => template,
            Err(StorageError::NotFound { .. }) => return Err(ExportError::TemplateNotFound(id)),
            Err(e) => return Err(e.into()),
        };
        if !template.is_active {
            return Err(ExportError::TemplateNotFound(id));
        }

        let template = Arc::new(template);
        let mut by_id = self.by_id.write().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::SeqCst) == generation {
            by_id.insert(id, Arc::clone(&template));
            tracing::debug!(template_id = %id, "template cached");
        }
        Ok(template)
    }

    /// Active public templates, sorted by name.
    pub fn public(&self) -> Result<Arc<Vec<Template>>, ExportError> {
        if let Some(list) = self
            .public
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Ok(Arc::clone(list));
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let mut templates: Vec<Template> =
            records::list_records(&self.records_dir, keys::TEMPLATES_PREFIX)?;
        templates.retain(|t| t.is_active && t.is_public);
        templates.sort_by(|a, b| a.name.cmp(&b.name));

        let list = Arc::new(templates);
        let mut public = self.public.write().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::SeqCst) == generation {
            *public = Some(Arc::clone(&list));
            tracing::debug!(count = list.len(), "public template list cached");
        }
        Ok(list)
    }

    /// Drop one template (and the public list, which may contain it), or
    /// everything when `id` is `None`.
    pub fn invalidate(&self, id: Option<Uuid>) {
        match id {
            Some(id) => {
                {
                    let mut by_id = self.by_id.write().unwrap_or_else(PoisonError::into_inner);
                    self.generation.fetch_add(1, Ordering::SeqCst);
                    by_id.remove(&id);
                }
                *self.public.write().unwrap_or_else(PoisonError::into_inner) = None;
                tracing::info!(template_id = %id, "template cache invalidated");
            }
            None => self.invalidate_all(),
        }
    }

    pub fn invalidate_all(&self) {
        {
            let mut by_id = self.by_id.write().unwrap_or_else(PoisonError::into_inner);
            self.generation.fetch_add(1, Ordering::SeqCst);
            by_id.clear();
        }
        *self.public.write().unwrap_or_else(PoisonError::into_inner) = None;
        tracing::info!("template cache cleared");
    }
}
