//! Persistence and file-storage contracts, plus in-memory implementations.
//!
//! Stores own id assignment, version acceptance and submission timestamps.
//! The model computes what it wants saved; the store decides whether to
//! accept it.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::answers::{NewResponse, Response};
use crate::error::StoreError;
use crate::ids::{FileRef, FormId, ResponseId};
use crate::spec::{FIRST_VERSION, FormSpec, FormSummary};

/// Form persistence.
pub trait FormStore {
    /// Persists a new form; the result carries its id and version 1.
    fn create(&self, form: &FormSpec) -> Result<FormSpec, StoreError>;

    /// Replaces a stored form if it is still at `expected_version`. The
    /// result carries `expected_version + 1`; a stale version is rejected
    /// with [`StoreError::VersionConflict`] and nothing is written.
    fn update(
        &self,
        id: &FormId,
        form: &FormSpec,
        expected_version: u32,
    ) -> Result<FormSpec, StoreError>;

    fn get(&self, id: &FormId) -> Result<FormSpec, StoreError>;

    fn list(&self) -> Result<Vec<FormSummary>, StoreError>;

    fn delete(&self, id: &FormId) -> Result<(), StoreError>;
}

/// Response persistence. Responses are written once and never modified.
pub trait ResponseStore {
    fn create(&self, response: NewResponse) -> Result<Response, StoreError>;

    /// Responses to `form_id`, newest first.
    fn list(&self, form_id: &FormId) -> Result<Vec<Response>, StoreError>;
}

/// Metadata recorded alongside uploaded bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Storage for uploaded answer files.
pub trait FileStore {
    fn store(&self, bytes: &[u8], metadata: &FileMetadata) -> Result<FileRef, StoreError>;

    /// Download URL for `reference`, when one can be produced.
    fn resolve_url(&self, reference: &FileRef) -> Option<String>;
}

/// File store that resolves nothing. Used when rendering without storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFiles;

impl FileStore for NoFiles {
    fn store(&self, _bytes: &[u8], _metadata: &FileMetadata) -> Result<FileRef, StoreError> {
        Err(StoreError::Transport("no file storage configured".into()))
    }

    fn resolve_url(&self, _reference: &FileRef) -> Option<String> {
        None
    }
}

fn poisoned<T>(_: PoisonError<T>) -> StoreError {
    StoreError::Transport("store lock poisoned".into())
}

/// In-memory [`FormStore`] with sequential ids.
#[derive(Debug, Default)]
pub struct MemoryFormStore {
    forms: RwLock<BTreeMap<FormId, FormSpec>>,
    next_id: AtomicU64,
}

impl MemoryFormStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> FormId {
        let next = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        FormId::new(next.to_string())
    }
}

impl FormStore for MemoryFormStore {
    fn create(&self, form: &FormSpec) -> Result<FormSpec, StoreError> {
        let mut forms = self.forms.write().map_err(poisoned)?;
        let mut id = self.allocate_id();
        while forms.contains_key(&id) {
            id = self.allocate_id();
        }
        let stored = FormSpec {
            id: Some(id.clone()),
            version: FIRST_VERSION,
            ..form.clone()
        };
        forms.insert(id, stored.clone());
        Ok(stored)
    }

    fn update(
        &self,
        id: &FormId,
        form: &FormSpec,
        expected_version: u32,
    ) -> Result<FormSpec, StoreError> {
        let mut forms = self.forms.write().map_err(poisoned)?;
        let current = forms
            .get(id)
            .ok_or_else(|| StoreError::form_not_found(id))?;
        if current.version != expected_version {
            return Err(StoreError::VersionConflict {
                id: id.clone(),
                expected: expected_version,
                actual: current.version,
            });
        }
        let version = current
            .version
            .checked_add(1)
            .ok_or_else(|| StoreError::VersionExhausted {
                id: id.clone(),
                version: current.version,
            })?;
        let stored = FormSpec {
            id: Some(id.clone()),
            version,
            created_by: current.created_by.clone(),
            created_at: current.created_at,
            ..form.clone()
        };
        forms.insert(id.clone(), stored.clone());
        Ok(stored)
    }

    fn get(&self, id: &FormId) -> Result<FormSpec, StoreError> {
        let forms = self.forms.read().map_err(poisoned)?;
        forms
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::form_not_found(id))
    }

    fn list(&self) -> Result<Vec<FormSummary>, StoreError> {
        let forms = self.forms.read().map_err(poisoned)?;
        Ok(forms.values().filter_map(FormSpec::summary).collect())
    }

    fn delete(&self, id: &FormId) -> Result<(), StoreError> {
        let mut forms = self.forms.write().map_err(poisoned)?;
        forms
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::form_not_found(id))
    }
}

/// In-memory [`ResponseStore`].
#[derive(Debug, Default)]
pub struct MemoryResponseStore {
    responses: RwLock<Vec<Response>>,
    next_id: AtomicU64,
}

impl MemoryResponseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResponseStore for MemoryResponseStore {
    fn create(&self, response: NewResponse) -> Result<Response, StoreError> {
        let mut responses = self.responses.write().map_err(poisoned)?;
        let next = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let stored = Response {
            id: ResponseId::new(next.to_string()),
            form_id: response.form_id,
            respondent: response.respondent,
            submitted_at: response.submitted_at,
            answers: response.answers,
            attachments: response.attachments,
        };
        responses.push(stored.clone());
        Ok(stored)
    }

    fn list(&self, form_id: &FormId) -> Result<Vec<Response>, StoreError> {
        let responses = self.responses.read().map_err(poisoned)?;
        let mut matching: Vec<Response> = responses
            .iter()
            .filter(|response| response.form_id == *form_id)
            .cloned()
            .collect();
        // Newest first; ties go to the later insert.
        matching.sort_by_key(|response| response.submitted_at);
        matching.reverse();
        Ok(matching)
    }
}

#[derive(Debug, Clone)]
struct StoredFile {
    bytes: Vec<u8>,
    metadata: FileMetadata,
}

/// In-memory [`FileStore`]. URLs are `<base_url>/<reference>` when a base
/// URL is configured.
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    files: RwLock<BTreeMap<FileRef, StoredFile>>,
    base_url: Option<String>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            files: RwLock::default(),
            base_url: Some(base_url.into().trim_end_matches('/').to_string()),
        }
    }

    /// Stored bytes and metadata for `reference`.
    pub fn fetch(&self, reference: &FileRef) -> Result<(Vec<u8>, FileMetadata), StoreError> {
        let files = self.files.read().map_err(poisoned)?;
        files
            .get(reference)
            .map(|file| (file.bytes.clone(), file.metadata.clone()))
            .ok_or_else(|| StoreError::NotFound {
                kind: "file",
                id: reference.to_string(),
            })
    }
}

impl FileStore for MemoryFileStore {
    fn store(&self, bytes: &[u8], metadata: &FileMetadata) -> Result<FileRef, StoreError> {
        let mut files = self.files.write().map_err(poisoned)?;
        let reference = FileRef::generate();
        files.insert(
            reference.clone(),
            StoredFile {
                bytes: bytes.to_vec(),
                metadata: metadata.clone(),
            },
        );
        Ok(reference)
    }

    fn resolve_url(&self, reference: &FileRef) -> Option<String> {
        let base = self.base_url.as_deref()?;
        let files = self.files.read().ok()?;
        files
            .contains_key(reference)
            .then(|| format!("{}/{}", base, reference))
    }
}
