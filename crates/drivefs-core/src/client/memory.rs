//! In-process object graph.
//!
//! [`MemoryDrive`] keeps the whole object graph in memory and behaves like
//! the remote store as far as the rest of the crate can observe: ids are
//! opaque, sibling titles are not unique, children come back in insertion
//! order, and content is fetched through a download locator.
//!
//! It also keeps per-operation call counts and supports one-shot failure
//! injection, and it can be saved to and loaded from a JSON snapshot.

use super::{ObjectGraphClient, UpdateOptions, Upload};
use crate::error::{RemoteError, RemoteResult};
use crate::object::{RemoteObject, TypeFilter};
use chrono::Utc;
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_with::base64::Base64;
use serde_with::serde_as;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

/// Id of the root directory in a fresh drive.
const ROOT_ID: &str = "root";

/// Title of the root directory in a fresh drive.
const ROOT_TITLE: &str = "My Drive";

/// Prefix of download locators handed out by this drive.
const LOCATOR_PREFIX: &str = "mem://";

/// Client operations, for call accounting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriveOp {
    Root,
    Children,
    Get,
    Insert,
    Update,
    Delete,
    Download,
}

/// Snapshot of how many times each operation has been called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub root: u64,
    pub children: u64,
    pub get: u64,
    pub insert: u64,
    pub update: u64,
    pub delete: u64,
    pub download: u64,
}

impl CallCounts {
    /// Calls that changed the store.
    pub fn mutations(&self) -> u64 {
        self.insert + self.update + self.delete
    }
}

#[derive(Debug, Default)]
struct CallCounters {
    root: AtomicU64,
    children: AtomicU64,
    get: AtomicU64,
    insert: AtomicU64,
    update: AtomicU64,
    delete: AtomicU64,
    download: AtomicU64,
}

impl CallCounters {
    fn record(&self, op: DriveOp) {
        let counter = match op {
            DriveOp::Root => &self.root,
            DriveOp::Children => &self.children,
            DriveOp::Get => &self.get,
            DriveOp::Insert => &self.insert,
            DriveOp::Update => &self.update,
            DriveOp::Delete => &self.delete,
            DriveOp::Download => &self.download,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CallCounts {
        CallCounts {
            root: self.root.load(Ordering::Relaxed),
            children: self.children.load(Ordering::Relaxed),
            get: self.get.load(Ordering::Relaxed),
            insert: self.insert.load(Ordering::Relaxed),
            update: self.update.load(Ordering::Relaxed),
            delete: self.delete.load(Ordering::Relaxed),
            download: self.download.load(Ordering::Relaxed),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredObject {
    meta: RemoteObject,
    #[serde_as(as = "Option<Base64>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveState {
    root_id: String,
    owner: String,
    next_id: u64,
    objects: IndexMap<String, StoredObject>,
}

impl DriveState {
    fn new(owner: String) -> Self {
        let now = Utc::now();
        let root = RemoteObject {
            id: Some(ROOT_ID.to_string()),
            title: ROOT_TITLE.to_string(),
            mime_type: crate::object::FOLDER_MIME_TYPE.to_string(),
            created_time: Some(now),
            modified_time: Some(now),
            last_viewed_time: Some(now),
            owner_names: vec![owner.clone()],
            ..RemoteObject::default()
        };
        let mut objects = IndexMap::new();
        objects.insert(
            ROOT_ID.to_string(),
            StoredObject {
                meta: root,
                content: None,
            },
        );
        Self {
            root_id: ROOT_ID.to_string(),
            owner,
            next_id: 1,
            objects,
        }
    }

    fn allocate_id(&mut self) -> String {
        let id = format!("obj{:06}", self.next_id);
        self.next_id += 1;
        id
    }

    fn check_parents(&self, object: &RemoteObject) -> RemoteResult<()> {
        if object.parents.is_empty() {
            return Err(RemoteError::InvalidRequest(format!(
                "object '{}' has no parent",
                object.title
            )));
        }
        for parent in &object.parents {
            match self.objects.get(&parent.id) {
                Some(stored) if stored.meta.is_dir() => {}
                Some(_) => {
                    return Err(RemoteError::InvalidRequest(format!(
                        "parent {} is not a folder",
                        parent.id
                    )));
                }
                None => return Err(RemoteError::NotFound(parent.id.clone())),
            }
        }
        Ok(())
    }

    /// Remove `id` and every object left without an existing parent.
    fn remove_tree(&mut self, id: &str) -> usize {
        let mut removed = 0;
        let mut pending = vec![id.to_string()];
        while let Some(current) = pending.pop() {
            if self.objects.shift_remove(&current).is_none() {
                continue;
            }
            removed += 1;
            let orphans: Vec<String> = self
                .objects
                .iter()
                .filter(|(_, stored)| {
                    stored.meta.has_parent(&current)
                        && stored
                            .meta
                            .parents
                            .iter()
                            .all(|p| p.id == current || !self.objects.contains_key(&p.id))
                })
                .map(|(id, _)| id.clone())
                .collect();
            pending.extend(orphans);
        }
        removed
    }
}

fn locator_for(id: &str) -> String {
    format!("{LOCATOR_PREFIX}{id}")
}

fn apply_upload(stored: &mut StoredObject, id: &str, upload: Upload<'_>) {
    stored.content = Some(upload.data.to_vec());
    stored.meta.file_size = Some(upload.data.len() as u64);
    stored.meta.mime_type = upload.mime_type.to_string();
    stored.meta.download_url = Some(locator_for(id));
}

/// Object graph held in process memory.
///
/// Thread-safe: the graph sits behind a `RwLock`, counters are atomics.
#[derive(Debug)]
pub struct MemoryDrive {
    state: RwLock<DriveState>,
    counters: CallCounters,
    failures: Mutex<HashMap<DriveOp, RemoteError>>,
}

impl Default for MemoryDrive {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDrive {
    /// An empty drive containing only the root directory, owned by "me".
    pub fn new() -> Self {
        Self::with_owner("me")
    }

    /// An empty drive whose objects list `owner` as their owner.
    pub fn with_owner(owner: impl Into<String>) -> Self {
        Self::from_state(DriveState::new(owner.into()))
    }

    fn from_state(state: DriveState) -> Self {
        Self {
            state: RwLock::new(state),
            counters: CallCounters::default(),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Load a drive from a JSON snapshot written by [`MemoryDrive::save`].
    pub fn load(path: &Path) -> io::Result<Self> {
        let data = fs::read(path)?;
        let state: DriveState = serde_json::from_slice(&data)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if !state.objects.contains_key(&state.root_id) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "snapshot has no root object",
            ));
        }
        debug!(path = %path.display(), objects = state.objects.len(), "loaded drive snapshot");
        Ok(Self::from_state(state))
    }

    /// Load a snapshot if `path` exists, otherwise start an empty drive.
    pub fn load_or_new(path: &Path) -> io::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    /// Write a JSON snapshot of the whole graph, replacing `path` atomically.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json = {
            let state = self.state.read();
            serde_json::to_vec_pretty(&*state)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
        };
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        tmp.persist(path).map_err(|e| e.error)?;
        debug!(path = %path.display(), "saved drive snapshot");
        Ok(())
    }

    /// Make the next call of `op` fail with `error`.
    pub fn fail_next(&self, op: DriveOp, error: RemoteError) {
        self.failures.lock().insert(op, error);
    }

    /// Call counts so far.
    pub fn calls(&self) -> CallCounts {
        self.counters.snapshot()
    }

    /// Number of stored objects, root included.
    pub fn object_count(&self) -> usize {
        self.state.read().objects.len()
    }

    /// Stored content of `id`, bypassing the download path and call counts.
    pub fn content_of(&self, id: &str) -> Option<Vec<u8>> {
        self.state
            .read()
            .objects
            .get(id)
            .and_then(|stored| stored.content.clone())
    }

    fn enter(&self, op: DriveOp) -> RemoteResult<()> {
        self.counters.record(op);
        match self.failures.lock().remove(&op) {
            Some(err) => {
                debug!(?op, error = %err, "injected failure");
                Err(err)
            }
            None => Ok(()),
        }
    }
}

impl ObjectGraphClient for MemoryDrive {
    fn root(&self) -> RemoteResult<RemoteObject> {
        self.enter(DriveOp::Root)?;
        let state = self.state.read();
        state
            .objects
            .get(&state.root_id)
            .map(|stored| stored.meta.clone())
            .ok_or_else(|| RemoteError::NotFound(state.root_id.clone()))
    }

    fn children(&self, parent_id: &str, filter: TypeFilter) -> RemoteResult<Vec<RemoteObject>> {
        self.enter(DriveOp::Children)?;
        trace!(query = %filter.to_query(parent_id), "list children");
        let state = self.state.read();
        if !state.objects.contains_key(parent_id) {
            return Err(RemoteError::NotFound(parent_id.to_string()));
        }
        Ok(state
            .objects
            .values()
            .filter(|stored| stored.meta.has_parent(parent_id) && filter.matches(&stored.meta))
            .map(|stored| stored.meta.clone())
            .collect())
    }

    fn get(&self, id: &str) -> RemoteResult<RemoteObject> {
        self.enter(DriveOp::Get)?;
        self.state
            .read()
            .objects
            .get(id)
            .map(|stored| stored.meta.clone())
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))
    }

    fn insert(
        &self,
        object: &RemoteObject,
        upload: Option<Upload<'_>>,
    ) -> RemoteResult<RemoteObject> {
        self.enter(DriveOp::Insert)?;
        let mut state = self.state.write();
        state.check_parents(object)?;

        if object.is_dir() && upload.is_some() {
            return Err(RemoteError::InvalidRequest(
                "folders cannot carry content".to_string(),
            ));
        }

        let id = state.allocate_id();
        let now = Utc::now();
        let mut meta = RemoteObject {
            id: Some(id.clone()),
            title: object.title.clone(),
            mime_type: object.mime_type.clone(),
            parents: object.parents.clone(),
            created_time: Some(now),
            modified_time: Some(now),
            last_viewed_time: Some(now),
            owner_names: vec![state.owner.clone()],
            ..RemoteObject::default()
        };
        if meta.is_file() {
            meta.file_size = Some(0);
        }

        let mut stored = StoredObject {
            meta,
            content: None,
        };
        if let Some(upload) = upload {
            apply_upload(&mut stored, &id, upload);
        }
        let result = stored.meta.clone();
        state.objects.insert(id, stored);
        debug!(id = ?result.id, title = %result.title, "inserted object");
        Ok(result)
    }

    fn update(
        &self,
        id: &str,
        object: &RemoteObject,
        options: UpdateOptions<'_>,
    ) -> RemoteResult<RemoteObject> {
        self.enter(DriveOp::Update)?;
        let mut state = self.state.write();
        state.check_parents(object)?;

        let now = Utc::now();
        let stored = state
            .objects
            .get_mut(id)
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))?;
        if stored.meta.is_dir() && options.upload.is_some() {
            return Err(RemoteError::InvalidRequest(
                "folders cannot carry content".to_string(),
            ));
        }

        stored.meta.title.clone_from(&object.title);
        stored.meta.parents.clone_from(&object.parents);
        if !object.mime_type.is_empty() && !stored.meta.is_dir() {
            stored.meta.mime_type.clone_from(&object.mime_type);
        }
        stored.meta.modified_time = if options.set_modified_date {
            object.modified_time.or(Some(now))
        } else {
            Some(now)
        };
        if options.update_viewed_date {
            stored.meta.last_viewed_time = Some(now);
        }
        if let Some(upload) = options.upload {
            apply_upload(stored, id, upload);
        }
        debug!(%id, title = %stored.meta.title, "updated object");
        Ok(stored.meta.clone())
    }

    fn delete(&self, id: &str) -> RemoteResult<()> {
        self.enter(DriveOp::Delete)?;
        let mut state = self.state.write();
        if id == state.root_id {
            return Err(RemoteError::PermissionDenied(
                "the root folder cannot be deleted".to_string(),
            ));
        }
        if state.remove_tree(id) == 0 {
            return Err(RemoteError::NotFound(id.to_string()));
        }
        debug!(%id, "deleted object");
        Ok(())
    }

    fn download(&self, locator: &str) -> RemoteResult<Vec<u8>> {
        self.enter(DriveOp::Download)?;
        let id = locator
            .strip_prefix(LOCATOR_PREFIX)
            .ok_or_else(|| RemoteError::InvalidRequest(format!("unknown locator {locator}")))?;
        let state = self.state.read();
        let stored = state
            .objects
            .get(id)
            .ok_or_else(|| RemoteError::NotFound(locator.to_string()))?;
        Ok(stored.content.clone().unwrap_or_default())
    }
}
