use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt;
use tracing::{debug, warn};

use super::{BucketStore, StorageLayout};
use crate::error::Result;
use crate::utils::constants::{TAXI_FILE_TYPE, WEATHER_FILE_TYPE};
use crate::utils::filename::{date_from_raw_file_name, file_name_from_key};

/// Raw file families produced by the extraction run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Taxi,
    Weather,
}

impl FileKind {
    pub const ALL: [FileKind; 2] = [FileKind::Taxi, FileKind::Weather];

    pub fn file_type(&self) -> &'static str {
        match self {
            FileKind::Taxi => TAXI_FILE_TYPE,
            FileKind::Weather => WEATHER_FILE_TYPE,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_type())
    }
}

/// One raw file waiting to be transformed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub key: String,
    pub file_name: String,
    pub kind: FileKind,
    /// Date embedded in the file name, when it follows the naming convention
    pub date: Option<NaiveDate>,
}

/// Result of scanning for work: items to process plus keys that were ignored
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingWork {
    pub items: Vec<WorkItem>,
    pub skipped: Vec<String>,
}

/// Source of transform work. An item stays pending until `complete` archives it,
/// so a failed run leaves it in place for the next one.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    async fn pending(&self, kind: FileKind) -> Result<PendingWork>;
    async fn read(&self, item: &WorkItem) -> Result<bytes::Bytes>;
    /// Archive the item; returns the key it was archived under
    async fn complete(&self, item: &WorkItem) -> Result<String>;
}

/// Work queue over the incoming prefixes of a bucket
pub struct PrefixWorkQueue<'a> {
    store: &'a dyn BucketStore,
    layout: &'a StorageLayout,
}

impl<'a> PrefixWorkQueue<'a> {
    pub fn new(store: &'a dyn BucketStore, layout: &'a StorageLayout) -> Self {
        Self { store, layout }
    }

    fn classify(&self, kind: FileKind, key: &str) -> ListedKey {
        let file_name = file_name_from_key(key).trim();
        if file_name.is_empty() {
            return ListedKey::FolderMarker;
        }
        if !file_name.ends_with(".json") {
            return ListedKey::Unsupported;
        }

        ListedKey::Raw(WorkItem {
            key: key.to_string(),
            file_name: file_name.to_string(),
            kind,
            date: date_from_raw_file_name(file_name),
        })
    }
}

enum ListedKey {
    Raw(WorkItem),
    FolderMarker,
    Unsupported,
}

#[async_trait]
impl<'a> WorkQueue for PrefixWorkQueue<'a> {
    async fn pending(&self, kind: FileKind) -> Result<PendingWork> {
        let prefix = self.layout.incoming_prefix(kind);
        let keys = self.store.list_objects(prefix).await?;

        let mut pending = PendingWork::default();
        for key in keys {
            match self.classify(kind, &key) {
                ListedKey::Raw(item) => pending.items.push(item),
                ListedKey::FolderMarker => debug!(key = %key, "ignoring folder marker"),
                ListedKey::Unsupported => {
                    warn!(key = %key, "skipping non-JSON object in incoming prefix");
                    pending.skipped.push(key);
                }
            }
        }

        Ok(pending)
    }

    async fn read(&self, item: &WorkItem) -> Result<bytes::Bytes> {
        Ok(self.store.get_object(&item.key).await?)
    }

    async fn complete(&self, item: &WorkItem) -> Result<String> {
        let archived = self.layout.processed_key(item.kind, &item.file_name);
        self.store.copy_object(&item.key, &archived).await?;
        self.store.delete_object(&item.key).await?;
        debug!(from = %item.key, to = %archived, "archived raw file");
        Ok(archived)
    }
}
