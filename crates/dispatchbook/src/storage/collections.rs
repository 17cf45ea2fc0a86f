//! The three persisted collections and their load/save paths.

use std::fmt;

use serde::de::{DeserializeOwned, Error as _};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::migrate::{self, Detection, Migration};

use super::KeyValueStore;

/// One of the named collections kept in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Records of the worksheet being filled in.
    CurrentRecords,
    /// Archived worksheets, most recent first.
    Worksheets,
    /// The driver roster.
    TitularDrivers,
}

impl Collection {
    /// All collections, in load order.
    pub const ALL: [Self; 3] = [Self::CurrentRecords, Self::Worksheets, Self::TitularDrivers];

    /// The storage key for this collection.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::CurrentRecords => "currentRecords",
            Self::Worksheets => "worksheets",
            Self::TitularDrivers => "titularDrivers",
        }
    }

    fn migrate(self, items: Vec<Value>, detection: Detection) -> Migration {
        match self {
            Self::CurrentRecords => migrate::migrate_records(items, detection),
            Self::Worksheets => migrate::migrate_worksheets(items, detection),
            Self::TitularDrivers => migrate::migrate_drivers(items, detection),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A collection read back from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    /// The items, in current shape.
    pub items: Vec<T>,
    /// Whether the stored blob was in the legacy shape and needs writing back.
    pub migrated: bool,
}

/// Read a collection, upgrading it from the legacy shape if needed.
///
/// Returns `None` when nothing has been stored under the key yet. Writing an
/// upgraded collection back is left to the caller.
///
/// # Errors
///
/// Returns [`Error::Storage`] if the medium cannot be read, and
/// [`Error::Parse`] if the blob is not a JSON array of the expected items.
pub fn load_collection<T, S>(
    store: &S,
    collection: Collection,
    detection: Detection,
) -> Result<Option<Loaded<T>>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let key = collection.key();
    let Some(raw) = store.get(key)? else {
        debug!("No stored data under {}", key);
        return Ok(None);
    };

    let value: Value = serde_json::from_str(&raw).map_err(|e| Error::parse(key, e))?;
    let Value::Array(items) = value else {
        return Err(Error::parse(
            key,
            serde_json::Error::custom("expected a JSON array"),
        ));
    };

    let Migration { items, migrated } = collection.migrate(items, detection);
    if migrated {
        info!("Upgraded legacy data under {}", key);
    }

    let items: Vec<T> =
        serde_json::from_value(Value::Array(items)).map_err(|e| Error::parse(key, e))?;
    debug!("Loaded {} items from {}", items.len(), key);

    Ok(Some(Loaded { items, migrated }))
}

/// Serialize a collection and write it under its key.
///
/// # Errors
///
/// Returns [`Error::Storage`] if the medium rejects the write.
pub fn save_collection<T, S>(store: &S, collection: Collection, items: &[T]) -> Result<()>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let blob = serde_json::to_string(items)?;
    store.set(collection.key(), &blob)
}
