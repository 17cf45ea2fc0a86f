//! Core record types for dispatchbook.
//!
//! These are the shapes persisted under the three collection keys. Field
//! names are camelCase on the wire. Missing fields deserialize to their
//! defaults, since stored data was never validated field by field. Text and
//! list fields stored as `null` also load as empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Mint a new collision-resistant identifier.
#[must_use]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A single delivery entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryRecord {
    /// Unique identifier within the containing collection.
    pub id: String,
    /// Name of the driver, matched by name against the roster.
    #[serde(deserialize_with = "null_as_default")]
    pub driver_name: String,
    /// Delivery zone.
    #[serde(deserialize_with = "null_as_default")]
    pub locality: String,
    /// Whether the whole locality was covered.
    pub is_full_locality: bool,
    /// Whether the driver was covering for someone else.
    pub is_substitute: bool,
    /// Destinations or stops within this delivery.
    #[serde(deserialize_with = "null_as_default")]
    pub parties: Vec<String>,
    /// Packages registered in the dispatch system.
    pub system_packages: u32,
    /// Packages carried outside the dispatch system.
    pub off_system_packages: u32,
    /// Whether the delivery had complications.
    pub is_complicated: bool,
    /// Free-text notes.
    #[serde(deserialize_with = "null_as_default")]
    pub observations: String,
}

impl DeliveryRecord {
    /// Build a record from a draft with the given id.
    #[must_use]
    pub fn from_draft(id: String, draft: DeliveryDraft) -> Self {
        Self {
            id,
            driver_name: draft.driver_name,
            locality: draft.locality,
            is_full_locality: draft.is_full_locality,
            is_substitute: draft.is_substitute,
            parties: draft.parties,
            system_packages: draft.system_packages,
            off_system_packages: draft.off_system_packages,
            is_complicated: draft.is_complicated,
            observations: draft.observations,
        }
    }

    /// The editable part of this record.
    #[must_use]
    pub fn to_draft(&self) -> DeliveryDraft {
        DeliveryDraft {
            driver_name: self.driver_name.clone(),
            locality: self.locality.clone(),
            is_full_locality: self.is_full_locality,
            is_substitute: self.is_substitute,
            parties: self.parties.clone(),
            system_packages: self.system_packages,
            off_system_packages: self.off_system_packages,
            is_complicated: self.is_complicated,
            observations: self.observations.clone(),
        }
    }

    /// Total packages carried, inside and outside the system.
    #[must_use]
    pub fn total_packages(&self) -> u64 {
        u64::from(self.system_packages) + u64::from(self.off_system_packages)
    }
}

/// Record data as submitted from a form, without an id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryDraft {
    /// Name of the driver.
    #[serde(deserialize_with = "null_as_default")]
    pub driver_name: String,
    /// Delivery zone.
    #[serde(deserialize_with = "null_as_default")]
    pub locality: String,
    /// Whether the whole locality was covered.
    pub is_full_locality: bool,
    /// Whether the driver was covering for someone else.
    pub is_substitute: bool,
    /// Destinations or stops.
    #[serde(deserialize_with = "null_as_default")]
    pub parties: Vec<String>,
    /// Packages registered in the dispatch system.
    pub system_packages: u32,
    /// Packages carried outside the dispatch system.
    pub off_system_packages: u32,
    /// Whether the delivery had complications.
    pub is_complicated: bool,
    /// Free-text notes.
    #[serde(deserialize_with = "null_as_default")]
    pub observations: String,
}

/// An archived, read-only snapshot of delivery records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worksheet {
    /// Unique identifier, minted at archive time.
    pub id: String,
    /// When the records were archived.
    pub date: DateTime<Utc>,
    /// The archived records, in their original order.
    pub records: Vec<DeliveryRecord>,
}

impl Worksheet {
    /// Snapshot the given records into a new worksheet dated now.
    #[must_use]
    pub fn archive(records: Vec<DeliveryRecord>) -> Self {
        Self {
            id: new_id(),
            date: Utc::now(),
            records,
        }
    }
}

/// A regular driver with a default locality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitularDriver {
    /// Unique identifier.
    pub id: String,
    /// Driver name, the join key against [`DeliveryRecord::driver_name`].
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Default locality for this driver.
    #[serde(deserialize_with = "null_as_default")]
    pub locality: String,
}

/// Roster entry data without an id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverDraft {
    /// Driver name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Default locality.
    #[serde(deserialize_with = "null_as_default")]
    pub locality: String,
}

impl TitularDriver {
    /// Build a roster entry from a draft with the given id.
    #[must_use]
    pub fn from_draft(id: String, draft: DriverDraft) -> Self {
        Self {
            id,
            name: draft.name,
            locality: draft.locality,
        }
    }

    /// The entry's data without its id.
    #[must_use]
    pub fn to_draft(&self) -> DriverDraft {
        DriverDraft {
            name: self.name.clone(),
            locality: self.locality.clone(),
        }
    }
}
