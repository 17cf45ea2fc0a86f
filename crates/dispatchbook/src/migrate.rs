//! Upgrades stored collections from the legacy field layout.
//!
//! Older data stored the locality under `zone` and the list of parties under
//! `locations`, and had no `isFullLocality` flag. The upgrade works on raw
//! JSON values so the legacy names can be inspected before the typed load.
//!
//! Detection defaults to looking at the first element only and treating the
//! whole collection as legacy when it carries `zone`. Collections that mix
//! both shapes are therefore not upgraded correctly under that mode;
//! [`Detection::PerElement`] checks every element instead.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Legacy name of the `locality` field.
pub const LEGACY_LOCALITY_FIELD: &str = "zone";

/// Legacy name of the `parties` field.
pub const LEGACY_PARTIES_FIELD: &str = "locations";

/// How legacy-shaped collections are recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Detection {
    /// Inspect the first element and upgrade everything if it is legacy.
    #[default]
    FirstElement,
    /// Upgrade each element that carries a legacy field.
    PerElement,
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstElement => write!(f, "first-element"),
            Self::PerElement => write!(f, "per-element"),
        }
    }
}

/// Outcome of running the migrator over a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Migration {
    /// The collection in current shape.
    pub items: Vec<Value>,
    /// Whether anything was rewritten.
    pub migrated: bool,
}

impl Migration {
    fn unchanged(items: Vec<Value>) -> Self {
        Self {
            items,
            migrated: false,
        }
    }
}

/// Upgrade a collection of delivery records.
#[must_use]
pub fn migrate_records(items: Vec<Value>, detection: Detection) -> Migration {
    migrate_with(items, detection, is_legacy, upgrade_record)
}

/// Upgrade a collection of titular drivers.
#[must_use]
pub fn migrate_drivers(items: Vec<Value>, detection: Detection) -> Migration {
    migrate_with(items, detection, is_legacy, upgrade_driver)
}

/// Upgrade the records nested inside a collection of worksheets.
///
/// With first-element detection the probe is the first record of the first
/// worksheet; a first worksheet without records means nothing is upgraded.
#[must_use]
pub fn migrate_worksheets(items: Vec<Value>, detection: Detection) -> Migration {
    match detection {
        Detection::FirstElement => {
            let legacy = items
                .first()
                .and_then(|sheet| sheet.get("records"))
                .and_then(Value::as_array)
                .and_then(|records| records.first())
                .is_some_and(is_legacy);
            if !legacy {
                return Migration::unchanged(items);
            }
            let items = items
                .into_iter()
                .map(|sheet| map_sheet_records(sheet, upgrade_record))
                .collect();
            Migration {
                items,
                migrated: true,
            }
        }
        Detection::PerElement => {
            let mut migrated = false;
            let items = items
                .into_iter()
                .map(|sheet| {
                    map_sheet_records(sheet, |record| {
                        if is_legacy(&record) {
                            migrated = true;
                            upgrade_record(record)
                        } else {
                            record
                        }
                    })
                })
                .collect();
            Migration { items, migrated }
        }
    }
}

fn migrate_with(
    items: Vec<Value>,
    detection: Detection,
    probe: fn(&Value) -> bool,
    upgrade: fn(Value) -> Value,
) -> Migration {
    match detection {
        Detection::FirstElement => {
            if !items.first().is_some_and(probe) {
                return Migration::unchanged(items);
            }
            Migration {
                items: items.into_iter().map(upgrade).collect(),
                migrated: true,
            }
        }
        Detection::PerElement => {
            let mut migrated = false;
            let items = items
                .into_iter()
                .map(|item| {
                    if probe(&item) {
                        migrated = true;
                        upgrade(item)
                    } else {
                        item
                    }
                })
                .collect();
            Migration { items, migrated }
        }
    }
}

/// Whether a stored element carries the legacy locality field.
///
/// A present-but-null `zone` still counts.
#[must_use]
pub fn is_legacy(item: &Value) -> bool {
    item.get(LEGACY_LOCALITY_FIELD).is_some()
}

/// Rewrite one delivery record to the current field layout.
///
/// `isFullLocality` is forced to `false`: the legacy layout has no way to
/// express it. A null `zone` or `locations` is carried over as null and
/// loads as empty. Non-object values pass through untouched.
#[must_use]
pub fn upgrade_record(record: Value) -> Value {
    let Value::Object(mut fields) = record else {
        return record;
    };
    rename_field(&mut fields, LEGACY_LOCALITY_FIELD, "locality");
    rename_field(&mut fields, LEGACY_PARTIES_FIELD, "parties");
    fields.insert("isFullLocality".to_string(), Value::Bool(false));
    Value::Object(fields)
}

/// Rewrite one roster entry to the current field layout.
#[must_use]
pub fn upgrade_driver(driver: Value) -> Value {
    let Value::Object(mut fields) = driver else {
        return driver;
    };
    rename_field(&mut fields, LEGACY_LOCALITY_FIELD, "locality");
    Value::Object(fields)
}

/// Move `from` to `to`. When `from` is absent, `to` is dropped as well.
fn rename_field(fields: &mut Map<String, Value>, from: &str, to: &str) {
    match fields.remove(from) {
        Some(value) => {
            fields.insert(to.to_string(), value);
        }
        None => {
            fields.remove(to);
        }
    }
}

fn map_sheet_records(sheet: Value, f: impl FnMut(Value) -> Value) -> Value {
    let Value::Object(mut fields) = sheet else {
        return sheet;
    };
    if let Some(Value::Array(records)) = fields.get_mut("records") {
        let upgraded = std::mem::take(records).into_iter().map(f).collect();
        *records = upgraded;
    }
    Value::Object(fields)
}
