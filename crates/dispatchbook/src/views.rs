//! Values derived from the persisted collections.
//!
//! Nothing here is stored; everything is recomputed from its sources.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::model::{DeliveryRecord, TitularDriver, Worksheet};

/// Selector string that denotes the worksheet being filled in.
pub const CURRENT_SELECTOR: &str = "current";

/// Mapping from driver name to default locality.
pub type DriverLocalityMap = BTreeMap<String, String>;

/// Which record set is on display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorksheetSelection {
    /// The live, editable records.
    #[default]
    Current,
    /// An archived worksheet, by id. The id may not exist.
    Viewing(String),
}

impl WorksheetSelection {
    /// Whether the selection is the live record set.
    #[must_use]
    pub fn is_current(&self) -> bool {
        matches!(self, Self::Current)
    }
}

impl FromStr for WorksheetSelection {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == CURRENT_SELECTOR {
            Self::Current
        } else {
            Self::Viewing(s.to_string())
        })
    }
}

impl fmt::Display for WorksheetSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => f.write_str(CURRENT_SELECTOR),
            Self::Viewing(id) => f.write_str(id),
        }
    }
}

/// Fold the roster into a name to locality map.
///
/// When two entries share a name, the later one wins.
#[must_use]
pub fn driver_locality_map(drivers: &[TitularDriver]) -> DriverLocalityMap {
    drivers.iter().fold(BTreeMap::new(), |mut map, driver| {
        map.insert(driver.name.clone(), driver.locality.clone());
        map
    })
}

/// The records for the given selection.
///
/// An unknown worksheet id yields an empty slice.
#[must_use]
pub fn display_records<'a>(
    selection: &WorksheetSelection,
    current: &'a [DeliveryRecord],
    worksheets: &'a [Worksheet],
) -> &'a [DeliveryRecord] {
    match selection {
        WorksheetSelection::Current => current,
        WorksheetSelection::Viewing(id) => worksheets
            .iter()
            .find(|sheet| &sheet.id == id)
            .map(|sheet| sheet.records.as_slice())
            .unwrap_or(&[]),
    }
}

/// Whether the given selection may not be edited.
#[must_use]
pub fn is_read_only(selection: &WorksheetSelection) -> bool {
    !selection.is_current()
}

/// Running totals over a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Number of records.
    pub records: usize,
    /// Packages registered in the dispatch system.
    pub system_packages: u64,
    /// Packages carried outside the dispatch system.
    pub off_system_packages: u64,
    /// Records driven by a substitute.
    pub substitutes: usize,
    /// Records flagged as complicated.
    pub complicated: usize,
    /// Records covering a whole locality.
    pub full_localities: usize,
}

impl Summary {
    /// Accumulate totals over `records`.
    #[must_use]
    pub fn of(records: &[DeliveryRecord]) -> Self {
        records.iter().fold(Self::default(), |mut acc, record| {
            acc.records += 1;
            acc.system_packages += u64::from(record.system_packages);
            acc.off_system_packages += u64::from(record.off_system_packages);
            acc.substitutes += usize::from(record.is_substitute);
            acc.complicated += usize::from(record.is_complicated);
            acc.full_localities += usize::from(record.is_full_locality);
            acc
        })
    }

    /// All packages, inside and outside the system.
    #[must_use]
    pub fn total_packages(&self) -> u64 {
        self.system_packages + self.off_system_packages
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Registros:             {}", self.records)?;
        writeln!(f, "En sistema:            {}", self.system_packages)?;
        writeln!(f, "Fuera de sistema:      {}", self.off_system_packages)?;
        writeln!(f, "Total paquetes:        {}", self.total_packages())?;
        writeln!(f, "Suplentes:             {}", self.substitutes)?;
        writeln!(f, "Complicados:           {}", self.complicated)?;
        write!(f, "Localidades completas: {}", self.full_localities)
    }
}

/// Suggested file name for an image export of the sheet shown on `date`.
///
/// Day and month are not zero padded, matching how the short Spanish date
/// renders.
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("planilla-{}-{}-{}.jpg", date.day(), date.month(), date.year())
}
