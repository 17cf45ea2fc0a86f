//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::model::{DeliveryDraft, DriverDraft};
use crate::views::WorksheetSelection;

/// Delivery record commands. They always act on the current worksheet.
#[derive(Debug, Subcommand)]
pub enum RecordCommand {
    /// Add a record to the current worksheet
    Add(AddRecord),

    /// Change fields of a current record
    Update {
        /// Record id
        id: String,

        /// Driver name
        #[arg(short, long)]
        driver: Option<String>,

        /// Fields to change
        #[command(flatten)]
        fields: RecordFields,
    },

    /// Delete a current record
    Delete {
        /// Record id
        id: String,
    },
}

/// Arguments for `record add`.
#[derive(Debug, Args)]
pub struct AddRecord {
    /// Driver name
    #[arg(short, long)]
    pub driver: String,

    /// Record fields
    #[command(flatten)]
    pub fields: RecordFields,
}

impl AddRecord {
    /// Build a draft, with unset fields at their defaults.
    #[must_use]
    pub fn to_draft(&self) -> DeliveryDraft {
        let mut draft = DeliveryDraft {
            driver_name: self.driver.clone(),
            ..DeliveryDraft::default()
        };
        self.fields.apply(&mut draft);
        draft
    }
}

/// Record fields shared by `add` and `update`. Unset fields are left alone.
#[derive(Debug, Default, Args)]
pub struct RecordFields {
    /// Locality served (defaults to the driver's roster locality)
    #[arg(short, long)]
    pub locality: Option<String>,

    /// The whole locality was covered
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub full_locality: Option<bool>,

    /// The driver was a substitute
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub substitute: Option<bool>,

    /// Party served (repeat for several; replaces the stored list)
    #[arg(short, long = "party", value_name = "PARTY")]
    pub parties: Vec<String>,

    /// Packages registered in the system
    #[arg(long, value_name = "N")]
    pub system: Option<u32>,

    /// Packages carried outside the system
    #[arg(long, value_name = "N")]
    pub off_system: Option<u32>,

    /// The delivery was complicated
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub complicated: Option<bool>,

    /// Free-text notes
    #[arg(short, long)]
    pub observations: Option<String>,
}

impl RecordFields {
    /// Overwrite the fields of `draft` that were given on the command line.
    pub fn apply(&self, draft: &mut DeliveryDraft) {
        if let Some(locality) = &self.locality {
            draft.locality.clone_from(locality);
        }
        if let Some(full) = self.full_locality {
            draft.is_full_locality = full;
        }
        if let Some(substitute) = self.substitute {
            draft.is_substitute = substitute;
        }
        if !self.parties.is_empty() {
            draft.parties.clone_from(&self.parties);
        }
        if let Some(system) = self.system {
            draft.system_packages = system;
        }
        if let Some(off) = self.off_system {
            draft.off_system_packages = off;
        }
        if let Some(complicated) = self.complicated {
            draft.is_complicated = complicated;
        }
        if let Some(observations) = &self.observations {
            draft.observations.clone_from(observations);
        }
    }
}

/// Driver roster commands.
#[derive(Debug, Subcommand)]
pub enum DriverCommand {
    /// Add a titular driver
    Add {
        /// Driver name
        #[arg(short, long)]
        name: String,

        /// Default locality
        #[arg(short, long)]
        locality: String,
    },

    /// Change a titular driver
    Update {
        /// Driver id
        id: String,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        /// New default locality
        #[arg(short, long)]
        locality: Option<String>,
    },

    /// Remove a titular driver
    Delete {
        /// Driver id
        id: String,
    },

    /// List the roster
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

impl DriverCommand {
    /// Merge an update into an existing entry.
    #[must_use]
    pub fn merge(existing: DriverDraft, name: Option<String>, locality: Option<String>) -> DriverDraft {
        DriverDraft {
            name: name.unwrap_or(existing.name),
            locality: locality.unwrap_or(existing.locality),
        }
    }
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Worksheet id, or `current`
    #[arg(short, long, default_value = "current", value_name = "ID")]
    pub worksheet: WorksheetSelection,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// History command arguments.
#[derive(Debug, Args)]
pub struct HistoryCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
