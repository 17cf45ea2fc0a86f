//! Application state and the operations that mutate it.
//!
//! [`Dispatcher`] owns the three collections, the worksheet selection and
//! the record being edited. Every mutation is applied in memory first and
//! then written to the store before the method returns. Load and save
//! failures never propagate: they are logged, reported through the
//! [`Notifier`], and the in-memory state carries on.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::migrate::Detection;
use crate::model::{new_id, DeliveryDraft, DeliveryRecord, DriverDraft, TitularDriver, Worksheet};
use crate::notify::{Notifier, Severity};
use crate::storage::{load_collection, save_collection, Collection, KeyValueStore, Loaded};
use crate::views::{self, DriverLocalityMap, Summary, WorksheetSelection};

/// Notification texts.
pub mod messages {
    /// Legacy records are being upgraded.
    pub const MIGRATING: &str = "Actualizando formato de datos...";
    /// A stored collection could not be loaded.
    pub const LOAD_FAILED: &str = "No se pudieron cargar los datos guardados.";
    /// Writing the current records failed.
    pub const SAVE_RECORDS_FAILED: &str = "Error al guardar la planilla actual.";
    /// Writing the worksheet history failed.
    pub const SAVE_WORKSHEETS_FAILED: &str = "Error al guardar el historial de planillas.";
    /// Writing the roster failed.
    pub const SAVE_DRIVERS_FAILED: &str = "Error al guardar los conductores.";
    /// A record was updated.
    pub const RECORD_UPDATED: &str = "Registro actualizado con éxito.";
    /// A record was created.
    pub const RECORD_CREATED: &str = "Registro guardado con éxito.";
    /// A record was deleted.
    pub const RECORD_DELETED: &str = "Registro eliminado.";
    /// Archive was requested with no records.
    pub const ARCHIVE_EMPTY: &str = "No hay registros en la planilla actual para archivar.";
    /// The current records were archived.
    pub const ARCHIVED: &str = "Planilla archivada con éxito.";
    /// A roster entry was updated.
    pub const DRIVER_UPDATED: &str = "Conductor actualizado.";
    /// A roster entry was created.
    pub const DRIVER_CREATED: &str = "Conductor titular guardado.";
    /// A roster entry was deleted.
    pub const DRIVER_DELETED: &str = "Conductor eliminado.";
}

fn save_failed_message(collection: Collection) -> &'static str {
    match collection {
        Collection::CurrentRecords => messages::SAVE_RECORDS_FAILED,
        Collection::Worksheets => messages::SAVE_WORKSHEETS_FAILED,
        Collection::TitularDrivers => messages::SAVE_DRIVERS_FAILED,
    }
}

/// The delivery book: collections, selection, and edit state.
#[derive(Debug)]
pub struct Dispatcher<S, N> {
    store: S,
    notifier: N,
    current_records: Vec<DeliveryRecord>,
    worksheets: Vec<Worksheet>,
    titular_drivers: Vec<TitularDriver>,
    driver_localities: DriverLocalityMap,
    selection: WorksheetSelection,
    editing: Option<String>,
}

impl<S: KeyValueStore, N: Notifier> Dispatcher<S, N> {
    /// Load the three collections from `store`.
    ///
    /// Each collection loads on its own: one that is missing, corrupt or
    /// unreadable starts out empty without affecting the others. Collections
    /// found in the legacy shape are upgraded and written back.
    pub fn open(store: S, notifier: N, detection: Detection) -> Self {
        let mut book = Self {
            store,
            notifier,
            current_records: Vec::new(),
            worksheets: Vec::new(),
            titular_drivers: Vec::new(),
            driver_localities: DriverLocalityMap::new(),
            selection: WorksheetSelection::Current,
            editing: None,
        };

        book.current_records = book.load(Collection::CurrentRecords, detection);
        book.worksheets = book.load(Collection::Worksheets, detection);
        book.titular_drivers = book.load(Collection::TitularDrivers, detection);
        book.driver_localities = views::driver_locality_map(&book.titular_drivers);

        info!(
            records = book.current_records.len(),
            worksheets = book.worksheets.len(),
            drivers = book.titular_drivers.len(),
            "Delivery book loaded"
        );
        book
    }

    fn load<T>(&self, collection: Collection, detection: Detection) -> Vec<T>
    where
        T: DeserializeOwned + Serialize,
    {
        match load_collection::<T, S>(&self.store, collection, detection) {
            Ok(None) => Vec::new(),
            Ok(Some(Loaded { items, migrated })) => {
                if migrated {
                    if collection == Collection::CurrentRecords {
                        self.notifier.notify(messages::MIGRATING, Severity::Info);
                    }
                    self.persist(collection, &items);
                }
                items
            }
            Err(err) => {
                error!(%collection, error = %err, "Failed to load collection");
                self.notifier.notify(messages::LOAD_FAILED, Severity::Error);
                Vec::new()
            }
        }
    }

    /// Write a collection, reporting failure. The in-memory state is kept
    /// either way.
    fn persist<T: Serialize>(&self, collection: Collection, items: &[T]) -> bool {
        match save_collection(&self.store, collection, items) {
            Ok(()) => {
                debug!(%collection, items = items.len(), "Collection saved");
                true
            }
            Err(err) => {
                error!(%collection, error = %err, "Failed to save collection");
                self.notifier
                    .notify(save_failed_message(collection), Severity::Error);
                false
            }
        }
    }

    // === Delivery records ===

    /// Create a record, or update the record with `id` in place.
    ///
    /// Updating keeps the id and replaces every other field with the
    /// draft. An `id` that matches nothing leaves the collection as it is.
    /// Returns the id of the saved record.
    pub fn save_record(&mut self, draft: DeliveryDraft, id: Option<&str>) -> String {
        let id = if let Some(id) = id {
            match self.current_records.iter_mut().find(|r| r.id == id) {
                Some(record) => *record = DeliveryRecord::from_draft(id.to_string(), draft),
                None => warn!(id, "Update requested for unknown record"),
            }
            self.notifier
                .notify(messages::RECORD_UPDATED, Severity::Success);
            id.to_string()
        } else {
            let record = DeliveryRecord::from_draft(new_id(), draft);
            let id = record.id.clone();
            self.current_records.push(record);
            self.notifier
                .notify(messages::RECORD_CREATED, Severity::Success);
            id
        };
        self.editing = None;
        self.persist(Collection::CurrentRecords, &self.current_records);
        id
    }

    /// Start editing the current record with `id`.
    ///
    /// Returns the record, or `None` (and no edit in progress) if no current
    /// record has that id.
    pub fn edit_record(&mut self, id: &str) -> Option<&DeliveryRecord> {
        let found = self.current_records.iter().any(|r| r.id == id);
        self.editing = found.then(|| id.to_string());
        self.editing_record()
    }

    /// Abandon any edit in progress.
    pub fn clear_form(&mut self) {
        self.editing = None;
    }

    /// Remove the current record with `id`. Unknown ids change nothing.
    pub fn delete_record(&mut self, id: &str) {
        let before = self.current_records.len();
        self.current_records.retain(|r| r.id != id);
        if self.current_records.len() == before {
            debug!(id, "Delete requested for unknown record");
        }
        self.notifier.notify(messages::RECORD_DELETED, Severity::Info);
        self.persist(Collection::CurrentRecords, &self.current_records);
    }

    /// Move every current record into a new worksheet at the head of the
    /// history.
    ///
    /// Refused when there are no current records. Returns the id of the new
    /// worksheet. The selection is left alone; any edit in progress is
    /// dropped.
    pub fn archive(&mut self) -> Option<String> {
        if self.current_records.is_empty() {
            self.notifier
                .notify(messages::ARCHIVE_EMPTY, Severity::Error);
            return None;
        }

        let sheet = Worksheet::archive(std::mem::take(&mut self.current_records));
        let id = sheet.id.clone();
        info!(worksheet = %id, records = sheet.records.len(), "Archived current records");
        self.worksheets.insert(0, sheet);
        self.editing = None;
        self.notifier.notify(messages::ARCHIVED, Severity::Success);

        // Worksheets first: archived records reach storage before the current list is cleared.
        self.persist(Collection::Worksheets, &self.worksheets);
        self.persist(Collection::CurrentRecords, &self.current_records);
        Some(id)
    }

    /// Switch the displayed record set. Drops any edit in progress.
    pub fn select_worksheet(&mut self, selection: WorksheetSelection) {
        debug!(%selection, "Worksheet selected");
        self.selection = selection;
        self.editing = None;
    }

    // === Driver roster ===

    /// Create a roster entry, or update the entry with `id` in place.
    ///
    /// Existing delivery records are never touched, even when their driver
    /// name matches. Returns the id of the saved entry.
    pub fn save_driver(&mut self, draft: DriverDraft, id: Option<&str>) -> String {
        let id = if let Some(id) = id {
            match self.titular_drivers.iter_mut().find(|d| d.id == id) {
                Some(driver) => *driver = TitularDriver::from_draft(id.to_string(), draft),
                None => warn!(id, "Update requested for unknown driver"),
            }
            self.notifier
                .notify(messages::DRIVER_UPDATED, Severity::Success);
            id.to_string()
        } else {
            let driver = TitularDriver::from_draft(new_id(), draft);
            let id = driver.id.clone();
            self.titular_drivers.push(driver);
            self.notifier
                .notify(messages::DRIVER_CREATED, Severity::Success);
            id
        };
        self.driver_localities = views::driver_locality_map(&self.titular_drivers);
        self.persist(Collection::TitularDrivers, &self.titular_drivers);
        id
    }

    /// Remove the roster entry with `id`. Unknown ids change nothing.
    pub fn delete_driver(&mut self, id: &str) {
        self.titular_drivers.retain(|d| d.id != id);
        self.driver_localities = views::driver_locality_map(&self.titular_drivers);
        self.notifier.notify(messages::DRIVER_DELETED, Severity::Info);
        self.persist(Collection::TitularDrivers, &self.titular_drivers);
    }

    // === Views ===

    /// Records of the worksheet being filled in.
    #[must_use]
    pub fn current_records(&self) -> &[DeliveryRecord] {
        &self.current_records
    }

    /// Archived worksheets, most recent first.
    #[must_use]
    pub fn worksheets(&self) -> &[Worksheet] {
        &self.worksheets
    }

    /// The driver roster.
    #[must_use]
    pub fn titular_drivers(&self) -> &[TitularDriver] {
        &self.titular_drivers
    }

    /// Driver name to default locality.
    #[must_use]
    pub fn driver_locality_map(&self) -> &DriverLocalityMap {
        &self.driver_localities
    }

    /// Default locality for a driver name, if the roster knows it.
    #[must_use]
    pub fn suggest_locality(&self, driver_name: &str) -> Option<&str> {
        self.driver_localities.get(driver_name).map(String::as_str)
    }

    /// The current worksheet selection.
    #[must_use]
    pub fn selection(&self) -> &WorksheetSelection {
        &self.selection
    }

    /// Records for the current selection; empty for an unknown worksheet.
    #[must_use]
    pub fn display_records(&self) -> &[DeliveryRecord] {
        views::display_records(&self.selection, &self.current_records, &self.worksheets)
    }

    /// Whether the displayed records are an archive.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        views::is_read_only(&self.selection)
    }

    /// Totals over the displayed records.
    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary::of(self.display_records())
    }

    /// The record being edited, if any.
    #[must_use]
    pub fn editing_record(&self) -> Option<&DeliveryRecord> {
        let id = self.editing.as_deref()?;
        self.current_records.iter().find(|r| r.id == id)
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give back the backing store.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }
}
