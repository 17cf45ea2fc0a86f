//! `dispatchbook` - A local record book for daily delivery dispatch
//!
//! This library keeps three collections in a durable key-value store: the
//! delivery records of the worksheet being filled in, the archived
//! worksheets, and a roster of titular drivers. Data written by older
//! releases is upgraded to the current layout on load.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod migrate;
pub mod model;
pub mod notify;
pub mod storage;
pub mod views;

pub use config::Config;
pub use dispatcher::Dispatcher;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use migrate::Detection;
pub use model::{DeliveryDraft, DeliveryRecord, DriverDraft, TitularDriver, Worksheet};
pub use notify::{Notifier, Severity};
pub use storage::{KeyValueStore, Storage, StorageStats};
pub use views::{Summary, WorksheetSelection};
