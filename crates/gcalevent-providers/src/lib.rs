//! Transport boundary for calendar events and stored recordings.
//!
//! - [`CalendarService`] / [`FileStore`] - the narrow interfaces to the
//!   remote services
//! - [`EventManager`] - normalizes drafts and drives the services
//! - [`memory`] - in-process backends for tests and dry runs
//! - [`google`] - Calendar and Drive REST backends (feature `google`)
//!
//! # Architecture
//!
//! ```text
//!   EventDraft ──normalize──► EventSpec ──serialize──► EventWire
//!                                                         │
//!                                   ┌─────────────────────┘
//!                                   ▼
//!                          ┌─────────────────┐     ┌───────────────┐
//!                          │  EventManager   │────►│   FileStore   │
//!                          └────────┬────────┘     └───────────────┘
//!                                   │
//!                                   ▼
//!                          ┌─────────────────┐
//!                          │ CalendarService │
//!                          └─────────────────┘
//! ```

pub mod error;
#[cfg(feature = "google")]
pub mod google;
pub mod manager;
pub mod memory;
pub mod service;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use manager::{EventManager, ManagerError, ManagerResult, PreparedInsert};
pub use memory::{MemoryCalendar, MemoryFileStore, RecordedWrite};
pub use service::{
    AccessTokenSource, BoxFuture, CalendarInfo, CalendarService, FileStore, StaticToken,
};
