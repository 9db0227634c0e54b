//! Google backends.
//!
//! [`GoogleCalendarService`] talks to Calendar API v3 and
//! [`GoogleDriveStore`] to Drive API v3. Both take their bearer token from
//! an [`AccessTokenSource`](crate::service::AccessTokenSource); running the
//! OAuth flow that produces it is left to the caller.
//!
//! ```ignore
//! use std::sync::Arc;
//! use gcalevent_providers::google::{GoogleCalendarService, GoogleConfig};
//! use gcalevent_providers::{EventManager, StaticToken};
//!
//! let config = GoogleConfig::new("My App");
//! let token = Arc::new(StaticToken::new(std::env::var("ACCESS_TOKEN")?));
//! let calendar = GoogleCalendarService::new(&config, token)?;
//! let manager = EventManager::new(Arc::new(calendar));
//! ```

mod calendar;
mod config;
mod drive;
mod http;

pub use calendar::GoogleCalendarService;
pub use config::{GoogleConfig, CALENDAR_API_BASE, DRIVE_API_BASE};
pub use drive::GoogleDriveStore;
