//! Logger Web API Client
//!
//! Typed HTTP client for the query-string web API exposed by Campbell
//! Scientific data loggers: data queries over the five record-selection
//! modes, symbol browsing, clock check and program upload.
//!
//! # Example
//!
//! ```rust,no_run
//! use csiweb_client::{CsiClient, QueryMode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), csiweb_client::CsiClientError> {
//!     // Explicit table list; `CsiClient::discover` asks the device instead.
//!     let client = CsiClient::new("172.17.204.40", vec!["ASSET_1min".to_string()])?;
//!
//!     // Most recent record of one table, normalized to field -> (value, units).
//!     let data = client
//!         .table_data("ASSET_1min", &QueryMode::most_recent(1))
//!         .await?;
//!     if let Some(reading) = data.reading("AirTemp_Avg") {
//!         println!("{} {}", reading.value, reading.units);
//!     }
//!
//!     // Same query over every configured table; partial results are fine.
//!     let all = client.all_table_data(&QueryMode::most_recent(1)).await;
//!     for (table, data) in &all.tables {
//!         println!("{table}: {}", data.time);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! Every call is a single best-effort HTTP attempt; there is no retry,
//! backoff or caching in the client. Failures are classified so callers can
//! retry only the transient ones (see
//! [`CsiClientError::is_transient`]).
//!
//! # Testing
//!
//! The `testing` module provides an in-process device stub:
//!
//! ```rust,ignore
//! use csiweb_client::testing::{MockLogger, TestServer};
//!
//! let logger = MockLogger::new();
//! logger.insert_table("ASSET_1min", payload);
//! let server = TestServer::start(logger.clone()).await?;
//! let client = CsiClient::new(&server.address(), vec!["ASSET_1min".into()])?;
//! ```

mod client;
mod error;
mod query;
mod request;
pub mod testing;
mod types;

pub use client::{Credentials, CsiClient};
pub use error::{CsiClientError, Result};
pub use query::{
    format_device_time, parse_device_time, Command, FileAction, OutputFormat, QueryMode,
    TIME_FORMAT,
};
pub use request::UrlBuilder;
pub use types::{
    ClockResponse, FieldDescriptor, MultiTableData, Reading, Record, Symbol, SymbolList,
    TableData, TableHead, TableResponse,
};
