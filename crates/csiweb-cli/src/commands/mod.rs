//! Command implementations for csiweb

pub mod clock;
pub mod latest;
pub mod query;
pub mod tables;
pub mod upload;
pub mod watch;

pub use clock::clock;
pub use latest::latest;
pub use query::query;
pub use tables::{fields, tables};
pub use upload::upload;
pub use watch::watch;
