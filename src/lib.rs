//! A small HTTP directory browser.
//!
//! [`listing::list_directory`] resolves a request path against the served
//! root and returns its entries in natural order; [`server`] wires it into a
//! browse server and a download server.

pub mod config;
pub mod error;
pub mod listing;
pub mod natural;
pub mod render;
pub mod server;

pub use config::{Args, Config};
pub use error::ListError;
pub use listing::{list_directory, DirectoryReader, Entry, EntryKind, Listing, LocalFs};
