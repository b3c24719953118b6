#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Data access layer for the Plinth settings store: SQLite pool
//! construction, embedded migrations, and `config` table queries.

pub mod config;
pub mod error;

pub use config::{ConfigRow, NewConfigEntry, connect};
pub use error::{DataError, Result as DataResult};
