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
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Typed settings cache with write-through persistence and graceful
//! degradation.
//!
//! Layout: `value.rs` (tagged value model and coercion rules),
//! `defaults.rs` (compiled-in default table and key descriptions),
//! `fallback.rs` (flat-file degraded mode), with `store.rs` hosting the
//! `SettingsStore` facade and `backend.rs` the persistence seam behind it.

mod backend;
pub mod defaults;
pub mod error;
pub mod fallback;
pub mod store;
pub mod value;

pub use error::{SettingsError, SettingsResult};
pub use fallback::FallbackStore;
pub use store::{SettingsStore, WriteOutcome, WriteTicket};
pub use value::{SettingsValue, ValueKind};
