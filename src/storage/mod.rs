//! Run record persistence.
//!
//! The [`RunStore`] trait is the only thing the service depends on.
//! Two backends are provided: [`InMemoryRunStore`] and [`JsonFileRunStore`].

mod file;
mod memory;
mod traits;

pub use file::JsonFileRunStore;
pub use memory::InMemoryRunStore;
pub use traits::{RunStore, StorageError};
