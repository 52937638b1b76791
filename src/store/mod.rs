pub mod adapter;
pub mod memory;
pub mod path;

pub use adapter::{BatchWrite, Document, OrderBy, RemoteStore, StoreError};
pub use memory::MemoryStore;
pub use path::{CollectionPath, DocumentPath, EXERCISES, SETS};
