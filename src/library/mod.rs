pub mod storage;
pub mod store;

pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{LIBRARY_KEY, Library, LibraryAction, LibraryStore, reduce};
