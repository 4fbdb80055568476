pub mod backend;
pub mod error;
pub mod memory;
pub mod store;

pub use backend::TranscriptBackend;
pub use error::PersistError;
pub use memory::MemoryBackend;
pub use store::TranscriptStore;
