pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongo;

pub use memory::MemoryTableStore;
#[cfg(feature = "mongodb")]
pub use mongo::MongoTableStore;
