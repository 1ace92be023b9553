pub mod memory;
pub mod sqlite;

pub use memory::InMemoryContractStore;
pub use sqlite::SqliteContractStore;
