pub mod memory;

pub use memory::InMemoryTreeStore;
