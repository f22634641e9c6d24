/// Cache store adapters for registry lookup results
mod file_store;
mod in_memory;

pub use file_store::FileCacheStore;
pub use in_memory::InMemoryCacheStore;
