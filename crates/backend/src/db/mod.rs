mod cache;
mod credentials;
mod memory_cache;
mod sqlite_cache;

pub use cache::{CacheBackend, CacheError, SharedCache};
pub use credentials::{
    CacheCredentialStore, CredentialStorage, Credentials, DEFAULT_PREFIX, StoreError, cache_key,
};
pub use memory_cache::MemoryCache;
pub use sqlite_cache::SqliteCache;
