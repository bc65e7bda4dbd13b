pub mod cache;

pub use cache::CachePort;
