pub mod config;

pub use config::StorageConfig;
