pub mod store;

pub use store::{LogVaultConfig, Partitioning, CONFIG_ENV_VAR};
