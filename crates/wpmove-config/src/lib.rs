pub mod loader;
pub mod model;

pub use loader::{ConfigLoader, apply_env_overrides};
pub use model::{AppConfig, DatabaseConfig, GatewayConfig};
