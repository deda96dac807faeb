//! Infrastructure layer: configuration, logging and in-memory collaborators

pub mod config;
pub mod in_memory;
pub mod logging;

pub use config::{ConfigError, EngineConfig};
pub use in_memory::{InMemoryStore, LoggingAutomationTrigger, SiteFixture};
pub use logging::{init_logging, init_logging_with_config};
