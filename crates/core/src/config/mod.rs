//! Configuration management for gradle-probe

mod settings;

// Re-export main types
pub use settings::{
    CONFIG_FILE_NAMES, Config, DaemonConfig, ENV_EXTENSION_PATH, ENV_GRADLE, ExtensionConfig,
};
