mod settings;

pub use settings::{
    CatalogConfig, LLMConfig, LoggingConfig, RoutingConfig, Settings, SystemConfig,
};
