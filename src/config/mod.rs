// Configuration: typed settings plus the file/environment loader

mod loader;
mod settings;

pub use loader::load_config;
pub use settings::{Config, LlmConfig, SearchConfig, SearchMethod, SenderProfile};
