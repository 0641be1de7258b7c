pub mod settings;

pub use settings::{AppConfig, DetectionSettings, FeedSettings, StorageSettings};
