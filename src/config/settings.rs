use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub page_size: usize,
    pub poll_interval: Duration,
    pub subscribe_timeout: Duration,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            page_size: 10,
            poll_interval: Duration::from_secs(5),
            subscribe_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DetectionSettings {
    pub streak_thresholds: Vec<u32>,
    pub streak_lookback: usize,
    pub rivalry_step: u32,
    pub match_milestone_step: u64,
    pub tournament_milestone_step: u64,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            streak_thresholds: vec![3, 5, 10, 15, 20],
            streak_lookback: 20,
            rivalry_step: 5,
            match_milestone_step: 50,
            tournament_milestone_step: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub database_path: String,
    pub image_dir: PathBuf,
    pub public_image_url: String,
    pub client_state_path: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_path: env_or("DATABASE_PATH", "match_tracker.db"),
            image_dir: PathBuf::from(env_or("IMAGE_DIR", "images")),
            public_image_url: env_or("PUBLIC_IMAGE_URL", "http://localhost:3000/images"),
            client_state_path: PathBuf::from(env_or(
                "CLIENT_STATE_PATH",
                ".match_tracker_client.json",
            )),
        }
    }
}

fn env_or(key: &str, fallback: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| fallback.to_string())
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub feed: FeedSettings,
    pub detection: DetectionSettings,
    pub storage: StorageSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            feed: FeedSettings::default(),
            detection: DetectionSettings::default(),
            storage: StorageSettings::default(),
        }
    }
}
