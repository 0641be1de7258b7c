use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::activity::Activity;
use crate::database::DataService;

/// Where a feed reads its history from.
pub trait ActivitySource {
    /// Newest first.
    fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Activity>>;
    /// Everything created strictly after `cursor`, oldest first.
    fn fetch_since(&self, cursor: Option<DateTime<Utc>>) -> Result<Vec<Activity>>;
}

impl ActivitySource for DataService {
    fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Activity>> {
        self.activity_page(offset, limit)
    }

    fn fetch_since(&self, cursor: Option<DateTime<Utc>>) -> Result<Vec<Activity>> {
        self.activities_after(cursor)
    }
}
