use log::{debug, warn};

use super::types::NewActivity;
use crate::database::DataService;

/// Persists activity drafts. Failures are logged and reported as `false`;
/// nothing is retried.
#[derive(Clone)]
pub struct ActivityWriter {
    service: DataService,
}

impl ActivityWriter {
    pub fn new(service: DataService) -> Self {
        Self { service }
    }

    pub fn create_activity(&self, draft: &NewActivity) -> bool {
        match self.service.insert_activity(draft) {
            Ok(activity) => {
                debug!("Created {} activity {}: {}", activity.activity_type, activity.id, activity.title);
                true
            }
            Err(e) => {
                warn!("Failed to create {} activity '{}': {:#}", draft.activity_type, draft.title, e);
                false
            }
        }
    }

    /// Writes the draft if there is one; `false` when there was nothing to write.
    pub fn create_optional(&self, draft: Option<NewActivity>) -> bool {
        draft.is_some_and(|d| self.create_activity(&d))
    }
}
