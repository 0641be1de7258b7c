pub mod events;
pub mod types;
pub mod writer;

pub use types::{
    Activity, ActivityColor, ActivityMetadata, ActivityType, MilestoneKind, NewActivity,
    PlacementSummary,
};
pub use writer::ActivityWriter;
