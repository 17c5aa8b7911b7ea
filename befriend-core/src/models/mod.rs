pub mod graph;
pub mod notification;
pub mod profile;

pub use graph::{Edge, ScoredEdge};
pub use notification::{NewNotification, SUGGESTION_TYPE};
pub use profile::Profile;
