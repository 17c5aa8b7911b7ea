pub mod candidates;
pub mod config;
pub mod db;
pub mod error;
pub mod gcn;
pub mod id_map;
pub mod models;
pub mod scorer;
pub mod suggestions;

pub use config::{BefriendConfig, DedupStrategy, ModelConfig, StoreBackend};
pub use error::BefriendError;
pub use gcn::{GcnConv, GcnModel, ModelError};
pub use id_map::{friendship_edges, IdMap};
pub use models::{Edge, NewNotification, Profile, ScoredEdge};
pub use scorer::{predict_new_links, predict_scored_links};
pub use suggestions::{fan_out_suggestions, Suggestions};
