pub mod goal;
pub mod post;
pub mod topic;

pub use goal::PostGoal;
pub use post::{KindSelector, KindWeights, PostContent, PostKind};
pub use topic::Topic;
