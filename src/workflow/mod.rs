pub mod compose;
pub mod post_ctx;
pub mod post_flow;

pub use compose::ComposeLimits;
pub use post_ctx::PostCtx;
pub use post_flow::{PostFlow, UnitOutcome};
