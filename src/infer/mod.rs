//! Inference: forward saturation and backward proof search.

pub mod backward;
pub mod forward;

pub use backward::{Explanation, Proof, ProveOptions};
pub use forward::ForwardOutcome;
