pub mod extract;
pub mod transform;

pub use extract::{ExtractJob, ExtractOutcome};
pub use transform::TransformJob;
