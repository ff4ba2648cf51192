pub mod master_resolver;
pub mod reconciler;
pub mod report;
pub mod trip_normalizer;
pub mod weather_shaper;

pub use master_resolver::resolve;
pub use reconciler::{reconcile, reconcile_kind};
pub use report::{FileOutcome, TransformReport};
pub use trip_normalizer::TripNormalizer;
pub use weather_shaper::shape;
