pub mod master;
pub mod trip;
pub mod weather;

pub use master::{MasterKind, MasterRow, MasterTable};
pub use trip::{CleanTrip, RawTrip, ResolvedTrip};
pub use weather::{HourlySeries, WeatherRecord, WeatherResponse};
