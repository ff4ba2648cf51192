pub mod constants;
pub mod dates;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use dates::{floor_to_hour, target_date};
pub use filename::{
    date_from_raw_file_name, file_name_from_key, master_file_name, master_previous_file_name,
    raw_file_name, transformed_file_name,
};
pub use progress::ProgressReporter;
