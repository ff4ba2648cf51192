pub mod master_reader;
pub mod raw_reader;

pub use master_reader::MasterReader;
pub use raw_reader::RawReader;
