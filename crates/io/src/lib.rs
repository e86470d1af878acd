// File I/O for comparison sources and exports

pub mod csv;

pub use self::csv::{decode, decode_file, encode, encode_to_file, CsvError};
