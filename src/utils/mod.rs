pub mod serialization;
pub mod urls;

pub use serialization::TripleCsvWriter;
pub use urls::{display_name, fragment_name, join_url, local_name, uri_path};
