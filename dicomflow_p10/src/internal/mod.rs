pub mod byte_stream;
pub mod header;
pub mod location;
