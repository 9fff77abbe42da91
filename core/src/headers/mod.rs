pub mod decode;
pub mod encode;
pub mod types;

pub use decode::{decode_chunk_header, decode_file_header};
pub use encode::{encode_chunk_header, encode_file_header};
pub use types::{ChunkHeader, FileHeader, HeaderError};
