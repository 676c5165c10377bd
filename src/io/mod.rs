mod byte_source;
mod cursor;

pub use byte_source::{ByteSource, FileSource, MemorySource};
pub use cursor::{decode_slice, ByteOrder, Cursor, Primitive};
