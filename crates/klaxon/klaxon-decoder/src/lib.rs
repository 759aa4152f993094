mod cursor;
mod decode;

pub use decode::{DEFAULT_MAX_MESSAGE_LEN, DecodeError, decode};
