mod buffer;

pub use buffer::{MemoryBuffer, MemoryDelta};
