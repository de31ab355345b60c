//! WAV file I/O for the demo binary and tests.

mod wav;

pub use wav::{read_wav, write_wav};
