use std::io;

/// Types that can be rebuilt from the body of a frame.
pub trait Deserialize<'a>: Sized {
    fn deserialize(buf: &'a [u8]) -> io::Result<Self>;
}
