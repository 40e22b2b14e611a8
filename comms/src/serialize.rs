use std::io;

/// Types that can be written as the body of a frame.
pub trait Serialize<'a> {
    /// Appends the serialized form of `self` to `buf`.
    ///
    /// Implementors may return a borrowed slice that is written right after
    /// `buf`, avoiding a copy of large byte payloads.
    fn serialize(&'a self, buf: &mut Vec<u8>) -> io::Result<Option<&'a [u8]>>;
}
