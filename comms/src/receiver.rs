use std::io;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{Deserialize, LEN_TYPE_SIZE, LenType, MAX_FRAME_SIZE};

/// The receiving end handle of the communication.
pub struct OnoReceiver<R: AsyncRead + Unpin> {
    rx: R,
}

impl<R: AsyncRead + Unpin> OnoReceiver<R> {
    /// Creates a new `OnoReceiver` instance.
    ///
    /// # Arguments
    /// * `rx` - The underlying reader.
    pub(super) fn new(rx: R) -> Self {
        Self { rx }
    }

    /// Waits to receive a new message from the inner receiver.
    ///
    /// # Arguments
    /// * `buf` - The buffer to use for deserialization, the returned
    ///           `T`'s lifetimes will be tied to this buffer.
    ///
    /// # Returns
    /// A result object that returns `T` on success or `io::Error` on failure.
    /// A stream closed before a full frame arrived yields `UnexpectedEof`.
    pub async fn recv_into<'buf, T>(&mut self, buf: &'buf mut Vec<u8>) -> io::Result<T>
    where
        T: Deserialize<'buf>,
    {
        let mut size_buf = [0; LEN_TYPE_SIZE];
        self.rx.read_exact(&mut size_buf).await?;
        let len = LenType::from_be_bytes(size_buf);

        let len = usize::try_from(len)
            .ok()
            .filter(|len| *len <= MAX_FRAME_SIZE)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("frame of {len} bytes exceeds the {MAX_FRAME_SIZE} bytes limit"),
                )
            })?;

        buf.clear();
        buf.resize(len, 0);
        self.rx.read_exact(buf.as_mut_slice()).await?;

        T::deserialize(buf)
    }
}
