mod deserialize;
pub mod msg;
mod receiver;
mod sender;
mod serialize;
pub mod specs;

use tokio::io::{self, AsyncRead, AsyncWrite, DuplexStream, ReadHalf, WriteHalf};

pub use deserialize::Deserialize;
pub use receiver::OnoReceiver;
pub use sender::OnoSender;
pub use serialize::Serialize;

type LenType = u64;
const LEN_TYPE_SIZE: usize = size_of::<LenType>();

/// Upper bound for a single frame body, anything bigger is treated as corrupt.
const MAX_FRAME_SIZE: usize = 1 << 20;

/// Receiving end of an in-memory link.
pub type DuplexRx = OnoReceiver<ReadHalf<DuplexStream>>;

/// Sending end of an in-memory link.
pub type DuplexTx = OnoSender<WriteHalf<DuplexStream>>;

/// Creates both `OnoReceiver` and `OnoSender` network channel parts.
///
/// Given a writer and reader creates and returns both ends of the communication.
///
/// # Arguments
/// * `rx` - An async readable.
/// * `tx` - An async writable.
///
/// # Returns
/// A communication stream in the form of an ono receiver and sender.
pub fn channel<R, W>(rx: R, tx: W) -> (OnoReceiver<R>, OnoSender<W>)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    (OnoReceiver::new(rx), OnoSender::new(tx))
}

/// Creates an in-memory point to point link made of two independent one-way legs.
///
/// Whatever is sent through one end's sender is received by the other end's
/// receiver. Up to `max_buf_size` bytes are buffered per direction, so a peer
/// may write a message and go away before the other side reads it.
///
/// # Arguments
/// * `max_buf_size` - The amount of bytes each direction can hold unread.
///
/// # Returns
/// Both ends of the link.
pub fn duplex(max_buf_size: usize) -> ((DuplexRx, DuplexTx), (DuplexRx, DuplexTx)) {
    let (one, two) = io::duplex(max_buf_size);
    let (rx1, tx1) = io::split(one);
    let (rx2, tx2) = io::split(two);
    (channel(rx1, tx1), channel(rx2, tx2))
}
