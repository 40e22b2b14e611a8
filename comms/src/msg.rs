use std::{borrow::Cow, io};

use crate::{Deserialize, Serialize, specs::ShardSpec};

type Header = u32;
const HEADER_SIZE: usize = size_of::<Header>();

const ERR_KIND: Header = 0;
const CONTROL_KIND: Header = 1;
const CORRECT_KIND: Header = 2;

/// The payload data for the `Data` variant of the `Msg` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Amount of correctly classified items in a worker's shard.
    Correct(u64),
}

/// The command for the `Control` variant of the `Msg` enum.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Hands a worker the range of test items it must score.
    Assign(ShardSpec),
}

/// The application layer message for the entire system.
#[derive(Debug, PartialEq)]
pub enum Msg<'a> {
    Control(Command),
    Data(Payload),
    Err(Cow<'a, str>),
}

impl Msg<'_> {
    /// A short name of the message kind, meant for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Msg::Control(Command::Assign(_)) => "control/assign",
            Msg::Data(Payload::Correct(_)) => "data/correct",
            Msg::Err(_) => "err",
        }
    }

    fn buf_is_too_small<T>(size: usize) -> io::Result<T> {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("The given buffer is too small {size}, must at least be {HEADER_SIZE} bytes"),
        ))
    }

    fn invalid_kind<T>(kind: Header) -> io::Result<T> {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Received an invalid kind header {kind}"),
        ))
    }
}

impl<'a> Serialize<'a> for Msg<'a> {
    fn serialize(&'a self, buf: &mut Vec<u8>) -> io::Result<Option<&'a [u8]>> {
        match self {
            Msg::Err(e) => {
                buf.extend_from_slice(&ERR_KIND.to_be_bytes());
                Ok(Some(e.as_bytes()))
            }
            Msg::Control(cmd) => {
                buf.extend_from_slice(&CONTROL_KIND.to_be_bytes());
                serde_json::to_writer(&mut *buf, cmd)?;
                Ok(None)
            }
            Msg::Data(Payload::Correct(correct)) => {
                buf.extend_from_slice(&CORRECT_KIND.to_be_bytes());
                buf.extend_from_slice(&correct.to_be_bytes());
                Ok(None)
            }
        }
    }
}

impl<'a> Deserialize<'a> for Msg<'a> {
    fn deserialize(buf: &'a [u8]) -> io::Result<Self> {
        let Some((kind, rest)) = buf.split_first_chunk::<HEADER_SIZE>() else {
            return Self::buf_is_too_small(buf.len());
        };

        match Header::from_be_bytes(*kind) {
            ERR_KIND => {
                let string = std::str::from_utf8(rest)
                    .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

                Ok(Self::Err(Cow::Borrowed(string)))
            }
            CONTROL_KIND => {
                let cmd = serde_json::from_slice(rest)?;
                Ok(Self::Control(cmd))
            }
            CORRECT_KIND => {
                let bytes: [u8; size_of::<u64>()] = rest.try_into().map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("correct count must be 8 bytes long, got {}", rest.len()),
                    )
                })?;

                Ok(Self::Data(Payload::Correct(u64::from_be_bytes(bytes))))
            }
            kind => Self::invalid_kind(kind),
        }
    }
}
