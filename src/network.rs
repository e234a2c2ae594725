//! Message framing: a little-endian `u32` length followed by UTF-8 JSON.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{self, Read, Write};

use crate::error::Result;

/// Frames larger than this are rejected before allocating.
pub const MAX_MESSAGE_SIZE: u32 = 1 << 20;

/// Sends one framed message.
pub fn send_message<W: Write>(stream: &mut W, message: &str) -> io::Result<()> {
    let message_bytes = message.as_bytes();
    let size = u32::try_from(message_bytes.len())
        .ok()
        .filter(|&s| s <= MAX_MESSAGE_SIZE)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "message too large"))?;
    stream.write_u32::<LittleEndian>(size)?;
    stream.write_all(message_bytes)?;
    stream.flush()
}

/// Receives one framed message.
pub fn receive_message<R: Read>(stream: &mut R) -> io::Result<String> {
    let size = stream.read_u32::<LittleEndian>()?;
    if size > MAX_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {} bytes exceeds limit", size),
        ));
    }
    let mut buffer = vec![0; size as usize];
    stream.read_exact(&mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Invalid data: {}", e)))
}

pub fn send_json<W: Write, T: Serialize>(stream: &mut W, value: &T) -> Result<()> {
    let text = serde_json::to_string(value)?;
    send_message(stream, &text)?;
    Ok(())
}

pub fn receive_json<R: Read, T: DeserializeOwned>(stream: &mut R) -> Result<T> {
    let text = receive_message(stream)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_frame_layout() {
        let mut buffer = Vec::new();
        send_message(&mut buffer, "{}").unwrap();
        assert_eq!(buffer, vec![2, 0, 0, 0, b'{', b'}']);

        let mut cursor = Cursor::new(buffer);
        assert_eq!(receive_message(&mut cursor).unwrap(), "{}");
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let mut cursor = Cursor::new((MAX_MESSAGE_SIZE + 1).to_le_bytes().to_vec());
        let err = receive_message(&mut cursor).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_truncated_frame_is_eof() {
        let mut cursor = Cursor::new(vec![5, 0, 0, 0, b'a']);
        let err = receive_message(&mut cursor).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_invalid_json_is_protocol_error() {
        let mut buffer = Vec::new();
        send_message(&mut buffer, "not json").unwrap();
        let result: Result<serde_json::Value> = receive_json(&mut Cursor::new(buffer));
        assert!(matches!(result, Err(crate::error::NavError::Protocol(_))));
    }
}
