//! Word length prefix.
//!
//! | length              | encoding                        |
//! |---------------------|---------------------------------|
//! | `< 0x80`            | 1 byte                          |
//! | `< 0x4000`          | 2 bytes, `len \| 0x8000`        |
//! | `< 0x20_0000`       | 3 bytes, `len \| 0xC0_0000`     |
//! | `< 0x1000_0000`     | 4 bytes, `len \| 0xE000_0000`   |
//! | otherwise           | `0xF0` then 4 bytes big endian  |

use crate::error::ProtocolError;

/// Largest word accepted from the wire. Longer announcements are rejected before any
/// body byte is buffered.
pub const MAX_WORD_LEN: usize = 16 * 1024 * 1024;

/// Appends the length prefix for a word of `len` bytes.
pub fn encode_length(len: usize, out: &mut Vec<u8>) -> Result<(), ProtocolError> {
    let len32 = u32::try_from(len).map_err(|_| ProtocolError::WordTooLong(len))?;
    match len32 {
        0..0x80 => out.push(len32 as u8),
        0x80..0x4000 => out.extend_from_slice(&(len32 | 0x8000).to_be_bytes()[2..]),
        0x4000..0x20_0000 => out.extend_from_slice(&(len32 | 0xC0_0000).to_be_bytes()[1..]),
        0x20_0000..0x1000_0000 => out.extend_from_slice(&(len32 | 0xE000_0000).to_be_bytes()),
        _ => {
            out.push(0xF0);
            out.extend_from_slice(&len32.to_be_bytes());
        }
    }
    Ok(())
}

/// Total size of the prefix announced by its first byte.
pub fn prefix_size(first: u8) -> Result<usize, ProtocolError> {
    match first {
        0x00..=0x7F => Ok(1),
        0x80..=0xBF => Ok(2),
        0xC0..=0xDF => Ok(3),
        0xE0..=0xEF => Ok(4),
        0xF0 => Ok(5),
        reserved => Err(ProtocolError::ReservedPrefix(reserved)),
    }
}

/// Decodes a length prefix at the start of `buf`.
///
/// Returns `Ok(None)` while the prefix is still incomplete, otherwise the word length
/// and the number of prefix bytes consumed. Lengths above [`MAX_WORD_LEN`] fail with
/// [`ProtocolError::WordTooLong`].
pub fn decode_length(buf: &[u8]) -> Result<Option<(usize, usize)>, ProtocolError> {
    let Some(&first) = buf.first() else {
        return Ok(None);
    };
    let size = prefix_size(first)?;
    if buf.len() < size {
        return Ok(None);
    }

    let len: u32 = match size {
        1 => u32::from(first),
        2 => u32::from_be_bytes([0, 0, buf[0], buf[1]]) & 0x3FFF,
        3 => u32::from_be_bytes([0, buf[0], buf[1], buf[2]]) & 0x1F_FFFF,
        4 => u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) & 0x0FFF_FFFF,
        _ => u32::from_be_bytes([buf[1], buf[2], buf[3], buf[4]]),
    };
    let len = len as usize;
    if len > MAX_WORD_LEN {
        return Err(ProtocolError::WordTooLong(len));
    }
    Ok(Some((len, size)))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
