use crate::error::ProtocolError;
use crate::word;

/// Encodes `words` followed by the terminating empty word.
pub fn encode_sentence<S: AsRef<str>>(words: &[S]) -> Result<Vec<u8>, ProtocolError> {
    let mut out = Vec::new();
    for w in words {
        let bytes = w.as_ref().as_bytes();
        word::encode_length(bytes.len(), &mut out)?;
        out.extend_from_slice(bytes);
    }
    out.push(0);
    Ok(out)
}

/// Decodes one sentence from the front of `buf`.
///
/// Returns `Ok(None)` until a complete sentence is buffered; otherwise the words and
/// the number of bytes the sentence occupied.
pub fn decode_sentence(buf: &[u8]) -> Result<Option<(Vec<String>, usize)>, ProtocolError> {
    let mut words = Vec::new();
    let mut cursor = 0;

    loop {
        let Some((len, prefix)) = word::decode_length(&buf[cursor..])? else {
            return Ok(None);
        };
        cursor += prefix;
        if len == 0 {
            return Ok(Some((words, cursor)));
        }
        if buf.len() < cursor + len {
            return Ok(None);
        }
        let text = std::str::from_utf8(&buf[cursor..cursor + len])
            .map_err(|_| ProtocolError::InvalidUtf8)?;
        words.push(text.to_string());
        cursor += len;
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
