use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("reserved length prefix byte {0:#04x}")]
    ReservedPrefix(u8),
    #[error("word of {0} bytes exceeds the protocol limit")]
    WordTooLong(usize),
    #[error("word is not valid utf-8")]
    InvalidUtf8,
    #[error("empty sentence")]
    EmptySentence,
    #[error("unexpected reply word {0:?}")]
    UnknownReply(String),
}
