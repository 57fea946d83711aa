//! Sentences the router sends back.

use std::collections::HashMap;

use crate::error::ProtocolError;

/// Attribute map of a reply sentence.
pub type Attributes = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplySentence {
    /// One data row.
    Re(Attributes),
    /// End of the reply. Login challenges and `add` ids travel in here as `ret`.
    Done(Attributes),
    /// The command failed; the reply still ends with `!done`.
    Trap(Attributes),
    /// The router is closing the connection.
    Fatal(String),
    /// Reply without rows (RouterOS 7.18+), followed by `!done`.
    Empty,
}

impl ReplySentence {
    pub fn parse(words: &[String]) -> Result<Self, ProtocolError> {
        let (head, rest) = words.split_first().ok_or(ProtocolError::EmptySentence)?;
        match head.as_str() {
            "!re" => Ok(Self::Re(attributes(rest))),
            "!done" => Ok(Self::Done(attributes(rest))),
            "!trap" => Ok(Self::Trap(attributes(rest))),
            "!empty" => Ok(Self::Empty),
            // `!fatal` carries its reason as a bare word.
            "!fatal" => Ok(Self::Fatal(rest.join(" "))),
            other => Err(ProtocolError::UnknownReply(other.to_string())),
        }
    }
}

/// Decodes `=key=value` words. Words of any other shape (`.tag=`, bare words) are skipped.
pub fn attributes(words: &[String]) -> Attributes {
    words
        .iter()
        .filter_map(|w| w.strip_prefix('='))
        .filter_map(|w| w.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// A completed reply: every `!re` row in arrival order plus the `!done` attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub rows: Vec<Attributes>,
    pub done: Attributes,
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
