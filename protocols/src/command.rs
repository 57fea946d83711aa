use crate::error::ProtocolError;
use crate::sentence;

/// A command sentence: the menu path followed by attribute and query words.
///
/// ```
/// use flowtally_protocols::Command;
///
/// let cmd = Command::new("/ip/firewall/address-list/print").query("list", "ignoreVpn");
/// assert_eq!(cmd.words(), ["/ip/firewall/address-list/print", "?list=ignoreVpn"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    words: Vec<String>,
}

impl Command {
    pub fn new(path: impl Into<String>) -> Self {
        Self { words: vec![path.into()] }
    }

    /// Adds an `=key=value` argument.
    pub fn attr(mut self, key: &str, value: &str) -> Self {
        self.words.push(format!("={key}={value}"));
        self
    }

    /// Adds a `?key=value` query filter (print commands only).
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.words.push(format!("?{key}={value}"));
        self
    }

    pub fn path(&self) -> &str {
        &self.words[0]
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        sentence::encode_sentence(&self.words)
    }
}

impl std::fmt::Display for Command {
    /// Prints the path and argument names only; values may hold credentials.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())?;
        for w in &self.words[1..] {
            let (sigil, rest) = w.split_at(1);
            let name = rest.split('=').next().unwrap_or_default();
            write!(f, " {sigil}{name}")?;
        }
        Ok(())
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
