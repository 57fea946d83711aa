//! # RouterOS Transport
//!
//! A single background task owns the API connection. Callers hold a cloneable
//! [`RouterHandle`] and exchange request/response messages with that task, so commands
//! are executed one at a time without any caller-visible lock.
//!
//! The connection is opened lazily and dropped on any I/O, protocol or timeout failure;
//! the next command reconnects. A `!trap` only fails the command that caused it.

use std::time::Duration;

use async_trait::async_trait;
use flowtally_common::config::Config;
use flowtally_common::rows::Row;
use flowtally_protocols::{Command, Reply, ReplySentence, sentence};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::device::{self, RouterDevice};
use crate::error::DeviceError;

const QUEUE_DEPTH: usize = 32;
const READ_BUFFER_SIZE: usize = 4096;
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(6);

#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub addr: String,
    pub user: String,
    pub password: String,
    /// Upper bound for connect + login + one command.
    pub command_timeout: Duration,
}

impl From<&Config> for RouterSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            addr: cfg.router_addr.clone(),
            user: cfg.router_user.clone(),
            password: cfg.router_password.clone(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }
}

struct Request {
    command: Command,
    reply: oneshot::Sender<Result<Reply, DeviceError>>,
}

/// Cloneable front of the connection task. The task ends, closing the connection,
/// once every handle is dropped.
#[derive(Clone)]
pub struct RouterHandle {
    tx: mpsc::Sender<Request>,
}

impl RouterHandle {
    /// Starts the connection task on the current tokio runtime.
    pub fn spawn(settings: RouterSettings) -> Self {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        tokio::spawn(serve(settings, rx));
        Self { tx }
    }

    pub async fn run(&self, command: Command) -> Result<Reply, DeviceError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Request { command, reply: reply_tx })
            .await
            .map_err(|_| DeviceError::Closed)?;
        reply_rx.await.map_err(|_| DeviceError::Closed)?
    }
}

#[async_trait]
impl RouterDevice for RouterHandle {
    async fn fetch_rows(&self, path: &str, filters: &[(&str, &str)]) -> Result<Vec<Row>, DeviceError> {
        let command = filters
            .iter()
            .fold(Command::new(path), |cmd, (key, value)| cmd.query(key, value));
        Ok(self.run(command).await?.rows)
    }

    async fn add_list_entry(&self, list: &str, address: &str) -> Result<(), DeviceError> {
        let command = Command::new(device::ADDRESS_LIST_ADD)
            .attr("list", list)
            .attr("address", address);
        self.run(command).await.map(|_| ())
    }

    async fn set_entry_disabled(&self, id: &str, disabled: bool) -> Result<(), DeviceError> {
        let command = Command::new(device::ADDRESS_LIST_SET)
            .attr("disabled", if disabled { "yes" } else { "no" })
            .attr(".id", id);
        self.run(command).await.map(|_| ())
    }
}

async fn serve(settings: RouterSettings, mut rx: mpsc::Receiver<Request>) {
    let mut session: Option<Session> = None;

    while let Some(request) = rx.recv().await {
        if request.reply.is_closed() {
            debug!(command = %request.command, "caller gave up before execution, skipping");
            continue;
        }
        let result = execute(&settings, &mut session, &request.command).await;
        let _ = request.reply.send(result);
    }

    debug!("all router handles dropped, closing session");
}

async fn execute(
    settings: &RouterSettings,
    session: &mut Option<Session>,
    command: &Command,
) -> Result<Reply, DeviceError> {
    debug!(command = %command, "router command");

    let outcome = timeout(settings.command_timeout, async {
        if session.is_none() {
            *session = Some(Session::open(settings).await?);
        }
        let Some(active) = session.as_mut() else {
            return Err(DeviceError::Closed);
        };
        active.call(command).await
    })
    .await;

    match outcome {
        Ok(Ok(reply)) => Ok(reply),
        Ok(Err(err @ DeviceError::Trap { .. })) => Err(err),
        Ok(Err(err)) => {
            warn!("dropping router session: {err}");
            *session = None;
            Err(err)
        }
        Err(_elapsed) => {
            warn!(command = %command, "router command timed out, dropping session");
            *session = None;
            Err(DeviceError::Timeout(settings.command_timeout))
        }
    }
}

struct Session {
    stream: TcpStream,
    buf: Vec<u8>,
}

impl Session {
    async fn open(settings: &RouterSettings) -> Result<Self, DeviceError> {
        if settings.addr.trim().is_empty() {
            return Err(DeviceError::NotConfigured);
        }

        let stream = TcpStream::connect(settings.addr.as_str()).await?;
        stream.set_nodelay(true)?;

        let mut session = Self {
            stream,
            buf: Vec::with_capacity(READ_BUFFER_SIZE),
        };
        session.login(&settings.user, &settings.password).await?;

        info!(addr = %settings.addr, "connected to router");
        Ok(session)
    }

    async fn login(&mut self, user: &str, password: &str) -> Result<(), DeviceError> {
        let command = Command::new("/login")
            .attr("name", user)
            .attr("password", password);

        let reply = match self.call(&command).await {
            Err(DeviceError::Trap { message, .. }) => return Err(DeviceError::Login(message)),
            other => other?,
        };

        // Pre-6.43 routers answer with an MD5 challenge instead of logging in.
        if reply.done.contains_key("ret") {
            return Err(DeviceError::Login(
                "router requested the legacy challenge login".to_string(),
            ));
        }
        Ok(())
    }

    async fn call(&mut self, command: &Command) -> Result<Reply, DeviceError> {
        self.stream.write_all(&command.encode()?).await?;

        let mut reply = Reply::default();
        let mut trap: Option<String> = None;

        loop {
            let words = self.read_sentence().await?;
            match ReplySentence::parse(&words)? {
                ReplySentence::Re(attrs) => reply.rows.push(attrs),
                ReplySentence::Empty => {}
                ReplySentence::Trap(attrs) => {
                    trap = Some(attrs.get("message").cloned().unwrap_or_default());
                }
                ReplySentence::Fatal(reason) => return Err(DeviceError::Fatal(reason)),
                ReplySentence::Done(attrs) => {
                    reply.done = attrs;
                    break;
                }
            }
        }

        match trap {
            Some(message) => Err(DeviceError::Trap {
                command: command.to_string(),
                message,
            }),
            None => Ok(reply),
        }
    }

    async fn read_sentence(&mut self) -> Result<Vec<String>, DeviceError> {
        loop {
            if let Some((words, used)) = sentence::decode_sentence(&self.buf)? {
                self.buf.drain(..used);
                return Ok(words);
            }
            if self.stream.read_buf(&mut self.buf).await? == 0 {
                return Err(DeviceError::Io(std::io::ErrorKind::UnexpectedEof.into()));
            }
        }
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
