use crate::error::{FetchError, Result};
use crate::http::{HttpClient, HttpConfig};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

/// Tor refuses NEWNYM more often than this.
pub const NEWNYM_INTERVAL: Duration = Duration::from_secs(10);

/// Source of proxied clients and fresh anonymizing circuits.
///
/// How the controller authenticates with the anonymity network is its own
/// business; the fetcher only asks for clients and rotations.
#[async_trait]
pub trait AnonymityController: Send + Sync {
    /// Build a client routed through the anonymizing proxy.
    fn proxied_client(&self, config: &HttpConfig) -> Result<HttpClient>;

    /// Whether a control channel is configured, i.e. `rotate_circuit` can succeed.
    fn rotates_circuits(&self) -> bool;

    /// Ask for a new circuit. `true` only if one was actually granted;
    /// a deferred or failed request logs why and returns `false`.
    async fn rotate_circuit(&self) -> bool;
}

/// Where the Tor control interface listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlChannel {
    /// `ControlPort`, reached on the same host as the SOCKS proxy.
    Port(u16),
    /// `ControlSocket`, a Unix domain socket path.
    Socket(PathBuf),
}

/// Controller for a local Tor daemon.
#[derive(Debug)]
pub struct TorController {
    ip: String,
    socks_port: u16,
    control: Option<ControlChannel>,
    password: String,
    last_newnym: Mutex<Option<Instant>>,
}

impl Default for TorController {
    fn default() -> Self {
        Self::new("127.0.0.1", 9050)
    }
}

impl TorController {
    pub fn new(ip: impl Into<String>, socks_port: u16) -> Self {
        Self {
            ip: ip.into(),
            socks_port,
            control: None,
            password: String::new(),
            last_newnym: Mutex::new(None),
        }
    }

    pub fn with_control(mut self, control: ControlChannel) -> Self {
        self.control = Some(control);
        self
    }

    /// `HashedControlPassword` secret, always sent as a quoted string.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn socks_port(&self) -> u16 {
        self.socks_port
    }

    pub fn control(&self) -> Option<&ControlChannel> {
        self.control.as_ref()
    }

    async fn send_newnym(&self, channel: &ControlChannel) -> Result<()> {
        match channel {
            ControlChannel::Port(port) => {
                let stream = TcpStream::connect((self.ip.as_str(), *port)).await?;
                signal_newnym(stream, &self.password).await
            }
            #[cfg(unix)]
            ControlChannel::Socket(path) => {
                let stream = tokio::net::UnixStream::connect(path).await?;
                signal_newnym(stream, &self.password).await
            }
            #[cfg(not(unix))]
            ControlChannel::Socket(path) => Err(FetchError::Control(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                format!("control sockets are not supported here: {}", path.display()),
            ))),
        }
    }
}

#[async_trait]
impl AnonymityController for TorController {
    fn proxied_client(&self, config: &HttpConfig) -> Result<HttpClient> {
        HttpClient::with_socks_proxy(config, &self.ip, self.socks_port)
    }

    fn rotates_circuits(&self) -> bool {
        self.control.is_some()
    }

    async fn rotate_circuit(&self) -> bool {
        let Some(channel) = &self.control else {
            return false;
        };

        // Held across the exchange so two rotations never race on the rate limit.
        let mut last = self.last_newnym.lock().await;
        if let Some(wait) = newnym_wait(*last, Instant::now()) {
            tracing::warn!(
                delay_secs = wait.as_secs_f64(),
                "Tor declined a new circuit for now; keeping the current one"
            );
            return false;
        }

        match self.send_newnym(channel).await {
            Ok(()) => {
                *last = Some(Instant::now());
                tracing::info!("New Tor circuit created");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not create a new Tor circuit; keeping the current one");
                false
            }
        }
    }
}

/// Time left before another NEWNYM will be honoured, if any.
fn newnym_wait(last: Option<Instant>, now: Instant) -> Option<Duration> {
    let elapsed = now.saturating_duration_since(last?);
    NEWNYM_INTERVAL.checked_sub(elapsed).filter(|wait| !wait.is_zero())
}

async fn signal_newnym<S>(stream: S, password: &str) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut stream = BufReader::new(stream);
    let auth = format!("AUTHENTICATE \"{}\"", escape_quoted(password));
    command(&mut stream, "AUTHENTICATE", &auth).await?;
    command(&mut stream, "SIGNAL NEWNYM", "SIGNAL NEWNYM").await?;
    if let Err(e) = command(&mut stream, "QUIT", "QUIT").await {
        tracing::debug!(error = %e, "Tor control channel closed uncleanly");
    }
    Ok(())
}

/// Send one control command and wait for its final reply line.
async fn command<S>(stream: &mut BufReader<S>, name: &'static str, line: &str) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(format!("{line}\r\n").as_bytes()).await?;
    stream.flush().await?;

    let mut reply = String::new();
    loop {
        reply.clear();
        if stream.read_line(&mut reply).await? == 0 {
            return Err(FetchError::Control(std::io::ErrorKind::UnexpectedEof.into()));
        }
        let reply = reply.trim_end();
        // "250-..." continues a multi-line reply
        if reply.as_bytes().get(3) == Some(&b'-') {
            continue;
        }
        if reply.starts_with("250") {
            return Ok(());
        }
        return Err(FetchError::ControlRejected {
            command: name,
            reply: reply.to_string(),
        });
    }
}

fn escape_quoted(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
