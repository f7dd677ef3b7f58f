use anyhow::{Context, Result};
use cantor_acquire::providers::{AzLyrics, Genius, LyricWiki, Lyrics007, MusixMatch};
use cantor_acquire::{
    output, AnonymityController, ControlChannel, FetchOptions, Fetcher, HttpConfig, LyricsProvider,
    TorController, DEFAULT_POOL_WIDTH,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "cantor")]
#[command(about = "Download every lyric of an artist, album by album")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_HASH"), ")"))]
struct Cli {
    /// Artist name, as written on the lyrics site
    artist: String,

    /// Lyrics site to fetch from
    #[arg(short, long, value_enum, default_value = "lyric-wiki")]
    provider: ProviderKind,

    /// Only albums whose title contains this text (case-insensitive)
    #[arg(short, long)]
    album: Option<String>,

    /// Only songs whose title contains this text (case-insensitive)
    #[arg(short, long)]
    song: Option<String>,

    /// Save under <FOLDER>/Cantor instead of ~/Documents/Cantor
    #[arg(short, long)]
    folder: Option<PathBuf>,

    /// Print the discography as JSON instead of saving files
    #[arg(long)]
    json: bool,

    /// Route requests through Tor
    #[arg(long)]
    tor: bool,

    /// Address of the Tor SOCKS proxy
    #[arg(long, default_value = "127.0.0.1")]
    tor_ip: String,

    /// Port of the Tor SOCKS proxy
    #[arg(long, default_value_t = 9050)]
    socks_port: u16,

    /// Tor control port; enables a new circuit per album
    #[arg(long, conflicts_with = "control_socket")]
    control_port: Option<u16>,

    /// Tor control socket path; enables a new circuit per album
    #[arg(long)]
    control_socket: Option<PathBuf>,

    /// Tor control password
    #[arg(long)]
    password: Option<String>,

    /// Songs fetched concurrently per album (without circuit rotation)
    #[arg(long, default_value_t = DEFAULT_POOL_WIDTH)]
    pool_width: usize,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long)]
    utc: bool,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Debug, Clone, PartialEq, Eq, clap::ValueEnum)]
enum ProviderKind {
    /// lyrics.wikia.com
    LyricWiki,
    /// azlyrics.com (artist found by search)
    AzLyrics,
    /// genius.com
    Genius,
    /// lyrics007.com (artist found by search)
    Lyrics007,
    /// musixmatch.com
    MusixMatch,
}

impl Cli {
    fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            pool_width: self.pool_width,
            http: HttpConfig {
                timeout: self.timeout.map(Duration::from_secs),
                ..HttpConfig::default()
            },
        }
    }

    fn tor_controller(&self) -> TorController {
        let mut tor = TorController::new(&self.tor_ip, self.socks_port);
        if let Some(port) = self.control_port {
            tor = tor.with_control(ControlChannel::Port(port));
        } else if let Some(path) = &self.control_socket {
            tor = tor.with_control(ControlChannel::Socket(path.clone()));
        }
        if let Some(password) = &self.password {
            tor = tor.with_password(password);
        }
        tor
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Map log level, suppressing noisy HTML-parsing crates at debug/trace
    let level = match cli.log_level {
        LogLevel::Error => "error",
        LogLevel::Warn  => "warn",
        LogLevel::Info  => "info",
        LogLevel::Debug => "debug,selectors=warn,html5ever=warn,hyper_util=info",
        LogLevel::Trace => "trace,selectors=warn,html5ever=warn,hyper_util=info",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Timestamp format: 2026-02-14 19:44:09.123 -08:00
    let time_format = "%Y-%m-%d %H:%M:%S%.3f %:z";

    if cli.utc {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new(time_format.to_string()))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(time_format.to_string()))
            .init();
    }

    match cli.provider {
        ProviderKind::LyricWiki => run(&cli, LyricWiki::default()).await,
        ProviderKind::AzLyrics => run(&cli, AzLyrics::default()).await,
        ProviderKind::Genius => run(&cli, Genius::default()).await,
        ProviderKind::Lyrics007 => run(&cli, Lyrics007::default()).await,
        ProviderKind::MusixMatch => run(&cli, MusixMatch::default()).await,
    }
}

async fn run<P: LyricsProvider>(cli: &Cli, provider: P) -> Result<()> {
    let options = cli.fetch_options();
    let fetcher = if cli.tor {
        let tor: Arc<dyn AnonymityController> = Arc::new(cli.tor_controller());
        Fetcher::with_anonymity(provider, tor, options)
    } else {
        Fetcher::new(provider, options)
    }
    .context("Failed to build HTTP client")?;

    let Some(discography) = fetcher
        .get_lyrics(&cli.artist, cli.album.as_deref(), cli.song.as_deref())
        .await
    else {
        tracing::info!(artist = %cli.artist, "Nothing to save");
        return Ok(());
    };

    let found = discography.songs().count();
    tracing::info!(
        artist = %discography.artist,
        albums = discography.len(),
        songs = found,
        "Discography downloaded"
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&discography)?);
        return Ok(());
    }

    let root = output::save_root(cli.folder.as_deref());
    let saved = output::save_discography(&discography, &root)
        .with_context(|| format!("Failed to save lyrics under {}", root.display()))?;
    tracing::info!(root = %root.display(), files = saved, "Lyrics saved");
    Ok(())
}
