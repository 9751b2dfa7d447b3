use std::io::{self, Write};
use std::net::UdpSocket;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use lumigrid_core::animation::{DEFAULT_CHASE_STEPS, DEFAULT_PIXEL_COUNT, validate_pixel_count};
use lumigrid_core::{
    AnimationDriver, CancelToken, CodecError, Color, ConfigError, DEFAULT_HOST, DEFAULT_PORT,
    Destination, DriverConfig, FrameBuffer, FrameSink, MAX_PIXEL_COUNT, Pattern, SocketMode,
    UdpSender, decode,
};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

mod output;

use output::{FrameRecord, JsonLinesSink, ReceivedRecord, decode_hex, describe, to_hex};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("LUMIGRID_BUILD_COMMIT"),
    ", ",
    env!("LUMIGRID_BUILD_DATE"),
    ")"
);
/// Receive timeout used to poll for interrupts while listening.
const LISTEN_POLL: Duration = Duration::from_millis(200);
const MAX_DATAGRAM: usize = 65_536;

#[derive(Parser, Debug)]
#[command(name = "lumigrid")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Control client for LumiGrid LED controllers over UDP.",
    long_about = None,
    after_help = "Examples:\n  lumigrid play --mode rainbow --count 100\n  lumigrid play --mode chase --host 192.168.4.1\n  lumigrid play --mode solid --color '#ff8800' --dry-run\n  lumigrid listen --port 4210 --count 100"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play an animation pattern on a controller.
    Play(PlayArgs),
    /// Receive frames, decode them and track the displayed buffer.
    Listen(ListenArgs),
    /// Decode one frame given as hex and print it as JSON.
    Decode {
        /// Frame bytes in hex, e.g. 030300ff0000
        hex: String,
    },
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// Controller IP address or host name
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Controller UDP port
    #[arg(long, default_value_t = DEFAULT_PORT, value_parser = clap::value_parser!(u16).range(1..))]
    port: u16,

    /// Animation pattern: rainbow, chase or solid
    #[arg(long, default_value_t = Pattern::Rainbow)]
    mode: Pattern,

    /// Number of LEDs on the strip
    #[arg(long, default_value_t = DEFAULT_PIXEL_COUNT)]
    count: u32,

    /// Chase steps to play
    #[arg(long, default_value_t = DEFAULT_CHASE_STEPS)]
    steps: u32,

    /// Delay between chase steps in milliseconds
    #[arg(long, default_value_t = 50)]
    delay_ms: u64,

    /// Pattern color as R,G,B or #RRGGBB (solid, chase)
    #[arg(long)]
    color: Option<Color>,

    /// Reuse one socket for the whole run
    #[arg(long)]
    persistent_socket: bool,

    /// Print frames as JSON lines instead of sending them
    #[arg(long)]
    dry_run: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ListenArgs {
    /// Local address to bind
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// UDP port to listen on
    #[arg(long, default_value_t = DEFAULT_PORT, value_parser = clap::value_parser!(u16).range(1..))]
    port: u16,

    /// Number of LEDs tracked in the frame buffer
    #[arg(long, default_value_t = DEFAULT_PIXEL_COUNT)]
    count: u32,

    /// Stop after this many datagrams
    #[arg(long)]
    max_messages: Option<u64>,

    /// Print one JSON object per datagram
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Play(args) => cmd_play(args, cli.quiet),
        Commands::Listen(args) => cmd_listen(args, cli.quiet),
        Commands::Decode { hex } => cmd_decode(&hex),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let default_filter = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

fn cmd_play(args: PlayArgs, quiet: bool) -> Result<(), CliError> {
    let config = DriverConfig {
        pattern: args.mode,
        count: args.count,
        steps: args.steps,
        step_delay: Duration::from_millis(args.delay_ms),
        color: args.color,
    };
    config.validate().map_err(count_error)?;

    let destination = Destination::new(args.host, args.port);
    let sink: Box<dyn FrameSink> = if args.dry_run {
        Box::new(JsonLinesSink::new(io::stdout()))
    } else {
        destination.resolve().map_err(|err| {
            CliError::new(
                err.to_string(),
                Some("check --host; use an IP address or a resolvable name".to_string()),
            )
        })?;
        let mode = if args.persistent_socket {
            SocketMode::Persistent
        } else {
            SocketMode::OneShot
        };
        Box::new(UdpSender::new(destination.clone(), mode))
    };

    let cancel = install_interrupt_handler()?;
    let mut driver = AnimationDriver::new(config, sink);
    let summary = driver
        .run(&cancel)
        .with_context(|| format!("{} pattern failed", driver.config().pattern))?;

    if let Some(err) = &summary.cleanup_error {
        eprintln!("warning: could not restore safe state: {}", err);
    }
    if args.json {
        let json = serde_json::to_string(&summary).context("JSON serialization failed")?;
        println!("{}", json);
    }
    if !quiet {
        if summary.interrupted && summary.cleanup_error.is_none() {
            eprintln!("Stopping... display cleared");
        }
        let target = if args.dry_run {
            "dry run".to_string()
        } else {
            destination.to_string()
        };
        eprintln!(
            "OK: {} {} frames -> {} ({} failed)",
            summary.pattern, summary.frames_sent, target, summary.send_failures
        );
    }
    Ok(())
}

fn count_error(err: ConfigError) -> CliError {
    CliError::new(
        err.to_string(),
        Some(format!("use --count between 1 and {}", MAX_PIXEL_COUNT)),
    )
}

fn cmd_listen(args: ListenArgs, quiet: bool) -> Result<(), CliError> {
    validate_pixel_count(args.count).map_err(count_error)?;
    let mut frame_buffer = FrameBuffer::new(args.count as usize);

    let socket = UdpSocket::bind((args.bind.as_str(), args.port)).map_err(|err| {
        CliError::new(
            format!("cannot listen on {}:{}: {}", args.bind, args.port, err),
            Some("check --bind/--port; another listener may own the port".to_string()),
        )
    })?;
    socket
        .set_read_timeout(Some(LISTEN_POLL))
        .context("Failed to configure socket")?;
    let cancel = install_interrupt_handler()?;

    let local = socket.local_addr().context("Failed to read local address")?;
    info!("listening on {}", local);
    if !quiet {
        eprintln!(
            "Listening on {} ({} pixels)",
            local,
            frame_buffer.pixel_count()
        );
    }

    let mut datagram = vec![0u8; MAX_DATAGRAM];
    let mut received = 0u64;
    let mut rejected = 0u64;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    while !cancel.is_cancelled() && args.max_messages.is_none_or(|max| received < max) {
        let (len, peer) = match socket.recv_from(&mut datagram) {
            Ok(datagram_info) => datagram_info,
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                ) =>
            {
                continue;
            }
            Err(err) => return Err(anyhow::Error::new(err).context("receive failed").into()),
        };
        received += 1;

        let frame = &datagram[..len];
        let message = match decode(frame) {
            Ok(message) => message,
            Err(err) => {
                rejected += 1;
                warn!("dropping {}-byte datagram from {}: {}", len, peer, err);
                continue;
            }
        };
        frame_buffer.apply(&message);

        if args.json {
            let record = ReceivedRecord {
                received_at: now_rfc3339(),
                from: peer.to_string(),
                bytes: to_hex(frame),
                message: &message,
                shows: frame_buffer.shows(),
            };
            serde_json::to_writer(&mut out, &record).context("Failed to write output")?;
            writeln!(out).context("Failed to write output")?;
        } else {
            writeln!(out, "{} {}", peer, describe(&message)).context("Failed to write output")?;
        }
        out.flush().context("Failed to write output")?;
    }

    if !quiet {
        eprintln!(
            "OK: {} datagrams, {} rejected, {} shows",
            received,
            rejected,
            frame_buffer.shows()
        );
    }
    Ok(())
}

fn cmd_decode(hex: &str) -> Result<(), CliError> {
    let frame = decode_hex(hex).map_err(|err| {
        CliError::new(err, Some("pass the frame as hex, e.g. 030300ff0000".to_string()))
    })?;
    if let Err(err) = decode(&frame) {
        return Err(CliError::new(
            format!("invalid frame: {}", err),
            Some(decode_hint(&err).to_string()),
        ));
    }
    let record = FrameRecord::new(None, &frame);
    let json = serde_json::to_string(&record).context("JSON serialization failed")?;
    println!("{}", json);
    Ok(())
}

fn decode_hint(err: &CodecError) -> &'static str {
    match err {
        CodecError::TruncatedMessage { .. } | CodecError::LengthMismatch { .. } => {
            "the header length field must equal the number of payload bytes"
        }
        CodecError::UnknownMessageType { .. } => {
            "known types: 01 set_pixel, 02 set_range, 03 set_all, 04 show, 05 clear"
        }
        CodecError::InvalidPayloadLength { .. } => {
            "set_pixel carries 5 bytes, set_range 4 + 3 x count, set_all 3, show and clear none"
        }
        CodecError::ValueOutOfRange { .. } => "values must fit their wire width",
    }
}

fn install_interrupt_handler() -> Result<CancelToken, CliError> {
    let cancel = CancelToken::new();
    let handler = cancel.clone();
    ctrlc::set_handler(move || {
        info!("interrupt received");
        handler.cancel();
    })
    .map_err(|err| CliError::new(format!("cannot install interrupt handler: {}", err), None))?;
    Ok(cancel)
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
