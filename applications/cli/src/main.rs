/// VibeWave - terminal music player
use anyhow::Context;
use clap::{Parser, Subcommand};
use crossbeam_channel::{never, select, unbounded, Receiver};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vibewave::{
    parse_line, AppConfig, Input, OutputDevice, Session, SessionOptions, TerminalView,
};
use vibewave_catalog::SongCatalog;
use vibewave_core::{View, ViewCommand};
use vibewave_playback::{AudioDevice, DeviceEvent, NullDevice, PlaybackController};
use vibewave_storage::{FileKeyValueStore, KeyValueStore, PlaylistStore};

#[derive(Parser)]
#[command(name = "vibewave")]
#[command(about = "VibeWave music player and playlist manager", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "VIBEWAVE_CONFIG")]
    config: Option<PathBuf>,

    /// Run without opening an audio device
    #[arg(long)]
    no_audio: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive player (default)
    Shell,
    /// Search the catalog and exit
    Search {
        /// Words to look for in titles and artists
        query: Vec<String>,
    },
    /// List saved playlists and exit
    Playlists,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't mix with the player output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vibewave=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    config.validate()?;

    tracing::info!("Catalog: {}", config.catalog.url);
    tracing::info!("Data directory: {}", config.storage.data_dir.display());

    let catalog = SongCatalog::new(config.catalog_config()).context("invalid catalog settings")?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let fetch_failure = runtime
        .block_on(catalog.try_fetch_all())
        .err()
        .map(|e| e.to_string());

    let store = PlaylistStore::open(
        FileKeyValueStore::new(config.storage.data_dir.clone()),
        config.storage.playlists_key.clone(),
    );

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            let (event_tx, event_rx) = unbounded();
            let device = OutputDevice::open(event_tx, cli.no_audio);
            let player = PlaybackController::new(device, config.playback_config());
            let options = SessionOptions {
                autoload_first_track: config.playback.autoload_first_track,
            };
            let view = TerminalView::new(io::stdout());
            let mut session = Session::new(catalog, store, player, view, options);
            run_shell(&mut session, event_rx, fetch_failure)
        }
        Commands::Search { query } => {
            let mut session = one_shot_session(catalog, store, &config);
            session.start(fetch_failure);
            session.dispatch(ViewCommand::Search {
                query: query.join(" "),
            });
            Ok(())
        }
        Commands::Playlists => {
            let mut session = one_shot_session(catalog, store, &config);
            session.start(fetch_failure);
            Ok(())
        }
    }
}

/// Session with silent output and no autoload, for commands that print
/// and exit
fn one_shot_session<S: KeyValueStore>(
    catalog: SongCatalog,
    store: PlaylistStore<S>,
    config: &AppConfig,
) -> Session<NullDevice, S, TerminalView<io::Stdout>> {
    let player = PlaybackController::new(NullDevice::new(), config.playback_config());
    let options = SessionOptions {
        autoload_first_track: false,
    };
    Session::new(catalog, store, player, TerminalView::new(io::stdout()), options)
}

/// Interactive loop: one thread reads stdin, device events arrive on
/// their own channel, and the session handles both in arrival order.
fn run_shell<S: KeyValueStore, V: View>(
    session: &mut Session<OutputDevice, S, V>,
    device_events: Receiver<DeviceEvent>,
    fetch_failure: Option<String>,
) -> anyhow::Result<()> {
    let (line_tx, line_rx) = unbounded::<String>();
    thread::Builder::new()
        .name("vibewave-stdin".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if line_tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read input");
                        break;
                    }
                }
            }
        })
        .context("failed to start input thread")?;

    println!("VibeWave - type `help` for commands");
    session.start(fetch_failure);
    settle_silent_device(session);
    prompt();

    let mut device_open = true;
    loop {
        let events = if device_open {
            device_events.clone()
        } else {
            never()
        };
        select! {
            recv(line_rx) -> line => {
                let Ok(line) = line else {
                    // stdin closed
                    break;
                };
                match parse_line(&line) {
                    Ok(Input::Command(command)) => {
                        session.dispatch(command);
                        settle_silent_device(session);
                    }
                    Ok(Input::Help) => println!("{}", vibewave::parse::HELP),
                    Ok(Input::Quit) => break,
                    Ok(Input::Empty) => {}
                    Err(e) => println!("error: {e}"),
                }
                prompt();
            }
            recv(events) -> event => match event {
                Ok(event) => session.handle_device_event(event),
                // The silent device has no sender; stop polling
                Err(_) => device_open = false,
            },
        }
    }

    if let Err(e) = session.device_mut().unload() {
        tracing::debug!(error = %e, "Failed to unload on exit");
    }
    tracing::info!("Goodbye");
    Ok(())
}

/// Feed the silent device's completions back before the next prompt
fn settle_silent_device<S: KeyValueStore, V: View>(session: &mut Session<OutputDevice, S, V>) {
    loop {
        let events = session.device_mut().take_events();
        if events.is_empty() {
            break;
        }
        for event in events {
            session.handle_device_event(event);
        }
    }
}

fn prompt() {
    print!("> ");
    if let Err(e) = io::stdout().flush() {
        tracing::debug!(error = %e, "Failed to flush prompt");
    }
}
