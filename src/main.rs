//! PomodoroCat - a Pomodoro timer with a desktop pet
//!
//! `pomodorocat run` starts the timer app; every other command talks to the
//! running app over its local socket.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tokio::sync::oneshot;

use pomodorocat::cli::{Cli, Commands, Display, IpcClient, RunArgs, SettingsCommand};
use pomodorocat::ipc::{default_socket_path, IpcServer, RequestHandler};
use pomodorocat::notify::{BackgroundNotifier, DesktopNotifier, LogNotifier, Notifier};
use pomodorocat::preferences::{load_settings, save_settings, JsonFileStore};
use pomodorocat::sync::spawn_overlay;
use pomodorocat::App;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    let socket_path = match cli.socket {
        Some(path) => path,
        None => default_socket_path()?,
    };
    let settings_path = match cli.settings {
        Some(path) => path,
        None => JsonFileStore::default_path().context("home directory not found")?,
    };

    let client = IpcClient::with_socket_path(socket_path.clone());

    match cli.command {
        Some(Commands::Run(args)) => run_app(socket_path, settings_path, args).await?,
        Some(Commands::Start) => Display::show_command_result(&client.start().await?),
        Some(Commands::Pause) => Display::show_command_result(&client.pause().await?),
        Some(Commands::Toggle) => Display::show_command_result(&client.toggle().await?),
        Some(Commands::Reset) => Display::show_command_result(&client.reset().await?),
        Some(Commands::Show) => Display::show_command_result(&client.show().await?),
        Some(Commands::Hide) => Display::show_command_result(&client.hide().await?),
        Some(Commands::Status) => Display::show_status(&client.status().await?),
        Some(Commands::Direction { direction }) => {
            Display::show_command_result(&client.direction(direction).await?)
        }
        Some(Commands::Tray { action }) => {
            Display::show_command_result(&client.tray(action).await?)
        }
        Some(Commands::Settings { action }) => {
            let mut store = JsonFileStore::new(settings_path);
            match action {
                SettingsCommand::Show => {
                    Display::show_settings(&load_settings(&store), store.path());
                }
                SettingsCommand::Set(args) => {
                    let input = args.to_input();
                    if input.is_empty() {
                        anyhow::bail!("nothing to change; see 'pomodorocat settings set --help'");
                    }

                    let settings = input.apply_to(&load_settings(&store))?;
                    save_settings(&mut store, &settings)?;
                    Display::show_settings(&settings, store.path());

                    if let Err(e) = client.settings_updated().await {
                        tracing::debug!(error = %e, "running app not notified");
                        Display::show_note("the new settings apply the next time PomodoroCat starts");
                    }
                }
            }
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Runs the app until it is told to quit or interrupted.
async fn run_app(socket_path: PathBuf, settings_path: PathBuf, args: RunArgs) -> Result<()> {
    let notifier: Box<dyn Notifier> = if args.no_notify {
        Box::new(LogNotifier)
    } else {
        Box::new(BackgroundNotifier::new(DesktopNotifier::new()))
    };
    let mut app = App::new(Box::new(JsonFileStore::new(settings_path)), notifier);

    let overlay = if args.no_overlay {
        None
    } else {
        let (overlay_tx, handle) =
            spawn_overlay(app.surface_sender()).context("Failed to start the pet overlay")?;
        app.attach_overlay(overlay_tx);
        Some(handle)
    };

    let server = IpcServer::new(&socket_path)?;
    let handler = RequestHandler::new(app.command_sender());
    let (stopped_tx, stopped_rx) = oneshot::channel::<()>();

    let controller = async move {
        app.run().await;
        let _ = stopped_tx.send(());
        Ok::<(), anyhow::Error>(())
    };
    let shutdown = async {
        let _ = stopped_rx.await;
    };

    tokio::select! {
        result = async { tokio::try_join!(controller, server.serve_until(handler, shutdown)) } => {
            result?;
        }
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            tracing::info!("interrupted");
        }
    }

    if let Some(handle) = overlay {
        match handle.join() {
            Ok(last) => tracing::debug!(visual = last.visual().as_str(), "overlay closed"),
            Err(_) => tracing::warn!("overlay thread panicked"),
        }
    }

    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}
