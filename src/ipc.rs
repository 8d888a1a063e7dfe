//! Local command socket for the running app.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - Request handler that forwards requests to the controller
//! - One request and one response per connection

use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tokio::time::{timeout, Duration};

use crate::app::AppCommand;
use crate::preferences::store::APP_DIR;
use crate::sync::SurfaceCommand;
use crate::tray::TrayAction;
use crate::types::{IpcRequest, IpcResponse, TimerSnapshot};

// ============================================================================
// Constants
// ============================================================================

/// Socket file name under the app directory
pub const SOCKET_FILE: &str = "pomodorocat.sock";

/// Maximum request size in bytes (4KB)
const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

/// Returns `~/.pomodorocat/pomodorocat.sock`.
pub fn default_socket_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("home directory not found")?;
    Ok(home.join(APP_DIR).join(SOCKET_FILE))
}

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,

    /// Client hung up before sending anything
    #[error("Connection closed by client")]
    Closed,

    /// The controller is no longer accepting commands
    #[error("App is shutting down")]
    AppStopped,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// If the socket file already exists, it will be removed before binding.
    pub fn new(socket_path: &Path) -> Result<Self> {
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        tracing::info!(path = %socket_path.display(), "IPC server listening");

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Receives and deserializes an IPC request from the stream.
    ///
    /// Applies a read timeout to prevent blocking indefinitely.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = vec![0u8; MAX_REQUEST_SIZE];

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            stream.read(&mut buffer),
        )
        .await;

        let n = match read_result {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        };

        if n == 0 {
            return Err(IpcError::Closed.into());
        }
        if n == MAX_REQUEST_SIZE {
            return Err(IpcError::RequestTooLarge.into());
        }

        let request: IpcRequest = serde_json::from_slice(&buffer[..n])
            .with_context(|| "Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends an IPC response to the stream.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;

        Ok(())
    }

    /// Accepts connections forever, handling each on its own task.
    pub async fn serve(self, handler: RequestHandler) -> Result<()> {
        self.serve_until(handler, std::future::pending()).await
    }

    /// Accepts connections until `shutdown` completes, then lets the
    /// connections already accepted finish their response.
    pub async fn serve_until<F>(self, handler: RequestHandler, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                accepted = self.accept() => {
                    connections.spawn(handle_connection(accepted?, handler.clone()));
                }
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        tracing::debug!(open = connections.len(), "IPC server stopping");
        let drained = timeout(Duration::from_secs(READ_TIMEOUT_SECS), async {
            while connections.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            tracing::warn!("open IPC connections did not finish, dropping them");
        }
        Ok(())
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

async fn handle_connection(mut stream: UnixStream, handler: RequestHandler) {
    let response = match IpcServer::receive_request(&mut stream).await {
        Ok(request) => {
            tracing::debug!(?request, "IPC request received");
            handler.handle(request).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "invalid IPC request");
            IpcResponse::error(format!("Invalid request: {e:#}"))
        }
    };

    if let Err(e) = IpcServer::send_response(&mut stream, &response).await {
        tracing::debug!(error = %e, "failed to send IPC response");
    }
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Forwards IPC requests to the controller.
#[derive(Clone)]
pub struct RequestHandler {
    commands: mpsc::UnboundedSender<AppCommand>,
}

impl RequestHandler {
    pub fn new(commands: mpsc::UnboundedSender<AppCommand>) -> Self {
        Self { commands }
    }

    /// Handles an IPC request and returns the appropriate response.
    ///
    /// The response carries the snapshot taken right after the command.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        let (command, message) = match request {
            IpcRequest::Start => (
                Some(AppCommand::Surface(SurfaceCommand::RequestStart)),
                "Timer started".to_string(),
            ),
            IpcRequest::Pause => (
                Some(AppCommand::Surface(SurfaceCommand::RequestPause)),
                "Timer paused".to_string(),
            ),
            IpcRequest::Toggle => (Some(AppCommand::Toggle), "Timer toggled".to_string()),
            IpcRequest::Reset => (Some(AppCommand::Reset), "Timer reset".to_string()),
            IpcRequest::Show => (
                Some(AppCommand::Surface(SurfaceCommand::RequestShow)),
                "Overlay shown".to_string(),
            ),
            IpcRequest::Hide => (
                Some(AppCommand::Surface(SurfaceCommand::RequestHide)),
                "Overlay hidden".to_string(),
            ),
            IpcRequest::Direction { direction } => (
                Some(AppCommand::SetDirection(direction)),
                format!("Counting direction set to {direction}"),
            ),
            IpcRequest::SettingsUpdated => {
                (Some(AppCommand::SettingsUpdated), "Settings reloaded".to_string())
            }
            IpcRequest::Tray { action } => return self.handle_tray(&action).await,
            IpcRequest::Status => (None, String::new()),
        };

        if let Some(command) = command {
            if self.commands.send(command).is_err() {
                return IpcResponse::error(IpcError::AppStopped.to_string());
            }
        }

        match self.status().await {
            Ok(snapshot) => IpcResponse::success(message, Some(snapshot)),
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    /// Runs a tray menu item. `quit` answers without a snapshot, since the
    /// controller stops right after.
    async fn handle_tray(&self, id: &str) -> IpcResponse {
        let Some(action) = TrayAction::from_id(id) else {
            return IpcResponse::error(format!("Unknown tray action: {id}"));
        };
        tracing::info!(action = %action, "tray action");

        let Some(command) = action.to_command() else {
            return match self.status().await {
                Ok(snapshot) => IpcResponse::success(action.label(), Some(snapshot)),
                Err(e) => IpcResponse::error(e.to_string()),
            };
        };

        let quitting = matches!(command, AppCommand::Quit);
        if self.commands.send(command).is_err() {
            return IpcResponse::error(IpcError::AppStopped.to_string());
        }
        if quitting {
            return IpcResponse::success("PomodoroCat is quitting", None);
        }

        match self.status().await {
            Ok(snapshot) => IpcResponse::success(action.label(), Some(snapshot)),
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    async fn status(&self) -> Result<TimerSnapshot, IpcError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(AppCommand::Status(reply_tx))
            .map_err(|_| IpcError::AppStopped)?;
        reply_rx.await.map_err(|_| IpcError::AppStopped)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::engine::ManualTicker;
    use crate::notify::MockNotifier;
    use crate::preferences::MemoryStore;
    use crate::types::{CountDirection, TimerMode};
    use tempfile::TempDir;

    // ------------------------------------------------------------------------
    // Helper functions
    // ------------------------------------------------------------------------

    fn create_temp_socket_path() -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.sock");
        (dir, path)
    }

    fn spawn_app() -> (mpsc::UnboundedSender<AppCommand>, tokio::task::JoinHandle<()>) {
        let app = App::with_scheduler(
            Box::new(MemoryStore::new()),
            Box::new(MockNotifier::new()),
            |_| Box::new(ManualTicker::new()),
        );
        let commands = app.command_sender();
        (commands, tokio::spawn(app.run()))
    }

    async fn roundtrip(path: &Path, payload: &[u8]) -> IpcResponse {
        let mut stream = UnixStream::connect(path).await.unwrap();
        stream.write_all(payload).await.unwrap();
        stream.shutdown().await.unwrap();

        let mut buffer = Vec::new();
        stream.read_to_end(&mut buffer).await.unwrap();
        serde_json::from_slice(&buffer).unwrap()
    }

    // ------------------------------------------------------------------------
    // IpcServer Tests
    // ------------------------------------------------------------------------

    mod ipc_server_tests {
        use super::*;

        #[tokio::test]
        async fn test_server_creation() {
            let (_dir, socket_path) = create_temp_socket_path();
            let server = IpcServer::new(&socket_path);

            assert!(server.is_ok());
            assert!(socket_path.exists());
        }

        #[tokio::test]
        async fn test_server_removes_existing_socket() {
            let (_dir, socket_path) = create_temp_socket_path();
            std::fs::write(&socket_path, "stale").unwrap();

            assert!(IpcServer::new(&socket_path).is_ok());
        }

        #[tokio::test]
        async fn test_server_creates_parent_directory() {
            let dir = tempfile::tempdir().unwrap();
            let socket_path = dir.path().join("subdir").join("test.sock");

            let server = IpcServer::new(&socket_path).unwrap();
            assert_eq!(server.socket_path(), socket_path);
        }

        #[tokio::test]
        async fn test_receive_request_direction() {
            let (_dir, socket_path) = create_temp_socket_path();
            let server = IpcServer::new(&socket_path).unwrap();

            let client_path = socket_path.clone();
            let client_handle = tokio::spawn(async move {
                let mut stream = UnixStream::connect(&client_path).await.unwrap();
                stream
                    .write_all(br#"{"command":"direction","direction":"countup"}"#)
                    .await
                    .unwrap();
                stream.flush().await.unwrap();
            });

            let mut stream = server.accept().await.unwrap();
            let request = IpcServer::receive_request(&mut stream).await.unwrap();

            assert_eq!(
                request,
                IpcRequest::Direction {
                    direction: CountDirection::Countup
                }
            );
            client_handle.await.unwrap();
        }

        #[tokio::test]
        async fn test_receive_request_invalid_json() {
            let (_dir, socket_path) = create_temp_socket_path();
            let server = IpcServer::new(&socket_path).unwrap();

            let client_path = socket_path.clone();
            let _client = tokio::spawn(async move {
                let mut stream = UnixStream::connect(&client_path).await.unwrap();
                stream.write_all(b"not valid json").await.unwrap();
                stream.flush().await.unwrap();
            });

            let mut stream = server.accept().await.unwrap();
            assert!(IpcServer::receive_request(&mut stream).await.is_err());
        }

        #[tokio::test]
        async fn test_receive_request_too_large() {
            let (_dir, socket_path) = create_temp_socket_path();
            let server = IpcServer::new(&socket_path).unwrap();

            let client_path = socket_path.clone();
            let _client = tokio::spawn(async move {
                let mut stream = UnixStream::connect(&client_path).await.unwrap();
                stream.write_all(&vec![b' '; MAX_REQUEST_SIZE * 2]).await.ok();
            });

            let mut stream = server.accept().await.unwrap();
            // Give the client time to fill the socket buffer.
            tokio::time::sleep(Duration::from_millis(50)).await;
            let err = IpcServer::receive_request(&mut stream).await.unwrap_err();
            assert!(err.to_string().contains("too large"));
        }

        #[tokio::test]
        async fn test_server_drop_cleanup() {
            let (_dir, socket_path) = create_temp_socket_path();

            {
                let _server = IpcServer::new(&socket_path).unwrap();
                assert!(socket_path.exists());
            }

            assert!(!socket_path.exists());
        }
    }

    // ------------------------------------------------------------------------
    // RequestHandler Tests
    // ------------------------------------------------------------------------

    mod request_handler_tests {
        use super::*;

        #[tokio::test]
        async fn test_handle_status() {
            let (commands, _app) = spawn_app();
            let handler = RequestHandler::new(commands);

            let response = handler.handle(IpcRequest::Status).await;

            assert!(response.is_success());
            let data = response.data.unwrap();
            assert_eq!(data.mode, TimerMode::Work);
            assert_eq!(data.remaining_seconds, 1500);
            assert!(!data.is_running);
        }

        #[tokio::test]
        async fn test_handle_start_returns_fresh_snapshot() {
            let (commands, _app) = spawn_app();
            let handler = RequestHandler::new(commands);

            let response = handler.handle(IpcRequest::Start).await;

            assert!(response.is_success());
            assert_eq!(response.message, "Timer started");
            assert!(response.data.unwrap().is_running);
        }

        #[tokio::test]
        async fn test_handle_direction() {
            let (commands, _app) = spawn_app();
            let handler = RequestHandler::new(commands);

            let response = handler
                .handle(IpcRequest::Direction {
                    direction: CountDirection::Countup,
                })
                .await;

            let data = response.data.unwrap();
            assert_eq!(data.direction, CountDirection::Countup);
            assert_eq!(data.remaining_seconds, 0);
        }

        #[tokio::test]
        async fn test_handle_tray_start_and_hide() {
            let (commands, _app) = spawn_app();
            let handler = RequestHandler::new(commands);

            let response = handler
                .handle(IpcRequest::Tray {
                    action: "start-timer".to_string(),
                })
                .await;
            assert!(response.is_success());
            assert_eq!(response.message, "Start Timer");
            assert!(response.data.unwrap().is_running);

            let response = handler
                .handle(IpcRequest::Tray {
                    action: "show-app".to_string(),
                })
                .await;
            assert_eq!(response.message, "Show App");
            assert!(response.data.is_some());
        }

        #[tokio::test]
        async fn test_handle_tray_unknown_action() {
            let (commands, _app) = spawn_app();
            let handler = RequestHandler::new(commands);

            let response = handler
                .handle(IpcRequest::Tray {
                    action: "settings".to_string(),
                })
                .await;

            assert!(!response.is_success());
            assert_eq!(response.message, "Unknown tray action: settings");
        }

        #[tokio::test]
        async fn test_handle_tray_quit_stops_app() {
            let (commands, app) = spawn_app();
            let handler = RequestHandler::new(commands);

            let response = handler
                .handle(IpcRequest::Tray {
                    action: "quit".to_string(),
                })
                .await;

            assert!(response.is_success());
            assert!(response.data.is_none());
            app.await.unwrap();

            let response = handler.handle(IpcRequest::Status).await;
            assert_eq!(response.message, "App is shutting down");
        }

        #[tokio::test]
        async fn test_handle_after_quit_is_error() {
            let (commands, app) = spawn_app();
            commands.send(AppCommand::Quit).unwrap();
            app.await.unwrap();

            let handler = RequestHandler::new(commands);
            let response = handler.handle(IpcRequest::Pause).await;

            assert!(!response.is_success());
            assert_eq!(response.message, "App is shutting down");
        }
    }

    // ------------------------------------------------------------------------
    // End-to-end over the socket
    // ------------------------------------------------------------------------

    mod serve_tests {
        use super::*;

        #[tokio::test]
        async fn test_serve_round_trip() {
            let (_dir, socket_path) = create_temp_socket_path();
            let (commands, _app) = spawn_app();
            let server = IpcServer::new(&socket_path).unwrap();
            let _server = tokio::spawn(server.serve(RequestHandler::new(commands)));

            let response = roundtrip(&socket_path, br#"{"command":"toggle"}"#).await;
            assert!(response.is_success());
            assert!(response.data.unwrap().is_running);

            let response = roundtrip(&socket_path, br#"{"command":"status"}"#).await;
            assert!(response.data.unwrap().is_running);
        }

        #[tokio::test]
        async fn test_quit_response_arrives_before_server_stops() {
            let (_dir, socket_path) = create_temp_socket_path();
            let app = App::with_scheduler(
                Box::new(MemoryStore::new()),
                Box::new(MockNotifier::new()),
                |_| Box::new(ManualTicker::new()),
            );
            let server = IpcServer::new(&socket_path).unwrap();
            let handler = RequestHandler::new(app.command_sender());
            let (stopped_tx, stopped_rx) = oneshot::channel::<()>();

            let controller = tokio::spawn(async move {
                app.run().await;
                let _ = stopped_tx.send(());
            });
            let served = tokio::spawn(server.serve_until(handler, async {
                let _ = stopped_rx.await;
            }));

            let response = roundtrip(&socket_path, br#"{"command":"tray","action":"quit"}"#).await;
            assert!(response.is_success());
            assert_eq!(response.message, "PomodoroCat is quitting");

            controller.await.unwrap();
            served.await.unwrap().unwrap();
            assert!(!socket_path.exists());
        }

        #[tokio::test]
        async fn test_serve_rejects_garbage() {
            let (_dir, socket_path) = create_temp_socket_path();
            let (commands, _app) = spawn_app();
            let server = IpcServer::new(&socket_path).unwrap();
            let _server = tokio::spawn(server.serve(RequestHandler::new(commands)));

            let response = roundtrip(&socket_path, br#"{"command":"explode"}"#).await;

            assert!(!response.is_success());
            assert!(response.message.starts_with("Invalid request"));
        }
    }
}
