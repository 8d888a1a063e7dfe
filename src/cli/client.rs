//! IPC client for talking to a running PomodoroCat.
//!
//! This module provides:
//! - Unix Domain Socket client
//! - Request/response handling
//! - Connection retry logic
//! - Timeout handling

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;

use crate::ipc::default_socket_path;
use crate::tray::TrayAction;
use crate::types::{CountDirection, IpcRequest, IpcResponse};

// ============================================================================
// Constants
// ============================================================================

/// Connection timeout in seconds
const CONNECTION_TIMEOUT_SECS: u64 = 5;

/// Read/write timeout in seconds
const IO_TIMEOUT_SECS: u64 = 5;

/// Maximum response size in bytes (64KB)
const MAX_RESPONSE_SIZE: usize = 65536;

/// Maximum retry attempts
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds (base delay, multiplied by attempt number)
const RETRY_DELAY_MS: u64 = 500;

// ============================================================================
// IpcClient
// ============================================================================

/// IPC client for the running app.
pub struct IpcClient {
    /// Socket path
    socket_path: PathBuf,
    /// Connection timeout
    timeout: Duration,
}

impl IpcClient {
    /// Creates a new IPC client with default socket path.
    pub fn new() -> Result<Self> {
        Ok(Self::with_socket_path(default_socket_path()?))
    }

    /// Creates a new IPC client with a custom socket path.
    pub fn with_socket_path(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            timeout: Duration::from_secs(CONNECTION_TIMEOUT_SECS),
        }
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    pub async fn start(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Start).await
    }

    pub async fn pause(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Pause).await
    }

    pub async fn toggle(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Toggle).await
    }

    pub async fn reset(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Reset).await
    }

    pub async fn show(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Show).await
    }

    pub async fn hide(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Hide).await
    }

    /// Sends a status query.
    pub async fn status(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Status).await
    }

    /// Switches the counting direction.
    pub async fn direction(&self, direction: CountDirection) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Direction { direction })
            .await
    }

    /// Sends a tray menu action by its menu item id.
    pub async fn tray(&self, action: TrayAction) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Tray {
            action: action.id().to_string(),
        })
        .await
    }

    /// Tells the app to reload its settings. Tried once: the app may simply
    /// not be running.
    pub async fn settings_updated(&self) -> Result<IpcResponse> {
        self.send_request(&IpcRequest::SettingsUpdated).await
    }

    /// Sends a request with retry logic.
    async fn send_request_with_retry(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut attempt = 1;

        loop {
            match self.send_request(request).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < MAX_RETRIES => {
                    tracing::warn!(attempt, max = MAX_RETRIES, error = %e, "request failed, retrying");
                    let delay = Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt));
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Sends a single request.
    async fn send_request(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut stream = timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .context("Connection timed out")?
            .context("PomodoroCat is not running. Start it with 'pomodorocat run'")?;

        let request_json = serde_json::to_string(request).context("Failed to serialize request")?;

        timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            stream.write_all(request_json.as_bytes()),
        )
        .await
        .context("Write timed out")?
        .context("Failed to send request")?;

        timeout(Duration::from_secs(IO_TIMEOUT_SECS), stream.flush())
            .await
            .context("Flush timed out")?
            .context("Failed to flush request")?;

        // Shutdown write side to signal end of request
        stream.shutdown().await.context("Failed to shut down write side")?;

        let mut buffer = vec![0u8; MAX_RESPONSE_SIZE];
        let n = timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            stream.read(&mut buffer),
        )
        .await
        .context("Read timed out")?
        .context("Failed to receive response")?;

        if n == 0 {
            anyhow::bail!("No response from PomodoroCat");
        }

        let response: IpcResponse =
            serde_json::from_slice(&buffer[..n]).context("Failed to parse response")?;

        if !response.is_success() {
            anyhow::bail!("{}", response.message);
        }

        Ok(response)
    }
}

// ============================================================================
// Tests
// ============================================================================
