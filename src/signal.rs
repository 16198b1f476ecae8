//! Ctrl+C handling.
//!
//! The handler sets a process-wide [`CancelToken`]. Passing that token to
//! the engine turns an interrupt into a cooperative cancellation: the scan
//! stops between files and still delivers its `Completed` event, so the
//! partial report can be printed before exiting with code 130.
//!
//! ```rust,no_run
//! use dupescan::engine::{EngineConfig, ScanEngine};
//! use dupescan::signal::install_handler;
//!
//! let handler = install_handler();
//! let engine = ScanEngine::new(EngineConfig::default().with_cancel_token(handler.token()));
//! ```

use std::io::Write;
use std::sync::OnceLock;

use crate::engine::CancelToken;

/// Exit code for SIGINT: 128 + 2.
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Shutdown flag shared between the signal hook and the scan.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    token: CancelToken,
}

impl ShutdownHandler {
    /// Handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether Ctrl+C was pressed or shutdown was requested manually.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Request shutdown as if Ctrl+C had been pressed.
    pub fn request_shutdown(&self) {
        self.token.cancel();
    }

    /// Token to hand to the scan engine.
    #[must_use]
    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Clear the flag so the handler can be reused.
    pub fn reset(&self) {
        self.token.flag().store(false, std::sync::atomic::Ordering::SeqCst);
    }

    fn reset_and_clone(&self) -> Self {
        self.reset();
        self.clone()
    }
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install the process-wide Ctrl+C hook, or return the one already
/// installed with its flag cleared.
///
/// If the hook cannot be registered (another library owns it), an unhooked
/// handler is returned; it still supports [`ShutdownHandler::request_shutdown`].
pub fn install_handler() -> ShutdownHandler {
    GLOBAL_HANDLER
        .get_or_init(|| {
            let handler = ShutdownHandler::new();
            let token = handler.token();

            let hooked = ctrlc::set_handler(move || {
                token.cancel();
                let mut stderr = std::io::stderr();
                let _ = writeln!(stderr, "\nInterrupted. Finishing current file...");
                let _ = stderr.flush();
                log::info!("Shutdown signal received");
            });

            if let Err(e) = hooked {
                log::debug!("Ctrl+C handler unavailable, using unhooked handler: {}", e);
            }
            handler
        })
        .reset_and_clone()
}
