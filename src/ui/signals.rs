use crate::error::{PaperGenError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Ctrl+C handling for a generation run.
///
/// The first interrupt lets the paper being rendered finish, then the run
/// stops with [`PaperGenError::Cancelled`] and its partial output is removed.
/// A second interrupt exits at once with status 130.
pub struct GracefulShutdown {
    interrupts: Arc<AtomicUsize>,
}

impl GracefulShutdown {
    pub fn new() -> Result<Self> {
        let interrupts = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&interrupts);

        ctrlc::set_handler(move || {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                eprintln!("\n🛑 Finishing the current paper, then stopping (Ctrl+C again to quit now)");
            } else {
                eprintln!("\n💀 Quitting without cleanup");
                std::process::exit(130);
            }
        })
        .map_err(|e| PaperGenError::Config {
            message: format!("Failed to install Ctrl+C handler: {}", e),
        })?;

        Ok(Self { interrupts })
    }

    /// No handler is installed, so several runs can share a process.
    pub fn new_for_test() -> Self {
        Self {
            interrupts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.interrupts.load(Ordering::SeqCst) == 0
    }

    pub fn check_shutdown(&self) -> Result<()> {
        if self.is_running() {
            Ok(())
        } else {
            Err(PaperGenError::Cancelled)
        }
    }

    /// Same effect as the first Ctrl+C.
    pub fn request_shutdown(&self) {
        self.interrupts.fetch_max(1, Ordering::SeqCst);
    }

    /// Run one unit of work (rendering a paper) between cancellation checks.
    /// Work already started is allowed to finish.
    pub fn with_shutdown_check<F, R>(&self, operation: F) -> Result<R>
    where
        F: FnOnce() -> Result<R>,
    {
        self.check_shutdown()?;
        let result = operation()?;
        self.check_shutdown()?;
        Ok(result)
    }
}
