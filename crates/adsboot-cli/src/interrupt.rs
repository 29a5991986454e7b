//! Ctrl-C handling for in-flight calls

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancels its token on Ctrl-C until dropped
pub struct Interrupt {
    token: CancellationToken,
    listener: JoinHandle<()>,
}

impl Interrupt {
    pub fn arm() -> Self {
        let token = CancellationToken::new();
        let trigger = token.clone();
        let listener = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("Interrupt received, cancelling request");
                trigger.cancel();
            }
        });
        Self { token, listener }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Drop for Interrupt {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
