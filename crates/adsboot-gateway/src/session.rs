//! Session provider seam
//!
//! Credentials live outside this crate. The gateway only asks whether a user
//! session is active before issuing a call.

use std::sync::atomic::{AtomicBool, Ordering};

pub trait SessionProvider: Send + Sync {
    fn is_session_active(&self) -> bool;
}

/// Session flag owned by the host, toggled on login and logout
#[derive(Debug, Default)]
pub struct StaticSession {
    active: AtomicBool,
}

impl StaticSession {
    pub fn new(active: bool) -> Self {
        Self {
            active: AtomicBool::new(active),
        }
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Relaxed);
    }
}

impl SessionProvider for StaticSession {
    fn is_session_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }
}
