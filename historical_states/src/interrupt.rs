use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{ensure, Result};

use crate::error::Error;

/// Cooperative cancellation token.
///
/// Checked at every I/O boundary of a reconstruction. Pure in-memory work
/// (diff application, shuffling, table materialization) runs to completion
/// once started.
#[derive(Clone, Default)]
pub struct Interrupt {
    interrupted: Arc<AtomicBool>,
}

impl Interrupt {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::Relaxed)
    }

    pub fn check(&self) -> Result<()> {
        ensure!(!self.is_interrupted(), Error::Interrupted);
        Ok(())
    }
}
