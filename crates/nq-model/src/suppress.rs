//! Scoped suppression of model console output and display side effects.
//!
//! Both resources are RAII guards: acquisition marks the state, dropping the
//! guard restores it, including on early-return and panic unwind paths.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

static SILENCED: AtomicUsize = AtomicUsize::new(0);
static DISPLAY_ENGAGED: AtomicBool = AtomicBool::new(false);

use crate::{ModelError, ModelResult};

/// Per-invocation console silencing.
///
/// While any guard is alive, cooperative model code must not write to
/// stdout/stderr (command-backed models null their child stdio). Guards
/// nest: each worker holds its own, and the silence lifts only when the last
/// one drops, so concurrent node evaluations never leak suppression state
/// into each other.
#[derive(Debug)]
pub struct SilencedIo(());

impl SilencedIo {
    pub fn engage() -> Self {
        SILENCED.fetch_add(1, Ordering::SeqCst);
        Self(())
    }

    /// Whether any evaluation currently requests silence.
    pub fn active() -> bool {
        SILENCED.load(Ordering::SeqCst) > 0
    }
}

impl Drop for SilencedIo {
    fn drop(&mut self) {
        SILENCED.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Process-wide virtual-display token, engaged at most once per dispatch
/// batch.
///
/// Models that would open windows or render figures consult
/// [`HeadlessDisplay::active`] and render off-screen instead. Acquisition
/// fails if another batch already holds the token.
#[derive(Debug)]
pub struct HeadlessDisplay(());

impl HeadlessDisplay {
    pub fn acquire() -> ModelResult<Self> {
        if DISPLAY_ENGAGED.swap(true, Ordering::SeqCst) {
            return Err(ModelError::DisplayBusy);
        }
        Ok(Self(()))
    }

    pub fn active() -> bool {
        DISPLAY_ENGAGED.load(Ordering::SeqCst)
    }
}

impl Drop for HeadlessDisplay {
    fn drop(&mut self) {
        DISPLAY_ENGAGED.store(false, Ordering::SeqCst);
    }
}
