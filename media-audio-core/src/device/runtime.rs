use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::AudioError;
use crate::traits::audio_subsystem::AudioSubsystem;

/// Process-wide owner of one native audio subsystem.
///
/// Native init/quit are reference counted through [`RuntimeLease`]s: the
/// first lease initialises the library, dropping the last one quits it.
/// Nothing is initialised at construction time.
///
/// Share one `Arc<AudioRuntime>` between every endpoint of the process.
pub struct AudioRuntime {
    subsystem: Box<dyn AudioSubsystem>,
    leases: Mutex<usize>,
}

impl AudioRuntime {
    pub fn new<S: AudioSubsystem + 'static>(subsystem: S) -> Arc<Self> {
        Arc::new(Self {
            subsystem: Box::new(subsystem),
            leases: Mutex::new(0),
        })
    }

    pub fn subsystem(&self) -> &dyn AudioSubsystem {
        self.subsystem.as_ref()
    }

    /// Take a lease, initialising the native library if this is the first.
    pub fn acquire(self: &Arc<Self>) -> Result<RuntimeLease, AudioError> {
        let mut leases = self.leases.lock();
        if *leases == 0 {
            self.subsystem.init().map_err(AudioError::LibraryInitFailed)?;
            log::debug!("Native audio library initialised");
        }
        *leases += 1;
        Ok(RuntimeLease {
            runtime: Arc::clone(self),
        })
    }

    /// Number of live leases.
    pub fn active_leases(&self) -> usize {
        *self.leases.lock()
    }

    pub fn is_initialised(&self) -> bool {
        self.active_leases() > 0
    }

    fn release(&self) {
        let mut leases = self.leases.lock();
        *leases = leases.saturating_sub(1);
        if *leases == 0 {
            self.subsystem.quit();
            log::debug!("Native audio library shut down");
        }
    }
}

impl fmt::Debug for AudioRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioRuntime")
            .field("leases", &self.active_leases())
            .finish_non_exhaustive()
    }
}

/// Keeps the native library initialised while alive.
#[must_use]
pub struct RuntimeLease {
    runtime: Arc<AudioRuntime>,
}

impl RuntimeLease {
    pub fn runtime(&self) -> &Arc<AudioRuntime> {
        &self.runtime
    }
}

impl fmt::Debug for RuntimeLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeLease").finish_non_exhaustive()
    }
}

impl Drop for RuntimeLease {
    fn drop(&mut self) {
        self.runtime.release();
    }
}
