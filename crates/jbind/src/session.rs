//! Session — exclusive owner of the foreign runtime instance
//!
//! The underlying runtime forbids more than one live instance per process,
//! so the session is a single explicitly-owned value: non-copyable, created
//! once through a [`RuntimeLauncher`], guarded by a process-wide slot, and
//! torn down on every exit path by scoped ownership. Callers that need
//! shared access pass a `&Session` around; there is no hidden global.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::class::Class;
use crate::error::{Error, Result};
use crate::runtime::{ForeignRuntime, RuntimeLauncher, STATUS_EEXIST};
use crate::string::JString;

/// Ordered bootstrap flags passed through to the foreign runtime.
///
/// An empty list is valid and means runtime defaults; flags are not parsed
/// or validated here.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    flags: Vec<String>,
}

impl SessionOptions {
    /// Empty option list (runtime defaults).
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one runtime flag string.
    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.push(flag.into());
        self
    }

    /// The flags in the order they were added.
    pub fn flags(&self) -> &[String] {
        &self.flags
    }
}

// One live session per process; the runtime cannot host two instances.
static SESSION_SLOT: AtomicBool = AtomicBool::new(false);

struct SlotGuard;

impl Drop for SlotGuard {
    fn drop(&mut self) {
        SESSION_SLOT.store(false, Ordering::Release);
    }
}

/// Exclusive owner of a live foreign runtime instance.
///
/// Calls are synchronous and issued in program order; the session provides
/// no synchronization of its own, so callers sharing it across threads must
/// serialize access externally, and the underlying runtime must support
/// calls from threads other than the creating one before any are made.
///
/// Dropping (or [`close`](Session::close)-ing) the session releases the
/// process slot and the runtime reference; the runtime itself is destroyed
/// once the last handle sharing it is gone, mirroring its bootstrap.
pub struct Session {
    vm: Arc<dyn ForeignRuntime>,
    _slot: SlotGuard,
}

impl Session {
    /// Bootstrap the foreign runtime and take ownership of it.
    ///
    /// Fails with [`Error::Creation`] carrying [`STATUS_EEXIST`] if another
    /// session is live in this process, or carrying the launcher's status
    /// code if the runtime itself failed to come up.
    pub fn open(launcher: &dyn RuntimeLauncher, options: SessionOptions) -> Result<Self> {
        if SESSION_SLOT.swap(true, Ordering::AcqRel) {
            return Err(Error::Creation {
                status: STATUS_EEXIST,
            });
        }
        let slot = SlotGuard;
        let vm = launcher
            .launch(options.flags())
            .map_err(|status| Error::Creation { status })?;
        Ok(Self { vm, _slot: slot })
    }

    /// Resolve a class identity by fully-qualified binary name.
    pub fn find_class(&self, name: &str) -> Result<Class> {
        let raw = self.vm.find_class(name).ok_or_else(|| Error::ClassNotFound {
            class: name.to_string(),
        })?;
        Ok(Class::new(self.vm.clone(), raw, name))
    }

    /// Create a foreign string from caller-side text.
    pub fn new_string(&self, text: &str) -> Result<JString> {
        JString::make(self.vm.clone(), text)
    }

    /// The raw runtime interface, for functionality this layer does not wrap.
    pub fn runtime(&self) -> &Arc<dyn ForeignRuntime> {
        &self.vm
    }

    /// Tear the session down.
    ///
    /// Consuming `self` makes any use after close unrepresentable; plain
    /// drop performs the same teardown on early-return and error paths.
    pub fn close(self) {}
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}
