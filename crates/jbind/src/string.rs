//! String handles — encoding bridge to the runtime's native strings
//!
//! The runtime's native string encoding is UTF-16; caller-side UTF-8 is
//! converted up on creation and back down on readback. The converted length
//! must fit the runtime's 32-bit signed maximum, checked before any
//! primitive call. By default the foreign string is released when the last
//! handle clone is dropped; `make_persistent` transfers ownership outward
//! and suppresses release.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::runtime::{ForeignRuntime, RawRef};

/// Maximum native-encoded string length the runtime can represent.
const MAX_ENCODED_LEN: usize = i32::MAX as usize;

/// Reject encoded lengths the runtime cannot represent.
fn check_encoded_len(len: usize) -> Result<()> {
    if len > MAX_ENCODED_LEN {
        return Err(Error::Encoding {
            reason: format!(
                "encoded length {} exceeds the maximum representable length {}",
                len, MAX_ENCODED_LEN
            ),
        });
    }
    Ok(())
}

struct StrInner {
    vm: Arc<dyn ForeignRuntime>,
    raw: RawRef,
    persistent: AtomicBool,
}

impl Drop for StrInner {
    fn drop(&mut self) {
        if !self.persistent.load(Ordering::Acquire) {
            self.vm.delete_local_ref(self.raw);
        }
    }
}

/// Handle to a foreign string.
///
/// Cloning shares ownership. Unless made persistent, the underlying
/// foreign string is released exactly once, when the last clone is dropped.
#[derive(Clone)]
pub struct JString {
    inner: Arc<StrInner>,
}

impl JString {
    /// Encode `text` and create the foreign string.
    ///
    /// Fails with [`Error::Encoding`] if the converted length overflows the
    /// runtime's maximum or the creation primitive reports failure; no
    /// handle exists in either case.
    pub(crate) fn make(vm: Arc<dyn ForeignRuntime>, text: &str) -> Result<Self> {
        let utf16: Vec<u16> = text.encode_utf16().collect();
        check_encoded_len(utf16.len())?;
        let raw = vm.new_string(&utf16).ok_or_else(|| Error::Encoding {
            reason: "native string creation failed".to_string(),
        })?;
        Ok(Self::from_raw(vm, raw))
    }

    /// Wrap a foreign string reference returned by a call.
    pub(crate) fn from_raw(vm: Arc<dyn ForeignRuntime>, raw: RawRef) -> Self {
        Self {
            inner: Arc::new(StrInner {
                vm,
                raw,
                persistent: AtomicBool::new(false),
            }),
        }
    }

    /// The raw foreign reference, for passing to calls.
    pub fn as_foreign(&self) -> RawRef {
        self.inner.raw
    }

    /// Decode the foreign string back into the caller's representation.
    pub fn read(&self) -> Result<String> {
        let chars = self.inner.vm.string_chars(self.inner.raw);
        String::from_utf16(&chars).map_err(|_| Error::Encoding {
            reason: "foreign string contains invalid UTF-16".to_string(),
        })
    }

    /// Toggle whether dropping the last clone releases the foreign string.
    ///
    /// With `persistent` set, release is suppressed across the whole
    /// lifetime of the handle and every clone of it; the caller takes over
    /// any further lifetime management of the raw reference. Returns the
    /// raw reference for convenience.
    pub fn make_persistent(&self, persistent: bool) -> RawRef {
        self.inner.persistent.store(persistent, Ordering::Release);
        self.inner.raw
    }

    /// Whether release is currently suppressed.
    pub fn is_persistent(&self) -> bool {
        self.inner.persistent.load(Ordering::Acquire)
    }
}

impl PartialEq for JString {
    fn eq(&self, other: &Self) -> bool {
        self.inner.raw == other.inner.raw
    }
}

impl Eq for JString {}

impl std::fmt::Debug for JString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JString")
            .field("raw", &self.inner.raw)
            .field("persistent", &self.is_persistent())
            .finish()
    }
}
