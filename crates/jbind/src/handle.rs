//! Reference-counted handles to foreign objects
//!
//! A foreign object reference stays alive as long as any clone of its
//! handle does; the release primitive runs exactly once, when the last
//! clone is dropped. Identity is the underlying foreign reference, not the
//! wrapper.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::call::InstanceMethod;
use crate::class::Class;
use crate::descriptor::Signature;
use crate::error::Result;
use crate::runtime::{ForeignRuntime, RawRef};

/// Shared owner of one foreign reference. Dropping the last `Arc` clone
/// releases the reference through the runtime it came from.
pub(crate) struct OwnedRef {
    vm: Arc<dyn ForeignRuntime>,
    raw: RawRef,
}

impl OwnedRef {
    pub(crate) fn new(vm: Arc<dyn ForeignRuntime>, raw: RawRef) -> Self {
        Self { vm, raw }
    }

    pub(crate) fn raw(&self) -> RawRef {
        self.raw
    }
}

impl Drop for OwnedRef {
    fn drop(&mut self) {
        self.vm.delete_local_ref(self.raw);
    }
}

/// Handle to a foreign object.
///
/// Cloning shares ownership; the foreign reference is released once, after
/// the last clone is dropped. The handle pins the runtime alive via its
/// internal `Arc`, so releases stay valid even if the [`Session`] was
/// closed first.
///
/// [`Session`]: crate::session::Session
#[derive(Clone)]
pub struct ObjectHandle {
    class: Class,
    inner: Arc<OwnedRef>,
}

impl ObjectHandle {
    pub(crate) fn new(class: Class, raw: RawRef) -> Self {
        let inner = Arc::new(OwnedRef::new(class.vm().clone(), raw));
        Self { class, inner }
    }

    /// The class identity this handle was created with.
    pub fn class(&self) -> &Class {
        &self.class
    }

    /// The underlying foreign reference.
    pub fn raw(&self) -> RawRef {
        self.inner.raw()
    }

    /// Resolve an instance method on this object's class without binding.
    pub fn resolve_method(
        &self,
        name: &str,
        signature: Signature,
    ) -> Result<crate::resolve::ResolvedMember> {
        self.class.resolve_instance(name, signature)
    }

    /// Resolve an instance method and bind this handle as the receiver.
    pub fn method(&self, name: &str, signature: Signature) -> Result<InstanceMethod> {
        Ok(self.bind_method(self.resolve_method(name, signature)?))
    }

    /// Bind a previously resolved instance method to this receiver.
    pub fn bind_method(&self, member: crate::resolve::ResolvedMember) -> InstanceMethod {
        InstanceMethod::new(self.clone(), member)
    }
}

impl PartialEq for ObjectHandle {
    fn eq(&self, other: &Self) -> bool {
        self.raw() == other.raw()
    }
}

impl Eq for ObjectHandle {}

impl Hash for ObjectHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw().hash(state);
    }
}

impl std::fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectHandle")
            .field("class", &self.class.name())
            .field("raw", &self.raw())
            .finish()
    }
}
