//! Class proxy — user-facing handle to a foreign class
//!
//! Exposes static-method, instance-method, and constructor lookup as
//! factory operations over the resolver and binders. `Class` is cheap to
//! clone (a runtime reference, a raw id, and a shared name).

use std::sync::Arc;

use crate::call::{Constructor, StaticMethod};
use crate::descriptor::{Signature, ValueKind};
use crate::error::Result;
use crate::resolve::{self, ResolvedMember};
use crate::runtime::{ForeignRuntime, RawClass};

/// Proxy for a resolved foreign class.
#[derive(Clone)]
pub struct Class {
    vm: Arc<dyn ForeignRuntime>,
    raw: RawClass,
    name: Arc<str>,
}

impl Class {
    pub(crate) fn new(vm: Arc<dyn ForeignRuntime>, raw: RawClass, name: &str) -> Self {
        Self {
            vm,
            raw,
            name: Arc::from(name),
        }
    }

    /// Build a class proxy for the runtime class of an object reference,
    /// asking the runtime for its name.
    pub(crate) fn of_raw(vm: Arc<dyn ForeignRuntime>, raw: RawClass) -> Self {
        let name = vm.class_name(raw);
        Self {
            vm,
            raw,
            name: Arc::from(name.as_str()),
        }
    }

    pub(crate) fn vm(&self) -> &Arc<dyn ForeignRuntime> {
        &self.vm
    }

    /// Fully-qualified class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Opaque class identity.
    pub fn raw(&self) -> RawClass {
        self.raw
    }

    /// Resolve a static method without binding it.
    pub fn resolve_static(&self, name: &str, signature: Signature) -> Result<ResolvedMember> {
        resolve::resolve_static(self, name, signature)
    }

    /// Resolve an instance method without binding it.
    pub fn resolve_instance(&self, name: &str, signature: Signature) -> Result<ResolvedMember> {
        resolve::resolve_instance(self, name, signature)
    }

    /// Resolve a constructor without binding it. The return kind is always
    /// forced to void.
    pub fn resolve_constructor(&self, args: Vec<ValueKind>) -> Result<ResolvedMember> {
        resolve::resolve_constructor(self, args)
    }

    /// Resolve and bind a static method in one step.
    pub fn static_method(&self, name: &str, signature: Signature) -> Result<StaticMethod> {
        Ok(self.bind_static(self.resolve_static(name, signature)?))
    }

    /// Resolve and bind a constructor in one step.
    pub fn constructor(&self, args: Vec<ValueKind>) -> Result<Constructor> {
        Ok(self.bind_constructor(self.resolve_constructor(args)?))
    }

    /// Bind a previously resolved static method.
    pub fn bind_static(&self, member: ResolvedMember) -> StaticMethod {
        StaticMethod::new(self.clone(), member)
    }

    /// Bind a previously resolved constructor.
    pub fn bind_constructor(&self, member: ResolvedMember) -> Constructor {
        Constructor::new(self.clone(), member)
    }
}

impl std::fmt::Debug for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("raw", &self.raw)
            .finish()
    }
}
