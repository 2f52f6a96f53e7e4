//! Symbol resolution — (class, name, signature) to a resolved member
//!
//! Resolution is a separable step: it performs exactly one lookup primitive
//! call and yields a [`ResolvedMember`] that binders consume. Nothing is
//! cached here; callers that resolve the same member repeatedly may keep
//! the `ResolvedMember` around and re-bind it.

use std::fmt;

use crate::class::Class;
use crate::descriptor::{Signature, ValueKind};
use crate::error::{Error, Result};
use crate::runtime::{RawClass, RawMethodId};

/// Reserved member name of the instance initializer.
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// Which lookup primitive a member resolves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Static method, resolved through the static lookup primitive
    Static,
    /// Instance method, resolved through the instance lookup primitive
    Instance,
    /// Constructor, resolved under [`CONSTRUCTOR_NAME`] through the
    /// instance lookup primitive
    Constructor,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MemberKind::Static => "static method",
            MemberKind::Instance => "method",
            MemberKind::Constructor => "constructor",
        })
    }
}

/// A successfully resolved foreign member.
///
/// Cloneable so callers can cache resolutions and re-bind them; the layer
/// itself never caches across lookups.
#[derive(Debug, Clone)]
pub struct ResolvedMember {
    class: RawClass,
    method: RawMethodId,
    name: String,
    signature: Signature,
    kind: MemberKind,
}

impl ResolvedMember {
    /// Owning class identity.
    pub fn class(&self) -> RawClass {
        self.class
    }

    /// Opaque member identifier.
    pub fn method(&self) -> RawMethodId {
        self.method
    }

    /// Member name as resolved.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Signature the member was resolved under.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Lookup kind the member was resolved through.
    pub fn kind(&self) -> MemberKind {
        self.kind
    }
}

fn resolution_error(class: &Class, name: &str, signature: &Signature, kind: MemberKind) -> Error {
    Error::Resolution {
        class: class.name().to_string(),
        member: name.to_string(),
        descriptor: signature.descriptor(),
        kind,
    }
}

/// Resolve a static method on `class`.
pub(crate) fn resolve_static(
    class: &Class,
    name: &str,
    signature: Signature,
) -> Result<ResolvedMember> {
    let method = class
        .vm()
        .static_method_id(class.raw(), name, &signature.descriptor())
        .ok_or_else(|| resolution_error(class, name, &signature, MemberKind::Static))?;
    Ok(ResolvedMember {
        class: class.raw(),
        method,
        name: name.to_string(),
        signature,
        kind: MemberKind::Static,
    })
}

/// Resolve an instance method on `class`.
pub(crate) fn resolve_instance(
    class: &Class,
    name: &str,
    signature: Signature,
) -> Result<ResolvedMember> {
    let method = class
        .vm()
        .instance_method_id(class.raw(), name, &signature.descriptor())
        .ok_or_else(|| resolution_error(class, name, &signature, MemberKind::Instance))?;
    Ok(ResolvedMember {
        class: class.raw(),
        method,
        name: name.to_string(),
        signature,
        kind: MemberKind::Instance,
    })
}

/// Resolve a constructor on `class`.
///
/// Constructors always resolve under [`CONSTRUCTOR_NAME`] with the return
/// kind forced to [`ValueKind::Void`], whatever the caller declared, and go
/// through the instance lookup primitive.
pub(crate) fn resolve_constructor(class: &Class, args: Vec<ValueKind>) -> Result<ResolvedMember> {
    let signature = Signature::new(args, ValueKind::Void);
    let method = class
        .vm()
        .instance_method_id(class.raw(), CONSTRUCTOR_NAME, &signature.descriptor())
        .ok_or_else(|| {
            resolution_error(class, CONSTRUCTOR_NAME, &signature, MemberKind::Constructor)
        })?;
    Ok(ResolvedMember {
        class: class.raw(),
        method,
        name: CONSTRUCTOR_NAME.to_string(),
        signature,
        kind: MemberKind::Constructor,
    })
}
