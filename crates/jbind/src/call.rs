//! Typed callables and the per-return-kind invoke dispatch
//!
//! A callable pairs a [`ResolvedMember`] with its call target (class,
//! receiver, or constructing class). Invocation checks the argument list
//! against the signature, selects the invoke primitive from the signature's
//! return kind through a single dispatch, consults the pending-exception
//! state, and wraps reference results into owned handles. There is no
//! retry, no kind coercion, and no re-encoding of string arguments.

use std::sync::Arc;

use crate::class::Class;
use crate::descriptor::{Signature, ValueKind};
use crate::error::{Error, Result};
use crate::handle::ObjectHandle;
use crate::resolve::ResolvedMember;
use crate::runtime::{ForeignRuntime, RawArg, RawRef};
use crate::string::JString;

/// Argument value for a typed foreign call.
#[derive(Debug, Clone)]
pub enum Value {
    /// Boolean argument
    Bool(bool),
    /// 32-bit integer argument
    I32(i32),
    /// 64-bit integer argument
    I64(i64),
    /// 32-bit float argument
    F32(f32),
    /// Object or byte-array reference argument
    Object(ObjectHandle),
    /// String reference argument; passed as-is, never re-encoded
    Str(JString),
}

impl Value {
    /// The descriptor token this value satisfies, for diagnostics.
    fn token(&self) -> &'static str {
        match self {
            Value::Bool(_) => ValueKind::Boolean.descriptor(),
            Value::I32(_) => ValueKind::Int32.descriptor(),
            Value::I64(_) => ValueKind::Int64.descriptor(),
            Value::F32(_) => ValueKind::Float32.descriptor(),
            Value::Object(_) => ValueKind::ObjectRef.descriptor(),
            Value::Str(_) => ValueKind::StringRef.descriptor(),
        }
    }

    /// Whether this value can occupy an argument slot of `kind`.
    ///
    /// Exact match only: strings satisfy only `StringRef`, object handles
    /// satisfy `ObjectRef` and `ByteArrayRef`.
    fn satisfies(&self, kind: ValueKind) -> bool {
        match self {
            Value::Bool(_) => kind == ValueKind::Boolean,
            Value::I32(_) => kind == ValueKind::Int32,
            Value::I64(_) => kind == ValueKind::Int64,
            Value::F32(_) => kind == ValueKind::Float32,
            Value::Object(_) => {
                kind == ValueKind::ObjectRef || kind == ValueKind::ByteArrayRef
            }
            Value::Str(_) => kind == ValueKind::StringRef,
        }
    }

    fn raw(&self) -> RawArg {
        match self {
            Value::Bool(v) => RawArg::Bool(*v),
            Value::I32(v) => RawArg::I32(*v),
            Value::I64(v) => RawArg::I64(*v),
            Value::F32(v) => RawArg::F32(*v),
            Value::Object(h) => RawArg::Ref(h.raw()),
            Value::Str(s) => RawArg::Ref(s.as_foreign()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<ObjectHandle> for Value {
    fn from(h: ObjectHandle) -> Self {
        Value::Object(h)
    }
}

impl From<&ObjectHandle> for Value {
    fn from(h: &ObjectHandle) -> Self {
        Value::Object(h.clone())
    }
}

impl From<JString> for Value {
    fn from(s: JString) -> Self {
        Value::Str(s)
    }
}

impl From<&JString> for Value {
    fn from(s: &JString) -> Self {
        Value::Str(s.clone())
    }
}

/// Result of a typed foreign call.
#[derive(Debug, Clone)]
pub enum ReturnValue {
    /// The call returned nothing
    Void,
    /// Boolean result
    Bool(bool),
    /// 32-bit integer result
    I32(i32),
    /// 64-bit integer result
    I64(i64),
    /// 32-bit float result
    F32(f32),
    /// New object (or byte-array) handle owned by the caller
    Object(ObjectHandle),
    /// New string handle owned by the caller
    Str(JString),
}

impl ReturnValue {
    /// True for void results.
    pub fn is_void(&self) -> bool {
        matches!(self, ReturnValue::Void)
    }

    /// Get result as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ReturnValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get result as i32
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            ReturnValue::I32(v) => Some(*v),
            _ => None,
        }
    }

    /// Get result as i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ReturnValue::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Get result as f32
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            ReturnValue::F32(v) => Some(*v),
            _ => None,
        }
    }

    /// Take the result as an object handle
    pub fn into_object(self) -> Option<ObjectHandle> {
        match self {
            ReturnValue::Object(h) => Some(h),
            _ => None,
        }
    }

    /// Take the result as a string handle
    pub fn into_string(self) -> Option<JString> {
        match self {
            ReturnValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Check arity and per-position kinds, then lower to raw arguments.
fn lower_args(signature: &Signature, args: &[Value]) -> Result<Vec<RawArg>> {
    let expected = signature.args();
    if args.len() != expected.len() {
        return Err(Error::ArgumentMismatch {
            expected: format!("{} arguments for {}", expected.len(), signature),
            got: format!("{} arguments", args.len()),
        });
    }
    let mut raw = Vec::with_capacity(args.len());
    for (position, (kind, value)) in expected.iter().zip(args).enumerate() {
        if !value.satisfies(*kind) {
            return Err(Error::ArgumentMismatch {
                expected: format!("{} at position {position}", kind.descriptor()),
                got: value.token().to_string(),
            });
        }
        raw.push(value.raw());
    }
    Ok(raw)
}

/// Surface a pending foreign exception, if any, as an error.
fn check_exception(vm: &dyn ForeignRuntime) -> Result<()> {
    match vm.take_exception() {
        Some(message) => Err(Error::ForeignException(message)),
        None => Ok(()),
    }
}

/// Wrap a reference-kind result into the handle the return kind dictates.
fn wrap_reference(
    vm: &Arc<dyn ForeignRuntime>,
    member: &ResolvedMember,
    raw: Option<RawRef>,
) -> Result<ReturnValue> {
    let raw = raw.ok_or_else(|| Error::NullResult {
        member: member.name().to_string(),
    })?;
    match member.signature().ret() {
        ValueKind::StringRef => Ok(ReturnValue::Str(JString::from_raw(vm.clone(), raw))),
        _ => {
            let class = Class::of_raw(vm.clone(), vm.object_class(raw));
            Ok(ReturnValue::Object(ObjectHandle::new(class, raw)))
        }
    }
}

/// Call target: a class for static invokes, a receiver for instance ones.
enum Target {
    Static(crate::runtime::RawClass),
    Instance(RawRef),
}

/// The single return-kind-keyed dispatch over the invoke primitives.
///
/// Adding a value kind means adding one arm here, not a new callable
/// specialization. The pending-exception state is consulted after every
/// primitive call, before any result is used.
fn invoke(
    vm: &Arc<dyn ForeignRuntime>,
    member: &ResolvedMember,
    target: Target,
    args: &[Value],
) -> Result<ReturnValue> {
    let raw_args = lower_args(member.signature(), args)?;
    let method = member.method();
    match member.signature().ret() {
        ValueKind::Void => {
            match target {
                Target::Static(class) => vm.call_static_void(class, method, &raw_args),
                Target::Instance(recv) => vm.call_void(recv, method, &raw_args),
            }
            check_exception(vm.as_ref())?;
            Ok(ReturnValue::Void)
        }
        ValueKind::Boolean => {
            let v = match target {
                Target::Static(class) => vm.call_static_bool(class, method, &raw_args),
                Target::Instance(recv) => vm.call_bool(recv, method, &raw_args),
            };
            check_exception(vm.as_ref())?;
            Ok(ReturnValue::Bool(v))
        }
        ValueKind::Int32 => {
            let v = match target {
                Target::Static(class) => vm.call_static_i32(class, method, &raw_args),
                Target::Instance(recv) => vm.call_i32(recv, method, &raw_args),
            };
            check_exception(vm.as_ref())?;
            Ok(ReturnValue::I32(v))
        }
        ValueKind::Int64 => {
            let v = match target {
                Target::Static(class) => vm.call_static_i64(class, method, &raw_args),
                Target::Instance(recv) => vm.call_i64(recv, method, &raw_args),
            };
            check_exception(vm.as_ref())?;
            Ok(ReturnValue::I64(v))
        }
        ValueKind::Float32 => {
            let v = match target {
                Target::Static(class) => vm.call_static_f32(class, method, &raw_args),
                Target::Instance(recv) => vm.call_f32(recv, method, &raw_args),
            };
            check_exception(vm.as_ref())?;
            Ok(ReturnValue::F32(v))
        }
        ValueKind::ObjectRef | ValueKind::StringRef | ValueKind::ByteArrayRef => {
            let raw = match target {
                Target::Static(class) => vm.call_static_object(class, method, &raw_args),
                Target::Instance(recv) => vm.call_object(recv, method, &raw_args),
            };
            check_exception(vm.as_ref())?;
            wrap_reference(vm, member, raw)
        }
    }
}

/// Typed callable for a static method.
pub struct StaticMethod {
    class: Class,
    member: ResolvedMember,
}

impl StaticMethod {
    pub(crate) fn new(class: Class, member: ResolvedMember) -> Self {
        Self { class, member }
    }

    /// The signature this callable was bound with.
    pub fn signature(&self) -> &Signature {
        self.member.signature()
    }

    /// Perform the foreign call.
    pub fn call(&self, args: &[Value]) -> Result<ReturnValue> {
        invoke(
            self.class.vm(),
            &self.member,
            Target::Static(self.member.class()),
            args,
        )
    }
}

impl std::fmt::Debug for StaticMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticMethod")
            .field("class", &self.class.name())
            .field("member", &self.member.name())
            .field("descriptor", &self.member.signature().descriptor())
            .finish()
    }
}

/// Typed callable for an instance method, with its receiver bound.
pub struct InstanceMethod {
    receiver: ObjectHandle,
    member: ResolvedMember,
}

impl InstanceMethod {
    pub(crate) fn new(receiver: ObjectHandle, member: ResolvedMember) -> Self {
        Self { receiver, member }
    }

    /// The signature this callable was bound with.
    pub fn signature(&self) -> &Signature {
        self.member.signature()
    }

    /// The bound receiver.
    pub fn receiver(&self) -> &ObjectHandle {
        &self.receiver
    }

    /// Perform the foreign call on the bound receiver.
    pub fn call(&self, args: &[Value]) -> Result<ReturnValue> {
        invoke(
            self.receiver.class().vm(),
            &self.member,
            Target::Instance(self.receiver.raw()),
            args,
        )
    }
}

impl std::fmt::Debug for InstanceMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceMethod")
            .field("receiver", &self.receiver.raw())
            .field("member", &self.member.name())
            .field("descriptor", &self.member.signature().descriptor())
            .finish()
    }
}

/// Typed callable for a constructor.
///
/// Always goes through the runtime's allocate+initialize primitive and
/// always yields a handle whose class identity is the constructing class.
pub struct Constructor {
    class: Class,
    member: ResolvedMember,
}

impl Constructor {
    pub(crate) fn new(class: Class, member: ResolvedMember) -> Self {
        Self { class, member }
    }

    /// The signature this callable was bound with (return kind is void).
    pub fn signature(&self) -> &Signature {
        self.member.signature()
    }

    /// Allocate and initialize a new foreign object.
    pub fn call(&self, args: &[Value]) -> Result<ObjectHandle> {
        let raw_args = lower_args(self.member.signature(), args)?;
        let vm = self.class.vm();
        let raw = vm.new_object(self.member.class(), self.member.method(), &raw_args);
        check_exception(vm.as_ref())?;
        let raw = raw.ok_or_else(|| Error::NullResult {
            member: self.member.name().to_string(),
        })?;
        Ok(ObjectHandle::new(self.class.clone(), raw))
    }
}

impl std::fmt::Debug for Constructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Constructor")
            .field("class", &self.class.name())
            .field("descriptor", &self.member.signature().descriptor())
            .finish()
    }
}
