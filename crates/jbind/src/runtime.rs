//! ForeignRuntime trait — the primitive interface to the managed runtime
//!
//! The call layer never implements the foreign runtime itself; it drives it
//! through the small primitive set defined here: symbol lookup by
//! name+descriptor, per-return-kind invocation, object/string creation and
//! local-reference release. Backends implement [`ForeignRuntime`] and the
//! typed layer programs against `&dyn` without depending on backend
//! internals.

use std::sync::Arc;

/// Status code for a successful runtime bootstrap.
pub const STATUS_OK: i32 = 0;
/// Unspecified runtime bootstrap failure.
pub const STATUS_ERR: i32 = -1;
/// The requested interface version is unsupported.
pub const STATUS_EVERSION: i32 = -3;
/// The runtime ran out of memory during bootstrap.
pub const STATUS_ENOMEM: i32 = -4;
/// A runtime instance already exists in this process.
pub const STATUS_EEXIST: i32 = -5;
/// Invalid bootstrap arguments.
pub const STATUS_EINVAL: i32 = -6;

/// Opaque reference to a foreign-owned object or string.
///
/// Always non-null; absence is modeled as `Option<RawRef>`, never a
/// sentinel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawRef(pub u64);

/// Opaque identity of a foreign class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawClass(pub u64);

/// Opaque identifier of a resolved foreign member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawMethodId(pub u64);

/// Argument as passed to the raw invoke primitives.
///
/// Reference-kind arguments are passed as the raw ref of the handle that
/// owns them; the handle keeps the reference alive for the duration of the
/// call.
#[derive(Debug, Clone, Copy)]
pub enum RawArg {
    /// Boolean argument
    Bool(bool),
    /// 32-bit integer argument
    I32(i32),
    /// 64-bit integer argument
    I64(i64),
    /// 32-bit float argument
    F32(f32),
    /// Object, string, or byte-array reference argument
    Ref(RawRef),
}

/// Primitive operations exposed by the foreign runtime.
///
/// Static and instance lookups use different underlying primitives and are
/// not interchangeable: asking the wrong one for a member must miss, never
/// succeed accidentally. Invocation is split per return kind because that
/// is how the underlying interface is shaped; the typed layer selects the
/// primitive from the signature's return kind.
///
/// Dropping the last reference to an implementation tears the runtime down,
/// mirroring its bootstrap sequence.
pub trait ForeignRuntime: Send + Sync {
    /// Resolve a class identity by fully-qualified binary name.
    fn find_class(&self, name: &str) -> Option<RawClass>;

    /// Name of a class, for diagnostics and handle identity.
    fn class_name(&self, class: RawClass) -> String;

    /// Runtime class of an object reference.
    fn object_class(&self, obj: RawRef) -> RawClass;

    /// Look up a static method by name and signature descriptor.
    fn static_method_id(&self, class: RawClass, name: &str, descriptor: &str)
        -> Option<RawMethodId>;

    /// Look up an instance method (or constructor, under the reserved
    /// initializer name) by name and signature descriptor.
    fn instance_method_id(
        &self,
        class: RawClass,
        name: &str,
        descriptor: &str,
    ) -> Option<RawMethodId>;

    /// Invoke a void-returning static method.
    fn call_static_void(&self, class: RawClass, method: RawMethodId, args: &[RawArg]);

    /// Invoke a boolean-returning static method.
    fn call_static_bool(&self, class: RawClass, method: RawMethodId, args: &[RawArg]) -> bool;

    /// Invoke an i32-returning static method.
    fn call_static_i32(&self, class: RawClass, method: RawMethodId, args: &[RawArg]) -> i32;

    /// Invoke an i64-returning static method.
    fn call_static_i64(&self, class: RawClass, method: RawMethodId, args: &[RawArg]) -> i64;

    /// Invoke an f32-returning static method.
    fn call_static_f32(&self, class: RawClass, method: RawMethodId, args: &[RawArg]) -> f32;

    /// Invoke a reference-returning static method.
    fn call_static_object(
        &self,
        class: RawClass,
        method: RawMethodId,
        args: &[RawArg],
    ) -> Option<RawRef>;

    /// Invoke a void-returning instance method.
    fn call_void(&self, recv: RawRef, method: RawMethodId, args: &[RawArg]);

    /// Invoke a boolean-returning instance method.
    fn call_bool(&self, recv: RawRef, method: RawMethodId, args: &[RawArg]) -> bool;

    /// Invoke an i32-returning instance method.
    fn call_i32(&self, recv: RawRef, method: RawMethodId, args: &[RawArg]) -> i32;

    /// Invoke an i64-returning instance method.
    fn call_i64(&self, recv: RawRef, method: RawMethodId, args: &[RawArg]) -> i64;

    /// Invoke an f32-returning instance method.
    fn call_f32(&self, recv: RawRef, method: RawMethodId, args: &[RawArg]) -> f32;

    /// Invoke a reference-returning instance method.
    fn call_object(&self, recv: RawRef, method: RawMethodId, args: &[RawArg]) -> Option<RawRef>;

    /// Allocate a new object and run the given constructor on it.
    fn new_object(
        &self,
        class: RawClass,
        ctor: RawMethodId,
        args: &[RawArg],
    ) -> Option<RawRef>;

    /// Create a foreign string from UTF-16 code units.
    fn new_string(&self, utf16: &[u16]) -> Option<RawRef>;

    /// Read back the UTF-16 code units of a foreign string.
    fn string_chars(&self, s: RawRef) -> Vec<u16>;

    /// Release one local reference. Called exactly once per owned ref.
    fn delete_local_ref(&self, r: RawRef);

    /// Check for a pending foreign exception and clear it.
    ///
    /// Returns the exception description if one was pending. The typed
    /// layer calls this after every invoke, before any result is used.
    fn take_exception(&self) -> Option<String>;
}

/// Creates the foreign runtime instance for [`Session::open`].
///
/// [`Session::open`]: crate::session::Session::open
pub trait RuntimeLauncher {
    /// Bootstrap a runtime with the given ordered flag strings.
    ///
    /// An empty flag list is valid and means runtime defaults. Failure
    /// carries the runtime's numeric status code.
    fn launch(&self, options: &[String]) -> Result<Arc<dyn ForeignRuntime>, i32>;
}
