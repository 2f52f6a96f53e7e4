//! jbind - Typed call layer over a JVM-style foreign runtime
//!
//! The foreign runtime's native interface is weakly typed: symbols are
//! looked up by name plus a hand-encoded signature string, invocation is
//! split per return kind, and object lifetimes are manual. This crate lets
//! a caller express foreign calls with typed values while the layer derives
//! the wire-format signature, resolves the symbol, selects the invoke
//! primitive, and owns the reference lifetimes.
//!
//! # Example
//!
//! ```ignore
//! use jbind::{Session, SessionOptions, Signature, Value, ValueKind};
//!
//! let session = Session::open(&launcher, SessionOptions::new().flag("-verbose:gc"))?;
//! let class = session.find_class("Example")?;
//!
//! let increment = class.static_method(
//!     "increment",
//!     Signature::new(vec![ValueKind::Int32], ValueKind::Int32),
//! )?;
//! let two = increment.call(&[Value::I32(1)])?.as_i32().unwrap();
//!
//! let ctor = class.constructor(vec![ValueKind::StringRef])?;
//! let obj = ctor.call(&[Value::Str(session.new_string("5")?)])?;
//! let bump = obj.method(
//!     "incrementCounterBy",
//!     Signature::new(vec![ValueKind::Int32], ValueKind::Int32),
//! )?;
//! let seven = bump.call(&[Value::I32(2)])?.as_i32().unwrap();
//! ```

#![warn(missing_docs)]

pub mod call;
pub mod class;
pub mod descriptor;
pub mod error;
pub mod handle;
pub mod resolve;
pub mod runtime;
pub mod session;
pub mod string;

pub use call::{Constructor, InstanceMethod, ReturnValue, StaticMethod, Value};
pub use class::Class;
pub use descriptor::{Signature, ValueKind};
pub use error::{Error, Result};
pub use handle::ObjectHandle;
pub use resolve::{MemberKind, ResolvedMember, CONSTRUCTOR_NAME};
pub use runtime::{ForeignRuntime, RawArg, RawClass, RawMethodId, RawRef, RuntimeLauncher};
pub use session::{Session, SessionOptions};
pub use string::JString;
