//! Wire-format type descriptors for foreign method signatures.
//!
//! The foreign runtime parses signature strings literally, so the token
//! table here must be bit-exact. Rendering is a pure function of the kind
//! sequence: same kinds in, same string out, no runtime interaction.

use std::fmt;

/// Closed enumeration of the value kinds the call layer can marshal.
///
/// Every kind maps to exactly one descriptor token. Because the enum is
/// closed, an unsupported kind cannot reach signature rendering at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// No value (return position only)
    Void,
    /// 8-bit boolean
    Boolean,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 32-bit floating point
    Float32,
    /// Reference to an arbitrary foreign object
    ObjectRef,
    /// Reference to a foreign string
    StringRef,
    /// Reference to a raw byte array
    ByteArrayRef,
}

impl ValueKind {
    /// The wire-format descriptor token for this kind.
    pub fn descriptor(self) -> &'static str {
        match self {
            ValueKind::Void => "V",
            ValueKind::Boolean => "Z",
            ValueKind::Int32 => "I",
            ValueKind::Int64 => "J",
            ValueKind::Float32 => "F",
            ValueKind::ObjectRef => "Ljava/lang/Object;",
            ValueKind::StringRef => "Ljava/lang/String;",
            ValueKind::ByteArrayRef => "[B",
        }
    }

    /// Whether values of this kind are opaque foreign references.
    pub fn is_reference(self) -> bool {
        matches!(
            self,
            ValueKind::ObjectRef | ValueKind::StringRef | ValueKind::ByteArrayRef
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor())
    }
}

/// Ordered argument kinds plus one mandatory return kind.
///
/// Argument order matches call-site order exactly. The return kind is
/// always present; zero-argument signatures render as `"()"` followed
/// immediately by the return token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    args: Vec<ValueKind>,
    ret: ValueKind,
}

impl Signature {
    /// Create a signature from argument kinds and a return kind.
    pub fn new(args: Vec<ValueKind>, ret: ValueKind) -> Self {
        Self { args, ret }
    }

    /// Zero-argument signature with the given return kind.
    pub fn returning(ret: ValueKind) -> Self {
        Self { args: Vec::new(), ret }
    }

    /// Argument kinds in call-site order.
    pub fn args(&self) -> &[ValueKind] {
        &self.args
    }

    /// Return kind.
    pub fn ret(&self) -> ValueKind {
        self.ret
    }

    /// Same argument list with a different return kind.
    pub fn with_return(self, ret: ValueKind) -> Self {
        Self { args: self.args, ret }
    }

    /// Render the full descriptor string: `"(" + arg tokens + ")" + return token`.
    pub fn descriptor(&self) -> String {
        let mut out = String::with_capacity(2 + self.args.len() + 1);
        out.push('(');
        for kind in &self.args {
            out.push_str(kind.descriptor());
        }
        out.push(')');
        out.push_str(self.ret.descriptor());
        out
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_table_is_exact() {
        assert_eq!(ValueKind::Void.descriptor(), "V");
        assert_eq!(ValueKind::Boolean.descriptor(), "Z");
        assert_eq!(ValueKind::Int32.descriptor(), "I");
        assert_eq!(ValueKind::Int64.descriptor(), "J");
        assert_eq!(ValueKind::Float32.descriptor(), "F");
        assert_eq!(ValueKind::ObjectRef.descriptor(), "Ljava/lang/Object;");
        assert_eq!(ValueKind::StringRef.descriptor(), "Ljava/lang/String;");
        assert_eq!(ValueKind::ByteArrayRef.descriptor(), "[B");
    }

    #[test]
    fn test_int_long_void_signature() {
        let sig = Signature::new(vec![ValueKind::Int32, ValueKind::Int64], ValueKind::Void);
        assert_eq!(sig.descriptor(), "(IJ)V");
    }

    #[test]
    fn test_zero_args_renders_empty_parens() {
        assert_eq!(Signature::returning(ValueKind::Int32).descriptor(), "()I");
        assert_eq!(Signature::returning(ValueKind::Void).descriptor(), "()V");
    }

    #[test]
    fn test_argument_order_is_preserved() {
        let sig = Signature::new(
            vec![
                ValueKind::StringRef,
                ValueKind::Int32,
                ValueKind::ByteArrayRef,
                ValueKind::Boolean,
            ],
            ValueKind::ObjectRef,
        );
        assert_eq!(sig.descriptor(), "(Ljava/lang/String;I[BZ)Ljava/lang/Object;");
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let sig = Signature::new(vec![ValueKind::Float32, ValueKind::Int64], ValueKind::Boolean);
        assert_eq!(sig.descriptor(), sig.descriptor());
        assert_eq!(sig.to_string(), "(FJ)Z");
    }

    #[test]
    fn test_with_return_replaces_only_return_kind() {
        let sig = Signature::new(vec![ValueKind::Int32], ValueKind::Int32);
        assert_eq!(sig.with_return(ValueKind::Void).descriptor(), "(I)V");
    }
}
