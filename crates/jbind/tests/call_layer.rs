//! End-to-end call tests: resolution, binding, invocation, and the error
//! paths of the typed layer, against the scripted test VM.

mod common;

use common::with_session;
use jbind::{Error, MemberKind, Signature, Value, ValueKind};

fn sig(args: Vec<ValueKind>, ret: ValueKind) -> Signature {
    Signature::new(args, ret)
}

#[test]
fn test_static_increment_returns_incremented_value() {
    with_session(|session, _vm| {
        let class = session.find_class("Example").unwrap();
        let increment = class
            .static_method("increment", sig(vec![ValueKind::Int32], ValueKind::Int32))
            .unwrap();
        let result = increment.call(&[Value::I32(1)]).unwrap();
        assert_eq!(result.as_i32(), Some(2));
    });
}

#[test]
fn test_void_static_calls_run_in_program_order() {
    with_session(|session, vm| {
        let class = session.find_class("Example").unwrap();
        class
            .static_method("printHelloWorld", Signature::returning(ValueKind::Void))
            .unwrap()
            .call(&[])
            .unwrap();
        class
            .static_method("printLong", sig(vec![ValueKind::Int64], ValueKind::Void))
            .unwrap()
            .call(&[Value::I64(1)])
            .unwrap();
        class
            .static_method(
                "print2Long",
                sig(vec![ValueKind::Int64, ValueKind::Int64], ValueKind::Void),
            )
            .unwrap()
            .call(&[Value::I64(1), Value::I64(2)])
            .unwrap();
        assert_eq!(
            vm.trace(),
            vec![
                "Example says: Hello World!",
                "Example says long: 1",
                "Example says 2 long: 1 2",
            ]
        );
    });
}

#[test]
fn test_constructor_from_string_yields_counter_object() {
    with_session(|session, _vm| {
        let class = session.find_class("Example").unwrap();
        let ctor = class.constructor(vec![ValueKind::StringRef]).unwrap();
        let five = session.new_string("5").unwrap();
        let obj = ctor.call(&[Value::Str(five)]).unwrap();
        assert_eq!(obj.class().name(), "Example");

        let bump = obj
            .method(
                "incrementCounterBy",
                sig(vec![ValueKind::Int32], ValueKind::Int32),
            )
            .unwrap();
        assert_eq!(bump.call(&[Value::I32(2)]).unwrap().as_i32(), Some(7));

        let describe = obj
            .method("describe", Signature::returning(ValueKind::StringRef))
            .unwrap();
        let text = describe.call(&[]).unwrap().into_string().unwrap();
        assert_eq!(text.read().unwrap(), "counter is 7");
    });
}

#[test]
fn test_each_scalar_return_kind_uses_its_own_primitive() {
    with_session(|session, _vm| {
        let class = session.find_class("Example").unwrap();

        let is_positive = class
            .static_method("isPositive", sig(vec![ValueKind::Int32], ValueKind::Boolean))
            .unwrap();
        let result = is_positive.call(&[Value::I32(3)]).unwrap();
        assert_eq!(result.as_bool(), Some(true));
        assert_eq!(result.as_i32(), None);
        assert_eq!(
            is_positive.call(&[Value::I32(-3)]).unwrap().as_bool(),
            Some(false)
        );

        let as_long = class
            .static_method("asLong", sig(vec![ValueKind::Int32], ValueKind::Int64))
            .unwrap();
        let result = as_long.call(&[Value::I32(41)]).unwrap();
        assert_eq!(result.as_i64(), Some(41));
        assert_eq!(result.as_i32(), None);

        let half = class
            .static_method("half", sig(vec![ValueKind::Int32], ValueKind::Float32))
            .unwrap();
        assert_eq!(half.call(&[Value::I32(7)]).unwrap().as_f32(), Some(3.5));
    });
}

#[test]
fn test_instance_scalar_return_kinds() {
    with_session(|session, _vm| {
        let class = session.find_class("Example").unwrap();
        let obj = class
            .constructor(vec![ValueKind::Int32])
            .unwrap()
            .call(&[Value::I32(8)])
            .unwrap();

        let positive = obj
            .method("counterIsPositive", Signature::returning(ValueKind::Boolean))
            .unwrap();
        assert_eq!(positive.call(&[]).unwrap().as_bool(), Some(true));

        let as_long = obj
            .method("counterAsLong", Signature::returning(ValueKind::Int64))
            .unwrap();
        assert_eq!(as_long.call(&[]).unwrap().as_i64(), Some(8));

        let half = obj
            .method("halfCounter", Signature::returning(ValueKind::Float32))
            .unwrap();
        assert_eq!(half.call(&[]).unwrap().as_f32(), Some(4.0));
    });
}

#[test]
fn test_static_call_passes_a_string_argument() {
    with_session(|session, vm| {
        let class = session.find_class("Example").unwrap();
        let print = class
            .static_method(
                "printString",
                sig(vec![ValueKind::StringRef], ValueKind::Void),
            )
            .unwrap();
        let text = session.new_string("take this").unwrap();
        print.call(&[Value::Str(text)]).unwrap();
        assert_eq!(vm.trace(), vec!["Example says string: take this"]);
    });
}

#[test]
fn test_callables_report_their_binding_in_debug_output() {
    with_session(|session, _vm| {
        let class = session.find_class("Example").unwrap();

        let increment = class
            .static_method("increment", sig(vec![ValueKind::Int32], ValueKind::Int32))
            .unwrap();
        let rendered = format!("{increment:?}");
        assert!(rendered.contains("increment"));
        assert!(rendered.contains("(I)I"));

        let ctor = class.constructor(vec![ValueKind::Int32]).unwrap();
        assert!(format!("{ctor:?}").contains("(I)V"));

        let obj = ctor.call(&[Value::I32(1)]).unwrap();
        let counter = obj
            .method("counter", Signature::returning(ValueKind::Int32))
            .unwrap();
        assert!(format!("{counter:?}").contains("counter"));
    });
}

#[test]
fn test_resolving_missing_member_reports_the_attempted_triple() {
    with_session(|session, _vm| {
        let class = session.find_class("Example").unwrap();
        let err = class
            .static_method("doesNotExist", sig(vec![ValueKind::Int32], ValueKind::Int32))
            .unwrap_err();
        match err {
            Error::Resolution {
                class,
                member,
                descriptor,
                kind,
            } => {
                assert_eq!(class, "Example");
                assert_eq!(member, "doesNotExist");
                assert_eq!(descriptor, "(I)I");
                assert_eq!(kind, MemberKind::Static);
            }
            other => panic!("expected Resolution, got {other:?}"),
        }
    });
}

#[test]
fn test_wrong_lookup_kind_misses() {
    with_session(|session, _vm| {
        let class = session.find_class("Example").unwrap();
        // instance member through the static primitive
        assert!(matches!(
            class
                .static_method(
                    "incrementCounterBy",
                    sig(vec![ValueKind::Int32], ValueKind::Int32)
                )
                .unwrap_err(),
            Error::Resolution {
                kind: MemberKind::Static,
                ..
            }
        ));
        // static member through the instance primitive
        assert!(matches!(
            class
                .resolve_instance("increment", sig(vec![ValueKind::Int32], ValueKind::Int32))
                .unwrap_err(),
            Error::Resolution {
                kind: MemberKind::Instance,
                ..
            }
        ));
    });
}

#[test]
fn test_constructor_signature_forces_void_return() {
    with_session(|session, _vm| {
        let class = session.find_class("Example").unwrap();
        let member = class.resolve_constructor(vec![ValueKind::Int32]).unwrap();
        assert_eq!(member.signature().descriptor(), "(I)V");
        assert_eq!(member.kind(), MemberKind::Constructor);
        assert_eq!(member.name(), jbind::CONSTRUCTOR_NAME);
    });
}

#[test]
fn test_pending_foreign_exception_becomes_an_error() {
    with_session(|session, vm| {
        let class = session.find_class("Example").unwrap();
        let raise = class
            .static_method("raise", Signature::returning(ValueKind::Void))
            .unwrap();
        let err = raise.call(&[]).unwrap_err();
        assert!(matches!(err, Error::ForeignException(_)));
        // the check consumed the pending state
        assert!(!vm.exception_pending());
    });
}

#[test]
fn test_null_reference_result_is_an_error_not_a_handle() {
    with_session(|session, vm| {
        let class = session.find_class("Example").unwrap();
        let missing = class
            .static_method("missing", Signature::returning(ValueKind::ObjectRef))
            .unwrap();
        let before = vm.live_refs();
        let err = missing.call(&[]).unwrap_err();
        match err {
            Error::NullResult { member } => assert_eq!(member, "missing"),
            other => panic!("expected NullResult, got {other:?}"),
        }
        assert_eq!(vm.live_refs(), before);
    });
}

#[test]
fn test_constructor_failure_surfaces_the_exception_not_null() {
    with_session(|session, _vm| {
        let class = session.find_class("Example").unwrap();
        let ctor = class.constructor(vec![ValueKind::StringRef]).unwrap();
        let bogus = session.new_string("not a number").unwrap();
        let err = ctor.call(&[Value::Str(bogus)]).unwrap_err();
        assert!(matches!(err, Error::ForeignException(_)));
    });
}

#[test]
fn test_arity_mismatch_is_rejected_before_any_call() {
    with_session(|session, vm| {
        let class = session.find_class("Example").unwrap();
        let increment = class
            .static_method("increment", sig(vec![ValueKind::Int32], ValueKind::Int32))
            .unwrap();
        let err = increment.call(&[]).unwrap_err();
        assert!(matches!(err, Error::ArgumentMismatch { .. }));
        // nothing reached the runtime
        assert!(vm.trace().is_empty());
    });
}

#[test]
fn test_kind_mismatch_is_rejected_without_coercion() {
    with_session(|session, _vm| {
        let class = session.find_class("Example").unwrap();
        let increment = class
            .static_method("increment", sig(vec![ValueKind::Int32], ValueKind::Int32))
            .unwrap();
        let err = increment.call(&[Value::I64(1)]).unwrap_err();
        assert!(matches!(err, Error::ArgumentMismatch { .. }));
    });
}

#[test]
fn test_resolved_member_can_be_rebound_without_re_resolution() {
    with_session(|session, _vm| {
        let class = session.find_class("Example").unwrap();
        let member = class
            .resolve_static("increment", sig(vec![ValueKind::Int32], ValueKind::Int32))
            .unwrap();
        let first = class.bind_static(member.clone());
        let second = class.bind_static(member);
        assert_eq!(first.call(&[Value::I32(10)]).unwrap().as_i32(), Some(11));
        assert_eq!(second.call(&[Value::I32(20)]).unwrap().as_i32(), Some(21));
    });
}

#[test]
fn test_instance_method_keeps_its_bound_receiver() {
    with_session(|session, _vm| {
        let class = session.find_class("Example").unwrap();
        let ctor = class.constructor(vec![ValueKind::Int32]).unwrap();
        let a = ctor.call(&[Value::I32(100)]).unwrap();
        let b = ctor.call(&[Value::I32(0)]).unwrap();

        let bump_a = a
            .method(
                "incrementCounterBy",
                sig(vec![ValueKind::Int32], ValueKind::Int32),
            )
            .unwrap();
        assert_eq!(bump_a.call(&[Value::I32(1)]).unwrap().as_i32(), Some(101));
        assert_eq!(bump_a.receiver(), &a);

        let counter_b = b
            .method("counter", Signature::returning(ValueKind::Int32))
            .unwrap();
        assert_eq!(counter_b.call(&[]).unwrap().as_i32(), Some(0));
    });
}
