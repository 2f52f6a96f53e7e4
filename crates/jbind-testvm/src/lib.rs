//! Scripted in-process foreign runtime for exercising the typed call layer
//!
//! `TestVm` implements [`ForeignRuntime`] over an in-memory `Example` class
//! with counter semantics: static `increment(I)I`, constructors taking
//! nothing, an int, or a string, instance methods that mutate and read the
//! counter, and one fixture method per scalar return kind so every invoke
//! primitive has a caller. Instead of printing, void methods append to an
//! inspectable
//! trace, and the VM keeps per-reference release counts so tests can assert
//! release-exactly-once behavior.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use jbind::runtime::{
    ForeignRuntime, RawArg, RawClass, RawMethodId, RawRef, RuntimeLauncher,
};

const CLASS_EXAMPLE: RawClass = RawClass(1);
const CLASS_STRING: RawClass = RawClass(2);
const CLASS_OBJECT: RawClass = RawClass(3);

struct MethodDef {
    id: u64,
    class: RawClass,
    name: &'static str,
    descriptor: &'static str,
}

// Static and instance tables are disjoint on purpose: a lookup through the
// wrong primitive must miss.
const STATIC_METHODS: &[MethodDef] = &[
    MethodDef { id: 1, class: CLASS_EXAMPLE, name: "printHelloWorld", descriptor: "()V" },
    MethodDef { id: 2, class: CLASS_EXAMPLE, name: "printLong", descriptor: "(J)V" },
    MethodDef { id: 3, class: CLASS_EXAMPLE, name: "print2Long", descriptor: "(JJ)V" },
    MethodDef { id: 4, class: CLASS_EXAMPLE, name: "increment", descriptor: "(I)I" },
    MethodDef { id: 5, class: CLASS_EXAMPLE, name: "raise", descriptor: "()V" },
    MethodDef { id: 6, class: CLASS_EXAMPLE, name: "missing", descriptor: "()Ljava/lang/Object;" },
    MethodDef { id: 14, class: CLASS_EXAMPLE, name: "printString", descriptor: "(Ljava/lang/String;)V" },
    MethodDef { id: 15, class: CLASS_EXAMPLE, name: "isPositive", descriptor: "(I)Z" },
    MethodDef { id: 16, class: CLASS_EXAMPLE, name: "asLong", descriptor: "(I)J" },
    MethodDef { id: 17, class: CLASS_EXAMPLE, name: "half", descriptor: "(I)F" },
];

const INSTANCE_METHODS: &[MethodDef] = &[
    MethodDef { id: 7, class: CLASS_EXAMPLE, name: "<init>", descriptor: "()V" },
    MethodDef { id: 8, class: CLASS_EXAMPLE, name: "<init>", descriptor: "(I)V" },
    MethodDef { id: 9, class: CLASS_EXAMPLE, name: "<init>", descriptor: "(Ljava/lang/String;)V" },
    MethodDef { id: 10, class: CLASS_EXAMPLE, name: "incrementCounterBy", descriptor: "(I)I" },
    MethodDef { id: 11, class: CLASS_EXAMPLE, name: "counter", descriptor: "()I" },
    MethodDef { id: 12, class: CLASS_EXAMPLE, name: "printCounter", descriptor: "()V" },
    MethodDef { id: 13, class: CLASS_EXAMPLE, name: "describe", descriptor: "()Ljava/lang/String;" },
    MethodDef { id: 18, class: CLASS_EXAMPLE, name: "counterIsPositive", descriptor: "()Z" },
    MethodDef { id: 19, class: CLASS_EXAMPLE, name: "counterAsLong", descriptor: "()J" },
    MethodDef { id: 20, class: CLASS_EXAMPLE, name: "halfCounter", descriptor: "()F" },
];

fn lookup(table: &[MethodDef], class: RawClass, name: &str, descriptor: &str) -> Option<RawMethodId> {
    table
        .iter()
        .find(|m| m.class == class && m.name == name && m.descriptor == descriptor)
        .map(|m| RawMethodId(m.id))
}

enum Obj {
    Instance { class: RawClass, counter: i32 },
    Str(Vec<u16>),
}

struct VmState {
    flags: Vec<String>,
    next_ref: u64,
    objects: FxHashMap<u64, Obj>,
    released: FxHashMap<u64, u32>,
    pending: Option<String>,
    fail_next_string: bool,
    trace: Vec<String>,
}

enum Outcome {
    Unit,
    Bool(bool),
    I32(i32),
    I64(i64),
    F32(f32),
    Ref(Option<RawRef>),
}

impl Outcome {
    fn as_bool(&self) -> bool {
        matches!(self, Outcome::Bool(true))
    }

    fn as_i32(&self) -> i32 {
        match self {
            Outcome::I32(v) => *v,
            _ => 0,
        }
    }

    fn as_i64(&self) -> i64 {
        match self {
            Outcome::I64(v) => *v,
            _ => 0,
        }
    }

    fn as_f32(&self) -> f32 {
        match self {
            Outcome::F32(v) => *v,
            _ => 0.0,
        }
    }

    fn into_ref(self) -> Option<RawRef> {
        match self {
            Outcome::Ref(r) => r,
            _ => None,
        }
    }
}

fn arg_i32(args: &[RawArg], index: usize) -> i32 {
    match args.get(index) {
        Some(RawArg::I32(v)) => *v,
        _ => 0,
    }
}

fn arg_i64(args: &[RawArg], index: usize) -> i64 {
    match args.get(index) {
        Some(RawArg::I64(v)) => *v,
        _ => 0,
    }
}

fn arg_ref(args: &[RawArg], index: usize) -> Option<RawRef> {
    match args.get(index) {
        Some(RawArg::Ref(r)) => Some(*r),
        _ => None,
    }
}

/// Scripted foreign runtime instance.
///
/// Dropping the last reference tears the instance down; tests observe that
/// through a `Weak` obtained from [`TestLauncher::take_vm`].
pub struct TestVm {
    state: Mutex<VmState>,
}

impl TestVm {
    /// Fresh VM with no bootstrap flags.
    pub fn new() -> Self {
        Self::with_flags(&[])
    }

    /// Fresh VM recording the given bootstrap flags.
    pub fn with_flags(flags: &[String]) -> Self {
        Self {
            state: Mutex::new(VmState {
                flags: flags.to_vec(),
                next_ref: 1,
                objects: FxHashMap::default(),
                released: FxHashMap::default(),
                pending: None,
                fail_next_string: false,
                trace: Vec::new(),
            }),
        }
    }

    /// Bootstrap flags this VM was launched with.
    pub fn flags(&self) -> Vec<String> {
        self.state.lock().flags.clone()
    }

    /// Trace lines recorded by void methods, in call order.
    pub fn trace(&self) -> Vec<String> {
        self.state.lock().trace.clone()
    }

    /// Number of currently live local references.
    pub fn live_refs(&self) -> usize {
        self.state.lock().objects.len()
    }

    /// How many times `delete_local_ref` ran for this reference.
    pub fn release_count(&self, r: RawRef) -> u32 {
        self.state.lock().released.get(&r.0).copied().unwrap_or(0)
    }

    /// Whether a foreign exception is pending right now.
    pub fn exception_pending(&self) -> bool {
        self.state.lock().pending.is_some()
    }

    /// Make the next string creation fail, as a broken runtime would.
    pub fn fail_next_string_creation(&self) {
        self.state.lock().fail_next_string = true;
    }

    fn alloc(state: &mut VmState, obj: Obj) -> RawRef {
        let id = state.next_ref;
        state.next_ref += 1;
        state.objects.insert(id, obj);
        RawRef(id)
    }

    fn counter_of(state: &VmState, recv: Option<RawRef>) -> Option<i32> {
        match recv.and_then(|r| state.objects.get(&r.0)) {
            Some(Obj::Instance { counter, .. }) => Some(*counter),
            _ => None,
        }
    }

    fn read_string(state: &VmState, r: Option<RawRef>) -> Option<String> {
        let r = r?;
        match state.objects.get(&r.0) {
            Some(Obj::Str(chars)) => String::from_utf16(chars).ok(),
            _ => None,
        }
    }

    fn construct(state: &mut VmState, counter: i32) -> Outcome {
        state.trace.push(format!("new Example with counter {counter}"));
        Outcome::Ref(Some(Self::alloc(
            state,
            Obj::Instance {
                class: CLASS_EXAMPLE,
                counter,
            },
        )))
    }

    fn dispatch(&self, recv: Option<RawRef>, method: RawMethodId, args: &[RawArg]) -> Outcome {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        match method.0 {
            1 => {
                state.trace.push("Example says: Hello World!".to_string());
                Outcome::Unit
            }
            2 => {
                state.trace.push(format!("Example says long: {}", arg_i64(args, 0)));
                Outcome::Unit
            }
            3 => {
                state.trace.push(format!(
                    "Example says 2 long: {} {}",
                    arg_i64(args, 0),
                    arg_i64(args, 1)
                ));
                Outcome::Unit
            }
            4 => Outcome::I32(arg_i32(args, 0) + 1),
            5 => {
                state.pending = Some("raise() was called".to_string());
                Outcome::Unit
            }
            6 => Outcome::Ref(None),
            7 => Self::construct(state, 0),
            8 => Self::construct(state, arg_i32(args, 0)),
            9 => match Self::read_string(state, arg_ref(args, 0))
                .and_then(|s| s.trim().parse::<i32>().ok())
            {
                Some(counter) => Self::construct(state, counter),
                None => {
                    state.pending = Some("constructor argument is not a number".to_string());
                    Outcome::Ref(None)
                }
            },
            10 => match recv.and_then(|r| state.objects.get_mut(&r.0)) {
                Some(Obj::Instance { counter, .. }) => {
                    *counter += arg_i32(args, 0);
                    Outcome::I32(*counter)
                }
                _ => {
                    state.pending = Some("receiver is not an Example instance".to_string());
                    Outcome::I32(0)
                }
            },
            11 => Outcome::I32(Self::counter_of(state, recv).unwrap_or(0)),
            12 => {
                let counter = Self::counter_of(state, recv);
                if let Some(counter) = counter {
                    state.trace.push(format!("counter is {counter}"));
                }
                Outcome::Unit
            }
            13 => match Self::counter_of(state, recv) {
                Some(counter) => {
                    let text: Vec<u16> = format!("counter is {counter}").encode_utf16().collect();
                    Outcome::Ref(Some(Self::alloc(state, Obj::Str(text))))
                }
                None => Outcome::Ref(None),
            },
            14 => match Self::read_string(state, arg_ref(args, 0)) {
                Some(text) => {
                    state.trace.push(format!("Example says string: {text}"));
                    Outcome::Unit
                }
                None => {
                    state.pending = Some("argument is not a string".to_string());
                    Outcome::Unit
                }
            },
            15 => Outcome::Bool(arg_i32(args, 0) > 0),
            16 => Outcome::I64(i64::from(arg_i32(args, 0))),
            17 => Outcome::F32(arg_i32(args, 0) as f32 / 2.0),
            18 => Outcome::Bool(Self::counter_of(state, recv).unwrap_or(0) > 0),
            19 => Outcome::I64(i64::from(Self::counter_of(state, recv).unwrap_or(0))),
            20 => Outcome::F32(Self::counter_of(state, recv).unwrap_or(0) as f32 / 2.0),
            _ => {
                state.pending = Some(format!("unknown method id {}", method.0));
                Outcome::Unit
            }
        }
    }
}

impl Default for TestVm {
    fn default() -> Self {
        Self::new()
    }
}

impl ForeignRuntime for TestVm {
    fn find_class(&self, name: &str) -> Option<RawClass> {
        match name {
            "Example" => Some(CLASS_EXAMPLE),
            "java/lang/String" => Some(CLASS_STRING),
            "java/lang/Object" => Some(CLASS_OBJECT),
            _ => None,
        }
    }

    fn class_name(&self, class: RawClass) -> String {
        match class {
            CLASS_EXAMPLE => "Example",
            CLASS_STRING => "java/lang/String",
            _ => "java/lang/Object",
        }
        .to_string()
    }

    fn object_class(&self, obj: RawRef) -> RawClass {
        match self.state.lock().objects.get(&obj.0) {
            Some(Obj::Instance { class, .. }) => *class,
            Some(Obj::Str(_)) => CLASS_STRING,
            None => CLASS_OBJECT,
        }
    }

    fn static_method_id(
        &self,
        class: RawClass,
        name: &str,
        descriptor: &str,
    ) -> Option<RawMethodId> {
        lookup(STATIC_METHODS, class, name, descriptor)
    }

    fn instance_method_id(
        &self,
        class: RawClass,
        name: &str,
        descriptor: &str,
    ) -> Option<RawMethodId> {
        lookup(INSTANCE_METHODS, class, name, descriptor)
    }

    fn call_static_void(&self, _class: RawClass, method: RawMethodId, args: &[RawArg]) {
        self.dispatch(None, method, args);
    }

    fn call_static_bool(&self, _class: RawClass, method: RawMethodId, args: &[RawArg]) -> bool {
        self.dispatch(None, method, args).as_bool()
    }

    fn call_static_i32(&self, _class: RawClass, method: RawMethodId, args: &[RawArg]) -> i32 {
        self.dispatch(None, method, args).as_i32()
    }

    fn call_static_i64(&self, _class: RawClass, method: RawMethodId, args: &[RawArg]) -> i64 {
        self.dispatch(None, method, args).as_i64()
    }

    fn call_static_f32(&self, _class: RawClass, method: RawMethodId, args: &[RawArg]) -> f32 {
        self.dispatch(None, method, args).as_f32()
    }

    fn call_static_object(
        &self,
        _class: RawClass,
        method: RawMethodId,
        args: &[RawArg],
    ) -> Option<RawRef> {
        self.dispatch(None, method, args).into_ref()
    }

    fn call_void(&self, recv: RawRef, method: RawMethodId, args: &[RawArg]) {
        self.dispatch(Some(recv), method, args);
    }

    fn call_bool(&self, recv: RawRef, method: RawMethodId, args: &[RawArg]) -> bool {
        self.dispatch(Some(recv), method, args).as_bool()
    }

    fn call_i32(&self, recv: RawRef, method: RawMethodId, args: &[RawArg]) -> i32 {
        self.dispatch(Some(recv), method, args).as_i32()
    }

    fn call_i64(&self, recv: RawRef, method: RawMethodId, args: &[RawArg]) -> i64 {
        self.dispatch(Some(recv), method, args).as_i64()
    }

    fn call_f32(&self, recv: RawRef, method: RawMethodId, args: &[RawArg]) -> f32 {
        self.dispatch(Some(recv), method, args).as_f32()
    }

    fn call_object(&self, recv: RawRef, method: RawMethodId, args: &[RawArg]) -> Option<RawRef> {
        self.dispatch(Some(recv), method, args).into_ref()
    }

    fn new_object(
        &self,
        _class: RawClass,
        ctor: RawMethodId,
        args: &[RawArg],
    ) -> Option<RawRef> {
        self.dispatch(None, ctor, args).into_ref()
    }

    fn new_string(&self, utf16: &[u16]) -> Option<RawRef> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if state.fail_next_string {
            state.fail_next_string = false;
            return None;
        }
        Some(Self::alloc(state, Obj::Str(utf16.to_vec())))
    }

    fn string_chars(&self, s: RawRef) -> Vec<u16> {
        match self.state.lock().objects.get(&s.0) {
            Some(Obj::Str(chars)) => chars.clone(),
            _ => Vec::new(),
        }
    }

    fn delete_local_ref(&self, r: RawRef) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.objects.remove(&r.0);
        *state.released.entry(r.0).or_insert(0) += 1;
    }

    fn take_exception(&self) -> Option<String> {
        self.state.lock().pending.take()
    }
}

/// Launcher producing [`TestVm`] instances, with an optional forced
/// bootstrap failure.
#[derive(Default)]
pub struct TestLauncher {
    fail_status: Option<i32>,
    last: Mutex<Option<Arc<TestVm>>>,
}

impl TestLauncher {
    /// Launcher that boots successfully.
    pub fn new() -> Self {
        Self::default()
    }

    /// Launcher whose every launch fails with `status`.
    pub fn failing(status: i32) -> Self {
        Self {
            fail_status: Some(status),
            ..Self::default()
        }
    }

    /// Clone of the most recently launched VM, for inspection.
    pub fn vm(&self) -> Option<Arc<TestVm>> {
        self.last.lock().clone()
    }

    /// Take the retained VM reference out of the launcher, so tests can
    /// observe teardown through a `Weak`.
    pub fn take_vm(&self) -> Option<Arc<TestVm>> {
        self.last.lock().take()
    }
}

impl RuntimeLauncher for TestLauncher {
    fn launch(&self, options: &[String]) -> Result<Arc<dyn ForeignRuntime>, i32> {
        if let Some(status) = self.fail_status {
            return Err(status);
        }
        let vm = Arc::new(TestVm::with_flags(options));
        *self.last.lock() = Some(vm.clone());
        Ok(vm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_tables_are_disjoint() {
        // increment is static only
        assert!(lookup(STATIC_METHODS, CLASS_EXAMPLE, "increment", "(I)I").is_some());
        assert!(lookup(INSTANCE_METHODS, CLASS_EXAMPLE, "increment", "(I)I").is_none());
        // incrementCounterBy is instance only
        assert!(lookup(INSTANCE_METHODS, CLASS_EXAMPLE, "incrementCounterBy", "(I)I").is_some());
        assert!(lookup(STATIC_METHODS, CLASS_EXAMPLE, "incrementCounterBy", "(I)I").is_none());
    }

    #[test]
    fn test_lookup_requires_exact_descriptor() {
        assert!(lookup(STATIC_METHODS, CLASS_EXAMPLE, "increment", "(J)I").is_none());
        assert!(lookup(STATIC_METHODS, CLASS_EXAMPLE, "increment", "(I)V").is_none());
    }

    #[test]
    fn test_increment_semantics() {
        let vm = TestVm::new();
        let mid = vm
            .static_method_id(CLASS_EXAMPLE, "increment", "(I)I")
            .unwrap();
        assert_eq!(vm.call_static_i32(CLASS_EXAMPLE, mid, &[RawArg::I32(41)]), 42);
    }

    #[test]
    fn test_scalar_returns_come_back_through_their_own_primitive() {
        let vm = TestVm::new();
        let pos = vm
            .static_method_id(CLASS_EXAMPLE, "isPositive", "(I)Z")
            .unwrap();
        assert!(vm.call_static_bool(CLASS_EXAMPLE, pos, &[RawArg::I32(1)]));
        assert!(!vm.call_static_bool(CLASS_EXAMPLE, pos, &[RawArg::I32(-1)]));
        let long = vm.static_method_id(CLASS_EXAMPLE, "asLong", "(I)J").unwrap();
        assert_eq!(vm.call_static_i64(CLASS_EXAMPLE, long, &[RawArg::I32(7)]), 7);
        let half = vm.static_method_id(CLASS_EXAMPLE, "half", "(I)F").unwrap();
        assert_eq!(vm.call_static_f32(CLASS_EXAMPLE, half, &[RawArg::I32(7)]), 3.5);
    }

    #[test]
    fn test_print_string_records_the_argument() {
        let vm = TestVm::new();
        let s = vm
            .new_string(&"words".encode_utf16().collect::<Vec<_>>())
            .unwrap();
        let mid = vm
            .static_method_id(CLASS_EXAMPLE, "printString", "(Ljava/lang/String;)V")
            .unwrap();
        vm.call_static_void(CLASS_EXAMPLE, mid, &[RawArg::Ref(s)]);
        assert_eq!(vm.trace(), vec!["Example says string: words"]);
    }

    #[test]
    fn test_take_exception_clears_pending_state() {
        let vm = TestVm::new();
        let mid = vm.static_method_id(CLASS_EXAMPLE, "raise", "()V").unwrap();
        vm.call_static_void(CLASS_EXAMPLE, mid, &[]);
        assert!(vm.exception_pending());
        assert!(vm.take_exception().is_some());
        assert!(!vm.exception_pending());
        assert!(vm.take_exception().is_none());
    }

    #[test]
    fn test_release_bookkeeping() {
        let vm = TestVm::new();
        let s = vm.new_string(&"hi".encode_utf16().collect::<Vec<_>>()).unwrap();
        assert_eq!(vm.live_refs(), 1);
        vm.delete_local_ref(s);
        assert_eq!(vm.live_refs(), 0);
        assert_eq!(vm.release_count(s), 1);
    }
}
