//! Shared harness for session-based integration tests.
//!
//! The session slot is process-wide, so tests within one binary serialize
//! session lifetimes behind a mutex.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;

use jbind::{Session, SessionOptions};
use jbind_testvm::{TestLauncher, TestVm};

static SESSION_LOCK: Mutex<()> = Mutex::new(());

/// Open a fresh session against a fresh test VM and run `f` with both.
pub fn with_session<T>(f: impl FnOnce(&Session, &Arc<TestVm>) -> T) -> T {
    let _guard = SESSION_LOCK.lock();
    let launcher = TestLauncher::new();
    let session =
        Session::open(&launcher, SessionOptions::new()).expect("session should open");
    let vm = launcher.take_vm().expect("launcher retains the launched vm");
    f(&session, &vm)
}

/// Run `f` while holding the session serialization lock, without opening a
/// session first. For tests that drive `Session::open` themselves.
pub fn serialized<T>(f: impl FnOnce() -> T) -> T {
    let _guard = SESSION_LOCK.lock();
    f()
}
