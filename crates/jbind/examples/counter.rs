//! Drives the typed call layer against the scripted test VM: static calls,
//! a constructor taking a foreign string, and instance calls on the result.

use jbind::{Session, SessionOptions, Signature, Value, ValueKind};
use jbind_testvm::TestLauncher;

fn main() -> jbind::Result<()> {
    let launcher = TestLauncher::new();
    let session = Session::open(
        &launcher,
        SessionOptions::new().flag("-verbose:gc"),
    )?;
    let class = session.find_class("Example")?;

    class
        .static_method("printHelloWorld", Signature::returning(ValueKind::Void))?
        .call(&[])?;

    let increment = class.static_method(
        "increment",
        Signature::new(vec![ValueKind::Int32], ValueKind::Int32),
    )?;
    let one_up = increment.call(&[Value::I32(1)])?.as_i32().unwrap();
    println!("1 incremented by the runtime is {one_up}");

    let ctor = class.constructor(vec![ValueKind::StringRef])?;
    let obj = ctor.call(&[Value::Str(session.new_string("5")?)])?;
    let bump = obj.method(
        "incrementCounterBy",
        Signature::new(vec![ValueKind::Int32], ValueKind::Int32),
    )?;
    let counter = bump.call(&[Value::I32(2)])?.as_i32().unwrap();
    println!("after incrementing, counter is {counter}");

    let describe = obj.method("describe", Signature::returning(ValueKind::StringRef))?;
    let text = describe.call(&[])?.into_string().unwrap();
    println!("the runtime says: {}", text.read()?);

    for line in launcher.vm().unwrap().trace() {
        println!("[vm] {line}");
    }

    session.close();
    Ok(())
}
