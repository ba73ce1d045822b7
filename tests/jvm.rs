#![cfg(test)]
#![cfg(feature = "jvm")]

extern crate jvm_bridge;

use std::f64::consts::FRAC_PI_2;
use std::rc::Rc;

use jvm_bridge::bootstrap::{self, locate_libjvm};
use jvm_bridge::{getclass, Error, Value, VmConfig};

// One JVM per process, so everything runs in a single test.
#[test]
fn calls_into_an_installed_jvm() {
    let library = match locate_libjvm() {
        Some(library) => library,
        None => {
            println!("no JVM installed, skipping");
            return;
        },
    };
    let config = VmConfig::new(library.clone());
    let ctx = bootstrap::launch(&config).unwrap();
    assert!(Rc::ptr_eq(&ctx, &bootstrap::require_context().unwrap()));

    let math = getclass(&ctx, "java.lang.Math").unwrap();
    assert_eq!(math.call("sin", &[Value::Float(FRAC_PI_2)]).unwrap(), Value::Float(1.0));
    match math.call("sin", &[Value::Int(4), Value::Int(2)]) {
        Err(Error::NoMatchingOverload { arity, .. }) => assert_eq!(arity, 2),
        other => panic!("unexpected {:?}", other),
    }

    let integer = getclass(&ctx, "java.lang.Integer").unwrap();
    assert_eq!(integer.call("parseInt", &[Value::from("42")]).unwrap(), Value::Int(42));
    let err = integer.call("parseInt", &[Value::from("x")]).unwrap_err();
    assert!(err.is_exception("java.lang.NumberFormatException"), "{:?}", err);

    let vector = getclass(&ctx, "java.util.Vector").unwrap().create(&[Value::Int(10)]).unwrap();
    assert_eq!(vector.call("capacity", &[]).unwrap(), Value::Int(10));
    let empty = getclass(&ctx, "java.util.Collections").unwrap().call("emptyList", &[]).unwrap();
    assert_eq!(empty.as_instance().unwrap().call("size", &[]).unwrap(), Value::Int(0));

    let builder = getclass(&ctx, "java.lang.StringBuilder").unwrap()
        .create(&[Value::from("h\u{e9}llo")]).unwrap();
    assert_eq!(builder.call("toString", &[]).unwrap(), Value::from("h\u{e9}llo"));

    assert!(!bootstrap::start(&library, &[]));
    match bootstrap::launch(&config) {
        Err(Error::AlreadyStarted) => {},
        other => panic!("unexpected {:?}", other),
    }
}
