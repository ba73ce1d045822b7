#![cfg(test)]

extern crate jvm_bridge;

mod common;

use jvm_bridge::Value;

#[test]
fn startup_leaves_no_local_references() {
    let (sandbox, _ctx) = common::fixture();
    assert_eq!(sandbox.local_refs(), 0);
    assert!(sandbox.global_refs() > 0);
    assert_eq!(sandbox.violations(), 0);
}

#[test]
fn calls_release_their_local_references() {
    let (sandbox, ctx) = common::fixture();
    let point = common::class(&ctx, "demo.Point");
    let p = point.create(&[Value::Int(1), Value::Int(2)]).unwrap();
    assert_eq!(p.call("sum", &[]).unwrap(), Value::Int(3));
    assert_eq!(p.getattr("x").unwrap().into_value(), Some(Value::Int(1)));
    assert_eq!(sandbox.local_refs(), 0);

    let echo = common::class(&ctx, "demo.Echo");
    echo.call("echoString", &[Value::from("h\u{e9}llo")]).unwrap();
    echo.call("echoObject", &[Value::Instance(p)]).unwrap();
    assert!(echo.call("echoObject", &[Value::from("text")]).is_err());
    assert_eq!(sandbox.local_refs(), 0);

    let factory = common::class(&ctx, "demo.ObjFactory");
    factory.call("text", &[]).unwrap();
    factory.call("pointClass", &[]).unwrap();
    assert_eq!(sandbox.local_refs(), 0);
    assert_eq!(sandbox.violations(), 0);
}

#[test]
fn exceptions_release_their_local_references() {
    let (sandbox, ctx) = common::fixture();
    let thrower = common::class(&ctx, "demo.Thrower");
    for _ in 0..3 {
        assert!(thrower.call("boom", &[]).is_err());
    }
    assert!(common::class(&ctx, "demo.Shape").create(&[]).is_err());
    assert!(jvm_bridge::getclass(&ctx, "demo.Missing").is_err());
    assert_eq!(sandbox.local_refs(), 0);
    assert!(!sandbox.exception_pending());
    assert_eq!(sandbox.violations(), 0);
}

#[test]
fn dropped_wrappers_release_their_global_references() {
    let (sandbox, ctx) = common::fixture();
    let baseline = sandbox.global_refs();
    {
        let point = common::class(&ctx, "demo.Point");
        let p = point.create(&[Value::Int(1), Value::Int(2)]).unwrap();
        p.call("getX", &[]).unwrap();
        p.getattr("sum").unwrap();
        point.call("getName", &[]).unwrap();
        let shared = common::class(&ctx, "demo.ObjFactory").call("shared", &[]).unwrap();
        assert!(shared.as_instance().is_some());
        assert!(sandbox.global_refs() > baseline);
    }
    assert_eq!(sandbox.global_refs(), baseline);
    assert_eq!(sandbox.violations(), 0);
}

#[test]
fn dropping_the_context_releases_everything() {
    let (sandbox, ctx) = common::fixture();
    let settings = common::class(&ctx, "demo.Settings");
    settings.setattr("count", &Value::Int(3)).unwrap();
    drop(settings);
    drop(ctx);
    assert_eq!(sandbox.global_refs(), 0);
    assert_eq!(sandbox.local_refs(), 0);
    assert_eq!(sandbox.violations(), 0);
}
