#![cfg(test)]

extern crate jvm_bridge;

mod common;

use std::rc::Rc;

use jvm_bridge::bridge::convert::{can_convert, convert_in, convert_out};
use jvm_bridge::bridge::kind::{TypeKind, TypeRef};
use jvm_bridge::bridge::Context;
use jvm_bridge::env::NativeValue;
use jvm_bridge::{Error, Value};

fn primitive(ctx: &Rc<Context>, kind: TypeKind) -> TypeRef {
    let class = ctx.classifier().primitive_class(kind).unwrap();
    TypeRef::new(ctx, class).unwrap()
}

fn string_type(ctx: &Rc<Context>) -> TypeRef {
    TypeRef::new(ctx, ctx.string_class()).unwrap()
}

fn object_type(ctx: &Rc<Context>) -> TypeRef {
    let object = ctx.find_class("java.lang.Object").unwrap().unwrap();
    TypeRef::new(ctx, &object).unwrap()
}

#[test]
fn classification_is_total_and_repeatable() {
    let (_sandbox, ctx) = common::fixture();
    for &kind in TypeKind::PRIMITIVES.iter() {
        let class = ctx.classifier().primitive_class(kind).unwrap();
        assert_eq!(ctx.classify(class), kind);
        assert_eq!(ctx.classify(class), kind);
    }
    assert_eq!(ctx.classify(ctx.string_class()), TypeKind::Object);
    let int_array = ctx.find_class("[I").unwrap().unwrap();
    assert_eq!(ctx.classify(&int_array), TypeKind::Object);
    let boxed = ctx.find_class("java.lang.Integer").unwrap().unwrap();
    assert_eq!(ctx.classify(&boxed), TypeKind::Object);
}

#[test]
fn string_type_is_recognized() {
    let (_sandbox, ctx) = common::fixture();
    assert!(string_type(&ctx).is_string());
    assert!(!object_type(&ctx).is_string());
    assert!(!primitive(&ctx, TypeKind::Char).is_string());
}

#[test]
fn byte_range() {
    let (_sandbox, ctx) = common::fixture();
    let byte = primitive(&ctx, TypeKind::Byte);
    assert!(can_convert(&ctx, &Value::Int(0), &byte));
    assert!(can_convert(&ctx, &Value::Int(255), &byte));
    assert!(!can_convert(&ctx, &Value::Int(-1), &byte));
    assert!(!can_convert(&ctx, &Value::Int(256), &byte));
    assert!(!can_convert(&ctx, &Value::Float(1.0), &byte));
}

#[test]
fn short_range() {
    let (_sandbox, ctx) = common::fixture();
    let short = primitive(&ctx, TypeKind::Short);
    assert!(can_convert(&ctx, &Value::Int(-32768), &short));
    assert!(can_convert(&ctx, &Value::Int(32767), &short));
    assert!(!can_convert(&ctx, &Value::Int(-32769), &short));
    assert!(!can_convert(&ctx, &Value::Int(32768), &short));
}

#[test]
fn int_and_long_ranges() {
    let (_sandbox, ctx) = common::fixture();
    let int = primitive(&ctx, TypeKind::Int);
    let long = primitive(&ctx, TypeKind::Long);
    assert!(can_convert(&ctx, &Value::Int(i32::MAX as i64), &int));
    assert!(!can_convert(&ctx, &Value::Int(i32::MAX as i64 + 1), &int));
    assert!(can_convert(&ctx, &Value::Int(i64::MIN), &long));
    assert!(!can_convert(&ctx, &Value::Float(1.0), &long));
}

#[test]
fn char_takes_one_code_unit() {
    let (_sandbox, ctx) = common::fixture();
    let ch = primitive(&ctx, TypeKind::Char);
    assert!(can_convert(&ctx, &Value::from("a"), &ch));
    assert!(can_convert(&ctx, &Value::from("\u{e9}"), &ch));
    assert!(!can_convert(&ctx, &Value::from(""), &ch));
    assert!(!can_convert(&ctx, &Value::from("ab"), &ch));
    assert!(!can_convert(&ctx, &Value::from("\u{1f600}"), &ch));
    assert!(!can_convert(&ctx, &Value::Int(65), &ch));
}

#[test]
fn booleans_stay_booleans() {
    let (_sandbox, ctx) = common::fixture();
    let boolean = primitive(&ctx, TypeKind::Boolean);
    let int = primitive(&ctx, TypeKind::Int);
    let double = primitive(&ctx, TypeKind::Double);
    assert!(can_convert(&ctx, &Value::Bool(true), &boolean));
    assert!(!can_convert(&ctx, &Value::Int(1), &boolean));
    assert!(!can_convert(&ctx, &Value::Bool(true), &int));
    assert!(!can_convert(&ctx, &Value::Bool(false), &double));
    assert!(can_convert(&ctx, &Value::Int(3), &double));
}

#[test]
fn void_and_none() {
    let (_sandbox, ctx) = common::fixture();
    let void = primitive(&ctx, TypeKind::Void);
    let int = primitive(&ctx, TypeKind::Int);
    assert!(!can_convert(&ctx, &Value::None, &void));
    assert!(!can_convert(&ctx, &Value::Int(0), &void));
    assert!(!can_convert(&ctx, &Value::None, &int));
    assert!(can_convert(&ctx, &Value::None, &string_type(&ctx)));
    assert!(can_convert(&ctx, &Value::None, &object_type(&ctx)));
}

#[test]
fn convert_in_refuses_what_can_convert_rejects() {
    let (_sandbox, ctx) = common::fixture();
    let byte = primitive(&ctx, TypeKind::Byte);
    match convert_in(&ctx, &Value::Int(256), &byte) {
        Err(Error::Incompatible { expected }) => assert_eq!(expected, TypeKind::Byte),
        other => panic!("unexpected {:?}", other),
    }
    let arg = convert_in(&ctx, &Value::Int(200), &byte).unwrap();
    assert_eq!(arg.value(), NativeValue::Byte(200u8 as i8));
    let ch = primitive(&ctx, TypeKind::Char);
    assert_eq!(convert_in(&ctx, &Value::from("A"), &ch).unwrap().value(), NativeValue::Char(65));
}

#[test]
fn convert_out_checks_the_kind() {
    let (_sandbox, ctx) = common::fixture();
    let boolean = primitive(&ctx, TypeKind::Boolean);
    assert!(convert_out(&ctx, NativeValue::Int(1), &boolean).is_err());
    assert_eq!(convert_out(&ctx, NativeValue::Boolean(true), &boolean).unwrap(), Value::Bool(true));
    let byte = primitive(&ctx, TypeKind::Byte);
    assert_eq!(convert_out(&ctx, NativeValue::Byte(-1), &byte).unwrap(), Value::Int(255));
    let void = primitive(&ctx, TypeKind::Void);
    assert_eq!(convert_out(&ctx, NativeValue::Void, &void).unwrap(), Value::None);
    assert_eq!(convert_out(&ctx, NativeValue::Object(None), &object_type(&ctx)).unwrap(),
               Value::None);
}

#[test]
fn primitives_round_trip() {
    let (_sandbox, ctx) = common::fixture();
    let echo = common::class(&ctx, "demo.Echo");
    let cases = vec![
        ("echoZ", Value::Bool(true)),
        ("echoZ", Value::Bool(false)),
        ("echoB", Value::Int(0)),
        ("echoB", Value::Int(200)),
        ("echoB", Value::Int(255)),
        ("echoC", Value::from("A")),
        ("echoC", Value::from("\u{e9}")),
        ("echoS", Value::Int(-32768)),
        ("echoS", Value::Int(32767)),
        ("echoI", Value::Int(i32::MIN as i64)),
        ("echoJ", Value::Int(i64::MIN)),
        ("echoJ", Value::Int(i64::MAX)),
        ("echoF", Value::Float(1.5)),
        ("echoD", Value::Float(0.1)),
    ];
    for (method, value) in cases {
        let result = echo.call(method, &[value.clone()]).unwrap();
        assert_eq!(result, value, "{}({})", method, value);
    }
    assert_eq!(echo.call("echoD", &[Value::Int(7)]).unwrap(), Value::Float(7.0));
    assert_eq!(echo.call("nothing", &[]).unwrap(), Value::None);
}

#[test]
fn strings_are_text_both_ways() {
    let (_sandbox, ctx) = common::fixture();
    let echo = common::class(&ctx, "demo.Echo");
    for s in &["", "plain", "h\u{e9}llo w\u{f6}rld", "\u{1f600} astral", "nul\u{0}byte"] {
        assert_eq!(echo.call("echoString", &[Value::from(*s)]).unwrap(), Value::from(*s));
    }
    assert_eq!(echo.call("echoString", &[Value::None]).unwrap(), Value::None);
}

#[test]
fn text_needs_a_string_parameter() {
    let (_sandbox, ctx) = common::fixture();
    let echo = common::class(&ctx, "demo.Echo");
    match echo.call("echoObject", &[Value::from("text")]) {
        Err(Error::NoMatchingOverload { arity, rejected, incompatible, .. }) => {
            assert_eq!((arity, rejected, incompatible), (1, 1, 1));
        },
        other => panic!("unexpected {:?}", other),
    }
    assert!(!can_convert(&ctx, &Value::from("text"), &object_type(&ctx)));
}

#[test]
fn strings_come_back_as_text_whatever_the_declared_type() {
    let (_sandbox, ctx) = common::fixture();
    let factory = common::class(&ctx, "demo.ObjFactory");
    assert_eq!(factory.call("text", &[]).unwrap(), Value::from("from java"));
}

#[test]
fn objects_pass_through_object_parameters() {
    let (_sandbox, ctx) = common::fixture();
    let echo = common::class(&ctx, "demo.Echo");
    let point = common::class(&ctx, "demo.Point").create(&[Value::Int(1), Value::Int(2)]).unwrap();
    let result = echo.call("echoObject", &[Value::Instance(point.clone())]).unwrap();
    assert_eq!(result, Value::Instance(point));
    let class = common::class(&ctx, "demo.Point");
    let result = echo.call("echoObject", &[Value::Class(class.clone())]).unwrap();
    assert_eq!(result.as_class(), Some(&class));
}
