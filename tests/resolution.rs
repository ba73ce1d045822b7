#![cfg(test)]

extern crate jvm_bridge;

mod common;

use std::ptr;
use std::rc::Rc;

use jvm_bridge::bridge::descriptor::{get_field, list_overloads, DescriptorCollection, Purpose,
                                     Visibility};
use jvm_bridge::bridge::kind::TypeKind;
use jvm_bridge::bridge::resolve::{resolve, Resolution};
use jvm_bridge::bridge::Context;
use jvm_bridge::wrapper::Attribute;
use jvm_bridge::{Error, Value};

fn overloads(ctx: &Rc<Context>, class: &str, name: &str) -> DescriptorCollection {
    let class = ctx.find_class(class).unwrap().unwrap();
    list_overloads(ctx, &class, name, false).unwrap().unwrap()
}

#[test]
fn overloads_by_parameter_type() {
    let (_sandbox, ctx) = common::fixture();
    let class = common::class(&ctx, "demo.Overloads");
    assert_eq!(class.call("f", &[Value::Int(5)]).unwrap(), Value::from("int"));
    assert_eq!(class.call("f", &[Value::from("x")]).unwrap(), Value::from("string"));
    match class.call("f", &[Value::Float(5.0)]) {
        Err(Error::NoMatchingOverload { name, arity, rejected, incompatible }) => {
            assert_eq!(name, "f");
            assert_eq!((arity, rejected, incompatible), (1, 2, 2));
        },
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn arity_filters_before_types() {
    let (_sandbox, ctx) = common::fixture();
    let class = common::class(&ctx, "demo.Overloads");
    match class.call("f", &[]) {
        Err(Error::NoMatchingOverload { arity, rejected, incompatible, .. }) => {
            assert_eq!((arity, rejected, incompatible), (0, 2, 0));
        },
        other => panic!("unexpected {:?}", other),
    }
    let f = overloads(&ctx, "demo.Overloads", "f");
    let args = [Value::Int(1), Value::Int(2)];
    match resolve(&ctx, &f, &args, Visibility::Both) {
        Resolution::NoMatch { arity, rejected, incompatible } => {
            assert_eq!((arity, rejected, incompatible), (2, 2, 0));
        },
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn resolution_is_deterministic() {
    let (_sandbox, ctx) = common::fixture();
    let f = overloads(&ctx, "demo.Overloads", "f");
    let args = [Value::Int(5)];
    let first = resolve(&ctx, &f, &args, Visibility::Both).descriptor().unwrap();
    for _ in 0..5 {
        let again = resolve(&ctx, &f, &args, Visibility::Both).descriptor().unwrap();
        assert!(ptr::eq(first, again));
    }
    assert_eq!(first.params()[0].kind(), TypeKind::Int);
    assert!(first.is_static());
}

#[test]
fn first_listed_overload_wins_an_ambiguous_call() {
    let (_sandbox, ctx) = common::fixture();
    let g = overloads(&ctx, "demo.Ambiguous", "g");
    let args = [Value::Int(5)];
    match resolve(&ctx, &g, &args, Visibility::Both) {
        Resolution::Ambiguous { chosen, candidates } => {
            assert_eq!(candidates, 2);
            assert_eq!(chosen.params()[0].kind(), TypeKind::Long);
        },
        other => panic!("unexpected {:?}", other),
    }
    let class = common::class(&ctx, "demo.Ambiguous");
    assert_eq!(class.call("g", &args).unwrap(), Value::from("long"));

    let wide = [Value::Int(1 << 40)];
    match resolve(&ctx, &g, &wide, Visibility::Both) {
        Resolution::Match(descriptor) => assert_eq!(descriptor.params()[0].kind(), TypeKind::Long),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn visibility_gates_static_and_instance_overloads() {
    let (_sandbox, ctx) = common::fixture();
    let pick = overloads(&ctx, "demo.Mixed", "pick");
    assert_eq!(pick.len(), 2);
    assert!(pick.has_static_methods() && pick.has_instance_methods());

    let instance = common::class(&ctx, "demo.Mixed").create(&[]).unwrap();
    let static_args = [Value::Int(1)];
    let instance_args = [Value::Instance(instance), Value::from("s")];

    assert!(resolve(&ctx, &pick, &static_args, Visibility::Static).descriptor().unwrap().is_static());
    match resolve(&ctx, &pick, &static_args, Visibility::Instance) {
        Resolution::NoMatch { rejected, incompatible, .. } => {
            assert_eq!((rejected, incompatible), (1, 0));
        },
        other => panic!("unexpected {:?}", other),
    }
    assert!(!resolve(&ctx, &pick, &instance_args, Visibility::Instance)
        .descriptor().unwrap().is_static());
    assert_eq!(resolve(&ctx, &pick, &instance_args, Visibility::Static).rejected(), 1);
}

#[test]
fn mixed_names_through_wrappers() {
    let (_sandbox, ctx) = common::fixture();
    let class = common::class(&ctx, "demo.Mixed");
    let instance = class.create(&[]).unwrap();
    assert_eq!(class.call("pick", &[Value::Int(1)]).unwrap(), Value::from("static"));
    let explicit = [Value::Instance(instance.clone()), Value::from("s")];
    assert_eq!(class.call("pick", &explicit).unwrap(), Value::from("instance"));
    match instance.getattr("pick").unwrap() {
        Attribute::Bound(method) => {
            assert_eq!(method.receiver(), &Value::Instance(instance.clone()));
        },
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(instance.call("pick", &[Value::from("s")]).unwrap(), Value::from("instance"));
    assert!(instance.call("pick", &[Value::Int(1)]).is_err());
}

#[test]
fn enumeration() {
    let (_sandbox, ctx) = common::fixture();
    let point = ctx.find_class("demo/Point").unwrap().unwrap();

    let constructors = list_overloads(&ctx, &point, "<init>", true).unwrap().unwrap();
    assert_eq!(constructors.purpose(), Purpose::Constructors);
    assert_eq!(constructors.len(), 1);
    let constructor = constructors.get(0).unwrap();
    assert!(constructor.is_constructor() && constructor.is_static());
    assert!(constructor.return_type().is_none());
    let kinds: Vec<TypeKind> = constructor.params().iter().map(|p| p.kind()).collect();
    assert_eq!(kinds, vec![TypeKind::Int, TypeKind::Int]);

    let get_x = overloads(&ctx, "demo.Point", "getX");
    assert_eq!(get_x.purpose(), Purpose::Methods);
    let get_x = get_x.get(0).unwrap();
    assert!(!get_x.is_static());
    assert_eq!(get_x.arity(), 1);
    assert_eq!(get_x.params()[0].kind(), TypeKind::Object);
    assert_eq!(get_x.return_type().map(|r| r.kind()), Some(TypeKind::Int));

    assert!(list_overloads(&ctx, &point, "missing", false).unwrap().is_none());
}

#[test]
fn enumeration_keeps_declaration_order() {
    let (_sandbox, ctx) = common::fixture();
    let abs = overloads(&ctx, "java.lang.Math", "abs");
    let kinds: Vec<TypeKind> = abs.iter().map(|d| d.params()[0].kind()).collect();
    assert_eq!(kinds, vec![TypeKind::Int, TypeKind::Long, TypeKind::Double]);
    let math = common::class(&ctx, "java.lang.Math");
    assert_eq!(math.call("abs", &[Value::Int(-3)]).unwrap(), Value::Int(3));
    assert_eq!(math.call("abs", &[Value::Float(-2.5)]).unwrap(), Value::Float(2.5));
}

#[test]
fn overridden_methods_are_listed_once() {
    let (_sandbox, ctx) = common::fixture();
    assert_eq!(overloads(&ctx, "demo.Dog", "speak").len(), 1);
    assert_eq!(overloads(&ctx, "demo.Dog", "name").len(), 1);
    assert_eq!(overloads(&ctx, "demo.Dog", "hashCode").len(), 1);
}

#[test]
fn field_lookup() {
    let (_sandbox, ctx) = common::fixture();
    let point = ctx.find_class("demo.Point").unwrap().unwrap();
    let settings = ctx.find_class("demo.Settings").unwrap().unwrap();

    assert!(get_field(&ctx, &point, None, "x", Visibility::Static).unwrap().is_none());
    let x = get_field(&ctx, &point, None, "x", Visibility::Both).unwrap().unwrap();
    assert!(!x.is_static());
    assert_eq!(x.field_type().kind(), TypeKind::Int);

    let count = get_field(&ctx, &settings, None, "count", Visibility::Static).unwrap().unwrap();
    assert!(count.is_static());
    assert!(get_field(&ctx, &settings, None, "count", Visibility::Instance).unwrap().is_none());
    assert!(get_field(&ctx, &settings, None, "missing", Visibility::Both).unwrap().is_none());

    let label = get_field(&ctx, &settings, None, "label", Visibility::Static).unwrap().unwrap();
    assert!(label.field_type().is_string());
}
