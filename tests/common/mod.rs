#![allow(dead_code)]

use std::rc::Rc;

use jvm_bridge::bridge::Context;
use jvm_bridge::sandbox::{ClassDef, Sandbox, Val};
use jvm_bridge::wrapper::{getclass, JavaClass};

fn echo(def: ClassDef, name: &str, descriptor: &str) -> ClassDef {
    def.static_method(name, descriptor, |_, _, args| Ok(args[0]))
}

fn echo_class() -> ClassDef {
    let def = ClassDef::new("demo/Echo");
    let def = echo(def, "echoZ", "(Z)Z");
    let def = echo(def, "echoB", "(B)B");
    let def = echo(def, "echoC", "(C)C");
    let def = echo(def, "echoS", "(S)S");
    let def = echo(def, "echoI", "(I)I");
    let def = echo(def, "echoJ", "(J)J");
    let def = echo(def, "echoF", "(F)F");
    let def = echo(def, "echoD", "(D)D");
    let def = echo(def, "echoString", "(Ljava/lang/String;)Ljava/lang/String;");
    let def = echo(def, "echoObject", "(Ljava/lang/Object;)Ljava/lang/Object;");
    def.static_method("nothing", "()V", |_, _, _| Ok(Val::Void))
}

fn overloads() -> ClassDef {
    ClassDef::new("demo/Overloads")
        .constructor("()V", |_, _, _| Ok(Val::Void))
        .static_method("f", "(I)Ljava/lang/String;", |rt, _, _| Ok(rt.new_string("int")))
        .static_method("f", "(Ljava/lang/String;)Ljava/lang/String;", |rt, _, _| {
            Ok(rt.new_string("string"))
        })
}

fn ambiguous() -> ClassDef {
    ClassDef::new("demo/Ambiguous")
        .static_method("g", "(J)Ljava/lang/String;", |rt, _, _| Ok(rt.new_string("long")))
        .static_method("g", "(I)Ljava/lang/String;", |rt, _, _| Ok(rt.new_string("int")))
}

fn mixed() -> ClassDef {
    ClassDef::new("demo/Mixed")
        .constructor("()V", |_, _, _| Ok(Val::Void))
        .static_method("pick", "(I)Ljava/lang/String;", |rt, _, _| Ok(rt.new_string("static")))
        .method("pick", "(Ljava/lang/String;)Ljava/lang/String;", |rt, _, _| {
            Ok(rt.new_string("instance"))
        })
}

fn point() -> ClassDef {
    ClassDef::new("demo/Point")
        .field("x", "I")
        .field("y", "I")
        .static_field("created", "I", Val::Int(0))
        .constructor("(II)V", |rt, this, args| {
            let this = this.unwrap();
            rt.put_field(this, "x", args[0]);
            rt.put_field(this, "y", args[1]);
            let created = rt.get_static("demo/Point", "created").as_int().unwrap_or(0);
            rt.put_static("demo/Point", "created", Val::Int(created + 1));
            Ok(Val::Void)
        })
        .method("getX", "()I", |rt, this, _| Ok(rt.get_field(this.unwrap(), "x")))
        .method("sum", "()I", |rt, this, _| {
            let this = this.unwrap();
            let x = rt.get_field(this, "x").as_int().unwrap_or(0);
            let y = rt.get_field(this, "y").as_int().unwrap_or(0);
            Ok(Val::Int(x + y))
        })
}

fn settings() -> ClassDef {
    ClassDef::new("demo/Settings")
        .static_field("count", "I", Val::Int(0))
        .static_field("ratio", "D", Val::Double(0.5))
        .static_field("label", "Ljava/lang/String;", Val::NULL)
}

fn factory() -> ClassDef {
    ClassDef::new("demo/ObjFactory")
        .static_field("shared", "Ldemo/Point;", Val::NULL)
        .initializer(|rt, _, _| {
            let shared = rt.instantiate("demo/Point")?;
            rt.put_field(shared, "x", Val::Int(1));
            rt.put_field(shared, "y", Val::Int(2));
            rt.put_static("demo/ObjFactory", "shared", Val::Ref(Some(shared)));
            Ok(Val::Void)
        })
        .static_method("make", "(II)Ldemo/Point;", |rt, _, args| {
            let point = rt.instantiate("demo/Point")?;
            rt.put_field(point, "x", args[0]);
            rt.put_field(point, "y", args[1]);
            Ok(Val::Ref(Some(point)))
        })
        .static_method("shared", "()Ldemo/Point;", |rt, _, _| {
            Ok(rt.get_static("demo/ObjFactory", "shared"))
        })
        .static_method("nothing", "()Ldemo/Point;", |_, _, _| Ok(Val::NULL))
        .static_method("text", "()Ljava/lang/Object;", |rt, _, _| Ok(rt.new_string("from java")))
        .static_method("pointClass", "()Ljava/lang/Class;", |rt, _, _| {
            rt.class_object_named("demo/Point").map(|class| Val::Ref(Some(class)))
        })
}

fn thrower() -> ClassDef {
    ClassDef::new("demo/Thrower")
        .static_method("boom", "()V", |rt, _, _| {
            Err(rt.throw("java/lang/IllegalStateException", "boom"))
        })
        .static_method("safe", "()I", |_, _, _| Ok(Val::Int(1)))
}

fn shape() -> ClassDef {
    ClassDef::new("demo/Shape")
        .abstract_class()
        .constructor("()V", |_, _, _| Ok(Val::Void))
        .abstract_method("area", "()D")
}

fn named() -> ClassDef {
    ClassDef::new("demo/Named")
        .interface()
        .abstract_method("name", "()Ljava/lang/String;")
}

fn animal() -> ClassDef {
    ClassDef::new("demo/Animal")
        .field("name", "Ljava/lang/String;")
        .constructor("()V", |_, _, _| Ok(Val::Void))
        .method("speak", "()Ljava/lang/String;", |rt, _, _| Ok(rt.new_string("...")))
}

fn dog() -> ClassDef {
    ClassDef::new("demo/Dog")
        .extends("demo/Animal")
        .implements("demo/Named")
        .constructor("(Ljava/lang/String;)V", |rt, this, args| {
            rt.put_field(this.unwrap(), "name", args[0]);
            Ok(Val::Void)
        })
        .method("speak", "()Ljava/lang/String;", |rt, _, _| Ok(rt.new_string("woof")))
        .method("name", "()Ljava/lang/String;", |rt, this, _| Ok(rt.get_field(this.unwrap(), "name")))
}

fn kennel() -> ClassDef {
    ClassDef::new("demo/Kennel")
        .static_method("adopt", "(Ldemo/Animal;)Ljava/lang/String;", |rt, _, args| {
            match args[0].as_object() {
                Some(animal) => rt.invoke_virtual(animal, "speak", "()Ljava/lang/String;", &[]),
                None => Err(rt.throw("java/lang/NullPointerException", "animal")),
            }
        })
        .static_method("label", "(Ldemo/Named;)Ljava/lang/String;", |rt, _, args| {
            match args[0].as_object() {
                Some(named) => rt.invoke_virtual(named, "name", "()Ljava/lang/String;", &[]),
                None => Err(rt.throw("java/lang/NullPointerException", "named")),
            }
        })
}

/// The demo classes, in an order where every superclass comes first.
pub fn classes() -> Vec<ClassDef> {
    vec![echo_class(), overloads(), ambiguous(), mixed(), point(), settings(), factory(),
         thrower(), shape(), named(), animal(), dog(), kennel()]
}

pub fn sandbox() -> Rc<Sandbox> {
    let sandbox = Sandbox::new().unwrap();
    for def in classes() {
        sandbox.define(def).unwrap();
    }
    sandbox
}

/// A sandbox with the demo classes loaded and a context over it.
pub fn fixture() -> (Rc<Sandbox>, Rc<Context>) {
    let sandbox = sandbox();
    let ctx = Context::new(sandbox.env()).unwrap();
    (sandbox, ctx)
}

pub fn class(ctx: &Rc<Context>, name: &str) -> JavaClass {
    getclass(ctx, name).unwrap()
}
