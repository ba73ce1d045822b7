//! An in-process managed runtime implementing `Env`.
//!
//! The sandbox models what the bridge needs from a JVM: classes with superclasses and
//! interfaces, objects, strings, arrays, reflection objects, static and instance fields, method
//! bodies written as Rust closures, pending exceptions, and local and global reference tables.
//! It keeps count of live references and of calls that a real JVM would not tolerate (a call
//! made while an exception is pending, or through the wrong call shape), so tests can check
//! that the bridge releases everything it takes and clears every exception it causes.

pub mod access_flags;
mod class;
mod class_loader;
mod heap;
mod native;
mod runtime;
pub mod sig;
mod value;

use std::cell::{RefCell, RefMut};
use std::rc::Rc;

use thiserror::Error;

use crate::bridge::kind::TypeKind;
use crate::env::{Env, FieldId, Handle, MethodId, NativeValue};

pub use self::class::{Class, ClassDef, ClassId, Shape};
pub use self::heap::{ArrayData, Member};
pub use self::native::NativeMethod;
pub use self::runtime::Runtime;
pub use self::value::{ObjId, Throw, Val};

/// Why a class definition was refused.
#[derive(Debug, Error)]
pub enum DefineError {
    #[error("class {0} is already defined")]
    Duplicate(String),
    #[error("class {0} is not defined")]
    Missing(String),
    #[error("malformed descriptor {0}")]
    Descriptor(String),
    #[error("initial value of field {0} has the wrong type")]
    Value(String),
    #[error("initializer of {0} threw {1}")]
    Initializer(String, String),
}

#[derive(Debug)]
pub struct Sandbox {
    state: RefCell<Runtime>,
}

impl Sandbox {
    /// A runtime with the built-in classes loaded.
    pub fn new() -> Result<Rc<Sandbox>, DefineError> {
        let mut runtime = Runtime::new();
        for def in native::builtin_classes() {
            runtime.define(def)?;
        }
        debug!("sandbox started with {} built-in methods", runtime.methods.len());
        Ok(Rc::new(Sandbox { state: RefCell::new(runtime) }))
    }

    /// Loads a class. Its superclass and interfaces must already be loaded.
    pub fn define(&self, def: ClassDef) -> Result<ClassId, DefineError> {
        let name = String::from(def.name());
        let id = self.rt().define(def)?;
        debug!("defined {}", name);
        Ok(id)
    }

    /// This sandbox as the environment the bridge talks to.
    pub fn env(self: &Rc<Self>) -> Rc<dyn Env> {
        self.clone()
    }

    /// Runs `f` with direct access to the runtime, e.g. to set up objects for a test.
    pub fn with_runtime<F, R>(&self, f: F) -> R
        where F: FnOnce(&mut Runtime) -> R
    {
        f(&mut self.rt())
    }

    /// Live local references.
    pub fn local_refs(&self) -> usize {
        self.state.borrow().refs.locals()
    }

    /// Live global references.
    pub fn global_refs(&self) -> usize {
        self.state.borrow().refs.globals()
    }

    /// Calls that were made while an exception was pending, or that did not match the callee.
    pub fn violations(&self) -> usize {
        self.state.borrow().violations
    }

    /// Whether an exception is pending.
    pub fn exception_pending(&self) -> bool {
        self.state.borrow().pending.is_some()
    }

    fn rt(&self) -> RefMut<'_, Runtime> {
        self.state.borrow_mut()
    }
}

/// Counts a violation; `false` if the call must not proceed.
fn violation(rt: &mut Runtime, what: &str) -> bool {
    rt.violations += 1;
    warn!("sandbox: {}", what);
    false
}

/// Refuses calls made while an exception is pending.
fn enter(rt: &mut Runtime, call: &str) -> bool {
    if rt.pending.is_some() {
        violation(rt, &format!("{} called with an exception pending", call))
    } else {
        true
    }
}

fn to_val(rt: &Runtime, value: NativeValue) -> Val {
    match value {
        NativeValue::Void => Val::Void,
        NativeValue::Boolean(b) => Val::Boolean(b),
        NativeValue::Byte(b) => Val::Byte(b),
        NativeValue::Char(c) => Val::Char(c),
        NativeValue::Short(s) => Val::Short(s),
        NativeValue::Int(i) => Val::Int(i),
        NativeValue::Long(l) => Val::Long(l),
        NativeValue::Float(f) => Val::Float(f),
        NativeValue::Double(d) => Val::Double(d),
        NativeValue::Object(handle) => Val::Ref(handle.map(|handle| rt.refs.resolve(handle))),
    }
}

fn to_native(rt: &mut Runtime, value: Val) -> NativeValue {
    match value {
        Val::Void => NativeValue::Void,
        Val::Boolean(b) => NativeValue::Boolean(b),
        Val::Byte(b) => NativeValue::Byte(b),
        Val::Char(c) => NativeValue::Char(c),
        Val::Short(s) => NativeValue::Short(s),
        Val::Int(i) => NativeValue::Int(i),
        Val::Long(l) => NativeValue::Long(l),
        Val::Float(f) => NativeValue::Float(f),
        Val::Double(d) => NativeValue::Double(d),
        Val::Ref(object) => NativeValue::Object(object.map(|object| rt.refs.new_local(object))),
    }
}

/// Turns the outcome of a method body into the native result, leaving a thrown exception
/// pending.
fn finish(rt: &mut Runtime, result: Result<Val, Throw>, ret: TypeKind) -> NativeValue {
    match result {
        Ok(value) => to_native(rt, value),
        Err(Throw(exception)) => {
            rt.pending = Some(exception);
            NativeValue::zero(ret)
        },
    }
}

fn class_id(rt: &mut Runtime, class: Handle) -> Option<ClassId> {
    let object = rt.refs.resolve(class);
    let id = rt.class_of_class_object(object);
    if id.is_none() {
        violation(rt, "class handle does not refer to a class object");
    }
    id
}

fn method_index(rt: &mut Runtime, method: MethodId) -> Option<usize> {
    let index = method.as_raw() - 1;
    if index < rt.methods.len() {
        Some(index)
    } else {
        violation(rt, "invalid method id");
        None
    }
}

fn field_index(rt: &mut Runtime, field: FieldId) -> Option<usize> {
    let index = field.as_raw() - 1;
    if index < rt.fields.len() {
        Some(index)
    } else {
        violation(rt, "invalid field id");
        None
    }
}

/// Whether `object` is an instance of the class declaring the field at `index`.
fn holds_field(rt: &Runtime, object: ObjId, index: usize) -> bool {
    rt.class_of(object).map_or(false, |class| rt.loader.is_assignable(class, rt.fields[index].class))
}

fn method_id(index: usize) -> Option<MethodId> {
    MethodId::new(index + 1)
}

/// Checks the arguments of a call against the callee's parameters and converts them.
fn arguments(rt: &mut Runtime, method: usize, args: &[NativeValue]) -> Option<Vec<Val>> {
    let matches = {
        let params = &rt.methods[method].sig.params;
        params.len() == args.len()
            && params.iter().zip(args).all(|(param, arg)| param.kind() == arg.kind())
    };
    if matches {
        Some(args.iter().map(|&arg| to_val(rt, arg)).collect())
    } else {
        let what = format!("arguments {:?} do not match {}{}", args, rt.methods[method].name,
                           rt.methods[method].descriptor);
        violation(rt, &what);
        None
    }
}

impl Env for Sandbox {
    fn find_class(&self, name: &str) -> Option<Handle> {
        let mut rt = self.rt();
        if !enter(&mut rt, "FindClass") {
            return None;
        }
        match rt.find_class(name) {
            Some(id) => {
                let object = rt.class_object(id);
                Some(rt.refs.new_local(object))
            },
            None => {
                let exception = rt.throw("java/lang/NoClassDefFoundError", name);
                rt.pending = Some(exception.0);
                None
            },
        }
    }

    fn get_object_class(&self, object: Handle) -> Handle {
        let mut rt = self.rt();
        let object = rt.refs.resolve(object);
        let class = rt.class_of(object).unwrap_or(0);
        let class_object = rt.class_object(class);
        rt.refs.new_local(class_object)
    }

    fn is_assignable_from(&self, sub: Handle, sup: Handle) -> bool {
        let mut rt = self.rt();
        match (class_id(&mut rt, sub), class_id(&mut rt, sup)) {
            (Some(sub), Some(sup)) => rt.loader.is_assignable(sub, sup),
            _ => false,
        }
    }

    fn is_same_object(&self, a: Option<Handle>, b: Option<Handle>) -> bool {
        let rt = self.state.borrow();
        a.map(|a| rt.refs.resolve(a)) == b.map(|b| rt.refs.resolve(b))
    }

    fn get_method_id(&self, class: Handle, name: &str, descriptor: &str) -> Option<MethodId> {
        let mut rt = self.rt();
        if !enter(&mut rt, "GetMethodID") {
            return None;
        }
        let class = class_id(&mut rt, class)?;
        match rt.find_method(class, name, descriptor, false) {
            Some(index) => method_id(index),
            None => {
                let exception = rt.throw("java/lang/NoSuchMethodError", name);
                rt.pending = Some(exception.0);
                None
            },
        }
    }

    fn get_static_method_id(&self, class: Handle, name: &str, descriptor: &str)
                            -> Option<MethodId> {
        let mut rt = self.rt();
        if !enter(&mut rt, "GetStaticMethodID") {
            return None;
        }
        let class = class_id(&mut rt, class)?;
        match rt.find_method(class, name, descriptor, true) {
            Some(index) => method_id(index),
            None => {
                let exception = rt.throw("java/lang/NoSuchMethodError", name);
                rt.pending = Some(exception.0);
                None
            },
        }
    }

    fn get_static_field_id(&self, class: Handle, name: &str, descriptor: &str)
                           -> Option<FieldId> {
        let mut rt = self.rt();
        if !enter(&mut rt, "GetStaticFieldID") {
            return None;
        }
        let class = class_id(&mut rt, class)?;
        match rt.find_static_field(class, name, descriptor) {
            Some(index) => FieldId::new(index + 1),
            None => {
                let exception = rt.throw("java/lang/NoSuchFieldError", name);
                rt.pending = Some(exception.0);
                None
            },
        }
    }

    fn from_reflected_method(&self, method: Handle) -> Option<MethodId> {
        let mut rt = self.rt();
        let object = rt.refs.resolve(method);
        match rt.member(object) {
            Some(Member::Method(index)) | Some(Member::Constructor(index)) => method_id(index),
            _ => {
                violation(&mut rt, "FromReflectedMethod on a non-method");
                None
            },
        }
    }

    fn from_reflected_field(&self, field: Handle) -> Option<FieldId> {
        let mut rt = self.rt();
        let object = rt.refs.resolve(field);
        match rt.member(object) {
            Some(Member::Field(index)) => FieldId::new(index + 1),
            _ => {
                violation(&mut rt, "FromReflectedField on a non-field");
                None
            },
        }
    }

    fn call_method(&self, object: Handle, method: MethodId, ret: TypeKind, args: &[NativeValue])
                   -> NativeValue {
        let mut rt = self.rt();
        if !enter(&mut rt, "CallMethod") {
            return NativeValue::zero(ret);
        }
        let method = match method_index(&mut rt, method) {
            Some(method) => method,
            None => return NativeValue::zero(ret),
        };
        if rt.methods[method].is_static() || rt.methods[method].return_kind() != ret {
            let what = format!("{} called through the {} instance call shape",
                               rt.methods[method].name, ret);
            violation(&mut rt, &what);
            return NativeValue::zero(ret);
        }
        let args = match arguments(&mut rt, method, args) {
            Some(args) => args,
            None => return NativeValue::zero(ret),
        };
        let receiver = rt.refs.resolve(object);
        let class = rt.class_of(receiver).unwrap_or(0);
        let target = rt.select(class, method);
        let result = rt.invoke(target, Some(receiver), &args);
        finish(&mut rt, result, ret)
    }

    fn call_static_method(&self, class: Handle, method: MethodId, ret: TypeKind,
                          args: &[NativeValue]) -> NativeValue {
        let mut rt = self.rt();
        if !enter(&mut rt, "CallStaticMethod") {
            return NativeValue::zero(ret);
        }
        let method = match method_index(&mut rt, method) {
            Some(method) => method,
            None => return NativeValue::zero(ret),
        };
        let class_matches = class_id(&mut rt, class)
            .map_or(false, |class| rt.loader.is_assignable(class, rt.methods[method].class));
        if !rt.methods[method].is_static() || rt.methods[method].return_kind() != ret
                || !class_matches {
            let what = format!("{} called through the {} static call shape",
                               rt.methods[method].name, ret);
            violation(&mut rt, &what);
            return NativeValue::zero(ret);
        }
        let args = match arguments(&mut rt, method, args) {
            Some(args) => args,
            None => return NativeValue::zero(ret),
        };
        let result = rt.invoke(method, None, &args);
        finish(&mut rt, result, ret)
    }

    fn new_object(&self, class: Handle, constructor: MethodId, args: &[NativeValue])
                  -> Option<Handle> {
        let mut rt = self.rt();
        if !enter(&mut rt, "NewObject") {
            return None;
        }
        let class = class_id(&mut rt, class)?;
        let constructor = method_index(&mut rt, constructor)?;
        if !rt.methods[constructor].is_constructor() || rt.methods[constructor].class != class {
            violation(&mut rt, "NewObject with a method that is not a constructor of the class");
            return None;
        }
        let args = arguments(&mut rt, constructor, args)?;
        if rt.class(class).map_or(true, |class| class.is_abstract()) {
            let name = rt.loader.name_of(class).replace('/', ".");
            let exception = rt.throw("java/lang/InstantiationException", &name);
            rt.pending = Some(exception.0);
            return None;
        }
        let object = rt.alloc(class);
        match rt.invoke(constructor, Some(object), &args) {
            Ok(Val::Ref(Some(replacement))) => Some(rt.refs.new_local(replacement)),
            Ok(_) => Some(rt.refs.new_local(object)),
            Err(Throw(exception)) => {
                rt.pending = Some(exception);
                None
            },
        }
    }

    fn get_field(&self, object: Handle, field: FieldId, kind: TypeKind) -> NativeValue {
        let mut rt = self.rt();
        if !enter(&mut rt, "GetField") {
            return NativeValue::zero(kind);
        }
        let field = match field_index(&mut rt, field) {
            Some(field) => field,
            None => return NativeValue::zero(kind),
        };
        let object = rt.refs.resolve(object);
        if rt.fields[field].is_static() || rt.fields[field].ty.kind() != kind
                || !holds_field(&rt, object, field) {
            violation(&mut rt, "GetField shape does not match the field");
            return NativeValue::zero(kind);
        }
        let value = rt.get_field_at(object, field);
        to_native(&mut rt, value)
    }

    fn set_field(&self, object: Handle, field: FieldId, value: NativeValue) {
        let mut rt = self.rt();
        if !enter(&mut rt, "SetField") {
            return;
        }
        let field = match field_index(&mut rt, field) {
            Some(field) => field,
            None => return,
        };
        let object = rt.refs.resolve(object);
        if rt.fields[field].is_static() || rt.fields[field].ty.kind() != value.kind()
                || !holds_field(&rt, object, field) {
            violation(&mut rt, "SetField shape does not match the field");
            return;
        }
        let value = to_val(&rt, value);
        if !rt.put_field_at(object, field, value) {
            violation(&mut rt, "SetField on an object without fields");
        }
    }

    fn get_static_field(&self, class: Handle, field: FieldId, kind: TypeKind) -> NativeValue {
        let mut rt = self.rt();
        if !enter(&mut rt, "GetStaticField") {
            return NativeValue::zero(kind);
        }
        let field = match field_index(&mut rt, field) {
            Some(field) => field,
            None => return NativeValue::zero(kind),
        };
        let class_matches = class_id(&mut rt, class)
            .map_or(false, |class| rt.loader.is_assignable(class, rt.fields[field].class));
        if !rt.fields[field].is_static() || rt.fields[field].ty.kind() != kind || !class_matches {
            violation(&mut rt, "GetStaticField shape does not match the field");
            return NativeValue::zero(kind);
        }
        let value = rt.fields[field].value;
        to_native(&mut rt, value)
    }

    fn set_static_field(&self, class: Handle, field: FieldId, value: NativeValue) {
        let mut rt = self.rt();
        if !enter(&mut rt, "SetStaticField") {
            return;
        }
        let field = match field_index(&mut rt, field) {
            Some(field) => field,
            None => return,
        };
        let class_matches = class_id(&mut rt, class)
            .map_or(false, |class| rt.loader.is_assignable(class, rt.fields[field].class));
        if !rt.fields[field].is_static() || rt.fields[field].ty.kind() != value.kind()
                || !class_matches {
            violation(&mut rt, "SetStaticField shape does not match the field");
            return;
        }
        let value = to_val(&rt, value);
        rt.fields[field].value = value;
    }

    fn array_length(&self, array: Handle) -> usize {
        let mut rt = self.rt();
        let array = rt.refs.resolve(array);
        match rt.array(array).map(ArrayData::len) {
            Some(length) => length,
            None => {
                violation(&mut rt, "GetArrayLength on a non-array");
                0
            },
        }
    }

    fn object_array_element(&self, array: Handle, index: usize) -> Option<Handle> {
        let mut rt = self.rt();
        if !enter(&mut rt, "GetObjectArrayElement") {
            return None;
        }
        let array = rt.refs.resolve(array);
        let element = match rt.array(array) {
            Some(&ArrayData::References(ref elements)) => Some(elements.get(index).cloned()),
            _ => None,
        };
        let element = match element {
            Some(element) => element,
            None => {
                violation(&mut rt, "GetObjectArrayElement on a non-reference array");
                return None;
            },
        };
        match element {
            Some(element) => element.map(|element| rt.refs.new_local(element)),
            None => {
                let message = format!("index {} out of bounds", index);
                let exception = rt.throw("java/lang/ArrayIndexOutOfBoundsException", &message);
                rt.pending = Some(exception.0);
                None
            },
        }
    }

    fn new_byte_array(&self, bytes: &[u8]) -> Option<Handle> {
        let mut rt = self.rt();
        if !enter(&mut rt, "NewByteArray") {
            return None;
        }
        let array = rt.new_byte_array(bytes.iter().map(|&b| b as i8).collect());
        Some(rt.refs.new_local(array))
    }

    fn byte_array_contents(&self, array: Handle) -> Vec<u8> {
        let mut rt = self.rt();
        let array = rt.refs.resolve(array);
        let contents = match rt.array(array) {
            Some(&ArrayData::Bytes(ref bytes)) => Some(bytes.iter().map(|&b| b as u8).collect()),
            _ => None,
        };
        contents.unwrap_or_else(|| {
            violation(&mut rt, "GetByteArrayRegion on a non-byte array");
            vec![]
        })
    }

    fn new_global_ref(&self, object: Handle) -> Option<Handle> {
        let mut rt = self.rt();
        let object = rt.refs.resolve(object);
        Some(rt.refs.new_global(object))
    }

    fn delete_global_ref(&self, object: Handle) {
        self.rt().refs.release(object, true);
    }

    fn delete_local_ref(&self, object: Handle) {
        self.rt().refs.release(object, false);
    }

    fn take_exception(&self) -> Option<Handle> {
        let mut rt = self.rt();
        match rt.pending.take() {
            Some(exception) => Some(rt.refs.new_local(exception)),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::heap::Object;

    #[test]
    fn builtins_load() {
        let sandbox = Sandbox::new().unwrap();
        sandbox.with_runtime(|rt| {
            assert!(rt.find_class("java/lang/String").is_some());
            assert!(rt.find_class("[Ljava/lang/String;").is_some());
            assert!(rt.find_class("int").is_some());
            assert!(rt.find_class("java/lang/Missing").is_none());
            let utf8 = rt.get_static("java/nio/charset/StandardCharsets", "UTF_8");
            assert!(utf8.as_object().is_some());
        });
    }

    #[test]
    fn strings() {
        let sandbox = Sandbox::new().unwrap();
        sandbox.with_runtime(|rt| {
            let s = rt.new_string("h\u{e9}llo");
            let object = s.as_object().unwrap();
            assert!(matches!(rt.heap.get(object), Some(&Object::Str { .. })));
            assert_eq!(rt.string(s), Some(String::from("h\u{e9}llo")));
            let length = rt.invoke_virtual(object, "length", "()I", &[]).unwrap();
            assert_eq!(length, Val::Int(5));
        });
    }

    #[test]
    fn abstract_methods_throw() {
        let sandbox = Sandbox::new().unwrap();
        sandbox.with_runtime(|rt| {
            let s = rt.new_string("x").as_object().unwrap();
            let name = rt.class_name_of(s);
            assert_eq!(name, "java.lang.String");
            let number = rt.instantiate("java/lang/Number").unwrap();
            let thrown = rt.invoke_virtual(number, "intValue", "()I", &[]).unwrap_err();
            assert_eq!(rt.class_name_of(thrown.0), "java.lang.AbstractMethodError");
        });
    }

    #[test]
    fn throwables_describe_themselves() {
        let sandbox = Sandbox::new().unwrap();
        sandbox.with_runtime(|rt| {
            let Throw(exception) = rt.throw("java/lang/IllegalStateException", "broken");
            assert_eq!(rt.describe(exception), "java.lang.IllegalStateException: broken");
        });
    }

    #[test]
    fn rejects_bad_definitions() {
        let sandbox = Sandbox::new().unwrap();
        let missing = sandbox.define(ClassDef::new("demo/A").extends("demo/Nope"));
        assert!(matches!(missing, Err(DefineError::Missing(_))));
        let malformed = sandbox.define(ClassDef::new("demo/B").field("x", "Q"));
        assert!(matches!(malformed, Err(DefineError::Descriptor(_))));
        let mistyped = sandbox.define(ClassDef::new("demo/C").static_field("x", "I", Val::Long(1)));
        assert!(matches!(mistyped, Err(DefineError::Value(_))));
        assert!(sandbox.define(ClassDef::new("demo/D")).is_ok());
        assert!(matches!(sandbox.define(ClassDef::new("demo/D")), Err(DefineError::Duplicate(_))));
    }

    #[test]
    fn fields_belong_to_their_class() {
        let sandbox = Sandbox::new().unwrap();
        sandbox.define(ClassDef::new("demo/Counter").static_field("count", "I", Val::Int(7))
            .field("step", "I").constructor("()V", |_, _, _| Ok(Val::Void))).unwrap();
        let counter = sandbox.find_class("demo/Counter").unwrap();
        let object = sandbox.find_class("java/lang/Object").unwrap();
        let count = sandbox.get_static_field_id(counter, "count", "I").unwrap();
        let step = sandbox.with_runtime(|rt| rt.fields.iter().position(|field| field.name == "step"));
        let step = FieldId::new(step.unwrap() + 1).unwrap();

        assert_eq!(sandbox.get_static_field(counter, count, TypeKind::Int), NativeValue::Int(7));
        assert_eq!(sandbox.violations(), 0);
        assert_eq!(sandbox.get_static_field(object, count, TypeKind::Int), NativeValue::Int(0));
        assert_eq!(sandbox.violations(), 1);
        sandbox.set_static_field(object, count, NativeValue::Int(9));
        assert_eq!(sandbox.violations(), 2);
        assert_eq!(sandbox.get_static_field(counter, count, TypeKind::Int), NativeValue::Int(7));

        let constructor = sandbox.get_method_id(counter, "<init>", "()V").unwrap();
        let instance = sandbox.new_object(counter, constructor, &[]).unwrap();
        sandbox.set_field(instance, step, NativeValue::Int(3));
        assert_eq!(sandbox.get_field(instance, step, TypeKind::Int), NativeValue::Int(3));
        assert_eq!(sandbox.violations(), 2);
        let text = sandbox.with_runtime(|rt| {
            let s = rt.new_string("x").as_object().unwrap();
            rt.refs.new_local(s)
        });
        assert_eq!(sandbox.get_field(text, step, TypeKind::Int), NativeValue::Int(0));
        assert_eq!(sandbox.violations(), 3);
    }

    #[test]
    fn pending_exceptions_block_calls() {
        let sandbox = Sandbox::new().unwrap();
        assert!(sandbox.find_class("demo/Nowhere").is_none());
        assert!(sandbox.exception_pending());
        assert!(sandbox.find_class("java/lang/Object").is_none());
        assert_eq!(sandbox.violations(), 1);
        let exception = sandbox.take_exception().unwrap();
        sandbox.delete_local_ref(exception);
        assert!(!sandbox.exception_pending());
        let object = sandbox.find_class("java/lang/Object").unwrap();
        sandbox.delete_local_ref(object);
        assert_eq!(sandbox.local_refs(), 0);
    }
}
