use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use once_cell::unsync::OnceCell;

use crate::bridge::Context;
use crate::bridge::descriptor::{self, DescriptorCollection, Visibility};
use crate::bridge::dispatch;
use crate::bridge::resolve::{resolve, Resolution};
use crate::bridge::value::Value;
use crate::env::Ref;
use crate::error::{Error, Result};
use crate::wrapper::{Attribute, BoundMethod, JavaField, JavaInstance, UnboundMethod};

type Overloads = Option<Rc<DescriptorCollection>>;

struct Inner {
    ctx: Rc<Context>,
    class: Ref,
    name: OnceCell<String>,
    constructors: OnceCell<Overloads>,
    methods: RefCell<HashMap<String, Rc<DescriptorCollection>>>,
    class_methods: RefCell<HashMap<String, Rc<DescriptorCollection>>>,
}

/// A managed class.
///
/// Clones share the same class reference and the same overload caches.
#[derive(Clone)]
pub struct JavaClass {
    inner: Rc<Inner>,
}

impl JavaClass {
    /// Wraps a retained class reference; the name is looked up when first needed.
    pub fn wrap(ctx: &Rc<Context>, class: Ref) -> JavaClass {
        JavaClass {
            inner: Rc::new(Inner {
                ctx: ctx.clone(),
                class: class,
                name: OnceCell::new(),
                constructors: OnceCell::new(),
                methods: RefCell::new(HashMap::new()),
                class_methods: RefCell::new(HashMap::new()),
            }),
        }
    }

    pub(crate) fn named(ctx: &Rc<Context>, class: Ref, name: String) -> JavaClass {
        let class = JavaClass::wrap(ctx, class);
        let _ = class.inner.name.set(name);
        class
    }

    /// The binary name with dots, e.g. `java.lang.String`.
    pub fn name(&self) -> &str {
        self.inner.name.get_or_init(|| {
            catching!(self.inner.ctx.class_name(&self.inner.class))
                .unwrap_or_else(|| String::from("<unknown class>"))
        })
    }

    pub fn handle(&self) -> &Ref {
        &self.inner.class
    }

    pub fn context(&self) -> &Rc<Context> {
        &self.inner.ctx
    }

    /// The public constructors, enumerated once per wrapper.
    pub fn constructors(&self) -> Result<Overloads> {
        self.inner.constructors.get_or_try_init(|| {
            descriptor::list_overloads(&self.inner.ctx, &self.inner.class, self.name(), true)
                .map(|overloads| overloads.map(Rc::new))
        }).map(Clone::clone)
    }

    /// The public methods named `name`, enumerated once per wrapper and name.
    pub fn methods(&self, name: &str) -> Result<Overloads> {
        cached(&self.inner.methods, name, || {
            descriptor::list_overloads(&self.inner.ctx, &self.inner.class, name, false)
        })
    }

    /// Instance methods of `java.lang.Class` named `name`, bound to this class object.
    pub fn class_method(&self, name: &str) -> Result<Option<BoundMethod>> {
        let ctx = &self.inner.ctx;
        let overloads = cached(&self.inner.class_methods, name, || {
            descriptor::list_overloads(ctx, ctx.class_class(), name, false)
        })?;
        let overloads = match overloads {
            Some(ref overloads) if overloads.has_instance_methods() => overloads.clone(),
            _ => return Ok(None),
        };
        let class_class = JavaClass::wrap(ctx, ctx.retain(ctx.class_class())?);
        Ok(Some(BoundMethod::new(Value::Class(self.clone()), class_class, overloads)))
    }

    /// Constructs a new instance, choosing the constructor that accepts `args`.
    pub fn create(&self, args: &[Value]) -> Result<JavaInstance> {
        let constructors = match self.constructors()? {
            Some(constructors) => constructors,
            None => {
                return Err(Error::NoMatchingOverload {
                    name: String::from(self.name()),
                    arity: args.len(),
                    rejected: 0,
                    incompatible: 0,
                });
            },
        };
        let ctx = &self.inner.ctx;
        let constructor = match resolve(ctx, &constructors, args, Visibility::Both) {
            Resolution::NoMatch { arity, rejected, incompatible } => {
                return Err(Error::NoMatchingOverload {
                    name: String::from(self.name()),
                    arity: arity,
                    rejected: rejected,
                    incompatible: incompatible,
                });
            },
            resolution => resolution.descriptor(),
        };
        match constructor {
            Some(constructor) => {
                match dispatch::invoke(ctx, constructor, None, &self.inner.class, args)? {
                    Value::Instance(instance) => Ok(instance),
                    other => Err(Error::Init(format!("constructor of {} returned {}",
                                                     self.name(), other))),
                }
            },
            None => Err(Error::NoSuchAttribute {
                class: String::from(self.name()),
                name: String::from("<init>"),
            }),
        }
    }

    /// Looks `name` up as a method, then a static field, then a method of the class object
    /// itself.
    pub fn getattr(&self, name: &str) -> Result<Attribute> {
        if let Some(methods) = self.methods(name)? {
            return Ok(Attribute::Method(UnboundMethod::new(self.clone(), methods)));
        }
        if let Some(field) = self.static_field(name)? {
            return dispatch::get_field_value(&self.inner.ctx, &field, None).map(Attribute::Value);
        }
        if let Some(method) = self.class_method(name)? {
            return Ok(Attribute::Bound(method));
        }
        Err(self.no_such_attribute(name))
    }

    /// Writes a static field.
    pub fn setattr(&self, name: &str, value: &Value) -> Result<()> {
        self.field(name)?.set(value)
    }

    /// A static field of this class.
    pub fn field(&self, name: &str) -> Result<JavaField> {
        match self.static_field(name)? {
            Some(field) => Ok(JavaField::new(&self.inner.ctx, field, None)),
            None => Err(self.no_such_attribute(name)),
        }
    }

    /// Calls the method named `name`.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        self.getattr(name)?.call(args)
    }

    /// The class object itself, as an instance of `java.lang.Class`.
    pub fn as_instance(&self) -> Result<JavaInstance> {
        let ctx = &self.inner.ctx;
        Ok(JavaInstance::new(ctx, ctx.retain(&self.inner.class)?))
    }

    /// Whether this class is `other`, extends it or implements it.
    pub fn is_subclass_of(&self, other: &JavaClass) -> bool {
        self.inner.ctx.is_subclass(&self.inner.class, &other.inner.class)
    }

    fn static_field(&self, name: &str) -> Result<Option<descriptor::FieldDescriptor>> {
        descriptor::get_field(&self.inner.ctx, &self.inner.class, None, name, Visibility::Static)
    }

    pub(crate) fn no_such_attribute(&self, name: &str) -> Error {
        Error::NoSuchAttribute {
            class: String::from(self.name()),
            name: String::from(name),
        }
    }
}

/// Looks `name` up in `cache`, filling it with `list` on a miss. Only names that were found are
/// kept.
fn cached<F>(cache: &RefCell<HashMap<String, Rc<DescriptorCollection>>>, name: &str, list: F)
             -> Result<Overloads>
    where F: FnOnce() -> Result<Option<DescriptorCollection>>
{
    if let Some(overloads) = cache.borrow().get(name) {
        return Ok(Some(overloads.clone()));
    }
    let overloads = list()?.map(Rc::new);
    if let Some(ref overloads) = overloads {
        cache.borrow_mut().insert(String::from(name), overloads.clone());
    }
    Ok(overloads)
}

impl PartialEq for JavaClass {
    fn eq(&self, other: &JavaClass) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner) || self.inner.class.same_object(&other.inner.class)
    }
}

impl fmt::Debug for JavaClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "JavaClass({})", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::sandbox::Sandbox;
    use crate::wrapper::getclass;

    #[test]
    fn only_found_names_are_cached() {
        let sandbox = Sandbox::new().unwrap();
        let ctx = Context::new(sandbox.env()).unwrap();
        let integer = getclass(&ctx, "java.lang.Integer").unwrap();
        for name in &["nope", "missing", "absent"] {
            assert!(integer.getattr(name).is_err());
        }
        assert!(integer.inner.methods.borrow().is_empty());
        assert!(integer.inner.class_methods.borrow().is_empty());

        assert_eq!(integer.call("parseInt", &[Value::from("12")]).unwrap(), Value::Int(12));
        assert_eq!(integer.call("getName", &[]).unwrap(), Value::from("java.lang.Integer"));
        assert_eq!(integer.inner.methods.borrow().len(), 1);
        assert_eq!(integer.inner.class_methods.borrow().len(), 1);
        assert!(integer.methods("parseInt").unwrap().is_some());
        assert_eq!(integer.inner.methods.borrow().len(), 1);
    }
}
