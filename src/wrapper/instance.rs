use std::fmt;
use std::rc::Rc;

use once_cell::unsync::OnceCell;

use crate::bridge::Context;
use crate::bridge::descriptor::{self, FieldDescriptor, Visibility};
use crate::bridge::dispatch;
use crate::bridge::value::Value;
use crate::env::Ref;
use crate::error::Result;
use crate::wrapper::{Attribute, BoundMethod, JavaClass, JavaField, UnboundMethod};

struct Inner {
    ctx: Rc<Context>,
    object: Ref,
    class: OnceCell<JavaClass>,
}

/// A managed object other than a String or a class.
///
/// Two instances are equal when they wrap the same object.
#[derive(Clone)]
pub struct JavaInstance {
    inner: Rc<Inner>,
}

impl JavaInstance {
    /// Wraps a retained object reference. Its class is looked up when first needed.
    pub fn new(ctx: &Rc<Context>, object: Ref) -> JavaInstance {
        JavaInstance {
            inner: Rc::new(Inner {
                ctx: ctx.clone(),
                object: object,
                class: OnceCell::new(),
            }),
        }
    }

    pub fn handle(&self) -> &Ref {
        &self.inner.object
    }

    pub fn context(&self) -> &Rc<Context> {
        &self.inner.ctx
    }

    /// The runtime class of the object.
    pub fn class(&self) -> Result<&JavaClass> {
        self.inner.class.get_or_try_init(|| {
            let ctx = &self.inner.ctx;
            let class = ctx.class_of(&self.inner.object);
            ctx.retain(&class).map(|class| JavaClass::wrap(ctx, class))
        })
    }

    pub fn class_name(&self) -> String {
        catching!(self.class())
            .map_or_else(|| String::from("<unknown class>"), |class| String::from(class.name()))
    }

    /// Looks `name` up as a method, then as a field of either kind.
    ///
    /// Names with at least one instance overload are bound to this object; names with only
    /// static overloads come back unbound.
    pub fn getattr(&self, name: &str) -> Result<Attribute> {
        let class = self.class()?;
        if let Some(methods) = class.methods(name)? {
            return if methods.has_instance_methods() {
                Ok(Attribute::Bound(BoundMethod::new(Value::Instance(self.clone()), class.clone(),
                                                     methods)))
            } else {
                Ok(Attribute::Method(UnboundMethod::new(class.clone(), methods)))
            };
        }
        match self.field_descriptor(name)? {
            Some(field) => {
                dispatch::get_field_value(&self.inner.ctx, &field, Some(&self.inner.object))
                    .map(Attribute::Value)
            },
            None => Err(class.no_such_attribute(name)),
        }
    }

    /// Writes a field of either kind.
    pub fn setattr(&self, name: &str, value: &Value) -> Result<()> {
        self.field(name)?.set(value)
    }

    pub fn field(&self, name: &str) -> Result<JavaField> {
        match self.field_descriptor(name)? {
            Some(field) => Ok(JavaField::new(&self.inner.ctx, field, Some(self.clone()))),
            None => Err(self.class()?.no_such_attribute(name)),
        }
    }

    /// Calls the method named `name` on this object.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        self.getattr(name)?.call(args)
    }

    fn field_descriptor(&self, name: &str) -> Result<Option<FieldDescriptor>> {
        let class = self.class()?;
        descriptor::get_field(&self.inner.ctx, class.handle(), Some(&self.inner.object), name,
                              Visibility::Both)
    }
}

impl PartialEq for JavaInstance {
    fn eq(&self, other: &JavaInstance) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner) || self.inner.object.same_object(&other.inner.object)
    }
}

impl fmt::Debug for JavaInstance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "JavaInstance({:?}, {})", self.inner.object.handle(), self.class_name())
    }
}
