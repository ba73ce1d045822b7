//! Host-side wrappers around managed classes, objects, methods and fields.
//!
//! The wrappers are thin consumers of `bridge`: they cache descriptor collections per name and
//! turn absent lookups into `Error::NoSuchAttribute`.

mod class;
mod field;
mod instance;
mod method;

use std::rc::Rc;

use crate::bridge::Context;
use crate::bridge::value::Value;
use crate::error::{Error, Result};

pub use self::class::JavaClass;
pub use self::field::JavaField;
pub use self::instance::JavaInstance;
pub use self::method::{BoundMethod, Callable, UnboundMethod};

/// Wraps the class with the given binary name, written with dots or slashes.
pub fn getclass(ctx: &Rc<Context>, name: &str) -> Result<JavaClass> {
    let dotted = name.replace('/', ".");
    match ctx.find_class(name)? {
        Some(class) => {
            let class = ctx.retain(&class)?;
            Ok(JavaClass::named(ctx, class, dotted))
        },
        None => Err(Error::ClassNotFound(dotted)),
    }
}

/// The result of an attribute lookup on a wrapper.
#[derive(Debug)]
pub enum Attribute {
    /// Methods called with explicit receivers (if any).
    Method(UnboundMethod),
    /// Instance methods bound to a receiver.
    Bound(BoundMethod),
    /// The current value of a field.
    Value(Value),
}

impl Attribute {
    /// Calls the attribute; a field value is not callable.
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        match *self {
            Attribute::Method(ref method) => method.call(args),
            Attribute::Bound(ref method) => method.call(args),
            Attribute::Value(ref value) => Err(Error::NotCallable(value.to_string())),
        }
    }

    pub fn as_callable(&self) -> Option<&dyn Callable> {
        match *self {
            Attribute::Method(ref method) => Some(method),
            Attribute::Bound(ref method) => Some(method),
            Attribute::Value(_) => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Attribute::Value(value) => Some(value),
            _ => None,
        }
    }
}
