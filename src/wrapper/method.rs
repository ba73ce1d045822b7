use std::fmt;
use std::rc::Rc;

use crate::bridge::descriptor::{DescriptorCollection, Visibility};
use crate::bridge::dispatch;
use crate::bridge::resolve::{resolve, Resolution};
use crate::bridge::value::Value;
use crate::error::{Error, Result};
use crate::wrapper::JavaClass;

/// Something that can be called with a tuple of host values.
pub trait Callable {
    fn name(&self) -> &str;
    fn call(&self, args: &[Value]) -> Result<Value>;
}

fn no_match(name: &str, resolution: &Resolution, arity: usize) -> Error {
    let (rejected, incompatible) = match *resolution {
        Resolution::NoMatch { rejected, incompatible, .. } => (rejected, incompatible),
        _ => (0, 0),
    };
    Error::NoMatchingOverload {
        name: String::from(name),
        arity: arity,
        rejected: rejected,
        incompatible: incompatible,
    }
}

/// The overloads of a name looked up on a class.
///
/// Static and instance overloads are both visible; an instance overload takes its receiver as
/// the first argument.
pub struct UnboundMethod {
    class: JavaClass,
    overloads: Rc<DescriptorCollection>,
}

impl UnboundMethod {
    pub fn new(class: JavaClass, overloads: Rc<DescriptorCollection>) -> UnboundMethod {
        UnboundMethod {
            class: class,
            overloads: overloads,
        }
    }

    pub fn overloads(&self) -> &DescriptorCollection {
        &self.overloads
    }
}

impl Callable for UnboundMethod {
    fn name(&self) -> &str {
        self.overloads.name()
    }

    /// If no overload accepts `args`, methods of `java.lang.Class` bound to the class object are
    /// tried before giving up, so that `getName()` works on any class.
    fn call(&self, args: &[Value]) -> Result<Value> {
        let ctx = self.class.context();
        let resolution = resolve(ctx, &self.overloads, args, Visibility::Both);
        match resolution.descriptor() {
            Some(descriptor) => dispatch::invoke(ctx, descriptor, None, self.class.handle(), args),
            None => {
                if let Some(fallback) = self.class.class_method(self.name())? {
                    if fallback.accepts(args) {
                        return fallback.call(args);
                    }
                }
                Err(no_match(self.name(), &resolution, args.len()))
            },
        }
    }
}

impl fmt::Debug for UnboundMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "UnboundMethod({}.{})", self.class.name(), self.name())
    }
}

/// Instance overloads of a name, bound to a receiver.
pub struct BoundMethod {
    receiver: Value,
    class: JavaClass,
    overloads: Rc<DescriptorCollection>,
}

impl BoundMethod {
    /// `class` is the class the overloads were enumerated from; `receiver` is an instance or a
    /// class object.
    pub fn new(receiver: Value, class: JavaClass, overloads: Rc<DescriptorCollection>)
               -> BoundMethod {
        BoundMethod {
            receiver: receiver,
            class: class,
            overloads: overloads,
        }
    }

    pub fn receiver(&self) -> &Value {
        &self.receiver
    }

    fn with_receiver(&self, args: &[Value]) -> Vec<Value> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(self.receiver.clone());
        full.extend_from_slice(args);
        full
    }

    /// Whether some overload accepts `args`.
    pub fn accepts(&self, args: &[Value]) -> bool {
        let full = self.with_receiver(args);
        resolve(self.class.context(), &self.overloads, &full, Visibility::Instance)
            .descriptor()
            .is_some()
    }
}

impl Callable for BoundMethod {
    fn name(&self) -> &str {
        self.overloads.name()
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        let ctx = self.class.context();
        let full = self.with_receiver(args);
        let resolution = resolve(ctx, &self.overloads, &full, Visibility::Instance);
        match resolution.descriptor() {
            Some(descriptor) => dispatch::invoke(ctx, descriptor, None, self.class.handle(), &full),
            None => Err(no_match(self.name(), &resolution, args.len())),
        }
    }
}

impl fmt::Debug for BoundMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "BoundMethod({}.{} on {})", self.class.name(), self.name(), self.receiver)
    }
}
