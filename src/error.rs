//! Failures reported by the bridge.
//!
//! Every core operation returns its failures; nothing is raised across the boundary with the
//! managed runtime. A Java exception left pending by a native call is taken and cleared right
//! after that call and surfaces here as `Error::Exception`.

use std::result;
use std::string::FromUtf8Error;

use thiserror::Error;

use crate::bridge::kind::TypeKind;

#[derive(Debug, Error)]
pub enum Error {
    /// The JVM library could not be loaded or refused to start.
    #[error("JVM startup failed: {0}")]
    Startup(String),
    /// `start()` was called after a JVM had already been started in this process.
    #[error("attempt to start the JVM a second time")]
    AlreadyStarted,
    /// No JVM is running on this thread.
    #[error("the JVM is not running")]
    NotRunning,
    /// A class or member the bridge itself relies on is missing from the runtime.
    #[error("runtime is missing {0}")]
    Init(String),
    #[error("class not found: {0}")]
    ClassNotFound(String),
    /// Neither a method nor a field with this name is visible from the wrapper.
    #[error("{class} has no attribute '{name}'")]
    NoSuchAttribute { class: String, name: String },
    /// Overloads exist under this name but none accepts the arguments. `rejected` counts every
    /// overload that was considered; `incompatible` counts the ones with the right arity whose
    /// parameter types did not accept the values.
    #[error("no overload of '{name}' accepts these {arity} argument(s) \
             ({rejected} rejected, {incompatible} with matching arity)")]
    NoMatchingOverload { name: String, arity: usize, rejected: usize, incompatible: usize },
    /// An attribute holding a value was called like a method.
    #[error("{0} is not callable")]
    NotCallable(String),
    /// A field exists but the value cannot be stored in it.
    #[error("value has the wrong type for field '{name}'")]
    FieldType { name: String },
    /// `convert_in` was asked for a conversion that `can_convert` rejects.
    #[error("value is not convertible to {expected:?}")]
    Incompatible { expected: TypeKind },
    /// An instance method was called without a receiver.
    #[error("instance method '{0}' called without a receiver")]
    NullReceiver(String),
    /// The runtime could not hand out another reference.
    #[error("the runtime could not create a reference")]
    ReferenceExhausted,
    /// A Java exception was thrown by a native call.
    #[error("{description}")]
    Exception { class: String, description: String },
    #[error("string is not valid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),
}

impl Error {
    /// Returns true if this is a Java exception of the given class (binary name with dots).
    pub fn is_exception(&self, class_name: &str) -> bool {
        match *self {
            Error::Exception { ref class, .. } => class == class_name,
            _ => false,
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
