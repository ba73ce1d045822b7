//! Calls into a JVM from dynamically-typed code.
//!
//! The `bridge` module is the core: it classifies Java types, converts values in both directions,
//! enumerates the overloads of a method, picks the overload that accepts a list of arguments,
//! and performs the call. Every native interaction goes through the `env::Env` trait, which is
//! implemented over JNI (feature `jvm`) and by the in-process `sandbox` runtime. The `wrapper`
//! module layers attribute-style access on top, the way a scripting language would see Java
//! classes and objects.

#[macro_use]
extern crate log;

#[macro_use]
pub mod logging;

pub mod bootstrap;
pub mod bridge;
pub mod config;
pub mod env;
pub mod error;
pub mod sandbox;
pub mod wrapper;

pub use crate::bridge::value::Value;
pub use crate::bridge::Context;
pub use crate::config::VmConfig;
pub use crate::error::{Error, Result};
pub use crate::wrapper::{getclass, JavaClass, JavaInstance};
