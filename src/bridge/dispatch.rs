//! Invocation of a resolved overload and access to a resolved field.

use std::rc::Rc;

use crate::bridge::Context;
use crate::bridge::convert::{can_convert, convert_in, convert_out, NativeArg};
use crate::bridge::descriptor::{FieldDescriptor, MethodDescriptor};
use crate::bridge::value::Value;
use crate::env::{NativeValue, Ref};
use crate::error::{Error, Result};
use crate::wrapper::JavaInstance;

fn receiver_of(value: &Value) -> Option<&Ref> {
    match *value {
        Value::Instance(ref instance) => Some(instance.handle()),
        Value::Class(ref class) => Some(class.handle()),
        _ => None,
    }
}

/// Calls `desc` with `args`, which line up with its parameters.
///
/// For an instance method, slot 0 is the receiver: `receiver` if given, otherwise the object in
/// `args[0]`. Slot 0 is never converted. Static methods and constructors are called on `class`.
/// Constructors return the new object as an instance wrapper.
pub fn invoke(ctx: &Rc<Context>, desc: &MethodDescriptor, receiver: Option<&Ref>, class: &Ref,
              args: &[Value]) -> Result<Value> {
    let params = desc.params();
    if args.len() != params.len() {
        return Err(Error::NoMatchingOverload {
            name: String::from(desc.name()),
            arity: args.len(),
            rejected: 1,
            incompatible: 0,
        });
    }

    let receiver = if desc.is_static() {
        None
    } else {
        let receiver = receiver.or_else(|| args.first().and_then(receiver_of));
        Some(receiver.ok_or_else(|| Error::NullReceiver(String::from(desc.name())))?)
    };
    let first = if receiver.is_some() { 1 } else { 0 };

    let converted = args[first..].iter().zip(&params[first..])
        .map(|(arg, param)| convert_in(ctx, arg, param))
        .collect::<Result<Vec<NativeArg>>>()?;
    let natives: Vec<NativeValue> = converted.iter().map(NativeArg::value).collect();

    let env = ctx.env();
    let ret = match desc.return_type() {
        Some(ret) => ret,
        None => {
            let object = ctx.local(env.new_object(class.handle(), desc.id(), &natives));
            let object = ctx.check(object)?.ok_or(Error::ReferenceExhausted)?;
            return Ok(Value::Instance(JavaInstance::new(ctx, ctx.retain(&object)?)));
        },
    };
    let result = match receiver {
        Some(receiver) => env.call_method(receiver.handle(), desc.id(), ret.kind(), &natives),
        None => env.call_static_method(class.handle(), desc.id(), ret.kind(), &natives),
    };
    let result = ctx.check(result)?;
    drop(converted);
    convert_out(ctx, result, ret)
}

/// Reads a field. Instance fields need `instance`.
pub fn get_field_value(ctx: &Rc<Context>, fd: &FieldDescriptor, instance: Option<&Ref>)
                       -> Result<Value> {
    let env = ctx.env();
    let kind = fd.field_type().kind();
    let value = if fd.is_static() {
        env.get_static_field(fd.class().handle(), fd.id(), kind)
    } else {
        let instance = instance.ok_or_else(|| Error::NullReceiver(String::from(fd.name())))?;
        env.get_field(instance.handle(), fd.id(), kind)
    };
    let value = ctx.check(value)?;
    convert_out(ctx, value, fd.field_type())
}

/// Writes a field. `Ok(false)` if the value cannot be stored in it.
pub fn set_field_value(ctx: &Context, fd: &FieldDescriptor, instance: Option<&Ref>,
                       value: &Value) -> Result<bool> {
    if !can_convert(ctx, value, fd.field_type()) {
        debug!("refusing to store {} in field '{}'", value, fd.name());
        return Ok(false);
    }
    let arg = convert_in(ctx, value, fd.field_type())?;
    let env = ctx.env();
    if fd.is_static() {
        env.set_static_field(fd.class().handle(), fd.id(), arg.value());
    } else {
        let instance = instance.ok_or_else(|| Error::NullReceiver(String::from(fd.name())))?;
        env.set_field(instance.handle(), fd.id(), arg.value());
    }
    ctx.check(true)
}
