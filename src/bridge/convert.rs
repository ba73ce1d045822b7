//! Conversion between host values and native values.
//!
//! What converts to what is decided by one static table indexed by the target's `TypeKind` and
//! the value's `ValueKind`. `can_convert` reads the table; `convert_in` performs the conversions
//! the table accepts; `convert_out` brings native results back.

use std::rc::Rc;

use crate::bridge::Context;
use crate::bridge::kind::{TypeKind, TypeRef};
use crate::bridge::text;
use crate::bridge::value::{Value, ValueKind};
use crate::env::{NativeValue, Ref};
use crate::error::{Error, Result};
use crate::wrapper::{JavaClass, JavaInstance};

/// How a value of one kind is admitted by a target of one kind.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Rule {
    Reject,
    Accept,
    /// An integer within the inclusive range.
    Range(i64, i64),
    /// Text of exactly one UTF-16 code unit.
    Char,
    /// Text, admitted only by `java.lang.String` itself.
    Text,
    /// An object whose runtime class is assignable to the target.
    Assignable,
}

use self::Rule::*;

const BYTE: Rule = Range(0, 255);
const SHORT: Rule = Range(i16::MIN as i64, i16::MAX as i64);
const INT: Rule = Range(i32::MIN as i64, i32::MAX as i64);

/// Rows follow `TypeKind`; columns follow `ValueKind`:
/// `None, Bool, Int, Float, Text, Instance, Class`.
const RULES: [[Rule; 7]; 10] = [
    /* void    */ [Reject, Reject, Reject, Reject, Reject, Reject, Reject],
    /* boolean */ [Reject, Accept, Reject, Reject, Reject, Reject, Reject],
    /* byte    */ [Reject, Reject, BYTE, Reject, Reject, Reject, Reject],
    /* char    */ [Reject, Reject, Reject, Reject, Char, Reject, Reject],
    /* short   */ [Reject, Reject, SHORT, Reject, Reject, Reject, Reject],
    /* int     */ [Reject, Reject, INT, Reject, Reject, Reject, Reject],
    /* long    */ [Reject, Reject, Accept, Reject, Reject, Reject, Reject],
    /* float   */ [Reject, Reject, Accept, Accept, Reject, Reject, Reject],
    /* double  */ [Reject, Reject, Accept, Accept, Reject, Reject, Reject],
    /* object  */ [Accept, Reject, Reject, Reject, Text, Assignable, Assignable],
];

fn rule(target: TypeKind, value: ValueKind) -> Rule {
    RULES[target.index()][value.index()]
}

/// The single UTF-16 unit of `s`, if it has exactly one.
fn char_unit(s: &str) -> Option<u16> {
    let mut units = s.encode_utf16();
    match (units.next(), units.next()) {
        (Some(unit), None) => Some(unit),
        _ => None,
    }
}

/// The object behind an `Instance` or `Class` value.
fn object_of(value: &Value) -> Option<&Ref> {
    match *value {
        Value::Instance(ref instance) => Some(instance.handle()),
        Value::Class(ref class) => Some(class.handle()),
        _ => None,
    }
}

/// Whether `value` can be passed where `ty` is expected. Changes no native state.
pub fn can_convert(ctx: &Context, value: &Value, ty: &TypeRef) -> bool {
    match rule(ty.kind(), value.kind()) {
        Reject => false,
        Accept => true,
        Range(lo, hi) => value.as_int().map_or(false, |i| lo <= i && i <= hi),
        Char => value.as_text().and_then(char_unit).is_some(),
        Text => ty.is_string(),
        Assignable => object_of(value).map_or(false, |object| {
            ctx.is_instance_of(object, ty.handle())
        }),
    }
}

/// An argument ready for a native call.
///
/// Text passed as a String owns the freshly built String here, so it stays alive until the call
/// returns and is released when the argument is dropped.
#[derive(Debug)]
pub struct NativeArg {
    value: NativeValue,
    _owned: Option<Ref>,
}

impl NativeArg {
    fn plain(value: NativeValue) -> NativeArg {
        NativeArg {
            value: value,
            _owned: None,
        }
    }

    pub fn value(&self) -> NativeValue {
        self.value
    }
}

/// Converts a value that `can_convert` accepts; anything else is `Error::Incompatible`.
pub fn convert_in(ctx: &Context, value: &Value, ty: &TypeRef) -> Result<NativeArg> {
    let incompatible = Error::Incompatible { expected: ty.kind() };
    if !can_convert(ctx, value, ty) {
        return Err(incompatible);
    }
    let native = match (ty.kind(), value) {
        (TypeKind::Boolean, &Value::Bool(b)) => NativeValue::Boolean(b),
        (TypeKind::Byte, &Value::Int(i)) => NativeValue::Byte(i as u8 as i8),
        (TypeKind::Short, &Value::Int(i)) => NativeValue::Short(i as i16),
        (TypeKind::Int, &Value::Int(i)) => NativeValue::Int(i as i32),
        (TypeKind::Long, &Value::Int(i)) => NativeValue::Long(i),
        (TypeKind::Float, &Value::Int(i)) => NativeValue::Float(i as f32),
        (TypeKind::Float, &Value::Float(f)) => NativeValue::Float(f as f32),
        (TypeKind::Double, &Value::Int(i)) => NativeValue::Double(i as f64),
        (TypeKind::Double, &Value::Float(f)) => NativeValue::Double(f),
        (TypeKind::Char, &Value::Text(ref s)) => match char_unit(s) {
            Some(unit) => NativeValue::Char(unit),
            None => return Err(incompatible),
        },
        (TypeKind::Object, &Value::None) => NativeValue::Object(None),
        (TypeKind::Object, &Value::Text(ref s)) => {
            let string = text::encode_text(ctx, s.as_bytes())?;
            return Ok(NativeArg {
                value: NativeValue::Object(Some(string.handle())),
                _owned: Some(string),
            });
        },
        (TypeKind::Object, _) => match object_of(value) {
            Some(object) => NativeValue::Object(Some(object.handle())),
            None => return Err(incompatible),
        },
        _ => return Err(incompatible),
    };
    Ok(NativeArg::plain(native))
}

/// Converts a native result of type `ty` back to a host value.
pub fn convert_out(ctx: &Rc<Context>, native: NativeValue, ty: &TypeRef) -> Result<Value> {
    if ty.kind() != native.kind() {
        return Err(Error::Incompatible { expected: ty.kind() });
    }
    match native {
        NativeValue::Void => Ok(Value::None),
        NativeValue::Boolean(b) => Ok(Value::Bool(b)),
        NativeValue::Byte(b) => Ok(Value::Int(b as u8 as i64)),
        NativeValue::Char(c) => Ok(Value::Text(String::from_utf16_lossy(&[c]))),
        NativeValue::Short(s) => Ok(Value::Int(s as i64)),
        NativeValue::Int(i) => Ok(Value::Int(i as i64)),
        NativeValue::Long(l) => Ok(Value::Int(l)),
        NativeValue::Float(f) => Ok(Value::Float(f as f64)),
        NativeValue::Double(d) => Ok(Value::Float(d)),
        NativeValue::Object(handle) => match ctx.local(handle) {
            Some(object) => wrap_object(ctx, object),
            None => Ok(Value::None),
        },
    }
}

/// Wraps a non-null object by its runtime class: a String is decoded to text, a class object
/// becomes a class wrapper, anything else an instance wrapper.
pub(crate) fn wrap_object(ctx: &Rc<Context>, object: Ref) -> Result<Value> {
    if ctx.is_instance_of(&object, ctx.string_class()) {
        text::decode_string(ctx, &object).map(Value::Text)
    } else if ctx.is_instance_of(&object, ctx.class_class()) {
        let class = ctx.retain(&object)?;
        Ok(Value::Class(JavaClass::wrap(ctx, class)))
    } else {
        let object = ctx.retain(&object)?;
        Ok(Value::Instance(JavaInstance::new(ctx, object)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans_are_not_numbers() {
        assert_eq!(rule(TypeKind::Boolean, ValueKind::Int), Reject);
        assert_eq!(rule(TypeKind::Int, ValueKind::Bool), Reject);
        assert_eq!(rule(TypeKind::Double, ValueKind::Bool), Reject);
        assert_eq!(rule(TypeKind::Boolean, ValueKind::Bool), Accept);
    }

    #[test]
    fn integer_ranges() {
        assert_eq!(rule(TypeKind::Byte, ValueKind::Int), Range(0, 255));
        assert_eq!(rule(TypeKind::Short, ValueKind::Int), Range(-32768, 32767));
        assert_eq!(rule(TypeKind::Int, ValueKind::Int), Range(-2147483648, 2147483647));
        assert_eq!(rule(TypeKind::Long, ValueKind::Int), Accept);
        assert_eq!(rule(TypeKind::Long, ValueKind::Float), Reject);
        assert_eq!(rule(TypeKind::Float, ValueKind::Int), Accept);
    }

    #[test]
    fn void_accepts_nothing() {
        for &kind in [ValueKind::None, ValueKind::Bool, ValueKind::Int, ValueKind::Float,
                      ValueKind::Text, ValueKind::Instance, ValueKind::Class].iter() {
            assert_eq!(rule(TypeKind::Void, kind), Reject);
        }
    }

    #[test]
    fn objects() {
        assert_eq!(rule(TypeKind::Object, ValueKind::None), Accept);
        assert_eq!(rule(TypeKind::Object, ValueKind::Text), Text);
        assert_eq!(rule(TypeKind::Object, ValueKind::Instance), Assignable);
        assert_eq!(rule(TypeKind::Object, ValueKind::Int), Reject);
        assert_eq!(rule(TypeKind::Int, ValueKind::None), Reject);
    }

    #[test]
    fn char_units() {
        assert_eq!(char_unit("a"), Some(97));
        assert_eq!(char_unit("\u{e9}"), Some(0xe9));
        assert_eq!(char_unit(""), None);
        assert_eq!(char_unit("ab"), None);
        assert_eq!(char_unit("\u{1f600}"), None);
    }
}
