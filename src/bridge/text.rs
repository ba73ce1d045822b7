//! String encoding across the boundary.
//!
//! Strings always cross as standard UTF-8 through `new String(byte[], UTF_8)` and
//! `String.getBytes(UTF_8)`. The runtime's own modified UTF-8 is never used for values.

use crate::bridge::Context;
use crate::bridge::kind::TypeKind;
use crate::env::{NativeValue, Ref};
use crate::error::{Error, Result};

/// Builds a `java.lang.String` from UTF-8 bytes.
pub fn encode_text(ctx: &Context, bytes: &[u8]) -> Result<Ref> {
    let env = ctx.env();
    let array = ctx.local(env.new_byte_array(bytes));
    let array = ctx.check(array)?.ok_or(Error::ReferenceExhausted)?;
    let args = [NativeValue::Object(Some(array.handle())),
                NativeValue::Object(Some(ctx.utf8().handle()))];
    let string = ctx.local(env.new_object(ctx.string_class().handle(), ctx.ids().string_init,
                                          &args));
    ctx.check(string)?.ok_or(Error::ReferenceExhausted)
}

/// The UTF-8 bytes of a `java.lang.String`.
pub fn decode_text(ctx: &Context, string: &Ref) -> Result<Vec<u8>> {
    let env = ctx.env();
    let utf8 = [NativeValue::Object(Some(ctx.utf8().handle()))];
    let bytes = env.call_method(string.handle(), ctx.ids().string_get_bytes, TypeKind::Object,
                                &utf8);
    let bytes = ctx.check(bytes)?;
    match ctx.local(bytes.into_object()) {
        Some(array) => {
            let contents = env.byte_array_contents(array.handle());
            ctx.check(contents)
        },
        None => Ok(Vec::new()),
    }
}

/// `decode_text`, then validated as UTF-8.
pub fn decode_string(ctx: &Context, string: &Ref) -> Result<String> {
    let bytes = decode_text(ctx, string)?;
    Ok(String::from_utf8(bytes)?)
}
