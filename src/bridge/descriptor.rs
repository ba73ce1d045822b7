//! Enumeration of methods, constructors and fields through the reflection API.

use std::fmt;
use std::slice;

use crate::bridge::Context;
use crate::bridge::kind::{TypeKind, TypeRef};
use crate::bridge::text;
use crate::env::{FieldId, MethodId, NativeValue, Ref};
use crate::error::{Error, Result};

/// Which members a lookup may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Static,
    Instance,
    Both,
}

impl Visibility {
    pub fn admits(self, is_static: bool) -> bool {
        match self {
            Visibility::Static => is_static,
            Visibility::Instance => !is_static,
            Visibility::Both => true,
        }
    }
}

/// What a `DescriptorCollection` holds. Methods and constructors are never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Methods,
    Constructors,
}

/// One overload of a method or constructor.
///
/// Parameters of an instance method start with the receiver slot, typed as the class the
/// overload was enumerated from. Constructors count as static and have no return type.
pub struct MethodDescriptor {
    name: String,
    id: MethodId,
    is_static: bool,
    params: Vec<TypeRef>,
    ret: Option<TypeRef>,
}

impl MethodDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> MethodId {
        self.id
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn params(&self) -> &[TypeRef] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// `None` for constructors.
    pub fn return_type(&self) -> Option<&TypeRef> {
        self.ret.as_ref()
    }

    pub fn is_constructor(&self) -> bool {
        self.ret.is_none()
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let params: Vec<TypeKind> = self.params.iter().map(TypeRef::kind).collect();
        write!(f, "{}{}{:?}", if self.is_static { "static " } else { "" }, self.name, params)?;
        if let Some(ref ret) = self.ret {
            write!(f, " -> {}", ret.kind())?;
        }
        Ok(())
    }
}

/// The overloads sharing one name, in the order the runtime listed them.
#[derive(Debug)]
pub struct DescriptorCollection {
    name: String,
    purpose: Purpose,
    descriptors: Vec<MethodDescriptor>,
}

impl DescriptorCollection {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn purpose(&self) -> Purpose {
        self.purpose
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn get(&self, index: usize) -> Option<&MethodDescriptor> {
        self.descriptors.get(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, MethodDescriptor> {
        self.descriptors.iter()
    }

    /// Whether any overload is an instance method.
    pub fn has_instance_methods(&self) -> bool {
        self.descriptors.iter().any(|d| !d.is_static)
    }

    /// Whether any overload is static.
    pub fn has_static_methods(&self) -> bool {
        self.descriptors.iter().any(|d| d.is_static)
    }
}

impl<'a> IntoIterator for &'a DescriptorCollection {
    type Item = &'a MethodDescriptor;
    type IntoIter = slice::Iter<'a, MethodDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}

/// A public field.
pub struct FieldDescriptor {
    name: String,
    id: FieldId,
    is_static: bool,
    ty: TypeRef,
    class: Ref,
}

impl FieldDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn field_type(&self) -> &TypeRef {
        &self.ty
    }

    /// The class the field was found on, used for static access.
    pub fn class(&self) -> &Ref {
        &self.class
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}: {}", if self.is_static { "static " } else { "" }, self.name,
               self.ty.kind())
    }
}

fn call_object(ctx: &Context, object: &Ref, method: MethodId) -> Result<Option<Ref>> {
    let result = ctx.env().call_method(object.handle(), method, TypeKind::Object, &[]);
    let result = ctx.check(result)?;
    Ok(ctx.local(result.into_object()))
}

fn is_static(ctx: &Context, member: &Ref, get_modifiers: MethodId) -> Result<bool> {
    let env = ctx.env();
    let modifiers = env.call_method(member.handle(), get_modifiers, TypeKind::Int, &[]);
    let modifiers = ctx.check(modifiers)?.as_int().unwrap_or(0);
    let result = env.call_static_method(ctx.modifier_class().handle(),
                                        ctx.ids().modifier_is_static, TypeKind::Boolean,
                                        &[NativeValue::Int(modifiers)]);
    Ok(ctx.check(result)?.as_bool().unwrap_or(false))
}

/// Classifies each element of a `Class[]`, in order.
fn type_refs(ctx: &Context, types: &Ref) -> Result<Vec<TypeRef>> {
    let env = ctx.env();
    let length = env.array_length(types.handle());
    let mut refs = Vec::with_capacity(length);
    for i in 0..length {
        let element = ctx.local(env.object_array_element(types.handle(), i));
        if let Some(element) = ctx.check(element)? {
            refs.push(TypeRef::new(ctx, &element)?);
        }
    }
    Ok(refs)
}

fn method_id(ctx: &Context, member: &Ref, name: &str) -> Result<MethodId> {
    let id = ctx.env().from_reflected_method(member.handle());
    ctx.check(id)?.ok_or_else(|| Error::Init(format!("method id for {}", name)))
}

/// Builds the descriptor of a reflected method, or `None` if it has a different name.
fn describe_method(ctx: &Context, class: &Ref, method: &Ref, name: &str)
                   -> Result<Option<MethodDescriptor>> {
    let ids = ctx.ids();
    let method_name = match call_object(ctx, method, ids.method_get_name)? {
        Some(method_name) => text::decode_text(ctx, &method_name)?,
        None => return Ok(None),
    };
    if method_name != name.as_bytes() {
        return Ok(None);
    }

    let is_static = is_static(ctx, method, ids.method_get_modifiers)?;
    let mut params = Vec::new();
    if !is_static {
        params.push(TypeRef::new(ctx, class)?);
    }
    if let Some(types) = call_object(ctx, method, ids.method_get_parameter_types)? {
        params.extend(type_refs(ctx, &types)?);
    }
    let ret = match call_object(ctx, method, ids.method_get_return_type)? {
        Some(ret) => TypeRef::new(ctx, &ret)?,
        None => return Err(Error::Init(format!("return type of {}", name))),
    };

    Ok(Some(MethodDescriptor {
        name: String::from(name),
        id: method_id(ctx, method, name)?,
        is_static: is_static,
        params: params,
        ret: Some(ret),
    }))
}

fn describe_constructor(ctx: &Context, constructor: &Ref, name: &str)
                        -> Result<MethodDescriptor> {
    let params = match call_object(ctx, constructor, ctx.ids().constructor_get_parameter_types)? {
        Some(types) => type_refs(ctx, &types)?,
        None => Vec::new(),
    };
    Ok(MethodDescriptor {
        name: String::from(name),
        id: method_id(ctx, constructor, name)?,
        is_static: true,
        params: params,
        ret: None,
    })
}

/// Lists the public methods named `name`, or the public constructors when `constructors` is set,
/// in the order the runtime reports them. `None` if there are none.
///
/// Nothing is cached here; every call builds a new collection.
pub fn list_overloads(ctx: &Context, class: &Ref, name: &str, constructors: bool)
                      -> Result<Option<DescriptorCollection>> {
    let env = ctx.env();
    let (lister, purpose) = if constructors {
        (ctx.ids().class_get_constructors, Purpose::Constructors)
    } else {
        (ctx.ids().class_get_methods, Purpose::Methods)
    };
    let members = match call_object(ctx, class, lister)? {
        Some(members) => members,
        None => return Ok(None),
    };

    let length = env.array_length(members.handle());
    let mut descriptors = Vec::new();
    for i in 0..length {
        let member = ctx.local(env.object_array_element(members.handle(), i));
        let member = match ctx.check(member)? {
            Some(member) => member,
            None => continue,
        };
        if constructors {
            descriptors.push(describe_constructor(ctx, &member, name)?);
        } else if let Some(descriptor) = describe_method(ctx, class, &member, name)? {
            descriptors.push(descriptor);
        }
    }

    debug!("{:?} '{}': {} overload(s) of {} member(s)", purpose, name, descriptors.len(), length);
    if descriptors.is_empty() {
        Ok(None)
    } else {
        Ok(Some(DescriptorCollection {
            name: String::from(name),
            purpose: purpose,
            descriptors: descriptors,
        }))
    }
}

/// Looks up a public field by name, on the runtime class of `instance` if one is given and on
/// `class` otherwise. `None` if there is no such field or its static-ness is not admitted.
pub fn get_field(ctx: &Context, class: &Ref, instance: Option<&Ref>, name: &str,
                 visibility: Visibility) -> Result<Option<FieldDescriptor>> {
    let env = ctx.env();
    let ids = ctx.ids();
    let runtime_class;
    let target = match instance {
        Some(instance) => {
            runtime_class = ctx.class_of(instance);
            &runtime_class
        },
        None => class,
    };

    let field = {
        let field_name = text::encode_text(ctx, name.as_bytes())?;
        let field = env.call_method(target.handle(), ids.class_get_field, TypeKind::Object,
                                    &[NativeValue::Object(Some(field_name.handle()))]);
        match ctx.check(field) {
            Ok(field) => field,
            Err(ref e) if e.is_exception("java.lang.NoSuchFieldException") => {
                debug!("no field '{}'", name);
                return Ok(None);
            },
            Err(e) => return Err(e),
        }
    };
    let field = match ctx.local(field.into_object()) {
        Some(field) => field,
        None => return Ok(None),
    };

    let is_static = is_static(ctx, &field, ids.field_get_modifiers)?;
    if !visibility.admits(is_static) {
        debug!("field '{}' is not visible as {:?}", name, visibility);
        return Ok(None);
    }
    let ty = match call_object(ctx, &field, ids.field_get_type)? {
        Some(ty) => TypeRef::new(ctx, &ty)?,
        None => return Err(Error::Init(format!("type of field {}", name))),
    };
    let id = env.from_reflected_field(field.handle());
    let id = ctx.check(id)?.ok_or_else(|| Error::Init(format!("field id for {}", name)))?;

    Ok(Some(FieldDescriptor {
        name: String::from(name),
        id: id,
        is_static: is_static,
        ty: ty,
        class: ctx.retain(target)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::Visibility;

    #[test]
    fn visibility_filter() {
        assert!(Visibility::Static.admits(true));
        assert!(!Visibility::Static.admits(false));
        assert!(Visibility::Instance.admits(false));
        assert!(!Visibility::Instance.admits(true));
        assert!(Visibility::Both.admits(true) && Visibility::Both.admits(false));
    }
}
