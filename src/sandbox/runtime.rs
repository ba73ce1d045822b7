//! The state of a sandbox runtime: loaded classes, the method and field tables, the heap and the
//! reference tables. Method bodies receive `&mut Runtime` and use the helpers here.

use std::collections::HashMap;

use crate::bridge::kind::TypeKind;
use crate::sandbox::DefineError;
use crate::sandbox::class::{Class, ClassDef, ClassId, FieldInfo, MethodInfo, Shape};
use crate::sandbox::class_loader::ClassLoader;
use crate::sandbox::heap::{ArrayData, Heap, Member, Object, RefTable};
use crate::sandbox::sig;
use crate::sandbox::value::{ObjId, Throw, Val};

#[derive(Debug, Default)]
pub struct Runtime {
    pub(crate) loader: ClassLoader,
    pub(crate) methods: Vec<MethodInfo>,
    pub(crate) fields: Vec<FieldInfo>,
    pub(crate) heap: Heap,
    pub(crate) refs: RefTable,
    class_objects: HashMap<ClassId, ObjId>,
    pub(crate) pending: Option<ObjId>,
    pub(crate) violations: usize,
}

impl Runtime {
    pub(crate) fn new() -> Runtime {
        Runtime::default()
    }

    /// Loads a class definition and runs its initializer.
    pub(crate) fn define(&mut self, def: ClassDef) -> Result<ClassId, DefineError> {
        if self.loader.is_loaded(&def.name) {
            return Err(DefineError::Duplicate(def.name));
        }
        let lookup = |loader: &ClassLoader, name: &String| {
            if loader.is_loaded(name) {
                Ok(())
            } else {
                Err(DefineError::Missing(name.clone()))
            }
        };
        let mut superclass = None;
        if let Some(ref name) = def.superclass {
            lookup(&self.loader, name)?;
            superclass = self.loader.load(name);
        }
        let mut interfaces = vec![];
        for name in &def.interfaces {
            lookup(&self.loader, name)?;
            interfaces.extend(self.loader.load(name));
        }

        // validate every member before touching the tables
        let mut methods = Vec::with_capacity(def.methods.len());
        for method in def.methods {
            let sig = sig::parse_method(&method.descriptor)
                .ok_or_else(|| DefineError::Descriptor(method.descriptor.clone()))?;
            methods.push((method, sig));
        }
        let mut fields = Vec::with_capacity(def.fields.len());
        for field in def.fields {
            let ty = sig::parse_field(&field.descriptor)
                .ok_or_else(|| DefineError::Descriptor(field.descriptor.clone()))?;
            let value = field.value.unwrap_or_else(|| ty.default_value());
            if value.kind() != ty.kind() {
                return Err(DefineError::Value(field.name));
            }
            fields.push((field, ty, value));
        }

        let name = def.name.clone();
        let class = Class {
            name: def.name.clone(),
            superclass: superclass,
            interfaces: interfaces,
            flags: def.flags,
            shape: def.shape,
            methods: vec![],
            fields: vec![],
        };
        let id = self.loader.add(class).ok_or_else(|| DefineError::Duplicate(name))?;

        let mut method_indices = vec![];
        let mut initializer = None;
        for (method, sig) in methods {
            let index = self.methods.len();
            if method.name == "<clinit>" {
                initializer = Some(index);
            }
            method_indices.push(index);
            self.methods.push(MethodInfo {
                class: id,
                name: method.name,
                descriptor: method.descriptor,
                sig: sig,
                flags: method.flags,
                body: method.body,
            });
        }
        let mut field_indices = vec![];
        for (field, ty, value) in fields {
            field_indices.push(self.fields.len());
            self.fields.push(FieldInfo {
                class: id,
                name: field.name,
                ty: ty,
                flags: field.flags,
                value: value,
            });
        }
        if let Some(class) = self.loader.get_mut(id) {
            class.methods = method_indices;
            class.fields = field_indices;
        }

        if let Some(initializer) = initializer {
            if let Err(Throw(exception)) = self.invoke(initializer, None, &[]) {
                let description = self.describe(exception);
                return Err(DefineError::Initializer(def.name, description));
            }
        }
        Ok(id)
    }

    pub fn class(&self, id: ClassId) -> Option<&Class> {
        self.loader.get(id)
    }

    pub fn find_class(&mut self, name: &str) -> Option<ClassId> {
        self.loader.load(name)
    }

    pub fn class_of(&self, object: ObjId) -> Option<ClassId> {
        self.heap.get(object).map(Object::class)
    }

    /// The name of an object's class with dots, as `getClass().getName()` reports it.
    pub fn class_name_of(&self, object: ObjId) -> String {
        self.class_of(object)
            .and_then(|id| self.loader.get(id))
            .map_or_else(|| String::from("<invalid object>"), Class::java_name)
    }

    /// The canonical `java.lang.Class` object of a class.
    pub fn class_object(&mut self, id: ClassId) -> ObjId {
        if let Some(&object) = self.class_objects.get(&id) {
            return object;
        }
        let class_class = self.loader.load("java/lang/Class").unwrap_or(id);
        let object = self.heap.alloc(Object::Class { class: class_class, of: id });
        self.class_objects.insert(id, object);
        object
    }

    /// The class object of a class by name, throwing `NoClassDefFoundError` if there is none.
    pub fn class_object_named(&mut self, name: &str) -> Result<ObjId, Throw> {
        match self.loader.load(name) {
            Some(id) => Ok(self.class_object(id)),
            None => Err(self.throw("java/lang/NoClassDefFoundError", name)),
        }
    }

    /// The class a class object stands for.
    pub fn class_of_class_object(&self, object: ObjId) -> Option<ClassId> {
        match self.heap.get(object) {
            Some(&Object::Class { of, .. }) => Some(of),
            _ => None,
        }
    }

    /// The class object for a parameter, return or field type.
    pub(crate) fn type_object(&mut self, ty: &sig::Type) -> Result<ObjId, Throw> {
        match self.loader.resolve_type(ty) {
            Some(id) => Ok(self.class_object(id)),
            None => Err(self.throw("java/lang/NoClassDefFoundError", &ty.class_name())),
        }
    }

    pub(crate) fn void_object(&mut self) -> Result<ObjId, Throw> {
        self.class_object_named("void")
    }

    /// Allocates an object with every instance field at its default value, without running a
    /// constructor.
    pub fn alloc(&mut self, id: ClassId) -> ObjId {
        let mut fields = HashMap::new();
        for class in self.loader.ancestry(id) {
            if let Some(class) = self.loader.get(class) {
                for &index in &class.fields {
                    let field = &self.fields[index];
                    if !field.is_static() {
                        fields.insert(index, field.ty.default_value());
                    }
                }
            }
        }
        self.heap.alloc(Object::Scalar { class: id, fields: fields })
    }

    /// Allocates an instance of the named class without running a constructor.
    pub fn instantiate(&mut self, class: &str) -> Result<ObjId, Throw> {
        match self.loader.load(class) {
            Some(id) => Ok(self.alloc(id)),
            None => Err(self.throw("java/lang/NoClassDefFoundError", class)),
        }
    }

    pub fn new_string(&mut self, s: &str) -> Val {
        let class = self.loader.load("java/lang/String").unwrap_or(0);
        let units = s.encode_utf16().collect();
        Val::Ref(Some(self.heap.alloc(Object::Str { class: class, units: units })))
    }

    pub(crate) fn string_units(&self, value: Val) -> Option<&[u16]> {
        match value.as_object().and_then(|object| self.heap.get(object)) {
            Some(&Object::Str { ref units, .. }) => Some(&units[..]),
            _ => None,
        }
    }

    /// The contents of a String value; `None` for null or any other object.
    pub fn string(&self, value: Val) -> Option<String> {
        self.string_units(value).map(String::from_utf16_lossy)
    }

    pub fn new_byte_array(&mut self, bytes: Vec<i8>) -> ObjId {
        let class = self.loader.load("[B").unwrap_or(0);
        self.heap.alloc(Object::Array { class: class, data: ArrayData::Bytes(bytes) })
    }

    /// A reference array with the given component class.
    pub fn new_object_array(&mut self, component: &str, elements: Vec<Option<ObjId>>)
                            -> Result<ObjId, Throw> {
        let name = if component.starts_with('[') {
            format!("[{}", component)
        } else {
            format!("[L{};", component)
        };
        match self.loader.load(&name) {
            Some(class) => {
                let data = ArrayData::References(elements);
                Ok(self.heap.alloc(Object::Array { class: class, data: data }))
            },
            None => Err(self.throw("java/lang/NoClassDefFoundError", component)),
        }
    }

    pub(crate) fn array(&self, object: ObjId) -> Option<&ArrayData> {
        match self.heap.get(object) {
            Some(&Object::Array { ref data, .. }) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn member(&self, object: ObjId) -> Option<Member> {
        match self.heap.get(object) {
            Some(&Object::Member { member, .. }) => Some(member),
            _ => None,
        }
    }

    pub(crate) fn new_member(&mut self, member: Member) -> ObjId {
        let class_name = match member {
            Member::Method(_) => "java/lang/reflect/Method",
            Member::Constructor(_) => "java/lang/reflect/Constructor",
            Member::Field(_) => "java/lang/reflect/Field",
        };
        let class = self.loader.load(class_name).unwrap_or(0);
        self.heap.alloc(Object::Member { class: class, member: member })
    }

    /// Finds a field by name on a class or its superclasses.
    pub(crate) fn find_field(&self, class: ClassId, name: &str) -> Option<usize> {
        self.loader.ancestry(class).into_iter()
            .filter_map(|id| self.loader.get(id))
            .flat_map(|class| class.fields.iter().cloned())
            .find(|&index| self.fields[index].name == name)
    }

    /// Reads an instance field by name; the default for a missing field.
    pub fn get_field(&self, object: ObjId, name: &str) -> Val {
        let index = self.class_of(object).and_then(|class| self.find_field(class, name));
        match (self.heap.get(object), index) {
            (Some(&Object::Scalar { ref fields, .. }), Some(index)) => {
                fields.get(&index).cloned().unwrap_or_else(|| self.fields[index].ty.default_value())
            },
            _ => Val::NULL,
        }
    }

    pub fn put_field(&mut self, object: ObjId, name: &str, value: Val) {
        let index = self.class_of(object).and_then(|class| self.find_field(class, name));
        if let (Some(&mut Object::Scalar { ref mut fields, .. }), Some(index)) =
                (self.heap.get_mut(object), index) {
            fields.insert(index, value);
        }
    }

    pub(crate) fn get_field_at(&self, object: ObjId, index: usize) -> Val {
        match self.heap.get(object) {
            Some(&Object::Scalar { ref fields, .. }) => {
                fields.get(&index).cloned().unwrap_or_else(|| self.fields[index].ty.default_value())
            },
            _ => self.fields[index].ty.default_value(),
        }
    }

    pub(crate) fn put_field_at(&mut self, object: ObjId, index: usize, value: Val) -> bool {
        match self.heap.get_mut(object) {
            Some(&mut Object::Scalar { ref mut fields, .. }) => {
                fields.insert(index, value);
                true
            },
            _ => false,
        }
    }

    fn static_index(&mut self, class: &str, name: &str) -> Option<usize> {
        self.loader.load(class)
            .and_then(|id| self.find_field(id, name))
            .filter(|&index| self.fields[index].is_static())
    }

    /// Reads a static field; `null` if there is none.
    pub fn get_static(&mut self, class: &str, name: &str) -> Val {
        self.static_index(class, name).map_or(Val::NULL, |index| self.fields[index].value)
    }

    pub fn put_static(&mut self, class: &str, name: &str, value: Val) {
        if let Some(index) = self.static_index(class, name) {
            self.fields[index].value = value;
        }
    }

    /// Creates a throwable of the named class with the given message.
    pub fn throw(&mut self, class: &str, message: &str) -> Throw {
        let id = match self.loader.load(class).or_else(|| self.loader.load("java/lang/Throwable")) {
            Some(id) => id,
            None => panic!("cannot throw {} before java/lang/Throwable is loaded", class),
        };
        let exception = self.alloc(id);
        let message = self.new_string(message);
        self.put_field(exception, "message", message);
        debug!("sandbox throws {}: {}", class, self.string(message).unwrap_or_default());
        Throw(exception)
    }

    /// `toString()` of a throwable, or its class name if that fails.
    pub(crate) fn describe(&mut self, exception: ObjId) -> String {
        let fallback = self.class_name_of(exception);
        match self.invoke_virtual(exception, "toString", "()Ljava/lang/String;", &[]) {
            Ok(value) => self.string(value).unwrap_or(fallback),
            Err(_) => fallback,
        }
    }

    /// Finds the method a virtual call on an object of class `class` runs: the nearest
    /// implementation with the same name and descriptor.
    pub(crate) fn select(&self, class: ClassId, method: usize) -> usize {
        let (name, descriptor) = (&self.methods[method].name, &self.methods[method].descriptor);
        self.loader.ancestry(class).into_iter()
            .filter_map(|id| self.loader.get(id))
            .flat_map(|class| class.methods.iter().cloned())
            .find(|&index| {
                let candidate = &self.methods[index];
                candidate.body.is_some() && !candidate.is_static()
                    && candidate.name == *name && candidate.descriptor == *descriptor
            })
            .unwrap_or(method)
    }

    /// Runs a method body. An abstract method throws `AbstractMethodError`.
    pub(crate) fn invoke(&mut self, method: usize, this: Option<ObjId>, args: &[Val])
                         -> Result<Val, Throw> {
        match self.methods[method].body.clone() {
            Some(body) => body.invoke(self, this, args),
            None => {
                let name = format!("{}.{}{}", self.loader.name_of(self.methods[method].class),
                                   self.methods[method].name, self.methods[method].descriptor);
                Err(self.throw("java/lang/AbstractMethodError", &name))
            },
        }
    }

    /// Calls an instance method by name and descriptor, with virtual dispatch.
    pub fn invoke_virtual(&mut self, object: ObjId, name: &str, descriptor: &str, args: &[Val])
                          -> Result<Val, Throw> {
        let class = match self.class_of(object) {
            Some(class) => class,
            None => return Err(self.throw("java/lang/NullPointerException", name)),
        };
        match self.find_method(class, name, descriptor, false) {
            Some(method) => {
                let target = self.select(class, method);
                self.invoke(target, Some(object), args)
            },
            None => Err(self.throw("java/lang/NoSuchMethodError", name)),
        }
    }

    /// Finds a method visible on `class`: constructors on the class itself, other methods on the
    /// class, its superclasses and its interfaces.
    pub(crate) fn find_method(&self, class: ClassId, name: &str, descriptor: &str,
                              is_static: bool) -> Option<usize> {
        let matches = |index: &usize| {
            let method = &self.methods[*index];
            method.name == name && method.descriptor == descriptor
                && method.is_static() == is_static
        };
        if name == "<init>" {
            return self.loader.get(class)
                .and_then(|class| class.methods.iter().cloned().find(|index| matches(index)));
        }
        self.hierarchy(class).into_iter()
            .filter_map(|id| self.loader.get(id))
            .flat_map(|class| class.methods.iter().cloned())
            .find(|index| matches(index))
    }

    /// The class, its superclasses, then all of their interfaces, each once.
    fn hierarchy(&self, class: ClassId) -> Vec<ClassId> {
        let mut order = self.loader.ancestry(class);
        let mut i = 0;
        while i < order.len() {
            let interfaces = self.loader.get(order[i]).map_or(vec![], |c| c.interfaces.clone());
            for iface in interfaces {
                if !order.contains(&iface) {
                    order.push(iface);
                }
            }
            i += 1;
        }
        order
    }

    /// Public methods of a class and everything it inherits, overridden ones listed once, in
    /// declaration order starting from the class itself.
    pub(crate) fn public_methods(&self, class: ClassId) -> Vec<usize> {
        let mut found: Vec<usize> = vec![];
        for id in self.hierarchy(class) {
            let class = match self.loader.get(id) {
                Some(class) => class,
                None => continue,
            };
            for &index in &class.methods {
                let method = &self.methods[index];
                if !method.is_public() || method.name.starts_with('<') {
                    continue;
                }
                let overridden = found.iter().any(|&other| {
                    self.methods[other].name == method.name
                        && self.methods[other].descriptor == method.descriptor
                });
                if !overridden {
                    found.push(index);
                }
            }
        }
        found
    }

    pub(crate) fn public_constructors(&self, class: ClassId) -> Vec<usize> {
        self.loader.get(class).map_or(vec![], |class| {
            class.methods.iter().cloned()
                .filter(|&index| {
                    let method = &self.methods[index];
                    method.is_public() && method.is_constructor()
                })
                .collect()
        })
    }

    /// The public field named `name` of a class or its superclasses or interfaces.
    pub(crate) fn public_field(&self, class: ClassId, name: &str) -> Option<usize> {
        self.hierarchy(class).into_iter()
            .filter_map(|id| self.loader.get(id))
            .flat_map(|class| class.fields.iter().cloned())
            .find(|&index| self.fields[index].name == name && self.fields[index].is_public())
    }

    pub(crate) fn find_static_field(&self, class: ClassId, name: &str, descriptor: &str)
                                    -> Option<usize> {
        self.hierarchy(class).into_iter()
            .filter_map(|id| self.loader.get(id))
            .flat_map(|class| class.fields.iter().cloned())
            .find(|&index| {
                let field = &self.fields[index];
                field.is_static() && field.name == name && field.ty.to_string() == descriptor
            })
    }

    /// Whether an object may be stored where class `target` is expected.
    pub fn is_instance(&self, object: ObjId, target: ClassId) -> bool {
        self.class_of(object).map_or(false, |class| self.loader.is_assignable(class, target))
    }

    pub(crate) fn primitive_kind(&self, class: ClassId) -> Option<TypeKind> {
        match self.loader.get(class).map(|class| &class.shape) {
            Some(&Shape::Primitive(kind)) => Some(kind),
            _ => None,
        }
    }
}
