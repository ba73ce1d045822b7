use std::collections::HashMap;

use crate::bridge::kind::TypeKind;
use crate::sandbox::access_flags::*;
use crate::sandbox::class::{Class, ClassId, Shape};
use crate::sandbox::sig;

/// Owns every loaded class and finds them by name.
///
/// Array classes are created on first use, the way the bootstrap class loader derives them from
/// their component type.
#[derive(Debug, Default)]
pub struct ClassLoader {
    classes: Vec<Class>,
    names: HashMap<String, ClassId>,
}

impl ClassLoader {
    pub fn get(&self, id: ClassId) -> Option<&Class> {
        self.classes.get(id)
    }

    pub fn get_mut(&mut self, id: ClassId) -> Option<&mut Class> {
        self.classes.get_mut(id)
    }

    pub fn name_of(&self, id: ClassId) -> &str {
        self.classes.get(id).map_or("<invalid class>", |class| &class.name)
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Registers a class; `None` if the name is taken.
    pub fn add(&mut self, class: Class) -> Option<ClassId> {
        if self.names.contains_key(&class.name) {
            return None;
        }
        let id = self.classes.len();
        self.names.insert(class.name.clone(), id);
        self.classes.push(class);
        Some(id)
    }

    /// Finds a class by binary name with slashes, deriving array classes such as `[I` or
    /// `[Ljava/lang/String;` as needed.
    pub fn load(&mut self, name: &str) -> Option<ClassId> {
        if let Some(&id) = self.names.get(name) {
            return Some(id);
        }
        if name.starts_with('[') {
            sig::parse_field(name).and_then(|ty| self.resolve_type(&ty))
        } else {
            None
        }
    }

    /// The class object's class for a type: a primitive class, a loaded class or an array class.
    pub fn resolve_type(&mut self, ty: &sig::Type) -> Option<ClassId> {
        match *ty {
            sig::Type::Array(ref component) => self.array_class(component),
            _ => self.names.get(&ty.class_name()).cloned(),
        }
    }

    fn array_class(&mut self, component: &sig::Type) -> Option<ClassId> {
        let name = format!("[{}", component);
        if let Some(&id) = self.names.get(&name) {
            return Some(id);
        }
        // the component must resolve, so that arrays of missing classes fail to load
        self.resolve_type(component)?;
        let object = self.names.get("java/lang/Object").cloned();
        let class = Class {
            name: name,
            superclass: object,
            interfaces: vec![],
            flags: ACC_PUBLIC | ACC_FINAL | ACC_ABSTRACT,
            shape: Shape::Array(component.clone()),
            methods: vec![],
            fields: vec![],
        };
        self.add(class)
    }

    /// The class and its superclasses, nearest first.
    pub fn ancestry(&self, id: ClassId) -> Vec<ClassId> {
        let mut chain = vec![];
        let mut next = Some(id);
        while let Some(id) = next {
            chain.push(id);
            next = self.classes.get(id).and_then(|class| class.superclass);
        }
        chain
    }

    /// Returns true if a value of class `sub` may be stored where class `sup` is expected.
    pub fn is_assignable(&self, sub: ClassId, sup: ClassId) -> bool {
        if sub == sup {
            return true;
        }
        let (sub_class, sup_class) = match (self.classes.get(sub), self.classes.get(sup)) {
            (Some(sub_class), Some(sup_class)) => (sub_class, sup_class),
            _ => return false,
        };
        if sub_class.is_primitive() || sup_class.is_primitive() {
            return false;
        }
        if sup_class.name == "java/lang/Object" {
            return true;
        }
        match (&sub_class.shape, &sup_class.shape) {
            (&Shape::Array(ref sub_component), &Shape::Array(ref sup_component)) => {
                if sub_component.kind() != TypeKind::Object
                        || sup_component.kind() != TypeKind::Object {
                    return sub_component == sup_component;
                }
                let sub_component = self.names.get(&sub_component.class_name());
                let sup_component = self.names.get(&sup_component.class_name());
                match (sub_component, sup_component) {
                    (Some(&a), Some(&b)) => self.is_assignable(a, b),
                    _ => false,
                }
            },
            (&Shape::Array(_), _) => false,
            _ => {
                sub_class.superclass.map_or(false, |parent| self.is_assignable(parent, sup))
                    || sub_class.interfaces.iter().any(|&iface| self.is_assignable(iface, sup))
            },
        }
    }
}
