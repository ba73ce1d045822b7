use std::collections::HashMap;

use crate::env::Handle;
use crate::sandbox::class::ClassId;
use crate::sandbox::value::{ObjId, Val};

/// Contents of an array object.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Bytes(Vec<i8>),
    References(Vec<Option<ObjId>>),
}

impl ArrayData {
    pub fn len(&self) -> usize {
        match *self {
            ArrayData::Bytes(ref bytes) => bytes.len(),
            ArrayData::References(ref references) => references.len(),
        }
    }
}

/// What a reflection object reflects, by index into the runtime's tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Member {
    Method(usize),
    Constructor(usize),
    Field(usize),
}

/// An object in the heap. Every variant records the object's own class.
#[derive(Debug)]
pub enum Object {
    /// An ordinary object with its instance fields, keyed by field index.
    Scalar { class: ClassId, fields: HashMap<usize, Val> },
    /// A `java.lang.String`, as UTF-16 code units.
    Str { class: ClassId, units: Vec<u16> },
    /// The `java.lang.Class` object of class `of`.
    Class { class: ClassId, of: ClassId },
    Array { class: ClassId, data: ArrayData },
    /// A `Method`, `Constructor` or `Field` reflection object.
    Member { class: ClassId, member: Member },
}

impl Object {
    pub fn class(&self) -> ClassId {
        match *self {
            Object::Scalar { class, .. } => class,
            Object::Str { class, .. } => class,
            Object::Class { class, .. } => class,
            Object::Array { class, .. } => class,
            Object::Member { class, .. } => class,
        }
    }
}

#[derive(Debug, Default)]
pub struct Heap {
    objects: Vec<Object>,
}

impl Heap {
    pub fn alloc(&mut self, object: Object) -> ObjId {
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn get(&self, id: ObjId) -> Option<&Object> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: ObjId) -> Option<&mut Object> {
        self.objects.get_mut(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    object: ObjId,
    global: bool,
}

/// The local and global reference tables.
///
/// Handles are never reused, so using a released handle is always detected; it panics, the way
/// a real runtime would crash.
#[derive(Debug, Default)]
pub struct RefTable {
    slots: HashMap<usize, Slot>,
    issued: usize,
}

impl RefTable {
    fn issue(&mut self, object: ObjId, global: bool) -> Handle {
        self.issued += 1;
        let raw = self.issued;
        self.slots.insert(raw, Slot { object: object, global: global });
        match Handle::new(raw) {
            Some(handle) => handle,
            None => unreachable!("handles start at 1"),
        }
    }

    pub fn new_local(&mut self, object: ObjId) -> Handle {
        self.issue(object, false)
    }

    pub fn new_global(&mut self, object: ObjId) -> Handle {
        self.issue(object, true)
    }

    /// The object behind a live handle.
    pub fn resolve(&self, handle: Handle) -> ObjId {
        match self.slots.get(&handle.as_raw()) {
            Some(slot) => slot.object,
            None => panic!("use of released or invalid reference {:?}", handle),
        }
    }

    /// Releases a handle, which must be live and of the given kind.
    pub fn release(&mut self, handle: Handle, global: bool) {
        match self.slots.remove(&handle.as_raw()) {
            Some(ref slot) if slot.global == global => {},
            Some(slot) => {
                panic!("{:?} is a {} reference", handle, if slot.global { "global" } else { "local" })
            },
            None => panic!("double release of reference {:?}", handle),
        }
    }

    pub fn locals(&self) -> usize {
        self.slots.values().filter(|slot| !slot.global).count()
    }

    pub fn globals(&self) -> usize {
        self.slots.values().filter(|slot| slot.global).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_live_references() {
        let mut refs = RefTable::default();
        let a = refs.new_local(3);
        let b = refs.new_global(3);
        assert_eq!((refs.locals(), refs.globals()), (1, 1));
        assert_eq!(refs.resolve(a), refs.resolve(b));
        refs.release(a, false);
        refs.release(b, true);
        assert_eq!((refs.locals(), refs.globals()), (0, 0));
    }

    #[test]
    #[should_panic(expected = "double release")]
    fn double_release_panics() {
        let mut refs = RefTable::default();
        let a = refs.new_local(0);
        refs.release(a, false);
        refs.release(a, false);
    }

    #[test]
    #[should_panic(expected = "is a global reference")]
    fn kind_mismatch_panics() {
        let mut refs = RefTable::default();
        let a = refs.new_global(0);
        refs.release(a, false);
    }
}
