//! Ownership-tagged references to managed objects.

use std::fmt;
use std::rc::Rc;

use crate::env::{Env, Handle};

/// How long a reference stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// A local reference, valid for the current native call scope only.
    Scoped,
    /// A global reference, valid until released by its owner.
    Retained,
}

/// A reference to a managed object that is released exactly once, when dropped.
///
/// A `Scoped` reference must not outlive the call that produced it; anything stored in a
/// descriptor or a wrapper is promoted with `retain` first.
pub struct Ref {
    env: Rc<dyn Env>,
    handle: Handle,
    ownership: Ownership,
}

impl Ref {
    /// Takes ownership of a local reference.
    pub fn scoped(env: &Rc<dyn Env>, handle: Handle) -> Ref {
        Ref {
            env: env.clone(),
            handle: handle,
            ownership: Ownership::Scoped,
        }
    }

    /// Takes ownership of a possibly-null local reference.
    pub fn from_local(env: &Rc<dyn Env>, handle: Option<Handle>) -> Option<Ref> {
        handle.map(|handle| Ref::scoped(env, handle))
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    pub fn env(&self) -> &Rc<dyn Env> {
        &self.env
    }

    /// Creates a new global reference to the same object. `None` if the runtime refused.
    pub fn retain(&self) -> Option<Ref> {
        self.env.new_global_ref(self.handle).map(|handle| {
            Ref {
                env: self.env.clone(),
                handle: handle,
                ownership: Ownership::Retained,
            }
        })
    }

    /// Promotes this reference to a global one, releasing the local reference.
    pub fn into_retained(self) -> Option<Ref> {
        match self.ownership {
            Ownership::Retained => Some(self),
            Ownership::Scoped => self.retain(),
        }
    }

    /// Whether both references designate the same object.
    pub fn same_object(&self, other: &Ref) -> bool {
        self.env.is_same_object(Some(self.handle), Some(other.handle))
    }
}

impl Drop for Ref {
    fn drop(&mut self) {
        match self.ownership {
            Ownership::Scoped => self.env.delete_local_ref(self.handle),
            Ownership::Retained => self.env.delete_global_ref(self.handle),
        }
    }
}

impl fmt::Debug for Ref {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Ref({:?}, {:?})", self.handle, self.ownership)
    }
}
