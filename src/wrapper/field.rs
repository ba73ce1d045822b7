use std::fmt;
use std::rc::Rc;

use crate::bridge::Context;
use crate::bridge::descriptor::FieldDescriptor;
use crate::bridge::dispatch;
use crate::bridge::value::Value;
use crate::error::{Error, Result};
use crate::wrapper::JavaInstance;

/// A resolved field, together with the object it belongs to when it is an instance field.
pub struct JavaField {
    ctx: Rc<Context>,
    descriptor: FieldDescriptor,
    instance: Option<JavaInstance>,
}

impl JavaField {
    pub(crate) fn new(ctx: &Rc<Context>, descriptor: FieldDescriptor,
                      instance: Option<JavaInstance>) -> JavaField {
        JavaField {
            ctx: ctx.clone(),
            descriptor: descriptor,
            instance: instance,
        }
    }

    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    pub fn get(&self) -> Result<Value> {
        let instance = self.instance.as_ref().map(JavaInstance::handle);
        dispatch::get_field_value(&self.ctx, &self.descriptor, instance)
    }

    /// Stores `value`, failing with `Error::FieldType` if the field cannot hold it.
    pub fn set(&self, value: &Value) -> Result<()> {
        let instance = self.instance.as_ref().map(JavaInstance::handle);
        if dispatch::set_field_value(&self.ctx, &self.descriptor, instance, value)? {
            Ok(())
        } else {
            Err(Error::FieldType { name: String::from(self.descriptor.name()) })
        }
    }
}

impl fmt::Debug for JavaField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "JavaField({:?})", self.descriptor)
    }
}
