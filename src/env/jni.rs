//! `Env` over a real JVM through the JNI function table.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;
use std::path::Path;
use std::ptr;

use jni_sys::{jboolean, jint, jmethodID, jfieldID, jobject, jsize, jvalue, JNIEnv, JavaVM,
              JavaVMInitArgs, JavaVMOption, JNI_FALSE, JNI_OK, JNI_TRUE, JNI_VERSION_1_8};
use libloading::{Library, Symbol};

use crate::bridge::kind::TypeKind;
use crate::env::{Env, FieldId, Handle, MethodId, NativeValue};
use crate::error::{Error, Result};

type CreateJavaVm = unsafe extern "system" fn(*mut *mut JavaVM, *mut *mut c_void, *mut c_void)
                                              -> jint;

/// Calls a function from the JNI function table.
macro_rules! jni {
    ($env:expr, $name:ident $(, $arg:expr)*) => {{
        let env = $env;
        match (**env).$name {
            Some(f) => f(env $(, $arg)*),
            None => panic!(concat!("JNI function table has no ", stringify!($name))),
        }
    }};
}

fn handle(object: jobject) -> Option<Handle> {
    Handle::new(object as usize)
}

fn object(handle: Handle) -> jobject {
    handle.as_raw() as jobject
}

fn nullable(handle: Option<Handle>) -> jobject {
    handle.map_or(ptr::null_mut(), object)
}

fn method(id: MethodId) -> jmethodID {
    id.as_raw() as jmethodID
}

fn field(id: FieldId) -> jfieldID {
    id.as_raw() as jfieldID
}

fn flag(b: bool) -> jboolean {
    if b { JNI_TRUE } else { JNI_FALSE }
}

fn to_jvalue(value: &NativeValue) -> jvalue {
    match *value {
        NativeValue::Void => jvalue { j: 0 },
        NativeValue::Boolean(b) => jvalue { z: flag(b) },
        NativeValue::Byte(b) => jvalue { b: b },
        NativeValue::Char(c) => jvalue { c: c },
        NativeValue::Short(s) => jvalue { s: s },
        NativeValue::Int(i) => jvalue { i: i },
        NativeValue::Long(l) => jvalue { j: l },
        NativeValue::Float(f) => jvalue { f: f },
        NativeValue::Double(d) => jvalue { d: d },
        NativeValue::Object(h) => jvalue { l: nullable(h) },
    }
}

/// A JVM created in this process. The library stays loaded for as long as the value lives.
pub struct JavaVm {
    vm: *mut JavaVM,
    env: *mut JNIEnv,
    _library: Library,
}

impl JavaVm {
    /// Loads the JVM library at `path` and creates a JVM with the given `-D`/`-X` options.
    pub fn create(path: &Path, options: &[String]) -> Result<JavaVm> {
        let library = unsafe { Library::new(path) }
            .map_err(|e| Error::Startup(format!("cannot load {}: {}", path.display(), e)))?;
        let strings = options.iter()
            .map(|option| CString::new(option.as_str()))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Startup(format!("invalid JVM option: {}", e)))?;
        let mut raw_options: Vec<JavaVMOption> = strings.iter()
            .map(|s| JavaVMOption {
                optionString: s.as_ptr() as *mut c_char,
                extraInfo: ptr::null_mut(),
            })
            .collect();
        let mut args = JavaVMInitArgs {
            version: JNI_VERSION_1_8,
            nOptions: raw_options.len() as jint,
            options: raw_options.as_mut_ptr(),
            ignoreUnrecognized: JNI_FALSE,
        };
        let mut vm: *mut JavaVM = ptr::null_mut();
        let mut env: *mut c_void = ptr::null_mut();
        let status = unsafe {
            let create: Symbol<CreateJavaVm> = library.get(b"JNI_CreateJavaVM\0")
                .map_err(|e| Error::Startup(format!("{} is not a JVM: {}", path.display(), e)))?;
            create(&mut vm, &mut env, &mut args as *mut JavaVMInitArgs as *mut c_void)
        };
        if status != JNI_OK || vm.is_null() || env.is_null() {
            return Err(Error::Startup(format!("JNI_CreateJavaVM returned {}", status)));
        }
        info!("JVM created from {} with {} option(s)", path.display(), options.len());
        Ok(JavaVm { vm: vm, env: env as *mut JNIEnv, _library: library })
    }

    /// The environment of the creating thread. The JVM stays alive with it.
    pub fn into_env(self) -> JniEnv {
        JniEnv { raw: self.env, _vm: Some(self) }
    }
}

impl Drop for JavaVm {
    fn drop(&mut self) {
        debug!("JVM handle at {:p} dropped; the JVM itself is never destroyed", self.vm);
    }
}

/// The JNI environment of the current thread.
pub struct JniEnv {
    raw: *mut JNIEnv,
    _vm: Option<JavaVm>,
}

impl JniEnv {
    /// Wraps an environment pointer received from the JVM, e.g. in a native method.
    ///
    /// # Safety
    ///
    /// `raw` must be the valid `JNIEnv` of the calling thread and must outlive the result.
    pub unsafe fn from_raw(raw: *mut JNIEnv) -> JniEnv {
        JniEnv { raw: raw, _vm: None }
    }

    fn c_string(s: &str) -> Option<CString> {
        match CString::new(s) {
            Ok(s) => Some(s),
            Err(_) => {
                warn!("name {:?} contains a NUL byte", s);
                None
            },
        }
    }
}

impl Env for JniEnv {
    fn find_class(&self, name: &str) -> Option<Handle> {
        let name = JniEnv::c_string(name)?;
        handle(unsafe { jni!(self.raw, FindClass, name.as_ptr()) })
    }

    fn get_object_class(&self, object: Handle) -> Handle {
        let class = unsafe { jni!(self.raw, GetObjectClass, self::object(object)) };
        match handle(class) {
            Some(class) => class,
            None => panic!("GetObjectClass returned null for {:?}", object),
        }
    }

    fn is_assignable_from(&self, sub: Handle, sup: Handle) -> bool {
        unsafe { jni!(self.raw, IsAssignableFrom, object(sub), object(sup)) == JNI_TRUE }
    }

    fn is_same_object(&self, a: Option<Handle>, b: Option<Handle>) -> bool {
        unsafe { jni!(self.raw, IsSameObject, nullable(a), nullable(b)) == JNI_TRUE }
    }

    fn get_method_id(&self, class: Handle, name: &str, descriptor: &str) -> Option<MethodId> {
        let (name, descriptor) = (JniEnv::c_string(name)?, JniEnv::c_string(descriptor)?);
        let id = unsafe {
            jni!(self.raw, GetMethodID, object(class), name.as_ptr(), descriptor.as_ptr())
        };
        MethodId::new(id as usize)
    }

    fn get_static_method_id(&self, class: Handle, name: &str, descriptor: &str)
                            -> Option<MethodId> {
        let (name, descriptor) = (JniEnv::c_string(name)?, JniEnv::c_string(descriptor)?);
        let id = unsafe {
            jni!(self.raw, GetStaticMethodID, object(class), name.as_ptr(), descriptor.as_ptr())
        };
        MethodId::new(id as usize)
    }

    fn get_static_field_id(&self, class: Handle, name: &str, descriptor: &str)
                           -> Option<FieldId> {
        let (name, descriptor) = (JniEnv::c_string(name)?, JniEnv::c_string(descriptor)?);
        let id = unsafe {
            jni!(self.raw, GetStaticFieldID, object(class), name.as_ptr(), descriptor.as_ptr())
        };
        FieldId::new(id as usize)
    }

    fn from_reflected_method(&self, method: Handle) -> Option<MethodId> {
        MethodId::new(unsafe { jni!(self.raw, FromReflectedMethod, object(method)) } as usize)
    }

    fn from_reflected_field(&self, field: Handle) -> Option<FieldId> {
        FieldId::new(unsafe { jni!(self.raw, FromReflectedField, object(field)) } as usize)
    }

    fn call_method(&self, receiver: Handle, id: MethodId, ret: TypeKind, args: &[NativeValue])
                   -> NativeValue {
        let args: Vec<jvalue> = args.iter().map(to_jvalue).collect();
        let (env, o, m, a) = (self.raw, object(receiver), method(id), args.as_ptr());
        unsafe {
            match ret {
                TypeKind::Void => {
                    jni!(env, CallVoidMethodA, o, m, a);
                    NativeValue::Void
                },
                TypeKind::Boolean => {
                    NativeValue::Boolean(jni!(env, CallBooleanMethodA, o, m, a) != JNI_FALSE)
                },
                TypeKind::Byte => NativeValue::Byte(jni!(env, CallByteMethodA, o, m, a)),
                TypeKind::Char => NativeValue::Char(jni!(env, CallCharMethodA, o, m, a)),
                TypeKind::Short => NativeValue::Short(jni!(env, CallShortMethodA, o, m, a)),
                TypeKind::Int => NativeValue::Int(jni!(env, CallIntMethodA, o, m, a)),
                TypeKind::Long => NativeValue::Long(jni!(env, CallLongMethodA, o, m, a)),
                TypeKind::Float => NativeValue::Float(jni!(env, CallFloatMethodA, o, m, a)),
                TypeKind::Double => NativeValue::Double(jni!(env, CallDoubleMethodA, o, m, a)),
                TypeKind::Object => {
                    NativeValue::Object(handle(jni!(env, CallObjectMethodA, o, m, a)))
                },
            }
        }
    }

    fn call_static_method(&self, class: Handle, id: MethodId, ret: TypeKind,
                          args: &[NativeValue]) -> NativeValue {
        let args: Vec<jvalue> = args.iter().map(to_jvalue).collect();
        let (env, c, m, a) = (self.raw, object(class), method(id), args.as_ptr());
        unsafe {
            match ret {
                TypeKind::Void => {
                    jni!(env, CallStaticVoidMethodA, c, m, a);
                    NativeValue::Void
                },
                TypeKind::Boolean => {
                    NativeValue::Boolean(jni!(env, CallStaticBooleanMethodA, c, m, a) != JNI_FALSE)
                },
                TypeKind::Byte => NativeValue::Byte(jni!(env, CallStaticByteMethodA, c, m, a)),
                TypeKind::Char => NativeValue::Char(jni!(env, CallStaticCharMethodA, c, m, a)),
                TypeKind::Short => NativeValue::Short(jni!(env, CallStaticShortMethodA, c, m, a)),
                TypeKind::Int => NativeValue::Int(jni!(env, CallStaticIntMethodA, c, m, a)),
                TypeKind::Long => NativeValue::Long(jni!(env, CallStaticLongMethodA, c, m, a)),
                TypeKind::Float => NativeValue::Float(jni!(env, CallStaticFloatMethodA, c, m, a)),
                TypeKind::Double => {
                    NativeValue::Double(jni!(env, CallStaticDoubleMethodA, c, m, a))
                },
                TypeKind::Object => {
                    NativeValue::Object(handle(jni!(env, CallStaticObjectMethodA, c, m, a)))
                },
            }
        }
    }

    fn new_object(&self, class: Handle, constructor: MethodId, args: &[NativeValue])
                  -> Option<Handle> {
        let args: Vec<jvalue> = args.iter().map(to_jvalue).collect();
        handle(unsafe {
            jni!(self.raw, NewObjectA, object(class), method(constructor), args.as_ptr())
        })
    }

    fn get_field(&self, target: Handle, id: FieldId, kind: TypeKind) -> NativeValue {
        let (env, o, f) = (self.raw, object(target), field(id));
        unsafe {
            match kind {
                TypeKind::Void => NativeValue::Void,
                TypeKind::Boolean => {
                    NativeValue::Boolean(jni!(env, GetBooleanField, o, f) != JNI_FALSE)
                },
                TypeKind::Byte => NativeValue::Byte(jni!(env, GetByteField, o, f)),
                TypeKind::Char => NativeValue::Char(jni!(env, GetCharField, o, f)),
                TypeKind::Short => NativeValue::Short(jni!(env, GetShortField, o, f)),
                TypeKind::Int => NativeValue::Int(jni!(env, GetIntField, o, f)),
                TypeKind::Long => NativeValue::Long(jni!(env, GetLongField, o, f)),
                TypeKind::Float => NativeValue::Float(jni!(env, GetFloatField, o, f)),
                TypeKind::Double => NativeValue::Double(jni!(env, GetDoubleField, o, f)),
                TypeKind::Object => NativeValue::Object(handle(jni!(env, GetObjectField, o, f))),
            }
        }
    }

    fn set_field(&self, target: Handle, id: FieldId, value: NativeValue) {
        let (env, o, f) = (self.raw, object(target), field(id));
        unsafe {
            match value {
                NativeValue::Void => warn!("SetField with a void value ignored"),
                NativeValue::Boolean(b) => jni!(env, SetBooleanField, o, f, flag(b)),
                NativeValue::Byte(b) => jni!(env, SetByteField, o, f, b),
                NativeValue::Char(c) => jni!(env, SetCharField, o, f, c),
                NativeValue::Short(s) => jni!(env, SetShortField, o, f, s),
                NativeValue::Int(i) => jni!(env, SetIntField, o, f, i),
                NativeValue::Long(l) => jni!(env, SetLongField, o, f, l),
                NativeValue::Float(x) => jni!(env, SetFloatField, o, f, x),
                NativeValue::Double(d) => jni!(env, SetDoubleField, o, f, d),
                NativeValue::Object(h) => jni!(env, SetObjectField, o, f, nullable(h)),
            }
        }
    }

    fn get_static_field(&self, class: Handle, id: FieldId, kind: TypeKind) -> NativeValue {
        let (env, c, f) = (self.raw, object(class), field(id));
        unsafe {
            match kind {
                TypeKind::Void => NativeValue::Void,
                TypeKind::Boolean => {
                    NativeValue::Boolean(jni!(env, GetStaticBooleanField, c, f) != JNI_FALSE)
                },
                TypeKind::Byte => NativeValue::Byte(jni!(env, GetStaticByteField, c, f)),
                TypeKind::Char => NativeValue::Char(jni!(env, GetStaticCharField, c, f)),
                TypeKind::Short => NativeValue::Short(jni!(env, GetStaticShortField, c, f)),
                TypeKind::Int => NativeValue::Int(jni!(env, GetStaticIntField, c, f)),
                TypeKind::Long => NativeValue::Long(jni!(env, GetStaticLongField, c, f)),
                TypeKind::Float => NativeValue::Float(jni!(env, GetStaticFloatField, c, f)),
                TypeKind::Double => NativeValue::Double(jni!(env, GetStaticDoubleField, c, f)),
                TypeKind::Object => {
                    NativeValue::Object(handle(jni!(env, GetStaticObjectField, c, f)))
                },
            }
        }
    }

    fn set_static_field(&self, class: Handle, id: FieldId, value: NativeValue) {
        let (env, c, f) = (self.raw, object(class), field(id));
        unsafe {
            match value {
                NativeValue::Void => warn!("SetStaticField with a void value ignored"),
                NativeValue::Boolean(b) => jni!(env, SetStaticBooleanField, c, f, flag(b)),
                NativeValue::Byte(b) => jni!(env, SetStaticByteField, c, f, b),
                NativeValue::Char(x) => jni!(env, SetStaticCharField, c, f, x),
                NativeValue::Short(s) => jni!(env, SetStaticShortField, c, f, s),
                NativeValue::Int(i) => jni!(env, SetStaticIntField, c, f, i),
                NativeValue::Long(l) => jni!(env, SetStaticLongField, c, f, l),
                NativeValue::Float(x) => jni!(env, SetStaticFloatField, c, f, x),
                NativeValue::Double(d) => jni!(env, SetStaticDoubleField, c, f, d),
                NativeValue::Object(h) => jni!(env, SetStaticObjectField, c, f, nullable(h)),
            }
        }
    }

    fn array_length(&self, array: Handle) -> usize {
        let length = unsafe { jni!(self.raw, GetArrayLength, object(array)) };
        length.max(0) as usize
    }

    fn object_array_element(&self, array: Handle, index: usize) -> Option<Handle> {
        handle(unsafe { jni!(self.raw, GetObjectArrayElement, object(array), index as jsize) })
    }

    fn new_byte_array(&self, bytes: &[u8]) -> Option<Handle> {
        let length = bytes.len() as jsize;
        let array = handle(unsafe { jni!(self.raw, NewByteArray, length) })?;
        unsafe {
            jni!(self.raw, SetByteArrayRegion, object(array), 0, length, bytes.as_ptr() as *const i8);
        }
        Some(array)
    }

    fn byte_array_contents(&self, array: Handle) -> Vec<u8> {
        let length = self.array_length(array);
        let mut buffer = vec![0u8; length];
        unsafe {
            jni!(self.raw, GetByteArrayRegion, object(array), 0, length as jsize,
                 buffer.as_mut_ptr() as *mut i8);
        }
        buffer
    }

    fn new_global_ref(&self, target: Handle) -> Option<Handle> {
        handle(unsafe { jni!(self.raw, NewGlobalRef, object(target)) })
    }

    fn delete_global_ref(&self, target: Handle) {
        unsafe { jni!(self.raw, DeleteGlobalRef, object(target)) }
    }

    fn delete_local_ref(&self, target: Handle) {
        unsafe { jni!(self.raw, DeleteLocalRef, object(target)) }
    }

    fn take_exception(&self) -> Option<Handle> {
        let exception = handle(unsafe { jni!(self.raw, ExceptionOccurred) })?;
        unsafe { jni!(self.raw, ExceptionClear) };
        Some(exception)
    }
}
