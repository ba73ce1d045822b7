//! The overload resolution and value marshalling engine.
//!
//! Every operation takes the `Context` explicitly. A call goes through the same pipeline each
//! time: `descriptor::list_overloads` (usually cached by a wrapper), `resolve::resolve`,
//! `dispatch::invoke` (which runs `convert::convert_in`, the typed native call and
//! `convert::convert_out`).

pub mod convert;
pub mod descriptor;
pub mod dispatch;
pub mod kind;
pub mod resolve;
pub mod text;
pub mod value;

use std::fmt;
use std::rc::Rc;

use crate::env::{Env, FieldId, Handle, MethodId, NativeValue, Ref};
use crate::error::{Error, Result};

use self::kind::{Classifier, TypeKind};

/// Method ids of the reflection API, resolved once at startup.
pub(crate) struct Reflection {
    pub class_get_methods: MethodId,
    pub class_get_constructors: MethodId,
    pub class_get_field: MethodId,
    pub class_get_name: MethodId,
    pub method_get_name: MethodId,
    pub method_get_modifiers: MethodId,
    pub method_get_parameter_types: MethodId,
    pub method_get_return_type: MethodId,
    pub constructor_get_parameter_types: MethodId,
    pub field_get_modifiers: MethodId,
    pub field_get_type: MethodId,
    pub modifier_is_static: MethodId,
    pub object_to_string: MethodId,
    pub string_init: MethodId,
    pub string_get_bytes: MethodId,
}

/// Everything the core needs to talk to one running runtime.
///
/// Built once, after the runtime has started, by `Context::new`.
pub struct Context {
    env: Rc<dyn Env>,
    classifier: Classifier,
    class_class: Ref,
    string_class: Ref,
    modifier_class: Ref,
    utf8: Ref,
    ids: Reflection,
}

/// Resolves the classes and members `Context` depends on, turning anything missing into
/// `Error::Init`.
struct Boot<'a> {
    env: &'a Rc<dyn Env>,
}

impl<'a> Boot<'a> {
    fn settle(&self) {
        if let Some(exception) = self.env.take_exception() {
            self.env.delete_local_ref(exception);
        }
    }

    fn class(&self, name: &str) -> Result<Ref> {
        let class = Ref::from_local(self.env, self.env.find_class(name));
        self.settle();
        class.ok_or_else(|| Error::Init(name.replace('/', ".")))
            .and_then(|class| class.into_retained().ok_or(Error::ReferenceExhausted))
    }

    fn method(&self, class: &Ref, name: &str, descriptor: &str) -> Result<MethodId> {
        let id = self.env.get_method_id(class.handle(), name, descriptor);
        self.settle();
        id.ok_or_else(|| Error::Init(format!("method {}{}", name, descriptor)))
    }

    fn static_method(&self, class: &Ref, name: &str, descriptor: &str) -> Result<MethodId> {
        let id = self.env.get_static_method_id(class.handle(), name, descriptor);
        self.settle();
        id.ok_or_else(|| Error::Init(format!("static method {}{}", name, descriptor)))
    }

    fn static_object(&self, class: &Ref, name: &str, descriptor: &str) -> Result<Ref> {
        let missing = || Error::Init(format!("static field {} {}", name, descriptor));
        let id = self.env.get_static_field_id(class.handle(), name, descriptor);
        self.settle();
        let id: FieldId = id.ok_or_else(&missing)?;
        let value = self.env.get_static_field(class.handle(), id, TypeKind::Object);
        self.settle();
        Ref::from_local(self.env, value.into_object())
            .ok_or_else(&missing)
            .and_then(|value| value.into_retained().ok_or(Error::ReferenceExhausted))
    }
}

impl Context {
    /// Resolves the canonical primitive classes and the reflection members used by the core.
    pub fn new(env: Rc<dyn Env>) -> Result<Rc<Context>> {
        let (classifier, class_class, string_class, modifier_class, utf8, ids) = {
            let boot = Boot { env: &env };

            let mut primitives = Vec::with_capacity(TypeKind::PRIMITIVES.len());
            for &kind in TypeKind::PRIMITIVES.iter() {
                if let Some(boxed_name) = kind.boxed_class_name() {
                    let boxed = boot.class(boxed_name)?;
                    let primitive = boot.static_object(&boxed, "TYPE", "Ljava/lang/Class;")?;
                    primitives.push((kind, primitive));
                }
            }

            let class_class = boot.class("java/lang/Class")?;
            let method_class = boot.class("java/lang/reflect/Method")?;
            let constructor_class = boot.class("java/lang/reflect/Constructor")?;
            let field_class = boot.class("java/lang/reflect/Field")?;
            let modifier_class = boot.class("java/lang/reflect/Modifier")?;
            let object_class = boot.class("java/lang/Object")?;
            let string_class = boot.class("java/lang/String")?;
            let charsets = boot.class("java/nio/charset/StandardCharsets")?;
            let utf8 = boot.static_object(&charsets, "UTF_8", "Ljava/nio/charset/Charset;")?;

            let ids = Reflection {
                class_get_methods: boot.method(&class_class, "getMethods",
                                               "()[Ljava/lang/reflect/Method;")?,
                class_get_constructors: boot.method(&class_class, "getConstructors",
                                                    "()[Ljava/lang/reflect/Constructor;")?,
                class_get_field: boot.method(&class_class, "getField",
                                             "(Ljava/lang/String;)Ljava/lang/reflect/Field;")?,
                class_get_name: boot.method(&class_class, "getName", "()Ljava/lang/String;")?,
                method_get_name: boot.method(&method_class, "getName", "()Ljava/lang/String;")?,
                method_get_modifiers: boot.method(&method_class, "getModifiers", "()I")?,
                method_get_parameter_types: boot.method(&method_class, "getParameterTypes",
                                                        "()[Ljava/lang/Class;")?,
                method_get_return_type: boot.method(&method_class, "getReturnType",
                                                    "()Ljava/lang/Class;")?,
                constructor_get_parameter_types: boot.method(&constructor_class,
                                                             "getParameterTypes",
                                                             "()[Ljava/lang/Class;")?,
                field_get_modifiers: boot.method(&field_class, "getModifiers", "()I")?,
                field_get_type: boot.method(&field_class, "getType", "()Ljava/lang/Class;")?,
                modifier_is_static: boot.static_method(&modifier_class, "isStatic", "(I)Z")?,
                object_to_string: boot.method(&object_class, "toString",
                                              "()Ljava/lang/String;")?,
                string_init: boot.method(&string_class, "<init>",
                                         "([BLjava/nio/charset/Charset;)V")?,
                string_get_bytes: boot.method(&string_class, "getBytes",
                                              "(Ljava/nio/charset/Charset;)[B")?,
            };

            (Classifier::new(primitives), class_class, string_class, modifier_class, utf8, ids)
        };

        debug!("bridge context initialized");
        Ok(Rc::new(Context {
            env: env,
            classifier: classifier,
            class_class: class_class,
            string_class: string_class,
            modifier_class: modifier_class,
            utf8: utf8,
            ids: ids,
        }))
    }

    pub fn env(&self) -> &Rc<dyn Env> {
        &self.env
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn classify(&self, ty: &Ref) -> TypeKind {
        self.classifier.classify(ty)
    }

    pub(crate) fn ids(&self) -> &Reflection {
        &self.ids
    }

    pub fn class_class(&self) -> &Ref {
        &self.class_class
    }

    pub fn string_class(&self) -> &Ref {
        &self.string_class
    }

    pub(crate) fn modifier_class(&self) -> &Ref {
        &self.modifier_class
    }

    pub(crate) fn utf8(&self) -> &Ref {
        &self.utf8
    }

    /// Takes ownership of a possibly-null local reference.
    pub fn local(&self, handle: Option<Handle>) -> Option<Ref> {
        Ref::from_local(&self.env, handle)
    }

    /// Promotes a reference so that it can outlive the current call.
    pub fn retain(&self, object: &Ref) -> Result<Ref> {
        let retained = object.retain();
        self.check(())?;
        retained.ok_or(Error::ReferenceExhausted)
    }

    /// Passes `value` through if no exception is pending; otherwise clears the exception and
    /// reports it. Called right after every native call that can throw.
    pub fn check<T>(&self, value: T) -> Result<T> {
        match self.env.take_exception() {
            None => Ok(value),
            Some(exception) => {
                let exception = Ref::scoped(&self.env, exception);
                let error = self.describe(&exception);
                debug!("native call threw {}", error);
                Err(error)
            },
        }
    }

    /// Builds an `Error::Exception` from a throwable. Failures while describing it are cleared
    /// and replaced by placeholders, so this never leaves an exception pending.
    fn describe(&self, exception: &Ref) -> Error {
        let class = self.class_of(exception);
        let class_name = self.quiet_string(&class, self.ids.class_get_name)
            .unwrap_or_else(|| String::from("<unknown>"));
        let description = self.quiet_string(exception, self.ids.object_to_string)
            .unwrap_or_else(|| class_name.clone());
        Error::Exception {
            class: class_name,
            description: description,
        }
    }

    fn quiet<T>(&self, value: T) -> Option<T> {
        match self.env.take_exception() {
            None => Some(value),
            Some(exception) => {
                self.env.delete_local_ref(exception);
                None
            },
        }
    }

    /// Calls a `()Ljava/lang/String;` method and decodes the result, giving up on any exception.
    fn quiet_string(&self, object: &Ref, method: MethodId) -> Option<String> {
        let string = self.env.call_method(object.handle(), method, TypeKind::Object, &[]);
        let string = self.local(self.quiet(string)?.into_object())?;
        let bytes = self.env.call_method(string.handle(), self.ids.string_get_bytes,
                                         TypeKind::Object, &[NativeValue::Object(Some(self.utf8.handle()))]);
        let bytes = self.local(self.quiet(bytes)?.into_object())?;
        let contents = self.env.byte_array_contents(bytes.handle());
        self.quiet(())?;
        Some(String::from_utf8_lossy(&contents).into_owned())
    }

    /// The runtime class of an object, as a scoped reference.
    pub fn class_of(&self, object: &Ref) -> Ref {
        Ref::scoped(&self.env, self.env.get_object_class(object.handle()))
    }

    /// Whether `object`'s runtime class is `class` or one of its subclasses or implementors.
    pub fn is_instance_of(&self, object: &Ref, class: &Ref) -> bool {
        let runtime_class = self.class_of(object);
        self.env.is_assignable_from(runtime_class.handle(), class.handle())
    }

    /// Whether `sub` is `sup`, a subclass of it or an implementor of it.
    pub fn is_subclass(&self, sub: &Ref, sup: &Ref) -> bool {
        self.env.is_assignable_from(sub.handle(), sup.handle())
    }

    /// Looks up a class by binary name (`java/lang/String` or `java.lang.String`). A missing
    /// class is `None`, not an error.
    pub fn find_class(&self, name: &str) -> Result<Option<Ref>> {
        let jni_name = name.replace('.', "/");
        let class = self.local(self.env.find_class(&jni_name));
        match self.check(()) {
            Ok(()) => Ok(class),
            Err(ref e) if e.is_exception("java.lang.NoClassDefFoundError") => {
                debug!("class {} not found", name);
                Ok(None)
            },
            Err(e) => Err(e),
        }
    }

    /// `Class.getName()`, e.g. `java.lang.String`.
    pub fn class_name(&self, class: &Ref) -> Result<String> {
        let name = self.env.call_method(class.handle(), self.ids.class_get_name,
                                        TypeKind::Object, &[]);
        let name = self.check(name)?;
        match self.local(name.into_object()) {
            Some(name) => text::decode_string(self, &name),
            None => Ok(String::new()),
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Context {{ string_class: {:?} }}", self.string_class)
    }
}
