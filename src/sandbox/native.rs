//! Method bodies written in Rust, and the classes of the sandbox's small standard library.

use std::fmt;
use std::rc::Rc;

use crate::bridge::kind::TypeKind;
use crate::sandbox::access_flags::ACC_STATIC;
use crate::sandbox::class::ClassDef;
use crate::sandbox::heap::{ArrayData, Member};
use crate::sandbox::runtime::Runtime;
use crate::sandbox::sig;
use crate::sandbox::value::{ObjId, Throw, Val};

type Body = dyn Fn(&mut Runtime, Option<ObjId>, &[Val]) -> Result<Val, Throw>;

/// The body of a method: receives the receiver (`None` for static methods) and the arguments.
#[derive(Clone)]
pub struct NativeMethod(Rc<Body>);

impl fmt::Debug for NativeMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<native method>")
    }
}

impl NativeMethod {
    pub fn new<F>(body: F) -> NativeMethod
        where F: Fn(&mut Runtime, Option<ObjId>, &[Val]) -> Result<Val, Throw> + 'static
    {
        NativeMethod(Rc::new(body))
    }

    pub fn invoke(&self, rt: &mut Runtime, this: Option<ObjId>, args: &[Val])
                  -> Result<Val, Throw> {
        (self.0)(rt, this, args)
    }
}

/// The receiver, or a `NullPointerException`.
fn this(rt: &mut Runtime, this: Option<ObjId>) -> Result<ObjId, Throw> {
    this.ok_or_else(|| rt.throw("java/lang/NullPointerException", "receiver is null"))
}

/// The class a class object stands for.
fn this_class(rt: &mut Runtime, receiver: Option<ObjId>) -> Result<usize, Throw> {
    let receiver = this(rt, receiver)?;
    match rt.class_of_class_object(receiver) {
        Some(class) => Ok(class),
        None => Err(rt.throw("java/lang/IllegalArgumentException", "not a class object")),
    }
}

fn string_arg(rt: &mut Runtime, args: &[Val], index: usize) -> Result<String, Throw> {
    match args.get(index).and_then(|&value| rt.string(value)) {
        Some(s) => Ok(s),
        None => Err(rt.throw("java/lang/NullPointerException", "string argument is null")),
    }
}

fn int_arg(args: &[Val], index: usize) -> i32 {
    args.get(index).and_then(Val::as_int).unwrap_or(0)
}

fn double_arg(args: &[Val], index: usize) -> f64 {
    args.get(index).and_then(Val::as_double).unwrap_or(0.0)
}

fn object_arg(args: &[Val], index: usize) -> Option<ObjId> {
    args.get(index).and_then(Val::as_object)
}

/// Java's `String.hashCode`.
fn string_hash(units: &[u16]) -> i32 {
    units.iter().fold(0i32, |hash, &unit| hash.wrapping_mul(31).wrapping_add(unit as i32))
}

fn object() -> ClassDef {
    ClassDef::new("java/lang/Object")
        .constructor("()V", |_, _, _| Ok(Val::Void))
        .method("equals", "(Ljava/lang/Object;)Z", |_, this, args| {
            Ok(Val::Boolean(this == object_arg(args, 0)))
        })
        .method("hashCode", "()I", |_, this, _| Ok(Val::Int(this.unwrap_or(0) as i32)))
        .method("toString", "()Ljava/lang/String;", |rt, receiver, _| {
            let receiver = this(rt, receiver)?;
            let name = rt.class_name_of(receiver);
            let hash = rt.invoke_virtual(receiver, "hashCode", "()I", &[])?;
            Ok(rt.new_string(&format!("{}@{:x}", name, hash.as_int().unwrap_or(0))))
        })
        .method("getClass", "()Ljava/lang/Class;", |rt, receiver, _| {
            let receiver = this(rt, receiver)?;
            match rt.class_of(receiver) {
                Some(class) => Ok(Val::Ref(Some(rt.class_object(class)))),
                None => Err(rt.throw("java/lang/IllegalStateException", "object has no class")),
            }
        })
}

fn char_sequence() -> ClassDef {
    ClassDef::new("java/lang/CharSequence")
        .interface()
        .abstract_method("length", "()I")
        .abstract_method("charAt", "(I)C")
        .abstract_method("toString", "()Ljava/lang/String;")
}

fn class() -> ClassDef {
    ClassDef::new("java/lang/Class")
        .final_class()
        .method("getName", "()Ljava/lang/String;", |rt, receiver, _| {
            let class = this_class(rt, receiver)?;
            let name = rt.class(class).map(|class| class.java_name()).unwrap_or_default();
            Ok(rt.new_string(&name))
        })
        .method("toString", "()Ljava/lang/String;", |rt, receiver, _| {
            let class = this_class(rt, receiver)?;
            let description = match rt.class(class) {
                Some(class) if class.is_primitive() => class.java_name(),
                Some(class) if class.is_interface() => format!("interface {}", class.java_name()),
                Some(class) => format!("class {}", class.java_name()),
                None => String::new(),
            };
            Ok(rt.new_string(&description))
        })
        .method("isPrimitive", "()Z", |rt, receiver, _| {
            let class = this_class(rt, receiver)?;
            Ok(Val::Boolean(rt.primitive_kind(class).is_some()))
        })
        .method("isInterface", "()Z", |rt, receiver, _| {
            let class = this_class(rt, receiver)?;
            Ok(Val::Boolean(rt.class(class).map_or(false, |class| class.is_interface())))
        })
        .method("getSuperclass", "()Ljava/lang/Class;", |rt, receiver, _| {
            let class = this_class(rt, receiver)?;
            match rt.class(class).and_then(|class| class.superclass) {
                Some(superclass) => Ok(Val::Ref(Some(rt.class_object(superclass)))),
                None => Ok(Val::NULL),
            }
        })
        .method("isInstance", "(Ljava/lang/Object;)Z", |rt, receiver, args| {
            let class = this_class(rt, receiver)?;
            Ok(Val::Boolean(object_arg(args, 0).map_or(false, |o| rt.is_instance(o, class))))
        })
        .method("getMethods", "()[Ljava/lang/reflect/Method;", |rt, receiver, _| {
            let class = this_class(rt, receiver)?;
            let members = rt.public_methods(class).into_iter()
                .map(|index| Some(rt.new_member(Member::Method(index))))
                .collect();
            rt.new_object_array("java/lang/reflect/Method", members).map(|a| Val::Ref(Some(a)))
        })
        .method("getConstructors", "()[Ljava/lang/reflect/Constructor;", |rt, receiver, _| {
            let class = this_class(rt, receiver)?;
            let members = rt.public_constructors(class).into_iter()
                .map(|index| Some(rt.new_member(Member::Constructor(index))))
                .collect();
            rt.new_object_array("java/lang/reflect/Constructor", members)
                .map(|a| Val::Ref(Some(a)))
        })
        .method("getField", "(Ljava/lang/String;)Ljava/lang/reflect/Field;",
                |rt, receiver, args| {
            let class = this_class(rt, receiver)?;
            let name = string_arg(rt, args, 0)?;
            match rt.public_field(class, &name) {
                Some(index) => Ok(Val::Ref(Some(rt.new_member(Member::Field(index))))),
                None => Err(rt.throw("java/lang/NoSuchFieldException", &name)),
            }
        })
        .static_method("forName", "(Ljava/lang/String;)Ljava/lang/Class;", |rt, _, args| {
            let name = string_arg(rt, args, 0)?;
            match rt.find_class(&name.replace('.', "/")) {
                Some(class) => Ok(Val::Ref(Some(rt.class_object(class)))),
                None => Err(rt.throw("java/lang/ClassNotFoundException", &name)),
            }
        })
}

fn string() -> ClassDef {
    ClassDef::new("java/lang/String")
        .final_class()
        .implements("java/lang/CharSequence")
        .constructor("()V", |rt, _, _| Ok(rt.new_string("")))
        .constructor("(Ljava/lang/String;)V", |rt, _, args| {
            let original = string_arg(rt, args, 0)?;
            Ok(rt.new_string(&original))
        })
        .constructor("([BLjava/nio/charset/Charset;)V", |rt, _, args| {
            if object_arg(args, 1).is_none() {
                return Err(rt.throw("java/lang/NullPointerException", "charset is null"));
            }
            let bytes = match object_arg(args, 0).and_then(|array| rt.array(array)) {
                Some(&ArrayData::Bytes(ref bytes)) => {
                    Some(bytes.iter().map(|&b| b as u8).collect::<Vec<u8>>())
                },
                _ => None,
            };
            let bytes = match bytes {
                Some(bytes) => bytes,
                None => return Err(rt.throw("java/lang/NullPointerException", "bytes are null")),
            };
            Ok(rt.new_string(&String::from_utf8_lossy(&bytes)))
        })
        .method("length", "()I", |rt, receiver, _| {
            let units = rt.string_units(Val::Ref(receiver)).map_or(0, <[u16]>::len);
            Ok(Val::Int(units as i32))
        })
        .method("isEmpty", "()Z", |rt, receiver, _| {
            Ok(Val::Boolean(rt.string_units(Val::Ref(receiver)).map_or(true, <[u16]>::is_empty)))
        })
        .method("charAt", "(I)C", |rt, receiver, args| {
            let index = int_arg(args, 0);
            let unit = rt.string_units(Val::Ref(receiver))
                .and_then(|units| if index < 0 { None } else { units.get(index as usize) })
                .cloned();
            match unit {
                Some(unit) => Ok(Val::Char(unit)),
                None => {
                    let message = format!("index {} out of bounds", index);
                    Err(rt.throw("java/lang/StringIndexOutOfBoundsException", &message))
                },
            }
        })
        .method("getBytes", "(Ljava/nio/charset/Charset;)[B", |rt, receiver, args| {
            if object_arg(args, 0).is_none() {
                return Err(rt.throw("java/lang/NullPointerException", "charset is null"));
            }
            let s = rt.string(Val::Ref(receiver)).unwrap_or_default();
            let bytes = s.into_bytes().into_iter().map(|b| b as i8).collect();
            Ok(Val::Ref(Some(rt.new_byte_array(bytes))))
        })
        .method("equals", "(Ljava/lang/Object;)Z", |rt, receiver, args| {
            let other = args.get(0).cloned().unwrap_or(Val::NULL);
            let equal = match (rt.string_units(Val::Ref(receiver)), rt.string_units(other)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            };
            Ok(Val::Boolean(equal))
        })
        .method("hashCode", "()I", |rt, receiver, _| {
            Ok(Val::Int(rt.string_units(Val::Ref(receiver)).map_or(0, string_hash)))
        })
        .method("concat", "(Ljava/lang/String;)Ljava/lang/String;", |rt, receiver, args| {
            let mut s = rt.string(Val::Ref(receiver)).unwrap_or_default();
            s.push_str(&string_arg(rt, args, 0)?);
            Ok(rt.new_string(&s))
        })
        .method("toString", "()Ljava/lang/String;", |_, receiver, _| Ok(Val::Ref(receiver)))
}

fn reflect_method() -> ClassDef {
    fn index(rt: &mut Runtime, receiver: Option<ObjId>) -> Result<usize, Throw> {
        let receiver = this(rt, receiver)?;
        match rt.member(receiver) {
            Some(Member::Method(index)) | Some(Member::Constructor(index)) => Ok(index),
            _ => Err(rt.throw("java/lang/IllegalArgumentException", "not a method")),
        }
    }

    ClassDef::new("java/lang/reflect/Method")
        .final_class()
        .method("getName", "()Ljava/lang/String;", |rt, receiver, _| {
            let index = index(rt, receiver)?;
            let name = rt.methods[index].name.clone();
            Ok(rt.new_string(&name))
        })
        .method("getModifiers", "()I", |rt, receiver, _| {
            let index = index(rt, receiver)?;
            Ok(Val::Int(rt.methods[index].flags as i32))
        })
        .method("getParameterTypes", "()[Ljava/lang/Class;", |rt, receiver, _| {
            let index = index(rt, receiver)?;
            parameter_types(rt, index)
        })
        .method("getReturnType", "()Ljava/lang/Class;", |rt, receiver, _| {
            let index = index(rt, receiver)?;
            let ret = rt.methods[index].sig.ret.clone();
            let class = match ret {
                Some(ty) => rt.type_object(&ty)?,
                None => rt.void_object()?,
            };
            Ok(Val::Ref(Some(class)))
        })
}

fn parameter_types(rt: &mut Runtime, index: usize) -> Result<Val, Throw> {
    let params = rt.methods[index].sig.params.clone();
    let mut classes = Vec::with_capacity(params.len());
    for ty in &params {
        classes.push(Some(rt.type_object(ty)?));
    }
    rt.new_object_array("java/lang/Class", classes).map(|array| Val::Ref(Some(array)))
}

fn reflect_constructor() -> ClassDef {
    fn index(rt: &mut Runtime, receiver: Option<ObjId>) -> Result<usize, Throw> {
        let receiver = this(rt, receiver)?;
        match rt.member(receiver) {
            Some(Member::Constructor(index)) => Ok(index),
            _ => Err(rt.throw("java/lang/IllegalArgumentException", "not a constructor")),
        }
    }

    ClassDef::new("java/lang/reflect/Constructor")
        .final_class()
        .method("getName", "()Ljava/lang/String;", |rt, receiver, _| {
            let index = index(rt, receiver)?;
            let class = rt.methods[index].class;
            let name = rt.class(class).map(|class| class.java_name()).unwrap_or_default();
            Ok(rt.new_string(&name))
        })
        .method("getModifiers", "()I", |rt, receiver, _| {
            let index = index(rt, receiver)?;
            Ok(Val::Int(rt.methods[index].flags as i32))
        })
        .method("getParameterTypes", "()[Ljava/lang/Class;", |rt, receiver, _| {
            let index = index(rt, receiver)?;
            parameter_types(rt, index)
        })
}

fn reflect_field() -> ClassDef {
    fn index(rt: &mut Runtime, receiver: Option<ObjId>) -> Result<usize, Throw> {
        let receiver = this(rt, receiver)?;
        match rt.member(receiver) {
            Some(Member::Field(index)) => Ok(index),
            _ => Err(rt.throw("java/lang/IllegalArgumentException", "not a field")),
        }
    }

    ClassDef::new("java/lang/reflect/Field")
        .final_class()
        .method("getName", "()Ljava/lang/String;", |rt, receiver, _| {
            let index = index(rt, receiver)?;
            let name = rt.fields[index].name.clone();
            Ok(rt.new_string(&name))
        })
        .method("getModifiers", "()I", |rt, receiver, _| {
            let index = index(rt, receiver)?;
            Ok(Val::Int(rt.fields[index].flags as i32))
        })
        .method("getType", "()Ljava/lang/Class;", |rt, receiver, _| {
            let index = index(rt, receiver)?;
            let ty = rt.fields[index].ty.clone();
            rt.type_object(&ty).map(|class| Val::Ref(Some(class)))
        })
}

fn modifier() -> ClassDef {
    ClassDef::new("java/lang/reflect/Modifier")
        .constant("PUBLIC", "I", Val::Int(0x0001))
        .constant("STATIC", "I", Val::Int(ACC_STATIC as i32))
        .static_method("isStatic", "(I)Z", |_, _, args| {
            Ok(Val::Boolean(int_arg(args, 0) & ACC_STATIC as i32 != 0))
        })
        .static_method("isPublic", "(I)Z", |_, _, args| Ok(Val::Boolean(int_arg(args, 0) & 1 != 0)))
}

/// `java/lang/Integer` and friends: each holds the class object of its primitive type in `TYPE`.
fn boxed(kind: TypeKind) -> Option<ClassDef> {
    let name = kind.boxed_class_name()?;
    let primitive = sig::primitive_name(kind)?;
    let def = ClassDef::new(name)
        .final_class()
        .constant("TYPE", "Ljava/lang/Class;", Val::NULL)
        .initializer(move |rt, _, _| {
            let class = rt.class_object_named(primitive)?;
            rt.put_static(name, "TYPE", Val::Ref(Some(class)));
            Ok(Val::Void)
        });
    Some(match kind {
        TypeKind::Int => integer(def),
        _ => def,
    })
}

fn number() -> ClassDef {
    ClassDef::new("java/lang/Number")
        .abstract_class()
        .constructor("()V", |_, _, _| Ok(Val::Void))
        .abstract_method("intValue", "()I")
        .abstract_method("longValue", "()J")
        .abstract_method("doubleValue", "()D")
}

fn integer(def: ClassDef) -> ClassDef {
    def.extends("java/lang/Number")
        .private_field("value", "I")
        .constant("SIZE", "I", Val::Int(32))
        .constant("MAX_VALUE", "I", Val::Int(i32::MAX))
        .constant("MIN_VALUE", "I", Val::Int(i32::MIN))
        .constructor("(I)V", |rt, receiver, args| {
            let receiver = this(rt, receiver)?;
            rt.put_field(receiver, "value", Val::Int(int_arg(args, 0)));
            Ok(Val::Void)
        })
        .method("intValue", "()I", |rt, receiver, _| {
            let receiver = this(rt, receiver)?;
            Ok(rt.get_field(receiver, "value"))
        })
        .method("longValue", "()J", |rt, receiver, _| {
            let receiver = this(rt, receiver)?;
            Ok(Val::Long(rt.get_field(receiver, "value").as_int().unwrap_or(0) as i64))
        })
        .method("doubleValue", "()D", |rt, receiver, _| {
            let receiver = this(rt, receiver)?;
            Ok(Val::Double(rt.get_field(receiver, "value").as_int().unwrap_or(0) as f64))
        })
        .method("toString", "()Ljava/lang/String;", |rt, receiver, _| {
            let receiver = this(rt, receiver)?;
            let value = rt.get_field(receiver, "value").as_int().unwrap_or(0);
            Ok(rt.new_string(&value.to_string()))
        })
        .method("hashCode", "()I", |rt, receiver, _| {
            let receiver = this(rt, receiver)?;
            Ok(rt.get_field(receiver, "value"))
        })
        .method("equals", "(Ljava/lang/Object;)Z", |rt, receiver, args| {
            let receiver = this(rt, receiver)?;
            let equal = match object_arg(args, 0) {
                Some(other) if rt.class_of(other) == rt.class_of(receiver) => {
                    rt.get_field(other, "value") == rt.get_field(receiver, "value")
                },
                _ => false,
            };
            Ok(Val::Boolean(equal))
        })
        .static_method("valueOf", "(I)Ljava/lang/Integer;", |rt, _, args| {
            let boxed = rt.instantiate("java/lang/Integer")?;
            rt.put_field(boxed, "value", Val::Int(int_arg(args, 0)));
            Ok(Val::Ref(Some(boxed)))
        })
        .static_method("parseInt", "(Ljava/lang/String;)I", |rt, _, args| {
            let s = string_arg(rt, args, 0)?;
            match s.parse::<i32>() {
                Ok(i) => Ok(Val::Int(i)),
                Err(_) => {
                    let message = format!("For input string: \"{}\"", s);
                    Err(rt.throw("java/lang/NumberFormatException", &message))
                },
            }
        })
}

fn charsets() -> Vec<ClassDef> {
    let charset = ClassDef::new("java/nio/charset/Charset")
        .private_field("name", "Ljava/lang/String;")
        .method("name", "()Ljava/lang/String;", |rt, receiver, _| {
            let receiver = this(rt, receiver)?;
            Ok(rt.get_field(receiver, "name"))
        })
        .method("toString", "()Ljava/lang/String;", |rt, receiver, _| {
            let receiver = this(rt, receiver)?;
            Ok(rt.get_field(receiver, "name"))
        });
    let standard = ClassDef::new("java/nio/charset/StandardCharsets")
        .final_class()
        .constant("UTF_8", "Ljava/nio/charset/Charset;", Val::NULL)
        .initializer(|rt, _, _| {
            let utf8 = rt.instantiate("java/nio/charset/Charset")?;
            let name = rt.new_string("UTF-8");
            rt.put_field(utf8, "name", name);
            rt.put_static("java/nio/charset/StandardCharsets", "UTF_8", Val::Ref(Some(utf8)));
            Ok(Val::Void)
        });
    vec![charset, standard]
}

/// A throwable class with the two usual constructors.
fn throwable(name: &str, superclass: &str) -> ClassDef {
    ClassDef::new(name)
        .extends(superclass)
        .constructor("()V", |_, _, _| Ok(Val::Void))
        .constructor("(Ljava/lang/String;)V", |rt, receiver, args| {
            let receiver = this(rt, receiver)?;
            let message = args.get(0).cloned().unwrap_or(Val::NULL);
            rt.put_field(receiver, "message", message);
            Ok(Val::Void)
        })
}

fn throwables() -> Vec<ClassDef> {
    let root = throwable("java/lang/Throwable", "java/lang/Object")
        .private_field("message", "Ljava/lang/String;")
        .method("getMessage", "()Ljava/lang/String;", |rt, receiver, _| {
            let receiver = this(rt, receiver)?;
            Ok(rt.get_field(receiver, "message"))
        })
        .method("toString", "()Ljava/lang/String;", |rt, receiver, _| {
            let receiver = this(rt, receiver)?;
            let name = rt.class_name_of(receiver);
            let message = rt.get_field(receiver, "message");
            let description = match rt.string(message) {
                Some(message) => format!("{}: {}", name, message),
                None => name,
            };
            Ok(rt.new_string(&description))
        });

    let hierarchy = [
        ("java/lang/Exception", "java/lang/Throwable"),
        ("java/lang/Error", "java/lang/Throwable"),
        ("java/lang/RuntimeException", "java/lang/Exception"),
        ("java/lang/ReflectiveOperationException", "java/lang/Exception"),
        ("java/lang/ClassNotFoundException", "java/lang/ReflectiveOperationException"),
        ("java/lang/NoSuchFieldException", "java/lang/ReflectiveOperationException"),
        ("java/lang/InstantiationException", "java/lang/ReflectiveOperationException"),
        ("java/lang/IllegalArgumentException", "java/lang/RuntimeException"),
        ("java/lang/NumberFormatException", "java/lang/IllegalArgumentException"),
        ("java/lang/IllegalStateException", "java/lang/RuntimeException"),
        ("java/lang/NullPointerException", "java/lang/RuntimeException"),
        ("java/lang/ArithmeticException", "java/lang/RuntimeException"),
        ("java/lang/IndexOutOfBoundsException", "java/lang/RuntimeException"),
        ("java/lang/StringIndexOutOfBoundsException", "java/lang/IndexOutOfBoundsException"),
        ("java/lang/ArrayIndexOutOfBoundsException", "java/lang/IndexOutOfBoundsException"),
        ("java/lang/LinkageError", "java/lang/Error"),
        ("java/lang/NoClassDefFoundError", "java/lang/LinkageError"),
        ("java/lang/IncompatibleClassChangeError", "java/lang/LinkageError"),
        ("java/lang/NoSuchFieldError", "java/lang/IncompatibleClassChangeError"),
        ("java/lang/NoSuchMethodError", "java/lang/IncompatibleClassChangeError"),
        ("java/lang/AbstractMethodError", "java/lang/IncompatibleClassChangeError"),
    ];
    let mut defs = vec![root];
    defs.extend(hierarchy.iter().map(|&(name, superclass)| throwable(name, superclass)));
    defs
}

fn math() -> ClassDef {
    ClassDef::new("java/lang/Math")
        .final_class()
        .constant("PI", "D", Val::Double(::std::f64::consts::PI))
        .constant("E", "D", Val::Double(::std::f64::consts::E))
        .static_method("sin", "(D)D", |_, _, args| Ok(Val::Double(double_arg(args, 0).sin())))
        .static_method("cos", "(D)D", |_, _, args| Ok(Val::Double(double_arg(args, 0).cos())))
        .static_method("sqrt", "(D)D", |_, _, args| Ok(Val::Double(double_arg(args, 0).sqrt())))
        .static_method("abs", "(I)I", |_, _, args| Ok(Val::Int(int_arg(args, 0).wrapping_abs())))
        .static_method("abs", "(J)J", |_, _, args| {
            Ok(Val::Long(args.get(0).and_then(Val::as_long).unwrap_or(0).wrapping_abs()))
        })
        .static_method("abs", "(D)D", |_, _, args| Ok(Val::Double(double_arg(args, 0).abs())))
        .static_method("max", "(II)I", |_, _, args| {
            Ok(Val::Int(int_arg(args, 0).max(int_arg(args, 1))))
        })
        .static_method("floorDiv", "(II)I", |rt, _, args| {
            let (x, y) = (int_arg(args, 0), int_arg(args, 1));
            if y == 0 {
                return Err(rt.throw("java/lang/ArithmeticException", "/ by zero"));
            }
            let quotient = x.wrapping_div(y);
            let adjust = (x % y != 0) && ((x < 0) != (y < 0));
            Ok(Val::Int(if adjust { quotient - 1 } else { quotient }))
        })
}

/// The sandbox's standard library, in loading order.
pub(crate) fn builtin_classes() -> Vec<ClassDef> {
    let mut defs = vec![object()];
    for &kind in TypeKind::PRIMITIVES.iter() {
        if let Some(name) = sig::primitive_name(kind) {
            defs.push(ClassDef::primitive(kind, name));
        }
    }
    defs.push(char_sequence());
    defs.push(class());
    defs.push(string());
    defs.extend(throwables());
    defs.push(reflect_method());
    defs.push(reflect_constructor());
    defs.push(reflect_field());
    defs.push(modifier());
    defs.push(number());
    defs.extend(TypeKind::PRIMITIVES.iter().filter_map(|&kind| boxed(kind)));
    defs.extend(charsets());
    defs.push(math());
    defs
}
