//! Access flags of classes, methods and fields, with the same bit values as in class files.
//! `java.lang.reflect.Modifier` reports these bits unchanged.

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;

pub fn is_set(flags: u16, flag: u16) -> bool {
    flags & flag != 0
}
