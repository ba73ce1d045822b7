#![cfg(test)]

extern crate jvm_bridge;
extern crate tempfile;

use std::io::Write;

use jvm_bridge::bootstrap::{self, context, require_context};
use jvm_bridge::{Error, VmConfig};

#[test]
fn missing_library_does_not_start() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("libjvm.so");
    assert!(!bootstrap::start(&path, &[]));
    assert!(context().is_none());
}

#[test]
fn garbage_library_does_not_start() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"definitely not a shared library").unwrap();
    let options = vec![String::from("-Xmx64m")];
    assert!(!bootstrap::start(file.path(), &options));
    assert!(context().is_none());
}

#[test]
fn no_context_before_launch() {
    assert!(context().is_none());
    match require_context() {
        Err(Error::NotRunning) => {},
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn launch_needs_a_library() {
    let mut config = VmConfig::new("unused");
    config.library_path = None;
    match bootstrap::launch(&config) {
        Err(Error::Startup(_)) => {},
        other => panic!("unexpected {:?}", other),
    }
    assert!(require_context().is_err());
}
