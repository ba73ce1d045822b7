//! How the JVM is started.

use std::env;
use std::path::PathBuf;

use log::LevelFilter;

use crate::bootstrap;
use crate::logging;

/// Names the JVM library explicitly.
pub const LIBJVM_VAR: &str = "JVM_BRIDGE_LIBJVM";
/// A class path, passed to the JVM as `-Djava.class.path`.
pub const CLASSPATH_VAR: &str = "JVM_BRIDGE_CLASSPATH";
/// A log level name such as `debug`.
pub const LOG_VAR: &str = "JVM_BRIDGE_LOG";

#[derive(Debug, Clone, PartialEq)]
pub struct VmConfig {
    /// The JVM shared library (`libjvm.so`, `libjvm.dylib` or `jvm.dll`).
    pub library_path: Option<PathBuf>,
    /// Options handed to the JVM verbatim, e.g. `-Xmx512m`.
    pub options: Vec<String>,
    pub log_level: LevelFilter,
}

impl VmConfig {
    pub fn new<P: Into<PathBuf>>(library_path: P) -> VmConfig {
        VmConfig {
            library_path: Some(library_path.into()),
            options: vec![],
            log_level: logging::DEFAULT_LOG_LEVEL,
        }
    }

    pub fn option<S: Into<String>>(mut self, option: S) -> VmConfig {
        self.options.push(option.into());
        self
    }

    pub fn class_path<S: AsRef<str>>(self, class_path: S) -> VmConfig {
        self.option(format!("-Djava.class.path={}", class_path.as_ref()))
    }

    pub fn log_level(mut self, level: LevelFilter) -> VmConfig {
        self.log_level = level;
        self
    }

    /// Reads the configuration from the `JVM_BRIDGE_*` environment variables, searching the
    /// usual install locations when no library is named.
    pub fn from_env() -> VmConfig {
        VmConfig::from_vars(|name| env::var(name).ok())
    }

    fn from_vars<F>(var: F) -> VmConfig
        where F: Fn(&str) -> Option<String>
    {
        let library_path = var(LIBJVM_VAR)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
            .or_else(bootstrap::locate_libjvm);
        let mut config = VmConfig {
            library_path: library_path,
            options: vec![],
            log_level: var(LOG_VAR).map_or(logging::DEFAULT_LOG_LEVEL, |l| logging::parse_level(&l)),
        };
        if let Some(class_path) = var(CLASSPATH_VAR).filter(|path| !path.is_empty()) {
            config = config.class_path(class_path);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    #[test]
    fn builder() {
        let config = VmConfig::new("/opt/jdk/lib/server/libjvm.so")
            .class_path("a.jar:b.jar")
            .option("-Xmx64m")
            .log_level(LevelFilter::Debug);
        assert_eq!(config.library_path, Some(PathBuf::from("/opt/jdk/lib/server/libjvm.so")));
        assert_eq!(config.options, vec!["-Djava.class.path=a.jar:b.jar", "-Xmx64m"]);
        assert_eq!(config.log_level, LevelFilter::Debug);
    }

    #[test]
    fn reads_variables() {
        let mut vars = HashMap::new();
        vars.insert(LIBJVM_VAR, "/tmp/libjvm.so");
        vars.insert(CLASSPATH_VAR, "classes");
        vars.insert(LOG_VAR, "trace");
        let config = VmConfig::from_vars(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.library_path, Some(PathBuf::from("/tmp/libjvm.so")));
        assert_eq!(config.options, vec!["-Djava.class.path=classes"]);
        assert_eq!(config.log_level, LevelFilter::Trace);
    }

    #[test]
    fn empty_variables_are_ignored() {
        let mut vars = HashMap::new();
        vars.insert(CLASSPATH_VAR, "");
        vars.insert(LOG_VAR, "loud");
        let config = VmConfig::from_vars(|name| vars.get(name).map(|v| v.to_string()));
        assert!(config.options.is_empty());
        assert_eq!(config.log_level, logging::DEFAULT_LOG_LEVEL);
    }
}
