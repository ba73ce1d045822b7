//! Starting the JVM and finding the context of the current thread.
//!
//! A process hosts at most one JVM. `launch` claims it; the context it builds lives in a
//! thread-local of the launching thread, since every wrapper holds `Rc`s and stays on that thread.

use std::cell::RefCell;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Mutex;

use crate::bridge::Context;
use crate::config::VmConfig;
use crate::error::{Error, Result};

static STARTED: Mutex<bool> = Mutex::new(false);

thread_local! {
    static CONTEXT: RefCell<Option<Rc<Context>>> = RefCell::new(None);
}

/// Starts the JVM in `library_path` with the given options. Failures are logged, not returned.
pub fn start<P: AsRef<Path>>(library_path: P, options: &[String]) -> bool {
    let mut config = VmConfig::new(library_path.as_ref());
    config.options = options.to_vec();
    match launch(&config) {
        Ok(_) => true,
        Err(e) => {
            error!("{}", e);
            false
        },
    }
}

/// Starts the JVM and builds the context for the current thread.
pub fn launch(config: &VmConfig) -> Result<Rc<Context>> {
    claim(|| {
        let path = config.library_path.as_ref()
            .ok_or_else(|| Error::Startup(String::from("no JVM library configured or found")))?;
        create(path, &config.options)
    })
}

/// Runs `create` unless a runtime was already started in this process. The slot is taken only
/// if `create` succeeds.
fn claim<F>(create: F) -> Result<Rc<Context>>
    where F: FnOnce() -> Result<Rc<Context>>
{
    let mut started = match STARTED.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if *started {
        return Err(Error::AlreadyStarted);
    }
    let context = create()?;
    *started = true;
    CONTEXT.with(|slot| *slot.borrow_mut() = Some(context.clone()));
    Ok(context)
}

#[cfg(feature = "jvm")]
fn create(path: &Path, options: &[String]) -> Result<Rc<Context>> {
    use crate::env::jni::JavaVm;
    use crate::env::Env;

    let vm = JavaVm::create(path, options)?;
    let env: Rc<dyn Env> = Rc::new(vm.into_env());
    Context::new(env)
}

#[cfg(not(feature = "jvm"))]
fn create(path: &Path, _options: &[String]) -> Result<Rc<Context>> {
    Err(Error::Startup(format!("cannot load {}: built without the `jvm` feature",
                               path.display())))
}

/// The context of the JVM started on this thread.
pub fn context() -> Option<Rc<Context>> {
    CONTEXT.with(|slot| slot.borrow().clone())
}

/// Like `context`, failing with `Error::NotRunning`.
pub fn require_context() -> Result<Rc<Context>> {
    context().ok_or(Error::NotRunning)
}

#[cfg(target_os = "windows")]
const LIBRARY: &str = "jvm.dll";
#[cfg(target_os = "macos")]
const LIBRARY: &str = "libjvm.dylib";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const LIBRARY: &str = "libjvm.so";

#[cfg(target_os = "windows")]
const LIBRARY_DIRS: &[&str] = &["bin", "jre/bin"];
#[cfg(not(target_os = "windows"))]
const LIBRARY_DIRS: &[&str] = &["lib", "jre/lib"];

#[cfg(target_os = "macos")]
const SYSTEM_ROOT: &str = "/Library/Java/JavaVirtualMachines";
#[cfg(not(target_os = "macos"))]
const SYSTEM_ROOT: &str = "/usr/lib/jvm";

/// Finds a JVM library: under `JAVA_HOME` first, then the system's JVM directory, newest
/// version first.
pub fn locate_libjvm() -> Option<PathBuf> {
    let java_home = env::var_os("JAVA_HOME").map(PathBuf::from);
    search(java_home.as_ref().map(PathBuf::as_path), Path::new(SYSTEM_ROOT))
}

fn search(java_home: Option<&Path>, root: &Path) -> Option<PathBuf> {
    if let Some(found) = java_home.and_then(find_in_home) {
        return Some(found);
    }
    let mut homes: Vec<PathBuf> = match fs::read_dir(root) {
        Ok(entries) => entries.filter_map(|entry| entry.ok()).map(|entry| entry.path()).collect(),
        Err(_) => return None,
    };
    homes.sort_by_key(|home| version_key(home));
    homes.iter().rev()
        .map(|home| {
            let bundle = home.join("Contents").join("Home");
            if bundle.is_dir() { bundle } else { home.clone() }
        })
        .filter_map(|home| find_in_home(&home))
        .next()
}

/// The library inside one JVM installation, preferring the server VM.
fn find_in_home(home: &Path) -> Option<PathBuf> {
    for dir in LIBRARY_DIRS {
        let base = home.join(dir);
        for variant in &["server", "client"] {
            if let Some(found) = find_below(&base, variant, 2) {
                debug!("found JVM library {}", found.display());
                return Some(found);
            }
        }
    }
    None
}

/// Looks for `<variant>/<library>` in `dir` and, up to `depth` levels down, in its
/// subdirectories (e.g. `lib/amd64/server`).
fn find_below(dir: &Path, variant: &str, depth: usize) -> Option<PathBuf> {
    let candidate = dir.join(variant).join(LIBRARY);
    if candidate.is_file() {
        return Some(candidate);
    }
    if depth == 0 {
        return None;
    }
    let mut subdirs: Vec<PathBuf> = fs::read_dir(dir).ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    subdirs.sort();
    subdirs.iter().filter_map(|sub| find_below(sub, variant, depth - 1)).next()
}

/// Orders directory names like `java-8-openjdk` and `java-17-openjdk` by their numbers.
fn version_key(path: &Path) -> (Vec<u64>, String) {
    let name = path.file_name().map_or_else(String::new, |n| n.to_string_lossy().into_owned());
    let numbers = name.split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.parse().ok())
        .collect();
    (numbers, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs::File;

    use tempfile::TempDir;

    use crate::sandbox::Sandbox;

    fn install(root: &Path, home: &str, dir: &str) -> PathBuf {
        let dir = root.join(home).join(dir);
        fs::create_dir_all(&dir).unwrap();
        let library = dir.join(LIBRARY);
        File::create(&library).unwrap();
        library
    }

    #[test]
    fn prefers_java_home() {
        let tmp = TempDir::new().unwrap();
        let home = install(tmp.path(), "home", &format!("{}/server", LIBRARY_DIRS[0]));
        install(tmp.path(), "jvm/java-17", &format!("{}/server", LIBRARY_DIRS[0]));
        let found = search(Some(&tmp.path().join("home")), &tmp.path().join("jvm"));
        assert_eq!(found, Some(home));
    }

    #[test]
    fn newest_installation_wins() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("jvm");
        install(&root, "java-8-openjdk", &format!("{}/amd64/server", LIBRARY_DIRS[1]));
        let newest = install(&root, "java-17-openjdk", &format!("{}/server", LIBRARY_DIRS[0]));
        install(&root, "java-11-openjdk", &format!("{}/server", LIBRARY_DIRS[0]));
        assert_eq!(search(None, &root), Some(newest));
    }

    #[test]
    fn nested_and_client_libraries() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("jvm");
        let client = install(&root, "java-8", &format!("{}/i386/client", LIBRARY_DIRS[1]));
        assert_eq!(search(Some(&tmp.path().join("missing")), &root), Some(client));
    }

    #[test]
    fn nothing_installed() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(search(None, &tmp.path().join("jvm")), None);
        fs::create_dir_all(tmp.path().join("jvm/empty/lib")).unwrap();
        assert_eq!(search(None, &tmp.path().join("jvm")), None);
    }

    #[test]
    fn one_runtime_per_process() {
        let failed = claim(|| Err(Error::Startup(String::from("refused"))));
        assert!(matches!(failed, Err(Error::Startup(_))));
        assert!(context().is_none());

        let sandbox = Sandbox::new().unwrap();
        let first = claim(|| Context::new(sandbox.env())).unwrap();
        assert!(Rc::ptr_eq(&first, &require_context().unwrap()));

        let mut called = false;
        let second = claim(|| {
            called = true;
            Context::new(sandbox.env())
        });
        assert!(matches!(second, Err(Error::AlreadyStarted)));
        assert!(!called);
        assert!(matches!(launch(&VmConfig::new("libjvm.so")), Err(Error::AlreadyStarted)));
        assert!(!start("libjvm.so", &[]));
        assert!(Rc::ptr_eq(&first, &context().unwrap()));
    }

    #[test]
    fn version_ordering() {
        let mut names = vec!["java-11", "java-8", "java-17", "default-java"];
        names.sort_by_key(|name| version_key(Path::new(name)));
        assert_eq!(names, vec!["default-java", "java-8", "java-11", "java-17"]);
    }
}
