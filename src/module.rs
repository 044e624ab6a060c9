//! The plug-in module loader.
//!
//! A module is a shared library that contributes appender, layout or
//! filter types. At load time the loader looks up the entry point
//! symbol `log4g_module_load` and invokes it with the process-wide
//! [`TypeRegistry`](crate::registry::TypeRegistry) so the module can
//! register its constructors:
//!
//! ```no_run
//! use log4g::registry::TypeRegistry;
//!
//! #[no_mangle]
//! pub extern "C" fn log4g_module_load(registry: &mut TypeRegistry) {
//!     // registry.register_appender("MyAppender", || Box::new(MyAppender::default()));
//! }
//! ```
//!
//! Directories are searched in order: the system path from
//! `LOG4G_MODULE_SYSTEM_PATH` (falling back to a built-in default),
//! then the user path from `LOG4G_MODULE_PATH`. Paths are
//! colon-separated. A module that fails to load is logged and skipped;
//! it never prevents the remaining modules from loading. Loaded modules
//! stay resident for the life of the process.

use std::env;
use std::path::Path;

use libloading::Library;

use crate::internal;
use crate::registry::{self, TypeRegistry};

/// The entry point every module must export.
pub type ModuleEntry = unsafe extern "C" fn(&mut TypeRegistry);

/// The name of the entry point symbol.
pub const MODULE_ENTRY_SYMBOL: &[u8] = b"log4g_module_load\0";

const MODULE_SYSTEM_PATH: &str = "LOG4G_MODULE_SYSTEM_PATH";
const MODULE_PATH: &str = "LOG4G_MODULE_PATH";

/// The system module directory compiled into the library.
const DEFAULT_SYSTEM_PATH: &str = "/usr/lib/log4g/modules";

/// A trait for module loading strategies.
pub trait ModuleLoader {
    /// Discovers and activates plug-in modules. Idempotent.
    fn load_modules(&mut self);
}

/// The default loader: scans the module path directories for shared
/// libraries.
#[derive(Default)]
pub struct DefaultModuleLoader {
    loaded: bool,
    // Held so the libraries are never unloaded while referenced.
    modules: Vec<Library>,
}

impl DefaultModuleLoader {
    /// Creates a loader that has not yet scanned.
    pub fn new() -> DefaultModuleLoader {
        DefaultModuleLoader::default()
    }

    fn is_module_name(name: &str) -> bool {
        name.starts_with(env::consts::DLL_PREFIX) && name.ends_with(env::consts::DLL_SUFFIX)
    }

    fn load_directory(&mut self, dir: &Path) {
        let entries = match dir.read_dir() {
            Ok(entries) => entries,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                internal::debug(format_args!("no module directory at {}", dir.display()));
                return;
            }
            Err(error) => {
                internal::error(format_args!("{}: {}", dir.display(), error));
                return;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let valid = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(Self::is_module_name)
                .unwrap_or(false);
            if valid {
                self.load_module(&path);
            }
        }
    }

    fn load_module(&mut self, path: &Path) {
        let library = match unsafe { Library::new(path) } {
            Ok(library) => library,
            Err(error) => {
                internal::error(format_args!(
                    "failed to load module {}: {}",
                    path.display(),
                    error
                ));
                return;
            }
        };
        {
            let entry = match unsafe { library.get::<ModuleEntry>(MODULE_ENTRY_SYMBOL) } {
                Ok(entry) => entry,
                Err(error) => {
                    internal::error(format_args!(
                        "module {} has no entry point: {}",
                        path.display(),
                        error
                    ));
                    return;
                }
            };
            let mut registry = registry::registry().write();
            unsafe { entry(&mut registry) };
        }
        internal::debug(format_args!("loaded module: {}", path.display()));
        self.modules.push(library);
    }

    fn load_path_list(&mut self, paths: &str) {
        for dir in paths.split(':').filter(|dir| !dir.is_empty()) {
            self.load_directory(Path::new(dir));
        }
    }
}

impl ModuleLoader for DefaultModuleLoader {
    fn load_modules(&mut self) {
        if self.loaded {
            return;
        }
        let system = env::var(MODULE_SYSTEM_PATH).unwrap_or_else(|_| DEFAULT_SYSTEM_PATH.to_owned());
        self.load_path_list(&system);
        if let Ok(user) = env::var(MODULE_PATH) {
            self.load_path_list(&user);
        }
        self.loaded = true;
    }
}
