//! Configuration file handling.
//!
//! Settings live in an INI file at `<config dir>/launchpad/config.ini`:
//!
//! ```ini
//! [install]
//! install_dir = /data/app/files
//! assets_dir = /data/app/assets
//! namespace = module
//! entry_point = llapp_main.lua
//! native_lib_dir = /data/app/lib
//!
//! [display]
//! refresh = none
//!
//! [logging]
//! level = info
//! file = /data/app/logs/launchpad.log
//! ```
//!
//! A missing file is equivalent to all defaults. CLI arguments override
//! file values when specified.

mod file;
mod keys;

pub use file::{
    config_file_path, default_install_dir, ConfigError, ConfigFile, DisplaySettings,
    InstallSettings, LoggingSettings, DEFAULT_LOG_LEVEL,
};
pub use keys::ConfigKey;
