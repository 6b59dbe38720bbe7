//! Configuration management.

mod settings;
mod xdg;

pub use settings::{
    Settings, SettingsError, SettingsOverrides, BACKEND_URL_ENV, DEFAULT_BACKEND_URL,
    DEFAULT_GREETING,
};
pub use xdg::XdgDirs;
