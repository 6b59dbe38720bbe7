//! XDG Base Directory support.

use std::path::PathBuf;

const APP_DIR: &str = "bccs-chat";

/// XDG directory paths for bccs-chat.
pub struct XdgDirs {
    /// Config directory (~/.config/bccs-chat or XDG_CONFIG_HOME/bccs-chat)
    pub config: PathBuf,
    /// State directory (~/.local/state/bccs-chat or XDG_STATE_HOME/bccs-chat)
    pub state: PathBuf,
}

impl XdgDirs {
    /// Get XDG directories, respecting environment variables.
    pub fn new() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

        Self {
            config: std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| home.join(".config"))
                .join(APP_DIR),
            state: std::env::var("XDG_STATE_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| home.join(".local/state"))
                .join(APP_DIR),
        }
    }

    /// Default settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config.join("config.json")
    }

    /// Log file used while the terminal UI owns the screen.
    pub fn log_file(&self) -> PathBuf {
        self.state.join("bccs-chat.log")
    }

    /// Ensure the state directory exists (the config dir is only read).
    pub fn ensure_state_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.state)
    }
}

impl Default for XdgDirs {
    fn default() -> Self {
        Self::new()
    }
}
