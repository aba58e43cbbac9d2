//! Where `hitlist` looks for configuration files.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use directories::ProjectDirs;

/// Replaces the platform configuration directory when set and non-empty.
pub(crate) const CONFIG_DIR_ENV: &str = "HITLIST_CONFIG_DIR";

const USER_CONFIG_FILE: &str = "config.toml";
const LOCAL_CONFIG_FILE: &str = "hitlist.toml";

pub(crate) fn config_dir() -> Result<PathBuf> {
	config_dir_from(env::var_os(CONFIG_DIR_ENV))
}

fn config_dir_from(override_dir: Option<OsString>) -> Result<PathBuf> {
	if let Some(dir) = override_dir.filter(|dir| !dir.is_empty()) {
		return Ok(PathBuf::from(dir));
	}
	ProjectDirs::from("io", "albo", "hitlist")
		.map(|dirs| dirs.config_local_dir().to_path_buf())
		.ok_or_else(|| anyhow!("no home directory to hold hitlist configuration"))
}

/// Files merged when `--no-config` is absent. Later entries win.
pub(crate) fn default_config_files() -> Vec<PathBuf> {
	let user = config_dir().ok().map(|dir| dir.join(USER_CONFIG_FILE));
	let local = env::current_dir()
		.ok()
		.map(|dir| dir.join(LOCAL_CONFIG_FILE));
	user.into_iter().chain(local).collect()
}
