//! Locating and reading `terrasprite.toml`
//!
//! The nearest `terrasprite.toml` at or above the working directory wins,
//! then the per-user one under the XDG config directory. Values from the
//! command line are layered on top with [`merge_cli_overrides`].

use super::schema::{ConfigValidationError, TerraConfig};
use crate::loader::NonePolicy;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the project configuration file.
pub const CONFIG_FILE_NAME: &str = "terrasprite.toml";

/// Why a configuration file could not be used.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid TOML: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(
        "{} has {} invalid setting(s):\n{}",
        .path.display(),
        .issues.len(),
        .issues.iter().map(|issue| format!("  - {}", issue)).collect::<Vec<_>>().join("\n")
    )]
    Invalid { path: PathBuf, issues: Vec<ConfigValidationError> },
}

/// Command-line values that replace their configured counterparts.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub sprites_dir: Option<PathBuf>,
    pub extension: Option<String>,
    pub none_policy: Option<NonePolicy>,
}

/// The config file that applies to the current working directory, if any.
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(|cwd| find_config_from(&cwd)).or_else(find_xdg_config)
}

/// Nearest `terrasprite.toml` in `start` or one of its ancestors.
pub fn find_config_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// `$XDG_CONFIG_HOME/terrasprite/terrasprite.toml`, with `~/.config` standing
/// in for an unset `XDG_CONFIG_HOME`.
pub fn find_xdg_config() -> Option<PathBuf> {
    let base = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("terrasprite").join(CONFIG_FILE_NAME)).filter(|path| path.is_file())
}

/// Load `path`, or the discovered config, or the defaults when neither exists.
pub fn load_config(path: Option<&Path>) -> Result<TerraConfig, ConfigError> {
    match path.map(Path::to_path_buf).or_else(find_config) {
        Some(path) => read_config(&path),
        None => Ok(default_config()),
    }
}

fn read_config(path: &Path) -> Result<TerraConfig, ConfigError> {
    let text = fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    let config: TerraConfig = toml::from_str(&text)
        .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;

    let issues = config.validate();
    if issues.is_empty() {
        Ok(config)
    } else {
        Err(ConfigError::Invalid { path: path.to_path_buf(), issues })
    }
}

/// Configuration used when no terrasprite.toml is found.
pub fn default_config() -> TerraConfig {
    TerraConfig::default()
}

/// Apply command-line values over the loaded configuration.
pub fn merge_cli_overrides(config: &mut TerraConfig, overrides: &CliOverrides) {
    if let Some(dir) = &overrides.sprites_dir {
        config.sprites.dir = dir.clone();
    }
    if let Some(extension) = &overrides.extension {
        config.sprites.extension = extension.clone();
    }
    if let Some(policy) = overrides.none_policy {
        config.sprites.none_policy = policy;
    }
}

/// Anchor a relative sprite directory at the project root.
///
/// A directory that lands inside `cwd` is stored relative to it, so runs
/// from the project root log `assets/sprites/...` rather than an absolute
/// path. Anything outside `cwd` stays anchored at the root.
pub fn resolve_sprite_dir(config: &mut TerraConfig, project_root: &Path, cwd: &Path) {
    if config.sprites.dir.is_absolute() {
        return;
    }
    let anchored = project_root.join(&config.sprites.dir);
    config.sprites.dir = match anchored.strip_prefix(cwd) {
        Ok(rest) if rest.as_os_str().is_empty() => PathBuf::from("."),
        Ok(rest) if anchored.is_absolute() => rest.to_path_buf(),
        _ => anchored,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &Path, contents: &[u8]) -> PathBuf {
        let config_path = dir.join(CONFIG_FILE_NAME);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(contents)
            .expect("should write config content");
        config_path
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"[sprites]\ndir = \"tiles\"");

        let found = find_config_from(temp.path());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"");

        let subdir = temp.path().join("assets").join("sprites");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        let found = find_config_from(&subdir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        let found = find_config_from(temp.path());
        assert_eq!(found, None);
    }

    #[test]
    #[serial]
    fn test_find_xdg_config() {
        let temp = TempDir::new().expect("should create temp dir");
        let dir = temp.path().join("terrasprite");
        fs::create_dir_all(&dir).expect("should create xdg dir");
        let config_path = write_config(&dir, b"");

        let previous = env::var_os("XDG_CONFIG_HOME");
        env::set_var("XDG_CONFIG_HOME", temp.path());
        let found = find_xdg_config();
        match previous {
            Some(value) => env::set_var("XDG_CONFIG_HOME", value),
            None => env::remove_var("XDG_CONFIG_HOME"),
        }

        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_load_config_from_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(
            temp.path(),
            br##"
[sprites]
dir = "tiles"
none_policy = "suppress"

[fallback]
color = "#336699"

[watch]
debounce_ms = 250
"##,
        );

        let config = load_config(Some(&config_path)).expect("should load valid config");
        assert_eq!(config.sprites.dir, PathBuf::from("tiles"));
        assert_eq!(config.sprites.none_policy, NonePolicy::Suppress);
        assert_eq!(config.fallback.color, "#336699");
        assert_eq!(config.watch.debounce_ms, 250);
    }

    #[test]
    fn test_load_config_missing_file_errors() {
        let temp = TempDir::new().expect("should create temp dir");
        let result = load_config(Some(&temp.path().join("nonexistent.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"this is not valid toml {{{");

        let result = load_config(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::Parse { ref path, .. }) if *path == config_path));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"[fallback]\ncolor = \"not-a-color\"\n");

        let result = load_config(Some(&config_path));
        match result {
            Err(ConfigError::Invalid { issues, .. }) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].field, "fallback.color");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_cli_overrides() {
        let mut config = default_config();
        let overrides = CliOverrides {
            sprites_dir: Some(PathBuf::from("other/sprites")),
            none_policy: Some(NonePolicy::Suppress),
            ..Default::default()
        };
        merge_cli_overrides(&mut config, &overrides);

        assert_eq!(config.sprites.dir, PathBuf::from("other/sprites"));
        assert_eq!(config.sprites.extension, "png");
        assert_eq!(config.sprites.none_policy, NonePolicy::Suppress);
    }

    #[test]
    fn test_resolve_sprite_dir() {
        let mut config = default_config();
        resolve_sprite_dir(&mut config, Path::new("/project"), Path::new("/elsewhere"));
        assert_eq!(config.sprites.dir, PathBuf::from("/project/assets/sprites"));

        config.sprites.dir = PathBuf::from("/abs/tiles");
        resolve_sprite_dir(&mut config, Path::new("/project"), Path::new("/project"));
        assert_eq!(config.sprites.dir, PathBuf::from("/abs/tiles"));
    }

    #[test]
    fn test_resolve_sprite_dir_stays_relative_under_cwd() {
        let mut config = default_config();
        resolve_sprite_dir(&mut config, Path::new("/project"), Path::new("/project"));
        assert_eq!(config.sprites.dir, PathBuf::from("assets/sprites"));

        let mut config = default_config();
        resolve_sprite_dir(&mut config, Path::new("/project"), Path::new("/project/assets"));
        assert_eq!(config.sprites.dir, PathBuf::from("sprites"));

        config.sprites.dir = PathBuf::from("tiles");
        resolve_sprite_dir(&mut config, Path::new("../game"), Path::new("/work"));
        assert_eq!(config.sprites.dir, PathBuf::from("../game/tiles"));
    }
}
