use super::{Profile, ProfileError};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const PROFILE_DIR: &str = ".config/slidepad";
pub const PROFILE_FILE: &str = "profile.toml";

/// `~/.config/slidepad/profile.toml`
pub fn default_path() -> PathBuf {
    let mut path = get_home_dir();
    path.push(PROFILE_DIR);
    path.push(PROFILE_FILE);
    path
}

fn get_home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| {
        warn!("Could not determine home directory, using current directory");
        PathBuf::from(".")
    })
}

/// Reads, parses and validates a profile.
pub async fn load(path: &Path) -> Result<Profile, ProfileError> {
    debug!("Loading profile from {}", path.display());
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let profile: Profile = toml::from_str(&content).map_err(|source| ProfileError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    profile.validate()?;

    info!("Profile '{}' loaded from {}", profile.name, path.display());
    Ok(profile)
}

/// Writes `profile` to `path`, creating parent directories.
///
/// Refuses to replace an existing file unless `overwrite` is set.
pub async fn save(profile: &Profile, path: &Path, overwrite: bool) -> Result<(), ProfileError> {
    let io_err = |source| ProfileError::Io {
        path: path.to_path_buf(),
        source,
    };

    if !overwrite && tokio::fs::try_exists(path).await.map_err(io_err)? {
        return Err(ProfileError::AlreadyExists(path.to_path_buf()));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
    }

    let content = toml::to_string_pretty(profile)?;
    tokio::fs::write(path, content).await.map_err(io_err)?;

    info!("Profile '{}' saved to {}", profile.name, path.display());
    Ok(())
}
