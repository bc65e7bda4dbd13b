use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

/// Platform base directory used when no explicit home_dir is configured.
/// Windows: %APPDATA%, Unix/macOS: $HOME.
fn platform_base_dir() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    let var = "APPDATA";
    #[cfg(not(target_os = "windows"))]
    let var = "HOME";

    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("environment variable {var} is not set"))
}

/// Expand a leading `~` against the platform base directory.
fn expand_tilde(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return platform_base_dir();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(platform_base_dir()?.join(rest));
    }
    Ok(PathBuf::from(raw))
}

fn absolutize(p: &Path) -> Result<PathBuf> {
    if p.is_absolute() {
        return Ok(p.to_path_buf());
    }
    let cwd = std::env::current_dir().context("cannot read current directory")?;
    Ok(cwd.join(p))
}

/// Resolve the server home directory into an absolute path.
///
/// - `configured`: user-provided value (may start with `~`); `None` selects
///   `<platform base>/<default_subdir>`.
/// - `create`: create the directory (and parents) when missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let raw = match configured {
        Some(p) => expand_tilde(p.trim())?,
        None => platform_base_dir()?.join(default_subdir),
    };
    let resolved = absolutize(&raw)?;

    if create {
        std::fs::create_dir_all(&resolved)
            .with_context(|| format!("cannot create home_dir {}", resolved.display()))?;
    }
    Ok(resolved)
}
