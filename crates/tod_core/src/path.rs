//! Host path normalization
//!
//! Older macOS hosts report colon separated HFS paths
//! (`Macintosh HD:X-Plane 11:Output:`). Those have to become POSIX paths
//! before `std::fs` can open them. Everywhere else the host path is already
//! native.

use crate::error::PathError;

pub trait PathNormalizer {
    fn normalize(&self, path: &str) -> Result<String, PathError>;
}

/// Leaves paths untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughNormalizer;

impl PathNormalizer for PassthroughNormalizer {
    fn normalize(&self, path: &str) -> Result<String, PathError> {
        Ok(path.to_string())
    }
}

/// HFS (`Volume:dir:file`) to POSIX conversion.
#[derive(Debug, Clone)]
pub struct HfsNormalizer {
    boot_volume: String,
}

impl Default for HfsNormalizer {
    fn default() -> Self {
        Self::new("Macintosh HD")
    }
}

impl HfsNormalizer {
    pub fn new(boot_volume: impl Into<String>) -> Self {
        Self {
            boot_volume: boot_volume.into(),
        }
    }
}

impl PathNormalizer for HfsNormalizer {
    fn normalize(&self, path: &str) -> Result<String, PathError> {
        if path.is_empty() {
            return Err(PathError::Empty);
        }

        let mut components = path.split(':');
        let volume = components.next().unwrap_or_default();
        let rest: Vec<&str> = components.collect();
        if volume.is_empty() || rest.is_empty() {
            return Err(PathError::MissingVolume {
                path: path.to_string(),
            });
        }

        // A trailing separator yields one empty last component; any other
        // empty component is an HFS parent reference ("::").
        let last = rest.len() - 1;
        if let Some(index) = rest[..last].iter().position(|c| c.is_empty()) {
            return Err(PathError::EmptyComponent {
                path: path.to_string(),
                index: index + 1,
            });
        }

        let mut out = if volume == self.boot_volume {
            String::new()
        } else {
            format!("/Volumes/{}", volume.replace('/', ":"))
        };
        for component in &rest {
            out.push('/');
            out.push_str(&component.replace('/', ":"));
        }
        Ok(out)
    }
}

#[cfg(target_os = "macos")]
pub type PlatformNormalizer = HfsNormalizer;

#[cfg(not(target_os = "macos"))]
pub type PlatformNormalizer = PassthroughNormalizer;

/// Normalize with the build target's normalizer.
pub fn normalize_path(path: &str) -> Result<String, PathError> {
    PlatformNormalizer::default().normalize(path)
}
