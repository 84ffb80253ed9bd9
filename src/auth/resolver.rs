//! Virtual-path ↔ host-path translation.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Failure modes specific to path translation.
#[derive(Error, Debug, Eq, PartialEq, Clone)]
pub enum ResolveError {
    #[error("path escapes the user's root")]
    EscapesRoot,
    #[error("no such file or directory")]
    NotFound,
    #[error("permission denied")]
    PermissionDenied,
}

/// Translates between the absolute virtual path a client sees (always rooted at `/`)
/// and the absolute host path backing it:
///
/// lexically normalize the virtual path first (collapsing `.` and `..` without
/// reaching above `/`), then concatenate with root, then apply an OS-level
/// canonicalization and reject results whose canonical form is not prefixed by the
/// canonical root (defeats symlink escapes).
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    pub fn new(root: PathBuf) -> Self {
        PathResolver { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `translate(root, cwd, arg) -> absolute host path`. `arg` may be absolute (begins
    /// `/`) or relative to `cwd`. The result is lexically normalized before any
    /// filesystem access; callers that need symlink-escape protection should follow up
    /// with [`canonicalize_within_root`].
    pub fn translate(&self, cwd: &str, arg: &str) -> Result<(PathBuf, String), ResolveError> {
        let candidate = if arg.starts_with('/') { arg.to_string() } else { join_virtual(cwd, arg) };
        let normalized = normalize_virtual(&candidate)?;
        let host = self.virtual_to_host(&normalized);
        Ok((host, normalized))
    }

    /// The inverse of `translate`: given a host path known to lie within root, return
    /// the corresponding virtual path (used to build reply lines, e.g. for PWD/MKD).
    pub fn rooted(&self, host_path: &Path) -> Result<String, ResolveError> {
        let rel = host_path.strip_prefix(&self.root).map_err(|_| ResolveError::EscapesRoot)?;
        let mut virt = String::from("/");
        let rel_str = rel.to_string_lossy();
        virt.push_str(&rel_str);
        Ok(normalize_virtual(&virt)?)
    }

    fn virtual_to_host(&self, normalized_virtual: &str) -> PathBuf {
        let mut host = self.root.clone();
        for component in Path::new(normalized_virtual).components() {
            if let Component::Normal(part) = component {
                host.push(part);
            }
        }
        host
    }

    /// Resolves symlinks at access time and verifies the result stays within root.
    pub async fn canonicalize_within_root(&self, host_path: &Path) -> Result<PathBuf, ResolveError> {
        let root = self.root.clone();
        let path = host_path.to_path_buf();
        let canonical = tokio::task::spawn_blocking(move || std::fs::canonicalize(&path))
            .await
            .map_err(|_| ResolveError::PermissionDenied)?
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ResolveError::NotFound,
                std::io::ErrorKind::PermissionDenied => ResolveError::PermissionDenied,
                _ => ResolveError::NotFound,
            })?;
        let canonical_root = tokio::task::spawn_blocking(move || std::fs::canonicalize(&root))
            .await
            .map_err(|_| ResolveError::PermissionDenied)?
            .map_err(|_| ResolveError::PermissionDenied)?;
        if canonical.starts_with(&canonical_root) {
            Ok(canonical)
        } else {
            Err(ResolveError::EscapesRoot)
        }
    }
}

fn join_virtual(cwd: &str, arg: &str) -> String {
    if cwd.ends_with('/') {
        format!("{}{}", cwd, arg)
    } else {
        format!("{}/{}", cwd, arg)
    }
}

/// Lexically collapses `.`/`..` components, refusing to let `..` climb above `/`.
pub fn normalize_virtual(path: &str) -> Result<String, ResolveError> {
    let mut stack: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => continue,
            ".." => {
                if stack.pop().is_none() {
                    return Err(ResolveError::EscapesRoot);
                }
            }
            other => stack.push(other),
        }
    }
    if stack.is_empty() {
        Ok("/".to_string())
    } else {
        Ok(format!("/{}", stack.join("/")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_dot_dot() {
        assert_eq!(normalize_virtual("/a/b/../c").unwrap(), "/a/c");
        assert_eq!(normalize_virtual("/a/./b").unwrap(), "/a/b");
        assert_eq!(normalize_virtual("/").unwrap(), "/");
    }

    #[test]
    fn normalize_rejects_escape_above_root() {
        assert_eq!(normalize_virtual("/../etc/passwd"), Err(ResolveError::EscapesRoot));
        assert_eq!(normalize_virtual("/a/../../b"), Err(ResolveError::EscapesRoot));
    }

    #[test]
    fn translate_relative_and_absolute() {
        let resolver = PathResolver::new(PathBuf::from("/srv/ftp"));
        let (host, virt) = resolver.translate("/home", "file.txt").unwrap();
        assert_eq!(virt, "/home/file.txt");
        assert_eq!(host, PathBuf::from("/srv/ftp/home/file.txt"));

        let (host, virt) = resolver.translate("/home", "/other/file.txt").unwrap();
        assert_eq!(virt, "/other/file.txt");
        assert_eq!(host, PathBuf::from("/srv/ftp/other/file.txt"));
    }

    #[test]
    fn translate_rejects_dot_dot_escape() {
        let resolver = PathResolver::new(PathBuf::from("/srv/ftp"));
        assert_eq!(resolver.translate("/", "../../etc/passwd").unwrap_err(), ResolveError::EscapesRoot);
    }

    #[test]
    fn rooted_is_the_inverse_of_translate() {
        let resolver = PathResolver::new(PathBuf::from("/srv/ftp"));
        let virt = resolver.rooted(Path::new("/srv/ftp/a/b")).unwrap();
        assert_eq!(virt, "/a/b");
    }
}
