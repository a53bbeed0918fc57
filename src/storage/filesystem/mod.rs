//! A virtual filesystem that jails every client supplied path inside a root directory.

mod listing;
#[cfg(test)]
mod tests;

use super::{Error, ErrorKind, Result};
use futures_util::stream::{BoxStream, StreamExt};
use listing::Fileinfo;
use std::path::{Path, PathBuf};
use tokio_stream::wrappers::ReadDirStream;

/// A lazily produced directory listing, one formatted `ls` line per item.
pub type Listing = BoxStream<'static, Result<String>>;

/// The view a session has on the files it serves.
///
/// Paths given by the client are virtual: `/` is the root directory and `..` never climbs above
/// it. The current working directory is kept relative to the root, without a leading slash.
#[derive(Debug, Clone)]
pub struct Filesystem {
    root: PathBuf,
    cwd: String,
    autocreate_directories: bool,
}

impl Filesystem {
    /// Creates a filesystem rooted at `root` with the working directory at the root.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Filesystem {
            root: root.into(),
            cwd: String::new(),
            autocreate_directories: true,
        }
    }

    /// Whether `chdir` creates missing directories instead of failing.
    pub fn autocreate_directories(mut self, enabled: bool) -> Self {
        self.autocreate_directories = enabled;
        self
    }

    /// The directory all paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Turns a client path into a normalized virtual path relative to the root, without leading
    /// separator. Relative paths are taken from the working directory.
    pub fn relative(&self, path: &str) -> String {
        let path = path.replace('\\', "/");
        let (absolute, path) = match strip_drive(&path) {
            Some(rest) => (true, rest),
            None => (path.starts_with('/'), path.as_str()),
        };

        let mut segments: Vec<&str> = Vec::new();
        if !absolute {
            segments.extend(self.cwd.split('/').filter(|s| !s.is_empty()));
        }
        for segment in path.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                name => segments.push(name),
            }
        }
        segments.join("/")
    }

    /// Resolves a client path to an absolute path inside the root. `None` means the path is not
    /// inside the root and must be refused.
    pub fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = self.relative(path);
        let resolved = if relative.is_empty() { self.root.clone() } else { self.root.join(relative) };
        if resolved.starts_with(&self.root) { Some(resolved) } else { None }
    }

    fn resolve_or_deny(&self, path: &str) -> Result<PathBuf> {
        self.resolve(path).ok_or_else(|| ErrorKind::PermissionDenied.into())
    }

    /// The working directory as shown to the client.
    pub fn pwd(&self) -> String {
        format!("/{}", self.cwd)
    }

    /// Changes the working directory and returns the new [`pwd`](Filesystem::pwd).
    pub async fn chdir(&mut self, path: &str) -> Result<String> {
        let target = self.resolve_or_deny(path)?;
        match tokio::fs::metadata(&target).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(ErrorKind::NoSuchDirectory.into()),
            Err(_) if self.autocreate_directories => {
                self.mkdir(path).await.map_err(|e| Error::new(ErrorKind::NoSuchDirectory, e))?;
            }
            Err(_) => return Err(ErrorKind::NoSuchDirectory.into()),
        }
        self.cwd = self.relative(path);
        Ok(self.pwd())
    }

    /// Creates `path` and every missing parent, outermost first.
    pub async fn mkdir(&self, path: &str) -> Result<()> {
        let relative = self.relative(path);
        let mut dir = self.root.clone();
        for segment in relative.split('/').filter(|s| !s.is_empty()) {
            dir.push(segment);
            if tokio::fs::metadata(&dir).await.is_ok() {
                continue;
            }
            match tokio::fs::create_dir(&dir).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Tells whether anything exists at `path`.
    pub async fn exists(&self, path: &str) -> bool {
        match self.resolve(path) {
            Some(path) => tokio::fs::try_exists(path).await.unwrap_or(false),
            None => false,
        }
    }

    /// Lists a directory. Lines are produced as entries are read; an entry that disappears before
    /// it can be inspected is left out.
    pub async fn list(&self, directory: &str) -> Result<Listing> {
        let dir = self.resolve_or_deny(directory)?;
        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => {}
            _ => return Err(ErrorKind::NoSuchDirectory.into()),
        }
        let entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|_| Error::with_message(ErrorKind::LocalError, "Error reading directory contents"))?;

        let lines = ReadDirStream::new(entries).filter_map(|entry| async move {
            match entry {
                Ok(entry) => {
                    let metadata = tokio::fs::metadata(entry.path()).await.ok()?;
                    let name = entry.file_name().to_string_lossy().into_owned();
                    Some(Ok(Fileinfo::new(name, &metadata).to_string()))
                }
                Err(_) => Some(Err(Error::with_message(ErrorKind::LocalError, "Error reading directory contents"))),
            }
        });
        Ok(lines.boxed())
    }

    /// Opens a regular file for reading.
    pub async fn read_file(&self, path: &str) -> Result<tokio::fs::File> {
        let path = self.resolve_or_deny(path)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(tokio::fs::File::open(&path).await?),
            _ => Err(ErrorKind::NoSuchFile.into()),
        }
    }

    /// Opens a file for writing, creating it or truncating what was there.
    pub async fn write_file(&self, path: &str) -> Result<tokio::fs::File> {
        let path = self.resolve_or_deny(path)?;
        Ok(tokio::fs::File::create(&path).await?)
    }

    /// Removes a file.
    pub async fn unlink(&self, path: &str) -> Result<()> {
        let path = self.resolve_or_deny(path)?;
        Ok(tokio::fs::remove_file(&path).await?)
    }

    /// Renaming is not supported.
    pub async fn rename(&self, from: &str, to: &str) -> Result<()> {
        self.resolve_or_deny(from)?;
        self.resolve_or_deny(to)?;
        Err(Error::with_message(ErrorKind::NotImplemented, "rename not implemented yet"))
    }

    /// The size in bytes of whatever is at `path`.
    pub async fn size(&self, path: &str) -> Result<u64> {
        let path = self.resolve_or_deny(path)?;
        Ok(tokio::fs::metadata(&path).await?.len())
    }
}

// "C:\dir" style paths count as absolute; the drive letter itself has no meaning inside the root.
fn strip_drive(path: &str) -> Option<&str> {
    let mut chars = path.chars();
    match (chars.next(), chars.next()) {
        (Some(c), Some(':')) if c.is_ascii_alphanumeric() || c == '_' => Some(&path[2..]),
        _ => None,
    }
}
