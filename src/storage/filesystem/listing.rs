//! Formats directory entries the way `ls -l` does.

use chrono::{DateTime, Local};
use std::fmt::{self, Formatter, Write};
use std::fs::Metadata;
use std::time::SystemTime;

const PERM_DIR: u32 = 0o040000;

// Tested bit by bit, in the order the characters appear.
const PERMISSION_BITS: [(u32, char); 10] = [
    (PERM_DIR, 'd'),
    (0o400, 'r'),
    (0o200, 'w'),
    (0o100, 'x'),
    (0o040, 'r'),
    (0o020, 'w'),
    (0o010, 'x'),
    (0o004, 'r'),
    (0o002, 'w'),
    (0o001, 'x'),
];

/// The mode bits of a file, displayed as the 10 character permission column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Permissions(pub u32);

impl Permissions {
    pub(crate) fn from_metadata(metadata: &Metadata) -> Self {
        cfg_if::cfg_if! {
            if #[cfg(unix)] {
                use std::os::unix::fs::MetadataExt;
                Permissions(metadata.mode())
            } else {
                let mut mode = if metadata.permissions().readonly() { 0o444 } else { 0o644 };
                if metadata.is_dir() {
                    mode |= PERM_DIR | 0o111;
                }
                Permissions(mode)
            }
        }
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (bit, c) in PERMISSION_BITS {
            f.write_char(if self.0 & bit > 0 { c } else { '-' })?;
        }
        Ok(())
    }
}

/// One line of a `LIST` response.
#[derive(Debug, Clone)]
pub(crate) struct Fileinfo {
    pub name: String,
    pub permissions: Permissions,
    pub size: u64,
    pub modified: SystemTime,
}

impl Fileinfo {
    pub(crate) fn new(name: impl Into<String>, metadata: &Metadata) -> Self {
        Fileinfo {
            name: name.into(),
            permissions: Permissions::from_metadata(metadata),
            size: metadata.len(),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        }
    }
}

impl fmt::Display for Fileinfo {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        // %e pads the day of the month with a space, e.g. "Jan  9 14:03"
        let modified = DateTime::<Local>::from(self.modified).format("%b %e %H:%M");
        write!(
            f,
            "{permissions}    1 ftp      ftp      {size:>8} {modified} {name}\r\n",
            permissions = self.permissions,
            size = self.size,
            modified = modified,
            name = self.name,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn directory_permissions() {
        assert_eq!(Permissions(0o040755).to_string(), "drwxr-xr-x");
    }

    #[test]
    fn file_permissions() {
        assert_eq!(Permissions(0o100640).to_string(), "-rw-r-----");
        assert_eq!(Permissions(0o100007).to_string(), "-------rwx");
    }

    #[test]
    fn formats_an_ls_line() {
        let modified = Local.with_ymd_and_hms(2012, 1, 9, 14, 3, 0).single().unwrap();
        let info = Fileinfo {
            name: "notes.txt".to_string(),
            permissions: Permissions(0o100644),
            size: 1234,
            modified: modified.into(),
        };
        assert_eq!(info.to_string(), "-rw-r--r--    1 ftp      ftp          1234 Jan  9 14:03 notes.txt\r\n");
    }

    #[test]
    fn large_sizes_are_not_truncated() {
        let info = Fileinfo {
            name: "big".to_string(),
            permissions: Permissions(0o100644),
            size: 123_456_789_012,
            modified: SystemTime::UNIX_EPOCH,
        };
        assert!(info.to_string().contains(" 123456789012 "));
    }
}
