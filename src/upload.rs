use std::fs;
use std::io;
use std::path::PathBuf;

use uuid::Uuid;

/// Storage strategy for uploaded files: persist the bytes, return a stable
/// path that can be stored on a record and served back to clients.
pub trait FileStore: Send + Sync {
    fn store(&self, original_name: &str, bytes: &[u8]) -> io::Result<String>;
}

/// Stores uploads on the local disk under a single directory, prefixing each
/// file with a UUID so names never collide.
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }
}

impl FileStore for DiskStore {
    fn store(&self, original_name: &str, bytes: &[u8]) -> io::Result<String> {
        let filename = format!("{}-{}", Uuid::new_v4(), sanitize_filename(original_name));
        fs::write(self.root.join(&filename), bytes)?;
        Ok(format!("uploads/{filename}"))
    }
}

/// Strips anything that could escape the upload directory or break a URL.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches(['_', '.']).is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> DiskStore {
        let dir = std::env::temp_dir().join(format!("pharmastore-test-{}", Uuid::new_v4()));
        DiskStore::new(dir).unwrap()
    }

    #[test]
    fn stores_bytes_and_returns_uploads_path() {
        let store = temp_store();
        let path = store.store("rx-scan.png", b"fake image").unwrap();
        assert!(path.starts_with("uploads/"));
        assert!(path.ends_with("-rx-scan.png"));

        let on_disk = store.root.join(path.strip_prefix("uploads/").unwrap());
        assert_eq!(fs::read(on_disk).unwrap(), b"fake image");
    }

    #[test]
    fn names_are_unique_per_upload() {
        let store = temp_store();
        let a = store.store("scan.png", b"a").unwrap();
        let b = store.store("scan.png", b"b").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn sanitizes_hostile_names() {
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename("my scan (1).png"), "my_scan__1_.png");
        assert_eq!(sanitize_filename("///"), "file");
    }
}
