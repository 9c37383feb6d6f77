use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use uuid::Uuid;

/// Storage namespace holding uploaded job attachments.
pub const ATTACHMENTS_NAMESPACE: &str = "job-attachments";

/// Result of persisting an upload: the object key and its resolvable URL.
#[derive(Debug, Serialize)]
pub struct StoredAttachment {
    pub path: String,
    pub public_url: String,
}

/// Filesystem-backed object store for the `job-attachments` namespace.
///
/// Keys are `<job_id>/<uuid>-<original file name>`, so an object is unique per
/// upload and an existing key is never overwritten.
pub struct AttachmentStore {
    root: PathBuf,
    public_base_url: String,
}

impl AttachmentStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        AttachmentStore {
            root: root.into().join(ATTACHMENTS_NAMESPACE),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build a fresh object key for an upload against a job.
    pub fn object_key(job_id: Uuid, file_name: &str) -> String {
        format!(
            "{}/{}-{}",
            job_id,
            Uuid::new_v4(),
            sanitize_file_name(file_name)
        )
    }

    /// Destination path for a key, with its directory created.
    ///
    /// The caller persists the upload with a no-clobber rename, so a key that
    /// somehow already exists fails instead of replacing the object.
    pub fn prepare(&self, key: &str) -> io::Result<PathBuf> {
        let dest = self.root.join(key);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(dest)
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, ATTACHMENTS_NAMESPACE, key)
    }
}

/// Reduce an uploaded file name to a safe final path component.
pub fn sanitize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '/' | '\\') {
                '_'
            } else {
                c
            }
        })
        .collect();
    if cleaned.is_empty() {
        "attachment".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_keys_are_namespaced_by_job_and_unique() {
        let job_id = Uuid::new_v4();
        let a = AttachmentStore::object_key(job_id, "invoice.pdf");
        let b = AttachmentStore::object_key(job_id, "invoice.pdf");

        assert!(a.starts_with(&format!("{}/", job_id)));
        assert!(a.ends_with("-invoice.pdf"));
        assert_ne!(a, b);
    }

    #[test]
    fn file_names_are_reduced_to_a_final_component() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("photo front.jpg"), "photo front.jpg");
        assert_eq!(sanitize_file_name(""), "attachment");
        assert_eq!(sanitize_file_name("a\u{0000}b"), "a_b");
    }

    #[test]
    fn public_url_joins_base_namespace_and_key() {
        let store = AttachmentStore::new("/tmp/objects", "https://cdn.example.com/");
        assert_eq!(
            store.public_url("j1/k1-file.png"),
            "https://cdn.example.com/job-attachments/j1/k1-file.png"
        );
    }

    #[test]
    fn prepare_creates_the_parent_directory() {
        let dir = std::env::temp_dir().join(format!("attach-test-{}", Uuid::new_v4()));
        let store = AttachmentStore::new(&dir, "http://localhost:8080");

        let dest = store.prepare("job-1/key-file.txt").unwrap();
        assert!(dest.parent().unwrap().is_dir());
        assert!(!dest.exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
