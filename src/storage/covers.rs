//! Cover images stored next to each other as `<track id><ext>`

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::storage::error::StorageError;

/// Checked in this order; the first existing file is the track's cover.
pub const COVER_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".webp", ".PNG", ".JPG", ".JPEG", ".WEBP",
];

/// Public URL prefix the covers directory is served under
pub const COVERS_URL_PREFIX: &str = "/covers";

/// Returns the cover extension of an uploaded file name, dot included.
pub fn cover_extension(filename: &str) -> Option<&'static str> {
    let ext = Path::new(filename).extension()?.to_str()?;
    COVER_EXTENSIONS
        .iter()
        .copied()
        .find(|candidate| candidate[1..] == *ext)
}

pub fn public_url(filename: &str) -> String {
    format!("{COVERS_URL_PREFIX}/{filename}")
}

/// An uploaded image, as received from the admin form.
#[derive(Debug, Clone)]
pub struct CoverUpload {
    pub filename: String,
    pub data: Vec<u8>,
}

impl CoverUpload {
    /// browsers send an empty file part when nothing was picked
    pub fn is_empty(&self) -> bool {
        self.filename.is_empty() || self.data.is_empty()
    }
}

pub struct CoverDir {
    dir: PathBuf,
}

impl CoverDir {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn candidates<'a>(&'a self, id: &'a str) -> impl Iterator<Item = (String, PathBuf)> + 'a {
        COVER_EXTENSIONS.iter().map(move |ext| {
            let name = format!("{id}{ext}");
            let path = self.dir.join(&name);
            (name, path)
        })
    }

    /// File name of the cover for `id`, if any.
    pub fn find(&self, id: &str) -> Option<String> {
        self.candidates(id)
            .find(|(_, path)| path.is_file())
            .map(|(name, _)| name)
    }

    /// Absolute path of a file inside the covers dir, refusing anything that
    /// would escape it or is not a cover image.
    pub fn file_path(&self, filename: &str) -> Option<PathBuf> {
        if filename.contains(['/', '\\']) || filename.starts_with('.') {
            return None;
        }
        cover_extension(filename)?;
        let path = self.dir.join(filename);
        path.is_file().then_some(path)
    }

    /// Writes the upload as the cover of `id`.
    ///
    /// Returns `None` without touching the disk when the extension is not a
    /// supported image type.
    pub fn store(&self, id: &str, upload: &CoverUpload) -> Result<Option<String>, StorageError> {
        let Some(ext) = cover_extension(&upload.filename) else {
            log::warn!(
                "ignoring cover upload {:?} for track {id}: unsupported format",
                upload.filename
            );
            return Ok(None);
        };

        fs::create_dir_all(&self.dir)?;
        let name = format!("{id}{ext}");
        fs::write(self.dir.join(&name), &upload.data)?;
        log::info!("stored cover {name} ({} bytes)", upload.data.len());
        Ok(Some(name))
    }

    /// Moves the cover of `old_id` to `new_id`, keeping its extension.
    pub fn rename(&self, old_id: &str, new_id: &str) -> Result<Option<String>, StorageError> {
        let Some(old_name) = self.find(old_id) else {
            return Ok(None);
        };
        let ext = &old_name[old_id.len()..];
        let new_name = format!("{new_id}{ext}");

        fs::rename(self.dir.join(&old_name), self.dir.join(&new_name))?;
        log::info!("renamed cover {old_name} -> {new_name}");
        Ok(Some(new_name))
    }

    /// Removes every cover file of `id`, whatever its extension.
    pub fn remove_all(&self, id: &str) -> Result<usize, StorageError> {
        let mut removed = 0;
        for (name, path) in self.candidates(id) {
            if path.is_file() {
                fs::remove_file(&path)?;
                log::debug!("removed cover {name}");
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Removes the cover `find` would return.
    pub fn remove_first(&self, id: &str) -> Result<Option<String>, StorageError> {
        let Some(name) = self.find(id) else {
            return Ok(None);
        };
        fs::remove_file(self.dir.join(&name))?;
        log::info!("removed cover {name}");
        Ok(Some(name))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn upload(filename: &str) -> CoverUpload {
        CoverUpload {
            filename: filename.to_string(),
            data: b"image bytes".to_vec(),
        }
    }

    #[test]
    fn find_prefers_extension_list_order() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("abc.jpg"), b"jpg").unwrap();
        fs::write(tmp.path().join("abc.png"), b"png").unwrap();

        let covers = CoverDir::new(tmp.path());

        assert_eq!(covers.find("abc"), Some("abc.png".to_string()));
    }

    #[test]
    fn find_matches_upper_case_extensions() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("loud.WEBP"), b"x").unwrap();

        assert_eq!(
            CoverDir::new(tmp.path()).find("loud"),
            Some("loud.WEBP".to_string())
        );
    }

    #[test]
    fn find_ignores_directories_and_other_files() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("abc.png")).unwrap();
        fs::write(tmp.path().join("abc.gif"), b"gif").unwrap();

        assert_eq!(CoverDir::new(tmp.path()).find("abc"), None);
    }

    #[test]
    fn find_in_missing_dir_is_none() {
        let tmp = TempDir::new().unwrap();
        let covers = CoverDir::new(tmp.path().join("nope"));

        assert_eq!(covers.find("abc"), None);
    }

    #[test]
    fn store_accepts_only_known_extensions() {
        let tmp = TempDir::new().unwrap();
        let covers = CoverDir::new(tmp.path().join("covers"));

        assert_eq!(
            covers.store("t", &upload("photo.JPEG")).unwrap(),
            Some("t.JPEG".to_string())
        );
        assert!(tmp.path().join("covers/t.JPEG").is_file());

        assert_eq!(covers.store("u", &upload("anim.gif")).unwrap(), None);
        assert_eq!(covers.store("u", &upload("no_extension")).unwrap(), None);
        assert_eq!(covers.store("u", &upload("mixed.Png")).unwrap(), None);
        assert_eq!(covers.find("u"), None);
    }

    #[test]
    fn rename_keeps_extension() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.jpg"), b"x").unwrap();
        let covers = CoverDir::new(tmp.path());

        let renamed = covers.rename("a", "b").unwrap();

        assert_eq!(renamed, Some("b.jpg".to_string()));
        assert!(tmp.path().join("b.jpg").is_file());
        assert!(!tmp.path().join("a.jpg").exists());
    }

    #[test]
    fn rename_without_cover_is_noop() {
        let tmp = TempDir::new().unwrap();
        let covers = CoverDir::new(tmp.path());

        assert_eq!(covers.rename("a", "b").unwrap(), None);
    }

    #[test]
    fn remove_first_leaves_other_extensions() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("abc.png"), b"x").unwrap();
        fs::write(tmp.path().join("abc.webp"), b"x").unwrap();
        let covers = CoverDir::new(tmp.path());

        assert_eq!(covers.remove_first("abc").unwrap(), Some("abc.png".into()));
        assert_eq!(covers.find("abc"), Some("abc.webp".to_string()));
    }

    #[test]
    fn remove_all_clears_every_extension() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("abc.png"), b"x").unwrap();
        fs::write(tmp.path().join("abc.JPG"), b"x").unwrap();
        fs::write(tmp.path().join("abcd.png"), b"x").unwrap();
        let covers = CoverDir::new(tmp.path());

        assert_eq!(covers.remove_all("abc").unwrap(), 2);
        assert_eq!(covers.find("abc"), None);
        assert_eq!(covers.find("abcd"), Some("abcd.png".to_string()));
    }

    #[test]
    fn file_path_rejects_traversal() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("abc.png"), b"x").unwrap();
        let covers = CoverDir::new(tmp.path());

        assert!(covers.file_path("abc.png").is_some());
        assert!(covers.file_path("../abc.png").is_none());
        assert!(covers.file_path("abc.txt").is_none());
        assert!(covers.file_path("missing.png").is_none());
    }

    #[test]
    fn public_url_uses_covers_prefix() {
        assert_eq!(public_url("abc.png"), "/covers/abc.png");
    }
}
