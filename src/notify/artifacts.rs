use std::path::{Path, PathBuf};

use super::decision::ArtifactPresence;

/// The editable markdown and its exported HTML for one report archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub intermediate: PathBuf,
    pub rendered: PathBuf,
}

impl ArtifactPaths {
    /// `dir/alice.signed.zip` → `dir/alice.md` + `dir/alice.html`.
    pub fn for_archive(archive: &Path) -> Self {
        let stem = strip_extensions(archive);
        ArtifactPaths {
            intermediate: append_extension(&stem, "md"),
            rendered: append_extension(&stem, "html"),
        }
    }

    pub fn presence(&self) -> ArtifactPresence {
        ArtifactPresence {
            intermediate_exists: self.intermediate.is_file(),
            rendered_exists: self.rendered.is_file(),
        }
    }
}

/// Drop the last two extensions (`.signed.zip`), keeping the directory.
fn strip_extensions(path: &Path) -> PathBuf {
    let mut stem = path.to_path_buf();
    for _ in 0..2 {
        if let Some(s) = stem.file_stem().map(|s| s.to_os_string()) {
            stem.set_file_name(s);
        }
    }
    stem
}

fn append_extension(stem: &Path, ext: &str) -> PathBuf {
    let mut name = stem.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(ext);
    stem.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_zip_names() {
        let p = ArtifactPaths::for_archive(Path::new("data/ch05/alice.signed.zip"));
        assert_eq!(p.intermediate, PathBuf::from("data/ch05/alice.md"));
        assert_eq!(p.rendered, PathBuf::from("data/ch05/alice.html"));
    }

    #[test]
    fn inner_dots_kept() {
        let p = ArtifactPaths::for_archive(Path::new("dana.v2.signed.zip"));
        assert_eq!(p.rendered, PathBuf::from("dana.v2.html"));
    }

    #[test]
    fn single_extension() {
        let p = ArtifactPaths::for_archive(Path::new("bob.zip"));
        assert_eq!(p.intermediate, PathBuf::from("bob.md"));
    }

    #[test]
    fn presence_reflects_disk() {
        let dir = tempfile::tempdir().unwrap();
        let p = ArtifactPaths::for_archive(&dir.path().join("carol.signed.zip"));
        assert_eq!(p.presence(), ArtifactPresence::default());

        std::fs::write(&p.intermediate, "x").unwrap();
        let presence = p.presence();
        assert!(presence.intermediate_exists);
        assert!(!presence.rendered_exists);
    }
}
