use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::utils::run_quiet;

/// Suffix of the archives downloaded from the grader.
pub const ARCHIVE_SUFFIX: &str = ".signed.zip";
/// Entry holding the graded report inside each archive.
pub const REPORT_ENTRY: &str = "report.html";

/// All `*.signed.zip` files below `root`, sorted and de-duplicated.
pub fn discover(root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = BTreeSet::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|e| Error::Archive {
            path: e.path().unwrap_or(root).to_path_buf(),
            reason: e.to_string(),
        })?;
        let is_archive = entry.file_type().is_file()
            && entry.file_name().to_string_lossy().ends_with(ARCHIVE_SUFFIX);
        if is_archive {
            found.insert(entry.into_path());
        }
    }
    debug!(root = %root.display(), count = found.len(), "discovered archives");
    Ok(found.into_iter().collect())
}

/// Contents of the `report.html` entry of an archive.
pub fn read_report(path: &Path) -> Result<String> {
    let archive_err = |reason: String| Error::Archive {
        path: path.to_path_buf(),
        reason,
    };
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| archive_err(e.to_string()))?;
    let mut entry = zip
        .by_name(REPORT_ENTRY)
        .map_err(|e| archive_err(format!("{REPORT_ENTRY}: {e}")))?;
    let mut text = String::new();
    entry
        .read_to_string(&mut text)
        .map_err(|e| archive_err(format!("{REPORT_ENTRY}: {e}")))?;
    Ok(text)
}

/// Checks archive signatures with an external verifier such as `jarsigner -verify`.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    argv: Vec<String>,
}

impl SignatureVerifier {
    pub fn new(argv: Vec<String>) -> Self {
        SignatureVerifier { argv }
    }

    /// `true` iff the verifier exits successfully. A verifier that cannot be
    /// started counts as unsigned.
    pub fn is_signed(&self, path: &Path) -> bool {
        match run_quiet(&self.argv, &[OsString::from(path)]) {
            Ok(status) => status.success(),
            Err(e) => {
                warn!(verifier = ?self.argv, err = %e, "cannot run signature verifier");
                false
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::write_zip;
    use super::*;

    #[test]
    fn discovers_nested_signed_zips_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("period3");
        std::fs::create_dir(&sub).unwrap();
        write_zip(&sub.join("bob.signed.zip"), &[]);
        write_zip(&dir.path().join("alice.signed.zip"), &[]);
        write_zip(&dir.path().join("carol.zip"), &[]);
        std::fs::write(dir.path().join("alice.md"), "x").unwrap();

        let found = discover(dir.path()).unwrap();
        assert_eq!(
            found,
            vec![dir.path().join("alice.signed.zip"), sub.join("bob.signed.zip")]
        );
    }

    #[test]
    fn reads_report_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.signed.zip");
        write_zip(
            &path,
            &[("META-INF/MANIFEST.MF", "Manifest-Version: 1.0\n"), ("report.html", "<html/>")],
        );
        assert_eq!(read_report(&path).unwrap(), "<html/>");
    }

    #[test]
    fn missing_report_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.signed.zip");
        write_zip(&path, &[("other.txt", "x")]);
        let err = read_report(&path).unwrap_err();
        assert!(matches!(err, Error::Archive { reason, .. } if reason.contains("report.html")));
    }

    #[test]
    fn not_a_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.signed.zip");
        std::fs::write(&path, "plain text").unwrap();
        assert!(matches!(read_report(&path), Err(Error::Archive { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn verifier_exit_status() {
        let p = Path::new("x.signed.zip");
        assert!(SignatureVerifier::new(vec!["true".into()]).is_signed(p));
        assert!(!SignatureVerifier::new(vec!["false".into()]).is_signed(p));
        assert!(!SignatureVerifier::new(vec!["/nonexistent/jarsigner".into()]).is_signed(p));
    }
}
