//! Retrieval of the paper-list document.
//!
//! The list lives in a git repository. [`sync_repo`] keeps a local checkout
//! current, [`load_readme`] reads the document out of it, and
//! [`source_digest`] fingerprints the text so a build records exactly which
//! revision of the list it was computed from.

use std::path::{Path, PathBuf};
use std::process::Output;

use sha2::{Digest, Sha256};
use tokio::process::Command;
use tracing::{debug, info, instrument};

use paperdash_shared::{PaperDashError, Result};

/// Outcome of [`sync_repo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Cloned,
    Pulled,
}

/// Clone `repo_url` into `dest`, or fast-forward `dest` if it already exists.
#[instrument(skip_all, fields(repo_url = %repo_url, dest = %dest.display()))]
pub async fn sync_repo(repo_url: &str, dest: &Path) -> Result<SyncAction> {
    if dest.exists() {
        info!("updating existing checkout");
        run_git(&["-C", &dest.to_string_lossy(), "pull", "--ff-only"]).await?;
        Ok(SyncAction::Pulled)
    } else {
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PaperDashError::io(parent, e))?;
        }
        info!("cloning repository");
        run_git(&["clone", repo_url, &dest.to_string_lossy()]).await?;
        Ok(SyncAction::Cloned)
    }
}

async fn run_git(args: &[&str]) -> Result<Output> {
    debug!(?args, "running git");
    let output = Command::new("git")
        .args(args)
        .output()
        .await
        .map_err(|e| PaperDashError::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PaperDashError::Git(format!(
            "git {} exited with {}: {}",
            args.join(" "),
            output.status,
            stderr.trim()
        )));
    }
    Ok(output)
}

/// Path of the document inside a checkout.
pub fn readme_path(repo_dir: &Path, readme: &str) -> PathBuf {
    repo_dir.join(readme)
}

/// Read the document as UTF-8 text.
#[instrument(skip_all, fields(repo_dir = %repo_dir.display(), readme = %readme))]
pub fn load_readme(repo_dir: &Path, readme: &str) -> Result<String> {
    let path = readme_path(repo_dir, readme);
    let text = std::fs::read_to_string(&path).map_err(|e| PaperDashError::io(&path, e))?;
    debug!(bytes = text.len(), "loaded document");
    Ok(text)
}

/// Lowercase hex SHA-256 of the document text.
pub fn source_digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("paperdash-{tag}-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[test]
    fn digest_is_sha256_hex() {
        assert_eq!(
            source_digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(source_digest("abc").len(), 64);
    }

    #[test]
    fn digest_changes_with_content() {
        assert_ne!(source_digest("## A\n"), source_digest("## B\n"));
    }

    #[test]
    fn load_readme_reads_named_file() {
        let dir = scratch_dir("readme");
        std::fs::write(dir.join("README.md"), "## Section\n").expect("write readme");

        let text = load_readme(&dir, "README.md").expect("load");
        assert_eq!(text, "## Section\n");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_readme_reports_path() {
        let dir = scratch_dir("missing");
        let err = load_readme(&dir, "NOPE.md").unwrap_err();
        match err {
            PaperDashError::Io { path, .. } => assert!(path.ends_with("NOPE.md")),
            other => panic!("expected Io error, got {other:?}"),
        }
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn clone_of_missing_source_is_git_error() {
        let root = scratch_dir("clone");
        let bogus_source = root.join("does-not-exist");
        let dest = root.join("checkout");

        let err = sync_repo(&bogus_source.to_string_lossy(), &dest)
            .await
            .unwrap_err();
        assert!(matches!(err, PaperDashError::Git(_)));
        assert!(!dest.join("README.md").exists());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn pull_in_non_repository_is_git_error() {
        let dest = scratch_dir("pull");
        let err = sync_repo("https://example.invalid/list.git", &dest)
            .await
            .unwrap_err();
        assert!(matches!(err, PaperDashError::Git(_)));
        let _ = std::fs::remove_dir_all(&dest);
    }
}
