use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::Local;
use log::info;
use tokio::process::Command;

use crate::config::PublishSettings;

/// Bound on the remote push; expiry is reported as a push failure
const PUSH_TIMEOUT_SECS: u64 = 60;

/// Commits the rendered artifact into a local clone and pushes it
///
/// The publish sequence is a chain of independently fallible steps; the
/// first failure short-circuits the rest and leaves earlier effects in
/// place. In particular a failed push keeps the local commit, and the next
/// cycle simply re-attempts the push.
pub struct GitPublisher {
    settings: PublishSettings,
}

impl GitPublisher {
    pub fn new(settings: PublishSettings) -> Self {
        Self { settings }
    }

    /// Run the full publish sequence for a rendered artifact
    pub async fn publish(&self, artifact_path: &Path) -> Result<()> {
        self.validate_target(artifact_path)?;

        self.copy_artifact(artifact_path)?;
        self.stage().await?;

        if self.artifact_changed().await? {
            self.commit().await?;
        } else {
            info!("Artifact unchanged, skipping commit");
        }

        // Runs even without a fresh commit so an earlier failed push gets
        // retried; pushing an already-synced branch is a no-op.
        self.push().await?;

        info!(
            "Published {} to branch {}",
            self.settings.file_path, self.settings.branch
        );
        Ok(())
    }

    /// Check preconditions before touching anything on disk
    fn validate_target(&self, artifact_path: &Path) -> Result<()> {
        if !self.settings.is_configured() {
            bail!("Publish repository path is not configured");
        }

        let repo = &self.settings.repo_path;
        if !repo.is_dir() {
            bail!(
                "Publish repository path {} does not exist or is not a directory",
                repo.display()
            );
        }

        if !artifact_path.is_file() {
            bail!(
                "Rendered artifact {} does not exist",
                artifact_path.display()
            );
        }

        Ok(())
    }

    fn copy_artifact(&self, artifact_path: &Path) -> Result<()> {
        let dest = self.settings.repo_path.join(&self.settings.file_path);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::copy(artifact_path, &dest)
            .with_context(|| format!("Failed to copy artifact to {}", dest.display()))?;
        Ok(())
    }

    async fn stage(&self) -> Result<()> {
        self.git("add", &["add", "--", &self.settings.file_path])
            .await?;
        Ok(())
    }

    /// Whether the staged artifact differs from the last commit
    async fn artifact_changed(&self) -> Result<bool> {
        let status = self
            .git(
                "status",
                &["status", "--porcelain", "--", &self.settings.file_path],
            )
            .await?;
        Ok(!status.trim().is_empty())
    }

    async fn commit(&self) -> Result<()> {
        let message = format!(
            "Update player rankings - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        self.git("commit", &["commit", "-m", &message]).await?;
        Ok(())
    }

    async fn push(&self) -> Result<()> {
        let remote = self.resolve_push_remote().await?;
        let refspec = format!("{0}:{0}", self.settings.branch);

        let push = self.git("push", &["push", &remote, &refspec]);
        match tokio::time::timeout(Duration::from_secs(PUSH_TIMEOUT_SECS), push).await {
            Ok(result) => result.map(|_| ()),
            Err(_) => bail!("git push timed out after {PUSH_TIMEOUT_SECS}s"),
        }
    }

    /// Resolve where to push: the origin URL with the token embedded when
    /// one is configured, otherwise the plain origin remote
    async fn resolve_push_remote(&self) -> Result<String> {
        let Some(token) = self.settings.token.as_deref().filter(|t| !t.is_empty()) else {
            return Ok("origin".to_string());
        };

        let url = self
            .git("remote get-url", &["remote", "get-url", "origin"])
            .await?;
        Ok(inject_token(url.trim(), token))
    }

    async fn git(&self, step: &str, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.settings.repo_path)
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("Failed to run git {step}"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("git {step} failed: {}", self.redact(stderr.trim()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Strip the configured token from text that may end up in logs
    fn redact(&self, text: &str) -> String {
        match self.settings.token.as_deref() {
            Some(token) if !token.is_empty() => text.replace(token, "***"),
            _ => text.to_string(),
        }
    }
}

/// Embed a bearer token into an https remote URL for a single push
///
/// Non-https URLs are returned unchanged. The rewritten URL is only ever
/// passed on the push command line, never stored in the clone's config.
pub fn inject_token(url: &str, token: &str) -> String {
    match url.strip_prefix("https://") {
        Some(rest) => format!("https://{token}@{rest}"),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn artifact_in(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("ranking.md");
        std::fs::write(&path, "# rankings\n").unwrap();
        path
    }

    #[test]
    fn inject_token_rewrites_https_urls() {
        assert_eq!(
            inject_token("https://github.com/owner/repo.git", "t0k3n"),
            "https://t0k3n@github.com/owner/repo.git"
        );
    }

    #[test]
    fn inject_token_leaves_other_schemes_alone() {
        let ssh = "git@github.com:owner/repo.git";
        assert_eq!(inject_token(ssh, "t0k3n"), ssh);
    }

    #[tokio::test]
    async fn unconfigured_repo_path_fails_before_any_mutation() {
        let dir = TempDir::new().unwrap();
        let artifact = artifact_in(&dir);

        let publisher = GitPublisher::new(PublishSettings::default());
        let err = publisher.publish(&artifact).await.unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }

    #[tokio::test]
    async fn missing_repo_directory_fails_before_any_mutation() {
        let dir = TempDir::new().unwrap();
        let artifact = artifact_in(&dir);

        let settings = PublishSettings {
            repo_path: dir.path().join("no-such-repo"),
            ..PublishSettings::default()
        };
        let publisher = GitPublisher::new(settings.clone());

        let err = publisher.publish(&artifact).await.unwrap_err();
        assert!(err.to_string().contains("does not exist"));
        assert!(!settings.repo_path.exists());
    }

    #[tokio::test]
    async fn missing_artifact_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let settings = PublishSettings {
            repo_path: dir.path().to_path_buf(),
            ..PublishSettings::default()
        };

        let publisher = GitPublisher::new(settings);
        let err = publisher
            .publish(&dir.path().join("missing.md"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn copy_creates_intermediate_directories() {
        let repo = TempDir::new().unwrap();
        let staging = TempDir::new().unwrap();
        let artifact = artifact_in(&staging);

        let settings = PublishSettings {
            repo_path: repo.path().to_path_buf(),
            file_path: "docs/stats/ranking.md".to_string(),
            ..PublishSettings::default()
        };
        let publisher = GitPublisher::new(settings);

        publisher.copy_artifact(&artifact).unwrap();
        let dest = repo.path().join("docs/stats/ranking.md");
        assert_eq!(std::fs::read_to_string(dest).unwrap(), "# rankings\n");
    }

    #[test]
    fn redact_strips_the_token_from_messages() {
        let settings = PublishSettings {
            token: Some("sekrit".to_string()),
            ..PublishSettings::default()
        };
        let publisher = GitPublisher::new(settings);

        let redacted = publisher.redact("fatal: https://sekrit@example.com rejected");
        assert!(!redacted.contains("sekrit"));
        assert!(redacted.contains("***"));
    }
}
