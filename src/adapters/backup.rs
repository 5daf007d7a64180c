use crate::domain::ports::BackupSync;
use crate::utils::error::{Result, ScoutError};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Output;
use tokio::process::Command;

/// 以 git add / commit / push 把 ledger 檔同步到遠端
#[derive(Debug, Clone)]
pub struct GitBackup {
    repo_dir: PathBuf,
    files: Vec<String>,
    commit_message: String,
    push: bool,
}

impl GitBackup {
    pub fn new(
        repo_dir: impl Into<PathBuf>,
        files: Vec<String>,
        commit_message: impl Into<String>,
        push: bool,
    ) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            files,
            commit_message: commit_message.into(),
            push,
        }
    }

    async fn git(&self, args: &[&str]) -> Result<Output> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .output()
            .await
            .map_err(|e| ScoutError::BackupError {
                message: format!("failed to run git {}: {}", args.join(" "), e),
            })?;
        Ok(output)
    }

    fn failure(step: &str, output: &Output) -> ScoutError {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let detail = if stderr.trim().is_empty() {
            stdout.trim().to_string()
        } else {
            stderr.trim().to_string()
        };
        ScoutError::BackupError {
            message: format!("git {} failed: {}", step, detail),
        }
    }
}

fn nothing_to_commit(output: &Output) -> bool {
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout.contains("nothing to commit") || stdout.contains("nothing added to commit")
}

#[async_trait]
impl BackupSync for GitBackup {
    async fn sync(&self) -> Result<()> {
        // 尚未建立的 ledger 檔（例如還沒找到可用名稱）不能交給 git add
        let present: Vec<&str> = self
            .files
            .iter()
            .filter(|f| self.repo_dir.join(f.as_str()).is_file())
            .map(String::as_str)
            .collect();
        if present.is_empty() {
            tracing::debug!("Backup: no ledger files yet");
            return Ok(());
        }

        let mut add_args = vec!["add", "--"];
        add_args.extend(present);
        let output = self.git(&add_args).await?;
        if !output.status.success() {
            return Err(Self::failure("add", &output));
        }

        let output = self.git(&["commit", "-m", self.commit_message.as_str()]).await?;
        if !output.status.success() {
            if nothing_to_commit(&output) {
                tracing::debug!("Backup: nothing to commit");
                return Ok(());
            }
            return Err(Self::failure("commit", &output));
        }

        if self.push {
            let output = self.git(&["push"]).await?;
            if !output.status.success() {
                return Err(Self::failure("push", &output));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn run_git(dir: &std::path::Path, args: &[&str]) -> Option<std::process::Output> {
        std::process::Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .ok()
    }

    #[tokio::test]
    async fn test_sync_commits_existing_files_only() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        match run_git(dir, &["init", "-q"]) {
            Some(out) if out.status.success() => {}
            _ => return, // 沒有安裝 git
        }
        run_git(dir, &["config", "user.email", "scout@example.com"]).unwrap();
        run_git(dir, &["config", "user.name", "scout"]).unwrap();
        run_git(dir, &["config", "commit.gpgsign", "false"]).unwrap();
        std::fs::write(dir.join("checked_usernames.txt"), "foo123\n").unwrap();

        let backup = GitBackup::new(
            dir,
            vec![
                "checked_usernames.txt".to_string(),
                "available_usernames.txt".to_string(),
            ],
            "Auto: sync logs and data",
            false,
        );

        backup.sync().await.unwrap();

        let log = run_git(dir, &["log", "--name-only", "--format=%s"]).unwrap();
        let log = String::from_utf8_lossy(&log.stdout);
        assert!(log.contains("Auto: sync logs and data"));
        assert!(log.contains("checked_usernames.txt"));
        assert!(!log.contains("available_usernames.txt"));

        // 沒有新寫入時再同步也不算失敗
        backup.sync().await.unwrap();
    }

    #[tokio::test]
    async fn test_sync_without_ledger_files_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let backup = GitBackup::new(
            temp_dir.path(),
            vec!["checked_usernames.txt".to_string()],
            "Auto: sync logs and data",
            false,
        );
        assert!(backup.sync().await.is_ok());
    }

    #[tokio::test]
    async fn test_sync_outside_repository_fails_softly() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("checked.txt"), "abc12\n").unwrap();

        let backup = GitBackup::new(
            temp_dir.path(),
            vec!["checked.txt".to_string()],
            "Auto: sync logs and data",
            false,
        );

        // 不是 git repo（或沒有安裝 git）都只會回傳 BackupError
        let result = backup.sync().await;
        assert!(matches!(result, Err(ScoutError::BackupError { .. })));
    }
}
