use crate::domain::ports::LogStorage;
use crate::utils::error::{Result, ScoutError};
use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// 本機目錄下的純文字 ledger 檔，一行一個名稱
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn full_path(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }
}

impl LogStorage for LocalStorage {
    async fn read_lines(&self, name: &str) -> Result<Vec<String>> {
        let full_path = self.full_path(name);
        if !full_path.exists() {
            tracing::debug!("{} does not exist yet, treating as empty", full_path.display());
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&full_path).map_err(|source| ScoutError::LedgerError {
            path: full_path.clone(),
            source,
        })?;

        Ok(content
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    async fn append_line(&self, name: &str, line: &str) -> Result<()> {
        let full_path = self.full_path(name);
        let ledger_error = |source| ScoutError::LedgerError {
            path: full_path.clone(),
            source,
        };

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(ledger_error)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&full_path)
            .map_err(ledger_error)?;

        // 上次中斷留下沒有換行的殘行時，先補上換行，避免與新名稱黏在一起
        let mut record = String::with_capacity(line.len() + 2);
        if !ends_with_newline(&mut file).map_err(ledger_error)? {
            record.push('\n');
        }
        record.push_str(line);
        record.push('\n');

        file.write_all(record.as_bytes()).map_err(ledger_error)?;
        // 返回前確保落盤
        file.sync_data().map_err(ledger_error)?;

        Ok(())
    }
}

/// 空檔案視為以換行結尾
fn ends_with_newline(file: &mut fs::File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
