use crate::domain::model::AuthorityVerdict;
use crate::utils::error::{CheckFailure, Result};
use async_trait::async_trait;

/// 外部驗證端點。只關心三分類結果，不關心傳輸細節。
#[async_trait]
pub trait AvailabilityAuthority: Send + Sync {
    async fn validate(&self, identifier: &str) -> std::result::Result<AuthorityVerdict, CheckFailure>;
}

/// 逐行 append-only 的持久化儲存
pub trait LogStorage: Send + Sync {
    /// 讀取全部非空行；檔案不存在時回傳空集合
    fn read_lines(&self, name: &str) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;

    /// 寫入一行並 flush 到磁碟後才返回
    fn append_line(
        &self,
        name: &str,
        line: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 遠端備份（best-effort）
#[async_trait]
pub trait BackupSync: Send + Sync {
    async fn sync(&self) -> Result<()>;
}
