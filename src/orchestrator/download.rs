//! 单局下载 - 编排层
//!
//! 登录、打开一局回放、把对局日志写到 `{out_dir}/{table_id}.json`，不调用内部 API

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::DriverFactory;
use crate::services::{LogExtractor, Session, SessionManager};

/// 下载单局对局日志，返回写入的文件路径
pub async fn download_table<F: DriverFactory>(
    config: &Config,
    factory: &F,
    table_id: &str,
    out_dir: &Path,
) -> AppResult<PathBuf> {
    let driver = factory.acquire().await?;
    let mut session = Session::new(driver);

    let result = fetch_and_save(config, &mut session, table_id, out_dir).await;
    session.release().await;
    result
}

async fn fetch_and_save<D: crate::infrastructure::SiteDriver>(
    config: &Config,
    session: &mut Session<D>,
    table_id: &str,
    out_dir: &Path,
) -> AppResult<PathBuf> {
    let sessions = SessionManager::new(config);
    sessions.authenticate(session, &config.credentials).await?;

    info!("🌐 正在打开对局 {} ...", table_id);
    let page = sessions.navigate_to_table(session, table_id).await?;
    let move_log = LogExtractor::new().extract(&page.content, table_id)?;

    fs::create_dir_all(out_dir).map_err(|e| AppError::file(out_dir.display().to_string(), e))?;
    let path = out_dir.join(format!("{}.json", table_id));
    fs::write(&path, move_log.as_str())
        .map_err(|e| AppError::file(path.display().to_string(), e))?;

    info!("✓ 对局日志已保存至: {} ({} 字节)", path.display(), move_log.len());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;
    use crate::testing::{events, page_for, snapshot, test_config, DriverScript, FakeFactory};

    fn out_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "generate_problem_{}_{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[tokio::test]
    async fn test_writes_raw_log_to_table_file() {
        let events = events();
        let blob = "{\n  \"data\": [1, 2]\n}";
        let factory = FakeFactory::new(
            DriverScript::default().with_table("447137094", page_for(blob)),
            events.clone(),
        );
        let dir = out_dir("download_ok");

        let path = download_table(&test_config(), &factory, "447137094", &dir)
            .await
            .unwrap();

        assert_eq!(path, dir.join("447137094.json"));
        assert_eq!(fs::read_to_string(&path).unwrap(), blob);
        assert_eq!(snapshot(&events).last().map(String::as_str), Some("close"));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_missing_log_writes_nothing_and_releases() {
        let events = events();
        let factory = FakeFactory::new(
            DriverScript::default().with_table("1", "<html></html>".to_string()),
            events.clone(),
        );
        let dir = out_dir("download_missing");

        let err = download_table(&test_config(), &factory, "1", &dir)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Extraction(ExtractionError::MarkerNotFound { .. })
        ));
        assert!(!dir.exists());
        assert_eq!(snapshot(&events).last().map(String::as_str), Some("close"));
    }
}
