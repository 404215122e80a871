use deadpool_postgres::{Object, Pool, Runtime};
use log::{debug, info};
use tokio_postgres::NoTls;

use super::config::ConnectionConfig;
use crate::error::{Result, SliceError};

/// 단일 연결 풀 생성
pub fn create_db_pool(config: &ConnectionConfig) -> Result<Pool> {
    if !config.is_configured() {
        return Err(SliceError::Config(
            "Set PGSLICE_URL, pass --url, or add a connection section to pgslice.yml".to_string(),
        ));
    }
    debug!("DB 연결 풀 생성 중... ({})", config.describe());
    Ok(config.to_pool_config().create_pool(Some(Runtime::Tokio1), NoTls)?)
}

/// 풀에서 연결 하나를 가져오고 연결을 확인
pub async fn get_client(config: &ConnectionConfig) -> Result<Object> {
    let pool = create_db_pool(config)?;
    let client = pool.get().await?;

    let row = client.query_one("SELECT version()", &[]).await?;
    let version: String = row.try_get(0)?;
    info!("DB 연결 성공: {}", version);

    Ok(client)
}
