use thiserror::Error;
use tokio_postgres::error::SqlState;

/// pgslice 작업 에러
#[derive(Debug, Error)]
pub enum SliceError {
    /// 저장된 파티션 설정이 없음
    #[error("No settings found: {table}{hint}")]
    NotConfigured { table: String, hint: String },

    /// 숫자가 아닌 기본 키
    #[error("Only numeric primary keys are supported: {table}.{column} is {data_type}")]
    UnsupportedKeyType {
        table: String,
        column: String,
        data_type: String,
    },

    /// 테이블/뷰 존재 조건 불일치
    #[error("{0}")]
    PreconditionFailed(String),

    /// 잠금 획득 시간 초과
    #[error("Lock timeout ({timeout}) exceeded; no changes were applied, safe to retry")]
    LockTimeout { timeout: String },

    /// 날짜로 해석되지 않는 파티션 이름
    #[error("Malformed partition name: {0}")]
    MalformedPartitionName(String),

    /// 잘못된 인자
    #[error("{0}")]
    Usage(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, SliceError>;

impl From<deadpool_postgres::PoolError> for SliceError {
    fn from(e: deadpool_postgres::PoolError) -> Self {
        SliceError::Pool(e.to_string())
    }
}

impl From<deadpool_postgres::CreatePoolError> for SliceError {
    fn from(e: deadpool_postgres::CreatePoolError) -> Self {
        SliceError::Pool(e.to_string())
    }
}

/// 테이블 존재 조건 실패 헬퍼
pub fn precondition_err<S: Into<String>>(message: S) -> SliceError {
    SliceError::PreconditionFailed(message.into())
}

/// 잠금 시간 초과는 LockTimeout 으로, 나머지는 Database 로 변환
pub fn map_lock_timeout(e: tokio_postgres::Error, timeout: Option<&str>) -> SliceError {
    match (e.code(), timeout) {
        (Some(code), Some(timeout)) if *code == SqlState::LOCK_NOT_AVAILABLE => {
            SliceError::LockTimeout {
                timeout: timeout.to_string(),
            }
        }
        _ => SliceError::Database(e),
    }
}
