use std::fs;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BATCH_SIZE, DEFAULT_LOCK_TIMEOUT};
use crate::db::config::ConnectionConfig;
use crate::error::{Result, SliceError};

pub mod settings;

/// pgslice.yml 전체 구조
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub defaults: Defaults,
}

/// 명령 옵션 기본값
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,
    #[serde(default = "default_lock_timeout")]
    pub lock_timeout: String,
    /// fill 배치 간 대기 (예: "500ms", "2s")
    #[serde(default)]
    pub sleep: Option<String>,
}

fn default_batch_size() -> i64 {
    DEFAULT_BATCH_SIZE
}

fn default_lock_timeout() -> String {
    DEFAULT_LOCK_TIMEOUT.to_string()
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            lock_timeout: default_lock_timeout(),
            sleep: None,
        }
    }
}

impl Config {
    /// 설정 파일에서 Config 인스턴스 로드
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        Ok(config)
    }
}

/// 배치 간 대기 시간 해석. 단위가 없으면 초
pub fn parse_sleep(value: &str) -> Result<Duration> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<f64>() {
        if seconds.is_finite() && seconds >= 0.0 {
            return Ok(Duration::from_secs_f64(seconds));
        }
    }
    humantime::parse_duration(value)
        .map_err(|e| SliceError::Usage(format!("Invalid sleep duration {:?}: {}", value, e)))
}

/// 잠금 대기 한도 검증. 문자열은 그대로 서버에 전달된다
pub fn parse_lock_timeout(value: &str) -> Result<String> {
    let value = value.trim();
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(value.to_string());
    }
    humantime::parse_duration(value)
        .map(|_| value.to_string())
        .map_err(|e| SliceError::Usage(format!("Invalid lock timeout {:?}: {}", value, e)))
}
