use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 데이터베이스 연결 설정
///
/// `url` 이 있으면 나머지 항목보다 우선한다.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_seconds: u64,
}

fn default_connection_timeout() -> u64 {
    30
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: None,
            port: None,
            database: None,
            user: None,
            password: None,
            connection_timeout_seconds: default_connection_timeout(),
        }
    }
}

impl ConnectionConfig {
    /// 연결 정보가 하나라도 있는지
    pub fn is_configured(&self) -> bool {
        self.url.is_some() || self.host.is_some() || self.database.is_some()
    }

    /// 연결 제한 시간
    pub fn get_connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_seconds)
    }

    /// 로그용 연결 대상 (비밀번호 제외)
    pub fn describe(&self) -> String {
        match &self.url {
            Some(url) => match url.rsplit_once('@') {
                Some((_, target)) => target.to_string(),
                None => url.clone(),
            },
            None => format!(
                "{}:{}/{}",
                self.host.as_deref().unwrap_or("localhost"),
                self.port.unwrap_or(5432),
                self.database.as_deref().unwrap_or("")
            ),
        }
    }

    /// deadpool-postgres 설정 생성 (단일 연결)
    pub fn to_pool_config(&self) -> deadpool_postgres::Config {
        let mut cfg = deadpool_postgres::Config::new();
        cfg.url = self.url.clone();
        cfg.host = self.host.clone();
        cfg.port = self.port;
        cfg.dbname = self.database.clone();
        cfg.user = self.user.clone();
        cfg.password = self.password.clone();
        cfg.connect_timeout = Some(self.get_connection_timeout());
        cfg.pool = Some(deadpool_postgres::PoolConfig::new(1));
        cfg
    }
}
