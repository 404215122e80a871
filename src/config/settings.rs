use std::env;
use std::path::Path;

use log::{debug, info, warn};

use crate::config::Config;
use crate::constants::{CONFIG_FILE, CONFIG_FILE_ENV, URL_ENV};
use crate::error::{Result, SliceError};

/// 설정 소스 우선순위
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    /// 명령행 인자
    CommandLine,
    /// 환경 변수
    Environment,
    /// 설정 파일
    File,
    /// 기본값
    Default,
}

impl ConfigSource {
    fn describe(&self) -> &'static str {
        match self {
            ConfigSource::CommandLine => "명령행 인자",
            ConfigSource::Environment => "환경 변수",
            ConfigSource::File => "설정 파일",
            ConfigSource::Default => "기본값",
        }
    }
}

/// 통합 설정 관리자
///
/// 우선순위: 명령행 > 환경 변수 > 설정 파일 > 기본값
#[derive(Clone, Debug)]
pub struct Settings {
    pub config: Config,
    /// 연결 설정 소스
    pub connection_source: ConfigSource,
}

impl Settings {
    /// 설정 파일 + 환경 변수로 설정 생성
    pub fn new() -> Result<Self> {
        let (config, source) = Self::load_config()?;
        let mut settings = Self {
            connection_source: if config.connection.is_configured() {
                source
            } else {
                ConfigSource::Default
            },
            config,
        };
        settings.override_from_env();
        Ok(settings)
    }

    fn load_config() -> Result<(Config, ConfigSource)> {
        // 1. 환경 변수에 지정된 설정 파일
        if let Ok(path) = env::var(CONFIG_FILE_ENV) {
            if Path::new(&path).exists() {
                info!("환경 변수에서 설정 파일 경로 로드: {}", path);
                let config = Config::from_file(&path)
                    .map_err(|e| SliceError::Config(format!("{}: {}", path, e)))?;
                return Ok((config, ConfigSource::Environment));
            }
            warn!("환경 변수에 지정된 설정 파일이 존재하지 않음: {}", path);
        }

        // 2. 현재 디렉토리의 pgslice.yml
        if Path::new(CONFIG_FILE).exists() {
            debug!("설정 파일 로드: {}", CONFIG_FILE);
            let config = Config::from_file(CONFIG_FILE)
                .map_err(|e| SliceError::Config(format!("{}: {}", CONFIG_FILE, e)))?;
            return Ok((config, ConfigSource::File));
        }

        // 3. 기본 설정
        debug!("설정 파일을 찾을 수 없어 기본 설정 사용");
        Ok((Config::default(), ConfigSource::Default))
    }

    /// 환경 변수에서 연결 URL 오버라이드
    pub fn override_from_env(&mut self) {
        if let Ok(url) = env::var(URL_ENV) {
            if !url.is_empty() {
                debug!("환경 변수에서 연결 URL 설정");
                self.config.connection.url = Some(url);
                self.connection_source = ConfigSource::Environment;
            }
        }
    }

    /// 명령행 --url 오버라이드
    pub fn override_url(&mut self, url: Option<String>) {
        if let Some(url) = url {
            self.config.connection.url = Some(url);
            self.connection_source = ConfigSource::CommandLine;
        }
    }

    /// 설정 정보 로그 출력
    pub fn log_settings(&self) {
        debug!("연결 설정 소스: {}", self.connection_source.describe());
        debug!("데이터베이스 연결: {}", self.config.connection.describe());
        debug!(
            "기본값: batch_size={}, lock_timeout={}",
            self.config.defaults.batch_size, self.config.defaults.lock_timeout
        );
    }
}
