// SQL 쿼리 및 기본값 상수 모듈
pub mod catalog;

/// 스키마가 생략된 테이블의 기본 스키마
pub const DEFAULT_SCHEMA: &str = "public";

// 파생 테이블/함수 이름 접미사
pub const INTERMEDIATE_SUFFIX: &str = "_intermediate";
pub const RETIRED_SUFFIX: &str = "_retired";
pub const TRIGGER_SUFFIX: &str = "_insert_trigger";
pub const VIEW_TRIGGER_SUFFIX: &str = "_view_trigger";

/// 뷰에 설치되는 INSTEAD OF 트리거 이름
pub const VIEW_TRIGGER_NAME: &str = "partition_trigger";

// fill 기본값
pub const DEFAULT_BATCH_SIZE: i64 = 10000;
pub const VIEW_REPLICATION_LIMIT: i64 = 10000;

// swap 잠금 대기 한도
pub const DEFAULT_LOCK_TIMEOUT: &str = "5s";

/// 키 범위 배치 복사가 가능한 기본 키 타입
pub const NUMERIC_KEY_TYPES: [&str; 4] = ["smallint", "integer", "bigint", "numeric"];

// 설정 파일
pub const CONFIG_FILE: &str = "pgslice.yml";
pub const CONFIG_FILE_ENV: &str = "PGSLICE_CONFIG_FILE";
pub const URL_ENV: &str = "PGSLICE_URL";
