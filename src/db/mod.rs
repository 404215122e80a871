// 데이터베이스 모듈
// 연결 설정, 단일 연결 풀, 카탈로그 조회 및 문장 실행을 담당합니다.

pub mod catalog;
pub mod config;
pub mod pool;
pub mod query;

pub use query::PgDatabase;
