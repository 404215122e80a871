use async_trait::async_trait;

use super::fill::{FillBatch, PeriodWindow, ViewReplication};
use super::naming::Table;
use super::settings::{ColumnCast, PartitionSettings};
use crate::error::Result;

/// 컬럼에 소유된 시퀀스
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub schema: String,
    pub name: String,
    pub column: String,
}

/// 카탈로그 조회 인터페이스
///
/// 매 호출마다 현재 상태의 스냅샷을 돌려준다. 엔진은 결과를 캐시하지 않는다.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn table_exists(&self, table: &Table) -> Result<bool>;

    async fn view_exists(&self, table: &Table) -> Result<bool>;

    /// 자식 테이블 목록 (선언적 파티션 또는 상속 자식)
    async fn partitions(&self, table: &Table) -> Result<Vec<Table>>;

    async fn primary_key(&self, table: &Table) -> Result<Vec<String>>;

    /// 기본 키를 제외한 인덱스 정의 (pg_get_indexdef 형식)
    async fn index_defs(&self, table: &Table) -> Result<Vec<String>>;

    /// 외래 키 정의 (pg_get_constraintdef 형식)
    async fn foreign_keys(&self, table: &Table) -> Result<Vec<String>>;

    async fn sequences(&self, table: &Table) -> Result<Vec<Sequence>>;

    async fn columns(&self, table: &Table) -> Result<Vec<String>>;

    /// format_type() 기준 컬럼 타입, 컬럼이 없으면 `None`
    async fn column_type(&self, table: &Table, column: &str) -> Result<Option<String>>;

    /// 라우팅 컬럼의 경계 리터럴 형식
    async fn column_cast(&self, table: &Table, column: &str) -> Result<Option<ColumnCast>> {
        Ok(self
            .column_type(table, column)
            .await?
            .map(|data_type| ColumnCast::from_data_type(&data_type)))
    }

    /// 최대 키, 행이 없으면 0
    async fn max_id(
        &self,
        table: &Table,
        primary_key: &str,
        filter: Option<&str>,
        below: Option<i64>,
    ) -> Result<i64>;

    /// 기간 창과 필터 안의 최소 키
    async fn min_id(
        &self,
        table: &Table,
        primary_key: &str,
        window: Option<&PeriodWindow>,
        filter: Option<&str>,
    ) -> Result<Option<i64>>;

    /// 저장된 파티션 설정, 없으면 `None`
    async fn fetch_settings(
        &self,
        table: &Table,
        trigger_name: &str,
    ) -> Result<Option<PartitionSettings>>;

    async fn server_version_num(&self) -> Result<i32>;
}

/// 문장 실행 인터페이스
#[async_trait]
pub trait StatementRunner: Send {
    /// 하나의 트랜잭션으로 순서대로 실행
    ///
    /// `lock_timeout` 이 주어지면 잠금 대기 실패를 `LockTimeout` 으로 보고한다.
    async fn run_queries(&mut self, queries: &[String], lock_timeout: Option<&str>) -> Result<()>;

    /// 트랜잭션 없이 하나씩 실행
    async fn run_queries_without_transaction(&mut self, queries: &[String]) -> Result<()>;

    /// 단일 문장 실행, 영향받은 행 수 반환
    async fn run_query(&mut self, query: &str) -> Result<u64>;

    /// `SELECT COUNT(*)` 형태 문장 실행
    async fn run_count(&mut self, query: &str) -> Result<i64>;

    /// 생성된 SQL 출력
    fn log_sql(&mut self, sql: &str);

    async fn copy_batch(&mut self, batch: &FillBatch<'_>) -> Result<u64> {
        let sql = batch.to_sql();
        self.run_query(&sql).await
    }

    async fn replicate_batch(&mut self, step: &ViewReplication) -> Result<i64> {
        let sql = step.to_sql();
        self.run_count(&sql).await
    }
}
