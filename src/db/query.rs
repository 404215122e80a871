use async_trait::async_trait;
use deadpool_postgres::Object;
use log::{debug, trace};

use crate::error::{map_lock_timeout, Result};
use crate::partition::StatementRunner;

/// PostgreSQL 연결 위의 카탈로그 조회 + 문장 실행기
pub struct PgDatabase {
    pub(crate) client: Object,
    dry_run: bool,
}

impl PgDatabase {
    pub fn new(client: Object, dry_run: bool) -> Self {
        Self { client, dry_run }
    }
}

/// 생성된 SQL 을 표준 출력으로
pub fn print_sql(sql: &str) {
    println!("{}", sql);
    if !sql.is_empty() {
        println!();
    }
}

#[async_trait]
impl StatementRunner for PgDatabase {
    async fn run_queries(&mut self, queries: &[String], lock_timeout: Option<&str>) -> Result<()> {
        print_sql("BEGIN;");

        if self.dry_run {
            for query in queries {
                print_sql(query);
            }
            print_sql("COMMIT;");
            return Ok(());
        }

        let transaction = self.client.transaction().await?;
        transaction
            .batch_execute("SET LOCAL client_min_messages TO warning")
            .await?;

        debug!("트랜잭션 실행: {} 개의 쿼리", queries.len());
        for query in queries {
            print_sql(query);
            transaction
                .batch_execute(query)
                .await
                .map_err(|e| map_lock_timeout(e, lock_timeout))?;
        }

        transaction.commit().await?;
        print_sql("COMMIT;");
        Ok(())
    }

    async fn run_queries_without_transaction(&mut self, queries: &[String]) -> Result<()> {
        for query in queries {
            print_sql(query);
            if !self.dry_run {
                self.client.batch_execute(query).await?;
            }
        }
        Ok(())
    }

    async fn run_query(&mut self, query: &str) -> Result<u64> {
        print_sql(query);
        if self.dry_run {
            return Ok(0);
        }
        let rows = self.client.execute(query, &[]).await?;
        trace!("{} 행 처리", rows);
        Ok(rows)
    }

    async fn run_count(&mut self, query: &str) -> Result<i64> {
        print_sql(query);
        if self.dry_run {
            return Ok(0);
        }
        let row = self.client.query_one(query, &[]).await?;
        Ok(row.try_get::<_, i64>(0)?)
    }

    fn log_sql(&mut self, sql: &str) {
        print_sql(sql);
    }
}
