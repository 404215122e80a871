use super::assert_table;
use crate::error::Result;
use crate::partition::{Catalog, StatementRunner, Table};

/// 부모와 모든 파티션의 통계 갱신
///
/// `swapped` 가 거짓이면 중간 테이블을 대상으로 한다.
pub async fn analyze<D>(db: &mut D, table: &Table, swapped: bool) -> Result<()>
where
    D: Catalog + StatementRunner,
{
    let parent = if swapped {
        table.clone()
    } else {
        table.intermediate_table()
    };
    assert_table(&*db, &parent).await?;

    let mut targets = db.partitions(&parent).await?;
    targets.push(parent);

    let queries: Vec<String> = targets
        .iter()
        .map(|t| format!("ANALYZE VERBOSE {};", t.quoted()))
        .collect();
    db.run_queries_without_transaction(&queries).await
}
