use log::info;

use super::{assert_no_table, assert_table, assert_view};
use crate::error::{precondition_err, Result};
use crate::partition::swap::{swap_statements, unswap_statements, SwapMode};
use crate::partition::trigger::view_trigger_function;
use crate::partition::{Catalog, StatementRunner, Table};

/// swap / unswap 옵션
#[derive(Debug, Clone)]
pub struct SwapOptions {
    pub table: Table,
    pub lock_timeout: String,
    pub use_view: bool,
}

impl SwapOptions {
    fn mode(&self) -> SwapMode {
        if self.use_view {
            SwapMode::View
        } else {
            SwapMode::Plain
        }
    }
}

/// 중간 테이블을 원본 이름으로 승격
pub async fn swap<D>(db: &mut D, options: &SwapOptions) -> Result<()>
where
    D: Catalog + StatementRunner,
{
    let table = &options.table;
    let intermediate = table.intermediate_table();
    let retired = table.retired_table();

    let sequences = match options.mode() {
        SwapMode::View => {
            assert_view(&*db, table).await?;
            assert_table(&*db, &intermediate).await?;
            db.sequences(&retired).await?
        }
        SwapMode::Plain => {
            assert_table(&*db, table).await?;
            assert_no_table(&*db, &retired).await?;
            assert_table(&*db, &intermediate).await?;
            db.sequences(table).await?
        }
    };

    let queries = swap_statements(table, options.mode(), &options.lock_timeout, &sequences);
    db.run_queries(&queries, Some(&options.lock_timeout)).await?;
    info!("교체 완료: {} -> {}", intermediate, table);
    Ok(())
}

/// 교체 되돌리기
pub async fn unswap<D>(db: &mut D, options: &SwapOptions) -> Result<()>
where
    D: Catalog + StatementRunner,
{
    let table = &options.table;
    let intermediate = table.intermediate_table();
    let retired = table.retired_table();

    assert_table(&*db, table).await?;
    assert_table(&*db, &retired).await?;
    assert_no_table(&*db, &intermediate).await?;

    let sequences = db.sequences(table).await?;

    let view_trigger = match options.mode() {
        SwapMode::Plain => None,
        SwapMode::View => {
            let primary_key = db
                .primary_key(&retired)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| precondition_err(format!("No primary key: {}", retired)))?;
            let columns = db.columns(&retired).await?;
            let sequence = sequences.iter().find(|s| s.column == primary_key);
            Some(view_trigger_function(
                &table.view_trigger_name(),
                &intermediate,
                &retired,
                &primary_key,
                sequence,
                &columns,
            ))
        }
    };

    let queries = unswap_statements(
        table,
        options.mode(),
        &options.lock_timeout,
        &sequences,
        view_trigger.as_deref(),
    );
    db.run_queries(&queries, Some(&options.lock_timeout)).await?;
    info!("교체 취소 완료: {} -> {}", table, intermediate);
    Ok(())
}
