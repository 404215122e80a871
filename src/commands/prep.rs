use log::info;

use super::{assert_no_table, assert_table};
use crate::error::{Result, SliceError};
use crate::partition::ddl;
use crate::partition::{Catalog, Period, PartitionSettings, StatementRunner, Table};

/// prep 옵션
#[derive(Debug, Clone)]
pub struct PrepOptions {
    pub table: Table,
    pub column: Option<String>,
    pub period: Option<Period>,
    pub trigger_based: bool,
    /// false 면 파티션 없는 복제 테이블만 만든다 (--no-partition)
    pub partition: bool,
    pub test_version: Option<u32>,
}

/// 중간 테이블 생성
pub async fn prep<D>(db: &mut D, options: &PrepOptions) -> Result<()>
where
    D: Catalog + StatementRunner,
{
    let table = &options.table;
    let intermediate = table.intermediate_table();

    assert_table(&*db, table).await?;
    assert_no_table(&*db, &intermediate).await?;

    let foreign_keys = db.foreign_keys(table).await?;

    let queries = if !options.partition {
        if options.column.is_some() || options.period.is_some() {
            return Err(SliceError::Usage(
                "Usage: \"pgslice prep TABLE --no-partition\"".to_string(),
            ));
        }
        if options.trigger_based {
            return Err(SliceError::Usage(
                "Can't use --trigger-based and --no-partition".to_string(),
            ));
        }
        ddl::prep_unpartitioned(table, &foreign_keys)
    } else {
        let (column, period) = match (&options.column, options.period) {
            (Some(column), Some(period)) => (column.clone(), period),
            _ => {
                return Err(SliceError::Usage(
                    "Usage: \"pgslice prep TABLE COLUMN PERIOD\"".to_string(),
                ))
            }
        };

        let cast = db
            .column_cast(table, &column)
            .await?
            .ok_or_else(|| SliceError::Usage(format!("Column not found: {}", column)))?;

        let version = if options.trigger_based {
            1
        } else {
            match options.test_version.unwrap_or(3) {
                v @ (2 | 3) => v,
                v => return Err(SliceError::Usage(format!("Invalid version: {}", v))),
            }
        };

        let settings = PartitionSettings {
            period,
            column,
            cast,
            version,
            needs_comment: false,
        };

        if options.trigger_based {
            ddl::prep_trigger_based(table, &settings, &foreign_keys)
        } else {
            let index_defs = db.index_defs(table).await?;
            let server_version_num = db.server_version_num().await?;
            ddl::prep_declarative(table, &settings, &index_defs, &foreign_keys, server_version_num)
        }
    };

    info!("중간 테이블 생성: {}", intermediate);
    db.run_queries(&queries, None).await
}

/// 중간 테이블 제거
pub async fn unprep<D>(db: &mut D, table: &Table) -> Result<()>
where
    D: Catalog + StatementRunner,
{
    let intermediate = table.intermediate_table();
    assert_table(&*db, &intermediate).await?;

    info!("중간 테이블 제거: {}", intermediate);
    db.run_queries(&ddl::unprep(table), None).await
}
