// 수명주기 명령 모듈
// 각 명령은 카탈로그에서 현재 상태를 읽고, 문장을 만들어 실행기에 넘깁니다.

pub mod add_partitions;
pub mod analyze;
pub mod fill;
pub mod prep;
pub mod swap;

pub use add_partitions::{add_partitions, AddPartitionsOptions};
pub use analyze::analyze;
pub use fill::{fill, FillOptions};
pub use prep::{prep, unprep, PrepOptions};
pub use swap::{swap, unswap, SwapOptions};

use crate::error::{precondition_err, Result};
use crate::partition::{Catalog, Table};

pub(crate) async fn assert_table<C>(catalog: &C, table: &Table) -> Result<()>
where
    C: Catalog + ?Sized,
{
    if catalog.table_exists(table).await? {
        Ok(())
    } else {
        Err(precondition_err(format!("Table not found: {}", table)))
    }
}

pub(crate) async fn assert_no_table<C>(catalog: &C, table: &Table) -> Result<()>
where
    C: Catalog + ?Sized,
{
    if catalog.table_exists(table).await? {
        Err(precondition_err(format!("Table already exists: {}", table)))
    } else {
        Ok(())
    }
}

pub(crate) async fn assert_view<C>(catalog: &C, table: &Table) -> Result<()>
where
    C: Catalog + ?Sized,
{
    if catalog.view_exists(table).await? {
        Ok(())
    } else {
        Err(precondition_err(format!("View not found: {}", table)))
    }
}
