use std::time::Duration;

use log::info;

use super::{assert_table, assert_view};
use crate::error::{precondition_err, Result, SliceError};
use crate::partition::fill::{
    fill_batches, replicate_through_view, view_replication, FillRequest, FillSummary, PeriodWindow,
};
use crate::partition::naming::dated_partitions;
use crate::partition::period::advance_date;
use crate::partition::{Catalog, StatementRunner, Table};

/// fill 옵션
#[derive(Debug, Clone)]
pub struct FillOptions {
    pub table: Table,
    pub batch_size: i64,
    pub swapped: bool,
    pub source_table: Option<Table>,
    pub dest_table: Option<Table>,
    pub start: Option<i64>,
    pub filter: Option<String>,
    pub sleep: Option<Duration>,
    pub use_view: bool,
}

/// 원본에서 대상으로 배치 복사
///
/// 기본: 원본 -> 중간 테이블, `swapped`: 보관 테이블 -> 원본,
/// `use_view`: 보관 테이블의 행을 뷰 트리거를 거쳐 실제 테이블로 옮긴다.
pub async fn fill<D>(db: &mut D, options: &FillOptions) -> Result<FillSummary>
where
    D: Catalog + StatementRunner,
{
    if options.batch_size <= 0 {
        return Err(SliceError::Usage("Batch size must be positive".to_string()));
    }
    if options.swapped && options.use_view {
        return Err(SliceError::Usage(
            "Can't use --swapped and --use-view".to_string(),
        ));
    }

    let table = &options.table;
    let (source, destination) = if options.swapped {
        (
            options.source_table.clone().unwrap_or_else(|| table.retired_table()),
            options.dest_table.clone().unwrap_or_else(|| table.clone()),
        )
    } else if options.use_view {
        (
            table.retired_table(),
            options.dest_table.clone().unwrap_or_else(|| table.clone()),
        )
    } else {
        (
            options.source_table.clone().unwrap_or_else(|| table.clone()),
            options
                .dest_table
                .clone()
                .unwrap_or_else(|| table.intermediate_table()),
        )
    };

    assert_table(&*db, &source).await?;
    if options.use_view {
        assert_view(&*db, &destination).await?;
    } else {
        assert_table(&*db, &destination).await?;
    }

    // 뷰 모드의 파티션은 중간 테이블 아래에 있다
    let partitioned = if options.use_view {
        table.intermediate_table()
    } else {
        destination.clone()
    };

    let settings = db.fetch_settings(&partitioned, &table.trigger_name()).await?;
    let partitions = match &settings {
        Some(settings) => dated_partitions(
            &db.partitions(&partitioned).await?,
            &table.name,
            settings.period,
        ),
        None => Vec::new(),
    };

    let window = match (&settings, partitions.first(), partitions.last()) {
        (Some(settings), Some((_, first)), Some((_, last))) => Some(PeriodWindow {
            column: settings.column.clone(),
            cast: settings.cast,
            start: *first,
            end: advance_date(*last, settings.period, 1),
        }),
        _ => None,
    };

    let schema_table = if options.use_view {
        partitions
            .last()
            .map(|(p, _)| p.clone())
            .unwrap_or_else(|| source.clone())
    } else if settings.as_ref().map_or(false, |s| s.is_declarative()) {
        partitions
            .last()
            .map(|(p, _)| p.clone())
            .unwrap_or_else(|| table.clone())
    } else {
        table.clone()
    };

    let primary_key = db
        .primary_key(&schema_table)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| precondition_err(format!("No primary key: {}", schema_table)))?;

    if options.use_view {
        info!("뷰 트리거로 복제: {} -> {}", source, destination);
        let step = view_replication(source, destination, primary_key);
        return replicate_through_view(db, &step).await;
    }

    let request = FillRequest {
        source,
        destination,
        primary_key,
        window,
        filter: options.filter.clone(),
        start: options.start,
        swapped: options.swapped,
        batch_size: options.batch_size,
        sleep: options.sleep,
        routed: settings.as_ref().map_or(false, |s| !s.is_declarative()),
    };
    fill_batches(db, &request).await
}
