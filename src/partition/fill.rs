use std::fmt;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use log::{debug, info};

use super::catalog::{Catalog, StatementRunner};
use super::naming::{quote_ident, Table};
use super::settings::{sql_date, ColumnCast};
use crate::constants::{NUMERIC_KEY_TYPES, VIEW_REPLICATION_LIMIT};
use crate::error::{precondition_err, Result, SliceError};

/// 존재하는 파티션 범위 [start, end)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodWindow {
    pub column: String,
    pub cast: ColumnCast,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodWindow {
    fn lower_sql(&self) -> String {
        format!(
            "{} >= {}",
            quote_ident(&self.column),
            sql_date(self.start, self.cast, true)
        )
    }

    pub fn to_sql(&self) -> String {
        format!(
            "{} AND {} < {}",
            self.lower_sql(),
            quote_ident(&self.column),
            sql_date(self.end, self.cast, true)
        )
    }
}

/// 복사 원본/대상
#[derive(Debug, Clone)]
pub struct CopyTarget {
    pub source: Table,
    pub destination: Table,
    pub primary_key: String,
    pub columns: Vec<String>,
}

/// 한 번의 fill 실행 동안만 유지되는 커서
#[derive(Debug, Clone)]
pub struct BatchCursor {
    pub starting_id: i64,
    pub max_source_id: i64,
    pub batch_size: i64,
    pub window: Option<PeriodWindow>,
    pub filter: Option<String>,
}

impl BatchCursor {
    pub fn batch_count(&self) -> u64 {
        if self.starting_id >= self.max_source_id || self.batch_size <= 0 {
            return 0;
        }
        let span = self.max_source_id.abs_diff(self.starting_id);
        let size = self.batch_size.unsigned_abs();
        span / size + u64::from(span % size != 0)
    }
}

/// 키 범위 (lower, lower + batch_size] 하나를 복사하는 배치
#[derive(Debug)]
pub struct FillBatch<'a> {
    pub target: &'a CopyTarget,
    pub cursor: &'a BatchCursor,
    pub lower: i64,
    pub index: u64,
    pub count: u64,
}

impl FillBatch<'_> {
    /// 키 범위 상한, i64 끝에서 포화
    pub fn upper(&self) -> i64 {
        self.lower.saturating_add(self.cursor.batch_size)
    }

    pub fn to_sql(&self) -> String {
        let pk = quote_ident(&self.target.primary_key);
        let fields = self
            .target
            .columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");

        let mut conditions = format!("{} > {} AND {} <= {}", pk, self.lower, pk, self.upper());
        if let Some(window) = &self.cursor.window {
            conditions.push_str(" AND ");
            conditions.push_str(&window.to_sql());
        }
        if let Some(filter) = &self.cursor.filter {
            conditions.push_str(" AND ");
            conditions.push_str(filter);
        }

        format!(
            "/* {} of {} */\nINSERT INTO {} ({})\n    SELECT {} FROM {}\n    WHERE {}",
            self.index,
            self.count,
            self.target.destination.quoted(),
            fields,
            fields,
            self.target.source.quoted(),
            conditions
        )
    }
}

/// 뷰 모드 복제 한 단계: 보관 테이블에 남은 행의 키를 자기 자신으로 갱신해
/// INSTEAD OF 트리거가 실제 테이블로 옮기게 한다
#[derive(Debug, Clone)]
pub struct ViewReplication {
    pub source: Table,
    pub view: Table,
    pub primary_key: String,
    pub limit: i64,
}

impl ViewReplication {
    pub fn to_sql(&self) -> String {
        let pk = quote_ident(&self.primary_key);
        format!(
            "WITH old_ids AS (\n    SELECT {pk} FROM {source} LIMIT {limit}\n), rows AS (\n    UPDATE {view} SET {pk} = {pk}\n    WHERE {pk} IN (SELECT {pk} FROM old_ids)\n    RETURNING 1\n)\nSELECT COUNT(*) FROM rows",
            pk = pk,
            source = self.source.quoted(),
            limit = self.limit,
            view = self.view.quoted()
        )
    }
}

/// fill 요청
#[derive(Debug, Clone)]
pub struct FillRequest {
    pub source: Table,
    pub destination: Table,
    pub primary_key: String,
    pub window: Option<PeriodWindow>,
    pub filter: Option<String>,
    pub start: Option<i64>,
    pub swapped: bool,
    pub batch_size: i64,
    pub sleep: Option<Duration>,
    /// 대상이 트리거 라우팅 테이블이면 서버가 삽입 행 수를 0 으로 보고한다
    pub routed: bool,
}

/// fill 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillSummary {
    pub batches: u64,
    /// 서버가 보고한 행 수
    pub rows: u64,
    pub routed: bool,
}

impl fmt::Display for FillSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.routed {
            write!(f, "{} 개 배치 (트리거 라우팅, 행 수 미보고)", self.batches)
        } else {
            write!(f, "{} 개 배치, {} 행", self.batches, self.rows)
        }
    }
}

/// 기본 키 순서로 배치 복사
pub async fn fill_batches<D>(db: &mut D, request: &FillRequest) -> Result<FillSummary>
where
    D: Catalog + StatementRunner,
{
    let pk = &request.primary_key;
    let filter = request.filter.as_deref();

    assert_numeric_key(db, &request.source, pk).await?;

    let max_source_id = db.max_id(&request.source, pk, filter, None).await?;

    let starting_id = match request.start {
        Some(start) => start,
        None => {
            let below = request.swapped.then_some(max_source_id);
            let max_dest_id = db.max_id(&request.destination, pk, filter, below).await?;
            if max_dest_id == 0 && !request.swapped {
                match db
                    .min_id(&request.source, pk, request.window.as_ref(), filter)
                    .await?
                {
                    Some(min_source_id) => min_source_id.saturating_sub(1),
                    None => max_dest_id,
                }
            } else {
                max_dest_id
            }
        }
    };

    let target = CopyTarget {
        source: request.source.clone(),
        destination: request.destination.clone(),
        primary_key: pk.clone(),
        columns: db.columns(&request.source).await?,
    };
    let cursor = BatchCursor {
        starting_id,
        max_source_id,
        batch_size: request.batch_size,
        window: request.window.clone(),
        filter: request.filter.clone(),
    };

    let count = cursor.batch_count();
    if count == 0 {
        db.log_sql("/* nothing to fill */");
        return Ok(FillSummary::default());
    }

    info!(
        "{} -> {} 복사 시작: 키 ({}, {}], {} 개 배치",
        target.source, target.destination, starting_id, max_source_id, count
    );
    let started = Instant::now();

    let mut summary = FillSummary {
        routed: request.routed,
        ..FillSummary::default()
    };
    let mut lower = starting_id;
    let mut index = 1;
    while lower < max_source_id {
        let batch = FillBatch {
            target: &target,
            cursor: &cursor,
            lower,
            index,
            count,
        };
        let upper = batch.upper();
        summary.rows += db.copy_batch(&batch).await?;
        summary.batches += 1;

        lower = upper;
        index += 1;

        if let Some(sleep) = request.sleep {
            if lower <= max_source_id {
                debug!("배치 간 대기: {}", humantime::format_duration(sleep));
                tokio::time::sleep(sleep).await;
            }
        }
    }

    info!(
        "복사 완료: {} ({})",
        summary,
        humantime::format_duration(Duration::from_secs(started.elapsed().as_secs()))
    );
    Ok(summary)
}

/// 뷰 트리거를 통해 보관 테이블의 행을 실제 테이블로 옮김
pub async fn replicate_through_view<R>(runner: &mut R, step: &ViewReplication) -> Result<FillSummary>
where
    R: StatementRunner + ?Sized,
{
    let mut summary = FillSummary::default();
    loop {
        let moved = runner.replicate_batch(step).await?;
        if moved <= 0 {
            break;
        }
        summary.batches += 1;
        summary.rows += moved as u64;
        debug!("뷰 복제 배치 {}: {} 행", summary.batches, moved);
    }
    info!("뷰 복제 완료: {} 행", summary.rows);
    Ok(summary)
}

/// 기본 키가 숫자형인지 확인
async fn assert_numeric_key<C>(catalog: &C, table: &Table, primary_key: &str) -> Result<()>
where
    C: Catalog + ?Sized,
{
    match catalog.column_type(table, primary_key).await? {
        Some(data_type) if is_numeric_type(&data_type) => Ok(()),
        Some(data_type) => Err(SliceError::UnsupportedKeyType {
            table: table.to_string(),
            column: primary_key.to_string(),
            data_type,
        }),
        None => Err(precondition_err(format!(
            "Primary key column not found in {}: {}",
            table, primary_key
        ))),
    }
}

fn is_numeric_type(data_type: &str) -> bool {
    let base = data_type.split('(').next().unwrap_or(data_type).trim();
    NUMERIC_KEY_TYPES.contains(&base)
}

/// 뷰 복제 기본 단계
pub fn view_replication(source: Table, view: Table, primary_key: String) -> ViewReplication {
    ViewReplication {
        source,
        view,
        primary_key,
        limit: VIEW_REPLICATION_LIMIT,
    }
}
