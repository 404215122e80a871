use chrono::NaiveDate;
use log::{debug, info};

use super::{assert_no_table, assert_table};
use crate::error::{precondition_err, Result, SliceError};
use crate::partition::ddl::{partition_boundaries, settings_comment, PartitionTemplate};
use crate::partition::naming::dated_partitions;
use crate::partition::period::round_date;
use crate::partition::swap::view_setup_statements;
use crate::partition::trigger::{routing_branches, routing_function, view_trigger_function};
use crate::partition::{Catalog, StatementRunner, Table};

/// add_partitions 옵션
#[derive(Debug, Clone)]
pub struct AddPartitionsOptions {
    pub table: Table,
    pub intermediate: bool,
    pub past: u32,
    pub future: u32,
    pub tablespace: Option<String>,
    pub use_view: bool,
}

/// today 기준 과거/미래 파티션 추가
///
/// 이미 있는 파티션은 건너뛰므로 여러 번 실행해도 결과가 같다.
/// 트리거 기반 테이블은 라우팅 함수를 전체 파티션 기준으로 다시 만든다.
pub async fn add_partitions<D>(
    db: &mut D,
    options: &AddPartitionsOptions,
    today: NaiveDate,
) -> Result<Vec<Table>>
where
    D: Catalog + StatementRunner,
{
    let original = &options.table;
    let table = if options.intermediate {
        original.intermediate_table()
    } else {
        original.clone()
    };
    let trigger_name = original.trigger_name();

    if options.use_view && !options.intermediate {
        return Err(SliceError::Usage(
            "--use-view requires --intermediate".to_string(),
        ));
    }

    assert_table(&*db, &table).await?;

    let settings = db
        .fetch_settings(&table, &trigger_name)
        .await?
        .ok_or_else(|| SliceError::NotConfigured {
            table: table.to_string(),
            hint: if options.intermediate {
                String::new()
            } else {
                "\nDid you mean to use --intermediate?".to_string()
            },
        })?;

    let mut queries = Vec::new();
    if settings.needs_comment {
        queries.push(settings_comment(&table, &trigger_name, &settings));
    }

    let period = settings.period;
    let today = round_date(today, period);
    let existing = db.partitions(&table).await?;

    // 선언적 부모에는 기본 키가 없으므로 원본 또는 날짜가 가장 늦은 파티션에서 가져온다
    let schema_table = if !settings.is_declarative() {
        table.clone()
    } else if options.intermediate {
        original.clone()
    } else {
        dated_partitions(&existing, &original.name, period)
            .pop()
            .map(|(partition, _)| partition)
            .unwrap_or_else(|| table.clone())
    };

    let (index_defs, foreign_keys) = if settings.mode().replicates_indexes() {
        (
            db.index_defs(&schema_table).await?,
            db.foreign_keys(&schema_table).await?,
        )
    } else {
        (Vec::new(), Vec::new())
    };

    let template = PartitionTemplate {
        parent: table.clone(),
        base: original.clone(),
        settings: settings.clone(),
        tablespace: options.tablespace.clone().filter(|ts| !ts.is_empty()),
        primary_key: db.primary_key(&schema_table).await?,
        index_defs,
        foreign_keys,
    };

    let boundaries = partition_boundaries(today, period, options.past, options.future);
    let mut present = Vec::new();
    for &boundary in &boundaries {
        let partition = original.partition(period, boundary);
        if db.table_exists(&partition).await? {
            debug!("파티션 이미 존재: {}", partition);
            present.push(partition);
        }
    }

    let (added, statements) = template.create_missing(&boundaries, &present);
    queries.extend(statements);

    if !settings.is_declarative() {
        let mut all = existing;
        all.extend(added.iter().cloned());
        let dated = dated_partitions(&all, &original.name, period);
        let branches = routing_branches(&dated, &settings, today);
        if let Some(function) = routing_function(&trigger_name, &branches) {
            queries.push(function);
        }
    }

    if options.intermediate && options.use_view {
        queries.extend(view_setup(&*db, original, &table).await?);
    }

    if queries.is_empty() {
        info!("추가할 파티션 없음: {}", table);
        return Ok(added);
    }

    db.run_queries(&queries, None).await?;
    info!("{} 에 파티션 {} 개 추가", table, added.len());
    Ok(added)
}

/// 원본을 보관 테이블로 돌리고 합집합 뷰를 세우는 문장
async fn view_setup<C>(catalog: &C, original: &Table, live: &Table) -> Result<Vec<String>>
where
    C: Catalog + ?Sized,
{
    let retired = original.retired_table();
    assert_table(catalog, original).await?;
    assert_no_table(catalog, &retired).await?;

    let primary_key = catalog
        .primary_key(original)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| precondition_err(format!("No primary key: {}", original)))?;
    let sequence = catalog
        .sequences(original)
        .await?
        .into_iter()
        .find(|s| s.column == primary_key);
    let columns = catalog.columns(original).await?;

    let function = view_trigger_function(
        &original.view_trigger_name(),
        live,
        &retired,
        &primary_key,
        sequence.as_ref(),
        &columns,
    );
    Ok(view_setup_statements(original, &function))
}
