use chrono::NaiveDate;

use super::catalog::Sequence;
use super::naming::{escape_literal, quote_ident, Table};
use super::period::{advance_date, round_date};
use super::settings::{sql_date, PartitionSettings};

/// today 기준 파티션 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Current,
    Future,
    Past,
}

pub fn classify(boundary: NaiveDate, settings: &PartitionSettings, today: NaiveDate) -> Bucket {
    let today = round_date(today, settings.period);
    let next = advance_date(boundary, settings.period, 1);
    if boundary <= today && today < next {
        Bucket::Current
    } else if boundary > today {
        Bucket::Future
    } else {
        Bucket::Past
    }
}

/// 라우팅 함수의 분기 하나
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingBranch {
    pub partition: Table,
    pub boundary: NaiveDate,
    pub predicate: String,
    pub action: String,
}

/// 분기 정렬: 현재, 미래 오름차순, 과거 내림차순
///
/// `partitions` 는 이름순으로 정렬된 (파티션, 경계) 목록이어야 한다.
pub fn routing_branches(
    partitions: &[(Table, NaiveDate)],
    settings: &PartitionSettings,
    today: NaiveDate,
) -> Vec<RoutingBranch> {
    let column = quote_ident(&settings.column);
    let mut current = Vec::new();
    let mut future = Vec::new();
    let mut past = Vec::new();

    for (partition, boundary) in partitions {
        let next = advance_date(*boundary, settings.period, 1);
        let branch = RoutingBranch {
            partition: partition.clone(),
            boundary: *boundary,
            predicate: format!(
                "(NEW.{} >= {} AND NEW.{} < {})",
                column,
                sql_date(*boundary, settings.cast, true),
                column,
                sql_date(next, settings.cast, true)
            ),
            action: format!("INSERT INTO {} VALUES (NEW.*);", partition.quoted()),
        };
        match classify(*boundary, settings, today) {
            Bucket::Current => current.push(branch),
            Bucket::Future => future.push(branch),
            Bucket::Past => past.push(branch),
        }
    }

    past.reverse();
    current.into_iter().chain(future).chain(past).collect()
}

/// 라우팅 함수 전체 본문. 분기가 없으면 `None`
pub fn routing_function(trigger_name: &str, branches: &[RoutingBranch]) -> Option<String> {
    if branches.is_empty() {
        return None;
    }

    let conditions = branches
        .iter()
        .map(|b| format!("{} THEN\n            {}", b.predicate, b.action))
        .collect::<Vec<_>>()
        .join("\n        ELSIF ");

    Some(format!(
        "CREATE OR REPLACE FUNCTION {}()
    RETURNS trigger AS $$
    BEGIN
        IF {}
        ELSE
            RAISE EXCEPTION 'Date out of range. Ensure partitions are created.';
        END IF;
        RETURN NULL;
    END;
    $$ LANGUAGE plpgsql;",
        quote_ident(trigger_name),
        conditions
    ))
}

/// 파티션이 생기기 전까지 쓰이는 라우팅 함수
pub fn placeholder_function(trigger_name: &str) -> String {
    format!(
        "CREATE FUNCTION {}()
    RETURNS trigger AS $$
    BEGIN
        RAISE EXCEPTION 'Create partitions first.';
    END;
    $$ LANGUAGE plpgsql;",
        quote_ident(trigger_name)
    )
}

/// 뷰 INSTEAD OF 트리거 함수
///
/// INSERT 는 새 키를 받아 실제 테이블로, DELETE 는 양쪽에서 삭제,
/// UPDATE 는 보관 테이블에 있으면 실제 테이블로 옮기고 없으면 모든 컬럼을 갱신한다.
pub fn view_trigger_function(
    function_name: &str,
    live: &Table,
    retired: &Table,
    primary_key: &str,
    sequence: Option<&Sequence>,
    columns: &[String],
) -> String {
    let pk = quote_ident(primary_key);
    let next_key = match sequence {
        Some(seq) => format!(
            "NEW.{} := nextval({});\n            ",
            pk,
            escape_literal(&format!("{}.{}", quote_ident(&seq.schema), quote_ident(&seq.name)))
        ),
        None => String::new(),
    };
    let assignments = columns
        .iter()
        .map(|c| format!("{} = NEW.{}", quote_ident(c), quote_ident(c)))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "CREATE OR REPLACE FUNCTION {name}()
    RETURNS trigger AS $$
    BEGIN
        IF TG_OP = 'INSERT' THEN
            {next_key}INSERT INTO {live} VALUES (NEW.*);
            RETURN NEW;
        ELSIF TG_OP = 'DELETE' THEN
            DELETE FROM {live} WHERE {pk} = OLD.{pk};
            DELETE FROM {retired} WHERE {pk} = OLD.{pk};
            RETURN OLD;
        ELSE
            DELETE FROM {retired} WHERE {pk} = OLD.{pk};
            IF FOUND THEN
                INSERT INTO {live} VALUES (NEW.*);
            ELSE
                UPDATE {live} SET {assignments}
                    WHERE {pk} = OLD.{pk};
            END IF;
            RETURN NEW;
        END IF;
    END;
    $$ LANGUAGE plpgsql;",
        name = quote_ident(function_name),
        next_key = next_key,
        live = live.quoted(),
        retired = retired.quoted(),
        pk = pk,
        assignments = assignments
    )
}
