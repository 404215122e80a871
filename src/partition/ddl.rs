use chrono::NaiveDate;

use super::naming::{escape_literal, quote_ident, Table};
use super::period::{advance_date, Period};
use super::settings::{sql_date, PartitionMode, PartitionSettings};
use super::trigger;

/// add_partitions 대상 경계 목록: today 기준 [-past, future]
pub fn partition_boundaries(today: NaiveDate, period: Period, past: u32, future: u32) -> Vec<NaiveDate> {
    let past = past.min(i32::MAX as u32) as i32;
    let future = future.min(i32::MAX as u32) as i32;
    (-past..=future)
        .map(|n| advance_date(today, period, n))
        .collect()
}

/// 파티션 생성에 필요한 부모 테이블 정보
#[derive(Debug, Clone)]
pub struct PartitionTemplate {
    /// 파티션을 붙일 부모 (원본 또는 중간 테이블)
    pub parent: Table,
    /// 파티션 이름의 기준이 되는 원본 테이블
    pub base: Table,
    pub settings: PartitionSettings,
    pub tablespace: Option<String>,
    pub primary_key: Vec<String>,
    pub index_defs: Vec<String>,
    pub foreign_keys: Vec<String>,
}

impl PartitionTemplate {
    fn tablespace_clause(&self) -> String {
        match &self.tablespace {
            Some(ts) if !ts.is_empty() => format!(" TABLESPACE {}", quote_ident(ts)),
            _ => String::new(),
        }
    }

    /// 한 경계에 대한 파티션 생성 문장
    pub fn create_partition(&self, boundary: NaiveDate) -> (Table, Vec<String>) {
        let settings = &self.settings;
        let partition = self.base.partition(settings.period, boundary);
        let next = advance_date(boundary, settings.period, 1);
        let mode = settings.mode();

        let mut queries = Vec::new();
        match mode {
            PartitionMode::TriggerBased => {
                let column = quote_ident(&settings.column);
                queries.push(format!(
                    "CREATE TABLE {}\n    (CHECK ({} >= {} AND {} < {}))\n    INHERITS ({}){};",
                    partition.quoted(),
                    column,
                    sql_date(boundary, settings.cast, true),
                    column,
                    sql_date(next, settings.cast, true),
                    self.parent.quoted(),
                    self.tablespace_clause()
                ));
            }
            PartitionMode::Declarative | PartitionMode::DeclarativePropagating => {
                queries.push(format!(
                    "CREATE TABLE {} PARTITION OF {} FOR VALUES FROM ({}) TO ({}){};",
                    partition.quoted(),
                    self.parent.quoted(),
                    sql_date(boundary, settings.cast, false),
                    sql_date(next, settings.cast, false),
                    self.tablespace_clause()
                ));
            }
        }

        if !self.primary_key.is_empty() {
            queries.push(format!(
                "ALTER TABLE {} ADD PRIMARY KEY ({});",
                partition.quoted(),
                quote_columns(&self.primary_key)
            ));
        }

        if mode.replicates_indexes() {
            for index_def in &self.index_defs {
                queries.push(make_index_def(index_def, &partition));
            }
            for fk_def in &self.foreign_keys {
                queries.push(make_fk_def(fk_def, &partition));
            }
        }

        (partition, queries)
    }

    /// 아직 없는 경계에 대해서만 파티션 생성 문장을 만든다
    pub fn create_missing(
        &self,
        boundaries: &[NaiveDate],
        existing: &[Table],
    ) -> (Vec<Table>, Vec<String>) {
        let mut added: Vec<Table> = Vec::new();
        let mut queries = Vec::new();
        for &boundary in boundaries {
            let (partition, statements) = self.create_partition(boundary);
            if existing.contains(&partition) || added.contains(&partition) {
                continue;
            }
            added.push(partition);
            queries.extend(statements);
        }
        (added, queries)
    }
}

fn quote_columns(columns: &[String]) -> String {
    columns.iter().map(|c| quote_ident(c)).collect::<Vec<_>>().join(", ")
}

/// 기존 인덱스 정의를 다른 테이블 대상으로 변환 (인덱스 이름은 자동 생성)
pub fn make_index_def(index_def: &str, table: &Table) -> String {
    let rewritten = match (index_def.find(" INDEX "), index_def.find(" USING ")) {
        (Some(index), Some(using)) if index < using => format!(
            "{} INDEX ON {}{}",
            &index_def[..index],
            table.quoted(),
            &index_def[using..]
        ),
        _ => index_def.to_string(),
    };
    format!("{};", rewritten)
}

/// 외래 키 정의를 다른 테이블에 추가
pub fn make_fk_def(fk_def: &str, table: &Table) -> String {
    format!("ALTER TABLE {} ADD {};", table.quoted(), fk_def)
}

/// 설정 코멘트 기록 문장
pub fn settings_comment(table: &Table, trigger_name: &str, settings: &PartitionSettings) -> String {
    if settings.is_declarative() {
        format!(
            "COMMENT ON TABLE {} IS {};",
            table.quoted(),
            escape_literal(&settings.table_comment())
        )
    } else {
        format!(
            "COMMENT ON TRIGGER {} ON {} IS {};",
            quote_ident(trigger_name),
            table.quoted(),
            escape_literal(&settings.trigger_comment())
        )
    }
}

/// prep: 선언적 파티션 중간 테이블
pub fn prep_declarative(
    table: &Table,
    settings: &PartitionSettings,
    index_defs: &[String],
    foreign_keys: &[String],
    server_version_num: i32,
) -> Vec<String> {
    let intermediate = table.intermediate_table();
    let mut including = String::from(
        "INCLUDING DEFAULTS INCLUDING CONSTRAINTS INCLUDING STORAGE INCLUDING COMMENTS INCLUDING STATISTICS",
    );
    if server_version_num >= 120000 {
        including.push_str(" INCLUDING GENERATED");
    }
    if server_version_num >= 140000 {
        including.push_str(" INCLUDING COMPRESSION");
    }

    let mut queries = vec![format!(
        "CREATE TABLE {} (LIKE {} {}) PARTITION BY RANGE ({});",
        intermediate.quoted(),
        table.quoted(),
        including,
        quote_ident(&settings.column)
    )];

    if settings.mode() == PartitionMode::DeclarativePropagating {
        for index_def in index_defs {
            queries.push(make_index_def(index_def, &intermediate));
        }
        for fk_def in foreign_keys {
            queries.push(make_fk_def(fk_def, &intermediate));
        }
    }

    queries.push(settings_comment(&intermediate, &table.trigger_name(), settings));
    queries
}

/// prep: 상속 + 트리거 기반 중간 테이블
pub fn prep_trigger_based(
    table: &Table,
    settings: &PartitionSettings,
    foreign_keys: &[String],
) -> Vec<String> {
    let intermediate = table.intermediate_table();
    let trigger_name = table.trigger_name();

    let mut queries = vec![format!(
        "CREATE TABLE {} (LIKE {} INCLUDING ALL);",
        intermediate.quoted(),
        table.quoted()
    )];
    for fk_def in foreign_keys {
        queries.push(make_fk_def(fk_def, &intermediate));
    }
    queries.push(trigger::placeholder_function(&trigger_name));
    queries.push(format!(
        "CREATE TRIGGER {}\n    BEFORE INSERT ON {}\n    FOR EACH ROW EXECUTE PROCEDURE {}();",
        quote_ident(&trigger_name),
        intermediate.quoted(),
        quote_ident(&trigger_name)
    ));
    queries.push(settings_comment(&intermediate, &trigger_name, settings));
    queries
}

/// prep --no-partition: 파티션 없는 복제 테이블
pub fn prep_unpartitioned(table: &Table, foreign_keys: &[String]) -> Vec<String> {
    let intermediate = table.intermediate_table();
    let mut queries = vec![format!(
        "CREATE TABLE {} (LIKE {} INCLUDING ALL);",
        intermediate.quoted(),
        table.quoted()
    )];
    for fk_def in foreign_keys {
        queries.push(make_fk_def(fk_def, &intermediate));
    }
    queries
}

/// unprep: 중간 테이블과 라우팅 함수 제거
pub fn unprep(table: &Table) -> Vec<String> {
    vec![
        format!("DROP TABLE IF EXISTS {} CASCADE;", table.intermediate_table().quoted()),
        format!(
            "DROP FUNCTION IF EXISTS {}() CASCADE;",
            quote_ident(&table.trigger_name())
        ),
    ]
}
