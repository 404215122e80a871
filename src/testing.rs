// 테스트용 인메모리 데이터베이스
// 엔진이 만드는 문장을 해석해 테이블, 뷰, 파티션, 행, 시퀀스 소유권을 흉내냅니다.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::{Result, SliceError};
use crate::partition::fill::{FillBatch, PeriodWindow, ViewReplication};
use crate::partition::{Catalog, PartitionSettings, Sequence, StatementRunner, Table};

type Row = (i64, NaiveDate);

#[derive(Debug, Clone, Default)]
struct MemTable {
    columns: Vec<(String, String)>,
    primary_key: Vec<String>,
    index_defs: Vec<String>,
    foreign_keys: Vec<String>,
    rows: Vec<Row>,
    parent: Option<String>,
    range: Option<(NaiveDate, NaiveDate)>,
    routed: bool,
    comment: Option<String>,
    trigger_comments: BTreeMap<String, String>,
    autovacuum: bool,
}

#[derive(Debug, Clone)]
struct MemView {
    live: String,
    retired: String,
}

#[derive(Debug, Clone)]
struct MemSequence {
    name: String,
    owner: Option<String>,
    column: String,
}

#[derive(Debug, Clone, Default)]
struct State {
    tables: BTreeMap<String, MemTable>,
    views: BTreeMap<String, MemView>,
    sequences: Vec<MemSequence>,
    functions: BTreeSet<String>,
    analyzed: Vec<String>,
}

fn missing(name: &str) -> SliceError {
    SliceError::PreconditionFailed(format!("relation \"{}\" does not exist", name))
}

fn unsupported(sql: &str) -> SliceError {
    SliceError::Usage(format!("MemoryDatabase cannot run: {}", sql))
}

/// 큰따옴표 식별자를 점으로 이어진 묶음 단위로 추출 (문자열 리터럴은 건너뜀)
fn identifier_groups(sql: &str) -> Vec<Vec<String>> {
    let chars: Vec<char> = sql.chars().collect();
    let mut groups = Vec::new();
    let mut current = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\'' => {
                i += 1;
                while i < chars.len() {
                    if chars[i] == '\'' {
                        if chars.get(i + 1) == Some(&'\'') {
                            i += 2;
                            continue;
                        }
                        break;
                    }
                    i += 1;
                }
                i += 1;
            }
            '"' => {
                let mut ident = String::new();
                i += 1;
                while i < chars.len() {
                    if chars[i] == '"' {
                        if chars.get(i + 1) == Some(&'"') {
                            ident.push('"');
                            i += 2;
                            continue;
                        }
                        break;
                    }
                    ident.push(chars[i]);
                    i += 1;
                }
                i += 1;
                current.push(ident);
                if chars.get(i) == Some(&'.') && chars.get(i + 1) == Some(&'"') {
                    i += 1;
                    continue;
                }
                groups.push(std::mem::take(&mut current));
            }
            _ => i += 1,
        }
    }
    groups
}

/// 작은따옴표 리터럴 목록
fn literals(sql: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut chars = sql.chars().peekable();
    let mut in_ident = false;
    while let Some(c) = chars.next() {
        match c {
            '"' => in_ident = !in_ident,
            '\'' if !in_ident => {
                let mut literal = String::new();
                while let Some(c) = chars.next() {
                    if c == '\'' {
                        if chars.peek() == Some(&'\'') {
                            chars.next();
                            literal.push('\'');
                            continue;
                        }
                        break;
                    }
                    literal.push(c);
                }
                result.push(literal);
            }
            _ => {}
        }
    }
    result
}

/// 키 컬럼에 대한 `--where` 조건 하나
#[derive(Debug, Clone, Copy)]
enum KeyCondition {
    Eq(i64),
    Ne(i64),
    Lt(i64),
    Le(i64),
    Gt(i64),
    Ge(i64),
    Modulo(i64, i64),
}

impl KeyCondition {
    fn matches(&self, key: i64) -> bool {
        match *self {
            KeyCondition::Eq(n) => key == n,
            KeyCondition::Ne(n) => key != n,
            KeyCondition::Lt(n) => key < n,
            KeyCondition::Le(n) => key <= n,
            KeyCondition::Gt(n) => key > n,
            KeyCondition::Ge(n) => key >= n,
            KeyCondition::Modulo(m, r) => key.rem_euclid(m) == r,
        }
    }
}

/// `"Id" <op> N` 또는 `"Id" % M = R` 를 AND 로 이은 필터만 해석
fn key_conditions(filter: &str) -> Result<Vec<KeyCondition>> {
    let number = |text: &str| text.parse::<i64>().map_err(|_| unsupported(filter));
    filter
        .split(" AND ")
        .map(|term| {
            let tokens: Vec<&str> = term.split_whitespace().collect();
            match tokens.as_slice() {
                [column, "%", m, "=", r] if column.starts_with('"') => {
                    let m = number(*m)?;
                    if m == 0 {
                        return Err(unsupported(filter));
                    }
                    Ok(KeyCondition::Modulo(m, number(*r)?))
                }
                [column, op, n] if column.starts_with('"') => {
                    let n = number(*n)?;
                    match *op {
                        "=" => Ok(KeyCondition::Eq(n)),
                        "<>" | "!=" => Ok(KeyCondition::Ne(n)),
                        "<" => Ok(KeyCondition::Lt(n)),
                        "<=" => Ok(KeyCondition::Le(n)),
                        ">" => Ok(KeyCondition::Gt(n)),
                        ">=" => Ok(KeyCondition::Ge(n)),
                        _ => Err(unsupported(filter)),
                    }
                }
                _ => Err(unsupported(filter)),
            }
        })
        .collect()
}

/// ["schema", "name"(, "column")] 묶음에서 테이블 이름
fn name_of(group: &[String]) -> Option<String> {
    group.get(1).or_else(|| group.first()).cloned()
}

fn name_at(groups: &[Vec<String>], index: usize, sql: &str) -> Result<String> {
    groups
        .get(index)
        .and_then(|g| name_of(g))
        .ok_or_else(|| unsupported(sql))
}

fn name_after(sql: &str, keyword: &str) -> Result<String> {
    sql.split_once(keyword)
        .and_then(|(_, rest)| identifier_groups(rest).into_iter().next())
        .and_then(|g| name_of(&g))
        .ok_or_else(|| unsupported(sql))
}

fn literal_date(literal: &str) -> Option<NaiveDate> {
    literal
        .get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

impl State {
    fn relation_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name) || self.views.contains_key(name)
    }

    fn table(&self, name: &str) -> Result<&MemTable> {
        self.tables.get(name).ok_or_else(|| missing(name))
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut MemTable> {
        self.tables.get_mut(name).ok_or_else(|| missing(name))
    }

    fn children(&self, name: &str) -> Vec<String> {
        self.tables
            .iter()
            .filter(|(_, t)| t.parent.as_deref() == Some(name))
            .map(|(n, _)| n.clone())
            .collect()
    }

    /// 자식 파티션과 뷰 하위 테이블까지 포함한 모든 행
    fn all_rows(&self, name: &str) -> Result<Vec<Row>> {
        if let Some(view) = self.views.get(name) {
            let mut rows = self.all_rows(&view.live)?;
            rows.extend(self.all_rows(&view.retired)?);
            return Ok(rows);
        }
        let mut rows = self.table(name)?.rows.clone();
        for child in self.children(name) {
            rows.extend(self.all_rows(&child)?);
        }
        Ok(rows)
    }

    fn insert_row(&mut self, name: &str, row: Row) -> Result<()> {
        if let Some(view) = self.views.get(name) {
            let live = view.live.clone();
            return self.insert_row(&live, row);
        }
        let children = self.children(name);
        let table = self.table(name)?;
        if !children.is_empty() || table.routed {
            let target = children.into_iter().find(|child| {
                self.tables
                    .get(child)
                    .and_then(|t| t.range)
                    .map_or(false, |(start, end)| row.1 >= start && row.1 < end)
            });
            return match target {
                Some(child) => self.insert_row(&child, row),
                None => Err(SliceError::PreconditionFailed(format!(
                    "no partition of relation \"{}\" found for row",
                    name
                ))),
            };
        }
        if !table.primary_key.is_empty() && table.rows.iter().any(|(key, _)| *key == row.0) {
            return Err(SliceError::PreconditionFailed(format!(
                "duplicate key value violates unique constraint on \"{}\"",
                name
            )));
        }
        self.table_mut(name)?.rows.push(row);
        Ok(())
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        if self.relation_exists(to) {
            return Err(SliceError::PreconditionFailed(format!(
                "relation \"{}\" already exists",
                to
            )));
        }
        let table = self.tables.remove(from).ok_or_else(|| missing(from))?;
        self.tables.insert(to.to_string(), table);
        for table in self.tables.values_mut() {
            if table.parent.as_deref() == Some(from) {
                table.parent = Some(to.to_string());
            }
        }
        for view in self.views.values_mut() {
            if view.live == from {
                view.live = to.to_string();
            }
            if view.retired == from {
                view.retired = to.to_string();
            }
        }
        for sequence in &mut self.sequences {
            if sequence.owner.as_deref() == Some(from) {
                sequence.owner = Some(to.to_string());
            }
        }
        Ok(())
    }

    fn drop_table(&mut self, name: &str) {
        for child in self.children(name) {
            self.drop_table(&child);
        }
        self.tables.remove(name);
        self.views
            .retain(|_, view| view.live != name && view.retired != name);
        self.sequences
            .retain(|sequence| sequence.owner.as_deref() != Some(name));
    }

    fn create_table(&mut self, sql: &str, groups: &[Vec<String>]) -> Result<()> {
        let name = name_at(groups, 0, sql)?;
        if self.relation_exists(&name) {
            return Err(SliceError::PreconditionFailed(format!(
                "relation \"{}\" already exists",
                name
            )));
        }

        let parent_keyword = if sql.contains(" PARTITION OF ") {
            Some(" PARTITION OF ")
        } else if sql.contains("INHERITS (") {
            Some("INHERITS (")
        } else {
            None
        };

        let table = if let Some(keyword) = parent_keyword {
            let parent = name_after(sql, keyword)?;
            let dates: Vec<NaiveDate> = literals(sql).iter().filter_map(|l| literal_date(l)).collect();
            let range = match dates.as_slice() {
                [start, end, ..] => (*start, *end),
                _ => return Err(unsupported(sql)),
            };
            MemTable {
                columns: self.table(&parent)?.columns.clone(),
                parent: Some(parent),
                range: Some(range),
                autovacuum: true,
                ..Default::default()
            }
        } else if sql.contains("(LIKE ") {
            let source = self.table(&name_after(sql, "(LIKE ")?)?;
            let including_all = sql.contains("INCLUDING ALL");
            MemTable {
                columns: source.columns.clone(),
                primary_key: if including_all { source.primary_key.clone() } else { Vec::new() },
                index_defs: if including_all { source.index_defs.clone() } else { Vec::new() },
                routed: sql.contains("PARTITION BY RANGE"),
                autovacuum: true,
                ..Default::default()
            }
        } else {
            return Err(unsupported(sql));
        };

        self.tables.insert(name, table);
        Ok(())
    }

    fn alter_table(&mut self, sql: &str, groups: &[Vec<String>]) -> Result<()> {
        let name = name_at(groups, 0, sql)?;
        if sql.contains(" RENAME TO ") {
            let to = name_after(sql, " RENAME TO ")?;
            return self.rename(&name, &to);
        }
        if let Some((_, rest)) = sql.split_once(" ADD PRIMARY KEY ") {
            let columns = identifier_groups(rest)
                .into_iter()
                .filter_map(|g| g.into_iter().next())
                .collect();
            self.table_mut(&name)?.primary_key = columns;
            return Ok(());
        }
        if let Some((_, rest)) = sql.split_once(" ADD ") {
            let definition = rest.trim_end_matches(';').to_string();
            self.table_mut(&name)?.foreign_keys.push(definition);
            return Ok(());
        }
        if sql.contains(" SET (") {
            self.table_mut(&name)?.autovacuum = !sql.contains("autovacuum_enabled = false");
            return Ok(());
        }
        Err(unsupported(sql))
    }

    fn apply(&mut self, sql: &str) -> Result<()> {
        let sql = sql.trim();
        let groups = identifier_groups(sql);

        if sql.starts_with("SET LOCAL") {
            Ok(())
        } else if sql.starts_with("CREATE TABLE") {
            self.create_table(sql, &groups)
        } else if sql.starts_with("ALTER TABLE") {
            self.alter_table(sql, &groups)
        } else if sql.starts_with("ALTER SEQUENCE") {
            let sequence_name = name_at(&groups, 0, sql)?;
            let owner = groups.get(1).ok_or_else(|| unsupported(sql))?;
            let (table, column) = match owner.as_slice() {
                [_, table, column] => (table.clone(), column.clone()),
                _ => return Err(unsupported(sql)),
            };
            self.table(&table)?;
            let sequence = self
                .sequences
                .iter_mut()
                .find(|s| s.name == sequence_name)
                .ok_or_else(|| missing(&sequence_name))?;
            sequence.owner = Some(table);
            sequence.column = column;
            Ok(())
        } else if sql.starts_with("COMMENT ON TABLE") {
            let name = name_at(&groups, 0, sql)?;
            let comment = literals(sql).into_iter().next();
            self.table_mut(&name)?.comment = comment;
            Ok(())
        } else if sql.starts_with("COMMENT ON TRIGGER") {
            let trigger = name_at(&groups, 0, sql)?;
            let name = name_at(&groups, 1, sql)?;
            let comment = literals(sql).into_iter().next().ok_or_else(|| unsupported(sql))?;
            self.table_mut(&name)?.trigger_comments.insert(trigger, comment);
            Ok(())
        } else if sql.starts_with("CREATE OR REPLACE FUNCTION") || sql.starts_with("CREATE FUNCTION") {
            let function = name_at(&groups, 0, sql)?;
            if !self.functions.insert(function.clone()) && !sql.contains("OR REPLACE") {
                return Err(SliceError::PreconditionFailed(format!(
                    "function \"{}\" already exists",
                    function
                )));
            }
            Ok(())
        } else if sql.starts_with("DROP FUNCTION") {
            let function = name_at(&groups, 0, sql)?;
            if !self.functions.remove(&function) && !sql.contains("IF EXISTS") {
                return Err(missing(&function));
            }
            Ok(())
        } else if sql.starts_with("CREATE TRIGGER") {
            let name = name_at(&groups, 1, sql)?;
            if self.views.contains_key(&name) {
                return Ok(());
            }
            let table = self.table_mut(&name)?;
            if sql.contains("BEFORE INSERT") {
                table.routed = true;
            }
            Ok(())
        } else if sql.starts_with("CREATE VIEW") {
            let name = name_at(&groups, 0, sql)?;
            if self.relation_exists(&name) {
                return Err(SliceError::PreconditionFailed(format!(
                    "relation \"{}\" already exists",
                    name
                )));
            }
            let live = name_at(&groups, 1, sql)?;
            let retired = name_at(&groups, 2, sql)?;
            self.table(&live)?;
            self.table(&retired)?;
            self.views.insert(name, MemView { live, retired });
            Ok(())
        } else if sql.starts_with("DROP VIEW") {
            let name = name_at(&groups, 0, sql)?;
            self.views.remove(&name).map(|_| ()).ok_or_else(|| missing(&name))
        } else if sql.starts_with("DROP TABLE") {
            let name = name_at(&groups, 0, sql)?;
            if !self.tables.contains_key(&name) && !sql.contains("IF EXISTS") {
                return Err(missing(&name));
            }
            self.drop_table(&name);
            Ok(())
        } else if sql.starts_with("CREATE INDEX") || sql.starts_with("CREATE UNIQUE INDEX") {
            let name = name_after(sql, " ON ")?;
            self.table_mut(&name)?.index_defs.push(sql.trim_end_matches(';').to_string());
            Ok(())
        } else if sql.starts_with("ANALYZE") {
            let name = name_at(&groups, 0, sql)?;
            self.table(&name)?;
            self.analyzed.push(name);
            Ok(())
        } else {
            Err(unsupported(sql))
        }
    }
}

/// Catalog + StatementRunner 를 구현하는 테스트용 데이터베이스
///
/// 테이블은 이름만으로 구분하며 기본 컬럼은 "Id"(bigint), "UserId"(integer),
/// "createdAt"(timestamp) 이다. 행은 (키, 라우팅 날짜) 쌍으로만 저장한다.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    state: State,
    logged: Vec<String>,
    copied: Vec<(i64, i64)>,
    lock_contention: bool,
    server_version_num: i32,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self {
            server_version_num: 150000,
            ..Default::default()
        }
    }

    pub fn create_table(&mut self, name: &str) {
        self.state.tables.insert(
            name.to_string(),
            MemTable {
                columns: vec![
                    ("Id".into(), "bigint".into()),
                    ("UserId".into(), "integer".into()),
                    ("createdAt".into(), "timestamp without time zone".into()),
                ],
                primary_key: vec!["Id".into()],
                autovacuum: true,
                ..Default::default()
            },
        );
    }

    pub fn create_view(&mut self, name: &str, live: &str, retired: &str) {
        self.state.views.insert(
            name.to_string(),
            MemView {
                live: live.to_string(),
                retired: retired.to_string(),
            },
        );
    }

    pub fn create_sequence(&mut self, name: &str, owner: &str, column: &str) {
        self.state.sequences.push(MemSequence {
            name: name.to_string(),
            owner: Some(owner.to_string()),
            column: column.to_string(),
        });
    }

    pub fn set_column_type(&mut self, table: &str, column: &str, data_type: &str) {
        if let Some(table) = self.state.tables.get_mut(table) {
            match table.columns.iter_mut().find(|(c, _)| c == column) {
                Some(entry) => entry.1 = data_type.to_string(),
                None => table.columns.push((column.to_string(), data_type.to_string())),
            }
        }
    }

    pub fn add_index(&mut self, table: &str, definition: &str) {
        if let Some(table) = self.state.tables.get_mut(table) {
            table.index_defs.push(definition.to_string());
        }
    }

    pub fn add_foreign_key(&mut self, table: &str, definition: &str) {
        if let Some(table) = self.state.tables.get_mut(table) {
            table.foreign_keys.push(definition.to_string());
        }
    }

    pub fn set_server_version_num(&mut self, version: i32) {
        self.server_version_num = version;
    }

    /// 이후 lock_timeout 이 걸린 트랜잭션의 ALTER/DROP 이 잠금을 얻지 못한다
    pub fn block_locks(&mut self) {
        self.lock_contention = true;
    }

    /// 파티션/트리거 라우팅을 거쳐 행 삽입
    pub fn insert_rows<I>(&mut self, table: &str, rows: I)
    where
        I: IntoIterator<Item = Row>,
    {
        for row in rows {
            if let Err(e) = self.state.insert_row(table, row) {
                panic!("insert into {} failed: {}", table, e);
            }
        }
    }

    pub fn keys(&self, table: &str) -> Vec<i64> {
        self.state
            .all_rows(table)
            .unwrap_or_default()
            .into_iter()
            .map(|(key, _)| key)
            .collect()
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.keys(table).len()
    }

    /// 상속 자식을 제외한 테이블 자체의 행 수 (SELECT ... FROM ONLY)
    pub fn own_row_count(&self, table: &str) -> usize {
        self.state.tables.get(table).map_or(0, |t| t.rows.len())
    }

    pub fn duplicate_keys(&self, table: &str) -> usize {
        let keys = self.keys(table);
        let unique: BTreeSet<i64> = keys.iter().copied().collect();
        keys.len() - unique.len()
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.state.tables.contains_key(name)
    }

    pub fn has_view(&self, name: &str) -> bool {
        self.state.views.contains_key(name)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.state.functions.contains(name)
    }

    pub fn children(&self, name: &str) -> Vec<String> {
        self.state.children(name)
    }

    pub fn primary_key_of(&self, name: &str) -> Vec<String> {
        self.state
            .tables
            .get(name)
            .map(|t| t.primary_key.clone())
            .unwrap_or_default()
    }

    pub fn indexes_of(&self, name: &str) -> Vec<String> {
        self.state
            .tables
            .get(name)
            .map(|t| t.index_defs.clone())
            .unwrap_or_default()
    }

    pub fn autovacuum_enabled(&self, name: &str) -> bool {
        self.state.tables.get(name).map_or(false, |t| t.autovacuum)
    }

    pub fn sequence_owner(&self, name: &str) -> Option<String> {
        self.state
            .sequences
            .iter()
            .find(|s| s.name == name)
            .and_then(|s| s.owner.clone())
    }

    pub fn analyzed(&self) -> Vec<String> {
        self.state.analyzed.clone()
    }

    pub fn copied_ranges(&self) -> Vec<(i64, i64)> {
        self.copied.clone()
    }

    pub fn logged(&self) -> Vec<String> {
        self.logged.clone()
    }

    fn keyed_rows(
        &self,
        table: &Table,
        filter: Option<&str>,
        window: Option<&PeriodWindow>,
    ) -> Result<Vec<Row>> {
        let conditions = filter.map(key_conditions).transpose()?.unwrap_or_default();
        Ok(self
            .state
            .all_rows(&table.name)?
            .into_iter()
            .filter(|(_, date)| window.map_or(true, |w| (w.start..w.end).contains(date)))
            .filter(|(key, _)| conditions.iter().all(|c| c.matches(*key)))
            .collect())
    }
}

#[async_trait]
impl Catalog for MemoryDatabase {
    async fn table_exists(&self, table: &Table) -> Result<bool> {
        Ok(self.state.tables.contains_key(&table.name))
    }

    async fn view_exists(&self, table: &Table) -> Result<bool> {
        Ok(self.state.views.contains_key(&table.name))
    }

    async fn partitions(&self, table: &Table) -> Result<Vec<Table>> {
        Ok(self
            .state
            .children(&table.name)
            .into_iter()
            .map(|name| Table::new(&table.schema, name))
            .collect())
    }

    async fn primary_key(&self, table: &Table) -> Result<Vec<String>> {
        Ok(self.state.table(&table.name)?.primary_key.clone())
    }

    async fn index_defs(&self, table: &Table) -> Result<Vec<String>> {
        Ok(self.state.table(&table.name)?.index_defs.clone())
    }

    async fn foreign_keys(&self, table: &Table) -> Result<Vec<String>> {
        Ok(self.state.table(&table.name)?.foreign_keys.clone())
    }

    async fn sequences(&self, table: &Table) -> Result<Vec<Sequence>> {
        Ok(self
            .state
            .sequences
            .iter()
            .filter(|s| s.owner.as_deref() == Some(table.name.as_str()))
            .map(|s| Sequence {
                schema: table.schema.clone(),
                name: s.name.clone(),
                column: s.column.clone(),
            })
            .collect())
    }

    async fn columns(&self, table: &Table) -> Result<Vec<String>> {
        Ok(self
            .state
            .table(&table.name)?
            .columns
            .iter()
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn column_type(&self, table: &Table, column: &str) -> Result<Option<String>> {
        Ok(self
            .state
            .tables
            .get(&table.name)
            .and_then(|t| t.columns.iter().find(|(c, _)| c == column))
            .map(|(_, data_type)| data_type.clone()))
    }

    async fn max_id(
        &self,
        table: &Table,
        _primary_key: &str,
        filter: Option<&str>,
        below: Option<i64>,
    ) -> Result<i64> {
        Ok(self
            .keyed_rows(table, filter, None)?
            .into_iter()
            .map(|(key, _)| key)
            .filter(|key| below.map_or(true, |b| *key <= b))
            .max()
            .unwrap_or(0))
    }

    async fn min_id(
        &self,
        table: &Table,
        _primary_key: &str,
        window: Option<&PeriodWindow>,
        filter: Option<&str>,
    ) -> Result<Option<i64>> {
        Ok(self
            .keyed_rows(table, filter, window)?
            .into_iter()
            .map(|(key, _)| key)
            .min())
    }

    async fn fetch_settings(
        &self,
        table: &Table,
        trigger_name: &str,
    ) -> Result<Option<PartitionSettings>> {
        let Some(mem) = self.state.tables.get(&table.name) else {
            return Ok(None);
        };
        if let Some(comment) = mem.trigger_comments.get(trigger_name) {
            return Ok(PartitionSettings::from_comment(comment, true));
        }
        Ok(mem
            .comment
            .as_deref()
            .and_then(|c| PartitionSettings::from_comment(c, false)))
    }

    async fn server_version_num(&self) -> Result<i32> {
        Ok(self.server_version_num)
    }
}

#[async_trait]
impl StatementRunner for MemoryDatabase {
    async fn run_queries(&mut self, queries: &[String], lock_timeout: Option<&str>) -> Result<()> {
        let mut staged = self.state.clone();
        for query in queries {
            self.logged.push(query.clone());
            if let Some(timeout) = lock_timeout {
                let takes_lock = query.starts_with("ALTER TABLE") || query.starts_with("DROP VIEW");
                if self.lock_contention && takes_lock {
                    return Err(SliceError::LockTimeout {
                        timeout: timeout.to_string(),
                    });
                }
            }
            staged.apply(query)?;
        }
        self.state = staged;
        Ok(())
    }

    async fn run_queries_without_transaction(&mut self, queries: &[String]) -> Result<()> {
        for query in queries {
            self.logged.push(query.clone());
            self.state.apply(query)?;
        }
        Ok(())
    }

    async fn run_query(&mut self, query: &str) -> Result<u64> {
        self.logged.push(query.to_string());
        self.state.apply(query)?;
        Ok(0)
    }

    async fn run_count(&mut self, query: &str) -> Result<i64> {
        Err(unsupported(query))
    }

    fn log_sql(&mut self, sql: &str) {
        self.logged.push(sql.to_string());
    }

    async fn copy_batch(&mut self, batch: &FillBatch<'_>) -> Result<u64> {
        self.logged.push(batch.to_sql());
        let (lower, upper) = (batch.lower, batch.upper());
        let rows: Vec<Row> = self
            .keyed_rows(
                &batch.target.source,
                batch.cursor.filter.as_deref(),
                batch.cursor.window.as_ref(),
            )?
            .into_iter()
            .filter(|(key, _)| *key > lower && *key <= upper)
            .collect();
        for row in &rows {
            self.state.insert_row(&batch.target.destination.name, *row)?;
        }
        self.copied.push((lower, upper));
        Ok(rows.len() as u64)
    }

    async fn replicate_batch(&mut self, step: &ViewReplication) -> Result<i64> {
        self.logged.push(step.to_sql());
        let view = self
            .state
            .views
            .get(&step.view.name)
            .cloned()
            .ok_or_else(|| missing(&step.view.name))?;
        let source = self.state.table_mut(&step.source.name)?;
        let take = (step.limit.max(0) as usize).min(source.rows.len());
        let moved: Vec<Row> = source.rows.drain(..take).collect();
        for row in &moved {
            self.state.insert_row(&view.live, *row)?;
        }
        Ok(moved.len() as i64)
    }
}
