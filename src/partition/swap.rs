use super::catalog::Sequence;
use super::naming::{escape_literal, quote_ident, Table};
use crate::constants::VIEW_TRIGGER_NAME;

/// 교체 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapMode {
    /// 이름 교체만
    Plain,
    /// 합집합 뷰 + INSTEAD OF 트리거를 거치는 교체
    View,
}

pub fn lock_timeout_statement(lock_timeout: &str) -> String {
    format!("SET LOCAL lock_timeout = {};", escape_literal(lock_timeout))
}

pub fn rename_statement(from: &Table, to: &Table) -> String {
    format!("ALTER TABLE {} RENAME TO {};", from.quoted(), to.quoted_name())
}

/// 시퀀스 소유권을 테이블 컬럼으로 이전
pub fn sequence_owner_statement(sequence: &Sequence, owner: &Table) -> String {
    format!(
        "ALTER SEQUENCE {}.{} OWNED BY {}.{};",
        quote_ident(&sequence.schema),
        quote_ident(&sequence.name),
        owner.quoted(),
        quote_ident(&sequence.column)
    )
}

/// 중간 테이블을 원본 이름으로 승격
///
/// `sequences` 는 교체 전 원본(plain) 또는 보관 테이블(view)이 소유한 시퀀스.
pub fn swap_statements(
    table: &Table,
    mode: SwapMode,
    lock_timeout: &str,
    sequences: &[Sequence],
) -> Vec<String> {
    let intermediate = table.intermediate_table();
    let retired = table.retired_table();

    let mut queries = vec![lock_timeout_statement(lock_timeout)];
    match mode {
        SwapMode::Plain => {
            queries.push(rename_statement(table, &retired));
            queries.push(rename_statement(&intermediate, table));
        }
        SwapMode::View => {
            queries.push(format!("DROP VIEW {} CASCADE;", table.quoted()));
            queries.push(format!("DROP FUNCTION {}();", quote_ident(&table.view_trigger_name())));
            queries.push(rename_statement(&intermediate, table));
        }
    }
    for sequence in sequences {
        queries.push(sequence_owner_statement(sequence, table));
    }
    queries
}

/// 승격을 되돌림
///
/// view 방식에서는 `view_trigger` 에 다시 설치할 트리거 함수 본문을 넘긴다.
pub fn unswap_statements(
    table: &Table,
    mode: SwapMode,
    lock_timeout: &str,
    sequences: &[Sequence],
    view_trigger: Option<&str>,
) -> Vec<String> {
    let intermediate = table.intermediate_table();
    let retired = table.retired_table();

    let mut queries = vec![lock_timeout_statement(lock_timeout)];
    match mode {
        SwapMode::Plain => {
            queries.push(rename_statement(table, &intermediate));
            queries.push(rename_statement(&retired, table));
            for sequence in sequences {
                queries.push(sequence_owner_statement(sequence, table));
            }
        }
        SwapMode::View => {
            queries.push(rename_statement(table, &intermediate));
            if let Some(function) = view_trigger {
                queries.push(function.to_string());
            }
            queries.push(union_view_statement(table));
            queries.push(instead_of_trigger_statement(table));
            for sequence in sequences {
                queries.push(sequence_owner_statement(sequence, &retired));
            }
        }
    }
    queries
}

/// 원본을 보관 테이블로 돌리고 그 자리에 합집합 뷰를 만든다
pub fn view_setup_statements(table: &Table, view_trigger: &str) -> Vec<String> {
    let retired = table.retired_table();
    vec![
        view_trigger.to_string(),
        rename_statement(table, &retired),
        format!(
            "ALTER TABLE {} SET (autovacuum_enabled = false, toast.autovacuum_enabled = false);",
            retired.quoted()
        ),
        union_view_statement(table),
        instead_of_trigger_statement(table),
    ]
}

fn union_view_statement(table: &Table) -> String {
    format!(
        "CREATE VIEW {} AS\n    SELECT * FROM {}\n    UNION ALL\n    SELECT * FROM {};",
        table.quoted(),
        table.intermediate_table().quoted(),
        table.retired_table().quoted()
    )
}

fn instead_of_trigger_statement(table: &Table) -> String {
    format!(
        "CREATE TRIGGER {}\n    INSTEAD OF INSERT OR UPDATE OR DELETE ON {}\n    FOR EACH ROW\n    EXECUTE FUNCTION {}();",
        quote_ident(VIEW_TRIGGER_NAME),
        table.quoted(),
        quote_ident(&table.view_trigger_name())
    )
}
