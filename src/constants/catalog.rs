// 카탈로그 조회 SQL 쿼리
// 테이블 식별자는 ($1 스키마, $2 이름) 또는 인용된 전체 이름($1, to_regclass 용)으로 전달

/// 테이블 존재 여부
pub const TABLE_EXISTS: &str = "
    SELECT EXISTS (
        SELECT 1 FROM pg_catalog.pg_tables
        WHERE schemaname = $1 AND tablename = $2
    )";

/// 뷰 존재 여부
pub const VIEW_EXISTS: &str = "
    SELECT EXISTS (
        SELECT 1 FROM pg_catalog.pg_views
        WHERE schemaname = $1 AND viewname = $2
    )";

/// 자식 테이블 목록 (선언적 파티션 + 상속)
pub const LIST_PARTITIONS: &str = "
    SELECT nmsp_child.nspname::text AS schema, child.relname::text AS name
    FROM pg_inherits
    JOIN pg_class parent ON pg_inherits.inhparent = parent.oid
    JOIN pg_class child ON pg_inherits.inhrelid = child.oid
    JOIN pg_namespace nmsp_parent ON nmsp_parent.oid = parent.relnamespace
    JOIN pg_namespace nmsp_child ON nmsp_child.oid = child.relnamespace
    WHERE nmsp_parent.nspname = $1 AND parent.relname = $2
    ORDER BY child.relname ASC";

/// 기본 키 컬럼 (정의 순서)
pub const PRIMARY_KEY: &str = "
    SELECT pg_attribute.attname::text AS name
    FROM pg_index
    JOIN pg_class ON pg_class.oid = pg_index.indrelid
    JOIN pg_namespace ON pg_namespace.oid = pg_class.relnamespace
    JOIN pg_attribute ON pg_attribute.attrelid = pg_class.oid
        AND pg_attribute.attnum = ANY(pg_index.indkey)
    WHERE pg_namespace.nspname = $1 AND pg_class.relname = $2 AND pg_index.indisprimary
    ORDER BY array_position(pg_index.indkey::int2[], pg_attribute.attnum)";

/// 기본 키 외 인덱스 정의
pub const INDEX_DEFS: &str = "
    SELECT pg_get_indexdef(indexrelid) AS def
    FROM pg_index
    WHERE indrelid = to_regclass($1) AND indisprimary = 'f'";

/// 외래 키 정의
pub const FOREIGN_KEYS: &str = "
    SELECT pg_get_constraintdef(oid) AS def
    FROM pg_constraint
    WHERE contype = 'f' AND conrelid = to_regclass($1)";

/// 테이블 컬럼이 소유한 시퀀스
pub const SEQUENCES: &str = "
    SELECT a.attname::text AS related_column,
        n.nspname::text AS sequence_schema,
        s.relname::text AS sequence_name
    FROM pg_class s
    JOIN pg_depend d ON d.objid = s.oid
    JOIN pg_class t ON d.refobjid = t.oid
    JOIN pg_attribute a ON (d.refobjid, d.refobjsubid) = (a.attrelid, a.attnum)
    JOIN pg_namespace n ON n.oid = s.relnamespace
    JOIN pg_namespace nt ON nt.oid = t.relnamespace
    WHERE s.relkind = 'S' AND nt.nspname = $1 AND t.relname = $2
    ORDER BY s.relname ASC";

/// 복사 대상 컬럼 (생성 컬럼 제외)
pub const COLUMNS: &str = "
    SELECT column_name::text
    FROM information_schema.columns
    WHERE table_schema = $1 AND table_name = $2 AND is_generated = 'NEVER'
    ORDER BY ordinal_position";

/// 컬럼 타입
pub const COLUMN_TYPE: &str = "
    SELECT format_type(atttypid, atttypmod)
    FROM pg_attribute
    WHERE attrelid = to_regclass($1) AND attname = $2 AND NOT attisdropped";

/// 테이블 코멘트
pub const TABLE_COMMENT: &str = "SELECT obj_description(to_regclass($1)) AS comment";

/// 트리거 코멘트
pub const TRIGGER_COMMENT: &str = "
    SELECT obj_description(oid, 'pg_trigger') AS comment
    FROM pg_trigger
    WHERE tgname = $1 AND tgrelid = to_regclass($2)";

/// 서버 버전 번호
pub const SERVER_VERSION_NUM: &str = "SHOW server_version_num";
