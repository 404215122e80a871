use std::fmt;

use chrono::NaiveDate;
use log::warn;

use super::period::Period;
use crate::constants::{
    DEFAULT_SCHEMA, INTERMEDIATE_SUFFIX, RETIRED_SUFFIX, TRIGGER_SUFFIX, VIEW_TRIGGER_SUFFIX,
};
use crate::error::{Result, SliceError};

/// 스키마 + 이름으로 식별되는 테이블
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Table {
    pub schema: String,
    pub name: String,
}

impl Table {
    pub fn new<S: Into<String>, N: Into<String>>(schema: S, name: N) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// "schema.name" 또는 "name" 형식 해석
    pub fn parse(qualified: &str) -> Self {
        match qualified.split_once('.') {
            Some((schema, name)) => Self::new(schema, name),
            None => Self::new(DEFAULT_SCHEMA, qualified),
        }
    }

    pub fn intermediate_table(&self) -> Table {
        Table::new(&self.schema, format!("{}{}", self.name, INTERMEDIATE_SUFFIX))
    }

    pub fn retired_table(&self) -> Table {
        Table::new(&self.schema, format!("{}{}", self.name, RETIRED_SUFFIX))
    }

    /// 라우팅 트리거(및 함수) 이름
    pub fn trigger_name(&self) -> String {
        format!("{}{}", self.name, TRIGGER_SUFFIX)
    }

    /// 뷰 INSTEAD OF 트리거 함수 이름
    pub fn view_trigger_name(&self) -> String {
        format!("{}{}", self.name, VIEW_TRIGGER_SUFFIX)
    }

    /// 이 테이블 이름을 기반으로 한 파티션
    pub fn partition(&self, period: Period, boundary: NaiveDate) -> Table {
        Table::new(&self.schema, partition_name(&self.name, period, boundary))
    }

    /// 스키마 포함 인용 이름
    pub fn quoted(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.name))
    }

    /// 스키마 없는 인용 이름 (RENAME TO 대상)
    pub fn quoted_name(&self) -> String {
        quote_ident(&self.name)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// SQL 식별자 인용
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// SQL 문자열 리터럴 인용
pub fn escape_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// 파티션 이름 생성: base_YYYYMMDD / base_YYYYMM / base_YYYY
pub fn partition_name(base: &str, period: Period, boundary: NaiveDate) -> String {
    format!("{}_{}", base, boundary.format(period.name_format()))
}

/// 파티션 이름에서 경계 날짜 추출
pub fn parse_boundary(partition: &str, base: &str, period: Period) -> Result<NaiveDate> {
    let malformed = || SliceError::MalformedPartitionName(partition.to_string());

    let suffix = partition
        .strip_prefix(base)
        .and_then(|rest| rest.strip_prefix('_'))
        .ok_or_else(malformed)?;

    if suffix.len() != period.suffix_len() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    let full = match period {
        Period::Day => suffix.to_string(),
        Period::Month => format!("{}01", suffix),
        Period::Year => format!("{}0101", suffix),
    };

    NaiveDate::parse_from_str(&full, "%Y%m%d").map_err(|_| malformed())
}

/// 이름순 정렬, 중복 제거, 해석 불가 이름은 경고 후 제외
pub fn dated_partitions(
    partitions: &[Table],
    base: &str,
    period: Period,
) -> Vec<(Table, NaiveDate)> {
    let mut sorted: Vec<&Table> = partitions.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    sorted.dedup_by(|a, b| a.name == b.name);

    sorted
        .into_iter()
        .filter_map(|partition| match parse_boundary(&partition.name, base, period) {
            Ok(boundary) => Some((partition.clone(), boundary)),
            Err(e) => {
                warn!("파티션 무시: {}", e);
                None
            }
        })
        .collect()
}
