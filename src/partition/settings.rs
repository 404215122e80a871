use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use super::period::Period;
use crate::error::SliceError;

/// 라우팅 컬럼 타입에 맞춘 경계값 캐스트
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnCast {
    Date,
    Timestamp,
    Timestamptz,
}

impl ColumnCast {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnCast::Date => "date",
            ColumnCast::Timestamp => "timestamp",
            ColumnCast::Timestamptz => "timestamptz",
        }
    }

    /// format_type() 결과에서 캐스트 결정
    pub fn from_data_type(data_type: &str) -> Self {
        match data_type {
            "timestamp with time zone" => ColumnCast::Timestamptz,
            "timestamp without time zone" => ColumnCast::Timestamp,
            _ => ColumnCast::Date,
        }
    }
}

impl fmt::Display for ColumnCast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnCast {
    type Err = SliceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(ColumnCast::Date),
            "timestamp" => Ok(ColumnCast::Timestamp),
            "timestamptz" => Ok(ColumnCast::Timestamptz),
            other => Err(SliceError::Config(format!("Unknown cast: {}", other))),
        }
    }
}

/// 경계 날짜 SQL 리터럴
///
/// `with_cast` 가 참이면 `'2023-01-01'::date` 처럼 명시적 캐스트를 붙인다.
/// `FOR VALUES` 절은 파티션 키 타입으로 암묵 변환되므로 캐스트 없이 쓴다.
pub fn sql_date(date: NaiveDate, cast: ColumnCast, with_cast: bool) -> String {
    let literal = match cast {
        ColumnCast::Timestamptz => format!("'{} 00:00:00 UTC'", date.format("%Y-%m-%d")),
        _ => format!("'{}'", date.format("%Y-%m-%d")),
    };
    if with_cast {
        format!("{}::{}", literal, cast)
    } else {
        literal
    }
}

/// 대상 데이터베이스 파티셔닝 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionMode {
    /// 상속 + 트리거 라우팅 (version 1)
    TriggerBased,
    /// 선언적 파티셔닝, 인덱스/외래 키 전파 없음 (version 2)
    Declarative,
    /// 선언적 파티셔닝, 인덱스/외래 키 자동 전파 (version 3)
    DeclarativePropagating,
}

impl PartitionMode {
    pub fn from_version(version: u32) -> Self {
        match version {
            0 | 1 => PartitionMode::TriggerBased,
            2 => PartitionMode::Declarative,
            _ => PartitionMode::DeclarativePropagating,
        }
    }

    pub fn is_declarative(&self) -> bool {
        !matches!(self, PartitionMode::TriggerBased)
    }

    /// 파티션마다 인덱스/외래 키를 직접 복제해야 하는지
    pub fn replicates_indexes(&self) -> bool {
        !matches!(self, PartitionMode::DeclarativePropagating)
    }
}

/// 테이블별로 저장된 파티션 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSettings {
    pub period: Period,
    pub column: String,
    pub cast: ColumnCast,
    pub version: u32,
    /// 코멘트를 다시 기록해야 하는지 (cast 누락 등 구버전 형식)
    pub needs_comment: bool,
}

impl PartitionSettings {
    pub fn mode(&self) -> PartitionMode {
        PartitionMode::from_version(self.version)
    }

    pub fn is_declarative(&self) -> bool {
        self.mode().is_declarative()
    }

    /// 테이블 코멘트 형식 (선언적)
    pub fn table_comment(&self) -> String {
        format!(
            "column:{},period:{},cast:{},version:{}",
            self.column, self.period, self.cast, self.version
        )
    }

    /// 트리거 코멘트 형식 (트리거 기반)
    pub fn trigger_comment(&self) -> String {
        format!("column:{},period:{},cast:{}", self.column, self.period, self.cast)
    }

    /// `column:..,period:..,cast:..[,version:..]` 코멘트 해석
    ///
    /// 설정이 아닌 코멘트면 `None`. version 이 없으면 트리거 코멘트는 1,
    /// 테이블 코멘트는 2 로 간주한다.
    pub fn from_comment(comment: &str, from_trigger: bool) -> Option<Self> {
        let mut column = None;
        let mut period = None;
        let mut cast = None;
        let mut version = None;

        for part in comment.split(',') {
            let (key, value) = part.split_once(':')?;
            match key.trim() {
                "column" => column = Some(value.trim().to_string()),
                "period" => period = value.trim().parse::<Period>().ok(),
                "cast" => cast = value.trim().parse::<ColumnCast>().ok(),
                "version" => version = value.trim().parse::<u32>().ok(),
                _ => {}
            }
        }

        let needs_comment = cast.is_none();
        Some(Self {
            period: period?,
            column: column?,
            cast: cast.unwrap_or(ColumnCast::Date),
            version: version.unwrap_or(if from_trigger { 1 } else { 2 }),
            needs_comment,
        })
    }
}
