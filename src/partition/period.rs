use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};

use crate::error::SliceError;

/// 파티션 주기
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Period {
    Day,
    Month,
    Year,
}

impl Period {
    /// 설정 코멘트에 저장되는 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Month => "month",
            Period::Year => "year",
        }
    }

    /// 파티션 이름 접미사 형식
    pub fn name_format(&self) -> &'static str {
        match self {
            Period::Day => "%Y%m%d",
            Period::Month => "%Y%m",
            Period::Year => "%Y",
        }
    }

    /// 파티션 이름 접미사 길이
    pub fn suffix_len(&self) -> usize {
        match self {
            Period::Day => 8,
            Period::Month => 6,
            Period::Year => 4,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = SliceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Period::Day),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            other => Err(SliceError::Usage(format!("Invalid period: {}", other))),
        }
    }
}

/// 타임스탬프를 주기 경계로 내림 (UTC)
pub fn round_down(timestamp: DateTime<Utc>, period: Period) -> NaiveDate {
    round_date(timestamp.date_naive(), period)
}

/// 날짜를 주기 경계로 내림
pub fn round_date(date: NaiveDate, period: Period) -> NaiveDate {
    let rounded = match period {
        Period::Day => Some(date),
        Period::Month => date.with_day(1),
        Period::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1),
    };
    rounded.unwrap_or(date)
}

/// 경계를 n 주기만큼 이동 (음수 가능)
pub fn advance_date(date: NaiveDate, period: Period, n: i32) -> NaiveDate {
    let advanced = match period {
        Period::Day => date.checked_add_signed(Duration::days(n as i64)),
        Period::Month => shift_months(date, n),
        Period::Year => shift_months(date, n.saturating_mul(12)),
    };
    advanced.unwrap_or(date)
}

fn shift_months(date: NaiveDate, n: i32) -> Option<NaiveDate> {
    let months = Months::new(n.unsigned_abs());
    if n >= 0 {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    }
}
