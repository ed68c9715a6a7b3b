//! 월 단위 기간 타입.
//!
//! 자본 원장과 월별 포트폴리오 집계는 `YearMonth`를 축으로 정렬/순회합니다.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::JournalError;

/// 연-월 키 (월은 1~12).
///
/// 필드 선언 순서(연도 → 월) 덕분에 파생된 `Ord`가 시간 순서와 일치합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    /// 연도
    pub year: i32,
    /// 월 (1-12)
    pub month: u32,
}

impl YearMonth {
    /// 새 연-월을 생성합니다. 월이 범위를 벗어나면 `None`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// 날짜가 속한 연-월을 반환합니다.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// 타임스탬프가 속한 연-월을 반환합니다 (UTC 기준).
    pub fn from_timestamp(timestamp: DateTime<Utc>) -> Self {
        Self::from_date(timestamp.date_naive())
    }

    /// 다음 달. 연도가 `i32` 범위를 넘으면 `None`.
    pub fn next(self) -> Option<Self> {
        if self.month == 12 {
            self.year.checked_add(1).map(|year| Self { year, month: 1 })
        } else {
            Some(Self {
                year: self.year,
                month: self.month + 1,
            })
        }
    }

    /// 이전 달. 연도가 `i32` 범위를 넘으면 `None`.
    pub fn prev(self) -> Option<Self> {
        if self.month == 1 {
            self.year.checked_sub(1).map(|year| Self { year, month: 12 })
        } else {
            Some(Self {
                year: self.year,
                month: self.month - 1,
            })
        }
    }

    /// 1월인지 확인합니다.
    pub fn is_january(&self) -> bool {
        self.month == 1
    }

    /// 해당 월의 1일.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// 해당 월의 말일.
    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .and_then(|next| next.first_day().pred_opt())
            .unwrap_or_else(|| self.first_day())
    }

    /// 해당 월 1일 자정(UTC) 타임스탬프.
    pub fn start_timestamp(&self) -> DateTime<Utc> {
        midnight_utc(self.first_day())
    }

    /// 영문 월 약어 (예: "Mar").
    pub fn month_abbrev(&self) -> &'static str {
        const NAMES: [&str; 12] = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ];
        NAMES[(self.month.clamp(1, 12) - 1) as usize]
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = JournalError;

    /// `YYYY-MM` 형식을 파싱합니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| JournalError::InvalidInput(format!("Invalid year-month: {}", s)))?;

        let year: i32 = year
            .parse()
            .map_err(|_| JournalError::InvalidInput(format!("Invalid year: {}", s)))?;
        let month: u32 = month
            .parse()
            .map_err(|_| JournalError::InvalidInput(format!("Invalid month: {}", s)))?;

        YearMonth::new(year, month)
            .ok_or_else(|| JournalError::InvalidInput(format!("Month out of range: {}", s)))
    }
}

/// 날짜를 자정(UTC) 타임스탬프로 정규화합니다.
pub fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_month_navigation() {
        let dec = YearMonth::new(2023, 12).unwrap();
        assert_eq!(dec.next(), YearMonth::new(2024, 1));
        assert_eq!(dec.next().and_then(YearMonth::prev), Some(dec));
        assert!(YearMonth::new(2023, 13).is_none());
    }

    #[test]
    fn test_last_day() {
        let feb = YearMonth::new(2024, 2).unwrap();
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let dec = YearMonth::new(2023, 12).unwrap();
        assert_eq!(dec.last_day(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_year_month_ordering() {
        let a = YearMonth::new(2023, 11).unwrap();
        let b = YearMonth::new(2024, 2).unwrap();
        assert!(a < b);
        assert!(YearMonth::new(2023, 12).unwrap() < YearMonth::new(2024, 1).unwrap());
    }

    #[test]
    fn test_year_month_bounds() {
        let last = YearMonth::new(i32::MAX, 12).unwrap();
        assert!(last.next().is_none());
        assert_eq!(last.prev(), YearMonth::new(i32::MAX, 11));
        assert_eq!(last.last_day(), last.first_day());

        let first = YearMonth::new(i32::MIN, 1).unwrap();
        assert!(first.prev().is_none());
    }

    #[test]
    fn test_year_month_parse_display() {
        let ym: YearMonth = "2023-03".parse().unwrap();
        assert_eq!(ym.to_string(), "2023-03");
        assert_eq!(ym.month_abbrev(), "Mar");
        assert!("2023-00".parse::<YearMonth>().is_err());
        assert!("march".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_midnight_normalization() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 10).unwrap();
        let ts = midnight_utc(date);
        assert_eq!(ts.date_naive(), date);
        assert_eq!(ts.timestamp() % 86_400, 0);
    }
}
