//! 포트폴리오 가치 시계열
//!
//! 이벤트 날짜마다 기록되는 불규칙 간격의 `timestamp -> value` 곡선입니다.
//!
//! # 주요 기능
//!
//! - 포인트별 고점 대비 낙폭(비율) 추적
//! - 일별/주별/월별/분기별/연간 집계 (기간 마지막 값)
//! - 낙폭 구간 분석 (고점, 저점, 회복)

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use journal_core::{Amount, DecimalExt, JournalError};

/// 시간 프레임 (데이터 집계 단위)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    /// 일별 집계
    Daily,
    /// 주별 집계 (ISO 주차)
    Weekly,
    /// 월별 집계
    Monthly,
    /// 분기별 집계
    Quarterly,
    /// 연간 집계
    Yearly,
}

impl TimeFrame {
    /// 타임스탬프를 기간 키로 변환합니다.
    fn period_key(&self, timestamp: &DateTime<Utc>) -> String {
        let date = timestamp.date_naive();

        match self {
            TimeFrame::Daily => date.format("%Y-%m-%d").to_string(),
            TimeFrame::Weekly => {
                let week = date.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            TimeFrame::Monthly => date.format("%Y-%m").to_string(),
            TimeFrame::Quarterly => format!("{}-Q{}", date.year(), (date.month() - 1) / 3 + 1),
            TimeFrame::Yearly => date.format("%Y").to_string(),
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeFrame::Daily => "daily",
            TimeFrame::Weekly => "weekly",
            TimeFrame::Monthly => "monthly",
            TimeFrame::Quarterly => "quarterly",
            TimeFrame::Yearly => "yearly",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TimeFrame {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" | "1d" => Ok(TimeFrame::Daily),
            "weekly" | "1w" => Ok(TimeFrame::Weekly),
            "monthly" | "1m" => Ok(TimeFrame::Monthly),
            "quarterly" | "1q" => Ok(TimeFrame::Quarterly),
            "yearly" | "1y" => Ok(TimeFrame::Yearly),
            _ => Err(JournalError::InvalidInput(format!("Unknown time frame: {}", s))),
        }
    }
}

/// 가치 곡선의 데이터 포인트
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuePoint {
    /// 타임스탬프 (자정 UTC)
    pub timestamp: DateTime<Utc>,

    /// 포트폴리오 가치
    pub value: Amount,

    /// 고점 대비 낙폭 (비율, 0 = 고점)
    pub drawdown: Decimal,
}

/// 포트폴리오 가치 시계열
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSeries {
    /// 시계열 데이터 포인트 (시간순 정렬)
    points: Vec<ValuePoint>,

    /// 현재까지의 고점
    peak_value: Decimal,

    /// 최대 낙폭 (비율)
    max_drawdown: Decimal,
}

impl ValueSeries {
    /// 빈 시계열을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 모든 데이터 포인트를 반환합니다.
    pub fn points(&self) -> &[ValuePoint] {
        &self.points
    }

    /// 첫 포인트의 가치 (비어 있으면 0).
    pub fn initial_value(&self) -> Amount {
        self.points.first().map(|p| p.value).unwrap_or(Decimal::ZERO)
    }

    /// 마지막 포인트의 가치 (비어 있으면 0).
    pub fn current_value(&self) -> Amount {
        self.points.last().map(|p| p.value).unwrap_or(Decimal::ZERO)
    }

    /// 고점 가치.
    pub fn peak_value(&self) -> Amount {
        self.peak_value
    }

    /// 최대 낙폭 (비율).
    pub fn max_drawdown(&self) -> Decimal {
        self.max_drawdown
    }

    /// 첫 포인트 대비 총 수익률 (비율). 첫 값이 0 이하이면 0.
    pub fn total_return(&self) -> Decimal {
        let initial = self.initial_value();
        if initial <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (self.current_value() - initial) / initial
    }

    /// 데이터 포인트 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 데이터가 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 새 포인트를 추가합니다.
    ///
    /// 낙폭은 고점이 양수일 때만 계산합니다.
    pub fn add_point(&mut self, timestamp: DateTime<Utc>, value: Amount) {
        if self.points.is_empty() || value > self.peak_value {
            self.peak_value = value;
        }

        let drawdown = if self.peak_value > Decimal::ZERO {
            (self.peak_value - value) / self.peak_value
        } else {
            Decimal::ZERO
        };

        if drawdown > self.max_drawdown {
            self.max_drawdown = drawdown;
        }

        self.points.push(ValuePoint {
            timestamp,
            value,
            drawdown,
        });
    }

    /// 가치 목록.
    pub fn values(&self) -> Vec<Amount> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// 통계 계산용 `f64` 가치 목록.
    pub fn values_f64(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value.to_f64_lossy()).collect()
    }

    /// `timestamp -> value` 맵.
    pub fn to_map(&self) -> BTreeMap<DateTime<Utc>, Amount> {
        self.points.iter().map(|p| (p.timestamp, p.value)).collect()
    }

    /// (타임스탬프, 낙폭) 시계열.
    pub fn drawdown_series(&self) -> Vec<(DateTime<Utc>, Decimal)> {
        self.points
            .iter()
            .map(|p| (p.timestamp, p.drawdown))
            .collect()
    }

    /// 시간 프레임별로 집계합니다 (각 기간의 마지막 값).
    pub fn aggregate(&self, timeframe: TimeFrame) -> ValueSeries {
        let mut grouped: BTreeMap<String, &ValuePoint> = BTreeMap::new();
        for point in &self.points {
            grouped.insert(timeframe.period_key(&point.timestamp), point);
        }

        let mut aggregated = ValueSeries::new();
        for point in grouped.values() {
            aggregated.add_point(point.timestamp, point.value);
        }
        aggregated
    }
}

impl FromIterator<(DateTime<Utc>, Amount)> for ValueSeries {
    fn from_iter<I: IntoIterator<Item = (DateTime<Utc>, Amount)>>(iter: I) -> Self {
        let mut series = ValueSeries::new();
        for (timestamp, value) in iter {
            series.add_point(timestamp, value);
        }
        series
    }
}

/// 낙폭 구간 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawdownPeriod {
    /// 낙폭 시작 시점 (고점)
    pub start: DateTime<Utc>,

    /// 회복 시점, 미회복시 None
    pub end: Option<DateTime<Utc>>,

    /// 최저점 시점
    pub trough: DateTime<Utc>,

    /// 구간 최대 낙폭 (비율)
    pub max_drawdown: Decimal,

    /// 고점 가치
    pub peak_value: Amount,

    /// 최저점 가치
    pub trough_value: Amount,

    /// 고점부터 회복(또는 마지막 포인트)까지 일수
    pub duration_days: i64,

    /// 저점부터 회복까지 일수, 미회복시 None
    pub recovery_days: Option<i64>,
}

impl ValueSeries {
    /// 모든 낙폭 구간을 분석합니다.
    ///
    /// 구간 최대 낙폭 내림차순으로 정렬하며, 고점이 0 이하인 구간은 제외합니다.
    pub fn analyze_drawdowns(&self) -> Vec<DrawdownPeriod> {
        let Some(first) = self.points.first() else {
            return Vec::new();
        };

        let mut periods = Vec::new();
        let mut peak = first.value;
        let mut peak_time = first.timestamp;
        let mut trough = peak;
        let mut trough_time = peak_time;
        let mut in_drawdown = false;

        for point in &self.points {
            if point.value >= peak {
                if in_drawdown && peak > Decimal::ZERO {
                    periods.push(DrawdownPeriod {
                        start: peak_time,
                        end: Some(point.timestamp),
                        trough: trough_time,
                        max_drawdown: (peak - trough) / peak,
                        peak_value: peak,
                        trough_value: trough,
                        duration_days: (point.timestamp - peak_time).num_days(),
                        recovery_days: Some((point.timestamp - trough_time).num_days()),
                    });
                }

                in_drawdown = false;
                peak = point.value;
                peak_time = point.timestamp;
                trough = peak;
                trough_time = peak_time;
            } else {
                in_drawdown = true;
                if point.value < trough {
                    trough = point.value;
                    trough_time = point.timestamp;
                }
            }
        }

        // 진행 중인 낙폭
        if in_drawdown && peak > Decimal::ZERO {
            let last_time = self.points.last().map(|p| p.timestamp).unwrap_or(peak_time);
            periods.push(DrawdownPeriod {
                start: peak_time,
                end: None,
                trough: trough_time,
                max_drawdown: (peak - trough) / peak,
                peak_value: peak,
                trough_value: trough,
                duration_days: (last_time - peak_time).num_days(),
                recovery_days: None,
            });
        }

        periods.sort_by(|a, b| b.max_drawdown.cmp(&a.max_drawdown));
        periods
    }

    /// 상위 N개 낙폭 구간을 반환합니다.
    pub fn top_drawdowns(&self, n: usize) -> Vec<DrawdownPeriod> {
        self.analyze_drawdowns().into_iter().take(n).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use journal_core::midnight_utc;
    use rust_decimal_macros::dec;

    fn base_time() -> DateTime<Utc> {
        midnight_utc(NaiveDate::from_ymd_opt(2023, 1, 2).unwrap())
    }

    fn create_test_series() -> ValueSeries {
        let t = base_time();
        // 상승 → 하락 → 회복 → 하락(미회복)
        [
            (0, dec!(100)),
            (5, dec!(120)),
            (10, dec!(90)),
            (20, dec!(130)),
            (40, dec!(117)),
        ]
        .into_iter()
        .map(|(d, v)| (t + Duration::days(d), v))
        .collect()
    }

    #[test]
    fn test_series_basic() {
        let series = create_test_series();

        assert_eq!(series.len(), 5);
        assert_eq!(series.initial_value(), dec!(100));
        assert_eq!(series.current_value(), dec!(117));
        assert_eq!(series.peak_value(), dec!(130));
        assert_eq!(series.total_return(), dec!(0.17));
    }

    #[test]
    fn test_max_drawdown_fraction() {
        let series = create_test_series();
        assert_eq!(series.max_drawdown(), dec!(0.25));

        let drawdowns = series.drawdown_series();
        assert_eq!(drawdowns[0].1, Decimal::ZERO);
        assert_eq!(drawdowns[2].1, dec!(0.25));
        assert_eq!(drawdowns[3].1, Decimal::ZERO);
    }

    #[test]
    fn test_analyze_drawdowns() {
        let series = create_test_series();
        let periods = series.analyze_drawdowns();

        assert_eq!(periods.len(), 2);

        let largest = &periods[0];
        assert_eq!(largest.max_drawdown, dec!(0.25));
        assert_eq!(largest.peak_value, dec!(120));
        assert_eq!(largest.trough_value, dec!(90));
        assert_eq!(largest.duration_days, 15);
        assert_eq!(largest.recovery_days, Some(10));

        let open = &periods[1];
        assert_eq!(open.max_drawdown, dec!(0.1));
        assert!(open.end.is_none());
        assert_eq!(series.top_drawdowns(1).len(), 1);
    }

    #[test]
    fn test_aggregate_monthly_keeps_last_value() {
        let t = base_time();
        let series: ValueSeries = (0..60)
            .map(|i| (t + Duration::days(i), dec!(1000) + Decimal::from(i)))
            .collect();

        let monthly = series.aggregate(TimeFrame::Monthly);
        // 2023-01-02 ~ 2023-03-02
        assert_eq!(monthly.len(), 3);
        assert_eq!(monthly.points()[0].value, dec!(1029));
        assert_eq!(monthly.current_value(), series.current_value());
    }

    #[test]
    fn test_non_positive_peak_has_no_drawdown() {
        let t = base_time();
        let series: ValueSeries = [(0, dec!(-50)), (1, dec!(-80)), (2, Decimal::ZERO)]
            .into_iter()
            .map(|(d, v)| (t + Duration::days(d), v))
            .collect();

        assert_eq!(series.max_drawdown(), Decimal::ZERO);
        assert!(series.analyze_drawdowns().is_empty());
        assert_eq!(series.total_return(), Decimal::ZERO);
    }

    #[test]
    fn test_timeframe_parse() {
        assert_eq!("monthly".parse::<TimeFrame>().unwrap(), TimeFrame::Monthly);
        assert_eq!("1w".parse::<TimeFrame>().unwrap(), TimeFrame::Weekly);
        assert!("hourly".parse::<TimeFrame>().is_err());
        assert_eq!(TimeFrame::Quarterly.to_string(), "quarterly");
    }

    #[test]
    fn test_empty_series() {
        let series = ValueSeries::new();
        assert!(series.is_empty());
        assert_eq!(series.current_value(), Decimal::ZERO);
        assert!(series.analyze_drawdowns().is_empty());
        assert!(series.aggregate(TimeFrame::Daily).is_empty());
    }
}
