//! 위험 지표 계산 모듈
//!
//! 포트폴리오 가치 시계열에서 다음 지표를 계산합니다:
//! - 기간 수익률 / 표준편차 / 하방 편차
//! - 최대 낙폭 (Maximum Drawdown)
//! - 샤프 비율 (Sharpe Ratio): 위험 대비 수익률
//! - 소르티노 비율 (Sortino Ratio): 하방 위험 대비 수익률
//! - 칼마 비율 (Calmar Ratio): 최대 낙폭 대비 수익률
//!
//! 통계는 `f64`로 계산합니다. 분모는 [`EPSILON`]으로 보호되며,
//! 정의되지 않는 비율은 내부적으로 `None`이고 공개 헬퍼에서만 0으로 바뀝니다.
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use journal_analytics::performance::RiskMetricsEngine;
//!
//! let summary = RiskMetricsEngine::default().summarize(&series);
//! println!("샤프 비율: {:.2}", summary.sharpe_ratio);
//! println!("최대 낙폭: {:.2}%", summary.max_drawdown * 100.0);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use journal_core::EngineConfig;

use crate::portfolio::ValueSeries;

/// 연간 거래일 수 (연율화 계산에 사용)
///
/// 일반적으로 주식 시장은 연간 약 252일 거래됩니다.
pub const TRADING_DAYS_PER_YEAR: u32 = 252;

/// 기본 무위험 이자율 (연간, 예: 0.05 = 5%)
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.05;

/// 분모가 0으로 간주되는 임계값.
pub const EPSILON: f64 = 1e-9;

/// 낙폭 없이 수익이 난 경우의 칼마 비율.
pub const CALMAR_SENTINEL: f64 = 999.0;

/// 연율화 방식을 결정하는 지표 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// 변동성 계열: `× sqrt(periods)`
    Volatility,
    /// 수익률 계열: `× periods`
    Return,
}

/// 인접한 값 쌍의 단순 수익률.
///
/// 직전 값이 정확히 0이면 해당 구간은 0입니다.
pub fn daily_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|pair| {
            let (prev, curr) = (pair[0], pair[1]);
            if prev == 0.0 {
                0.0
            } else {
                (curr - prev) / prev
            }
        })
        .collect()
}

/// 산술 평균. 비어 있으면 0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// 표본 표준편차 (N−1). 2개 미만이면 0.
pub fn standard_deviation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let avg = mean(values);
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;

    variance.sqrt()
}

/// 최대 낙폭 (비율, 0.25 = 25%).
///
/// 고점이 양수인 동안에만 `(peak − v) / peak`를 계산합니다.
pub fn max_drawdown(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_drawdown = 0.0_f64;

    for &value in values {
        // 새로운 고점 갱신
        if value > peak {
            peak = value;
        }

        if peak > 0.0 {
            let drawdown = (peak - value) / peak;
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
            }
        }
    }

    max_drawdown
}

/// 하방 편차 (모집단, N 분모).
///
/// `target` 이상인 수익률은 0으로 기여합니다.
pub fn downside_deviation(returns: &[f64], target: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }

    let squared_sum: f64 = returns
        .iter()
        .map(|r| (r - target).min(0.0).powi(2))
        .sum();

    (squared_sum / returns.len() as f64).sqrt()
}

/// 기간 지표를 연율화합니다.
pub fn annualize(metric: f64, kind: MetricKind, periods: u32) -> f64 {
    match kind {
        MetricKind::Volatility => metric * (periods as f64).sqrt(),
        MetricKind::Return => metric * periods as f64,
    }
}

/// 샤프 비율. 분모가 ε 이하이면 `None`.
pub fn try_sharpe_ratio(annual_return: f64, risk_free_rate: f64, annual_std: f64) -> Option<f64> {
    if annual_std.abs() <= EPSILON {
        return None;
    }
    Some((annual_return - risk_free_rate) / annual_std)
}

/// 샤프 비율. 정의되지 않으면 0.
pub fn sharpe_ratio(annual_return: f64, risk_free_rate: f64, annual_std: f64) -> f64 {
    try_sharpe_ratio(annual_return, risk_free_rate, annual_std).unwrap_or(0.0)
}

/// 소르티노 비율. 분모가 ε 이하이면 `None`.
pub fn try_sortino_ratio(
    annual_return: f64,
    risk_free_rate: f64,
    annual_downside: f64,
) -> Option<f64> {
    if annual_downside.abs() <= EPSILON {
        return None;
    }
    Some((annual_return - risk_free_rate) / annual_downside)
}

/// 소르티노 비율. 정의되지 않으면 0.
pub fn sortino_ratio(annual_return: f64, risk_free_rate: f64, annual_downside: f64) -> f64 {
    try_sortino_ratio(annual_return, risk_free_rate, annual_downside).unwrap_or(0.0)
}

/// 칼마 비율.
///
/// 낙폭이 ε 이하일 때 수익이 양수면 [`CALMAR_SENTINEL`], 아니면 0.
pub fn calmar_ratio(annual_return: f64, max_drawdown: f64) -> f64 {
    if max_drawdown.abs() <= EPSILON {
        return if annual_return > 0.0 {
            CALMAR_SENTINEL
        } else {
            0.0
        };
    }
    annual_return / max_drawdown
}

/// 위험 지표 요약.
///
/// 수익률과 낙폭은 비율입니다 (0.10 = 10%).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    /// 첫 값 대비 마지막 값의 수익률
    pub total_return: f64,
    /// 연율화 수익률 (평균 기간 수익률 × periods)
    pub annualized_return: f64,
    /// 연율화 변동성
    pub annualized_volatility: f64,
    /// 연율화 하방 편차
    pub downside_deviation: f64,
    /// 최대 낙폭
    pub max_drawdown: f64,
    /// 샤프 비율
    pub sharpe_ratio: f64,
    /// 소르티노 비율
    pub sortino_ratio: f64,
    /// 칼마 비율
    pub calmar_ratio: f64,
    /// 관측치 수 (시계열 포인트 수)
    pub observations: usize,
}

impl RiskSummary {
    /// 한 줄 요약 문자열.
    pub fn summary(&self) -> String {
        format!(
            "Return: {:.2}% | Ann: {:.2}% | Vol: {:.2}% | MDD: {:.2}% | Sharpe: {:.2} | Sortino: {:.2} | Calmar: {:.2}",
            self.total_return * 100.0,
            self.annualized_return * 100.0,
            self.annualized_volatility * 100.0,
            self.max_drawdown * 100.0,
            self.sharpe_ratio,
            self.sortino_ratio,
            self.calmar_ratio,
        )
    }
}

/// 위험 지표 엔진.
#[derive(Debug, Clone, Copy)]
pub struct RiskMetricsEngine {
    risk_free_rate: f64,
    periods_per_year: u32,
}

impl Default for RiskMetricsEngine {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            periods_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

impl RiskMetricsEngine {
    /// 기본 설정 엔진을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 엔진 설정에서 생성합니다.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            risk_free_rate: config.risk_free_rate,
            periods_per_year: config.periods_per_year,
        }
    }

    /// 무위험 이자율을 설정합니다.
    pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    /// 연간 기간 수를 설정합니다.
    pub fn with_periods_per_year(mut self, periods: u32) -> Self {
        self.periods_per_year = periods;
        self
    }

    /// 연 무위험 수익률.
    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// 연간 기간 수.
    pub fn periods_per_year(&self) -> u32 {
        self.periods_per_year
    }

    /// 가치 시계열을 요약합니다.
    pub fn summarize(&self, series: &ValueSeries) -> RiskSummary {
        self.summarize_values(&series.values_f64())
    }

    /// 값 목록을 요약합니다.
    pub fn summarize_values(&self, values: &[f64]) -> RiskSummary {
        if values.is_empty() {
            return RiskSummary::default();
        }

        let returns = daily_returns(values);
        let periods = self.periods_per_year;

        let total_return = match (values.first(), values.last()) {
            (Some(&first), Some(&last)) if first != 0.0 => (last - first) / first,
            _ => 0.0,
        };

        let annualized_return = annualize(mean(&returns), MetricKind::Return, periods);
        let annualized_volatility =
            annualize(standard_deviation(&returns), MetricKind::Volatility, periods);
        let annualized_downside =
            annualize(downside_deviation(&returns, 0.0), MetricKind::Volatility, periods);
        let mdd = max_drawdown(values);

        let summary = RiskSummary {
            total_return,
            annualized_return,
            annualized_volatility,
            downside_deviation: annualized_downside,
            max_drawdown: mdd,
            sharpe_ratio: sharpe_ratio(annualized_return, self.risk_free_rate, annualized_volatility),
            sortino_ratio: sortino_ratio(
                annualized_return,
                self.risk_free_rate,
                annualized_downside,
            ),
            calmar_ratio: calmar_ratio(annualized_return, mdd),
            observations: values.len(),
        };

        debug!(
            observations = summary.observations,
            max_drawdown = summary.max_drawdown,
            sharpe = summary.sharpe_ratio,
            "Risk metrics summarized"
        );

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_max_drawdown() {
        assert!(approx(max_drawdown(&[100.0, 120.0, 90.0, 130.0]), 0.25));
        assert_eq!(max_drawdown(&[]), 0.0);
        assert_eq!(max_drawdown(&[100.0, 110.0, 120.0]), 0.0);
        // 고점이 0 이하인 동안은 낙폭을 계산하지 않음
        assert_eq!(max_drawdown(&[0.0, -10.0, -20.0]), 0.0);
    }

    #[test]
    fn test_daily_returns_zero_prior() {
        let returns = daily_returns(&[100.0, 110.0, 0.0, 50.0]);
        assert_eq!(returns.len(), 3);
        assert!(approx(returns[0], 0.1));
        assert!(approx(returns[1], -1.0));
        assert_eq!(returns[2], 0.0);
        assert!(daily_returns(&[100.0]).is_empty());
    }

    #[test]
    fn test_standard_deviation_sample() {
        assert_eq!(standard_deviation(&[0.01]), 0.0);
        // [1, 2, 3, 4]: 표본 분산 = 5/3
        let std = standard_deviation(&[1.0, 2.0, 3.0, 4.0]);
        assert!(approx(std, (5.0_f64 / 3.0).sqrt()));
    }

    #[test]
    fn test_downside_deviation_population() {
        // 하방 편차: (-0.02)², (-0.04)² / 4
        let returns = [0.01, -0.02, 0.03, -0.04];
        let expected = ((0.0004 + 0.0016) / 4.0_f64).sqrt();
        assert!(approx(downside_deviation(&returns, 0.0), expected));
        assert_eq!(downside_deviation(&[0.01, 0.02], 0.0), 0.0);
        assert_eq!(downside_deviation(&[], 0.0), 0.0);
    }

    #[test]
    fn test_annualize_by_kind() {
        assert!(approx(annualize(0.01, MetricKind::Volatility, 252), 0.01 * 252f64.sqrt()));
        assert!(approx(annualize(0.001, MetricKind::Return, 252), 0.252));
    }

    #[test]
    fn test_ratio_guards() {
        assert_eq!(try_sharpe_ratio(0.2, 0.05, 0.0), None);
        assert_eq!(sharpe_ratio(0.2, 0.05, 0.0), 0.0);
        assert!(approx(sharpe_ratio(0.25, 0.05, 0.1), 2.0));

        assert_eq!(try_sortino_ratio(0.2, 0.05, 1e-12), None);
        assert!(approx(sortino_ratio(0.15, 0.05, 0.05), 2.0));

        assert_eq!(calmar_ratio(0.2, 0.0), CALMAR_SENTINEL);
        assert_eq!(calmar_ratio(-0.1, 0.0), 0.0);
        assert_eq!(calmar_ratio(0.0, 0.0), 0.0);
        assert!(approx(calmar_ratio(0.3, 0.15), 2.0));
    }

    #[test]
    fn test_summarize_values() {
        let engine = RiskMetricsEngine::default().with_risk_free_rate(0.0);
        let summary = engine.summarize_values(&[100.0, 120.0, 90.0, 130.0]);

        assert_eq!(summary.observations, 4);
        assert!(approx(summary.total_return, 0.3));
        assert!(approx(summary.max_drawdown, 0.25));
        assert!(summary.annualized_volatility > 0.0);
        assert!(summary.downside_deviation > 0.0);
        assert!(approx(
            summary.calmar_ratio,
            summary.annualized_return / summary.max_drawdown
        ));
    }

    #[test]
    fn test_summarize_monotonic_series() {
        let summary = RiskMetricsEngine::default().summarize_values(&[100.0, 101.0, 102.0]);

        assert_eq!(summary.max_drawdown, 0.0);
        assert_eq!(summary.downside_deviation, 0.0);
        assert_eq!(summary.sortino_ratio, 0.0);
        assert_eq!(summary.calmar_ratio, CALMAR_SENTINEL);
    }

    #[test]
    fn test_summarize_degenerate() {
        let engine = RiskMetricsEngine::default();
        assert_eq!(engine.summarize_values(&[]), RiskSummary::default());

        let single = engine.summarize_values(&[100.0]);
        assert_eq!(single.observations, 1);
        assert_eq!(single.sharpe_ratio, 0.0);
        assert_eq!(single.calmar_ratio, 0.0);
    }

    #[test]
    fn test_summarize_series() {
        let series: ValueSeries = [
            (Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(), dec!(100)),
            (Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap(), dec!(120)),
            (Utc.with_ymd_and_hms(2023, 1, 3, 0, 0, 0).unwrap(), dec!(90)),
            (Utc.with_ymd_and_hms(2023, 1, 4, 0, 0, 0).unwrap(), dec!(130)),
        ]
        .into_iter()
        .collect();

        let summary = RiskMetricsEngine::default().summarize(&series);
        assert!(approx(summary.max_drawdown, 0.25));
        assert_eq!(summary.observations, 4);
    }

    #[test]
    fn test_from_config() {
        let config = EngineConfig {
            risk_free_rate: 0.03,
            periods_per_year: 365,
            ..EngineConfig::default()
        };
        let engine = RiskMetricsEngine::from_config(&config);
        assert_eq!(engine.risk_free_rate(), 0.03);
        assert_eq!(engine.periods_per_year(), 365);
    }
}
