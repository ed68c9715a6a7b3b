//! 포트폴리오 입력 스냅샷.
//!
//! 외부 저장소가 넘겨주는 불변 입력 묶음입니다. 엔진은 이 구조체를 읽기만 합니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::capital::{CapitalBaselines, CapitalChange, MonthlyCapitalOverride, YearlyStartingCapital};
use super::trade::JournalTrade;
use crate::error::{JournalError, JournalResult};

/// 거래 + 입출금 + 자본 기준 스냅샷.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    /// 거래 목록
    #[serde(default)]
    pub trades: Vec<JournalTrade>,
    /// 입출금 목록
    #[serde(default)]
    pub capital_changes: Vec<CapitalChange>,
    /// 연간 시작 자본
    #[serde(default)]
    pub yearly_capital: Vec<YearlyStartingCapital>,
    /// 월간 시작 자본 오버라이드
    #[serde(default)]
    pub monthly_overrides: Vec<MonthlyCapitalOverride>,
}

impl PortfolioSnapshot {
    /// JSON 문자열에서 스냅샷을 파싱합니다.
    pub fn from_json_str(json: &str) -> JournalResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// JSON 파일에서 스냅샷을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> JournalResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(JournalError::Io(format!(
                "Snapshot file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let snapshot = Self::from_json_str(&content)?;

        tracing::debug!(
            path = %path.display(),
            trades = snapshot.trades.len(),
            capital_changes = snapshot.capital_changes.len(),
            "Loaded portfolio snapshot"
        );

        Ok(snapshot)
    }

    /// 자본 기준 인덱스.
    pub fn baselines(&self) -> CapitalBaselines {
        CapitalBaselines::from_entries(&self.yearly_capital, &self.monthly_overrides)
    }

    /// 모든 거래의 불변식을 검증하고 위반 목록을 반환합니다.
    ///
    /// 엔진은 위반이 있어도 계산을 계속하므로 호출자가 경고 표시 용도로 사용합니다.
    pub fn validation_errors(&self) -> Vec<JournalError> {
        self.trades
            .iter()
            .filter_map(|trade| trade.validate().err())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_snapshot_defaults() {
        let snapshot = PortfolioSnapshot::from_json_str("{}").unwrap();
        assert!(snapshot.trades.is_empty());
        assert!(snapshot.baselines().is_empty());
    }

    #[test]
    fn test_snapshot_baselines() {
        let json = r#"{
            "yearly_capital": [{ "year": 2023, "capital": "100000" }],
            "monthly_overrides": [{ "month": 6, "year": 2023, "capital": "150000" }]
        }"#;

        let snapshot = PortfolioSnapshot::from_json_str(json).unwrap();
        let baselines = snapshot.baselines();
        assert_eq!(baselines.yearly_capital(2023), Some(dec!(100000)));
        assert!(snapshot.validation_errors().is_empty());
    }

    #[test]
    fn test_snapshot_missing_file() {
        let err = PortfolioSnapshot::load("/nonexistent/snapshot.json").unwrap_err();
        assert!(matches!(err, JournalError::Io(_)));
    }
}
