//! 스냅샷/설정 로드.
//!
//! 모든 명령어가 공유하는 입력 단계입니다:
//! 1. 엔진 설정 로드 (`--config` → `config/default.toml` → 기본값 + 환경 변수)
//! 2. 포트폴리오 스냅샷(JSON) 로드
//! 3. 회계 기준 결정 (`--basis`가 설정보다 우선)

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use journal_analytics::{PortfolioTimeSeriesBuilder, RiskMetricsEngine};
use journal_core::{AccountingBasis, EngineConfig, JournalConfig, PortfolioSnapshot};

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 입력 설정.
#[derive(Debug, Clone)]
pub struct InputConfig {
    /// 스냅샷 JSON 경로
    pub input_path: PathBuf,
    /// 회계 기준 (없으면 설정 파일 값)
    pub basis: Option<AccountingBasis>,
}

/// 로드된 입력.
#[derive(Debug, Clone)]
pub struct LoadedInput {
    /// 포트폴리오 스냅샷
    pub snapshot: PortfolioSnapshot,
    /// 엔진 설정
    pub engine: EngineConfig,
    /// 이번 실행에 사용할 회계 기준
    pub basis: AccountingBasis,
}

impl LoadedInput {
    /// 설정과 스냅샷 자본 기준이 반영된 시계열 빌더.
    pub fn builder(&self) -> PortfolioTimeSeriesBuilder {
        PortfolioTimeSeriesBuilder::from_config(&self.engine)
            .with_baselines(self.snapshot.baselines())
    }

    /// 설정이 반영된 위험 지표 엔진.
    pub fn risk_engine(&self) -> RiskMetricsEngine {
        RiskMetricsEngine::from_config(&self.engine)
    }
}

/// 설정 파일을 로드합니다.
///
/// 경로를 지정하지 않았고 기본 경로에 파일이 없으면 기본값과 환경 변수만 사용합니다.
pub fn load_config(path: Option<&Path>) -> Result<JournalConfig> {
    match path {
        Some(path) => JournalConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            JournalConfig::load_default().context("Failed to load default config")
        }
        None => JournalConfig::from_env().context("Failed to load config from environment"),
    }
}

/// 스냅샷을 로드하고 회계 기준을 결정합니다.
pub fn load_input(config: &InputConfig, engine: &EngineConfig) -> Result<LoadedInput> {
    let snapshot = PortfolioSnapshot::load(&config.input_path)
        .with_context(|| format!("Failed to load snapshot: {}", config.input_path.display()))?;

    // 불변식 위반은 경고만 하고 계속 진행
    for issue in snapshot.validation_errors() {
        warn!(error = %issue, "Trade data inconsistency");
    }

    let basis = config.basis.unwrap_or(engine.accounting_basis);

    info!(
        trades = snapshot.trades.len(),
        capital_changes = snapshot.capital_changes.len(),
        basis = %basis,
        "Snapshot loaded"
    );

    Ok(LoadedInput {
        snapshot,
        engine: engine.clone(),
        basis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_input_missing_file() {
        let config = InputConfig {
            input_path: PathBuf::from("/nonexistent/journal.json"),
            basis: None,
        };
        let err = load_input(&config, &EngineConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to load snapshot"));
    }

    #[test]
    fn test_basis_override() {
        let path = std::env::temp_dir().join(format!("journal-input-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, "{}").unwrap();

        let config = InputConfig {
            input_path: path.clone(),
            basis: Some(AccountingBasis::Accrual),
        };
        let loaded = load_input(&config, &EngineConfig::default()).unwrap();
        assert_eq!(loaded.basis, AccountingBasis::Accrual);

        let config = InputConfig {
            basis: None,
            ..config
        };
        let loaded = load_input(&config, &EngineConfig::default()).unwrap();
        assert_eq!(loaded.basis, AccountingBasis::Cash);

        std::fs::remove_file(path).ok();
    }
}
