//! 설정 관리.
//!
//! 이 모듈은 회계 엔진 설정을 정의하고 관리합니다.
//! 로드 순서: 기본값 → TOML 파일 → `JOURNAL__*` 환경 변수.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::{AccountingBasis, CostMethod};
use crate::logging::{LogConfig, LogFormat};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct JournalConfig {
    /// 회계 엔진 설정
    #[serde(default)]
    pub engine: EngineConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 회계 엔진 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// 자본 기준이 전혀 없을 때 사용하는 시작 자본
    #[serde(default = "default_starting_capital")]
    pub default_starting_capital: Decimal,
    /// 기본 회계 기준
    #[serde(default)]
    pub accounting_basis: AccountingBasis,
    /// 청산 손익 원가 산정 방법
    #[serde(default)]
    pub cost_method: CostMethod,
    /// 연간 무위험 수익률 (0.05 = 5%)
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
    /// 연율화 기간 수 (거래일 기준 252)
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: u32,
}

fn default_starting_capital() -> Decimal {
    dec!(100000)
}
fn default_risk_free_rate() -> f64 {
    0.05
}
fn default_periods_per_year() -> u32 {
    252
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_starting_capital: default_starting_capital(),
            accounting_basis: AccountingBasis::default(),
            cost_method: CostMethod::default(),
            risk_free_rate: default_risk_free_rate(),
            periods_per_year: default_periods_per_year(),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl LoggingConfig {
    /// `init_logging`에 넘길 `LogConfig`로 변환합니다.
    ///
    /// 알 수 없는 형식은 pretty로 대체합니다.
    pub fn to_log_config(&self) -> LogConfig {
        let format = self.format.parse().unwrap_or(LogFormat::Pretty);
        LogConfig::new(self.level.clone()).with_format(format)
    }
}

impl JournalConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = Self::defaults()?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()))
            // 환경 변수로 오버라이드
            .add_source(Self::environment());

        builder.build()?.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }

    /// 파일 없이 기본값과 환경 변수만으로 설정을 로드합니다.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::defaults()?
            .add_source(Self::environment())
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
    {
        config::Config::builder()
            .set_default("engine.default_starting_capital", "100000")?
            .set_default("engine.accounting_basis", "cash")?
            .set_default("engine.cost_method", "weighted_average")?
            .set_default("engine.risk_free_rate", 0.05)?
            .set_default("engine.periods_per_year", 252)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix("JOURNAL")
            .separator("__")
            .try_parsing(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_engine_defaults() {
        let config = JournalConfig::default();
        assert_eq!(config.engine.default_starting_capital, dec!(100000));
        assert_eq!(config.engine.accounting_basis, AccountingBasis::Cash);
        assert_eq!(config.engine.cost_method, CostMethod::WeightedAverage);
        assert_eq!(config.engine.periods_per_year, 252);
    }

    #[test]
    fn test_load_from_toml() {
        let path = std::env::temp_dir().join(format!("journal-config-{}.toml", uuid::Uuid::new_v4()));
        {
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(
                file,
                "[engine]\naccounting_basis = \"accrual\"\ncost_method = \"fifo\"\n\n[logging]\nformat = \"json\""
            )
            .unwrap();
        }

        let config = JournalConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.engine.accounting_basis, AccountingBasis::Accrual);
        assert_eq!(config.engine.cost_method, CostMethod::Fifo);
        assert_eq!(config.engine.default_starting_capital, dec!(100000));
        assert_eq!(config.logging.to_log_config().format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_log_format_falls_back() {
        let logging = LoggingConfig {
            level: "debug".to_string(),
            format: "xml".to_string(),
        };
        let log_config = logging.to_log_config();
        assert_eq!(log_config.format, LogFormat::Pretty);
        assert_eq!(log_config.level, "debug");
    }
}
