//! 매매일지 포트폴리오 회계 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 회계 기준(현금/발생)별 거래 실현 손익 해석
//! - 월별 자본 원장 (연간 기준, 월 오버라이드, 전월 이월)
//! - 포트폴리오 가치 시계열 및 월별 요약
//! - 위험 지표 계산
//! - XIRR (금액가중 수익률)
//!
//! 모든 계산은 동기식 순수 함수이며, 회계 기준은 항상 인자로 전달됩니다.
//!
//! # Re-exports
//!
//! - [`accounting`]: 거래 회계 해석 (TradeAccountingResolver, ExitLegView)
//! - [`ledger`]: 월별 활동과 자본 원장 (CapitalLedger, MonthlyPortfolio)
//! - [`portfolio`]: 가치 시계열 (ValueSeries, PortfolioTimeSeriesBuilder)
//! - [`performance`]: 위험 지표 (RiskMetricsEngine, RiskSummary)
//! - [`xirr`]: XIRR 솔버 (XirrSolver, CashFlow)

pub mod accounting;
pub mod ledger;
pub mod performance;
pub mod portfolio;
pub mod xirr;

// Accounting 모듈 re-exports
pub use accounting::{unique_trades, ExitLegView, RealizedEvent, TradeAccountingResolver};

// Ledger 모듈 re-exports
pub use ledger::{
    CapitalLedger, MonthActivity, MonthlyActivity, MonthlyPortfolio, DEFAULT_STARTING_CAPITAL,
};

// Performance 모듈 re-exports
pub use performance::metrics::{
    MetricKind, RiskMetricsEngine, RiskSummary, CALMAR_SENTINEL, DEFAULT_RISK_FREE_RATE,
    TRADING_DAYS_PER_YEAR,
};

// Portfolio 모듈 re-exports
pub use portfolio::builder::{MonthlyReport, PortfolioTimeSeriesBuilder};
pub use portfolio::value_series::{DrawdownPeriod, TimeFrame, ValuePoint, ValueSeries};

// XIRR 모듈 re-exports
pub use xirr::{CashFlow, SolveMethod, XirrOutcome, XirrSolver};
