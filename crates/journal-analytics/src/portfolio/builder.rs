//! 포트폴리오 시계열 빌더
//!
//! 거래와 입출금 이벤트를 날짜순으로 재생해 가치 시계열과 월별 요약표를 만듭니다.
//!
//! # 알고리즘
//!
//! 1. 모든 이벤트 날짜(진입, 피라미딩, 기준별 청산일, 입출금일)를 자정 UTC로 정규화하고
//!    중복 제거 후 정렬
//! 2. 가장 이른 날짜의 입출금이 있으면 그 합계로, 없으면 기본 자본으로 시작
//! 3. 날짜순으로 입출금 변화와 해당 날짜에 귀속된 실현 손익을 더하고 매 날짜의 값을 기록
//!
//! 현금주의에서 청산 레그가 있는 거래는 레그 단위로만 반영되어 중복 집계되지 않습니다.
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use journal_analytics::portfolio::PortfolioTimeSeriesBuilder;
//! use journal_core::AccountingBasis;
//!
//! let builder = PortfolioTimeSeriesBuilder::new().with_default_capital(dec!(50000));
//! let series = builder.build_time_series(&trades, &changes, AccountingBasis::Cash);
//! let monthly = builder.build_monthly(&trades, &changes, AccountingBasis::Cash);
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use journal_core::{
    journal_span, midnight_utc, AccountingBasis, Amount, CapitalBaselines, CapitalChange, EngineConfig,
    JournalTrade,
};

use super::value_series::ValueSeries;
use crate::accounting::{unique_trades, TradeAccountingResolver};
use crate::ledger::{CapitalLedger, MonthlyActivity, MonthlyPortfolio, DEFAULT_STARTING_CAPITAL};
use crate::xirr::CashFlow;

/// 하루에 발생한 변화량.
#[derive(Debug, Clone, Copy, Default)]
struct DayEvents {
    capital: Amount,
    pl: Amount,
    has_capital_change: bool,
}

/// 월별 요약표와 월말 가치 곡선.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyReport {
    /// 첫 활동 월부터 마지막 활동 월까지의 월별 요약
    pub rows: Vec<MonthlyPortfolio>,
    /// 첫 월 시작 상태 + 각 월말 최종 자본
    pub curve: ValueSeries,
}

/// 포트폴리오 시계열 빌더.
#[derive(Debug, Clone)]
pub struct PortfolioTimeSeriesBuilder {
    resolver: TradeAccountingResolver,
    default_capital: Amount,
    baselines: CapitalBaselines,
}

impl Default for PortfolioTimeSeriesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PortfolioTimeSeriesBuilder {
    /// 기본 설정으로 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            resolver: TradeAccountingResolver::default(),
            default_capital: DEFAULT_STARTING_CAPITAL,
            baselines: CapitalBaselines::default(),
        }
    }

    /// 엔진 설정에서 빌더를 생성합니다.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new()
            .with_resolver(TradeAccountingResolver::new(config.cost_method))
            .with_default_capital(config.default_starting_capital)
    }

    /// 회계 해석기를 설정합니다.
    pub fn with_resolver(mut self, resolver: TradeAccountingResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// 기본 시작 자본을 설정합니다.
    pub fn with_default_capital(mut self, capital: Amount) -> Self {
        self.default_capital = capital;
        self
    }

    /// 연간/월간 자본 기준을 설정합니다 (월별 요약에 사용).
    pub fn with_baselines(mut self, baselines: CapitalBaselines) -> Self {
        self.baselines = baselines;
        self
    }

    /// 회계 해석기.
    pub fn resolver(&self) -> &TradeAccountingResolver {
        &self.resolver
    }

    /// 기준 자본 설정이 반영된 자본 원장.
    pub fn ledger(&self) -> CapitalLedger {
        CapitalLedger::new(self.baselines.clone()).with_default_capital(self.default_capital)
    }

    /// 이벤트 날짜순으로 가치 시계열을 만듭니다.
    pub fn build_time_series(
        &self,
        trades: &[JournalTrade],
        capital_changes: &[CapitalChange],
        basis: AccountingBasis,
    ) -> ValueSeries {
        let _span = journal_span!("build_time_series", basis, trades.len()).entered();

        let events = self.collect_events(trades, capital_changes, basis);
        let Some((_, first)) = events.iter().next() else {
            debug!("No events, returning empty series");
            return ValueSeries::new();
        };

        let mut running = if first.has_capital_change {
            first.capital
        } else {
            self.default_capital
        };

        let mut series = ValueSeries::new();
        for (index, (date, day)) in events.iter().enumerate() {
            // 첫 날짜의 입출금은 시작값에 이미 포함됨
            if index > 0 {
                running += day.capital;
            }
            running += day.pl;
            series.add_point(midnight_utc(*date), running);
        }

        debug!(
            points = series.len(),
            final_value = %series.current_value(),
            "Built portfolio value series"
        );

        series
    }

    /// 월별 요약표와 월말 가치 곡선을 만듭니다.
    ///
    /// 곡선의 첫 포인트는 첫 활동 월 1일의 시작 자본이며, 이후 포인트는 각 월 말일의 최종 자본입니다.
    pub fn build_monthly(
        &self,
        trades: &[JournalTrade],
        capital_changes: &[CapitalChange],
        basis: AccountingBasis,
    ) -> MonthlyReport {
        let _span = journal_span!("build_monthly", basis, trades.len()).entered();

        let activity = MonthlyActivity::collect(trades, capital_changes, basis, &self.resolver);
        let (Some(first), Some(last)) = (activity.earliest(), activity.latest()) else {
            return MonthlyReport::default();
        };

        let rows = self.ledger().sweep(&activity, first, last);

        let mut curve = ValueSeries::new();
        if let Some(opening) = rows.first() {
            curve.add_point(first.start_timestamp(), opening.starting_capital);
        }
        for row in &rows {
            curve.add_point(midnight_utc(row.period().last_day()), row.final_capital);
        }

        debug!(months = rows.len(), "Built monthly portfolio table");

        MonthlyReport { rows, curve }
    }

    /// XIRR 계산용 투자자 관점 현금흐름.
    ///
    /// 시작값이 기본 자본이면 첫 이벤트 날짜의 출자로 간주하고,
    /// 모든 입출금과 마지막 시계열 값을 최종 평가액으로 추가합니다.
    pub fn cash_flows(
        &self,
        trades: &[JournalTrade],
        capital_changes: &[CapitalChange],
        basis: AccountingBasis,
    ) -> Vec<CashFlow> {
        let series = self.build_time_series(trades, capital_changes, basis);
        let (Some(first), Some(last)) = (series.points().first(), series.points().last()) else {
            return Vec::new();
        };

        let first_date = first.timestamp.date_naive();
        let seeded_from_changes = capital_changes.iter().any(|c| c.date == first_date);
        let opening = (!seeded_from_changes).then_some((first_date, self.default_capital));

        CashFlow::from_capital_history(
            opening,
            capital_changes,
            last.value,
            last.timestamp.date_naive(),
        )
    }

    fn collect_events(
        &self,
        trades: &[JournalTrade],
        capital_changes: &[CapitalChange],
        basis: AccountingBasis,
    ) -> BTreeMap<NaiveDate, DayEvents> {
        let mut events: BTreeMap<NaiveDate, DayEvents> = BTreeMap::new();

        for trade in unique_trades(trades) {
            for date in trade.entry_dates() {
                events.entry(date).or_default();
            }
            for event in self.resolver.realized_events(trade, basis) {
                events.entry(event.date).or_default().pl += event.amount;
            }
        }

        for change in capital_changes {
            let day = events.entry(change.date).or_default();
            day.capital += change.signed_amount();
            day.has_capital_change = true;
        }

        debug!(dates = events.len(), "Collected event dates");
        events
    }
}
