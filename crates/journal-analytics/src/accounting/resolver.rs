//! 거래 회계 해석기
//!
//! 하나의 거래가 어느 날짜에 얼마의 실현 손익을 만드는지 결정합니다.
//!
//! # 회계 기준
//!
//! - **발생주의**: 거래일(최초 진입일)에 일지가 저장한 `pl_rs`를 그대로 귀속
//! - **현금주의**: 청산 로트마다 청산일에 해당 레그의 손익을 귀속
//!
//! 레그 단위 값은 `ExitLegView`로 만들어지며 원본 `JournalTrade`에는 절대 기록되지 않습니다.
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use journal_analytics::accounting::TradeAccountingResolver;
//! use journal_core::{AccountingBasis, CostMethod};
//!
//! let resolver = TradeAccountingResolver::new(CostMethod::Fifo);
//! let date = resolver.effective_date(&trade, AccountingBasis::Cash);
//! let pl = resolver.realized_pl(&trade, AccountingBasis::Cash);
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};
use uuid::Uuid;

use journal_core::{
    fifo_match, realized_pnl, realized_pnl_from_cost, AccountingBasis, Amount, CostMethod,
    DecimalExt, JournalTrade, PositionStatus, Price, Quantity, Side, PNL_TOLERANCE,
};

/// 청산 레그 뷰 (파생 값).
///
/// 청산 로트 하나를 현금주의 집계용으로 펼친 레코드입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitLegView {
    /// 원본 거래 ID
    pub trade_id: Uuid,
    /// 청산 로트 인덱스 (0..3)
    pub leg_index: usize,
    /// 청산일 (로트에 날짜가 없으면 거래의 현금주의 귀속일)
    pub date: NaiveDate,
    /// 포지션 방향
    pub side: Side,
    /// 청산 가격
    pub price: Price,
    /// 청산 수량
    pub quantity: Quantity,
    /// 진입 원가와 매칭된 수량
    pub matched_quantity: Quantity,
    /// 매칭 수량의 총 진입 원가
    pub entry_cost: Amount,
}

impl ExitLegView {
    /// 매칭 수량 기준 진입 단가.
    pub fn cost_basis(&self) -> Price {
        if self.matched_quantity.is_zero() {
            Decimal::ZERO
        } else {
            self.entry_cost / self.matched_quantity
        }
    }

    /// 레그 실현 손익.
    ///
    /// 진입 원가가 없으면(평균 진입가 0 이하) 0입니다.
    pub fn realized_pl(&self) -> Amount {
        if self.entry_cost <= Decimal::ZERO || self.matched_quantity <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        realized_pnl_from_cost(self.price, self.matched_quantity, self.entry_cost, self.side)
    }
}

/// 날짜에 귀속된 실현 손익 이벤트.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealizedEvent {
    /// 원본 거래 ID
    pub trade_id: Uuid,
    /// 귀속 날짜
    pub date: NaiveDate,
    /// 실현 손익
    pub amount: Amount,
    /// 청산 레그 인덱스 (거래 전체 단위 이벤트면 `None`)
    pub leg_index: Option<usize>,
}

/// 거래 회계 해석기.
///
/// 상태가 없으며 원가 산정 방법만 보관합니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TradeAccountingResolver {
    cost_method: CostMethod,
}

impl TradeAccountingResolver {
    /// 새 해석기를 생성합니다.
    pub fn new(cost_method: CostMethod) -> Self {
        Self { cost_method }
    }

    /// 원가 산정 방법.
    pub fn cost_method(&self) -> CostMethod {
        self.cost_method
    }

    /// 회계 기준에 따른 손익 귀속 날짜.
    ///
    /// 현금주의에서는 가장 늦은 청산일을 사용하며, 청산 로트가 채워지지 않은
    /// 청산 거래는 남아 있는 청산 날짜 필드 중 가장 늦은 날짜로 대체합니다.
    pub fn effective_date(&self, trade: &JournalTrade, basis: AccountingBasis) -> NaiveDate {
        match basis {
            AccountingBasis::Accrual => trade.date,
            AccountingBasis::Cash => latest_exit_date(trade)
                .or_else(|| fallback_exit_date(trade))
                .unwrap_or(trade.date),
        }
    }

    /// 회계 기준에 따른 거래 전체의 실현 손익.
    pub fn realized_pl(&self, trade: &JournalTrade, basis: AccountingBasis) -> Amount {
        match basis {
            AccountingBasis::Accrual => trade.pl_rs,
            AccountingBasis::Cash => match trade.position_status {
                PositionStatus::Open => Decimal::ZERO,
                PositionStatus::Closed => trade.pl_rs,
                PositionStatus::Partial => {
                    let legs = self.explode_to_exit_events(trade);
                    if !legs.is_empty() {
                        legs.iter().map(ExitLegView::realized_pl).sum()
                    } else if !trade.pl_rs.is_zero() {
                        trade.pl_rs
                    } else {
                        aggregate_pl(trade)
                    }
                }
            },
        }
    }

    /// 청산 레그 하나의 실현 손익.
    pub fn leg_pl(&self, leg: &ExitLegView) -> Amount {
        leg.realized_pl()
    }

    /// 채워진 청산 로트마다 하나의 `ExitLegView`를 만듭니다.
    ///
    /// `Fifo`는 진입 로트가 채워져 있을 때만 적용되고, 그 외에는 `avg_entry`를 원가로 씁니다.
    pub fn explode_to_exit_events(&self, trade: &JournalTrade) -> Vec<ExitLegView> {
        let fallback_date = self.effective_date(trade, AccountingBasis::Cash);
        let entries = trade.entry_lots();
        let use_fifo =
            self.cost_method == CostMethod::Fifo && entries.iter().any(|lot| lot.is_populated());

        if use_fifo {
            fifo_match(&entries, &trade.exits)
                .into_iter()
                .map(|m| {
                    let lot = &trade.exits[m.exit_index];
                    ExitLegView {
                        trade_id: trade.id,
                        leg_index: m.exit_index,
                        date: lot.date.unwrap_or(fallback_date),
                        side: trade.side,
                        price: lot.price,
                        quantity: lot.quantity,
                        matched_quantity: m.matched_quantity,
                        entry_cost: m.matched_cost,
                    }
                })
                .collect()
        } else {
            let avg_entry = trade.avg_entry.max(Decimal::ZERO);
            trade
                .populated_exits()
                .map(|(leg_index, lot)| ExitLegView {
                    trade_id: trade.id,
                    leg_index,
                    date: lot.date.unwrap_or(fallback_date),
                    side: trade.side,
                    price: lot.price,
                    quantity: lot.quantity,
                    matched_quantity: lot.quantity,
                    entry_cost: avg_entry * lot.quantity,
                })
                .collect()
        }
    }

    /// 회계 기준에 따른 실현 손익 이벤트 목록.
    ///
    /// 현금주의에서 청산 레그가 있는 거래는 레그 이벤트만 만들고,
    /// 거래 전체 손익(`pl_rs`)을 중복으로 더하지 않습니다.
    pub fn realized_events(&self, trade: &JournalTrade, basis: AccountingBasis) -> Vec<RealizedEvent> {
        match basis {
            AccountingBasis::Accrual => vec![RealizedEvent {
                trade_id: trade.id,
                date: trade.date,
                amount: trade.pl_rs,
                leg_index: None,
            }],
            AccountingBasis::Cash => {
                if trade.position_status == PositionStatus::Open {
                    return Vec::new();
                }

                let legs = self.explode_to_exit_events(trade);
                if legs.is_empty() {
                    return vec![RealizedEvent {
                        trade_id: trade.id,
                        date: self.effective_date(trade, basis),
                        amount: self.realized_pl(trade, basis),
                        leg_index: None,
                    }];
                }

                if trade.position_status == PositionStatus::Closed {
                    self.check_closed_legs(trade, &legs);
                }

                legs.into_iter()
                    .map(|leg| RealizedEvent {
                        trade_id: leg.trade_id,
                        date: leg.date,
                        amount: leg.realized_pl(),
                        leg_index: Some(leg.leg_index),
                    })
                    .collect()
            }
        }
    }

    /// 전량 청산 거래의 레그 합계와 `pl_rs` 차이를 반환합니다.
    ///
    /// 청산 거래가 아니거나 레그가 없으면 `None`. 차이가 허용 오차를 넘으면 경고를 남기지만
    /// 값은 수정하지 않습니다.
    pub fn reconcile_closed(&self, trade: &JournalTrade) -> Option<Amount> {
        if trade.position_status != PositionStatus::Closed {
            return None;
        }
        let legs = self.explode_to_exit_events(trade);
        if legs.is_empty() {
            return None;
        }
        Some(self.check_closed_legs(trade, &legs))
    }

    fn check_closed_legs(&self, trade: &JournalTrade, legs: &[ExitLegView]) -> Amount {
        let leg_total: Amount = legs.iter().map(ExitLegView::realized_pl).sum();
        let difference = leg_total - trade.pl_rs;

        if !difference.approx_eq(Decimal::ZERO, PNL_TOLERANCE) {
            warn!(
                trade_id = %trade.id,
                symbol = %trade.symbol,
                leg_total = %leg_total,
                pl_rs = %trade.pl_rs,
                "Exit legs do not reconcile with cached realized P&L"
            );
        }

        difference
    }
}

/// 같은 ID의 거래를 한 번만 남깁니다 (먼저 나온 레코드 우선).
///
/// 입력 순서를 보존하므로 결과가 결정적입니다.
pub fn unique_trades(trades: &[JournalTrade]) -> Vec<&JournalTrade> {
    let mut seen = HashSet::with_capacity(trades.len());
    let mut unique = Vec::with_capacity(trades.len());

    for trade in trades {
        if seen.insert(trade.id) {
            unique.push(trade);
        } else {
            warn!(trade_id = %trade.id, symbol = %trade.symbol, "Skipping duplicate trade record");
        }
    }

    if unique.len() != trades.len() {
        debug!(
            total = trades.len(),
            unique = unique.len(),
            "Removed duplicate trade records"
        );
    }

    unique
}

/// 채워진 청산 로트 중 가장 늦은 날짜.
fn latest_exit_date(trade: &JournalTrade) -> Option<NaiveDate> {
    trade
        .populated_exits()
        .filter_map(|(_, lot)| lot.date)
        .max()
}

/// 청산 기록이 집계 필드에만 남은 거래의 대체 날짜.
fn fallback_exit_date(trade: &JournalTrade) -> Option<NaiveDate> {
    let has_exit_aggregate = trade.position_status.has_exits()
        && trade.exited_qty > Decimal::ZERO
        && trade.avg_exit_price > Decimal::ZERO;

    if !has_exit_aggregate {
        return None;
    }

    trade.exits.iter().filter_map(|lot| lot.date).max()
}

/// 집계 필드 기반 실현 손익: (평균 청산가 - 평균 진입가) × 청산 수량.
fn aggregate_pl(trade: &JournalTrade) -> Amount {
    if trade.avg_entry <= Decimal::ZERO || trade.avg_exit_price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    realized_pnl(trade.avg_entry, trade.avg_exit_price, trade.exited_qty, trade.side)
}
