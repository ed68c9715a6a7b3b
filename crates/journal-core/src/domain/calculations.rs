//! 로트 단위 손익 계산 공통 로직.
//!
//! 회계 기준 해석기(resolver)와 매매일지 캐시 필드 재계산에서 공유하는 함수를 제공합니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use super::trade::{Side, TradeLot};
use crate::error::JournalError;
use crate::types::{Amount, Price, Quantity};

/// 청산 손익 계산 시 진입 원가를 정하는 방법.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostMethod {
    /// 가중평균 진입가 (매매일지의 `avg_entry` 캐시 필드 사용)
    #[default]
    WeightedAverage,
    /// FIFO (First In, First Out) - 선입선출 로트 매칭
    Fifo,
}

impl fmt::Display for CostMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostMethod::WeightedAverage => write!(f, "weighted_average"),
            CostMethod::Fifo => write!(f, "fifo"),
        }
    }
}

impl FromStr for CostMethod {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weighted_average" | "average" | "avg" => Ok(CostMethod::WeightedAverage),
            "fifo" => Ok(CostMethod::Fifo),
            _ => Err(JournalError::InvalidInput(format!(
                "Unknown cost method: {}",
                s
            ))),
        }
    }
}

/// 청산 로트 하나에 매칭된 진입 원가.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotMatch {
    /// 청산 로트 인덱스 (입력 순서 기준)
    pub exit_index: usize,
    /// 진입 로트와 매칭된 수량
    pub matched_quantity: Quantity,
    /// 매칭된 수량의 총 진입 원가 (Σ 진입가 × 수량)
    pub matched_cost: Amount,
}

impl LotMatch {
    /// 매칭 수량 기준 단가.
    pub fn unit_cost(&self) -> Price {
        if self.matched_quantity.is_zero() {
            Decimal::ZERO
        } else {
            self.matched_cost / self.matched_quantity
        }
    }
}

/// 실현 손익 계산 (수수료 제외).
///
/// # Examples
///
/// ```ignore
/// // 롱 포지션: 100에 매수 → 110에 매도, 수량 10
/// let pnl = realized_pnl(dec!(100), dec!(110), dec!(10), Side::Buy);
/// assert_eq!(pnl, dec!(100));
/// ```
pub fn realized_pnl(
    entry_price: Price,
    exit_price: Price,
    quantity: Quantity,
    side: Side,
) -> Decimal {
    match side {
        // 롱 포지션: (청산가 - 진입가) × 수량
        Side::Buy => (exit_price - entry_price) * quantity,
        // 숏 포지션: (진입가 - 청산가) × 수량
        Side::Sell => (entry_price - exit_price) * quantity,
    }
}

/// 총 원가 기준 실현 손익.
///
/// 단가로 나눴다가 다시 곱하면 Decimal 반올림 오차가 생기므로,
/// 청산 금액과 매칭 원가를 직접 비교합니다.
pub fn realized_pnl_from_cost(
    exit_price: Price,
    quantity: Quantity,
    entry_cost: Amount,
    side: Side,
) -> Decimal {
    let proceeds = exit_price * quantity;
    match side {
        Side::Buy => proceeds - entry_cost,
        Side::Sell => entry_cost - proceeds,
    }
}

/// 가중평균 가격 계산: (Σ 가격×수량) / Σ수량.
///
/// 유효하지 않은 로트(가격 또는 수량이 0 이하)는 제외합니다.
pub fn weighted_average_price(lots: &[TradeLot]) -> Price {
    let (total_cost, total_qty) = lots
        .iter()
        .filter(|lot| lot.is_populated())
        .fold((Decimal::ZERO, Decimal::ZERO), |(cost, qty), lot| {
            (cost + lot.notional(), qty + lot.quantity)
        });

    if total_qty > Decimal::ZERO {
        total_cost / total_qty
    } else {
        Decimal::ZERO
    }
}

/// 유효 로트의 총 수량.
pub fn total_quantity(lots: &[TradeLot]) -> Quantity {
    lots.iter()
        .filter(|lot| lot.is_populated())
        .map(|lot| lot.quantity)
        .sum()
}

/// FIFO 로트 매칭.
///
/// 진입 로트는 주어진 순서(최초 진입 → 피라미딩)를 매수 순서로 간주합니다.
/// 각 청산 로트는 가장 오래된 미매칭 진입 로트부터 소진하며,
/// 진입 수량을 초과하는 청산 수량은 매칭되지 않습니다.
///
/// 유효한 청산 로트마다 하나의 `LotMatch`를 반환합니다.
pub fn fifo_match(entries: &[TradeLot], exits: &[TradeLot]) -> Vec<LotMatch> {
    let mut queue: VecDeque<(Price, Quantity)> = entries
        .iter()
        .filter(|lot| lot.is_populated())
        .map(|lot| (lot.price, lot.quantity))
        .collect();

    let mut matches = Vec::with_capacity(exits.len());

    for (exit_index, exit) in exits.iter().enumerate() {
        if !exit.is_populated() {
            continue;
        }

        let mut remaining = exit.quantity;
        let mut matched_quantity = Decimal::ZERO;
        let mut matched_cost = Decimal::ZERO;

        while remaining > Decimal::ZERO {
            let Some(front) = queue.front_mut() else {
                break;
            };

            let take = front.1.min(remaining);
            matched_quantity += take;
            matched_cost += take * front.0;
            remaining -= take;
            front.1 -= take;

            if front.1 <= Decimal::ZERO {
                queue.pop_front();
            }
        }

        matches.push(LotMatch {
            exit_index,
            matched_quantity,
            matched_cost,
        });
    }

    matches
}

/// FIFO 기준 총 실현 손익.
///
/// # Examples
///
/// ```ignore
/// // 진입 [100×10, 110×10], 청산 [120×15], 롱
/// // = 10×(120-100) + 5×(120-110) = 250
/// ```
pub fn fifo_realized_pnl(entries: &[TradeLot], exits: &[TradeLot], side: Side) -> Decimal {
    fifo_match(entries, exits)
        .iter()
        .map(|m| {
            let exit_price = exits[m.exit_index].price;
            realized_pnl_from_cost(exit_price, m.matched_quantity, m.matched_cost, side)
        })
        .sum()
}

/// 수익률 계산 (백분율).
///
/// 원가 기준이 0 이하이면 0을 반환합니다.
pub fn return_pct(pnl: Decimal, cost_basis: Decimal) -> Decimal {
    if cost_basis > Decimal::ZERO {
        (pnl / cost_basis) * dec!(100)
    } else {
        Decimal::ZERO
    }
}
