//! 매매일지 거래 기록.
//!
//! 이 모듈은 매매일지의 정규(canonical) 거래 타입을 정의합니다:
//! - `Side` - 포지션 방향
//! - `PositionStatus` - 포지션 상태 (보유/청산/부분청산)
//! - `TradeLot` - 진입 또는 청산 로트 하나
//! - `JournalTrade` - 최대 3개의 진입 로트와 3개의 청산 로트를 가진 거래
//!
//! `JournalTrade`는 불변 입력으로 취급됩니다. 회계 엔진이 만드는 파생 값
//! (청산 레그 뷰 등)은 절대 이 구조체에 다시 기록되지 않습니다.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::calculations::{realized_pnl, total_quantity, weighted_average_price};
use crate::error::{JournalError, JournalResult};
use crate::types::{Amount, DecimalExt, Price, Quantity, PNL_TOLERANCE};

/// 피라미딩(추가 진입) 로트 최대 개수.
pub const MAX_PYRAMID_LOTS: usize = 2;

/// 청산 로트 최대 개수.
pub const MAX_EXIT_LOTS: usize = 3;

/// 포지션 방향 (매수 또는 매도).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// 매수 (롱)
    #[serde(alias = "Buy", alias = "BUY")]
    Buy,
    /// 매도 (숏)
    #[serde(alias = "Sell", alias = "SELL")]
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// 포지션 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionStatus {
    /// 보유 중 (청산 없음)
    #[serde(alias = "Open")]
    Open,
    /// 전량 청산
    #[serde(alias = "Closed")]
    Closed,
    /// 부분 청산
    #[serde(alias = "Partial")]
    Partial,
}

impl PositionStatus {
    /// 청산이 한 번이라도 발생한 상태인지 확인합니다.
    pub fn has_exits(&self) -> bool {
        matches!(self, PositionStatus::Closed | PositionStatus::Partial)
    }
}

/// 진입 또는 청산 로트.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeLot {
    /// 체결 가격
    pub price: Price,
    /// 체결 수량
    pub quantity: Quantity,
    /// 체결 날짜 (일지에 비어 있을 수 있음)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl TradeLot {
    /// 새 로트를 생성합니다.
    pub fn new(price: Price, quantity: Quantity, date: Option<NaiveDate>) -> Self {
        Self {
            price,
            quantity,
            date,
        }
    }

    /// 가격과 수량이 모두 입력된 로트인지 확인합니다.
    pub fn is_populated(&self) -> bool {
        self.price > Decimal::ZERO && self.quantity > Decimal::ZERO
    }

    /// 명목 가치 (가격 × 수량).
    pub fn notional(&self) -> Amount {
        self.price * self.quantity
    }
}

/// 매매일지 거래 기록.
///
/// `avg_entry`, `avg_exit_price`, `open_qty`, `exited_qty`, `pl_rs`는 일지가
/// 미리 계산해 둔 캐시 필드입니다. `pl_rs`는 발생주의 기준 실현 손익입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalTrade {
    /// 거래 ID
    pub id: Uuid,
    /// 종목 심볼
    pub symbol: String,
    /// 거래 날짜 (최초 진입일)
    pub date: NaiveDate,
    /// 포지션 방향
    pub side: Side,
    /// 포지션 상태
    pub position_status: PositionStatus,
    /// 최초 진입 로트
    pub entry: TradeLot,
    /// 피라미딩 로트 (최대 2개)
    #[serde(default)]
    pub pyramids: Vec<TradeLot>,
    /// 청산 로트 (최대 3개)
    #[serde(default)]
    pub exits: Vec<TradeLot>,
    /// 평균 진입가
    #[serde(default)]
    pub avg_entry: Price,
    /// 평균 청산가
    #[serde(default)]
    pub avg_exit_price: Price,
    /// 미청산 수량
    #[serde(default)]
    pub open_qty: Quantity,
    /// 청산 수량
    #[serde(default)]
    pub exited_qty: Quantity,
    /// 발생주의 실현 손익
    #[serde(default)]
    pub pl_rs: Amount,
}

impl JournalTrade {
    /// 단일 진입으로 새 거래를 생성합니다.
    ///
    /// 캐시 필드는 진입 로트에서 계산됩니다.
    pub fn new(
        symbol: impl Into<String>,
        side: Side,
        date: NaiveDate,
        entry_price: Price,
        entry_qty: Quantity,
    ) -> Self {
        let mut trade = Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            date,
            side,
            position_status: PositionStatus::Open,
            entry: TradeLot::new(entry_price, entry_qty, Some(date)),
            pyramids: Vec::new(),
            exits: Vec::new(),
            avg_entry: Decimal::ZERO,
            avg_exit_price: Decimal::ZERO,
            open_qty: Decimal::ZERO,
            exited_qty: Decimal::ZERO,
            pl_rs: Decimal::ZERO,
        };
        trade.recompute_aggregates();
        trade
    }

    /// 피라미딩 로트를 추가하고 캐시 필드를 다시 계산합니다.
    pub fn with_pyramid(mut self, price: Price, quantity: Quantity, date: Option<NaiveDate>) -> Self {
        self.pyramids.push(TradeLot::new(price, quantity, date));
        self.recompute_aggregates();
        self
    }

    /// 청산 로트를 추가하고 캐시 필드를 다시 계산합니다.
    pub fn with_exit(mut self, price: Price, quantity: Quantity, date: Option<NaiveDate>) -> Self {
        self.exits.push(TradeLot::new(price, quantity, date));
        self.recompute_aggregates();
        self
    }

    /// 캐시된 실현 손익을 덮어씁니다.
    ///
    /// 일지가 수수료 등을 반영해 로트 합계와 다른 값을 저장한 경우를 표현합니다.
    pub fn with_cached_pl(mut self, pl_rs: Amount) -> Self {
        self.pl_rs = pl_rs;
        self
    }

    /// 포지션 상태를 덮어씁니다.
    pub fn with_status(mut self, status: PositionStatus) -> Self {
        self.position_status = status;
        self
    }

    /// 거래 ID를 지정합니다.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// 최초 진입 + 피라미딩 로트 (매수 순서).
    pub fn entry_lots(&self) -> Vec<TradeLot> {
        std::iter::once(self.entry.clone())
            .chain(self.pyramids.iter().cloned())
            .collect()
    }

    /// 가격과 수량이 입력된 청산 로트 (인덱스 포함).
    pub fn populated_exits(&self) -> impl Iterator<Item = (usize, &TradeLot)> {
        self.exits
            .iter()
            .enumerate()
            .filter(|(_, lot)| lot.is_populated())
    }

    /// 진입/피라미딩 날짜 목록.
    pub fn entry_dates(&self) -> Vec<NaiveDate> {
        let mut dates = vec![self.date];
        dates.extend(self.pyramids.iter().filter_map(|lot| lot.date));
        dates
    }

    /// 총 진입 수량.
    pub fn total_entry_qty(&self) -> Quantity {
        total_quantity(&self.entry_lots())
    }

    /// 로트 데이터로 캐시 필드를 다시 계산합니다.
    ///
    /// 일지가 저장하는 방식과 같이 가중평균 진입가 기준으로 `pl_rs`를 계산합니다.
    pub fn recompute_aggregates(&mut self) {
        let entries = self.entry_lots();
        let total_entry = total_quantity(&entries);

        self.avg_entry = weighted_average_price(&entries);
        self.avg_exit_price = weighted_average_price(&self.exits);
        self.exited_qty = total_quantity(&self.exits);
        self.open_qty = (total_entry - self.exited_qty).max(Decimal::ZERO);

        self.position_status = if self.exited_qty.is_zero() {
            PositionStatus::Open
        } else if self.open_qty.is_zero() {
            PositionStatus::Closed
        } else {
            PositionStatus::Partial
        };

        self.pl_rs = if self.exited_qty > Decimal::ZERO && self.avg_entry > Decimal::ZERO {
            realized_pnl(self.avg_entry, self.avg_exit_price, self.exited_qty, self.side)
        } else {
            Decimal::ZERO
        };
    }

    /// 로트 개수 제한과 수량 불변식을 검증합니다.
    ///
    /// - `open_qty + exited_qty == Σ 진입 로트 수량`
    /// - `exited_qty == Σ 청산 로트 수량`
    pub fn validate(&self) -> JournalResult<()> {
        if self.pyramids.len() > MAX_PYRAMID_LOTS {
            return Err(JournalError::InvalidInput(format!(
                "trade {} has {} pyramid lots (max {})",
                self.id,
                self.pyramids.len(),
                MAX_PYRAMID_LOTS
            )));
        }

        if self.exits.len() > MAX_EXIT_LOTS {
            return Err(JournalError::InvalidInput(format!(
                "trade {} has {} exit lots (max {})",
                self.id,
                self.exits.len(),
                MAX_EXIT_LOTS
            )));
        }

        let total_entry = self.total_entry_qty();
        if !(self.open_qty + self.exited_qty).approx_eq(total_entry, PNL_TOLERANCE) {
            return Err(JournalError::Data(format!(
                "trade {}: open_qty {} + exited_qty {} != entry qty {}",
                self.id, self.open_qty, self.exited_qty, total_entry
            )));
        }

        let total_exit = total_quantity(&self.exits);
        if !self.exited_qty.approx_eq(total_exit, PNL_TOLERANCE) {
            return Err(JournalError::Data(format!(
                "trade {}: exited_qty {} != exit lot qty {}",
                self.id, self.exited_qty, total_exit
            )));
        }

        Ok(())
    }
}
