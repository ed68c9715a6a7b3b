//! 월별 활동 집계
//!
//! 거래와 입출금을 한 번 훑어 `YearMonth`별 입금/출금/실현 손익 합계를 만듭니다.
//! 입력이 바뀌면 다시 수집해야 하며, 증분 갱신은 지원하지 않습니다.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use journal_core::{AccountingBasis, Amount, CapitalChange, JournalTrade, YearMonth};

use crate::accounting::{unique_trades, TradeAccountingResolver};

/// 한 달의 활동 합계.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthActivity {
    /// 입금 합계
    pub deposits: Amount,
    /// 출금 합계 (양수)
    pub withdrawals: Amount,
    /// 실현 손익 합계
    pub pl: Amount,
    /// 진입/청산 등 거래 이벤트 수
    pub trade_events: usize,
}

impl MonthActivity {
    /// 입금 − 출금 + 실현 손익.
    pub fn net(&self) -> Amount {
        self.deposits - self.withdrawals + self.pl
    }
}

/// 월별 활동 인덱스.
#[derive(Debug, Clone, Default)]
pub struct MonthlyActivity {
    basis: AccountingBasis,
    months: BTreeMap<YearMonth, MonthActivity>,
}

impl MonthlyActivity {
    /// 빈 인덱스를 생성합니다.
    pub fn new(basis: AccountingBasis) -> Self {
        Self {
            basis,
            months: BTreeMap::new(),
        }
    }

    /// 거래와 입출금에서 월별 활동을 수집합니다.
    ///
    /// 진입/피라미딩 날짜가 속한 월도 활동 월로 기록됩니다(손익 0).
    pub fn collect(
        trades: &[JournalTrade],
        capital_changes: &[CapitalChange],
        basis: AccountingBasis,
        resolver: &TradeAccountingResolver,
    ) -> Self {
        let mut activity = Self::new(basis);

        for trade in unique_trades(trades) {
            for date in trade.entry_dates() {
                activity.entry(date).trade_events += 1;
            }
            for event in resolver.realized_events(trade, basis) {
                let month = activity.entry(event.date);
                month.pl += event.amount;
                month.trade_events += 1;
            }
        }

        for change in capital_changes {
            let month = activity.entry(change.date);
            month.deposits += change.deposit_amount();
            month.withdrawals += change.withdrawal_amount();
        }

        debug!(
            basis = %basis,
            months = activity.months.len(),
            "Collected monthly activity"
        );

        activity
    }

    fn entry(&mut self, date: NaiveDate) -> &mut MonthActivity {
        self.months.entry(YearMonth::from_date(date)).or_default()
    }

    /// 수집에 사용한 회계 기준.
    pub fn basis(&self) -> AccountingBasis {
        self.basis
    }

    /// 해당 월의 활동 (없으면 0으로 채운 값).
    pub fn get(&self, month: YearMonth) -> MonthActivity {
        self.months.get(&month).cloned().unwrap_or_default()
    }

    /// 월의 활동 합계(입금 − 출금 + 손익).
    pub fn net(&self, month: YearMonth) -> Amount {
        self.months
            .get(&month)
            .map(MonthActivity::net)
            .unwrap_or(Decimal::ZERO)
    }

    /// 활동이 있는 가장 이른 월.
    pub fn earliest(&self) -> Option<YearMonth> {
        self.months.keys().next().copied()
    }

    /// 활동이 있는 가장 늦은 월.
    pub fn latest(&self) -> Option<YearMonth> {
        self.months.keys().next_back().copied()
    }

    /// 활동이 있는 월 목록 (시간순).
    pub fn months(&self) -> impl Iterator<Item = (&YearMonth, &MonthActivity)> {
        self.months.iter()
    }

    /// 활동이 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal_core::Side;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    #[test]
    fn test_collect_by_basis() {
        let trade = JournalTrade::new("INFY", Side::Buy, date(2023, 1, 10), dec!(100), dec!(10))
            .with_exit(dec!(120), dec!(10), Some(date(2023, 2, 5)));
        let changes = vec![
            CapitalChange::deposit(date(2023, 1, 2), dec!(5000)),
            CapitalChange::withdrawal(date(2023, 2, 20), dec!(-1000)),
        ];
        let resolver = TradeAccountingResolver::default();

        let cash = MonthlyActivity::collect(&[trade.clone()], &changes, AccountingBasis::Cash, &resolver);
        assert_eq!(cash.get(ym(2023, 1)).pl, Decimal::ZERO);
        assert_eq!(cash.get(ym(2023, 2)).pl, dec!(200));
        assert_eq!(cash.get(ym(2023, 2)).withdrawals, dec!(1000));
        assert_eq!(cash.net(ym(2023, 2)), dec!(-800));

        let accrual = MonthlyActivity::collect(&[trade], &changes, AccountingBasis::Accrual, &resolver);
        assert_eq!(accrual.get(ym(2023, 1)).pl, dec!(200));
        assert_eq!(accrual.net(ym(2023, 1)), dec!(5200));
        assert_eq!(accrual.latest(), Some(ym(2023, 2)));
    }

    #[test]
    fn test_empty_activity() {
        let activity = MonthlyActivity::collect(
            &[],
            &[],
            AccountingBasis::Cash,
            &TradeAccountingResolver::default(),
        );
        assert!(activity.is_empty());
        assert_eq!(activity.earliest(), None);
        assert_eq!(activity.net(ym(2023, 1)), Decimal::ZERO);
    }
}
