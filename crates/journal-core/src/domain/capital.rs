//! 자본 입출금 및 자본 기준.
//!
//! - `CapitalChange` - 사용자가 기록하는 입금/출금 이벤트
//! - `YearlyStartingCapital` - 해당 연도 1월의 기준 자본
//! - `MonthlyCapitalOverride` - 특정 월의 시작 자본을 직접 지정
//! - `CapitalBaselines` - 위 두 기준을 조회용으로 묶은 인덱스

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::types::{Amount, YearMonth};

/// 자본 변동 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapitalChangeKind {
    /// 입금
    Deposit,
    /// 출금
    Withdrawal,
}

/// 자본 입출금 기록.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalChange {
    /// 기록 ID
    pub id: Uuid,
    /// 입출금 날짜
    pub date: NaiveDate,
    /// 금액 (일지에 따라 출금이 음수로 저장되기도 함)
    pub amount: Amount,
    /// 입금/출금 구분
    #[serde(rename = "type")]
    pub kind: CapitalChangeKind,
    /// 메모
    #[serde(default)]
    pub description: String,
}

impl CapitalChange {
    /// 새 입출금 기록을 생성합니다.
    pub fn new(kind: CapitalChangeKind, date: NaiveDate, amount: Amount) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            amount,
            kind,
            description: String::new(),
        }
    }

    /// 입금 기록.
    pub fn deposit(date: NaiveDate, amount: Amount) -> Self {
        Self::new(CapitalChangeKind::Deposit, date, amount)
    }

    /// 출금 기록.
    pub fn withdrawal(date: NaiveDate, amount: Amount) -> Self {
        Self::new(CapitalChangeKind::Withdrawal, date, amount)
    }

    /// 메모를 설정합니다.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// 자본에 미치는 부호 있는 영향.
    ///
    /// 부호는 `kind`로만 결정하고 금액은 절대값을 사용하므로,
    /// 출금을 양수/음수 어느 쪽으로 저장한 일지든 같은 결과가 나옵니다.
    pub fn signed_amount(&self) -> Amount {
        match self.kind {
            CapitalChangeKind::Deposit => self.amount.abs(),
            CapitalChangeKind::Withdrawal => -self.amount.abs(),
        }
    }

    /// 입금액 (출금이면 0).
    pub fn deposit_amount(&self) -> Amount {
        match self.kind {
            CapitalChangeKind::Deposit => self.amount.abs(),
            CapitalChangeKind::Withdrawal => Decimal::ZERO,
        }
    }

    /// 출금액 (입금이면 0, 양수로 표시).
    pub fn withdrawal_amount(&self) -> Amount {
        match self.kind {
            CapitalChangeKind::Deposit => Decimal::ZERO,
            CapitalChangeKind::Withdrawal => self.amount.abs(),
        }
    }
}

/// 연간 시작 자본 (해당 연도 1월 기준).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyStartingCapital {
    /// 연도
    pub year: i32,
    /// 시작 자본
    pub capital: Amount,
}

/// 월간 시작 자본 오버라이드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCapitalOverride {
    /// 월 (1-12)
    pub month: u32,
    /// 연도
    pub year: i32,
    /// 시작 자본
    pub capital: Amount,
}

/// 자본 기준 인덱스.
///
/// 같은 키가 여러 번 들어오면 마지막 값이 우선합니다.
#[derive(Debug, Clone, Default)]
pub struct CapitalBaselines {
    yearly: BTreeMap<i32, Amount>,
    monthly: BTreeMap<YearMonth, Amount>,
}

impl CapitalBaselines {
    /// 빈 기준을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 목록 형태의 기준들로부터 인덱스를 생성합니다.
    ///
    /// 월 범위를 벗어난 오버라이드는 무시됩니다.
    pub fn from_entries(
        yearly: &[YearlyStartingCapital],
        overrides: &[MonthlyCapitalOverride],
    ) -> Self {
        let mut baselines = Self::new();
        for entry in yearly {
            baselines = baselines.with_yearly_capital(entry.year, entry.capital);
        }
        for entry in overrides {
            baselines = baselines.with_monthly_override(entry.month, entry.year, entry.capital);
        }
        baselines
    }

    /// 연간 시작 자본을 설정합니다.
    pub fn with_yearly_capital(mut self, year: i32, capital: Amount) -> Self {
        self.yearly.insert(year, capital);
        self
    }

    /// 월간 오버라이드를 설정합니다.
    pub fn with_monthly_override(mut self, month: u32, year: i32, capital: Amount) -> Self {
        if let Some(ym) = YearMonth::new(year, month) {
            self.monthly.insert(ym, capital);
        } else {
            tracing::warn!(month, year, "Ignoring monthly capital override with invalid month");
        }
        self
    }

    /// 해당 연도의 연간 시작 자본.
    pub fn yearly_capital(&self, year: i32) -> Option<Amount> {
        self.yearly.get(&year).copied()
    }

    /// 해당 월의 오버라이드.
    pub fn monthly_override(&self, month: YearMonth) -> Option<Amount> {
        self.monthly.get(&month).copied()
    }

    /// 기준 데이터가 존재하는 가장 이른 월.
    ///
    /// 연간 기준은 해당 연도 1월로 간주합니다.
    pub fn earliest_month(&self) -> Option<YearMonth> {
        let yearly = self
            .yearly
            .keys()
            .next()
            .and_then(|&year| YearMonth::new(year, 1));
        let monthly = self.monthly.keys().next().copied();

        match (yearly, monthly) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// 기준 데이터가 존재하는 가장 늦은 월.
    pub fn latest_month(&self) -> Option<YearMonth> {
        let yearly = self
            .yearly
            .keys()
            .next_back()
            .and_then(|&year| YearMonth::new(year, 1));
        let monthly = self.monthly.keys().next_back().copied();
        yearly.max(monthly)
    }

    /// 연간 기준 항목 목록 (연도 오름차순).
    pub fn yearly_entries(&self) -> Vec<YearlyStartingCapital> {
        self.yearly
            .iter()
            .map(|(&year, &capital)| YearlyStartingCapital { year, capital })
            .collect()
    }

    /// 월간 오버라이드 항목 목록 (시간순).
    pub fn override_entries(&self) -> Vec<MonthlyCapitalOverride> {
        self.monthly
            .iter()
            .map(|(ym, &capital)| MonthlyCapitalOverride {
                month: ym.month,
                year: ym.year,
                capital,
            })
            .collect()
    }

    /// 기준이 하나도 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.yearly.is_empty() && self.monthly.is_empty()
    }
}
