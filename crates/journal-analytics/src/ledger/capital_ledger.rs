//! 자본 원장
//!
//! 월 시작 자본 결정 순서 (먼저 일치하는 단계에서 종료):
//!
//! 1. 해당 월의 `MonthlyCapitalOverride`
//! 2. 1월이면 해당 연도의 `YearlyStartingCapital`
//! 3. 전월 최종 자본 (`시작 + 입금 − 출금 + 실현 손익`)
//! 4. 조회 월 이전에 데이터가 전혀 없으면 기본 자본
//!
//! 3단계는 재귀 대신 가장 이른 데이터 월부터 조회 월까지 한 번의 전진 스윕으로 계산합니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use journal_core::{Amount, CapitalBaselines, YearMonth};

use super::activity::MonthlyActivity;

/// 기본 시작 자본.
pub const DEFAULT_STARTING_CAPITAL: Decimal = dec!(100000);

/// 월별 포트폴리오 요약 (파생 값).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPortfolio {
    /// 월 (1-12)
    pub month: u32,
    /// 연도
    pub year: i32,
    /// 월 시작 자본
    pub starting_capital: Amount,
    /// 입금 합계
    pub deposits: Amount,
    /// 출금 합계 (양수)
    pub withdrawals: Amount,
    /// 실현 손익
    pub pl: Amount,
    /// 월 최종 자본
    pub final_capital: Amount,
}

impl MonthlyPortfolio {
    /// 연-월 키.
    pub fn period(&self) -> YearMonth {
        YearMonth {
            year: self.year,
            month: self.month,
        }
    }

    /// 시작 자본 대비 손익률 (%). 시작 자본이 0 이하이면 0.
    pub fn return_pct(&self) -> Decimal {
        if self.starting_capital > Decimal::ZERO {
            self.pl / self.starting_capital * dec!(100)
        } else {
            Decimal::ZERO
        }
    }
}

/// 자본 원장.
#[derive(Debug, Clone)]
pub struct CapitalLedger {
    baselines: CapitalBaselines,
    default_capital: Amount,
}

impl Default for CapitalLedger {
    fn default() -> Self {
        Self::new(CapitalBaselines::default())
    }
}

impl CapitalLedger {
    /// 새 원장을 생성합니다.
    pub fn new(baselines: CapitalBaselines) -> Self {
        Self {
            baselines,
            default_capital: DEFAULT_STARTING_CAPITAL,
        }
    }

    /// 기본 시작 자본을 설정합니다.
    pub fn with_default_capital(mut self, capital: Amount) -> Self {
        self.default_capital = capital;
        self
    }

    /// 기본 시작 자본.
    pub fn default_capital(&self) -> Amount {
        self.default_capital
    }

    /// 자본 기준.
    pub fn baselines(&self) -> &CapitalBaselines {
        &self.baselines
    }

    /// 해당 월의 시작 자본.
    pub fn starting_capital(&self, month: u32, year: i32, activity: &MonthlyActivity) -> Amount {
        match YearMonth::new(year, month) {
            Some(ym) => self.starting_capital_for(ym, activity),
            None => self.default_capital,
        }
    }

    /// 해당 월의 최종 자본.
    pub fn ending_capital(&self, month: u32, year: i32, activity: &MonthlyActivity) -> Amount {
        match YearMonth::new(year, month) {
            Some(ym) => self.ending_capital_for(ym, activity),
            None => self.default_capital,
        }
    }

    /// `YearMonth` 기준 시작 자본.
    pub fn starting_capital_for(&self, target: YearMonth, activity: &MonthlyActivity) -> Amount {
        self.sweep(activity, target, target)
            .last()
            .map(|row| row.starting_capital)
            .unwrap_or(self.default_capital)
    }

    /// `YearMonth` 기준 최종 자본.
    pub fn ending_capital_for(&self, target: YearMonth, activity: &MonthlyActivity) -> Amount {
        self.sweep(activity, target, target)
            .last()
            .map(|row| row.final_capital)
            .unwrap_or(self.default_capital)
    }

    /// `from..=to` 구간의 월별 요약을 한 번의 전진 스윕으로 계산합니다.
    ///
    /// 스윕은 가장 이른 데이터 월(활동, 오버라이드, 연간 기준 1월)에서 시작하고,
    /// 반환값에는 `from` 이상인 월만 포함됩니다. `from > to`이면 빈 목록입니다.
    /// 마지막 데이터 월을 지나면 `from`으로 건너뛰며, `i32` 연도 끝에서 멈춥니다.
    pub fn sweep(
        &self,
        activity: &MonthlyActivity,
        from: YearMonth,
        to: YearMonth,
    ) -> Vec<MonthlyPortfolio> {
        if from > to {
            return Vec::new();
        }

        let start = [Some(from), activity.earliest(), self.baselines.earliest_month()]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(from);

        let horizon = [activity.latest(), self.baselines.latest_month()]
            .into_iter()
            .flatten()
            .max();

        let mut rows = Vec::new();
        let mut carried: Option<Amount> = None;
        let mut cursor = Some(start);

        while let Some(ym) = cursor.filter(|ym| *ym <= to) {
            let starting = self.resolve_start(ym, carried);
            let month = activity.get(ym);
            let final_capital = starting + month.net();

            if ym >= from {
                rows.push(MonthlyPortfolio {
                    month: ym.month,
                    year: ym.year,
                    starting_capital: starting,
                    deposits: month.deposits,
                    withdrawals: month.withdrawals,
                    pl: month.pl,
                    final_capital,
                });
            }

            carried = Some(final_capital);
            cursor = match horizon {
                // 마지막 데이터 월 이후로는 자본이 변하지 않음
                Some(last) if ym >= last && ym < from => Some(from),
                _ => ym.next(),
            };
        }

        rows
    }

    fn resolve_start(&self, ym: YearMonth, carried: Option<Amount>) -> Amount {
        if let Some(capital) = self.baselines.monthly_override(ym) {
            return capital;
        }
        if ym.is_january() {
            if let Some(capital) = self.baselines.yearly_capital(ym.year) {
                return capital;
            }
        }
        carried.unwrap_or(self.default_capital)
    }
}
