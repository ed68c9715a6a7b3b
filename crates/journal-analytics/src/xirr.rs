//! XIRR (금액가중 연환산 수익률) 계산
//!
//! 불규칙한 날짜의 현금흐름에 대해 NPV(rate) = 0 이 되는 연 수익률을 찾습니다.
//!
//! # 알고리즘
//!
//! - 시간 단위: 첫 현금흐름 기준 `일수 / 365`
//! - 뉴턴-랩슨: 초기값 0.10, `|NPV| < 1e-7` 또는 `|Δrate| < 1e-7`이면 수렴, 최대 100회
//! - 도함수가 0에 가깝거나, 반복값이 -100% 이하로 내려가거나, 유한하지 않으면
//!   이분법으로 전환
//! - 이분법 구간: `[-0.9999, 100]`을 `(1 + rate)` 기준 등비 격자로 나눠 NPV 부호가
//!   바뀌는 소구간을 찾고, 근이 여러 개면 초기값에 가장 가까운 소구간을 사용
//!
//! 현금흐름이 2개 미만이거나 부호가 한쪽뿐이면 수익률이 정의되지 않습니다(`None`).
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use journal_analytics::xirr::{CashFlow, XirrSolver};
//!
//! let flows = vec![
//!     CashFlow::new(start, dec!(-100000)),
//!     CashFlow::new(end, dec!(110000)),
//! ];
//! let pct = XirrSolver::default().xirr_percentage(&flows); // ≈ 10.0
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use journal_core::{Amount, CapitalChange, CapitalChangeKind, DecimalExt};

/// 연 환산 기준 일수.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// 이분법 탐색 하한 (-99.99%).
const BISECTION_LOWER: f64 = -0.9999;

/// 이분법 탐색 상한 (+10,000%).
const BISECTION_UPPER: f64 = 100.0;

/// 부호 변화 탐색 격자 칸 수.
const BRACKET_SCAN_STEPS: u32 = 400;

/// 이분법 최대 반복 횟수.
const BISECTION_MAX_ITERATIONS: u32 = 200;

/// 도함수가 0으로 간주되는 임계값.
const DERIVATIVE_EPSILON: f64 = 1e-12;

/// 날짜가 있는 현금흐름.
///
/// 투자자 관점 부호: 출자(입금)는 음수, 회수(출금, 최종 평가액)는 양수.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlow {
    /// 현금흐름 날짜
    pub date: NaiveDate,
    /// 금액
    pub amount: Amount,
}

impl CashFlow {
    /// 새 현금흐름을 생성합니다.
    pub fn new(date: NaiveDate, amount: Amount) -> Self {
        Self { date, amount }
    }

    /// 자본 이력에서 투자자 관점 현금흐름을 만듭니다.
    ///
    /// - `opening`: 입출금 기록에 없는 시작 자본 (날짜, 금액) → 음수
    /// - 입금 → 음수, 출금 → 양수
    /// - 최종 평가액 → 양수
    ///
    /// 결과는 날짜순으로 정렬됩니다 (같은 날짜는 입력 순서 유지).
    pub fn from_capital_history(
        opening: Option<(NaiveDate, Amount)>,
        capital_changes: &[CapitalChange],
        final_value: Amount,
        final_date: NaiveDate,
    ) -> Vec<CashFlow> {
        let mut flows = Vec::with_capacity(capital_changes.len() + 2);

        if let Some((date, amount)) = opening {
            if !amount.is_zero() {
                flows.push(CashFlow::new(date, -amount.abs()));
            }
        }

        for change in capital_changes {
            let amount = match change.kind {
                CapitalChangeKind::Deposit => -change.amount.abs(),
                CapitalChangeKind::Withdrawal => change.amount.abs(),
            };
            flows.push(CashFlow::new(change.date, amount));
        }

        flows.push(CashFlow::new(final_date, final_value));
        flows.sort_by_key(|flow| flow.date);
        flows
    }
}

/// 수렴에 사용된 방법.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveMethod {
    /// 뉴턴-랩슨
    NewtonRaphson,
    /// 이분법
    Bisection,
}

/// XIRR 계산 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XirrOutcome {
    /// 연 수익률 (0.10 = 10%)
    pub rate: f64,
    /// 반복 횟수
    pub iterations: u32,
    /// 수렴 여부 (`false`면 마지막 반복값)
    pub converged: bool,
    /// 사용된 방법
    pub method: SolveMethod,
}

impl XirrOutcome {
    /// 백분율 (`rate × 100`).
    pub fn percentage(&self) -> f64 {
        self.rate * 100.0
    }
}

/// XIRR 솔버.
#[derive(Debug, Clone, Copy)]
pub struct XirrSolver {
    initial_guess: f64,
    tolerance: f64,
    max_iterations: u32,
}

impl Default for XirrSolver {
    fn default() -> Self {
        Self {
            initial_guess: 0.10,
            tolerance: 1e-7,
            max_iterations: 100,
        }
    }
}

impl XirrSolver {
    /// 기본 설정 솔버를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 초기 추정값을 설정합니다.
    pub fn with_initial_guess(mut self, guess: f64) -> Self {
        self.initial_guess = guess;
        self
    }

    /// 최대 반복 횟수를 설정합니다.
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// XIRR을 백분율로 반환합니다. 정의되지 않으면 0.
    pub fn xirr_percentage(&self, flows: &[CashFlow]) -> f64 {
        self.solve(flows)
            .map(|outcome| outcome.percentage())
            .unwrap_or(0.0)
    }

    /// XIRR을 계산합니다.
    ///
    /// 현금흐름이 2개 미만이거나, 양수와 음수가 모두 있지 않거나,
    /// 모든 현금흐름이 같은 날짜이면 `None`.
    pub fn solve(&self, flows: &[CashFlow]) -> Option<XirrOutcome> {
        if flows.len() < 2 {
            debug!(flows = flows.len(), "XIRR undefined: fewer than two cash flows");
            return None;
        }

        let mut sorted: Vec<&CashFlow> = flows.iter().collect();
        sorted.sort_by_key(|flow| flow.date);

        let has_outflow = sorted.iter().any(|f| f.amount.is_sign_negative() && !f.amount.is_zero());
        let has_inflow = sorted.iter().any(|f| f.amount.is_sign_positive() && !f.amount.is_zero());
        if !(has_outflow && has_inflow) {
            debug!("XIRR undefined: cash flows do not change sign");
            return None;
        }

        let origin = sorted[0].date;
        let terms: Vec<(f64, f64)> = sorted
            .iter()
            .map(|flow| {
                let years = (flow.date - origin).num_days() as f64 / DAYS_PER_YEAR;
                (years, flow.amount.to_f64_lossy())
            })
            .collect();

        if terms.iter().all(|(t, _)| *t == 0.0) {
            debug!("XIRR undefined: all cash flows on the same date");
            return None;
        }

        self.newton_raphson(&terms)
    }

    fn newton_raphson(&self, terms: &[(f64, f64)]) -> Option<XirrOutcome> {
        let mut rate = self.initial_guess;

        for iteration in 1..=self.max_iterations {
            let (value, derivative) = npv_with_derivative(terms, rate);

            if !value.is_finite() || !derivative.is_finite() {
                return self.bisection(terms);
            }
            if value.abs() < self.tolerance {
                return Some(XirrOutcome {
                    rate,
                    iterations: iteration,
                    converged: true,
                    method: SolveMethod::NewtonRaphson,
                });
            }
            if derivative.abs() < DERIVATIVE_EPSILON {
                return self.bisection(terms);
            }

            let next = rate - value / derivative;
            if !next.is_finite() || next <= -1.0 {
                return self.bisection(terms);
            }
            if (next - rate).abs() < self.tolerance {
                return Some(XirrOutcome {
                    rate: next,
                    iterations: iteration,
                    converged: true,
                    method: SolveMethod::NewtonRaphson,
                });
            }

            rate = next;
        }

        warn!(
            rate,
            iterations = self.max_iterations,
            "XIRR did not converge, returning last iterate"
        );

        Some(XirrOutcome {
            rate,
            iterations: self.max_iterations,
            converged: false,
            method: SolveMethod::NewtonRaphson,
        })
    }

    fn bisection(&self, terms: &[(f64, f64)]) -> Option<XirrOutcome> {
        let Some((mut low, mut high)) = self.find_bracket(terms) else {
            debug!("XIRR undefined: no sign change in bisection range");
            return None;
        };
        let mut f_low = npv(terms, low);

        if f_low == 0.0 {
            return Some(XirrOutcome {
                rate: low,
                iterations: 0,
                converged: true,
                method: SolveMethod::Bisection,
            });
        }

        for iteration in 1..=BISECTION_MAX_ITERATIONS {
            let mid = (low + high) / 2.0;
            let f_mid = npv(terms, mid);

            if f_mid.abs() < self.tolerance || (high - low) / 2.0 < self.tolerance {
                return Some(XirrOutcome {
                    rate: mid,
                    iterations: iteration,
                    converged: true,
                    method: SolveMethod::Bisection,
                });
            }

            if f_mid.signum() == f_low.signum() {
                low = mid;
                f_low = f_mid;
            } else {
                high = mid;
            }
        }

        Some(XirrOutcome {
            rate: (low + high) / 2.0,
            iterations: BISECTION_MAX_ITERATIONS,
            converged: false,
            method: SolveMethod::Bisection,
        })
    }

    /// NPV 부호가 바뀌는 소구간 `(low, high)`를 찾습니다.
    ///
    /// 격자는 `ln(1 + rate)`에서 등간격입니다. 후보가 여러 개면 초기 추정값에서
    /// 가장 가까운 구간을 고릅니다.
    fn find_bracket(&self, terms: &[(f64, f64)]) -> Option<(f64, f64)> {
        let log_low = (1.0 + BISECTION_LOWER).ln();
        let log_high = (1.0 + BISECTION_UPPER).ln();
        let step = (log_high - log_low) / BRACKET_SCAN_STEPS as f64;

        let mut best: Option<((f64, f64), f64)> = None;
        let mut prev_rate = BISECTION_LOWER;
        let mut prev_value = npv(terms, prev_rate);

        for i in 1..=BRACKET_SCAN_STEPS {
            let rate = if i == BRACKET_SCAN_STEPS {
                BISECTION_UPPER
            } else {
                (log_low + step * i as f64).exp() - 1.0
            };
            let value = npv(terms, rate);

            if prev_value.is_finite() && value.is_finite() && prev_value * value <= 0.0 {
                let distance = if (prev_rate..=rate).contains(&self.initial_guess) {
                    0.0
                } else {
                    (prev_rate - self.initial_guess)
                        .abs()
                        .min((rate - self.initial_guess).abs())
                };
                if best.map_or(true, |(_, d)| distance < d) {
                    best = Some(((prev_rate, rate), distance));
                }
            }

            prev_rate = rate;
            prev_value = value;
        }

        best.map(|(bracket, _)| bracket)
    }
}

/// NPV(rate) = Σ aᵢ / (1 + rate)^tᵢ
fn npv(terms: &[(f64, f64)], rate: f64) -> f64 {
    terms
        .iter()
        .map(|(t, amount)| amount / (1.0 + rate).powf(*t))
        .sum()
}

/// NPV와 도함수 dNPV/drate = Σ -tᵢ·aᵢ / (1 + rate)^(tᵢ+1)
fn npv_with_derivative(terms: &[(f64, f64)], rate: f64) -> (f64, f64) {
    let base = 1.0 + rate;
    terms
        .iter()
        .fold((0.0, 0.0), |(value, derivative), (t, amount)| {
            let discount = base.powf(*t);
            (
                value + amount / discount,
                derivative - t * amount / (discount * base),
            )
        })
}
