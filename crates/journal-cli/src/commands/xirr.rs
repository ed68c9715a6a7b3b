//! XIRR 명령어.
//!
//! 입출금 기록과 마지막 시계열 값으로 금액가중 연 수익률을 계산합니다.
//!
//! # 사용 예시
//!
//! ```bash
//! journal xirr -i data/journal.json
//! ```

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use journal_analytics::{CashFlow, XirrOutcome, XirrSolver};

use super::input::LoadedInput;

/// XIRR 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XirrReport {
    /// 투자자 관점 현금흐름
    pub flows: Vec<CashFlow>,
    /// 솔버 결과 (정의되지 않으면 None)
    pub outcome: Option<XirrOutcome>,
    /// 연 수익률 (%), 정의되지 않으면 0
    pub percentage: f64,
}

/// XIRR을 계산합니다.
pub fn run_xirr(input: &LoadedInput) -> XirrReport {
    let flows = input.builder().cash_flows(
        &input.snapshot.trades,
        &input.snapshot.capital_changes,
        input.basis,
    );

    let outcome = XirrSolver::default().solve(&flows);
    let percentage = outcome.map(|o| o.percentage()).unwrap_or(0.0);

    match &outcome {
        Some(o) if !o.converged => warn!(rate = o.rate, "XIRR is an approximation (not converged)"),
        Some(o) => info!(rate = o.rate, iterations = o.iterations, "XIRR computed"),
        None => info!(flows = flows.len(), "XIRR undefined for these cash flows"),
    }

    XirrReport {
        flows,
        outcome,
        percentage,
    }
}

/// XIRR 결과 출력.
pub fn print_xirr(input: &LoadedInput, report: &XirrReport) {
    println!("\n💰 XIRR ({} 기준)", input.basis);
    println!("═══════════════════════════════════════════════════");
    println!("  {:<12} | {:>16}", "날짜", "현금흐름");
    println!("  ─────────────────────────────────────────────────");
    for flow in &report.flows {
        println!("  {:<12} | {:>16.2}", flow.date.to_string(), flow.amount);
    }
    println!("  ─────────────────────────────────────────────────");

    match &report.outcome {
        Some(o) => println!(
            "  XIRR: {:.2}% ({:?}, {}회 반복{})",
            report.percentage,
            o.method,
            o.iterations,
            if o.converged { "" } else { ", 미수렴" }
        ),
        None => println!("  XIRR: 계산 불가 (현금흐름 부족)"),
    }
    println!("═══════════════════════════════════════════════════");
}
