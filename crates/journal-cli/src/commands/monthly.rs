//! 월별 포트폴리오 명령어.
//!
//! # 사용 예시
//!
//! ```bash
//! journal monthly -i data/journal.json
//! journal monthly -i data/journal.json --basis accrual
//! ```

use journal_analytics::MonthlyReport;
use tracing::info;

use super::input::LoadedInput;

/// 월별 요약표를 계산합니다.
pub fn run_monthly(input: &LoadedInput) -> MonthlyReport {
    let report = input.builder().build_monthly(
        &input.snapshot.trades,
        &input.snapshot.capital_changes,
        input.basis,
    );
    info!(months = report.rows.len(), "Monthly table built");
    report
}

/// 월별 요약표 출력.
pub fn print_monthly(input: &LoadedInput, report: &MonthlyReport) {
    println!("\n📅 월별 포트폴리오 ({} 기준)", input.basis);
    println!("═══════════════════════════════════════════════════════════════════════════════════");

    if report.rows.is_empty() {
        println!("  데이터가 없습니다.");
        return;
    }

    println!(
        "  {:<8} | {:>14} | {:>12} | {:>12} | {:>12} | {:>14} | {:>8}",
        "월", "시작 자본", "입금", "출금", "손익", "최종 자본", "수익률"
    );
    println!("  ─────────────────────────────────────────────────────────────────────────────────");

    for row in &report.rows {
        println!(
            "  {:<8} | {:>14.2} | {:>12.2} | {:>12.2} | {:>12.2} | {:>14.2} | {:>7.2}%",
            row.period().to_string(),
            row.starting_capital,
            row.deposits,
            row.withdrawals,
            row.pl,
            row.final_capital,
            row.return_pct(),
        );
    }

    println!("═══════════════════════════════════════════════════════════════════════════════════");
}
