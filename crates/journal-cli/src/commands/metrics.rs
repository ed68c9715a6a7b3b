//! 위험 지표 명령어.
//!
//! # 사용 예시
//!
//! ```bash
//! journal metrics -i data/journal.json
//! journal metrics -i data/journal.json --top 5
//! ```

use serde::{Deserialize, Serialize};
use tracing::info;

use journal_analytics::{DrawdownPeriod, RiskSummary};
use journal_core::DecimalExt;

use super::input::LoadedInput;

/// 위험 지표 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// 위험 지표 요약
    pub summary: RiskSummary,
    /// 상위 낙폭 구간
    pub drawdowns: Vec<DrawdownPeriod>,
}

/// 가치 시계열에서 위험 지표와 상위 낙폭 구간을 계산합니다.
pub fn run_metrics(input: &LoadedInput, top: usize) -> MetricsReport {
    let series = input.builder().build_time_series(
        &input.snapshot.trades,
        &input.snapshot.capital_changes,
        input.basis,
    );

    let summary = input.risk_engine().summarize(&series);
    let drawdowns = series.top_drawdowns(top);

    info!(
        observations = summary.observations,
        drawdown_periods = drawdowns.len(),
        "Risk metrics computed"
    );

    MetricsReport { summary, drawdowns }
}

/// 위험 지표 출력.
pub fn print_metrics(input: &LoadedInput, report: &MetricsReport) {
    let s = &report.summary;

    println!("\n📊 위험 지표 ({} 기준)", input.basis);
    println!("═══════════════════════════════════════════════════");
    println!("  관측치            : {}", s.observations);
    println!("  총 수익률         : {:.2}%", s.total_return * 100.0);
    println!("  연환산 수익률     : {:.2}%", s.annualized_return * 100.0);
    println!("  연환산 변동성     : {:.2}%", s.annualized_volatility * 100.0);
    println!("  하방 편차         : {:.2}%", s.downside_deviation * 100.0);
    println!("  최대 낙폭         : {:.2}%", s.max_drawdown * 100.0);
    println!("  샤프 비율         : {:.2}", s.sharpe_ratio);
    println!("  소르티노 비율     : {:.2}", s.sortino_ratio);
    println!("  칼마 비율         : {:.2}", s.calmar_ratio);

    if !report.drawdowns.is_empty() {
        println!();
        println!("  {:<12} | {:<12} | {:<12} | {:>9} | {:>6}", "고점", "저점", "회복", "낙폭", "일수");
        println!("  ─────────────────────────────────────────────────────────────");
        for dd in &report.drawdowns {
            let end = dd
                .end
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:<12} | {:<12} | {:<12} | {:>9} | {:>6}",
                dd.start.format("%Y-%m-%d").to_string(),
                dd.trough.format("%Y-%m-%d").to_string(),
                end,
                dd.max_drawdown.to_percentage_string(),
                dd.duration_days,
            );
        }
    }

    println!("═══════════════════════════════════════════════════");
}
