//! 가치 시계열 명령어.
//!
//! # 사용 예시
//!
//! ```bash
//! # 이벤트 날짜별 (불규칙 간격)
//! journal series -i data/journal.json
//!
//! # 월말 값으로 집계
//! journal series -i data/journal.json --timeframe monthly
//! ```

use journal_analytics::{TimeFrame, ValueSeries};
use journal_core::DecimalExt;
use tracing::info;

use super::input::LoadedInput;

/// 가치 시계열을 계산합니다. `timeframe`이 있으면 기간별 마지막 값으로 집계합니다.
pub fn run_series(input: &LoadedInput, timeframe: Option<TimeFrame>) -> ValueSeries {
    let series = input.builder().build_time_series(
        &input.snapshot.trades,
        &input.snapshot.capital_changes,
        input.basis,
    );

    let series = match timeframe {
        Some(tf) => series.aggregate(tf),
        None => series,
    };

    info!(points = series.len(), "Value series built");
    series
}

/// 가치 시계열 출력.
pub fn print_series(input: &LoadedInput, series: &ValueSeries) {
    println!("\n📈 포트폴리오 가치 시계열 ({} 기준)", input.basis);
    println!("═══════════════════════════════════════════════════");

    if series.is_empty() {
        println!("  데이터가 없습니다.");
        return;
    }

    println!("  {:<12} | {:>16} | {:>10}", "날짜", "가치", "낙폭");
    println!("  ─────────────────────────────────────────────────");

    for point in series.points() {
        println!(
            "  {:<12} | {:>16.2} | {:>10}",
            point.timestamp.format("%Y-%m-%d").to_string(),
            point.value,
            point.drawdown.to_percentage_string(),
        );
    }

    println!("  ─────────────────────────────────────────────────");
    println!(
        "  총 수익률: {} | 최대 낙폭: {}",
        series.total_return().to_percentage_string(),
        series.max_drawdown().to_percentage_string(),
    );
    println!("═══════════════════════════════════════════════════");
}
