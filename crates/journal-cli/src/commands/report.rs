//! 전체 리포트 명령어.
//!
//! 월별 요약, 가치 시계열, 위험 지표, XIRR을 하나의 JSON으로 출력합니다.
//!
//! # 사용 예시
//!
//! ```bash
//! # 표준 출력
//! journal report -i data/journal.json
//!
//! # 파일로 저장
//! journal report -i data/journal.json -o reports/2023.json
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use journal_analytics::{MonthlyReport, ValueSeries};
use journal_core::AccountingBasis;

use super::input::LoadedInput;
use super::metrics::{run_metrics, MetricsReport};
use super::monthly::run_monthly;
use super::series::run_series;
use super::xirr::{run_xirr, XirrReport};

/// 리포트에 포함할 상위 낙폭 구간 수.
const REPORT_TOP_DRAWDOWNS: usize = 5;

/// 전체 리포트.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullReport {
    /// 회계 기준
    pub basis: AccountingBasis,
    /// 월별 요약
    pub monthly: MonthlyReport,
    /// 이벤트 날짜별 가치 시계열
    pub series: ValueSeries,
    /// 위험 지표
    pub metrics: MetricsReport,
    /// XIRR
    pub xirr: XirrReport,
}

/// 전체 리포트를 계산합니다.
pub fn run_report(input: &LoadedInput) -> FullReport {
    FullReport {
        basis: input.basis,
        monthly: run_monthly(input),
        series: run_series(input, None),
        metrics: run_metrics(input, REPORT_TOP_DRAWDOWNS),
        xirr: run_xirr(input),
    }
}

/// 리포트를 JSON으로 저장하거나 출력합니다.
pub fn write_report(report: &FullReport, output: Option<&Path>) -> Result<()> {
    let content = serde_json::to_string_pretty(report)?;

    match output {
        Some(path) => {
            // 디렉토리 생성
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
            info!(path = %path.display(), "Report saved");
            println!("\n📁 결과 저장됨: {}", path.display());
        }
        None => println!("{content}"),
    }

    Ok(())
}
