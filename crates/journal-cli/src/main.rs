//! 매매일지 포트폴리오 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 월별 포트폴리오 (현금주의 기본)
//! journal monthly -i data/journal.json
//!
//! # 발생주의 기준 가치 시계열, 월말 집계
//! journal series -i data/journal.json --basis accrual --timeframe monthly
//!
//! # 위험 지표와 상위 낙폭 구간
//! journal metrics -i data/journal.json --top 3
//!
//! # XIRR
//! journal xirr -i data/journal.json
//!
//! # 전체 리포트 JSON 저장
//! journal report -i data/journal.json -o reports/journal.json
//! ```

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use journal_analytics::TimeFrame;
use journal_core::{init_logging, AccountingBasis};

mod commands;

use commands::input::{load_config, load_input, InputConfig};

#[derive(Parser)]
#[command(name = "journal")]
#[command(about = "Trading journal CLI - 포트폴리오 회계/성과 분석", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (기본: config/default.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// 모든 명령어 공통 입력 인자
#[derive(Args)]
struct InputArgs {
    /// 포트폴리오 스냅샷 JSON 파일
    #[arg(short, long)]
    input: PathBuf,

    /// 회계 기준 (cash: 현금주의, accrual: 발생주의)
    #[arg(short, long)]
    basis: Option<AccountingBasis>,
}

impl InputArgs {
    fn to_config(&self) -> InputConfig {
        InputConfig {
            input_path: self.input.clone(),
            basis: self.basis,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// 월별 포트폴리오 요약 (시작 자본, 입출금, 손익, 최종 자본)
    Monthly {
        #[command(flatten)]
        input: InputArgs,
    },

    /// 포트폴리오 가치 시계열
    Series {
        #[command(flatten)]
        input: InputArgs,

        /// 집계 기간 (daily, weekly, monthly, quarterly, yearly)
        #[arg(short, long)]
        timeframe: Option<TimeFrame>,
    },

    /// 위험 지표 (샤프/소르티노/칼마 비율, 최대 낙폭)
    Metrics {
        #[command(flatten)]
        input: InputArgs,

        /// 출력할 상위 낙폭 구간 수
        #[arg(long, default_value = "3")]
        top: usize,
    },

    /// XIRR (금액가중 연 수익률)
    Xirr {
        #[command(flatten)]
        input: InputArgs,
    },

    /// 전체 리포트 (JSON)
    Report {
        #[command(flatten)]
        input: InputArgs,

        /// 결과 저장 경로 (지정하지 않으면 stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // .env 파일은 선택 사항
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(config.logging.to_log_config())?;
    debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::Monthly { input } => {
            let loaded = load_input(&input.to_config(), &config.engine)?;
            let report = commands::monthly::run_monthly(&loaded);
            commands::monthly::print_monthly(&loaded, &report);
        }

        Commands::Series { input, timeframe } => {
            let loaded = load_input(&input.to_config(), &config.engine)?;
            let series = commands::series::run_series(&loaded, timeframe);
            commands::series::print_series(&loaded, &series);
        }

        Commands::Metrics { input, top } => {
            let loaded = load_input(&input.to_config(), &config.engine)?;
            let report = commands::metrics::run_metrics(&loaded, top);
            commands::metrics::print_metrics(&loaded, &report);
        }

        Commands::Xirr { input } => {
            let loaded = load_input(&input.to_config(), &config.engine)?;
            let report = commands::xirr::run_xirr(&loaded);
            commands::xirr::print_xirr(&loaded, &report);
        }

        Commands::Report { input, output } => {
            let loaded = load_input(&input.to_config(), &config.engine)?;
            let report = commands::report::run_report(&loaded);
            commands::report::write_report(&report, output.as_deref())?;
        }
    }

    Ok(())
}
