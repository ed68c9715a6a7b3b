//! 포트폴리오 분석 모듈
//!
//! 거래와 입출금을 날짜순으로 재생하여 가치 시계열과 월별 요약을 만듭니다.
//!
//! # 모듈 구성
//!
//! - [`value_series`]: 불규칙 간격 가치 시계열, 낙폭 구간 분석
//! - [`builder`]: 시계열/월별 요약 빌더
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use journal_analytics::portfolio::{PortfolioTimeSeriesBuilder, TimeFrame};
//! use journal_core::AccountingBasis;
//!
//! let builder = PortfolioTimeSeriesBuilder::new();
//! let series = builder.build_time_series(&trades, &capital_changes, AccountingBasis::Cash);
//!
//! // 월별 마지막 값
//! let monthly = series.aggregate(TimeFrame::Monthly);
//!
//! println!("최대 낙폭: {:.2}%", series.max_drawdown() * 100.0);
//! ```

pub mod builder;
pub mod value_series;

pub use builder::*;
pub use value_series::*;
