//! 성과 분석 모듈
//!
//! 포트폴리오 가치 시계열의 위험 지표를 계산합니다.
//!
//! # 모듈 구성
//!
//! - [`metrics`]: 위험 지표 계산 (샤프/소르티노/칼마 비율, 최대낙폭 등)

pub mod metrics;

pub use metrics::*;
