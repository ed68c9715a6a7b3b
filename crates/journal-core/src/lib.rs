//! # Journal Core
//!
//! 매매일지 포트폴리오 회계 엔진의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 회계 엔진 전반에서 사용되는 기본 타입을 제공합니다:
//! - 매매일지 거래 기록 (진입/피라미딩/청산 로트)
//! - 자본 입출금 기록 및 연간/월간 자본 기준
//! - 회계 기준 (현금주의 / 발생주의)
//! - 로트 단위 손익 계산 (FIFO, 가중평균)
//! - 월 단위 기간 타입
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
