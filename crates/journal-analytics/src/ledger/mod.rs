//! 자본 원장 모듈
//!
//! 월별 시작 자본을 연간 기준, 월간 오버라이드, 전월 최종 자본 순서로 결정합니다.
//!
//! # 모듈 구성
//!
//! - [`activity`]: 월별 입출금/손익 집계 (`MonthlyActivity`)
//! - [`capital_ledger`]: 월 단위 전진 스윕 (`CapitalLedger`, `MonthlyPortfolio`)

pub mod activity;
pub mod capital_ledger;

pub use activity::*;
pub use capital_ledger::*;
