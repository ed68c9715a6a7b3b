//! 거래 회계 해석 모듈
//!
//! 회계 기준(현금주의/발생주의)에 따라 거래의 손익 귀속 날짜와 실현 손익을 결정합니다.
//!
//! # 모듈 구성
//!
//! - [`resolver`]: `TradeAccountingResolver`, 청산 레그 뷰(`ExitLegView`)

pub mod resolver;

pub use resolver::*;
