//! CLI 명령어 구현 모듈.

pub mod input;
pub mod metrics;
pub mod monthly;
pub mod report;
pub mod series;
pub mod xirr;

// 각 서브모듈 직접 사용 권장 (ambiguous re-export 방지)
