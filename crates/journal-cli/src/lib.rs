//! 매매일지 CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 포트폴리오 스냅샷/설정 로드
//! - 월별 요약, 가치 시계열, 위험 지표, XIRR 출력
//! - 전체 리포트 JSON 저장

pub mod commands;

pub use commands::*;
