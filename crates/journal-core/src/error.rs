//! 매매일지 엔진의 에러 타입.
//!
//! 회계 계산 자체는 실패하지 않고 0 또는 정해진 센티널 값으로 degrade 됩니다.
//! 이 에러 타입은 입력 검증, 설정 로드, 스냅샷 파싱 경계에서만 사용됩니다.

use thiserror::Error;

/// 매매일지 에러.
#[derive(Debug, Error)]
pub enum JournalError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 데이터 불일치 (캐시 필드와 로트 합계 불일치 등)
    #[error("데이터 에러: {0}")]
    Data(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 입출력 에러
    #[error("입출력 에러: {0}")]
    Io(String),
}

/// 매매일지 작업을 위한 Result 타입.
pub type JournalResult<T> = Result<T, JournalError>;

impl JournalError {
    /// 입력 데이터 자체의 문제인지 확인합니다.
    ///
    /// 데이터 문제는 사용자가 일지를 수정해야 해결되며, 재계산으로는 해결되지 않습니다.
    pub fn is_data_issue(&self) -> bool {
        matches!(self, JournalError::InvalidInput(_) | JournalError::Data(_))
    }
}

impl From<serde_json::Error> for JournalError {
    fn from(err: serde_json::Error) -> Self {
        JournalError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for JournalError {
    fn from(err: config::ConfigError) -> Self {
        JournalError::Config(err.to_string())
    }
}

impl From<std::io::Error> for JournalError {
    fn from(err: std::io::Error) -> Self {
        JournalError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_data_issue() {
        let data_err = JournalError::Data("exited_qty mismatch".to_string());
        assert!(data_err.is_data_issue());

        let config_err = JournalError::Config("missing file".to_string());
        assert!(!config_err.is_data_issue());
    }

    #[test]
    fn test_error_from_serde() {
        let err: JournalError = serde_json::from_str::<u32>("not a number")
            .unwrap_err()
            .into();
        assert!(matches!(err, JournalError::Serialization(_)));
    }
}
