//! 회계 기준.
//!
//! 회계 기준은 전역 상태가 아니라 모든 계산 함수에 명시적 인자로 전달됩니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::JournalError;

/// 실현 손익을 어느 날짜에 귀속시킬지 결정하는 회계 기준.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountingBasis {
    /// 현금주의: 청산일(들)에 손익 귀속
    #[default]
    Cash,
    /// 발생주의: 거래(진입)일에 손익 귀속
    Accrual,
}

impl fmt::Display for AccountingBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountingBasis::Cash => write!(f, "cash"),
            AccountingBasis::Accrual => write!(f, "accrual"),
        }
    }
}

impl FromStr for AccountingBasis {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cash" => Ok(AccountingBasis::Cash),
            "accrual" => Ok(AccountingBasis::Accrual),
            _ => Err(JournalError::InvalidInput(format!(
                "Unknown accounting basis: {}",
                s
            ))),
        }
    }
}
