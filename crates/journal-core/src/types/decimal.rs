//! 정밀한 금융 계산을 위한 Decimal 유틸리티.
//!
//! 금액/가격/수량은 모두 `Decimal`로 다루고, 통계 지표 계산 직전에만 `f64`로 변환합니다.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 수량 타입.
pub type Quantity = Decimal;

/// 금액 타입 (자본, 입출금, 손익).
pub type Amount = Decimal;

/// 손익 비교 시 사용하는 기본 허용 오차.
///
/// 로트 합계와 캐시된 손익을 비교할 때 소수점 반올림 차이를 흡수합니다.
pub const PNL_TOLERANCE: Decimal = dec!(0.01);

/// Decimal 연산을 위한 확장 트레이트.
pub trait DecimalExt {
    /// 허용 오차 내에서 같은 값인지 확인합니다.
    fn approx_eq(&self, other: Decimal, tolerance: Decimal) -> bool;

    /// `f64`로 변환합니다. 표현 불가능한 값은 0으로 처리합니다.
    fn to_f64_lossy(&self) -> f64;

    /// 퍼센트 문자열로 변환합니다 (예: "5.25%").
    fn to_percentage_string(&self) -> String;
}

impl DecimalExt for Decimal {
    fn approx_eq(&self, other: Decimal, tolerance: Decimal) -> bool {
        (*self - other).abs() <= tolerance
    }

    fn to_f64_lossy(&self) -> f64 {
        self.to_f64().unwrap_or(0.0)
    }

    fn to_percentage_string(&self) -> String {
        let pct = *self * Decimal::from(100);
        format!("{:.2}%", pct)
    }
}

/// `f64`를 `Decimal`로 변환합니다. NaN/무한대는 0이 됩니다.
pub fn decimal_from_f64(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_ext() {
        let d = dec!(0.0525);
        assert_eq!(d.to_percentage_string(), "5.25%");
        assert!(dec!(100.004).approx_eq(dec!(100), PNL_TOLERANCE));
        assert!(!dec!(100.02).approx_eq(dec!(100), PNL_TOLERANCE));
    }

    #[test]
    fn test_f64_conversion() {
        assert_eq!(dec!(1.5).to_f64_lossy(), 1.5);
        assert_eq!(decimal_from_f64(f64::NAN), Decimal::ZERO);
        assert_eq!(decimal_from_f64(2.25), dec!(2.25));
    }
}
