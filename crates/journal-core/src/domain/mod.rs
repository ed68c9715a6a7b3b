//! 매매일지 회계를 위한 도메인 모델.

mod basis;
mod calculations;
mod capital;
mod snapshot;
mod trade;

pub use basis::*;
pub use calculations::*;
pub use capital::*;
pub use snapshot::*;
pub use trade::*;
