//! # filesig-core
//!
//! filesig 核心库, 提供错误类型、签名定义和十六进制规范化工具.

pub mod error;
pub mod hex;
pub mod signature;

// 重导出常用类型
pub use error::{FilesigError, FilesigResult};
pub use hex::{parse_hex_pattern, to_canonical_hex};
pub use signature::Signature;
