//! # filesig
//!
//! 基于文件头魔数的文件类型识别.
//!
//! 读取文件开头的 16 个字节, 转换为规范化十六进制字符串, 在有序签名表中
//! 查找第一个命中的条目, 并可选地附带系统探测的 MIME 类型.
//!
//! # 快速开始
//!
//! ```rust,no_run
//! let identifier = filesig::default_identifier();
//! let result = identifier.identify("mira.png");
//! if let Some(line) = result.mime_info {
//!     println!("{line}");
//! }
//! if let Some(line) = result.file_info {
//!     println!("{line}");
//! }
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `filesig-core` | 错误类型、签名定义、十六进制规范化 |
//! | `filesig-detect` | 签名表、签名来源、MIME 探测、识别器 |

/// 核心类型与工具
pub use filesig_core as core;

/// 签名表与识别引擎
pub use filesig_detect as detect;

pub use filesig_core::{FilesigError, FilesigResult, Signature};
pub use filesig_detect::{IdentificationResult, Identifier, MatchMode};

/// 获取 filesig 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// 创建使用内置签名表和系统 MIME 探测的识别器
pub fn default_identifier() -> Identifier {
    Identifier::new()
}

/// 使用默认识别器识别单个文件
pub fn identify(path: impl AsRef<std::path::Path>) -> IdentificationResult {
    default_identifier().identify(path)
}
