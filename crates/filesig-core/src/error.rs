//! 统一错误类型定义.
//!
//! 识别流程中所有可能出现的失败, 由各 crate 共用并跨模块传播.

use std::path::PathBuf;

use thiserror::Error;

/// filesig 统一错误类型
#[derive(Debug, Error)]
pub enum FilesigError {
    /// 路径不存在
    #[error("{} 不存在", .0.display())]
    NotFound(PathBuf),

    /// 路径存在, 但不是普通文件 (目录、设备、悬空链接等)
    #[error("{} 不是普通文件", .0.display())]
    NotAFile(PathBuf),

    /// 文件太小, 不足以分析
    #[error("文件 {} 太小, 无法分析: {size} 字节 (至少需要 {min} 字节)", .path.display())]
    TooSmall {
        /// 文件路径
        path: PathBuf,
        /// 实际大小
        size: u64,
        /// 最小要求
        min: u64,
    },

    /// 签名来源无法提供有效的有序签名表
    #[error("签名来源无效 ({source_name}): {reason}")]
    BadSignatureSource {
        /// 来源名称
        source_name: String,
        /// 失败原因
        reason: String,
    },

    /// I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl FilesigError {
    /// 构造签名来源错误
    pub fn bad_source(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BadSignatureSource {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// 是否为目标文件的前置条件失败 (不存在 / 非普通文件 / 太小)
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::NotAFile(_) | Self::TooSmall { .. }
        )
    }
}

/// filesig 统一 Result 类型
pub type FilesigResult<T> = Result<T, FilesigError>;
