//! 文件签名定义.
//!
//! 一个签名由格式名称和一段固定字节模式组成, 不支持通配符.

use std::borrow::Cow;
use std::fmt;

use crate::hex::to_canonical_hex;

/// 文件签名
///
/// 名称不要求唯一: 同一模式可以有多个别名 (如 MSI 与旧版 MS Office).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    /// 人类可读的格式名称
    label: Cow<'static, str>,
    /// 字节模式
    pattern: Cow<'static, [u8]>,
}

impl Signature {
    /// 创建签名 (运行时数据, 如从文本表加载)
    pub fn new(label: impl Into<String>, pattern: impl Into<Vec<u8>>) -> Self {
        Self {
            label: Cow::Owned(label.into()),
            pattern: Cow::Owned(pattern.into()),
        }
    }

    /// 从静态数据创建签名, 可用于 `static` 表
    pub const fn from_static(label: &'static str, pattern: &'static [u8]) -> Self {
        Self {
            label: Cow::Borrowed(label),
            pattern: Cow::Borrowed(pattern),
        }
    }

    /// 格式名称
    pub fn label(&self) -> &str {
        &self.label
    }

    /// 字节模式
    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    /// 模式的规范化十六进制表示
    pub fn canonical_pattern(&self) -> String {
        to_canonical_hex(&self.pattern)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.label, self.canonical_pattern())
    }
}
