//! # filesig-detect
//!
//! 基于文件头魔数的文件类型识别引擎.
//!
//! 读取文件开头的固定窗口, 转换为规范化十六进制字符串, 按顺序扫描签名表并
//! 报告第一个命中的条目, 同时可选地调用平台 MIME 探测器.

pub mod batch;
pub mod header;
pub mod identifier;
pub mod mime;
pub mod source;
pub mod table;

// 重导出常用类型
pub use batch::identify_all;
pub use header::{HeaderBytes, MAX_WINDOW};
pub use identifier::{
    Identification, IdentificationResult, Identifier, IdentifierBuilder, IdentifierConfig,
};
pub use mime::{FallbackProbe, FileCommandProbe, InferProbe, MimeProbe, NoMimeProbe};
pub use source::{BuiltinSource, FnSource, SignatureSource, TextSource};
pub use table::{MatchMode, SignatureMatch, SignatureTable};
