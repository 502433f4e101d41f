//! 文件识别器.
//!
//! 一次识别请求的完整流程: 检查前置条件 → 读取文件头窗口 → 规范化 →
//! 按表顺序扫描 → 可选的 MIME 探测 → 组装结果.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use filesig_core::FilesigResult;
use serde::Serialize;

use crate::header::{DEFAULT_MIN_SIZE, DEFAULT_WINDOW, HeaderBytes, MAX_WINDOW, check_target};
use crate::mime::{MimeProbe, NoMimeProbe, default_probe};
use crate::source::{BuiltinSource, SignatureSource};
use crate::table::{MatchMode, SignatureMatch, SignatureTable};

/// MIME 信息前缀
pub const MIME_PREFIX: &str = "File MIME type: ";
/// 无 MIME 信息
pub const NO_MIME_INFO: &str = "No MIME type information.";
/// 签名命中前缀
pub const MATCH_PREFIX: &str = "File match found: ";
/// 无签名命中
pub const NO_MATCH: &str = "No file match found.";

/// 识别结果
///
/// 两个字段都是完整的输出行. 识别失败时两者都为 `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdentificationResult {
    /// MIME 行
    pub mime_info: Option<String>,
    /// 签名行
    pub file_info: Option<String>,
}

impl IdentificationResult {
    /// 是否为失败后的默认结果
    pub fn is_empty(&self) -> bool {
        self.mime_info.is_none() && self.file_info.is_none()
    }
}

/// 一次成功识别的结构化结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identification {
    /// 命中的签名
    pub matched: Option<SignatureMatch>,
    /// 探测到的 MIME 类型
    pub mime_type: Option<String>,
}

impl Identification {
    /// 组装输出行
    pub fn to_result(&self) -> IdentificationResult {
        let mime_info = match &self.mime_type {
            Some(mime) => format!("{MIME_PREFIX}{mime}"),
            None => NO_MIME_INFO.to_string(),
        };
        let file_info = match &self.matched {
            Some(m) => format!("{MATCH_PREFIX}{}", m.label),
            None => NO_MATCH.to_string(),
        };
        IdentificationResult {
            mime_info: Some(mime_info),
            file_info: Some(file_info),
        }
    }
}

impl From<Identification> for IdentificationResult {
    fn from(identification: Identification) -> Self {
        identification.to_result()
    }
}

/// 识别器配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierConfig {
    /// 文件头窗口大小, 不超过 [`MAX_WINDOW`]
    pub window: usize,
    /// 最小文件大小
    pub min_size: u64,
    /// 匹配方式
    pub match_mode: MatchMode,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            min_size: DEFAULT_MIN_SIZE,
            match_mode: MatchMode::default(),
        }
    }
}

/// 文件识别器
///
/// 不持有可变状态, 可在多个线程间共享.
pub struct Identifier {
    config: IdentifierConfig,
    source: Box<dyn SignatureSource>,
    mime_probe: Box<dyn MimeProbe>,
}

impl Identifier {
    /// 使用内置签名表和默认 MIME 探测器创建识别器
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// 创建构建器
    pub fn builder() -> IdentifierBuilder {
        IdentifierBuilder::default()
    }

    /// 当前配置
    pub fn config(&self) -> &IdentifierConfig {
        &self.config
    }

    /// 签名来源名称
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// 加载当前使用的签名表
    pub fn signatures(&self) -> FilesigResult<Arc<SignatureTable>> {
        self.source.load()
    }

    /// 识别文件 (宽松模式)
    ///
    /// 任何失败都会记录到诊断日志并被吸收, 返回两个字段都为空的默认结果.
    pub fn identify(&self, path: impl AsRef<Path>) -> IdentificationResult {
        let path = path.as_ref();
        match self.try_identify(path) {
            Ok(identification) => identification.to_result(),
            Err(e) if e.is_precondition() => {
                log::warn!("跳过 {}: {}", path.display(), e);
                IdentificationResult::default()
            }
            Err(e) => {
                log::error!("识别 {} 失败: {}", path.display(), e);
                IdentificationResult::default()
            }
        }
    }

    /// 识别文件, 返回结构化结果或错误
    pub fn try_identify(&self, path: impl AsRef<Path>) -> FilesigResult<Identification> {
        let path = path.as_ref();
        let size = check_target(path, self.config.min_size)?;
        let header = HeaderBytes::read_path(path, self.config.window)?;
        log::debug!(
            "{}: 大小 {} 字节, 文件头 [{}]",
            path.display(),
            size,
            header.to_canonical_hex()
        );

        let matched = self.match_header(&header)?;
        let mime_type = self.mime_probe.probe(path);

        Ok(Identification { matched, mime_type })
    }

    /// 在已读取的文件头上扫描签名表
    pub fn match_header(&self, header: &HeaderBytes) -> FilesigResult<Option<SignatureMatch>> {
        let table = self.source.load()?;
        Ok(table.find(&header.to_canonical_hex(), self.config.match_mode))
    }
}

impl Default for Identifier {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identifier")
            .field("config", &self.config)
            .field("source", &self.source.name())
            .finish_non_exhaustive()
    }
}

/// 识别器构建器
pub struct IdentifierBuilder {
    config: IdentifierConfig,
    source: Box<dyn SignatureSource>,
    mime_probe: Box<dyn MimeProbe>,
}

impl Default for IdentifierBuilder {
    fn default() -> Self {
        Self {
            config: IdentifierConfig::default(),
            source: Box::new(BuiltinSource),
            mime_probe: Box::new(default_probe()),
        }
    }
}

impl IdentifierBuilder {
    /// 设置完整配置
    pub fn config(mut self, config: IdentifierConfig) -> Self {
        self.config = config;
        self
    }

    /// 文件头窗口大小
    pub fn window(mut self, window: usize) -> Self {
        self.config.window = window;
        self
    }

    /// 最小文件大小
    pub fn min_size(mut self, min_size: u64) -> Self {
        self.config.min_size = min_size;
        self
    }

    /// 匹配方式
    pub fn match_mode(mut self, mode: MatchMode) -> Self {
        self.config.match_mode = mode;
        self
    }

    /// 签名来源
    pub fn source(mut self, source: impl SignatureSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    /// MIME 探测器
    pub fn mime_probe(mut self, probe: impl MimeProbe + 'static) -> Self {
        self.mime_probe = Box::new(probe);
        self
    }

    /// 关闭 MIME 探测
    pub fn without_mime(self) -> Self {
        self.mime_probe(NoMimeProbe)
    }

    /// 构建识别器
    ///
    /// 超过 [`MAX_WINDOW`] 的窗口截断到上限.
    pub fn build(self) -> Identifier {
        let mut config = self.config;
        if config.window > MAX_WINDOW {
            log::warn!("文件头窗口 {} 超过上限, 使用 {}", config.window, MAX_WINDOW);
            config.window = MAX_WINDOW;
        }
        Identifier {
            config,
            source: self.source,
            mime_probe: self.mime_probe,
        }
    }
}
