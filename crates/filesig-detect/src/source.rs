//! 签名来源.
//!
//! 识别器不直接依赖某张表, 而是通过 [`SignatureSource`] 获取有序签名表,
//! 以便在不修改引擎的情况下替换签名数据.

use std::path::Path;
use std::sync::Arc;

use filesig_core::{FilesigError, FilesigResult, Signature, parse_hex_pattern};

use crate::table::SignatureTable;

/// 签名来源 trait
///
/// 实现者必须返回非空、有序的签名表; 无法做到时返回
/// [`FilesigError::BadSignatureSource`].
pub trait SignatureSource: Send + Sync {
    /// 来源名称, 用于诊断信息
    fn name(&self) -> &str;

    /// 获取有序签名表
    fn load(&self) -> FilesigResult<Arc<SignatureTable>>;
}

/// 内置签名表
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSource;

impl SignatureSource for BuiltinSource {
    fn name(&self) -> &str {
        "builtin"
    }

    fn load(&self) -> FilesigResult<Arc<SignatureTable>> {
        Ok(SignatureTable::builtin())
    }
}

/// 文本签名表
///
/// 每行一个条目, 形如 `PNG = 89 50 4E 47 0D 0A 1A 0A`. 空行和 `#` 开头的行被忽略.
/// 文本在构造时解析, 之后每次加载共享同一张表.
#[derive(Debug, Clone)]
pub struct TextSource {
    name: String,
    table: Arc<SignatureTable>,
}

impl TextSource {
    /// 解析文本签名表
    pub fn parse(name: impl Into<String>, text: &str) -> FilesigResult<Self> {
        let name = name.into();
        let mut signatures = Vec::new();

        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let lineno = lineno + 1;

            let (label, pattern) = line.split_once('=').ok_or_else(|| {
                FilesigError::bad_source(&name, format!("第 {lineno} 行缺少 '='"))
            })?;
            let label = label.trim();
            if label.is_empty() {
                return Err(FilesigError::bad_source(
                    &name,
                    format!("第 {lineno} 行缺少格式名称"),
                ));
            }
            let pattern = parse_hex_pattern(pattern).map_err(|token| {
                FilesigError::bad_source(
                    &name,
                    format!("第 {lineno} 行包含非法十六进制字节 '{token}'"),
                )
            })?;
            if pattern.is_empty() {
                return Err(FilesigError::bad_source(
                    &name,
                    format!("第 {lineno} 行的字节模式为空"),
                ));
            }

            signatures.push(Signature::new(label, pattern));
        }

        let table = SignatureTable::try_new(&name, signatures)?;
        warn_misordered(&name, &table);
        log::debug!("已加载签名表 {}: {} 个条目", name, table.len());

        Ok(Self {
            name,
            table: Arc::new(table),
        })
    }

    /// 从文件读取并解析文本签名表
    ///
    /// 文件无法读取同样视为来源无效.
    pub fn from_file(path: impl AsRef<Path>) -> FilesigResult<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let text = std::fs::read_to_string(path)
            .map_err(|e| FilesigError::bad_source(&name, format!("无法读取: {e}")))?;
        Self::parse(name, &text)
    }
}

impl SignatureSource for TextSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> FilesigResult<Arc<SignatureTable>> {
        Ok(Arc::clone(&self.table))
    }
}

/// 由函数提供的签名来源
///
/// 每次加载都会调用函数并重新构建签名表.
pub struct FnSource<F> {
    name: String,
    provider: F,
}

impl<F> FnSource<F>
where
    F: Fn() -> Vec<Signature> + Send + Sync,
{
    /// 创建函数签名来源
    pub fn new(name: impl Into<String>, provider: F) -> Self {
        Self {
            name: name.into(),
            provider,
        }
    }
}

impl<F> SignatureSource for FnSource<F>
where
    F: Fn() -> Vec<Signature> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> FilesigResult<Arc<SignatureTable>> {
        let table = SignatureTable::try_new(&self.name, (self.provider)())?;
        Ok(Arc::new(table))
    }
}

/// 顺序错误不阻止加载, 但较长的条目会不可达
fn warn_misordered(name: &str, table: &SignatureTable) {
    for (earlier, later) in table.misordered() {
        if let (Some(a), Some(b)) = (table.get(earlier), table.get(later)) {
            log::warn!(
                "签名表 {}: '{}' 排在 '{}' 之前, 后者永远不会命中",
                name,
                a.label(),
                b.label()
            );
        }
    }
}
