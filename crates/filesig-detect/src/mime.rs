//! 平台 MIME 类型探测.
//!
//! MIME 信息是可选的补充: 探测器不可用和探测无结果同样返回 `None`, 从不报错.
//! 默认先调用系统 `file` 命令, 没有结果时再用 `infer` 在进程内按内容推断.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

/// MIME 类型探测器 trait
pub trait MimeProbe: Send + Sync {
    /// 返回文件的 MIME 类型, 无法判断时返回 `None`
    fn probe(&self, path: &Path) -> Option<String>;

    /// 本探测器没有结果时改用 `fallback`
    fn or<P: MimeProbe>(self, fallback: P) -> FallbackProbe<Self, P>
    where
        Self: Sized,
    {
        FallbackProbe {
            primary: self,
            fallback,
        }
    }
}

impl<F> MimeProbe for F
where
    F: Fn(&Path) -> Option<String> + Send + Sync,
{
    fn probe(&self, path: &Path) -> Option<String> {
        self(path)
    }
}

/// 不做 MIME 探测
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMimeProbe;

impl MimeProbe for NoMimeProbe {
    fn probe(&self, _path: &Path) -> Option<String> {
        None
    }
}

/// 调用系统 `file` 命令 (libmagic) 探测 MIME 类型
#[derive(Debug, Clone)]
pub struct FileCommandProbe {
    program: OsString,
}

impl FileCommandProbe {
    /// 使用 PATH 中的 `file` 命令
    pub fn new() -> Self {
        Self::with_program("file")
    }

    /// 使用指定的可执行文件
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FileCommandProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MimeProbe for FileCommandProbe {
    fn probe(&self, path: &Path) -> Option<String> {
        let output = Command::new(&self.program)
            .args(["--brief", "--mime-type", "--"])
            .arg(path)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                log::debug!("MIME 探测不可用 ({:?}): {}", self.program, e);
                return None;
            }
        };
        if !output.status.success() {
            log::debug!("MIME 探测失败: {} 返回 {}", path.display(), output.status);
            return None;
        }

        let mime = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if mime.is_empty() { None } else { Some(mime) }
    }
}

/// 使用 `infer` 按文件内容推断 MIME 类型, 不依赖外部程序
#[derive(Debug, Clone, Copy, Default)]
pub struct InferProbe;

impl MimeProbe for InferProbe {
    fn probe(&self, path: &Path) -> Option<String> {
        match infer::get_from_path(path) {
            Ok(kind) => kind.map(|kind| kind.mime_type().to_string()),
            Err(e) => {
                log::debug!("MIME 推断失败: {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// 依次尝试两个探测器
#[derive(Debug, Clone)]
pub struct FallbackProbe<A, B> {
    primary: A,
    fallback: B,
}

impl<A: MimeProbe, B: MimeProbe> MimeProbe for FallbackProbe<A, B> {
    fn probe(&self, path: &Path) -> Option<String> {
        self.primary.probe(path).or_else(|| self.fallback.probe(path))
    }
}

/// 默认探测器: 系统 `file` 命令, 其次 `infer`
pub fn default_probe() -> FallbackProbe<FileCommandProbe, InferProbe> {
    FileCommandProbe::new().or(InferProbe)
}
