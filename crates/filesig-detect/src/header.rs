//! 文件头读取.
//!
//! 检查目标文件的前置条件, 并读取固定大小的文件头窗口.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use filesig_core::{FilesigError, FilesigResult, to_canonical_hex};

/// 默认文件头窗口大小 (字节)
pub const DEFAULT_WINDOW: usize = 16;

/// 文件头窗口上限 (字节)
///
/// 构建识别器时超出的窗口会被截断到这个值.
pub const MAX_WINDOW: usize = 4096;

/// 默认最小文件大小 (字节)
///
/// 比窗口和部分签名都短, 属于有意保留的宽松下限.
pub const DEFAULT_MIN_SIZE: u64 = 4;

/// 文件开头的若干字节
///
/// 长度不超过窗口大小; 文件较短时缓冲区也较短, 不做填充.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBytes {
    bytes: Vec<u8>,
}

impl HeaderBytes {
    /// 从内存数据截取文件头窗口
    pub fn from_bytes(data: &[u8], window: usize) -> Self {
        let len = data.len().min(window);
        Self {
            bytes: data[..len].to_vec(),
        }
    }

    /// 从任意读取器读取至多 `window` 字节
    ///
    /// 数据不足时返回较短的缓冲区, 不视为错误.
    pub fn read_from<R: Read>(reader: R, window: usize) -> io::Result<Self> {
        let mut bytes = Vec::new();
        reader.take(window as u64).read_to_end(&mut bytes)?;
        Ok(Self { bytes })
    }

    /// 打开文件并读取文件头窗口
    ///
    /// 文件句柄在函数返回前释放, 包括出错路径.
    pub fn read_path(path: &Path, window: usize) -> FilesigResult<Self> {
        let file = File::open(path)?;
        Ok(Self::read_from(file, window)?)
    }

    /// 原始字节
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// 字节数
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 规范化十六进制表示
    pub fn to_canonical_hex(&self) -> String {
        to_canonical_hex(&self.bytes)
    }
}

/// 检查目标文件: 存在、是普通文件、大小不低于 `min_size`
///
/// 返回文件大小. 悬空的符号链接存在但不是普通文件.
pub fn check_target(path: &Path, min_size: u64) -> FilesigResult<u64> {
    match fs::symlink_metadata(path) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(FilesigError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    }

    let metadata = match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => metadata,
        _ => return Err(FilesigError::NotAFile(path.to_path_buf())),
    };

    let size = metadata.len();
    if size < min_size {
        return Err(FilesigError::TooSmall {
            path: path.to_path_buf(),
            size,
            min: min_size,
        });
    }
    Ok(size)
}
