//! 批量识别.
//!
//! 每个文件的识别相互独立, 使用 rayon 并行执行, 结果保持输入顺序.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::identifier::{IdentificationResult, Identifier};

/// 并行识别多个文件
///
/// 单个文件失败只影响该文件的结果 (默认结果).
pub fn identify_all<P>(identifier: &Identifier, paths: &[P]) -> Vec<(PathBuf, IdentificationResult)>
where
    P: AsRef<Path> + Sync,
{
    paths
        .par_iter()
        .map(|path| {
            let path = path.as_ref();
            (path.to_path_buf(), identifier.identify(path))
        })
        .collect()
}
