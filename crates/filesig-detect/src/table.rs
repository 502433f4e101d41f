//! 签名表.
//!
//! 有序、不可变的 (名称, 字节模式) 列表, 以及在规范化文件头上的扫描逻辑.
//!
//! 表的顺序决定优先级: 扫描在第一个命中处停止. 由于比较是子串匹配,
//! 若某模式出现在另一模式之中, 较长、约束更多的条目必须排在前面,
//! 否则较长的条目永远不可达. 只有模式完全相同的别名允许被遮蔽.

use std::sync::{Arc, LazyLock};

use filesig_core::{FilesigError, FilesigResult, Signature, to_canonical_hex};
use serde::Serialize;

/// 内置签名数据 (按扫描顺序)
static BUILTIN_SIGNATURES: &[Signature] = &[
    Signature::from_static("7-Zip", &[0x37, 0x7a, 0xbc, 0xaf, 0x27, 0x1c]),
    Signature::from_static("ARW (Sony RAW)", &[0x49, 0x49, 0x2a, 0x00, 0x08]),
    // WebP 与 AVI / WAV 共享 RIFF 前缀, 必须排在前面
    Signature::from_static(
        "WebP image",
        &[0x52, 0x49, 0x46, 0x46, 0x08, 0x8c, 0x00, 0x00, 0x57, 0x45, 0x42, 0x50],
    ),
    Signature::from_static("AVI / WAV", &[0x52, 0x49, 0x46, 0x46]),
    Signature::from_static("shell script", &[0x23, 0x21]),
    Signature::from_static("BMP", &[0x42, 0x4d]),
    Signature::from_static("bzip2", &[0x42, 0x5a, 0x68]),
    Signature::from_static("CAB", &[0x4d, 0x53, 0x43, 0x46]),
    Signature::from_static("compressed (LZW)", &[0x1f, 0x9d]),
    Signature::from_static("compressed (LZH)", &[0x1f, 0xa0]),
    Signature::from_static("compressed (LZMA)", &[0x5d, 0x00, 0x00, 0x80]),
    Signature::from_static("cpio", &[0xc7, 0x71, 0x14, 0x00, 0xfc]),
    Signature::from_static(
        "CR2 (Canon RAW)",
        &[0x49, 0x49, 0x2a, 0x00, 0x10, 0x00, 0x00, 0x00, 0x43, 0x52],
    ),
    Signature::from_static("dat", &[0x50, 0x4d, 0x4f, 0x43, 0x43, 0x4d, 0x4f, 0x43]),
    Signature::from_static("dex (Dalvic)", &[0x64, 0x65, 0x78, 0x0a, 0x30, 0x33, 0x35, 0x00]),
    Signature::from_static("epub", &[0x50, 0x4b, 0x03, 0x04, 0x0a, 0x00, 0x02, 0x00]),
    Signature::from_static("EXE (MZ: DOS / Windows)", &[0x4d, 0x5a]),
    Signature::from_static("EXE (ELF x32: *nix)", &[0x7f, 0x45, 0x4c, 0x46, 0x01]),
    Signature::from_static("EXE (ELF x64: *nix)", &[0x7f, 0x45, 0x4c, 0x46, 0x02]),
    Signature::from_static("FLAC", &[0x66, 0x4c, 0x61, 0x43]),
    Signature::from_static("FLV", &[0x46, 0x4c, 0x56]),
    Signature::from_static("GIF87a", &[0x47, 0x49, 0x46, 0x38, 0x37, 0x61]),
    Signature::from_static("GIF89a", &[0x47, 0x49, 0x46, 0x38, 0x39, 0x61]),
    Signature::from_static("GZip", &[0x1f, 0x8b]),
    Signature::from_static("ICO", &[0x00, 0x00, 0x01, 0x00]),
    Signature::from_static("ISO (CD)", &[0x43, 0x44, 0x30, 0x30, 0x31]),
    Signature::from_static("JAR", &[0x50, 0x4b, 0x03, 0x04, 0x14, 0x00, 0x08, 0x00, 0x08, 0x00]),
    Signature::from_static("JPG", &[0xff, 0xd8, 0xff, 0xdb]),
    Signature::from_static("JPG (JFIF)", &[0xff, 0xd8, 0xff, 0xe0]),
    Signature::from_static("JPG (EXIF)", &[0xff, 0xd8, 0xff, 0xe1]),
    Signature::from_static(
        "JPG 2000",
        &[0x00, 0x00, 0x00, 0x0c, 0x6a, 0x50, 0x20, 0x20, 0x0d, 0x0a, 0x87, 0x0a],
    ),
    Signature::from_static("midi", &[0x4d, 0x54, 0x68, 0x64]),
    Signature::from_static("MP3", &[0xff, 0xfb]),
    Signature::from_static("MP3 (ID3)", &[0x49, 0x44, 0x33]),
    Signature::from_static("MP4", &[0x00, 0x00, 0x00, 0x18, 0x66, 0x74, 0x79, 0x70]),
    Signature::from_static("MSI (MS installer)", &[0xd0, 0xcf, 0x11, 0xe0, 0xa1, 0xb1, 0x1a, 0xe1]),
    // MSI 的别名 (同为 OLE2 复合文档)
    Signature::from_static("MS Office (legacy)", &[0xd0, 0xcf, 0x11, 0xe0, 0xa1, 0xb1, 0x1a, 0xe1]),
    Signature::from_static("obj", &[0x4c, 0x01]),
    Signature::from_static("OGG", &[0x4f, 0x67, 0x67, 0x53]),
    Signature::from_static("PDF", &[0x25, 0x50, 0x44, 0x46]),
    Signature::from_static("PHP", &[0x3c, 0x3f, 0x70, 0x68, 0x70]),
    Signature::from_static("PNG", &[0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a]),
    Signature::from_static("PostScript", &[0x25, 0x21, 0x50, 0x53]),
    Signature::from_static("PSD", &[0x38, 0x42, 0x50, 0x53]),
    Signature::from_static(
        "PSP (PaintShop)",
        &[0x50, 0x61, 0x69, 0x6e, 0x74, 0x20, 0x53, 0x68, 0x6f, 0x70, 0x20, 0x50],
    ),
    Signature::from_static("PST", &[0x21, 0x42, 0x44, 0x4e, 0x42]),
    Signature::from_static("RAR (old)", &[0x52, 0x61, 0x72, 0x21, 0x1a, 0x07, 0x00]),
    Signature::from_static("RAR (v.5+)", &[0x52, 0x61, 0x72, 0x21, 0x1a, 0x07, 0x01, 0x00]),
    Signature::from_static("RPM", &[0xed, 0xab, 0xee, 0xdb]),
    Signature::from_static("RTF", &[0x7b, 0x5c, 0x72, 0x74, 0x66, 0x31]),
    Signature::from_static(
        "SQLite 3",
        &[
            0x53, 0x51, 0x4c, 0x69, 0x74, 0x65, 0x20, 0x66,
            0x6f, 0x72, 0x6d, 0x61, 0x74, 0x20, 0x33, 0x00,
        ],
    ),
    Signature::from_static("SWF", &[0x43, 0x57, 0x53]),
    Signature::from_static("TAR", &[0x75, 0x73, 0x74, 0x61, 0x72, 0x00, 0x30, 0x30]),
    Signature::from_static("TAR2", &[0x75, 0x73, 0x74, 0x61, 0x72, 0x20, 0x20, 0x00]),
    Signature::from_static("tcpdump (v.2)", &[0xd4, 0xc3, 0xb2, 0xa1, 0x02]),
    Signature::from_static("TGA", &[0x01, 0x00, 0x0a, 0x00, 0x00, 0x00, 0x00, 0x18]),
    Signature::from_static("TIFF (LE)", &[0x49, 0x49, 0x2a, 0x00]),
    Signature::from_static("TIFF (BE) / NEF (Nikon)", &[0x4d, 0x4d, 0x00, 0x2a]),
    Signature::from_static("TTF", &[0x00, 0x01, 0x00, 0x00, 0x00]),
    Signature::from_static("Unicode BOM", &[0xef, 0xbb, 0xbf]),
    Signature::from_static("WAR (Web Archive)", &[0x50, 0x4b, 0x03, 0x04, 0x14]),
    Signature::from_static("WMA / WMV", &[0x30, 0x26, 0xb2, 0x75, 0x8e, 0x66, 0xcf]),
    Signature::from_static("WMF", &[0xd7, 0xcd, 0xc6, 0x9a]),
    Signature::from_static("XCF (GIMP)", &[0x67, 0x69, 0x6d, 0x70, 0x20, 0x78, 0x63, 0x66, 0x20]),
    Signature::from_static("XPM", &[0x2f, 0x2a, 0x20, 0x58, 0x50, 0x4d]),
    Signature::from_static("XZ", &[0xfd, 0x37, 0x7a, 0x58, 0x5a]),
    Signature::from_static("ZIP", &[0x50, 0x4b, 0x03, 0x04]),
    // ZIP 的别名, 扫描时不可达
    Signature::from_static("MS Office (2010+)", &[0x50, 0x4b, 0x03, 0x04]),
    Signature::from_static("ZIP (empty)", &[0x50, 0x4b, 0x05, 0x06]),
    Signature::from_static("ZIP (spanned)", &[0x50, 0x4b, 0x07, 0x08]),
    // GnuPG 对称加密文件, 按加密算法区分
    Signature::from_static("GnuPG (IDEA)", &[0x8c, 0x0d, 0x04, 0x01]),
    Signature::from_static("GnuPG (3DES)", &[0x8c, 0x0d, 0x04, 0x02]),
    Signature::from_static("GnuPG (CAST5)", &[0x8c, 0x0d, 0x04, 0x03]),
    Signature::from_static("GnuPG (Blowfish)", &[0x8c, 0x0d, 0x04, 0x04]),
    Signature::from_static("GnuPG (AES)", &[0x8c, 0x0d, 0x04, 0x07]),
    Signature::from_static("GnuPG (AES192)", &[0x8c, 0x0d, 0x04, 0x08]),
    Signature::from_static("GnuPG (AES256)", &[0x8c, 0x0d, 0x04, 0x09]),
    Signature::from_static("GnuPG (Twofish)", &[0x8c, 0x0d, 0x04, 0x0a]),
    Signature::from_static("GnuPG (Camellia128)", &[0x8c, 0x0d, 0x04, 0x0b]),
    Signature::from_static("GnuPG (Camellia192)", &[0x8c, 0x0d, 0x04, 0x0c]),
    Signature::from_static("GnuPG (Camellia256)", &[0x8c, 0x0d, 0x04, 0x0d]),
];

/// 内置签名表, 首次使用时构建
static BUILTIN_TABLE: LazyLock<Arc<SignatureTable>> = LazyLock::new(|| {
    Arc::new(SignatureTable::from_entries(BUILTIN_SIGNATURES.to_vec()))
});

/// 匹配方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// 模式可出现在文件头窗口内任意位置 (兼容行为)
    #[default]
    Substring,
    /// 模式必须从偏移 0 开始
    Anchored,
}

/// 一次命中
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureMatch {
    /// 命中条目在表中的位置
    pub index: usize,
    /// 命中条目的名称
    pub label: String,
}

/// 表条目: 签名及其预先计算的规范化模式
#[derive(Debug, Clone)]
struct TableEntry {
    signature: Signature,
    canonical: String,
}

/// 有序签名表
#[derive(Debug, Clone)]
pub struct SignatureTable {
    entries: Vec<TableEntry>,
}

impl SignatureTable {
    /// 获取内置签名表 (进程级共享, 只读)
    pub fn builtin() -> Arc<SignatureTable> {
        Arc::clone(&BUILTIN_TABLE)
    }

    /// 从签名列表创建表, 保持给定顺序
    ///
    /// 空表或空模式视为来源无效: 空模式会命中任何文件.
    pub fn try_new(source_name: &str, signatures: Vec<Signature>) -> FilesigResult<Self> {
        if signatures.is_empty() {
            return Err(FilesigError::bad_source(source_name, "签名表为空"));
        }
        if let Some(sig) = signatures.iter().find(|sig| sig.pattern().is_empty()) {
            return Err(FilesigError::bad_source(
                source_name,
                format!("签名 '{}' 的字节模式为空", sig.label()),
            ));
        }
        Ok(Self::from_entries(signatures))
    }

    fn from_entries(signatures: Vec<Signature>) -> Self {
        let entries = signatures
            .into_iter()
            .map(|signature| TableEntry {
                canonical: signature.canonical_pattern(),
                signature,
            })
            .collect();
        Self { entries }
    }

    /// 按顺序遍历所有签名
    pub fn signatures(&self) -> impl ExactSizeIterator<Item = &Signature> {
        self.entries.iter().map(|entry| &entry.signature)
    }

    /// 获取指定位置的签名
    pub fn get(&self, index: usize) -> Option<&Signature> {
        self.entries.get(index).map(|entry| &entry.signature)
    }

    /// 签名数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 在规范化十六进制文件头中查找第一个命中的签名
    ///
    /// 比较不区分大小写. 扫描在第一个命中处停止, 不做最长匹配.
    pub fn find(&self, header_hex: &str, mode: MatchMode) -> Option<SignatureMatch> {
        let header = header_hex.to_ascii_lowercase();
        self.entries
            .iter()
            .position(|entry| match mode {
                MatchMode::Substring => header.contains(&entry.canonical),
                MatchMode::Anchored => header.starts_with(&entry.canonical),
            })
            .map(|index| SignatureMatch {
                index,
                label: self.entries[index].signature.label().to_string(),
            })
    }

    /// 在原始字节上查找, 先规范化再扫描
    pub fn find_bytes(&self, header: &[u8], mode: MatchMode) -> Option<SignatureMatch> {
        self.find(&to_canonical_hex(header), mode)
    }

    /// 列出被前面条目遮蔽的条目
    ///
    /// 返回 `(前, 后)` 下标对: 前者的模式出现在后者的模式中, 因此后者在扫描时
    /// 永远不可达. 模式完全相同的别名也会列出.
    pub fn shadowed(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (later, entry) in self.entries.iter().enumerate() {
            for (earlier, prior) in self.entries[..later].iter().enumerate() {
                if entry.canonical.contains(&prior.canonical) {
                    pairs.push((earlier, later));
                }
            }
        }
        pairs
    }

    /// 列出被遮蔽且不是别名的条目 (表排序错误)
    pub fn misordered(&self) -> Vec<(usize, usize)> {
        self.shadowed()
            .into_iter()
            .filter(|&(earlier, later)| {
                self.entries[earlier].signature.pattern() != self.entries[later].signature.pattern()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label_of(table: &SignatureTable, bytes: &[u8], mode: MatchMode) -> Option<String> {
        table.find_bytes(bytes, mode).map(|m| m.label)
    }

    #[test]
    fn test_内置表_条目与顺序() {
        let table = SignatureTable::builtin();
        assert_eq!(table.len(), 81);
        assert_eq!(table.get(0).map(Signature::label), Some("7-Zip"));
        assert_eq!(table.get(80).map(Signature::label), Some("GnuPG (Camellia256)"));
        let labels: Vec<&str> = table.signatures().map(Signature::label).collect();
        let pos = |name: &str| labels.iter().position(|l| *l == name);
        assert!(pos("WebP image") < pos("AVI / WAV"));
        assert!(pos("JAR") < pos("WAR (Web Archive)"));
        assert!(pos("WAR (Web Archive)") < pos("ZIP"));
        assert!(pos("ZIP") < pos("MS Office (2010+)"));
    }

    #[test]
    fn test_内置表_只有别名被遮蔽() {
        let table = SignatureTable::builtin();
        assert!(table.misordered().is_empty(), "{:?}", table.misordered());

        let aliases: Vec<(&str, &str)> = table
            .shadowed()
            .into_iter()
            .filter_map(|(a, b)| Some((table.get(a)?.label(), table.get(b)?.label())))
            .collect();
        assert_eq!(
            aliases,
            vec![
                ("MSI (MS installer)", "MS Office (legacy)"),
                ("ZIP", "MS Office (2010+)"),
            ]
        );
    }

    #[test]
    fn test_内置表_模式长度范围() {
        let table = SignatureTable::builtin();
        assert!(table.signatures().all(|s| (2..=16).contains(&s.pattern().len())));
    }

    #[test]
    fn test_内置表_共享同一实例() {
        assert!(Arc::ptr_eq(&SignatureTable::builtin(), &SignatureTable::builtin()));
    }

    #[test]
    fn test_首个命中_更具体的条目优先() {
        let table = SignatureTable::builtin();
        let mode = MatchMode::Substring;
        assert_eq!(label_of(&table, &[0x50, 0x4b, 0x03, 0x04], mode).as_deref(), Some("ZIP"));
        assert_eq!(
            label_of(&table, &[0x50, 0x4b, 0x03, 0x04, 0x14, 0x00, 0x08, 0x00, 0x08, 0x00], mode)
                .as_deref(),
            Some("JAR")
        );
        assert_eq!(
            label_of(&table, &[0x50, 0x4b, 0x03, 0x04, 0x14, 0x00, 0x06, 0x00], mode).as_deref(),
            Some("WAR (Web Archive)")
        );
        assert_eq!(label_of(&table, &[0x50, 0x4b, 0x05, 0x06], mode).as_deref(), Some("ZIP (empty)"));
        assert_eq!(
            label_of(&table, b"RIFF\x08\x8c\x00\x00WEBPVP8 ", mode).as_deref(),
            Some("WebP image")
        );
        assert_eq!(label_of(&table, b"RIFF\x24\x08\x00\x00WAVE", mode).as_deref(), Some("AVI / WAV"));
        assert_eq!(
            label_of(&table, &[0xd0, 0xcf, 0x11, 0xe0, 0xa1, 0xb1, 0x1a, 0xe1], mode).as_deref(),
            Some("MSI (MS installer)")
        );
    }

    #[test]
    fn test_子串模式_窗口内任意位置命中() {
        let table = SignatureTable::builtin();
        // 前 4 字节不属于任何签名, "%PDF" 出现在偏移 4
        let header = [0xaa, 0xaa, 0xaa, 0xaa, 0x25, 0x50, 0x44, 0x46];
        assert_eq!(
            label_of(&table, &header, MatchMode::Substring).as_deref(),
            Some("PDF")
        );
        assert_eq!(label_of(&table, &header, MatchMode::Anchored), None);
    }

    #[test]
    fn test_锚定模式_仅偏移0() {
        let table = SignatureTable::builtin();
        assert_eq!(
            label_of(&table, b"%PDF-1.4\n", MatchMode::Anchored).as_deref(),
            Some("PDF")
        );
    }

    #[test]
    fn test_查找_不区分大小写() {
        let table = SignatureTable::builtin();
        let found = table.find("89 50 4E 47 0D 0A 1A 0A", MatchMode::Substring);
        assert_eq!(found.map(|m| m.label).as_deref(), Some("PNG"));
    }

    #[test]
    fn test_无命中() {
        let table = SignatureTable::builtin();
        assert_eq!(label_of(&table, &[0, 0, 0, 0, 0], MatchMode::Substring), None);
        assert_eq!(label_of(&table, &[], MatchMode::Substring), None);
    }

    #[test]
    fn test_构建_拒绝空表与空模式() {
        let err = SignatureTable::try_new("test", Vec::new());
        assert!(matches!(err, Err(FilesigError::BadSignatureSource { .. })));

        let err = SignatureTable::try_new("test", vec![Signature::new("empty", Vec::new())]);
        assert!(matches!(err, Err(FilesigError::BadSignatureSource { .. })));
    }

    #[test]
    fn test_排序检查_发现错误顺序() {
        let table = SignatureTable::try_new(
            "test",
            vec![
                Signature::new("RIFF", vec![0x52, 0x49, 0x46, 0x46]),
                Signature::new("WebP", vec![0x52, 0x49, 0x46, 0x46, 0x08]),
            ],
        );
        let table = match table {
            Ok(table) => table,
            Err(err) => panic!("构建签名表失败: {err}"),
        };
        assert_eq!(table.misordered(), vec![(0, 1)]);
    }
}
