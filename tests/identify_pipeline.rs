//! 文件识别流水线测试.
//!
//! 在临时目录中写入真实文件, 通过 filesig 门面完成识别.

use std::fs;
use std::path::{Path, PathBuf};

use filesig::detect::{FnSource, SignatureTable, TextSource, identify_all};
use filesig::{FilesigError, IdentificationResult, Identifier, MatchMode, Signature};
use tempfile::TempDir;

fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("创建临时目录失败: {err}"),
    }
}

fn write_file(dir: &TempDir, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    if let Err(err) = fs::write(&path, data) {
        panic!("写入测试文件失败: {err}");
    }
    path
}

fn identifier() -> Identifier {
    Identifier::builder().without_mime().build()
}

fn file_info(identifier: &Identifier, path: &Path) -> Option<String> {
    identifier.identify(path).file_info
}

#[test]
fn test_每个签名_在偏移0时命中自身或同模式别名() {
    let dir = temp_dir();
    let identifier = identifier();
    let table = SignatureTable::builtin();

    for (i, sig) in table.signatures().enumerate() {
        // 补齐到最小文件大小, 0xee 不会组成任何签名
        let mut data = sig.pattern().to_vec();
        while data.len() < 4 {
            data.push(0xee);
        }
        let path = write_file(&dir, &format!("sig_{i}.bin"), &data);

        let expected = table
            .signatures()
            .find(|s| s.pattern() == sig.pattern())
            .map(Signature::label);
        let expected = expected.map(|label| format!("File match found: {label}"));
        assert_eq!(
            file_info(&identifier, &path),
            expected,
            "签名 '{}' 识别错误",
            sig.label()
        );
    }
}

#[test]
fn test_zip_本地文件头_报告通用名称() {
    let dir = temp_dir();
    let path = write_file(&dir, "archive.zip", &[0x50, 0x4b, 0x03, 0x04]);
    assert_eq!(
        file_info(&identifier(), &path).as_deref(),
        Some("File match found: ZIP")
    );
}

#[test]
fn test_png_任意长度() {
    let dir = temp_dir();
    let png = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];
    let identifier = identifier();
    for extra in [0usize, 1, 8, 100] {
        let mut data = png.to_vec();
        data.extend(std::iter::repeat_n(0x11, extra));
        let path = write_file(&dir, &format!("mira_{extra}.png"), &data);
        assert_eq!(
            file_info(&identifier, &path).as_deref(),
            Some("File match found: PNG")
        );
    }
}

#[test]
fn test_pdf() {
    let dir = temp_dir();
    let path = write_file(&dir, "doc.pdf", b"%PDF-1.4\n1 0 obj\n<< >>\nendobj\n");
    assert_eq!(
        file_info(&identifier(), &path).as_deref(),
        Some("File match found: PDF")
    );
}

#[test]
fn test_五个零字节_无命中() {
    let dir = temp_dir();
    let path = write_file(&dir, "zeros.bin", &[0; 5]);
    assert_eq!(
        file_info(&identifier(), &path).as_deref(),
        Some("No file match found.")
    );
}

#[test]
fn test_文本文件_无命中() {
    let dir = temp_dir();
    let path = write_file(&dir, "notes.txt", b"hello, plain text\n");
    let result = identifier().identify(&path);
    assert_eq!(result.file_info.as_deref(), Some("No file match found."));
    assert_eq!(result.mime_info.as_deref(), Some("No MIME type information."));
}

#[test]
fn test_小于4字节_默认结果() {
    let dir = temp_dir();
    let identifier = Identifier::builder()
        .mime_probe(|_: &Path| Some("application/octet-stream".to_string()))
        .build();
    for len in 0..4 {
        // 即使内容是 PNG 的开头也不做比较
        let data = &[0x89, 0x50, 0x4e][..len.min(3)];
        let path = write_file(&dir, &format!("tiny_{len}"), data);
        assert_eq!(identifier.identify(&path), IdentificationResult::default());
    }
}

#[test]
fn test_不存在的路径_默认结果() {
    let dir = temp_dir();
    let result = identifier().identify(dir.path().join("no-such-file"));
    assert_eq!(result, IdentificationResult::default());
    assert!(result.is_empty());
}

#[test]
fn test_幂等() {
    let dir = temp_dir();
    let path = write_file(&dir, "a.7z", b"7z\xbc\xaf\x27\x1c\x00\x04\x8d\x9b");
    let identifier = filesig::default_identifier();
    assert_eq!(identifier.identify(&path), identifier.identify(&path));
}

#[test]
fn test_匹配方式_子串与锚定() {
    let dir = temp_dir();
    // "MZ" 出现在偏移 6
    let path = write_file(&dir, "shifted", b"\xee\xee\xee\xee\xee\xeeMZ\x90\x00");

    assert_eq!(
        file_info(&identifier(), &path).as_deref(),
        Some("File match found: EXE (MZ: DOS / Windows)")
    );

    let anchored = Identifier::builder()
        .match_mode(MatchMode::Anchored)
        .without_mime()
        .build();
    assert_eq!(
        file_info(&anchored, &path).as_deref(),
        Some("No file match found.")
    );
}

#[test]
fn test_自定义文本签名表() {
    let dir = temp_dir();
    let table_path = write_file(
        &dir,
        "signatures.txt",
        b"# house formats\nHouse (v2) = 48 53 45 02\nHouse = 48 53 45\n",
    );
    let source = match TextSource::from_file(&table_path) {
        Ok(source) => source,
        Err(err) => panic!("加载签名表失败: {err}"),
    };
    let identifier = Identifier::builder().source(source).without_mime().build();

    let v2 = write_file(&dir, "a.hse", b"HSE\x02payload");
    let v1 = write_file(&dir, "b.hse", b"HSE\x01payload");
    assert_eq!(
        file_info(&identifier, &v2).as_deref(),
        Some("File match found: House (v2)")
    );
    assert_eq!(
        file_info(&identifier, &v1).as_deref(),
        Some("File match found: House")
    );
}

#[test]
fn test_签名来源无效() {
    let dir = temp_dir();
    let path = write_file(&dir, "a.png", b"\x89PNG\r\n\x1a\n\x00\x00");
    let identifier = Identifier::builder()
        .source(FnSource::new("empty", Vec::new))
        .without_mime()
        .build();

    assert!(identifier.identify(&path).is_empty());
    assert!(matches!(
        identifier.try_identify(&path),
        Err(FilesigError::BadSignatureSource { .. })
    ));
}

#[test]
fn test_批量识别() {
    let dir = temp_dir();
    let paths = vec![
        write_file(&dir, "a.gif", b"GIF87a\x01\x00\x01\x00"),
        dir.path().join("missing"),
        write_file(&dir, "c.xz", b"\xfd7zXZ\x00\x00\x04"),
    ];
    let results = identify_all(&identifier(), &paths);
    let lines: Vec<Option<&str>> = results
        .iter()
        .map(|(_, result)| result.file_info.as_deref())
        .collect();
    assert_eq!(
        lines,
        vec![
            Some("File match found: GIF87a"),
            None,
            Some("File match found: XZ"),
        ]
    );
}
