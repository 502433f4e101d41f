//! 规范化十六进制表示.
//!
//! 文件头与签名模式都先转换为小写、两位一组、单空格分隔的十六进制字符串
//! (如 `0x89 0x50` → `"89 50"`), 再以子串方式比较.

use std::fmt::Write;

/// 将字节序列编码为规范化十六进制字符串
///
/// 空输入返回空字符串.
pub fn to_canonical_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        // 写入 String 不会失败
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// 解析以空白分隔的十六进制字节串 (大小写均可)
///
/// 每个记号必须恰好是两位十六进制数字. 失败时返回出错的记号.
pub fn parse_hex_pattern(text: &str) -> Result<Vec<u8>, String> {
    text.split_whitespace()
        .map(|token| {
            // from_str_radix 接受前导 '+', 需先逐字符检查
            if token.len() != 2 || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(token.to_string());
            }
            u8::from_str_radix(token, 16).map_err(|_| token.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_规范化_小写空格分隔() {
        assert_eq!(to_canonical_hex(&[0x89, 0x50]), "89 50");
        assert_eq!(to_canonical_hex(&[0x0A, 0xFF, 0x00]), "0a ff 00");
        assert_eq!(to_canonical_hex(&[0x7f]), "7f");
        assert_eq!(to_canonical_hex(&[]), "");
    }

    #[test]
    fn test_解析_大小写混合() {
        assert_eq!(
            parse_hex_pattern("50 4B 03 04"),
            Ok(vec![0x50, 0x4b, 0x03, 0x04])
        );
        assert_eq!(parse_hex_pattern("  4f\t67 67 53 "), Ok(vec![0x4f, 0x67, 0x67, 0x53]));
        assert_eq!(parse_hex_pattern(""), Ok(vec![]));
    }

    #[test]
    fn test_解析_非法记号() {
        assert_eq!(parse_hex_pattern("50 4"), Err("4".to_string()));
        assert_eq!(parse_hex_pattern("zz 00"), Err("zz".to_string()));
        assert_eq!(parse_hex_pattern("504b"), Err("504b".to_string()));
        assert_eq!(parse_hex_pattern("+f"), Err("+f".to_string()));
    }
}
