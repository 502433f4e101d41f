//! filesig - 文件类型识别工具
//!
//! 读取文件开头的若干字节, 与内置魔数签名表比对, 并可选地调用系统 MIME 探测.

mod logging;

use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process;

use filesig_core::FilesigResult;
use filesig_detect::{
    IdentificationResult, Identifier, IdentifierBuilder, MatchMode, SignatureTable, TextSource,
    identify_all,
};

/// filesig 文件类型识别工具
#[derive(Parser, Debug)]
#[command(name = "filesig", version, about = "基于文件头魔数的文件类型识别工具")]
struct Cli {
    /// 待识别的文件路径
    paths: Vec<PathBuf>,

    /// 签名必须从文件偏移 0 开始匹配
    #[arg(long)]
    anchored: bool,

    /// 不调用系统 MIME 探测
    #[arg(long)]
    no_mime: bool,

    /// 从文本文件加载签名表 (每行 `名称 = 十六进制字节`)
    #[arg(long, value_name = "FILE")]
    signatures: Option<PathBuf>,

    /// 列出当前签名表后退出
    #[arg(long)]
    list: bool,

    /// 输出 JSON 格式
    #[arg(long)]
    json: bool,

    /// 日志级别 (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// 额外写入日志文件的目录
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,
}

// ============================================================
// JSON 输出结构体
// ============================================================

/// 单个文件的识别报告
#[derive(Serialize)]
struct FileReport {
    path: String,
    #[serde(flatten)]
    result: IdentificationResult,
}

/// 签名表条目
#[derive(Serialize)]
struct SignatureInfo {
    index: usize,
    label: String,
    pattern: String,
}

// ============================================================
// 主逻辑
// ============================================================

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init(cli.verbose, cli.log_dir.as_deref()) {
        eprintln!("警告: {e:#}");
    }

    let identifier = match build_identifier(&cli) {
        Ok(identifier) => identifier,
        Err(e) => {
            eprintln!("错误: {e}");
            process::exit(1);
        }
    };

    if cli.list {
        match identifier.signatures() {
            Ok(table) => print_table(&table, cli.json),
            Err(e) => {
                eprintln!("错误: {e}");
                process::exit(1);
            }
        }
        return;
    }

    let results = match identify_paths(&identifier, &cli.paths) {
        Ok(results) => results,
        Err(rejection) => {
            eprint!("{}", rejection.message);
            process::exit(rejection.code);
        }
    };

    if cli.json {
        let reports: Vec<FileReport> = results
            .into_iter()
            .map(|(path, result)| FileReport {
                path: path.display().to_string(),
                result,
            })
            .collect();
        print_json(&reports);
    } else {
        for (path, result) in &results {
            print!("{}", render_text(path, result));
        }
    }
}

/// 命令行前置检查失败: 写到 stderr 的消息和退出码
#[derive(Debug, PartialEq, Eq)]
struct Rejection {
    message: String,
    code: i32,
}

/// 检查路径参数后批量识别
///
/// 没有路径或任一路径不存在时直接拒绝, 不调用识别引擎.
fn identify_paths(
    identifier: &Identifier,
    paths: &[PathBuf],
) -> Result<Vec<(PathBuf, IdentificationResult)>, Rejection> {
    if paths.is_empty() {
        return Err(Rejection {
            message: usage(),
            code: 1,
        });
    }

    // 识别引擎自身也会检查, 这里提前给出针对路径的提示
    if let Some(missing) = paths.iter().find(|path| !path.exists()) {
        return Err(Rejection {
            message: format!("'{}' does not exist!\n", missing.display()),
            code: 1,
        });
    }

    log::info!(
        "识别 {} 个文件, 签名来源: {}, 匹配方式: {:?}",
        paths.len(),
        identifier.source_name(),
        identifier.config().match_mode
    );
    Ok(identify_all(identifier, paths))
}

/// 根据命令行参数构建识别器
fn build_identifier(cli: &Cli) -> FilesigResult<Identifier> {
    let mut builder = Identifier::builder();
    if cli.anchored {
        builder = builder.match_mode(MatchMode::Anchored);
    }
    if cli.no_mime {
        builder = builder.without_mime();
    }
    builder = with_source(builder, cli.signatures.as_deref())?;
    Ok(builder.build())
}

fn with_source(
    builder: IdentifierBuilder,
    file: Option<&Path>,
) -> FilesigResult<IdentifierBuilder> {
    match file {
        Some(file) => Ok(builder.source(TextSource::from_file(file)?)),
        None => Ok(builder),
    }
}

/// 文本输出: 单个文件, 失败时只输出路径行
fn render_text(path: &Path, result: &IdentificationResult) -> String {
    let mut out = format!("{}:\n", path.display());
    if let Some(ref mime) = result.mime_info {
        out.push_str(mime);
        out.push('\n');
    }
    if let Some(ref file) = result.file_info {
        out.push_str(file);
        out.push('\n');
    }
    out
}

/// 输出签名表
fn print_table(table: &SignatureTable, json: bool) {
    let infos: Vec<SignatureInfo> = table
        .signatures()
        .enumerate()
        .map(|(index, sig)| SignatureInfo {
            index,
            label: sig.label().to_string(),
            pattern: sig.canonical_pattern(),
        })
        .collect();

    if json {
        print_json(&infos);
        return;
    }
    for info in &infos {
        println!("{:>3}  {:<47}  {}", info.index, info.pattern, info.label);
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("错误: JSON 序列化失败: {e}");
            process::exit(1);
        }
    }
}

/// 用法说明
fn usage() -> String {
    format!(
        "\n filesig {}\n\n\tusage: filesig [OPTIONS] <FILE>...\n\n使用 --help 查看完整用法.\n",
        env!("CARGO_PKG_VERSION")
    )
}
