use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use uvtt_config::OutputConfig;
use uvtt_engine::mapper::ConvertOptions;

use crate::errors::FrontendError;

/// 命令行未给出输入路径时的交互来源。
pub trait InputPrompt {
    fn ask_input_path(&mut self) -> io::Result<Option<PathBuf>>;
}

/// 从标准输入读取一行作为路径。
pub struct StdinPrompt;

impl InputPrompt for StdinPrompt {
    fn ask_input_path(&mut self) -> io::Result<Option<PathBuf>> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "请输入场景文件路径: ")?;
        stdout.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(parse_prompt_answer(&line))
    }
}

/// 去掉首尾空白和拖放文件时常见的引号；空输入视为未提供。
fn parse_prompt_answer(line: &str) -> Option<PathBuf> {
    let trimmed = line.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .or_else(|| {
            trimmed
                .strip_prefix('\'')
                .and_then(|rest| rest.strip_suffix('\''))
        })
        .unwrap_or(trimmed)
        .trim();
    if unquoted.is_empty() {
        None
    } else {
        Some(PathBuf::from(unquoted))
    }
}

/// 一次转换所需的全部参数，在调用核心之前由前端解析完成。
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub options: ConvertOptions,
    pub indent: usize,
    pub create_missing_dirs: bool,
}

impl ConversionRequest {
    /// 依次使用命令行参数、交互输入解析输入路径；输出路径缺省为替换扩展名后的输入路径。
    pub fn resolve(
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        config: &OutputConfig,
        prompt: &mut dyn InputPrompt,
    ) -> Result<Self, FrontendError> {
        let input = match input {
            Some(path) => path,
            None => prompt
                .ask_input_path()
                .map_err(FrontendError::Prompt)?
                .ok_or(FrontendError::MissingInput)?,
        };
        let output = output.unwrap_or_else(|| default_output_path(&input, &config.extension));
        if same_path(&input, &output) {
            return Err(FrontendError::OutputOverwritesInput { path: output });
        }
        debug!(
            input = %input.display(),
            output = %output.display(),
            "转换请求已解析"
        );

        Ok(Self {
            input,
            output,
            options: ConvertOptions {
                format_version: config.format_version,
            },
            indent: config.indent,
            create_missing_dirs: config.create_missing_dirs,
        })
    }
}

/// `maps/cellar.db` -> `maps/cellar.uvtt`
pub fn default_output_path(input: &Path, extension: &str) -> PathBuf {
    input.with_extension(extension)
}

/// 字面相同，或两者都存在且规范化后指向同一文件。
fn same_path(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
