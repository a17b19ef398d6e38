pub mod cli;
pub mod errors;
pub mod pipeline;
pub mod request;

use std::path::PathBuf;

use errors::FrontendError;
use tracing::info;
use uvtt_config::OutputConfig;

use crate::pipeline::{ConversionReport, run_conversion};
use crate::request::{ConversionRequest, StdinPrompt};

/// 解析输入/输出路径（必要时交互询问），执行转换并打印结果。
pub fn run_cli(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    config: &OutputConfig,
) -> Result<ConversionReport, FrontendError> {
    let request = ConversionRequest::resolve(input, output, config, &mut StdinPrompt)?;
    info!(
        input = %request.input.display(),
        output = %request.output.display(),
        format = request.options.format_version,
        "启动转换"
    );
    cli::print_start(&request);
    let report = run_conversion(&request)?;
    cli::print_report(&report);
    Ok(report)
}
