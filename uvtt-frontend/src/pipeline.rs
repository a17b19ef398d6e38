use std::path::PathBuf;

use tracing::info;
use uvtt_engine::mapper::convert;
use uvtt_engine::summary::ConversionSummary;
use uvtt_io::{FoundrySceneFacade, SceneLoader, UvttSaver, UvttWriter};

use crate::errors::FrontendError;
use crate::request::ConversionRequest;

/// 成功转换后的结果，供 CLI 打印。
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub output: PathBuf,
    pub summary: ConversionSummary,
}

/// 使用默认的 Foundry 读取器与 UVTT 写出器执行转换。
pub fn run_conversion(request: &ConversionRequest) -> Result<ConversionReport, FrontendError> {
    let loader = FoundrySceneFacade::new();
    let saver = UvttWriter::new()
        .with_indent(request.indent)
        .create_missing_dirs(request.create_missing_dirs);
    run_conversion_with(&loader, &saver, request)
}

/// 读取 -> 转换 -> 写出。只有转换成功后才会触碰输出文件。
pub fn run_conversion_with(
    loader: &dyn SceneLoader,
    saver: &dyn UvttSaver,
    request: &ConversionRequest,
) -> Result<ConversionReport, FrontendError> {
    let scene = loader.load(&request.input)?;
    let document = convert(&scene, &request.options)?;
    let summary = ConversionSummary::new(&scene, &document);
    info!(
        scene = summary.scene_name.as_deref().unwrap_or("<unnamed>"),
        walls = summary.walls,
        portals = summary.portals,
        closed_portals = summary.closed_portals,
        "场景转换完成"
    );

    saver.save(&document, &request.output)?;
    info!(path = %request.output.display(), "UVTT 文件已保存");
    Ok(ConversionReport {
        output: request.output.clone(),
        summary,
    })
}
