use thiserror::Error;
use uvtt_engine::errors::ConvertError;
use uvtt_io::IoError;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("未提供输入文件路径")]
    MissingInput,
    #[error("输出路径与输入文件相同，拒绝覆盖: {}", path.display())]
    OutputOverwritesInput { path: std::path::PathBuf },
    #[error("读取输入路径失败: {0}")]
    Prompt(#[source] std::io::Error),
    #[error(transparent)]
    Io(#[from] IoError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
}
