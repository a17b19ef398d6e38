use std::path::PathBuf;

use clap::Parser;
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, fmt};
use uvtt_config::{AppConfig, ConfigError};

/// 将 Foundry VTT 场景转换为 Universal VTT (.uvtt) 文件。
#[derive(Debug, Parser)]
#[command(name = "foundry2uvtt", version)]
struct Cli {
    /// Foundry 场景文件（.json 或 NeDB .db），省略时交互询问
    input: Option<PathBuf>,
    /// 输出路径，默认替换输入文件的扩展名
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// 配置文件路径，覆盖自动发现
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// 覆盖配置中的 UVTT `format` 版本号
    #[arg(long)]
    format_version: Option<f64>,
    /// 输出单行 JSON
    #[arg(long)]
    compact: bool,
}

fn main() {
    let cli = Cli::parse();

    let loaded = match cli.config.as_deref() {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::discover(),
    };
    let (mut config, config_error) = match loaded {
        Ok(cfg) => (cfg, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    init_logging(&config);
    if let Some(err) = config_error {
        warn_config_fallback(&err);
    }
    if let Some(version) = cli.format_version {
        config.output.format_version = version;
    }
    if cli.compact {
        config.output.indent = 0;
    }

    if let Err(err) = uvtt_frontend::run_cli(cli.input, cli.output, &config.output) {
        error!(error = %err, "转换失败");
        eprintln!("错误：{err}");
        std::process::exit(1);
    }
}

/// 配置加载失败时回退到内建默认值，仅记录警告。
fn warn_config_fallback(err: &ConfigError) {
    match err {
        ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => {
            warn!(path = %path.display(), error = %err, "加载配置失败，使用内建默认值");
        }
        ConfigError::Context { .. } => {
            warn!(error = %err, "加载配置失败，使用内建默认值");
        }
    }
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}
