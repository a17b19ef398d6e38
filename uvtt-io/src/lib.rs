use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, trace};
use uvtt_core::{
    scene::{SceneDocument, WallSegment},
    uvtt::UvttDocument,
};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("input file {path:?} not found or is not a file")]
    InputNotFound { path: PathBuf },
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON in {path:?}: {source}")]
    MalformedJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("schema violation in {path:?} ({}): {message}", wall_label(.wall))]
    SchemaViolation {
        path: PathBuf,
        wall: Option<String>,
        message: String,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn wall_label(wall: &Option<String>) -> &str {
    match wall {
        Some(label) => label.as_str(),
        None => "scene",
    }
}

pub trait SceneLoader {
    fn load(&self, path: &Path) -> Result<SceneDocument, IoError>;
}

pub trait UvttSaver {
    fn save(&self, document: &UvttDocument, path: &Path) -> Result<(), IoError>;
}

/// 读取 Foundry 场景：单个 JSON 文档，或每行一个对象的 NeDB 世界数据库（`*.db`）。
pub struct FoundrySceneFacade;

impl FoundrySceneFacade {
    pub fn new() -> Self {
        Self
    }

    /// 从内存中的文本解析场景，`path` 仅用于错误信息。
    pub fn parse(&self, data: &str, path: &Path) -> Result<SceneDocument, IoError> {
        parse_scene(data).map_err(|err| match err {
            SceneParseError::Malformed(source) => IoError::MalformedJson {
                path: path.to_path_buf(),
                source,
            },
            SceneParseError::Schema { wall, message } => IoError::SchemaViolation {
                path: path.to_path_buf(),
                wall,
                message,
            },
        })
    }
}

impl Default for FoundrySceneFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneLoader for FoundrySceneFacade {
    fn load(&self, path: &Path) -> Result<SceneDocument, IoError> {
        if !path.is_file() {
            return Err(IoError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        let data = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let scene = self.parse(&data, path)?;
        debug!(
            path = %path.display(),
            walls = scene.walls.len(),
            "场景读取完成"
        );
        Ok(scene)
    }
}

/// 写出 UVTT 文档。先完整序列化到内存，再一次性写入目标文件。
pub struct UvttWriter {
    indent: usize,
    create_missing_dirs: bool,
}

impl UvttWriter {
    /// 默认与旧版转换脚本一致：4 空格缩进，并自动创建缺失的目录。
    pub fn new() -> Self {
        Self {
            indent: 4,
            create_missing_dirs: true,
        }
    }

    /// `indent` 为 0 时输出单行 JSON。
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn create_missing_dirs(mut self, enabled: bool) -> Self {
        self.create_missing_dirs = enabled;
        self
    }

    pub fn to_bytes(&self, document: &UvttDocument) -> Result<Vec<u8>, serde_json::Error> {
        let mut buffer = if self.indent == 0 {
            serde_json::to_vec(document)?
        } else {
            let indent = vec![b' '; self.indent];
            let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
            let mut buffer = Vec::new();
            let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
            document.serialize(&mut serializer)?;
            buffer
        };
        buffer.push(b'\n');
        Ok(buffer)
    }
}

impl Default for UvttWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl UvttSaver for UvttWriter {
    fn save(&self, document: &UvttDocument, path: &Path) -> Result<(), IoError> {
        let write_error = |source: std::io::Error| IoError::WriteError {
            path: path.to_path_buf(),
            source,
        };
        let bytes = self
            .to_bytes(document)
            .map_err(|err| write_error(std::io::Error::from(err)))?;

        if self.create_missing_dirs {
            if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                if !parent.exists() {
                    debug!(dir = %parent.display(), "创建输出目录");
                    fs::create_dir_all(parent).map_err(write_error)?;
                }
            }
        }

        fs::write(path, &bytes).map_err(write_error)?;
        debug!(path = %path.display(), bytes = bytes.len(), "UVTT 文档已写出");
        Ok(())
    }
}

#[derive(Debug)]
enum SceneParseError {
    Malformed(serde_json::Error),
    Schema {
        wall: Option<String>,
        message: String,
    },
}

impl SceneParseError {
    fn schema(wall: Option<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            wall,
            message: message.into(),
        }
    }
}

fn parse_scene(data: &str) -> Result<SceneDocument, SceneParseError> {
    let value = match serde_json::from_str::<Value>(data) {
        Ok(value) => value,
        Err(err) => match scan_scene_line(data) {
            Some(value) => value,
            None => return Err(SceneParseError::Malformed(err)),
        },
    };
    decode_scene(value)
}

/// 场景对象必备的字段；NeDB 中只有同时具备这些字段的行才视为场景。
const SCENE_KEYS: [&str; 5] = ["width", "height", "grid", "img", "walls"];

/// NeDB 数据库每行一个 JSON 对象，取第一个具备全部场景字段的对象。
fn scan_scene_line(data: &str) -> Option<Value> {
    let lines: Vec<(usize, &str)> = data
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .collect();
    if lines.len() < 2 {
        return None;
    }

    lines.into_iter().find_map(|(line_number, line)| {
        let value = serde_json::from_str::<Value>(line).ok()?;
        if SCENE_KEYS.iter().all(|key| value.get(key).is_some()) {
            debug!(line_number, "在 NeDB 数据行中找到场景");
            Some(value)
        } else {
            trace!(line_number, "跳过非场景数据行");
            None
        }
    })
}

fn decode_scene(value: Value) -> Result<SceneDocument, SceneParseError> {
    let Value::Object(mut object) = value else {
        return Err(SceneParseError::schema(None, "top-level value must be a JSON object"));
    };
    let walls = object
        .remove("walls")
        .ok_or_else(|| SceneParseError::schema(None, "missing field `walls`"))?;
    let Value::Array(walls) = walls else {
        return Err(SceneParseError::schema(None, "`walls` must be an array"));
    };

    object.insert("walls".to_string(), Value::Array(Vec::new()));
    let mut scene: SceneDocument = serde_json::from_value(Value::Object(object))
        .map_err(|err| SceneParseError::schema(None, err.to_string()))?;

    scene.walls = walls
        .into_iter()
        .enumerate()
        .map(|(index, wall)| decode_wall(index, wall))
        .collect::<Result<_, _>>()?;

    scene
        .validate()
        .map_err(|err| SceneParseError::schema(Some(err.wall), err.source.to_string()))?;
    Ok(scene)
}

fn decode_wall(index: usize, value: Value) -> Result<WallSegment, SceneParseError> {
    let label = value
        .as_object()
        .and_then(wall_identifier)
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{index}"));
    serde_json::from_value(value).map_err(|err| SceneParseError::schema(Some(label), err.to_string()))
}

fn wall_identifier(object: &Map<String, Value>) -> Option<&str> {
    object
        .get("_id")
        .or_else(|| object.get("id"))
        .and_then(Value::as_str)
}
