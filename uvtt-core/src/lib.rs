pub mod geometry {
    use glam::DVec2;
    use serde::{Deserialize, Serialize, Serializer};

    /// 超过 2^53 的整数无法被 f64 精确表示，此时保留浮点输出。
    const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

    /// 二维点，序列化为 `{"x": .., "y": ..}`。
    ///
    /// 坐标内部以 `f64` 保存；没有小数部分的坐标输出为 JSON 整数，
    /// 例如 `4628` 而不是 `4628.0`，与导入工具的样例保持一致。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point {
        #[serde(serialize_with = "serialize_coord")]
        pub x: f64,
        #[serde(serialize_with = "serialize_coord")]
        pub y: f64,
    }

    impl Point {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self { x, y }
        }

        #[inline]
        pub fn from_vec(vec: DVec2) -> Self {
            Self { x: vec.x, y: vec.y }
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            DVec2::new(self.x, self.y)
        }

        /// 两点的算术中点，不做任何取整。先各自减半再相加，坐标接近 `f64::MAX` 时不会溢出。
        #[inline]
        pub fn midpoint(self, other: Point) -> Point {
            Self::from_vec(self.as_vec2() / 2.0 + other.as_vec2() / 2.0)
        }
    }

    /// 有序线段，序列化为两个端点组成的数组。端点顺序与来源一致，不做规范化。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Segment(pub [Point; 2]);

    impl Segment {
        #[inline]
        pub fn new(start: Point, end: Point) -> Self {
            Self([start, end])
        }

        /// 由 `[x1, y1, x2, y2]` 构造线段。
        #[inline]
        pub fn from_coords([x1, y1, x2, y2]: [f64; 4]) -> Self {
            Self::new(Point::new(x1, y1), Point::new(x2, y2))
        }

        #[inline]
        pub fn start(&self) -> Point {
            self.0[0]
        }

        #[inline]
        pub fn end(&self) -> Point {
            self.0[1]
        }

        #[inline]
        pub fn midpoint(&self) -> Point {
            self.start().midpoint(self.end())
        }
    }

    pub fn serialize_coord<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
            serializer.serialize_i64(*value as i64)
        } else {
            serializer.serialize_f64(*value)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn midpoint_keeps_fractional_part() {
            let segment = Segment::from_coords([4628.0, 2511.0, 4628.0, 2730.0]);
            let mid = segment.midpoint();
            assert_eq!(mid.x, 4628.0);
            assert_eq!(mid.y, 2620.5);
        }

        #[test]
        fn midpoint_of_huge_coordinates_stays_finite() {
            let segment = Segment::from_coords([1.7e308, 0.0, 1.7e308, 2.0]);
            let mid = segment.midpoint();
            assert!(mid.x.is_finite());
            assert_eq!(mid.x, 1.7e308);
            assert_eq!(mid.y, 1.0);

            let json = serde_json::to_string(&mid).unwrap();
            assert!(!json.contains("null"), "{json}");

            let spread = Segment::from_coords([-f64::MAX, 0.0, f64::MAX, 0.0]);
            assert_eq!(spread.midpoint().x, 0.0);
        }

        #[test]
        fn integral_coordinates_serialize_as_integers() {
            let json = serde_json::to_string(&Point::new(4628.0, 2620.5)).unwrap();
            assert_eq!(json, r#"{"x":4628,"y":2620.5}"#);

            let json = serde_json::to_string(&Point::new(-0.0, -12.25)).unwrap();
            assert_eq!(json, r#"{"x":0,"y":-12.25}"#);
        }

        #[test]
        fn segment_serializes_endpoints_in_order() {
            let segment = Segment::from_coords([10.0, 10.0, 0.0, 0.0]);
            let json = serde_json::to_string(&segment).unwrap();
            assert_eq!(json, r#"[{"x":10,"y":10},{"x":0,"y":0}]"#);

            let back: Segment = serde_json::from_str(&json).unwrap();
            assert_eq!(back, segment);
        }
    }
}

pub mod scene {
    use serde::Deserialize;
    use thiserror::Error;

    use crate::geometry::Segment;

    /// Foundry 场景文档（扁平格式）。`name` 与 `gridType` 仅用于提示信息。
    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct SceneDocument {
        #[serde(default)]
        pub name: Option<String>,
        pub width: u32,
        pub height: u32,
        pub grid: u32,
        #[serde(rename = "gridType", default)]
        pub grid_type: Option<i64>,
        pub img: String,
        pub walls: Vec<WallSegment>,
    }

    impl SceneDocument {
        /// 检查所有墙段的门标志，返回第一个不合法的墙段。
        pub fn validate(&self) -> Result<(), SceneError> {
            for (index, wall) in self.walls.iter().enumerate() {
                wall.classify().map_err(|source| SceneError {
                    wall: wall.label(index),
                    source,
                })?;
            }
            Ok(())
        }
    }

    /// 单条墙段。`c` 为 `[x1, y1, x2, y2]`，`door` 为 0/1。
    /// `ds` 缺省视为 0（关闭）；非 0 值（1 打开、2 上锁）均视为未关闭。
    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct WallSegment {
        #[serde(rename = "_id", alias = "id", default)]
        pub id: Option<String>,
        pub c: [f64; 4],
        pub door: u8,
        #[serde(default)]
        pub ds: Option<u8>,
        #[serde(rename = "move", default)]
        pub movement: Option<i64>,
        #[serde(default)]
        pub sense: Option<i64>,
    }

    impl WallSegment {
        pub fn wall(c: [f64; 4]) -> Self {
            Self {
                id: None,
                c,
                door: 0,
                ds: None,
                movement: None,
                sense: None,
            }
        }

        pub fn door(c: [f64; 4], ds: Option<u8>) -> Self {
            Self {
                door: 1,
                ds,
                ..Self::wall(c)
            }
        }

        pub fn with_id(mut self, id: impl Into<String>) -> Self {
            self.id = Some(id.into());
            self
        }

        #[inline]
        pub fn segment(&self) -> Segment {
            Segment::from_coords(self.c)
        }

        /// 依据 `door` / `ds` 判定墙段类型。
        pub fn classify(&self) -> Result<WallKind, WallError> {
            match self.door {
                0 => Ok(WallKind::Wall),
                1 => match self.ds.unwrap_or(0) {
                    0 => Ok(WallKind::Door(DoorState::Closed)),
                    _ => Ok(WallKind::Door(DoorState::Open)),
                },
                other => Err(WallError::InvalidDoorFlag(other)),
            }
        }

        /// 报错用的标识：优先使用 `_id`，否则使用数组下标。
        pub fn label(&self, index: usize) -> String {
            match &self.id {
                Some(id) => id.clone(),
                None => format!("#{index}"),
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum DoorState {
        Closed,
        Open,
    }

    impl DoorState {
        #[inline]
        pub fn is_closed(self) -> bool {
            matches!(self, DoorState::Closed)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum WallKind {
        Wall,
        Door(DoorState),
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
    pub enum WallError {
        #[error("`door` must be 0 or 1, got {0}")]
        InvalidDoorFlag(u8),
    }

    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    #[error("wall {wall}: {source}")]
    pub struct SceneError {
        pub wall: String,
        #[source]
        pub source: WallError,
    }

}

pub mod uvtt {
    use serde::{Deserialize, Serialize};

    use crate::geometry::{Point, Segment};

    /// 未显式配置时写入 `format` 字段的版本号。
    pub const DEFAULT_FORMAT_VERSION: f64 = 1.0;

    /// Universal VTT 文档。字段顺序即输出顺序。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct UvttDocument {
        pub format: f64,
        pub resolution: Resolution,
        pub image: String,
        pub line_of_sight: Vec<Segment>,
        pub portals: Vec<Portal>,
    }

    impl UvttDocument {
        pub fn new(format: f64, resolution: Resolution, image: impl Into<String>) -> Self {
            Self {
                format,
                resolution,
                image: image.into(),
                line_of_sight: Vec::new(),
                portals: Vec::new(),
            }
        }

        pub fn closed_portals(&self) -> usize {
            self.portals.iter().filter(|portal| portal.closed).count()
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Resolution {
        pub map_size: MapSize,
        pub pixels_per_grid: u32,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MapSize {
        pub x: u32,
        pub y: u32,
    }

    /// 门：边界线段、中点位置与开闭状态。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Portal {
        pub position: Point,
        pub bounds: Segment,
        pub closed: bool,
        pub freestanding: bool,
    }

    impl Portal {
        /// 由边界构造门，`position` 取边界中点，`freestanding` 固定为 `false`。
        pub fn from_bounds(bounds: Segment, closed: bool) -> Self {
            Self {
                position: bounds.midpoint(),
                bounds,
                closed,
                freestanding: false,
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn portal_matches_importer_shape() {
            let portal = Portal::from_bounds(
                Segment::from_coords([4628.0, 2511.0, 4628.0, 2730.0]),
                true,
            );
            let json = serde_json::to_string(&portal).unwrap();
            assert_eq!(
                json,
                r#"{"position":{"x":4628,"y":2620.5},"bounds":[{"x":4628,"y":2511},{"x":4628,"y":2730}],"closed":true,"freestanding":false}"#
            );
        }

        #[test]
        fn document_fields_serialize_in_order() {
            let doc = UvttDocument::new(
                DEFAULT_FORMAT_VERSION,
                Resolution {
                    map_size: MapSize { x: 100, y: 200 },
                    pixels_per_grid: 50,
                },
                "m.png",
            );
            let json = serde_json::to_string(&doc).unwrap();
            assert_eq!(
                json,
                r#"{"format":1.0,"resolution":{"map_size":{"x":100,"y":200},"pixels_per_grid":50},"image":"m.png","line_of_sight":[],"portals":[]}"#
            );
        }
    }
}
