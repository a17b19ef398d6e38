use tracing::{debug, trace};
use uvtt_core::scene::{SceneDocument, WallKind};
use uvtt_core::uvtt::{DEFAULT_FORMAT_VERSION, MapSize, Portal, Resolution, UvttDocument};

use crate::errors::ConvertError;

/// 转换参数。`format_version` 由导入工具的版本决定，属于配置而非推导数据。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvertOptions {
    pub format_version: f64,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            format_version: DEFAULT_FORMAT_VERSION,
        }
    }
}

/// 将 Foundry 场景转换为 Universal VTT 文档。
///
/// 按来源顺序遍历墙段：`door == 0` 写入 `line_of_sight`，`door == 1` 写入
/// `portals`。任一墙段不合法时整体失败，不返回部分结果。
pub fn convert(
    source: &SceneDocument,
    options: &ConvertOptions,
) -> Result<UvttDocument, ConvertError> {
    let resolution = Resolution {
        map_size: MapSize {
            x: source.width,
            y: source.height,
        },
        pixels_per_grid: source.grid,
    };
    let mut target = UvttDocument::new(options.format_version, resolution, source.img.as_str());

    for (index, wall) in source.walls.iter().enumerate() {
        let kind = wall
            .classify()
            .map_err(|err| ConvertError::SchemaViolation {
                wall: wall.label(index),
                source: err,
            })?;
        let bounds = wall.segment();
        match kind {
            WallKind::Wall => target.line_of_sight.push(bounds),
            WallKind::Door(state) => {
                trace!(index, closed = state.is_closed(), "门段");
                target
                    .portals
                    .push(Portal::from_bounds(bounds, state.is_closed()));
            }
        }
    }

    debug!(
        walls = target.line_of_sight.len(),
        portals = target.portals.len(),
        "墙段分类完成"
    );
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uvtt_core::geometry::{Point, Segment};
    use uvtt_core::scene::{WallError, WallSegment};

    fn scene_with(walls: Vec<WallSegment>) -> SceneDocument {
        SceneDocument {
            name: None,
            width: 100,
            height: 200,
            grid: 50,
            grid_type: None,
            img: "m.png".to_string(),
            walls,
        }
    }

    #[test]
    fn converts_reference_scene() {
        let scene: SceneDocument = serde_json::from_value(json!({
            "width": 100,
            "height": 200,
            "grid": 50,
            "img": "m.png",
            "walls": [
                {"_id": "a", "c": [0, 0, 10, 10], "door": 0, "ds": 0},
                {"_id": "b", "c": [4628, 2511, 4628, 2730], "door": 1, "ds": 0}
            ]
        }))
        .unwrap();

        let target = convert(&scene, &ConvertOptions::default()).unwrap();
        let value = serde_json::to_value(&target).unwrap();

        assert_eq!(
            value["line_of_sight"],
            json!([[{"x": 0, "y": 0}, {"x": 10, "y": 10}]])
        );
        assert_eq!(
            value["portals"],
            json!([{
                "position": {"x": 4628, "y": 2620.5},
                "bounds": [{"x": 4628, "y": 2511}, {"x": 4628, "y": 2730}],
                "closed": true,
                "freestanding": false
            }])
        );
        assert_eq!(
            value["resolution"],
            json!({"map_size": {"x": 100, "y": 200}, "pixels_per_grid": 50})
        );
        assert_eq!(value["image"], json!("m.png"));
        assert_eq!(value["format"], json!(1.0));
    }

    #[test]
    fn empty_wall_list_yields_empty_collections() {
        let target = convert(&scene_with(Vec::new()), &ConvertOptions::default()).unwrap();
        assert!(target.line_of_sight.is_empty());
        assert!(target.portals.is_empty());
    }

    #[test]
    fn preserves_source_order_within_each_collection() {
        let walls = vec![
            WallSegment::wall([0.0, 0.0, 1.0, 0.0]),
            WallSegment::door([10.0, 0.0, 11.0, 0.0], Some(1)),
            WallSegment::wall([2.0, 0.0, 3.0, 0.0]),
            WallSegment::door([12.0, 0.0, 13.0, 0.0], None),
            WallSegment::wall([5.0, 5.0, 4.0, 4.0]),
        ];
        let target = convert(&scene_with(walls.clone()), &ConvertOptions::default()).unwrap();

        assert_eq!(
            target.line_of_sight,
            vec![
                Segment::from_coords([0.0, 0.0, 1.0, 0.0]),
                Segment::from_coords([2.0, 0.0, 3.0, 0.0]),
                Segment::from_coords([5.0, 5.0, 4.0, 4.0]),
            ]
        );
        let bounds: Vec<Segment> = target.portals.iter().map(|p| p.bounds).collect();
        assert_eq!(
            bounds,
            vec![
                Segment::from_coords([10.0, 0.0, 11.0, 0.0]),
                Segment::from_coords([12.0, 0.0, 13.0, 0.0]),
            ]
        );
        assert_eq!(
            target.line_of_sight.len() + target.portals.len(),
            walls.len()
        );
    }

    #[test]
    fn portal_state_and_midpoint_follow_source() {
        let walls = vec![
            WallSegment::door([0.0, 0.0, 3.0, 7.0], Some(0)),
            WallSegment::door([-1.0, 2.0, 4.0, -3.0], Some(1)),
            WallSegment::door([1.0, 1.0, 2.0, 2.0], None),
            WallSegment::door([0.0, 0.0, 10.0, 0.0], Some(2)).with_id("locked"),
        ];
        let target = convert(&scene_with(walls), &ConvertOptions::default()).unwrap();

        let closed: Vec<bool> = target.portals.iter().map(|p| p.closed).collect();
        assert_eq!(closed, vec![true, false, true, false]);
        assert!(target.portals.iter().all(|p| !p.freestanding));
        assert_eq!(target.portals[0].position, Point::new(1.5, 3.5));
        assert_eq!(target.portals[1].position, Point::new(1.5, -0.5));
        assert_eq!(target.portals[2].position, Point::new(1.5, 1.5));
    }

    #[test]
    fn invalid_door_flag_aborts_conversion() {
        let mut secret = WallSegment::wall([0.0, 0.0, 1.0, 1.0]).with_id("secret");
        secret.door = 2;
        let walls = vec![WallSegment::wall([0.0, 0.0, 1.0, 1.0]), secret];

        let err = convert(&scene_with(walls), &ConvertOptions::default()).unwrap_err();
        assert_eq!(
            err,
            ConvertError::SchemaViolation {
                wall: "secret".to_string(),
                source: WallError::InvalidDoorFlag(2),
            }
        );
    }

    #[test]
    fn huge_coordinates_keep_finite_midpoint() {
        let walls = vec![WallSegment::door([1.7e308, 0.0, 1.7e308, 2.0], Some(0))];
        let target = convert(&scene_with(walls), &ConvertOptions::default()).unwrap();

        assert_eq!(target.portals[0].position, Point::new(1.7e308, 1.0));
        let json = serde_json::to_string(&target).unwrap();
        assert!(!json.contains("null"), "{json}");
    }

    #[test]
    fn format_version_comes_from_options() {
        let options = ConvertOptions {
            format_version: 0.4,
        };
        let target = convert(&scene_with(Vec::new()), &options).unwrap();
        assert_eq!(target.format, 0.4);
    }

    #[test]
    fn conversion_is_deterministic() {
        let scene = scene_with(vec![
            WallSegment::wall([0.0, 0.0, 10.0, 10.0]),
            WallSegment::door([4628.0, 2511.0, 4628.0, 2730.0], Some(0)),
        ]);
        let first = serde_json::to_string(&convert(&scene, &ConvertOptions::default()).unwrap())
            .unwrap();
        let second = serde_json::to_string(&convert(&scene, &ConvertOptions::default()).unwrap())
            .unwrap();
        assert_eq!(first, second);
    }
}
