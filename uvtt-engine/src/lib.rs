pub mod mapper;

pub mod errors {
    use thiserror::Error;
    use uvtt_core::scene::WallError;

    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub enum ConvertError {
        #[error("schema violation in wall {wall}: {source}")]
        SchemaViolation {
            wall: String,
            #[source]
            source: WallError,
        },
    }
}

pub mod summary {
    use uvtt_core::scene::SceneDocument;
    use uvtt_core::uvtt::UvttDocument;

    /// 一次转换的统计信息，供前端打印与日志记录。
    #[derive(Debug, Clone, PartialEq)]
    pub struct ConversionSummary {
        pub scene_name: Option<String>,
        pub canvas_width: u32,
        pub canvas_height: u32,
        pub pixels_per_grid: u32,
        pub walls: usize,
        pub portals: usize,
        pub closed_portals: usize,
    }

    impl ConversionSummary {
        pub fn new(source: &SceneDocument, target: &UvttDocument) -> Self {
            Self {
                scene_name: source.name.clone(),
                canvas_width: source.width,
                canvas_height: source.height,
                pixels_per_grid: target.resolution.pixels_per_grid,
                walls: target.line_of_sight.len(),
                portals: target.portals.len(),
                closed_portals: target.closed_portals(),
            }
        }

        #[inline]
        pub fn open_portals(&self) -> usize {
            self.portals - self.closed_portals
        }

        /// 画布尺寸换算为格数；`pixels_per_grid` 为 0 时无意义。
        pub fn grid_squares(&self) -> Option<(f64, f64)> {
            if self.pixels_per_grid == 0 {
                return None;
            }
            let ppg = f64::from(self.pixels_per_grid);
            Some((
                f64::from(self.canvas_width) / ppg,
                f64::from(self.canvas_height) / ppg,
            ))
        }
    }

}
