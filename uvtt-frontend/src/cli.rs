use crate::pipeline::ConversionReport;
use crate::request::ConversionRequest;

pub fn print_start(request: &ConversionRequest) {
    println!("开始转换 '{}'...", request.input.display());
}

/// 打印转换统计与完成信息。
pub fn print_report(report: &ConversionReport) {
    let summary = &report.summary;
    println!();
    println!("--- 转换统计 ---");
    if let Some(name) = &summary.scene_name {
        println!("{:<16}: {}", "场景", name);
    }
    println!(
        "{:<16}: {} x {} 像素",
        "画布尺寸", summary.canvas_width, summary.canvas_height
    );
    match summary.grid_squares() {
        Some((columns, rows)) => println!("{:<16}: {columns:.2} x {rows:.2} 格", "网格尺寸"),
        None => println!("{:<16}: <未定义>", "网格尺寸"),
    }
    println!("{:<16}: {}", "每格像素", summary.pixels_per_grid);
    println!("{:<16}: {}", "墙体", summary.walls);
    println!(
        "{:<16}: {} (关闭 {}, 打开 {})",
        "门",
        summary.portals,
        summary.closed_portals,
        summary.open_portals()
    );
    println!("----------------");
    println!();
    println!("转换完成，输出已保存到 '{}'", report.output.display());
}
