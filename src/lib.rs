pub mod error;
pub mod svg;
pub mod epub;
pub mod export;

// === 核心API重新导出 ===

/// 图层导出器（主要接口）
pub use export::{ExportOptions, ExportReport, Exporter, Publication};

/// 错误处理
pub use error::{ExportError, Result};

// === 数据结构 ===

/// SVG源文档
pub use svg::{Element, Layer, SvgDocument};

/// 打包配置
pub use epub::PackageConfig;

// === 底层组件（高级用法） ===

/// EPUB书籍模型与写入器
pub use epub::{write_epub, EpubBook, EpubItem, EpubWriter, HtmlPage, ItemContent, TocLink};

/// OPF组件
pub use epub::{Metadata, ManifestItem, Opf, SpineItem};

// === 库信息 ===

/// LayerForge库的版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// LayerForge库的描述
pub const DESCRIPTION: &str = "把多图层SVG绘图导出为固定版式EPUB 3出版物";

// === 便捷函数 ===

/// 读取SVG文件并导出为EPUB
///
/// 这是 `SvgDocument::from_path` 与 `Exporter::run` 的便捷包装函数。
///
/// # 参数
/// * `path` - SVG文件路径
/// * `options` - 导出选项
///
/// # 返回值
/// * `Result<ExportReport>` - 导出结果
///
/// # 示例
///
/// ```rust,no_run
/// use layerforge::ExportOptions;
///
/// let options = ExportOptions {
///     destination: "out".into(),
///     root_folder: "project".into(),
///     resources_folder: "resources".into(),
///     ..Default::default()
/// };
/// let report = layerforge::export("project/book.svg", options)?;
/// println!("文档: {:?}", report.documents);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn export<P: AsRef<std::path::Path>>(path: P, options: ExportOptions) -> Result<ExportReport> {
    let document = SvgDocument::from_path(path)?;
    Exporter::new(options, PackageConfig::default_config()).run(&document)
}
