use clap::{ArgAction, Parser};
use layerforge::{ExportOptions, Exporter, PackageConfig, Result, SvgDocument};
use log::{debug, error, info};
use std::io::Read;
use std::path::PathBuf;

/// LayerForge - 把多图层SVG导出为固定版式EPUB
///
/// 作为Inkscape扩展运行时，参数以 `--name=value` 的形式传入，最后一个参数是当前文档的临时副本。
#[derive(Parser)]
#[command(name = "layerforge")]
#[command(about = "把每个可见的根图层导出为一个EPUB内容文档")]
#[command(version)]
struct Args {
    /// SVG文件路径，省略时从标准输入读取
    #[arg(help = "要导出的SVG文件路径（省略时读取标准输入）")]
    input: Option<PathBuf>,

    /// EPUB保存目录
    #[arg(long = "where", default_value = "", help = "EPUB保存目录")]
    destination: String,

    /// 项目根目录
    #[arg(long = "root_folder", default_value = "", help = "项目根目录")]
    root_folder: String,

    /// 输出文件名
    #[arg(long, default_value = layerforge::export::DEFAULT_FILENAME, help = "输出文件名（含扩展名）")]
    filename: String,

    /// 资源文件夹
    #[arg(
        long = "resources_folder",
        default_value = "",
        help = "相对于项目根目录的资源文件夹，其中的文件都会加入EPUB"
    )]
    resources_folder: String,

    /// 最底层的图层作为封面
    #[arg(
        long = "bottom_layer_as_cover",
        action = ArgAction::Set,
        value_parser = parse_bool,
        default_value = "false",
        help = "把最底层的图层作为封面"
    )]
    bottom_layer_as_cover: bool,

    /// 以XHTML包裹SVG
    #[arg(
        long = "wrap_svg_in_html",
        action = ArgAction::Set,
        value_parser = parse_bool,
        default_value = "false",
        help = "把内容文档保存为包裹SVG的XHTML"
    )]
    wrap_svg_in_html: bool,

    /// 图片嵌入为data URI
    #[arg(
        long = "embed_images",
        action = ArgAction::Set,
        value_parser = parse_bool,
        default_value = "false",
        help = "把图片以base64 data URI嵌入内容文档"
    )]
    embed_images: bool,

    /// 打包配置文件
    #[arg(long, help = "YAML格式的打包配置文件")]
    config: Option<PathBuf>,

    /// 生成默认配置文件后退出
    #[arg(long = "generate_config", help = "把默认打包配置写入指定文件后退出")]
    generate_config: Option<PathBuf>,

    /// Inkscape传入的选中对象，不使用
    #[arg(long, hide = true)]
    id: Vec<String>,

    /// Inkscape传入的选中节点，不使用
    #[arg(long = "selected-nodes", hide = true)]
    selected_nodes: Vec<String>,

    /// Inkscape传入的输出路径，不使用
    #[arg(long, hide = true)]
    output: Option<String>,
}

/// 解析Inkscape的布尔参数
fn parse_bool(value: &str) -> std::result::Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(format!("无效的布尔值: {}", other)),
    }
}

fn main() {
    if let Ok(()) = log::set_logger(&LOGGER) {
        log::set_max_level(log::LevelFilter::Info);
    }

    let args = Args::parse();

    if let Err(e) = process(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn process(args: Args) -> Result<()> {
    if let Some(path) = &args.generate_config {
        PackageConfig::generate_default_config(path)?;
        info!("默认配置已写入 {}", path.display());
        return Ok(());
    }

    debug!(
        "忽略宿主参数: id={:?} selected-nodes={:?} output={:?}",
        args.id, args.selected_nodes, args.output
    );

    let config = PackageConfig::load(args.config.as_deref())?;

    let document = match &args.input {
        Some(path) => SvgDocument::from_path(path)?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            SvgDocument::parse(&text)?
        }
    };

    let options = ExportOptions {
        destination: PathBuf::from(args.destination),
        root_folder: PathBuf::from(args.root_folder),
        filename: args.filename,
        resources_folder: PathBuf::from(args.resources_folder),
        bottom_layer_as_cover: args.bottom_layer_as_cover,
        wrap_svg_in_html: args.wrap_svg_in_html,
        embed_images: args.embed_images,
    };

    Exporter::new(options, config).run(&document)?;
    Ok(())
}

/// 输出到标准错误的简单日志器，Inkscape会把标准错误显示给用户
static LOGGER: SimpleLogger = SimpleLogger;
struct SimpleLogger;
impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::LevelFilter::Info
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            match record.level() {
                log::Level::Error => eprintln!("错误: {}", record.args()),
                log::Level::Warn => eprintln!("警告: {}", record.args()),
                _ => eprintln!("{}", record.args()),
            }
        }
    }

    fn flush(&self) {}
}
