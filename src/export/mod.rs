//! 图层导出
//!
//! 把SVG文档中每个可见的根图层转换为一个固定版式EPUB内容文档，并连同资源、脚本、
//! 字体与元数据一起打包。

pub mod resources;
pub mod images;
pub mod fonts;
pub mod scripts;
pub mod template;
pub mod prune;

use crate::epub::{write_epub, EpubBook, EpubItem, HtmlPage, PackageConfig, TocLink};
use crate::error::Result;
use crate::svg::{Attribute, Element, Layer, SvgDocument};
use chrono::Utc;
use fonts::FontFace;
use images::ImageRewriter;
use log::{info, warn};
use scripts::SharedScripts;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use template::TemplateValues;
use uuid::Uuid;

pub use resources::ResourceLocator;

/// 默认输出文件名
pub const DEFAULT_FILENAME: &str = "publication.epub";

/// 导航文档文件名
const NAV_FILE: &str = "nav.xhtml";

/// NCX文件名
const NCX_FILE: &str = "toc.ncx";

/// 不能用作内容文档名称的ID
const RESERVED_NAMES: [&str; 3] = ["nav", "ncx", "toc"];

/// 导出选项，对应扩展的参数
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// 输出目录
    pub destination: PathBuf,
    /// 项目根目录
    pub root_folder: PathBuf,
    /// 输出文件名（含扩展名）
    pub filename: String,
    /// 相对于项目根目录的资源文件夹
    pub resources_folder: PathBuf,
    /// 最底层的图层作为封面
    pub bottom_layer_as_cover: bool,
    /// 以XHTML包裹SVG输出内容文档
    pub wrap_svg_in_html: bool,
    /// 图片嵌入为 `data:` URI
    pub embed_images: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            destination: PathBuf::new(),
            root_folder: PathBuf::new(),
            filename: DEFAULT_FILENAME.to_string(),
            resources_folder: PathBuf::new(),
            bottom_layer_as_cover: false,
            wrap_svg_in_html: false,
            embed_images: false,
        }
    }
}

/// 组装好的出版物
#[derive(Debug, Clone)]
pub struct Publication {
    pub book: EpubBook,
    /// 内容文档文件名，按阅读顺序
    pub documents: Vec<String>,
    /// 从资源文件夹加入的文件数
    pub resources: usize,
}

/// 导出结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportReport {
    /// 写出的EPUB路径，没有可导出的图层时为 `None`
    pub output: Option<PathBuf>,
    pub documents: Vec<String>,
    pub resources: usize,
}

/// 所有内容文档共享的注入内容
struct SharedContent {
    namespaces: Vec<Attribute>,
    defs: String,
    scripts: SharedScripts,
    fonts: Vec<FontFace>,
    font_faces: String,
}

/// 图层导出器
pub struct Exporter {
    options: ExportOptions,
    config: PackageConfig,
    locator: ResourceLocator,
}

impl Exporter {
    /// 创建导出器
    ///
    /// # 参数
    /// * `options` - 导出选项
    /// * `config` - 打包配置
    pub fn new(options: ExportOptions, config: PackageConfig) -> Self {
        let locator = ResourceLocator::new(&options.root_folder, &options.resources_folder);
        Self {
            options,
            config,
            locator,
        }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn config(&self) -> &PackageConfig {
        &self.config
    }

    pub fn locator(&self) -> &ResourceLocator {
        &self.locator
    }

    /// 导出文档并写入 `destination/filename`
    ///
    /// # 返回值
    /// * `Result<ExportReport>` - 没有可见图层时不写文件，`output` 为 `None`
    pub fn run(&self, document: &SvgDocument) -> Result<ExportReport> {
        let publication = match self.build(document)? {
            Some(publication) => publication,
            None => return Ok(ExportReport::default()),
        };

        let destination = if self.options.destination.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            self.options.destination.clone()
        };
        fs::create_dir_all(&destination)?;

        let output = destination.join(&self.options.filename);
        write_epub(&output, &publication.book, self.config.compression_level)?;
        info!("EPUB文件已保存到 {}", output.display());

        Ok(ExportReport {
            output: Some(output),
            documents: publication.documents,
            resources: publication.resources,
        })
    }

    /// 组装出版物但不写入文件
    ///
    /// # 返回值
    /// * `Result<Option<Publication>>` - 没有可见图层时为 `None`
    pub fn build(&self, document: &SvgDocument) -> Result<Option<Publication>> {
        let layers = document.visible_layers();
        if layers.is_empty() {
            warn!("没有可导出的SVG元素或图层");
            return Ok(None);
        }

        let mut book = EpubBook::new();
        let resources = self.locator.add_resources(&mut book);
        let shared = self.shared_content(document, &mut book);
        self.apply_metadata(document, &mut book);

        let mut taken: HashSet<String> = book.items().iter().map(|item| item.id.clone()).collect();
        taken.extend(RESERVED_NAMES.iter().map(|name| name.to_string()));

        let mut documents = Vec::with_capacity(layers.len());
        for layer in &layers {
            let is_cover = self.options.bottom_layer_as_cover && layer.position == 0;
            let name = unique_name(&document_name(layer), &mut taken);

            let mut root = self.render_layer(document, layer, &shared)?;
            if is_cover {
                scripts::strip_scripts(&mut root);
            }
            let scripted = !is_cover && (!shared.scripts.is_empty() || scripts::has_scripts(&root));

            let title = if layer.label().is_empty() {
                name.clone()
            } else {
                layer.label().to_string()
            };

            let mut item = if self.options.wrap_svg_in_html {
                let page = HtmlPage {
                    title: title.clone(),
                    lang: None,
                    body: root.to_xml(),
                    width: Some(document.width()),
                    height: Some(document.height()),
                };
                EpubItem::html_document(&name, &format!("{}.xhtml", name), page)
            } else {
                let source = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}\n", root.to_xml());
                EpubItem::svg_document(&name, &format!("{}.svg", name), source)
            };

            if scripted {
                item.add_property("scripted");
            }
            if is_cover {
                if !self.options.wrap_svg_in_html {
                    item.add_property("cover-image");
                }
                book.metadata.add_meta_name_based("cover", &name);
                book.add_landmark(&item.file_name, "cover", &title);
            }

            book.add_toc_link(TocLink::new(&item.file_name, &title, &name));
            documents.push(item.file_name.clone());
            let id = book.add_item(item);
            book.add_to_spine(&id);
        }

        book.add_item(EpubItem::nav(NAV_FILE));
        if self.config.write_ncx {
            book.add_item(EpubItem::ncx(NCX_FILE));
        }

        Ok(Some(Publication {
            book,
            documents,
            resources,
        }))
    }

    /// 收集注入每个文档的定义、脚本与字体声明
    fn shared_content(&self, document: &SvgDocument, book: &mut EpubBook) -> SharedContent {
        let namespaces = document.namespace_declarations();

        let defs: String = document
            .defs()
            .iter()
            .map(|defs| defs.to_fragment(&namespaces))
            .collect();
        let defs = if defs.is_empty() { "<defs/>".to_string() } else { defs };

        let scripts = scripts::collect_scripts(&document.scripts(), &self.locator, book);
        let fonts = fonts::resolve_fonts(&document.font_families(), &self.locator);
        let font_faces = fonts::font_face_rules(&fonts);

        SharedContent {
            namespaces,
            defs,
            scripts,
            fonts,
            font_faces,
        }
    }

    /// 写入出版物元数据
    ///
    /// 文档中的都柏林核心条目优先，缺少的标题、语言和标识符使用配置或生成的值。
    fn apply_metadata(&self, document: &SvgDocument, book: &mut EpubBook) {
        match document.metadata() {
            Some(terms) => {
                for (term, value) in terms {
                    match term.as_str() {
                        "title" => book.set_title(&value),
                        "language" => book.set_language(&value),
                        "identifier" => book.set_identifier(&value),
                        _ => book.metadata.add_dublin_core(&term, &value, Vec::new()),
                    }
                }
            }
            None => warn!("文档中没有cc:Work元数据，使用默认值"),
        }

        if book.metadata.title().is_none() {
            book.set_title(&self.config.default_title);
        }
        if book.metadata.language().is_none() {
            book.set_language(&self.config.language);
        }
        if book.metadata.identifier().is_none() {
            book.set_identifier(&format!("urn:uuid:{}", Uuid::new_v4()));
        }

        book.metadata.add_meta_property_based("rendition:layout", "pre-paginated");
        book.metadata.add_meta_property_based("rendition:orientation", &self.config.orientation);
        if let Some(spread) = &self.config.spread {
            book.metadata.add_meta_property_based("rendition:spread", spread);
        }
        let modified = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        book.metadata.add_meta_property_based("dcterms:modified", &modified);
    }

    /// 把图层包进模板并清理，返回内容文档的根元素
    fn render_layer(&self, document: &SvgDocument, layer: &Layer, shared: &SharedContent) -> Result<Element> {
        let mut element = layer.element.clone();
        ImageRewriter::new(&self.locator, document.base_dir(), self.options.embed_images).rewrite(&mut element);

        let label = layer.label();
        if !label.is_empty() {
            element.set_attr("label", label);
            element.set_attr("class", label);
        }
        let source = element.to_fragment(&shared.namespaces);

        let svg = template::render(&TemplateValues {
            title: label,
            viewport_width: document.width(),
            viewport_height: document.height(),
            document_width: document.width(),
            document_height: document.height(),
            font_faces: &shared.font_faces,
            defs: &shared.defs,
            scripts: &shared.scripts.markup,
            element_source: &source,
        });

        let mut root = Element::parse(&svg)?;
        fonts::rewrite_font_families(&mut root, &shared.fonts);
        prune::prune(&mut root);
        Ok(root)
    }
}

/// 由标签或ID得到的文档名称，空格替换为下划线
fn document_name(layer: &Layer) -> String {
    let label = layer.label().trim();
    let base = if label.is_empty() { layer.id() } else { label.replace(' ', "_") };
    sanitize_id(&base)
}

/// 转换为合法的XML ID：非法字符替换为 `_`，不能以数字等开头
fn sanitize_id(value: &str) -> String {
    let mut id: String = value
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') { c } else { '_' })
        .collect();

    let first = id.chars().next();
    match first {
        None => id.push_str("layer"),
        Some(first) if !(first.is_alphabetic() || first == '_') => id.insert(0, '_'),
        _ => {}
    }
    id
}

/// 名称已被占用时追加序号
fn unique_name(base: &str, taken: &mut HashSet<String>) -> String {
    let mut name = base.to_string();
    let mut counter = 2;
    while taken.contains(&name) {
        name = format!("{}_{}", base, counter);
        counter += 1;
    }
    taken.insert(name.clone());
    name
}
