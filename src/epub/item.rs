//! EPUB包中的条目
//!
//! 条目可以是原样写入的资源、SVG内容文档、包裹SVG的XHTML内容文档，或由写入器
//! 生成的导航文档与NCX。

use crate::svg::format_number;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use quick_xml::escape::{escape, partial_escape};
use std::path::Path;

pub const SVG_MEDIA_TYPE: &str = "image/svg+xml";
pub const XHTML_MEDIA_TYPE: &str = "application/xhtml+xml";
pub const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

/// 路径片段中需要百分号编码的字符
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}')
    .add(b'\\');

/// 以XHTML包裹的内容文档
#[derive(Debug, Clone, Default)]
pub struct HtmlPage {
    /// `<title>` 内容，为空时不输出
    pub title: String,
    /// 文档语言，为空时使用书籍语言
    pub lang: Option<String>,
    /// 放入 `<body>` 的标记
    pub body: String,
    /// 视口宽度
    pub width: Option<f64>,
    /// 视口高度
    pub height: Option<f64>,
}

impl HtmlPage {
    /// 渲染完整的XHTML文档
    ///
    /// # 参数
    /// * `book_language` - 页面没有指定语言时使用的书籍语言
    pub fn render(&self, book_language: &str) -> String {
        let lang = self.lang.as_deref().unwrap_or(book_language);
        let lang = escape(lang);

        let mut html = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE html>\n");
        html.push_str(&format!(
            "<html xmlns=\"http://www.w3.org/1999/xhtml\" xmlns:epub=\"http://www.idpf.org/2007/ops\" lang=\"{}\" xml:lang=\"{}\">\n",
            lang, lang
        ));

        html.push_str("<head>\n");
        if !self.title.is_empty() {
            html.push_str(&format!("  <title>{}</title>\n", partial_escape(self.title.as_str())));
        }
        if let (Some(width), Some(height)) = (self.width, self.height) {
            html.push_str(&format!(
                "  <meta name=\"viewport\" content=\"width={}, height={}\"/>\n",
                format_number(width),
                format_number(height)
            ));
        }
        html.push_str("</head>\n");

        html.push_str("<body>\n");
        html.push_str(&self.body);
        html.push_str("\n</body>\n</html>\n");
        html
    }
}

/// 条目内容
#[derive(Debug, Clone)]
pub enum ItemContent {
    /// 原样写入的字节
    Raw(Vec<u8>),
    /// SVG内容文档，原样写入
    Svg(String),
    /// XHTML内容文档，写入时渲染
    Html(HtmlPage),
    /// EPUB 3导航文档，由写入器根据目录生成
    Nav,
    /// EPUB 2 NCX，由写入器根据目录生成
    Ncx,
}

/// 书籍中的一个条目
#[derive(Debug, Clone)]
pub struct EpubItem {
    /// 清单ID，加入书籍时为空则自动分配
    pub id: String,
    /// 相对于包目录的文件名
    pub file_name: String,
    /// 媒体类型，加入书籍时为空则按扩展名推断
    pub media_type: String,
    pub content: ItemContent,
    /// 清单属性（如 `scripted`、`svg`、`cover-image`）
    pub properties: Vec<String>,
    /// 为true时列入清单并写入包目录，否则原样写入压缩包根目录且不列入清单
    pub manifest: bool,
    /// 为false时只列入清单，不写入内容
    pub create: bool,
    /// 在脊柱中是否线性阅读
    pub linear: bool,
}

impl EpubItem {
    /// 创建原样写入的资源条目
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            id: String::new(),
            file_name: file_name.into(),
            media_type: String::new(),
            content: ItemContent::Raw(content),
            properties: Vec::new(),
            manifest: true,
            create: true,
            linear: true,
        }
    }

    /// 指定媒体类型
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    /// 指定清单ID
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// 创建SVG内容文档
    pub fn svg_document(uid: &str, file_name: &str, content: String) -> Self {
        Self {
            id: uid.to_string(),
            file_name: file_name.to_string(),
            media_type: SVG_MEDIA_TYPE.to_string(),
            content: ItemContent::Svg(content),
            properties: Vec::new(),
            manifest: true,
            create: true,
            linear: true,
        }
    }

    /// 创建包裹内联SVG的XHTML内容文档
    pub fn html_document(uid: &str, file_name: &str, page: HtmlPage) -> Self {
        Self {
            id: uid.to_string(),
            file_name: file_name.to_string(),
            media_type: XHTML_MEDIA_TYPE.to_string(),
            content: ItemContent::Html(page),
            properties: vec!["svg".to_string()],
            manifest: true,
            create: true,
            linear: true,
        }
    }

    /// 导航文档
    pub fn nav(file_name: &str) -> Self {
        Self {
            id: "nav".to_string(),
            file_name: file_name.to_string(),
            media_type: XHTML_MEDIA_TYPE.to_string(),
            content: ItemContent::Nav,
            properties: vec!["nav".to_string()],
            manifest: true,
            create: true,
            linear: false,
        }
    }

    /// NCX目录
    pub fn ncx(file_name: &str) -> Self {
        Self {
            id: "ncx".to_string(),
            file_name: file_name.to_string(),
            media_type: NCX_MEDIA_TYPE.to_string(),
            content: ItemContent::Ncx,
            properties: Vec::new(),
            manifest: true,
            create: true,
            linear: false,
        }
    }

    /// 是否为图片资源
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.properties.iter().any(|p| p == property)
    }

    /// 添加清单属性，已存在时忽略
    pub fn add_property(&mut self, property: &str) {
        if !self.has_property(property) {
            self.properties.push(property.to_string());
        }
    }

    /// 获取写入压缩包的内容
    ///
    /// 导航文档与NCX由写入器生成，这里返回 `None`。
    pub fn get_content(&self, book_language: &str) -> Option<Vec<u8>> {
        match &self.content {
            ItemContent::Raw(bytes) => Some(bytes.clone()),
            ItemContent::Svg(source) => Some(source.clone().into_bytes()),
            ItemContent::Html(page) => Some(page.render(book_language).into_bytes()),
            ItemContent::Nav | ItemContent::Ncx => None,
        }
    }
}

/// 把包内路径转换为URL引用，逐段做百分号编码，保留 `/`
pub fn encode_href(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// 根据扩展名推断媒体类型
pub fn guess_media_type(file_name: &str) -> String {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "svg" => SVG_MEDIA_TYPE,
        "xhtml" | "html" | "htm" => XHTML_MEDIA_TYPE,
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "txt" => "text/plain",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "mp3" => "audio/mpeg",
        "m4a" | "mp4a" => "audio/mp4",
        "ogg" | "oga" => "audio/ogg",
        "wav" => "audio/wav",
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "smil" => "application/smil+xml",
        "ncx" => NCX_MEDIA_TYPE,
        _ => "application/octet-stream",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_media_type() {
        assert_eq!(guess_media_type("images/a.PNG"), "image/png");
        assert_eq!(guess_media_type("fonts/Open+Sans.ttf"), "font/ttf");
        assert_eq!(guess_media_type("scripts/app.js"), "text/javascript");
        assert_eq!(guess_media_type("README"), "application/octet-stream");
    }

    #[test]
    fn test_encode_href() {
        assert_eq!(encode_href("resources/my cat.png"), "resources/my%20cat.png");
        assert_eq!(encode_href("fonts/Open+Sans.ttf"), "fonts/Open+Sans.ttf");
        assert_eq!(encode_href("图片/a#1.png"), "%E5%9B%BE%E7%89%87/a%231.png");
        assert_eq!(encode_href("Page_2.svg"), "Page_2.svg");
    }

    #[test]
    fn test_html_page_render() {
        let page = HtmlPage {
            title: "第一页".to_string(),
            lang: None,
            body: "<svg xmlns=\"http://www.w3.org/2000/svg\"/>".to_string(),
            width: Some(210.0),
            height: Some(297.5),
        };
        let html = page.render("zh");

        assert!(html.contains(r#"lang="zh" xml:lang="zh""#));
        assert!(html.contains("<title>第一页</title>"));
        assert!(html.contains(r#"<meta name="viewport" content="width=210.0, height=297.5"/>"#));
        assert!(html.contains("<body>\n<svg"));
        assert!(crate::svg::Element::parse(&html).is_ok());
    }

    #[test]
    fn test_html_page_without_title_or_viewport() {
        let page = HtmlPage {
            lang: Some("fr".to_string()),
            body: "<p>x</p>".to_string(),
            ..Default::default()
        };
        let html = page.render("en");
        assert!(html.contains(r#"lang="fr""#));
        assert!(!html.contains("<title>"));
        assert!(!html.contains("viewport"));
    }

    #[test]
    fn test_item_properties() {
        let mut item = EpubItem::svg_document("p1", "p1.svg", "<svg/>".to_string());
        item.add_property("scripted");
        item.add_property("scripted");
        assert_eq!(item.properties, vec!["scripted".to_string()]);
        item.add_property("svg");
        assert_eq!(item.properties, vec!["scripted".to_string(), "svg".to_string()]);
        assert!(item.is_image());
    }

    #[test]
    fn test_generated_items_have_no_content() {
        assert!(EpubItem::nav("nav.xhtml").get_content("en").is_none());
        assert!(EpubItem::ncx("toc.ncx").get_content("en").is_none());
        assert_eq!(
            EpubItem::new("a.txt", b"abc".to_vec()).get_content("en"),
            Some(b"abc".to_vec())
        );
    }
}
