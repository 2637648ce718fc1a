//! SVG文档查询
//!
//! 对应导出流程关心的几类节点：根图层、根级 `<defs>` 与 `<script>`、文本字体以及
//! `cc:Work` 中的都柏林核心元数据。

use crate::error::{ExportError, Result};
use crate::svg::style::Style;
use crate::svg::tree::{Attribute, Element};
use crate::svg::units::{parse_length, parse_view_box, unittouu};
use crate::svg::{CC_NS, DC_NS, INKSCAPE_NS, RDF_NS, SODIPODI_NS, SVG_NS};
use std::fs;
use std::path::{Path, PathBuf};

/// 描述绘图本身而不是出版物的都柏林核心字段
const DRAWING_ONLY_TERMS: [&str; 2] = ["format", "type"];

/// 根级可见图层
#[derive(Debug, Clone, Copy)]
pub struct Layer<'a> {
    /// 在可见图层中的位置（从0开始，自底向上）
    pub position: usize,
    pub element: &'a Element,
}

impl<'a> Layer<'a> {
    /// `inkscape:label`，没有时为空字符串
    pub fn label(&self) -> &'a str {
        self.element.attr_ns(INKSCAPE_NS, "label").unwrap_or("")
    }

    /// 图层ID，空格替换为下划线
    pub fn id(&self) -> String {
        match self.element.attr("id") {
            Some(id) if !id.trim().is_empty() => id.replace(' ', "_"),
            _ => format!("layer{}", self.position + 1),
        }
    }
}

/// 解析后的SVG文档
#[derive(Debug, Clone)]
pub struct SvgDocument {
    root: Element,
    base_dir: Option<PathBuf>,
    width: f64,
    height: f64,
}

impl SvgDocument {
    /// 从SVG文本创建文档
    ///
    /// 相对路径以 `sodipodi:docbase` 为基准（如果存在）。
    pub fn parse(text: &str) -> Result<SvgDocument> {
        let root = Element::parse(text)?;
        if !root.is(SVG_NS, "svg") {
            return Err(ExportError::InvalidSvg(format!(
                "根元素应为svg，找到: {}",
                root.name
            )));
        }

        let (width, height) = Self::dimensions(&root)?;
        let base_dir = root
            .attr_ns(SODIPODI_NS, "docbase")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Ok(SvgDocument {
            root,
            base_dir,
            width,
            height,
        })
    }

    /// 从文件读取SVG文档
    ///
    /// 没有 `sodipodi:docbase` 时以文件所在目录作为相对路径的基准。
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<SvgDocument> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let mut document = Self::parse(&text)?;
        if document.base_dir.is_none() {
            document.base_dir = path.parent().map(Path::to_path_buf);
        }
        Ok(document)
    }

    /// 指定解析相对路径的基准目录
    pub fn with_base_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    fn dimensions(root: &Element) -> Result<(f64, f64)> {
        let view_box = root.attr("viewBox").and_then(parse_view_box);
        let width_px = root.attr("width").and_then(parse_length);

        let scale = match (view_box, width_px) {
            (Some((_, _, vb_width, _)), Some(px)) if px > 0.0 => vb_width / px,
            _ => 1.0,
        };

        let width = root
            .attr("width")
            .and_then(|w| unittouu(w, scale))
            .or(view_box.map(|vb| vb.2));
        let height = root
            .attr("height")
            .and_then(|h| unittouu(h, scale))
            .or(view_box.map(|vb| vb.3));

        match (width, height) {
            (Some(w), Some(h)) => Ok((w, h)),
            _ => Err(ExportError::InvalidSvg(
                "无法确定文档尺寸：缺少有效的width/height或viewBox".to_string(),
            )),
        }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// 文档宽度（用户单位）
    pub fn width(&self) -> f64 {
        self.width
    }

    /// 文档高度（用户单位）
    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// 根元素上的命名空间声明，序列化图层片段时需要补上
    pub fn namespace_declarations(&self) -> Vec<Attribute> {
        self.root.namespace_declarations()
    }

    /// 根级可见图层，按文档顺序（自底向上）
    ///
    /// 子图层属于其父图层，不单独返回。
    pub fn visible_layers(&self) -> Vec<Layer<'_>> {
        self.root
            .element_children()
            .filter(|e| e.is(SVG_NS, "g"))
            .filter(|e| !e.attr("style").map(Style::parse).unwrap_or_default().is_hidden())
            .enumerate()
            .map(|(position, element)| Layer { position, element })
            .collect()
    }

    /// 根级 `<defs>` 元素
    pub fn defs(&self) -> Vec<&Element> {
        self.root
            .element_children()
            .filter(|e| e.is(SVG_NS, "defs"))
            .collect()
    }

    /// 根级 `<script>` 元素；图层内的脚本只属于该图层
    pub fn scripts(&self) -> Vec<&Element> {
        self.root
            .element_children()
            .filter(|e| e.is(SVG_NS, "script"))
            .collect()
    }

    /// 所有 `<text>` 元素使用的字体族，按首次出现顺序去重
    pub fn font_families(&self) -> Vec<String> {
        let mut families: Vec<String> = Vec::new();
        for text in self.root.descendants() {
            if !text.is(SVG_NS, "text") {
                continue;
            }
            let style = text.attr("style").map(Style::parse).unwrap_or_default();
            if let Some(family) = style.get("font-family") {
                if !family.is_empty() && !families.iter().any(|f| f == family) {
                    families.push(family.to_string());
                }
            }
        }
        families
    }

    /// `svg/metadata/rdf:RDF/cc:Work` 中的都柏林核心元数据
    ///
    /// 每项的值是其子树中非空文本片段以 ", " 连接的结果，空值被忽略。
    /// 文档没有 `cc:Work` 时返回 `None`。
    pub fn metadata(&self) -> Option<Vec<(String, String)>> {
        let work = self
            .root
            .find_child(SVG_NS, "metadata")?
            .find_child(RDF_NS, "RDF")?
            .find_child(CC_NS, "Work")?;

        let items = work
            .element_children()
            .filter(|e| e.namespace.as_deref() == Some(DC_NS))
            .filter(|e| !DRAWING_ONLY_TERMS.contains(&e.local_name()))
            .filter_map(|e| {
                let value = e.text_segments().join(", ");
                if value.is_empty() {
                    None
                } else {
                    Some((e.local_name().to_string(), value))
                }
            })
            .collect();

        Some(items)
    }
}
