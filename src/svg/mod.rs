//! SVG源文档模块
//!
//! 负责读取Inkscape保存的SVG文档，并提供导出时需要的图层、定义、脚本、字体与元数据查询。

pub mod tree;
pub mod units;
pub mod style;
pub mod document;

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub use document::{Layer, SvgDocument};
pub use style::Style;
pub use tree::{Attribute, Element, Node};
pub use units::{format_number, parse_length};

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
pub const INKSCAPE_NS: &str = "http://www.inkscape.org/namespaces/inkscape";
pub const SODIPODI_NS: &str = "http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd";
pub const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
pub const CC_NS: &str = "http://creativecommons.org/ns#";
pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// 常用前缀到命名空间URI的映射
static NAMESPACES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("svg", SVG_NS),
        ("xlink", XLINK_NS),
        ("inkscape", INKSCAPE_NS),
        ("sodipodi", SODIPODI_NS),
        ("dc", DC_NS),
        ("cc", CC_NS),
        ("rdf", RDF_NS),
        ("xml", XML_NS),
    ])
});

/// 查找常用前缀对应的命名空间
pub fn namespace_for_prefix(prefix: &str) -> Option<&'static str> {
    NAMESPACES.get(prefix).copied()
}

/// 判断命名空间是否属于编辑器私有数据
pub fn is_editor_namespace(namespace: &str) -> bool {
    namespace == INKSCAPE_NS || namespace == SODIPODI_NS
}
