//! SVG内容文档模板
//!
//! 每个图层被包进一个独立的SVG文档，共享的定义、脚本与字体声明在这里一并注入。

use crate::svg::format_number;
use quick_xml::escape::partial_escape;

/// 内容文档模板
pub const SVG_TEMPLATE: &str = r#"<?xml version="1.0" standalone="no"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN"
"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" version="1.1" width="{{viewport.width}}" height="{{viewport.height}}" viewBox="0 0 {{document.width}} {{document.height}}" xml:space="preserve" preserveAspectRatio="xMinYMin">
    <title>{{title}}</title>
    <style id="font-declarations">
        {{font-faces}}
    </style>
    {{defs}}
    {{scripts}}
    <metadata id="metadata5">
        <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:dc="http://purl.org/dc/elements/1.1/">
            <dc:format>image/svg+xml</dc:format>
            <dc:type rdf:resource="http://purl.org/dc/dcmitype/StillImage"/>
            <dc:title>{{title}}</dc:title>
        </rdf:RDF>
    </metadata>
    {{element.source}}
</svg>"#;

/// 填充模板所需的值
///
/// `font_faces` 是CSS文本，填充时会转义；`defs`、`scripts` 与 `element_source` 是标记，原样插入。
#[derive(Debug, Clone, Default)]
pub struct TemplateValues<'a> {
    pub title: &'a str,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub document_width: f64,
    pub document_height: f64,
    pub font_faces: &'a str,
    pub defs: &'a str,
    pub scripts: &'a str,
    pub element_source: &'a str,
}

/// 用给定的值填充内容文档模板
pub fn render(values: &TemplateValues) -> String {
    fill(SVG_TEMPLATE, |key| match key {
        "title" => Some(partial_escape(values.title).into_owned()),
        "viewport.width" => Some(format_number(values.viewport_width)),
        "viewport.height" => Some(format_number(values.viewport_height)),
        "document.width" => Some(format_number(values.document_width)),
        "document.height" => Some(format_number(values.document_height)),
        "font-faces" => Some(partial_escape(values.font_faces).into_owned()),
        "defs" => Some(values.defs.to_string()),
        "scripts" => Some(values.scripts.to_string()),
        "element.source" => Some(values.element_source.to_string()),
        _ => None,
    })
}

/// 单遍替换 `{{key}}` 占位符
///
/// 替换进来的文本不会再被扫描，未知的占位符原样保留。
pub fn fill<F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match lookup(key) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push_str("{{");
                        out.push_str(key);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::svg::{Element, SVG_NS};

    fn values<'a>(title: &'a str, source: &'a str) -> TemplateValues<'a> {
        TemplateValues {
            title,
            viewport_width: 210.0,
            viewport_height: 297.0,
            document_width: 210.0,
            document_height: 297.0,
            font_faces: "",
            defs: "<defs/>",
            scripts: "",
            element_source: source,
        }
    }

    #[test]
    fn test_fill_single_pass() {
        let result = fill("{{a}} {{b}} {{unknown}} {{", |key| match key {
            "a" => Some("{{b}}".to_string()),
            "b" => Some("B".to_string()),
            _ => None,
        });
        assert_eq!(result, "{{b}} B {{unknown}} {{");
    }

    #[test]
    fn test_render_document() {
        let source = r#"<g xmlns="http://www.w3.org/2000/svg" id="layer1"><rect width="1" height="1"/></g>"#;
        let svg = render(&values("猫 & 狗", source));

        assert!(svg.contains(r#"width="210.0" height="297.0" viewBox="0 0 210.0 297.0""#));
        assert!(svg.contains("<title>猫 &amp; 狗</title>"));
        assert!(svg.contains("<dc:title>猫 &amp; 狗</dc:title>"));

        let root = Element::parse(&svg).unwrap();
        assert!(root.is(SVG_NS, "svg"));
        assert!(root.find_child(SVG_NS, "defs").is_some());
        let layer = root.find_child(SVG_NS, "g").unwrap();
        assert_eq!(layer.attr("id"), Some("layer1"));
    }

    #[test]
    fn test_render_escapes_font_faces() {
        let mut v = values("", "<g/>");
        v.font_faces = "@font-face { src: url(\"a&b.ttf\"); }";
        let svg = render(&v);
        assert!(svg.contains("url(\"a&amp;b.ttf\")"));
        assert!(Element::parse(&svg).is_ok());
    }
}
