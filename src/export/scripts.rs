//! 脚本注入
//!
//! 根级 `<script>` 会注入到每个内容文档：外部脚本作为资源写入包内的 `scripts/` 目录，
//! 内联脚本连同源码一起复制。图层内部的脚本只属于该图层，保持原样。

use crate::epub::{encode_href, EpubBook, EpubItem};
use crate::export::resources::ResourceLocator;
use crate::svg::{Element, SVG_NS, XLINK_NS};
use log::warn;
use quick_xml::escape::escape;

/// 外部脚本在包内的目录
pub const SCRIPTS_FOLDER: &str = "scripts";

const SCRIPT_MEDIA_TYPE: &str = "text/javascript";

/// 注入到每个内容文档的脚本
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SharedScripts {
    /// 插入模板的标记
    pub markup: String,
    /// 文档根级脚本元素的数量（包括无法读取的）
    pub count: usize,
}

impl SharedScripts {
    /// 是否存在根级脚本
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// 收集根级脚本，外部脚本加入书籍
pub fn collect_scripts(
    scripts: &[&Element],
    locator: &ResourceLocator,
    book: &mut EpubBook,
) -> SharedScripts {
    let mut markup = String::new();

    for script in scripts {
        let href = script
            .attr_ns(XLINK_NS, "href")
            .or_else(|| script.attr("href"))
            .filter(|href| !href.is_empty());

        match href {
            Some(href) => {
                let content = match locator.read_file(href) {
                    Some(content) => content,
                    None => {
                        warn!("无法读取脚本 \"{}\"，已跳过", href);
                        continue;
                    }
                };

                let file_name = format!("{}/{}", SCRIPTS_FOLDER, script_basename(href));
                if !book.contains_file(&file_name) {
                    book.add_item(EpubItem::new(file_name.as_str(), content).with_media_type(SCRIPT_MEDIA_TYPE));
                }
                markup.push_str(&format!(
                    "<script type=\"{}\" xlink:href=\"{}\"/>",
                    SCRIPT_MEDIA_TYPE,
                    escape(encode_href(&file_name).as_str())
                ));
            }
            None => {
                let source = script.text_content();
                if source.trim().is_empty() {
                    continue;
                }
                markup.push_str("<script");
                if let Some(id) = script.attr("id") {
                    markup.push_str(&format!(" id=\"{}\"", escape(id)));
                }
                markup.push_str("><![CDATA[");
                markup.push_str(&source.replace("]]>", "]]]]><![CDATA[>"));
                markup.push_str("]]></script>");
            }
        }
    }

    SharedScripts {
        markup,
        count: scripts.len(),
    }
}

/// 子树中是否有 `<script>`
pub fn has_scripts(element: &Element) -> bool {
    element.descendants().iter().any(|e| e.is(SVG_NS, "script"))
}

/// 删除子树中的所有 `<script>`
pub fn strip_scripts(element: &mut Element) {
    element.retain_elements(&mut |e| !e.is(SVG_NS, "script"));
}

/// 链接最后一段作为文件名，去掉查询与片段
fn script_basename(href: &str) -> &str {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    if name.is_empty() { "script.js" } else { name }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SCRIPTS: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
  <script xlink:href="js/app.js"/>
  <script id="inline"><![CDATA[var a = 1 < 2;]]></script>
  <script xlink:href="js/missing.js"/>
  <script id="blank">   </script>
</svg>"#;

    #[test]
    fn test_collect_scripts() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("js")).unwrap();
        fs::write(dir.path().join("js").join("app.js"), b"console.log(1);").unwrap();
        let locator = ResourceLocator::new(dir.path(), "resources");

        let root = Element::parse(SCRIPTS).unwrap();
        let scripts: Vec<&Element> = root.element_children().collect();
        let mut book = EpubBook::new();

        let shared = collect_scripts(&scripts, &locator, &mut book);
        assert_eq!(shared.count, 4);
        assert_eq!(
            shared.markup,
            "<script type=\"text/javascript\" xlink:href=\"scripts/app.js\"/>\
             <script id=\"inline\"><![CDATA[var a = 1 < 2;]]></script>"
        );

        assert_eq!(book.items().len(), 1);
        let item = &book.items()[0];
        assert_eq!(item.file_name, "scripts/app.js");
        assert_eq!(item.media_type, "text/javascript");
    }

    #[test]
    fn test_no_scripts() {
        let dir = tempdir().unwrap();
        let locator = ResourceLocator::new(dir.path(), "resources");
        let mut book = EpubBook::new();

        let shared = collect_scripts(&[], &locator, &mut book);
        assert!(shared.is_empty());
        assert!(shared.markup.is_empty());
    }

    #[test]
    fn test_strip_scripts() {
        let mut root = Element::parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><script>a()</script><g><script>b()</script><rect/></g></svg>"#,
        )
        .unwrap();
        assert!(has_scripts(&root));

        strip_scripts(&mut root);
        assert!(!has_scripts(&root));
        assert_eq!(root.to_xml(), r#"<svg xmlns="http://www.w3.org/2000/svg"><g><rect/></g></svg>"#);
    }

    #[test]
    fn test_script_basename() {
        assert_eq!(script_basename("https://cdn.example.com/lib/d3.min.js?v=7"), "d3.min.js");
        assert_eq!(script_basename("js/app.js"), "app.js");
        assert_eq!(script_basename("https://example.com/"), "script.js");
    }
}
