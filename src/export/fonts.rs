//! 字体声明
//!
//! 文本使用的字体族在资源文件夹中按名称模糊匹配字体文件，匹配到的字体生成 `@font-face`
//! 规则，内容文档中的 `font-family` 改写为规范化后的名称。

use crate::epub::encode_href;
use crate::export::resources::ResourceLocator;
use crate::svg::{Element, Style};
use log::warn;

/// 单条 `@font-face` 规则的模板
pub const FONT_FACE_TEMPLATE: &str = "
    @font-face {
      font-family: {{font.family}};
      src: url(\"{{font.url}}\");
    }
    ";

/// 一个字体族的解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct FontFace {
    /// 文档中出现的原始写法
    pub original: String,
    /// 规范化后的名称
    pub family: String,
    /// 字体文件相对于项目根目录的路径，没有找到时为 `None`
    pub url: Option<String>,
}

/// 规范化字体族名称：空格替换为 `+`，去掉引号
pub fn normalize_family(family: &str) -> String {
    family
        .trim()
        .replace(' ', "+")
        .replace(['\'', '"'], "")
}

/// 为每个字体族查找字体文件，找不到时报告
pub fn resolve_fonts(families: &[String], locator: &ResourceLocator) -> Vec<FontFace> {
    families
        .iter()
        .map(|original| {
            let family = normalize_family(original);
            let url = locator
                .find_file_fuzzy(&family)
                .and_then(|path| locator.relative_resource_path(&path));
            if url.is_none() {
                warn!(
                    "在 {} 中找不到与 {} 匹配的字体文件",
                    locator.resources_path().display(),
                    family
                );
            }
            FontFace {
                original: original.clone(),
                family,
                url,
            }
        })
        .collect()
}

/// 拼接所有找到文件的字体的 `@font-face` 规则
pub fn font_face_rules(fonts: &[FontFace]) -> String {
    fonts
        .iter()
        .filter_map(|font| {
            let url = font.url.as_deref()?;
            Some(
                FONT_FACE_TEMPLATE
                    .replace("{{font.family}}", &font.family)
                    .replace("{{font.url}}", &encode_href(url)),
            )
        })
        .collect()
}

/// 把子树中的 `font-family`（样式声明与表现属性）改写为规范化名称，返回改写的元素数
pub fn rewrite_font_families(element: &mut Element, fonts: &[FontFace]) -> usize {
    if fonts.is_empty() {
        return 0;
    }

    let lookup = |value: &str| {
        fonts
            .iter()
            .find(|font| font.original == value.trim())
            .map(|font| font.family.clone())
    };

    let mut rewritten = 0;
    element.visit_mut(&mut |e| {
        let mut changed = false;

        if let Some(value) = e.attr("style") {
            let mut style = Style::parse(value);
            if let Some(family) = style.get("font-family").and_then(lookup) {
                style.set("font-family", family);
                e.set_attr("style", style.to_string());
                changed = true;
            }
        }

        if let Some(family) = e.attr("font-family").and_then(lookup) {
            e.set_attr("font-family", family);
            changed = true;
        }

        if changed {
            rewritten += 1;
        }
    });
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_normalize_family() {
        assert_eq!(normalize_family("'Open Sans'"), "Open+Sans");
        assert_eq!(normalize_family("\"Noto Serif SC\""), "Noto+Serif+SC");
        assert_eq!(normalize_family("Arial"), "Arial");
    }

    #[test]
    fn test_resolve_fonts_and_rules() {
        let dir = tempdir().unwrap();
        let fonts_dir = dir.path().join("resources").join("fonts");
        fs::create_dir_all(&fonts_dir).unwrap();
        fs::write(fonts_dir.join("Open+Sans-Regular.ttf"), b"font").unwrap();
        let locator = ResourceLocator::new(dir.path(), "resources");

        let fonts = resolve_fonts(&["'Open Sans'".to_string(), "Comic Sans".to_string()], &locator);
        assert_eq!(fonts.len(), 2);
        assert_eq!(fonts[0].family, "Open+Sans");
        assert_eq!(fonts[0].url.as_deref(), Some("resources/fonts/Open+Sans-Regular.ttf"));
        assert_eq!(fonts[1].url, None);

        let rules = font_face_rules(&fonts);
        assert!(rules.contains("font-family: Open+Sans;"));
        assert!(rules.contains("src: url(\"resources/fonts/Open+Sans-Regular.ttf\");"));
        assert!(!rules.contains("Comic"));
    }

    #[test]
    fn test_rewrite_font_families() {
        let fonts = vec![FontFace {
            original: "'Open Sans'".to_string(),
            family: "Open+Sans".to_string(),
            url: None,
        }];
        let mut root = Element::parse(
            r#"<g><text style="font-size:12px;font-family:'Open Sans'">a</text><text font-family="'Open Sans'">b</text><text style="font-family:Arial">c</text></g>"#,
        )
        .unwrap();

        assert_eq!(rewrite_font_families(&mut root, &fonts), 2);
        let texts: Vec<&Element> = root.element_children().collect();
        assert_eq!(texts[0].attr("style"), Some("font-size:12px;font-family:Open+Sans"));
        assert_eq!(texts[1].attr("font-family"), Some("Open+Sans"));
        assert_eq!(texts[2].attr("style"), Some("font-family:Arial"));
    }
}
