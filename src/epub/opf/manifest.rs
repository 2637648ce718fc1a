//! 清单模块
//!
//! 提供EPUB包中文件清单的结构定义。

use crate::epub::item::encode_href;
use quick_xml::escape::escape;

/// 清单项信息
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestItem {
    /// 项目ID
    pub id: String,
    /// 文件路径(相对于OPF文件)
    pub href: String,
    /// 媒体类型
    pub media_type: String,
    /// 属性(如nav、cover-image等)
    pub properties: Option<String>,
}

impl ManifestItem {
    /// 创建新的清单项
    pub fn new(id: String, href: String, media_type: String) -> Self {
        Self {
            id,
            href,
            media_type,
            properties: None,
        }
    }

    /// 创建带属性的清单项，属性列表为空时等同于 `new`
    pub fn with_properties(id: String, href: String, media_type: String, properties: &[String]) -> Self {
        Self {
            id,
            href,
            media_type,
            properties: if properties.is_empty() {
                None
            } else {
                Some(properties.join(" "))
            },
        }
    }

    /// 输出 `<item>` 元素
    pub fn to_xml(&self) -> String {
        let mut xml = format!(
            "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"",
            escape(self.id.as_str()),
            escape(encode_href(&self.href).as_str()),
            escape(self.media_type.as_str())
        );
        if let Some(properties) = &self.properties {
            xml.push_str(&format!(" properties=\"{}\"", escape(properties.as_str())));
        }
        xml.push_str("/>\n");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_properties() {
        let item = ManifestItem::with_properties(
            "page".to_string(),
            "page.svg".to_string(),
            "image/svg+xml".to_string(),
            &["scripted".to_string(), "cover-image".to_string()],
        );
        assert_eq!(
            item.to_xml(),
            "    <item id=\"page\" href=\"page.svg\" media-type=\"image/svg+xml\" properties=\"scripted cover-image\"/>\n"
        );
    }

    #[test]
    fn test_href_is_encoded() {
        let item = ManifestItem::new(
            "image_1".to_string(),
            "resources/my cat.png".to_string(),
            "image/png".to_string(),
        );
        assert!(item.to_xml().contains(r#"href="resources/my%20cat.png""#));
        assert_eq!(item.href, "resources/my cat.png");
    }

    #[test]
    fn test_no_properties() {
        let item = ManifestItem::with_properties("a".to_string(), "a.png".to_string(), "image/png".to_string(), &[]);
        assert!(item.properties.is_none());
        assert!(!item.to_xml().contains("properties"));
    }
}
