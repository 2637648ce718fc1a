//! OPF包文件生成
//!
//! 根据元数据、清单和脊柱生成 `content.opf`。

use crate::epub::opf::{manifest::ManifestItem, metadata::Metadata, spine::SpineItem};
use quick_xml::escape::escape;

/// 唯一标识符元素的ID
pub const UNIQUE_IDENTIFIER_ID: &str = "id";

/// OPF包文件
#[derive(Debug, Clone)]
pub struct Opf {
    /// EPUB版本
    pub version: String,
    /// 元数据
    pub metadata: Metadata,
    /// 清单项(按输出顺序)
    pub manifest: Vec<ManifestItem>,
    /// 脊柱(阅读顺序)
    pub spine: Vec<SpineItem>,
    /// 脊柱的目录引用(NCX的清单ID)
    pub spine_toc: Option<String>,
}

impl Opf {
    /// 创建EPUB 3包文件
    pub fn new(metadata: Metadata) -> Self {
        Self {
            version: "3.0".to_string(),
            metadata,
            manifest: Vec::new(),
            spine: Vec::new(),
            spine_toc: None,
        }
    }

    /// 输出完整的OPF文档
    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str(&format!(
            "<package xmlns=\"http://www.idpf.org/2007/opf\" version=\"{}\" unique-identifier=\"{}\">\n",
            escape(self.version.as_str()),
            UNIQUE_IDENTIFIER_ID
        ));

        xml.push_str(&self.metadata.to_xml());

        xml.push_str("  <manifest>\n");
        for item in &self.manifest {
            xml.push_str(&item.to_xml());
        }
        xml.push_str("  </manifest>\n");

        match &self.spine_toc {
            Some(toc) => xml.push_str(&format!("  <spine toc=\"{}\">\n", escape(toc.as_str()))),
            None => xml.push_str("  <spine>\n"),
        }
        for item in &self.spine {
            xml.push_str(&item.to_xml());
        }
        xml.push_str("  </spine>\n");

        xml.push_str("</package>\n");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_xml_structure() {
        let mut metadata = Metadata::new();
        metadata.add_dublin_core("title", "测试", Vec::new());

        let mut opf = Opf::new(metadata);
        opf.manifest.push(ManifestItem::new(
            "page1".to_string(),
            "page1.svg".to_string(),
            "image/svg+xml".to_string(),
        ));
        opf.spine.push(SpineItem::new("page1".to_string()));
        opf.spine.push(SpineItem::with_linear("extra".to_string(), false));
        opf.spine_toc = Some("ncx".to_string());

        let xml = opf.to_xml();
        assert!(xml.contains(r#"version="3.0" unique-identifier="id""#));
        assert!(xml.contains("<dc:title>测试</dc:title>"));
        assert!(xml.contains(r#"<item id="page1" href="page1.svg" media-type="image/svg+xml"/>"#));
        assert!(xml.contains(r#"<spine toc="ncx">"#));
        assert!(xml.contains(r#"<itemref idref="page1"/>"#));
        assert!(xml.contains(r#"<itemref idref="extra" linear="no"/>"#));

        // 生成的OPF应当是格式良好的XML
        assert!(crate::svg::Element::parse(&xml).is_ok());
    }
}
