//! 元数据模块
//!
//! 保存写入OPF `<metadata>` 的条目，并按插入顺序输出。

use quick_xml::escape::{escape, partial_escape};

/// 元数据值枚举，表示不同类型的元数据
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    /// EPUB规范的Dublin Core标签元数据
    DublinCore {
        /// 元素内容
        value: String,
        /// 元素属性（如 id、role 等），按顺序输出
        attributes: Vec<(String, String)>,
    },
    /// meta标签的自定义元数据
    Meta(MetaValue),
}

/// meta标签值枚举
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    /// 基于name属性的meta标签，如 <meta name="cover" content="cover"/>
    NameBased {
        /// content属性值
        content: String,
    },
    /// 基于property属性的meta标签，如 <meta property="rendition:layout">pre-paginated</meta>
    PropertyBased {
        /// 标签内容
        content: String,
    },
}

/// OPF文件中的元数据信息
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    /// key为标签名（Dublin Core不含 `dc:` 前缀，meta为name或property），按插入顺序保存
    entries: Vec<(String, MetadataValue)>,
}

impl Metadata {
    /// 创建新的元数据实例
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加Dublin Core元数据
    pub fn add_dublin_core(&mut self, tag: &str, value: &str, attributes: Vec<(String, String)>) {
        self.entries.push((
            tag.to_string(),
            MetadataValue::DublinCore {
                value: value.to_string(),
                attributes,
            },
        ));
    }

    /// 设置唯一的Dublin Core元数据，替换已有的同名条目
    pub fn set_dublin_core(&mut self, tag: &str, value: &str, attributes: Vec<(String, String)>) {
        self.entries.retain(|(t, v)| !(t == tag && matches!(v, MetadataValue::DublinCore { .. })));
        self.add_dublin_core(tag, value, attributes);
    }

    /// 添加基于name的meta元数据
    pub fn add_meta_name_based(&mut self, name: &str, content: &str) {
        self.entries.push((
            name.to_string(),
            MetadataValue::Meta(MetaValue::NameBased {
                content: content.to_string(),
            }),
        ));
    }

    /// 添加基于property的meta元数据
    pub fn add_meta_property_based(&mut self, property: &str, content: &str) {
        self.entries.push((
            property.to_string(),
            MetadataValue::Meta(MetaValue::PropertyBased {
                content: content.to_string(),
            }),
        ));
    }

    /// 查找第一个Dublin Core条目的值
    pub fn dublin_core(&self, tag: &str) -> Option<&str> {
        self.entries.iter().find_map(|(t, v)| match v {
            MetadataValue::DublinCore { value, .. } if t == tag => Some(value.as_str()),
            _ => None,
        })
    }

    /// 查找property类meta的内容
    pub fn property(&self, property: &str) -> Option<&str> {
        self.entries.iter().find_map(|(t, v)| match v {
            MetadataValue::Meta(MetaValue::PropertyBased { content }) if t == property => {
                Some(content.as_str())
            }
            _ => None,
        })
    }

    /// 获取标题
    pub fn title(&self) -> Option<&str> {
        self.dublin_core("title")
    }

    /// 获取语言
    pub fn language(&self) -> Option<&str> {
        self.dublin_core("language")
    }

    /// 获取标识符
    pub fn identifier(&self) -> Option<&str> {
        self.dublin_core("identifier")
    }

    /// 全部条目
    pub fn entries(&self) -> &[(String, MetadataValue)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 输出 `<metadata>` 元素
    pub fn to_xml(&self) -> String {
        let mut xml = String::from(
            "  <metadata xmlns:dc=\"http://purl.org/dc/elements/1.1/\" xmlns:opf=\"http://www.idpf.org/2007/opf\">\n",
        );

        for (tag, value) in &self.entries {
            match value {
                MetadataValue::DublinCore { value, attributes } => {
                    xml.push_str(&format!("    <dc:{}", tag));
                    for (name, attr_value) in attributes {
                        xml.push_str(&format!(" {}=\"{}\"", name, escape(attr_value.as_str())));
                    }
                    xml.push_str(&format!(">{}</dc:{}>\n", partial_escape(value.as_str()), tag));
                }
                MetadataValue::Meta(MetaValue::NameBased { content }) => {
                    xml.push_str(&format!(
                        "    <meta name=\"{}\" content=\"{}\"/>\n",
                        escape(tag.as_str()),
                        escape(content.as_str())
                    ));
                }
                MetadataValue::Meta(MetaValue::PropertyBased { content }) => {
                    xml.push_str(&format!(
                        "    <meta property=\"{}\">{}</meta>\n",
                        escape(tag.as_str()),
                        partial_escape(content.as_str())
                    ));
                }
            }
        }

        xml.push_str("  </metadata>\n");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let mut metadata = Metadata::new();
        metadata.add_dublin_core("title", "第一本书", Vec::new());
        metadata.add_dublin_core("creator", "作者甲", Vec::new());
        metadata.add_meta_property_based("rendition:layout", "pre-paginated");

        assert_eq!(metadata.title(), Some("第一本书"));
        assert_eq!(metadata.dublin_core("creator"), Some("作者甲"));
        assert_eq!(metadata.property("rendition:layout"), Some("pre-paginated"));
        assert_eq!(metadata.language(), None);
        assert_eq!(metadata.len(), 3);
    }

    #[test]
    fn test_set_dublin_core_replaces() {
        let mut metadata = Metadata::new();
        metadata.add_dublin_core("title", "旧标题", Vec::new());
        metadata.add_dublin_core("title", "重复标题", Vec::new());
        metadata.set_dublin_core("title", "新标题", Vec::new());

        assert_eq!(metadata.title(), Some("新标题"));
        assert_eq!(metadata.len(), 1);
    }

    #[test]
    fn test_to_xml_escapes_values() {
        let mut metadata = Metadata::new();
        metadata.add_dublin_core("identifier", "urn:a&b", vec![("id".to_string(), "id".to_string())]);
        metadata.add_dublin_core("title", "<猫>", Vec::new());
        metadata.add_meta_name_based("cover", "page_1");
        metadata.add_meta_property_based("rendition:orientation", "auto");

        let xml = metadata.to_xml();
        assert!(xml.contains(r#"<dc:identifier id="id">urn:a&amp;b</dc:identifier>"#));
        assert!(xml.contains("<dc:title>&lt;猫&gt;</dc:title>"));
        assert!(xml.contains(r#"<meta name="cover" content="page_1"/>"#));
        assert!(xml.contains(r#"<meta property="rendition:orientation">auto</meta>"#));
    }
}
