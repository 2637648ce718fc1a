//! 书籍模型
//!
//! 汇总元数据、条目、脊柱、目录和地标，供写入器输出。

use crate::epub::item::{guess_media_type, EpubItem, ItemContent};
use crate::epub::opf::{Metadata, UNIQUE_IDENTIFIER_ID};

/// 默认语言
pub const DEFAULT_LANGUAGE: &str = "en";

/// 目录链接
#[derive(Debug, Clone, PartialEq)]
pub struct TocLink {
    /// 相对于包目录的链接目标
    pub href: String,
    pub title: String,
    /// 目录项ID
    pub uid: String,
}

impl TocLink {
    pub fn new(href: &str, title: &str, uid: &str) -> Self {
        Self {
            href: href.to_string(),
            title: title.to_string(),
            uid: uid.to_string(),
        }
    }
}

/// 地标（如封面）
#[derive(Debug, Clone, PartialEq)]
pub struct Landmark {
    pub href: String,
    /// `epub:type` 值
    pub epub_type: String,
    pub title: String,
}

/// 待写入的EPUB书籍
#[derive(Debug, Clone, Default)]
pub struct EpubBook {
    pub metadata: Metadata,
    items: Vec<EpubItem>,
    spine: Vec<String>,
    toc: Vec<TocLink>,
    landmarks: Vec<Landmark>,
    image_count: usize,
    static_count: usize,
}

impl EpubBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置标题，替换已有标题
    pub fn set_title(&mut self, title: &str) {
        self.metadata.set_dublin_core("title", title, Vec::new());
    }

    /// 设置语言，替换已有语言
    pub fn set_language(&mut self, language: &str) {
        self.metadata.set_dublin_core("language", language, Vec::new());
    }

    /// 设置唯一标识符，替换已有标识符
    pub fn set_identifier(&mut self, identifier: &str) {
        self.metadata.set_dublin_core(
            "identifier",
            identifier,
            vec![("id".to_string(), UNIQUE_IDENTIFIER_ID.to_string())],
        );
    }

    /// 书籍语言，未设置时为 `en`
    pub fn language(&self) -> &str {
        self.metadata.language().unwrap_or(DEFAULT_LANGUAGE)
    }

    /// 书籍标题，未设置时为空字符串
    pub fn title(&self) -> &str {
        self.metadata.title().unwrap_or("")
    }

    /// 添加条目，返回其清单ID
    ///
    /// 没有ID的条目按类型分配 `image_<n>` 或 `static_<n>`，没有媒体类型的条目按扩展名推断。
    pub fn add_item(&mut self, mut item: EpubItem) -> String {
        if item.media_type.is_empty() {
            item.media_type = guess_media_type(&item.file_name);
        }

        if item.id.is_empty() {
            item.id = if item.is_image() {
                self.image_count += 1;
                format!("image_{}", self.image_count)
            } else {
                self.static_count += 1;
                format!("static_{}", self.static_count)
            };
        }

        let id = item.id.clone();
        self.items.push(item);
        id
    }

    /// 追加到脊柱
    pub fn add_to_spine(&mut self, id: &str) {
        self.spine.push(id.to_string());
    }

    pub fn add_toc_link(&mut self, link: TocLink) {
        self.toc.push(link);
    }

    pub fn add_landmark(&mut self, href: &str, epub_type: &str, title: &str) {
        self.landmarks.push(Landmark {
            href: href.to_string(),
            epub_type: epub_type.to_string(),
            title: title.to_string(),
        });
    }

    pub fn items(&self) -> &[EpubItem] {
        &self.items
    }

    pub fn get_item(&self, id: &str) -> Option<&EpubItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// 是否已有指定文件名的条目
    pub fn contains_file(&self, file_name: &str) -> bool {
        self.items.iter().any(|item| item.file_name == file_name)
    }

    pub fn spine(&self) -> &[String] {
        &self.spine
    }

    pub fn toc(&self) -> &[TocLink] {
        &self.toc
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    /// NCX条目（如果已加入）
    pub fn ncx_item(&self) -> Option<&EpubItem> {
        self.items
            .iter()
            .find(|item| matches!(item.content, ItemContent::Ncx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_item_assigns_ids_and_media_types() {
        let mut book = EpubBook::new();
        let png = book.add_item(EpubItem::new("images/a.png", vec![1]));
        let font = book.add_item(EpubItem::new("fonts/a.ttf", vec![1]));
        let jpg = book.add_item(EpubItem::new("images/b.jpg", vec![1]));
        let named = book.add_item(EpubItem::new("x.js", vec![1]).with_id("app"));

        assert_eq!(png, "image_1");
        assert_eq!(font, "static_1");
        assert_eq!(jpg, "image_2");
        assert_eq!(named, "app");
        assert_eq!(book.get_item("static_1").unwrap().media_type, "font/ttf");
        assert!(book.contains_file("images/b.jpg"));
    }

    #[test]
    fn test_metadata_setters() {
        let mut book = EpubBook::new();
        assert_eq!(book.language(), "en");
        assert_eq!(book.title(), "");

        book.set_title("标题");
        book.set_title("新标题");
        book.set_language("zh");
        book.set_identifier("urn:uuid:1");

        assert_eq!(book.title(), "新标题");
        assert_eq!(book.language(), "zh");
        assert_eq!(book.metadata.identifier(), Some("urn:uuid:1"));
        assert_eq!(book.metadata.len(), 3);
    }

    #[test]
    fn test_spine_toc_and_landmarks() {
        let mut book = EpubBook::new();
        book.add_item(EpubItem::ncx("toc.ncx"));
        book.add_to_spine("page1");
        book.add_toc_link(TocLink::new("page1.svg", "第一页", "page1"));
        book.add_landmark("page1.svg", "cover", "封面");

        assert_eq!(book.spine(), &["page1".to_string()]);
        assert_eq!(book.toc()[0].title, "第一页");
        assert_eq!(book.landmarks()[0].epub_type, "cover");
        assert_eq!(book.ncx_item().unwrap().id, "ncx");
    }
}
