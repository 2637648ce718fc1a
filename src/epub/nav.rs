//! 导航文档生成
//!
//! 根据书籍目录生成EPUB 3的 `nav.xhtml` 与EPUB 2的 `toc.ncx`。

use crate::epub::book::EpubBook;
use crate::epub::item::encode_href;
use quick_xml::escape::{escape, partial_escape};

/// 生成EPUB 3导航文档
pub fn render_nav(book: &EpubBook) -> String {
    let lang = escape(book.language());
    let title = partial_escape(book.title());

    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE html>\n");
    xml.push_str(&format!(
        "<html xmlns=\"http://www.w3.org/1999/xhtml\" xmlns:epub=\"http://www.idpf.org/2007/ops\" lang=\"{}\" xml:lang=\"{}\">\n",
        lang, lang
    ));
    xml.push_str(&format!("<head>\n  <title>{}</title>\n</head>\n<body>\n", title));

    xml.push_str("  <nav epub:type=\"toc\" id=\"id\" role=\"doc-toc\">\n");
    xml.push_str(&format!("    <h2>{}</h2>\n    <ol>\n", title));
    for link in book.toc() {
        xml.push_str(&format!(
            "      <li><a href=\"{}\">{}</a></li>\n",
            escape(encode_href(&link.href).as_str()),
            partial_escape(link.title.as_str())
        ));
    }
    xml.push_str("    </ol>\n  </nav>\n");

    if !book.landmarks().is_empty() {
        xml.push_str("  <nav epub:type=\"landmarks\" hidden=\"hidden\">\n    <ol>\n");
        for landmark in book.landmarks() {
            xml.push_str(&format!(
                "      <li><a epub:type=\"{}\" href=\"{}\">{}</a></li>\n",
                escape(landmark.epub_type.as_str()),
                escape(encode_href(&landmark.href).as_str()),
                partial_escape(landmark.title.as_str())
            ));
        }
        xml.push_str("    </ol>\n  </nav>\n");
    }

    xml.push_str("</body>\n</html>\n");
    xml
}

/// 生成EPUB 2 NCX目录
pub fn render_ncx(book: &EpubBook) -> String {
    let uid = escape(book.metadata.identifier().unwrap_or(""));

    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<ncx xmlns=\"http://www.daisy.org/z3986/2005/ncx/\" version=\"2005-1\">\n");
    xml.push_str("  <head>\n");
    xml.push_str(&format!("    <meta name=\"dtb:uid\" content=\"{}\"/>\n", uid));
    xml.push_str("    <meta name=\"dtb:depth\" content=\"1\"/>\n");
    xml.push_str("    <meta name=\"dtb:totalPageCount\" content=\"0\"/>\n");
    xml.push_str("    <meta name=\"dtb:maxPageNumber\" content=\"0\"/>\n");
    xml.push_str("  </head>\n");
    xml.push_str(&format!(
        "  <docTitle>\n    <text>{}</text>\n  </docTitle>\n",
        partial_escape(book.title())
    ));

    xml.push_str("  <navMap>\n");
    for (i, link) in book.toc().iter().enumerate() {
        xml.push_str(&format!(
            "    <navPoint id=\"{}\" playOrder=\"{}\">\n      <navLabel>\n        <text>{}</text>\n      </navLabel>\n      <content src=\"{}\"/>\n    </navPoint>\n",
            escape(link.uid.as_str()),
            i + 1,
            partial_escape(link.title.as_str()),
            escape(encode_href(&link.href).as_str())
        ));
    }
    xml.push_str("  </navMap>\n</ncx>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::book::TocLink;
    use crate::svg::Element;

    fn sample_book() -> EpubBook {
        let mut book = EpubBook::new();
        book.set_title("猫 & 狗");
        book.set_language("zh");
        book.set_identifier("urn:uuid:1234");
        book.add_toc_link(TocLink::new("Cover.svg", "Cover", "layer1"));
        book.add_toc_link(TocLink::new("Page_2.svg", "Page_2", "layer2"));
        book
    }

    #[test]
    fn test_render_nav() {
        let book = sample_book();
        let nav = render_nav(&book);

        assert!(nav.contains("<title>猫 &amp; 狗</title>"));
        assert!(nav.contains(r#"<li><a href="Cover.svg">Cover</a></li>"#));
        assert!(nav.contains(r#"<li><a href="Page_2.svg">Page_2</a></li>"#));
        assert!(!nav.contains("landmarks"));
        assert!(Element::parse(&nav).is_ok());
    }

    #[test]
    fn test_render_nav_with_landmarks() {
        let mut book = sample_book();
        book.add_landmark("Cover.svg", "cover", "Cover");
        let nav = render_nav(&book);

        assert!(nav.contains(r#"<a epub:type="cover" href="Cover.svg">Cover</a>"#));
        assert!(Element::parse(&nav).is_ok());
    }

    #[test]
    fn test_render_ncx() {
        let book = sample_book();
        let ncx = render_ncx(&book);

        assert!(ncx.contains(r#"<meta name="dtb:uid" content="urn:uuid:1234"/>"#));
        assert!(ncx.contains(r#"<navPoint id="layer2" playOrder="2">"#));
        assert!(ncx.contains(r#"<content src="Page_2.svg"/>"#));
        assert!(Element::parse(&ncx).is_ok());
    }
}
