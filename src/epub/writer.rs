//! EPUB写入器
//!
//! 把 `EpubBook` 写为ZIP压缩包：`mimetype` 必须是第一个条目且不压缩，随后是
//! `META-INF/container.xml`、OPF包文件以及各条目。

use crate::epub::book::EpubBook;
use crate::epub::container::Container;
use crate::epub::item::ItemContent;
use crate::epub::nav::{render_nav, render_ncx};
use crate::epub::opf::{ManifestItem, Opf, SpineItem};
use crate::error::Result;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// 包目录名
pub const FOLDER_NAME: &str = "EPUB";

/// 默认deflate压缩级别
const DEFAULT_COMPRESSION_LEVEL: i64 = 6;

/// EPUB写入器
pub struct EpubWriter<'a> {
    book: &'a EpubBook,
    compression_level: i64,
}

impl<'a> EpubWriter<'a> {
    pub fn new(book: &'a EpubBook) -> Self {
        Self {
            book,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }

    /// 指定压缩级别（0-9），超出范围时截断
    pub fn with_compression_level(mut self, level: Option<i64>) -> Self {
        self.compression_level = level.unwrap_or(DEFAULT_COMPRESSION_LEVEL).clamp(0, 9);
        self
    }

    /// 写入到文件
    ///
    /// # 参数
    /// * `path` - 输出的EPUB文件路径
    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write(file)?;
        Ok(())
    }

    /// 写入到任意可定位的输出，返回底层写入器
    pub fn write<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let mut zip = ZipWriter::new(writer);

        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(self.compression_level));

        zip.start_file("mimetype", stored)?;
        zip.write_all(b"application/epub+zip")?;

        let opf_path = format!("{}/content.opf", FOLDER_NAME);
        zip.start_file("META-INF/container.xml", deflated)?;
        zip.write_all(Container::new(&opf_path).to_xml().as_bytes())?;

        zip.start_file(opf_path.as_str(), deflated)?;
        zip.write_all(self.build_opf().to_xml().as_bytes())?;

        self.write_items(&mut zip, deflated)?;

        Ok(zip.finish()?)
    }

    /// 写入条目
    ///
    /// `create` 为false的条目不写入；列入清单的条目写入包目录，其余原样写入压缩包根目录。
    fn write_items<W: Write + Seek>(&self, zip: &mut ZipWriter<W>, options: SimpleFileOptions) -> Result<()> {
        let language = self.book.language();

        for item in self.book.items() {
            if !item.create {
                continue;
            }

            let content = match &item.content {
                ItemContent::Nav => render_nav(self.book).into_bytes(),
                ItemContent::Ncx => render_ncx(self.book).into_bytes(),
                _ => item.get_content(language).unwrap_or_default(),
            };

            let path = if item.manifest {
                format!("{}/{}", FOLDER_NAME, item.file_name)
            } else {
                item.file_name.clone()
            };

            zip.start_file(path.as_str(), options)?;
            zip.write_all(&content)?;
        }

        Ok(())
    }

    /// 根据书籍生成OPF
    pub fn build_opf(&self) -> Opf {
        let mut opf = Opf::new(self.book.metadata.clone());

        for item in self.book.items().iter().filter(|item| item.manifest) {
            opf.manifest.push(ManifestItem::with_properties(
                item.id.clone(),
                item.file_name.clone(),
                item.media_type.clone(),
                &item.properties,
            ));
        }

        for id in self.book.spine() {
            let linear = self.book.get_item(id).map(|item| item.linear).unwrap_or(true);
            opf.spine.push(SpineItem::with_linear(id.clone(), linear));
        }

        opf.spine_toc = self.book.ncx_item().map(|item| item.id.clone());
        opf
    }
}

/// 把书籍写入文件
pub fn write_epub<P: AsRef<Path>>(path: P, book: &EpubBook, compression_level: Option<i64>) -> Result<()> {
    EpubWriter::new(book)
        .with_compression_level(compression_level)
        .write_to_path(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::item::EpubItem;
    use crate::epub::book::TocLink;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn sample_book() -> EpubBook {
        let mut book = EpubBook::new();
        book.set_identifier("urn:uuid:test");
        book.set_title("测试书籍");
        book.set_language("zh");

        let page = EpubItem::svg_document("page1", "page1.svg", "<svg xmlns=\"http://www.w3.org/2000/svg\"/>".to_string());
        book.add_item(page);
        book.add_to_spine("page1");
        book.add_toc_link(TocLink::new("page1.svg", "page1", "page1"));

        book.add_item(EpubItem::new("images/a.png", vec![0x89, b'P', b'N', b'G']));

        let mut raw = EpubItem::new("META-INF/com.apple.ibooks.display-options.xml", b"<display_options/>".to_vec());
        raw.manifest = false;
        book.add_item(raw);

        let mut listed_only = EpubItem::new("images/remote.png", Vec::new());
        listed_only.create = false;
        book.add_item(listed_only);

        book.add_item(EpubItem::nav("nav.xhtml"));
        book.add_item(EpubItem::ncx("toc.ncx"));
        book
    }

    fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_mimetype_first_and_stored() {
        let book = sample_book();
        let cursor = EpubWriter::new(&book).write(Cursor::new(Vec::new())).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();

        let first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), CompressionMethod::Stored);
        drop(first);

        assert_eq!(read_entry(&mut archive, "mimetype"), "application/epub+zip");
        assert!(read_entry(&mut archive, "META-INF/container.xml").contains("EPUB/content.opf"));
    }

    #[test]
    fn test_manifest_and_raw_items() {
        let book = sample_book();
        let cursor = EpubWriter::new(&book).write(Cursor::new(Vec::new())).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();

        let names: Vec<String> = archive.file_names().map(|n| n.to_string()).collect();
        assert!(names.contains(&"EPUB/page1.svg".to_string()));
        assert!(names.contains(&"EPUB/images/a.png".to_string()));
        assert!(names.contains(&"META-INF/com.apple.ibooks.display-options.xml".to_string()));
        assert!(names.contains(&"EPUB/nav.xhtml".to_string()));
        assert!(names.contains(&"EPUB/toc.ncx".to_string()));
        // create为false的条目不写入
        assert!(!names.iter().any(|n| n.ends_with("remote.png")));

        let opf = read_entry(&mut archive, "EPUB/content.opf");
        assert!(opf.contains(r#"<item id="page1" href="page1.svg" media-type="image/svg+xml"/>"#));
        assert!(opf.contains(r#"href="images/remote.png""#));
        assert!(!opf.contains("display-options"));
        assert!(opf.contains(r#"<spine toc="ncx">"#));
        assert!(opf.contains(r#"<itemref idref="page1"/>"#));
        assert!(opf.contains(r#"properties="nav""#));

        let nav = read_entry(&mut archive, "EPUB/nav.xhtml");
        assert!(nav.contains(r#"<a href="page1.svg">page1</a>"#));
    }

    #[test]
    fn test_write_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.epub");
        let book = sample_book();
        write_epub(&path, &book, Some(12)).unwrap();

        let file = File::open(&path).unwrap();
        let archive = ZipArchive::new(file).unwrap();
        assert!(archive.len() >= 7);
    }

    #[test]
    fn test_spine_without_ncx() {
        let mut book = EpubBook::new();
        book.add_item(EpubItem::svg_document("p", "p.svg", "<svg/>".to_string()));
        book.add_to_spine("p");

        let opf = EpubWriter::new(&book).build_opf();
        assert!(opf.spine_toc.is_none());
        assert_eq!(opf.spine.len(), 1);
        assert!(opf.to_xml().contains("  <spine>\n"));
    }
}
