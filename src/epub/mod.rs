pub mod config;
pub mod container;
pub mod opf;
pub mod item;
pub mod book;
pub mod nav;
pub mod writer;

// 重新导出配置
pub use config::PackageConfig;

// 重新导出容器相关
pub use container::{Container, RootFile};

// 重新导出书籍模型
pub use book::{EpubBook, Landmark, TocLink};
pub use item::{encode_href, guess_media_type, EpubItem, HtmlPage, ItemContent};

// 重新导出OPF相关
pub use opf::{
    Opf,
    Metadata,
    MetadataValue,
    MetaValue,
    ManifestItem,
    SpineItem,
};

// 重新导出写入器
pub use writer::{write_epub, EpubWriter, FOLDER_NAME};
