//! OPF（Open Packaging Format）文件生成模块
//!
//! 此模块提供EPUB包文件中元数据、清单、脊柱的结构定义与输出。

mod metadata;
mod manifest;
mod spine;
mod package;

// 重新导出公共类型以保持API兼容性
pub use metadata::{
    Metadata,
    MetadataValue,
    MetaValue
};
pub use manifest::ManifestItem;
pub use spine::SpineItem;
pub use package::{Opf, UNIQUE_IDENTIFIER_ID};
