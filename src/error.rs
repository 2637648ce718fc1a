use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExportError>;

/// 导出过程中的错误类型
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO错误: {0}")]
    Io(#[from] io::Error),

    #[error("Zip文件错误: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML解析错误: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("无效的SVG文档: {0}")]
    InvalidSvg(String),

    #[error("无法获取远程资源 {url}: {reason}")]
    Remote { url: String, reason: String },

    #[error("配置文件错误: {0}")]
    ConfigError(String),
}

impl ExportError {
    /// 把任意可显示的解析错误包装为 `InvalidSvg`
    pub(crate) fn svg<E: std::fmt::Display>(err: E) -> Self {
        ExportError::InvalidSvg(err.to_string())
    }
}
