//! 打包配置模块
//!
//! 提供出版物默认值与压缩参数的配置管理功能，支持从YAML文件加载配置。

use crate::error::{ExportError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 打包配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// 文档元数据中没有语言时使用的语言
    pub language: String,
    /// 文档元数据中没有标题时使用的标题
    pub default_title: String,
    /// `rendition:orientation` 的值
    pub orientation: String,
    /// `rendition:spread` 的值，不设置则不输出
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spread: Option<String>,
    /// 是否额外输出EPUB 2的 `toc.ncx`
    pub write_ncx: bool,
    /// deflate压缩级别（0-9）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_level: Option<i64>,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

impl PackageConfig {
    /// 获取默认配置
    pub fn default_config() -> Self {
        Self {
            language: "en".to_string(),
            default_title: "Publication Title".to_string(),
            orientation: "auto".to_string(),
            spread: None,
            write_ncx: true,
            compression_level: None,
        }
    }

    /// 从YAML文件加载配置，缺失的字段使用默认值
    ///
    /// # 参数
    /// * `path` - 配置文件路径
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ExportError::ConfigError(format!("无法读取配置文件: {}", e)))?;

        serde_yml::from_str(&content)
            .map_err(|e| ExportError::ConfigError(format!("配置文件格式错误: {}", e)))
    }

    /// 生成默认配置文件
    ///
    /// # 参数
    /// * `path` - 要写入的配置文件路径
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let yaml_content = serde_yml::to_string(&Self::default_config())
            .map_err(|e| ExportError::ConfigError(format!("序列化配置失败: {}", e)))?;

        // 在YAML内容前添加注释说明
        let content_with_header = format!(
            "# layerforge 打包配置文件\n# 定义出版物元数据的默认值与压缩参数\n\n{}",
            yaml_content
        );

        fs::write(path.as_ref(), content_with_header)
            .map_err(|e| ExportError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }

    /// 有路径时从文件加载，否则使用默认配置
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default_config()),
        }
    }
}
