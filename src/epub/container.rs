use quick_xml::escape::escape;

/// OPF包文件的媒体类型
pub const OPF_MEDIA_TYPE: &str = "application/oebps-package+xml";

/// Container.xml中的rootfile信息
#[derive(Debug, Clone)]
pub struct RootFile {
    pub full_path: String,
    pub media_type: String,
}

/// META-INF/container.xml
#[derive(Debug, Clone)]
pub struct Container {
    pub rootfiles: Vec<RootFile>,
}

impl Container {
    /// 创建只包含一个OPF包文件的Container
    ///
    /// # 参数
    /// * `opf_path` - OPF文件在压缩包中的完整路径
    pub fn new(opf_path: &str) -> Self {
        Self {
            rootfiles: vec![RootFile {
                full_path: opf_path.to_string(),
                media_type: OPF_MEDIA_TYPE.to_string(),
            }],
        }
    }

    /// 输出container.xml内容
    pub fn to_xml(&self) -> String {
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<container version=\"1.0\" xmlns=\"urn:oasis:names:tc:opendocument:xmlns:container\">\n  <rootfiles>\n",
        );
        for rootfile in &self.rootfiles {
            xml.push_str(&format!(
                "    <rootfile full-path=\"{}\" media-type=\"{}\"/>\n",
                escape(rootfile.full_path.as_str()),
                escape(rootfile.media_type.as_str())
            ));
        }
        xml.push_str("  </rootfiles>\n</container>\n");
        xml
    }
}
