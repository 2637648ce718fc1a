//! 图片处理
//!
//! 把图层中 `<image>` 的链接改写为相对于项目根目录的路径，或者在需要时嵌入为 `data:` URI。

use crate::epub::encode_href;
use crate::export::resources::ResourceLocator;
use crate::svg::{Element, SODIPODI_NS, SVG_NS, XLINK_NS};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::{error, warn};
use percent_encoding::percent_decode_str;
use std::fs;
use std::path::{Path, PathBuf};

/// 文件头魔数与媒体类型
const MAGIC_HEADERS: [(&[u8], &str); 7] = [
    (b"\x89PNG", "image/png"),
    (b"\xff\xd8", "image/jpeg"),
    (b"BM", "image/bmp"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"MM\x00\x2a", "image/tiff"),
    (b"II\x2a\x00", "image/tiff"),
];

/// 没有魔数的格式按扩展名判断
const EXTENSION_TYPES: [(&str, &str); 2] = [(".ico", "image/x-icon"), (".svg", "image/svg+xml")];

/// 根据文件头（前10个字节即可）和路径判断图片媒体类型
pub fn image_type(path: &str, header: &[u8]) -> Option<&'static str> {
    MAGIC_HEADERS
        .iter()
        .find(|(magic, _)| header.starts_with(magic))
        .map(|(_, mime)| *mime)
        .or_else(|| {
            EXTENSION_TYPES
                .iter()
                .find(|(ext, _)| path.ends_with(ext))
                .map(|(_, mime)| *mime)
        })
}

/// 图片链接改写器
pub struct ImageRewriter<'a> {
    locator: &'a ResourceLocator,
    base_dir: Option<&'a Path>,
    embed: bool,
}

impl<'a> ImageRewriter<'a> {
    /// # 参数
    /// * `locator` - 项目资源定位
    /// * `base_dir` - 解析相对链接的基准目录
    /// * `embed` - 为true时把图片嵌入为 `data:` URI
    pub fn new(locator: &'a ResourceLocator, base_dir: Option<&'a Path>, embed: bool) -> Self {
        Self {
            locator,
            base_dir,
            embed,
        }
    }

    /// 处理子树中的所有 `<image>`，返回改写的数量
    pub fn rewrite(&self, element: &mut Element) -> usize {
        let mut rewritten = 0;
        element.visit_mut(&mut |e| {
            if e.is(SVG_NS, "image") && self.rewrite_image(e) {
                rewritten += 1;
            }
        });
        rewritten
    }

    fn rewrite_image(&self, image: &mut Element) -> bool {
        let href = image
            .attr_ns(XLINK_NS, "href")
            .or_else(|| image.attr("href"))
            .unwrap_or("")
            .to_string();

        if href.is_empty() {
            warn!("图片没有有效的链接: {:?}", image.attr("id").unwrap_or(""));
            return false;
        }
        if href.starts_with("data:") {
            return false;
        }

        let path = match self.locate(image, &href) {
            Some(path) => path,
            None => {
                error!("找不到文件 \"{}\"，无法保存并添加图片", href);
                return false;
            }
        };
        let path_str = path.to_string_lossy().into_owned();

        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) => {
                error!("无法读取图片 \"{}\": {}", path_str, e);
                return false;
            }
        };
        let header = &content[..content.len().min(10)];

        if self.embed {
            return match image_type(&path_str, header) {
                Some(mime) => {
                    let uri = format!("data:{};base64,{}", mime, STANDARD.encode(&content));
                    set_href(image, uri);
                    image.remove_attr("sodipodi:absref");
                    true
                }
                None => {
                    report_unknown_type(&path_str);
                    false
                }
            };
        }

        if !self.locator.is_in_resources(&path) {
            warn!("图片 \"{}\" 不在资源文件夹中，已跳过", path_str);
            return false;
        }
        let file_name = match self.locator.relative_resource_path(&path) {
            Some(file_name) => file_name,
            None => return false,
        };

        match image_type(&path_str, header) {
            Some(_) => {
                // absref 只在已存在时更新
                if image.attr_ns(SODIPODI_NS, "absref").is_some() {
                    image.set_attr_ns(SODIPODI_NS, "sodipodi", "absref", file_name.as_str());
                }
                set_href(image, encode_href(&file_name));
                true
            }
            None => {
                report_unknown_type(&path_str);
                false
            }
        }
    }

    /// 解析链接对应的本地文件，找不到时退回 `sodipodi:absref`
    fn locate(&self, image: &Element, href: &str) -> Option<PathBuf> {
        let primary = self.absolute_href(&href_to_path(href));
        if primary.is_file() {
            return Some(primary);
        }

        image
            .attr_ns(SODIPODI_NS, "absref")
            .map(PathBuf::from)
            .filter(|p| p.is_file())
    }

    fn absolute_href(&self, href: &str) -> PathBuf {
        let path = Path::new(href);
        match self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// 把链接转换为本地路径：去掉 `file://` 前缀、查询与片段，并做百分号解码
fn href_to_path(href: &str) -> String {
    let path = href
        .strip_prefix("file://localhost")
        .or_else(|| href.strip_prefix("file://"))
        .unwrap_or(href);
    let path = path.split(['?', '#']).next().unwrap_or(path);
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}

/// 写回链接：原来用的是 `xlink:href` 就改 `xlink:href`，否则改 `href`
fn set_href(image: &mut Element, value: String) {
    if image.attr_ns(XLINK_NS, "href").is_none() && image.attr("href").is_some() {
        image.set_attr("href", value);
    } else {
        image.set_attr_ns(XLINK_NS, "xlink", "href", value);
    }
}

fn report_unknown_type(path: &str) {
    error!(
        "{} 不是 image/png、image/jpeg、image/bmp、image/gif、image/tiff 或 image/x-icon 类型",
        path
    );
}
