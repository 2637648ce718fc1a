//! 资源文件定位
//!
//! 资源文件夹位于项目根目录之下，其中的所有文件都会原样加入EPUB，文件在包内的路径即其相对于
//! 项目根目录的路径。

use crate::epub::{EpubBook, EpubItem};
use log::warn;
use std::fs;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

/// 远程脚本的请求超时
pub const REMOTE_TIMEOUT: Duration = Duration::from_secs(15);

/// 项目根目录与资源文件夹
#[derive(Debug, Clone)]
pub struct ResourceLocator {
    root_folder: PathBuf,
    resources_path: PathBuf,
}

impl ResourceLocator {
    /// # 参数
    /// * `root_folder` - 项目根目录，为空时使用当前目录
    /// * `resources_folder` - 相对于根目录的资源文件夹
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(root_folder: P, resources_folder: Q) -> Self {
        let root = root_folder.as_ref();
        let root = if root.as_os_str().is_empty() {
            Path::new(".")
        } else {
            root
        };
        let root_folder = canonical(root);
        let resources_path = canonical(&root_folder.join(resources_folder.as_ref()));
        Self {
            root_folder,
            resources_path,
        }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn resources_path(&self) -> &Path {
        &self.resources_path
    }

    /// 递归地把资源文件夹中的文件加入书籍，返回加入的文件数
    ///
    /// 空文件与无法读取的文件会被报告并跳过。
    pub fn add_resources(&self, book: &mut EpubBook) -> usize {
        if !self.resources_path.is_dir() {
            warn!("\"{}\" 不是文件夹", self.resources_path.display());
            return 0;
        }

        let mut added = 0;
        let walker = WalkDir::new(&self.resources_path).sort_by_file_name();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("无法遍历资源文件夹: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            let content = match fs::read(entry.path()) {
                Ok(content) if !content.is_empty() => content,
                Ok(_) => {
                    warn!("\"{}\" 是空文件", name);
                    continue;
                }
                Err(e) => {
                    warn!("无法读取资源文件 \"{}\": {}", entry.path().display(), e);
                    continue;
                }
            };

            match self.relative_resource_path(entry.path()) {
                Some(rel_path) => {
                    book.add_item(EpubItem::new(rel_path, content));
                    added += 1;
                }
                None => warn!("资源文件 \"{}\" 不在项目根目录中", entry.path().display()),
            }
        }

        added
    }

    /// 文件相对于项目根目录的路径，使用 `/` 分隔
    pub fn relative_resource_path(&self, path: &Path) -> Option<String> {
        let path = canonical(path);
        let rel = path.strip_prefix(&self.root_folder).ok()?;
        let parts: Vec<String> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("/"))
        }
    }

    /// 文件是否位于资源文件夹中
    pub fn is_in_resources(&self, path: &Path) -> bool {
        canonical(path).starts_with(&self.resources_path)
    }

    /// 在资源文件夹中模糊查找文件
    ///
    /// 返回按文件名排序遍历时第一个文件名包含 `name`、且其后还带扩展名的文件。
    pub fn find_file_fuzzy(&self, name: &str) -> Option<PathBuf> {
        find_file_fuzzy(name, &self.resources_path)
    }

    /// 读取本地文件或 `http`/`https` 地址的内容
    ///
    /// 相对路径以项目根目录为基准；读取失败或内容为空时返回 `None` 并报告原因。
    pub fn read_file(&self, location: &str) -> Option<Vec<u8>> {
        let content = if is_remote(location) {
            match fetch_remote(location, REMOTE_TIMEOUT) {
                Ok(content) => content,
                Err(e) => {
                    warn!("{}", e);
                    return None;
                }
            }
        } else {
            let path = Path::new(location);
            let path = if path.is_relative() {
                self.root_folder.join(path)
            } else {
                path.to_path_buf()
            };
            match fs::read(&path) {
                Ok(content) => content,
                Err(e) => {
                    warn!("无法读取文件 \"{}\": {}", path.display(), e);
                    return None;
                }
            }
        };

        if content.is_empty() {
            warn!("\"{}\" 是空文件", location);
            None
        } else {
            Some(content)
        }
    }
}

/// 在目录中模糊查找文件，见 [`ResourceLocator::find_file_fuzzy`]
pub fn find_file_fuzzy(name: &str, folder: &Path) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }

    WalkDir::new(folder)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .find(|entry| {
            let file_name = entry.file_name().to_string_lossy();
            match file_name.find(name) {
                Some(pos) => file_name[pos + name.len()..].contains('.'),
                None => false,
            }
        })
        .map(|entry| entry.into_path())
}

/// 是否为 `http`/`https` 地址
pub fn is_remote(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn fetch_remote(url: &str, timeout: Duration) -> crate::error::Result<Vec<u8>> {
    let remote_error = |reason: String| crate::error::ExportError::Remote {
        url: url.to_string(),
        reason,
    };

    let agent = ureq::AgentBuilder::new().timeout(timeout).build();
    let response = agent.get(url).call().map_err(|e| remote_error(e.to_string()))?;
    let mut content = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut content)
        .map_err(|e| remote_error(e.to_string()))?;
    Ok(content)
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn project() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        let resources = dir.path().join("resources");
        fs::create_dir_all(resources.join("fonts")).unwrap();
        fs::create_dir_all(resources.join("images")).unwrap();
        fs::write(resources.join("fonts").join("Open+Sans-Regular.ttf"), b"font").unwrap();
        fs::write(resources.join("fonts").join("Arial"), b"no extension").unwrap();
        fs::write(resources.join("images").join("cat.png"), b"\x89PNG....").unwrap();
        fs::write(resources.join("images").join("empty.png"), b"").unwrap();
        dir
    }

    #[test]
    fn test_add_resources_recursively() {
        let dir = project();
        let locator = ResourceLocator::new(dir.path(), "resources");
        let mut book = EpubBook::new();

        let added = locator.add_resources(&mut book);
        assert_eq!(added, 3);

        let names: Vec<&str> = book.items().iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "resources/fonts/Arial",
                "resources/fonts/Open+Sans-Regular.ttf",
                "resources/images/cat.png",
            ]
        );
        assert_eq!(book.items()[2].media_type, "image/png");
    }

    #[test]
    fn test_missing_resources_folder() {
        let dir = tempdir().unwrap();
        let locator = ResourceLocator::new(dir.path(), "missing");
        let mut book = EpubBook::new();
        assert_eq!(locator.add_resources(&mut book), 0);
        assert!(book.items().is_empty());
    }

    #[test]
    fn test_relative_resource_path() {
        let dir = project();
        let locator = ResourceLocator::new(dir.path(), "resources");
        let path = dir.path().join("resources").join("images").join("cat.png");

        assert_eq!(
            locator.relative_resource_path(&path),
            Some("resources/images/cat.png".to_string())
        );
        assert!(locator.is_in_resources(&path));
        assert!(!locator.is_in_resources(Path::new("/etc/hosts")));
    }

    #[test]
    fn test_find_file_fuzzy() {
        let dir = project();
        let locator = ResourceLocator::new(dir.path(), "resources");

        let found = locator.find_file_fuzzy("Open+Sans").unwrap();
        assert!(found.ends_with("Open+Sans-Regular.ttf"));
        // 没有扩展名的文件不匹配
        assert!(locator.find_file_fuzzy("Arial").is_none());
        assert!(locator.find_file_fuzzy("Helvetica").is_none());
        assert!(locator.find_file_fuzzy("").is_none());
    }

    #[test]
    fn test_read_file() {
        let dir = project();
        let locator = ResourceLocator::new(dir.path(), "resources");

        assert_eq!(
            locator.read_file("resources/fonts/Open+Sans-Regular.ttf"),
            Some(b"font".to_vec())
        );
        assert!(locator.read_file("resources/images/empty.png").is_none());
        assert!(locator.read_file("resources/none.js").is_none());
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/a.js"));
        assert!(is_remote("HTTP://example.com/a.js"));
        assert!(!is_remote("scripts/a.js"));
    }

    #[test]
    fn test_fetch_remote_times_out() {
        // 只监听不应答的服务器
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/app.js", listener.local_addr().unwrap());

        let started = std::time::Instant::now();
        let result = fetch_remote(&url, Duration::from_millis(300));
        assert!(matches!(result, Err(crate::error::ExportError::Remote { .. })));
        assert!(started.elapsed() < Duration::from_secs(10));
        drop(listener);
    }
}
