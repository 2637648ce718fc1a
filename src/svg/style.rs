//! 内联样式
//!
//! 用 `simplecss` 把 `style` 属性切分为声明，保持声明顺序。注释会被跳过，引号中的 `;`
//! 不会截断声明。

use std::fmt;

/// 一条样式声明
#[derive(Debug, Clone, PartialEq)]
struct Declaration {
    name: String,
    value: String,
    important: bool,
}

/// 有序的内联样式声明
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    declarations: Vec<Declaration>,
}

impl Style {
    /// 解析 `style` 属性值，遇到无法解析的声明时停止
    pub fn parse(value: &str) -> Self {
        let declarations = simplecss::DeclarationTokenizer::from(value)
            .filter(|decl| !decl.name.is_empty())
            .map(|decl| Declaration {
                name: decl.name.to_string(),
                value: decl.value.trim().to_string(),
                important: decl.important,
            })
            .collect();
        Self { declarations }
    }

    /// 获取声明值，同名声明以最后一个为准
    pub fn get(&self, name: &str) -> Option<&str> {
        self.declarations
            .iter()
            .rev()
            .find(|decl| decl.name == name)
            .map(|decl| decl.value.as_str())
    }

    /// 设置声明值，保留原有的 `!important`
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.declarations.iter_mut().rev().find(|decl| decl.name == name) {
            Some(decl) => decl.value = value,
            None => self.declarations.push(Declaration {
                name: name.to_string(),
                value,
                important: false,
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// `display` 是否为 `none`
    pub fn is_hidden(&self) -> bool {
        self.get("display")
            .is_some_and(|display| display.eq_ignore_ascii_case("none"))
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, decl) in self.declarations.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{}:{}", decl.name, decl.value)?;
            if decl.important {
                f.write_str(" !important")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_get() {
        let style = Style::parse("fill:#000; font-family:'Open Sans' ;display: none;");
        assert_eq!(style.get("fill"), Some("#000"));
        assert_eq!(style.get("font-family"), Some("'Open Sans'"));
        assert!(style.is_hidden());
        assert_eq!(style.get("stroke"), None);
    }

    #[test]
    fn test_quoted_semicolon() {
        let style = Style::parse("font-family:'Noto; Sans';fill:red");
        assert_eq!(style.get("font-family"), Some("'Noto; Sans'"));
        assert_eq!(style.get("fill"), Some("red"));
    }

    #[test]
    fn test_comments_and_important() {
        assert!(Style::parse("/*x*/display:none").is_hidden());

        let style = Style::parse("display:none !important;fill:red");
        assert!(style.is_hidden());
        assert_eq!(style.to_string(), "display:none !important;fill:red");
    }

    #[test]
    fn test_set_keeps_order() {
        let mut style = Style::parse("font-family:Arial;fill:red");
        style.set("font-family", "Open+Sans");
        style.set("stroke", "none");
        assert_eq!(style.to_string(), "font-family:Open+Sans;fill:red;stroke:none");
    }

    #[test]
    fn test_empty_and_garbage() {
        assert!(Style::parse("").is_empty());
        assert!(Style::parse(";;:x;").is_empty());
        assert!(!Style::parse("display:inline").is_hidden());
    }
}
