//! 轻量XML树
//!
//! 基于 quick-xml 的命名空间感知读取器构建的可变文档树，只提供导出流程需要的
//! 查询、修改与序列化能力。

use crate::error::{ExportError, Result};
use crate::svg::namespace_for_prefix;
use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

/// 元素属性
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// 原始限定名，如 `xlink:href`
    pub name: String,
    /// 解析后的命名空间URI
    pub namespace: Option<String>,
    /// 反转义后的属性值
    pub value: String,
}

impl Attribute {
    /// 去掉前缀后的本地名
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// 是否为命名空间声明（`xmlns` 或 `xmlns:*`）
    pub fn is_namespace_declaration(&self) -> bool {
        self.name == "xmlns" || self.name.starts_with("xmlns:")
    }

    /// 命名空间声明所绑定的URI（仅对声明属性有意义）
    pub fn declared_prefix(&self) -> Option<&str> {
        if self.name == "xmlns" {
            Some("")
        } else {
            self.name.strip_prefix("xmlns:")
        }
    }
}

/// 树节点
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

/// XML元素
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub namespace: Option<String>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    /// 创建一个没有属性和子节点的元素
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let namespace = name
            .split_once(':')
            .and_then(|(prefix, _)| namespace_for_prefix(prefix))
            .map(str::to_string);
        Self {
            name,
            namespace,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// 解析XML文本，返回根元素
    ///
    /// 序言、DOCTYPE和处理指令会被丢弃，根元素之外的文本也会被忽略。
    pub fn parse(text: &str) -> Result<Element> {
        let text = text.trim_start_matches('\u{feff}');
        let mut reader = NsReader::from_str(text);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<Element> = Vec::new();
        let mut root = None;

        loop {
            let (resolved, event) = reader.read_resolved_event()?;
            let namespace = owned_namespace(resolved);

            match event {
                Event::Start(ref e) => {
                    let element = Self::from_start(&reader, namespace, e)?;
                    stack.push(element);
                }
                Event::Empty(ref e) => {
                    let element = Self::from_start(&reader, namespace, e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| ExportError::InvalidSvg("多余的结束标签".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(ref e) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = e.unescape().map_err(ExportError::svg)?;
                        parent.children.push(Node::Text(text.into_owned()));
                    }
                }
                Event::CData(e) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                        parent.children.push(Node::CData(text));
                    }
                }
                Event::Comment(ref e) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                        parent.children.push(Node::Comment(text));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(ExportError::InvalidSvg(format!(
                "元素 <{}> 没有闭合",
                stack[stack.len() - 1].name
            )));
        }

        root.ok_or_else(|| ExportError::InvalidSvg("文档中没有根元素".to_string()))
    }

    fn from_start(
        reader: &NsReader<&[u8]>,
        namespace: Option<String>,
        start: &BytesStart,
    ) -> Result<Element> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();

        for attr_result in start.attributes() {
            let attr = attr_result.map_err(|e| ExportError::XmlError(quick_xml::Error::InvalidAttr(e)))?;
            let (resolved, _) = reader.resolve_attribute(attr.key);
            let namespace = owned_namespace(resolved);
            let value = attr.unescape_value().map_err(ExportError::svg)?.into_owned();
            attributes.push(Attribute {
                name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                namespace,
                value,
            });
        }

        Ok(Element {
            name,
            namespace,
            attributes,
            children: Vec::new(),
        })
    }

    /// 去掉前缀后的本地名
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// 判断元素是否为指定命名空间下的指定本地名
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local_name() == local_name
    }

    /// 按原始限定名获取属性值
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// 按命名空间和本地名获取属性值
    pub fn attr_ns(&self, namespace: &str, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.as_deref() == Some(namespace) && a.local_name() == local_name)
            .map(|a| a.value.as_str())
    }

    /// 按原始限定名设置属性，不存在时追加
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(attr) = self.attributes.iter_mut().find(|a| a.name == name) {
            attr.value = value;
            return;
        }
        let namespace = name
            .split_once(':')
            .and_then(|(prefix, _)| namespace_for_prefix(prefix))
            .map(str::to_string);
        self.attributes.push(Attribute {
            name: name.to_string(),
            namespace,
            value,
        });
    }

    /// 按命名空间设置属性；不存在时以 `prefix:local_name` 追加
    pub fn set_attr_ns(&mut self, namespace: &str, prefix: &str, local_name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(attr) = self
            .attributes
            .iter_mut()
            .find(|a| a.namespace.as_deref() == Some(namespace) && a.local_name() == local_name)
        {
            attr.value = value;
            return;
        }
        self.attributes.push(Attribute {
            name: format!("{}:{}", prefix, local_name),
            namespace: Some(namespace.to_string()),
            value,
        });
    }

    /// 移除属性，返回旧值
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|a| a.name == name)?;
        Some(self.attributes.remove(pos).value)
    }

    /// 元素本身声明的命名空间
    pub fn namespace_declarations(&self) -> Vec<Attribute> {
        self.attributes
            .iter()
            .filter(|a| a.is_namespace_declaration())
            .cloned()
            .collect()
    }

    /// 直接子元素
    pub fn element_children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// 直接子元素（可变）
    pub fn element_children_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// 第一个匹配的直接子元素
    pub fn find_child(&self, namespace: &str, local_name: &str) -> Option<&Element> {
        self.element_children().find(|e| e.is(namespace, local_name))
    }

    /// 以先序遍历返回子树中的所有元素（包括自身）
    pub fn descendants(&self) -> Vec<&Element> {
        let mut result = Vec::new();
        let mut stack = vec![self];
        while let Some(element) = stack.pop() {
            result.push(element);
            let children: Vec<&Element> = element.element_children().collect();
            stack.extend(children.into_iter().rev());
        }
        result
    }

    /// 以先序遍历访问子树中的每个元素（包括自身）
    pub fn visit_mut<F: FnMut(&mut Element)>(&mut self, f: &mut F) {
        f(self);
        for child in self.element_children_mut() {
            child.visit_mut(f);
        }
    }

    /// 递归保留满足条件的子元素
    pub fn retain_elements<F: FnMut(&Element) -> bool>(&mut self, keep: &mut F) {
        self.children.retain(|node| match node {
            Node::Element(e) => keep(e),
            _ => true,
        });
        for child in self.element_children_mut() {
            child.retain_elements(keep);
        }
    }

    /// 子树中所有文本（含CDATA）按顺序拼接
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// 子树中去除首尾空白后的非空文本片段
    pub fn text_segments(&self) -> Vec<String> {
        let mut segments = Vec::new();
        collect_segments(self, &mut segments);
        segments
    }

    /// 序列化为XML字符串（不含XML声明）
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out, &[]);
        out
    }

    /// 序列化为XML片段，并在根元素上补充继承来的命名空间声明
    ///
    /// 已在元素自身声明过的前缀不会重复输出。
    pub fn to_fragment(&self, inherited: &[Attribute]) -> String {
        let mut out = String::new();
        self.write_xml(&mut out, inherited);
        out
    }

    fn write_xml(&self, out: &mut String, inherited: &[Attribute]) {
        out.push('<');
        out.push_str(&self.name);

        for decl in inherited {
            if decl.is_namespace_declaration() && self.attr(&decl.name).is_none() {
                push_attribute(out, &decl.name, &decl.value);
            }
        }
        for attr in &self.attributes {
            push_attribute(out, &attr.name, &attr.value);
        }

        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');

        for child in &self.children {
            match child {
                Node::Element(e) => e.write_xml(out, &[]),
                Node::Text(t) => out.push_str(&partial_escape(t.as_str())),
                Node::CData(t) => {
                    out.push_str("<![CDATA[");
                    out.push_str(&t.replace("]]>", "]]]]><![CDATA[>"));
                    out.push_str("]]>");
                }
                Node::Comment(t) => {
                    out.push_str("<!--");
                    out.push_str(t);
                    out.push_str("-->");
                }
            }
        }

        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

fn push_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push('"');
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(Node::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(ExportError::InvalidSvg("文档包含多个根元素".to_string())),
    }
}

fn owned_namespace(resolved: ResolveResult) -> Option<String> {
    match resolved {
        ResolveResult::Bound(Namespace(ns)) => Some(String::from_utf8_lossy(ns).into_owned()),
        _ => None,
    }
}

fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

fn collect_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Node::Text(t) | Node::CData(t) => out.push_str(t),
            Node::Element(e) => collect_text(e, out),
            Node::Comment(_) => {}
        }
    }
}

fn collect_segments(element: &Element, segments: &mut Vec<String>) {
    for child in &element.children {
        match child {
            Node::Text(t) | Node::CData(t) => {
                let trimmed = t.trim();
                if !trimmed.is_empty() {
                    segments.push(trimmed.to_string());
                }
            }
            Node::Element(e) => collect_segments(e, segments),
            Node::Comment(_) => {}
        }
    }
}
