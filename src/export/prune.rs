//! 内容文档清理
//!
//! 只做两件事：去掉编辑器私有数据，删除没有被引用的 `<defs>` 子元素。

use crate::svg::{is_editor_namespace, Attribute, Element, Node, SVG_NS};
use std::collections::HashSet;

/// 清理生成的内容文档
pub fn prune(root: &mut Element) {
    strip_editor_data(root);
    remove_unreferenced_defs(root);
}

/// 删除 `sodipodi:`/`inkscape:` 元素、属性以及对应的命名空间声明
pub fn strip_editor_data(root: &mut Element) {
    root.retain_elements(&mut |e| !e.namespace.as_deref().is_some_and(is_editor_namespace));
    root.visit_mut(&mut |e| {
        e.attributes.retain(|attr| {
            if attr.is_namespace_declaration() {
                !is_editor_namespace(&attr.value)
            } else {
                !attr.namespace.as_deref().is_some_and(is_editor_namespace) && !has_unbound_editor_prefix(attr)
            }
        });
    });
}

/// 前缀是 `sodipodi`/`inkscape` 但没有绑定命名空间的属性
fn has_unbound_editor_prefix(attr: &Attribute) -> bool {
    attr.namespace.is_none()
        && matches!(attr.name.split_once(':'), Some(("sodipodi" | "inkscape", _)))
}

/// 删除没有被引用的 `<defs>` 子元素，返回删除的数量
///
/// 引用包括属性与 `<style>` 中的 `url(#id)` 以及以 `#` 开头的链接，被引用的定义所引用的
/// 定义同样保留。子树中没有任何 `id` 的定义总是保留。
pub fn remove_unreferenced_defs(root: &mut Element) -> usize {
    let referenced = referenced_ids(root);

    let mut removed = 0;
    root.visit_mut(&mut |e| {
        if !e.is(SVG_NS, "defs") {
            return;
        }
        let before = e.children.len();
        e.children.retain(|node| match node {
            Node::Element(child) => {
                let ids = subtree_ids(child);
                ids.is_empty() || !ids.is_disjoint(&referenced)
            }
            _ => true,
        });
        removed += before - e.children.len();
    });
    removed
}

/// 一个候选定义：子树中的 `id` 以及它引用的 `id`
struct Definition {
    ids: HashSet<String>,
    references: HashSet<String>,
}

fn referenced_ids(root: &Element) -> HashSet<String> {
    let mut referenced = HashSet::new();
    collect_outside_defs(root, &mut referenced);

    let definitions: Vec<Definition> = root
        .descendants()
        .into_iter()
        .filter(|e| e.is(SVG_NS, "defs"))
        .flat_map(|defs| defs.element_children())
        .map(|child| {
            let mut references = HashSet::new();
            for e in child.descendants() {
                element_references(e, &mut references);
            }
            Definition {
                ids: subtree_ids(child),
                references,
            }
        })
        .collect();

    loop {
        let mut changed = false;
        for definition in &definitions {
            let kept = definition.ids.is_empty() || !definition.ids.is_disjoint(&referenced);
            if !kept {
                continue;
            }
            for reference in &definition.references {
                changed |= referenced.insert(reference.clone());
            }
        }
        if !changed {
            break;
        }
    }

    referenced
}

/// 收集 `<defs>` 之外的所有引用
fn collect_outside_defs(element: &Element, references: &mut HashSet<String>) {
    element_references(element, references);
    for child in element.element_children() {
        if !child.is(SVG_NS, "defs") {
            collect_outside_defs(child, references);
        }
    }
}

/// 单个元素（不含子元素）中的引用
fn element_references(element: &Element, references: &mut HashSet<String>) {
    for attr in &element.attributes {
        if attr.is_namespace_declaration() {
            continue;
        }
        scan_urls(&attr.value, references);
        if let Some(id) = attr.value.trim().strip_prefix('#') {
            if !id.is_empty() {
                references.insert(id.to_string());
            }
        }
    }

    if element.is(SVG_NS, "style") {
        for child in &element.children {
            if let Node::Text(text) | Node::CData(text) = child {
                scan_urls(text, references);
            }
        }
    }
}

/// 提取文本中的 `url(#id)` 引用
fn scan_urls(text: &str, references: &mut HashSet<String>) {
    let mut rest = text;
    while let Some(pos) = rest.find("url(") {
        let after = &rest[pos + 4..];
        let end = after.find(')').unwrap_or(after.len());
        let target = after[..end].trim().trim_matches(|c| c == '\'' || c == '"');
        if let Some(id) = target.strip_prefix('#') {
            if !id.is_empty() {
                references.insert(id.to_string());
            }
        }
        rest = &after[end..];
    }
}

fn subtree_ids(element: &Element) -> HashSet<String> {
    element
        .descendants()
        .into_iter()
        .filter_map(|e| e.attr("id"))
        .map(str::to_string)
        .collect()
}
