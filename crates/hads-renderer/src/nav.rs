//! Navigation tree built from the list of indexed documents.
//!
//! The tree is rendered as nested markdown lists and expanded in place of
//! `[[index]]` directives.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Write;

use hads_storage::matcher::ROOT_FILES;
use hads_storage::matcher::extension;
use hads_storage::path::file_stem;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::util::escape_link_text;

/// Characters escaped in generated link targets.
///
/// `/` is kept so paths stay readable; parentheses would end the markdown
/// link destination.
const LINK_TARGET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'(')
    .add(b')')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Node of the navigation tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Document, holding its path relative to the documentation root.
    File(String),
    /// Folder with its own entries.
    Folder(NavTree),
}

/// One folder level of the navigation tree, keyed by path segment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavTree {
    entries: BTreeMap<String, NodeKind>,
}

impl NavTree {
    /// Build the tree from `/`-separated paths relative to the root.
    ///
    /// ```
    /// use hads_renderer::NavTree;
    ///
    /// let tree = NavTree::from_paths(["index.md", "guide/01-setup.md"]);
    /// assert_eq!(
    ///     tree.to_markdown(false),
    ///     "- [Index](/index.md)\n- Guide\n  - [Setup](/guide/01-setup.md)\n"
    /// );
    /// ```
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut root = Self::default();
        for path in paths {
            root.insert(path.as_ref());
        }
        root
    }

    fn insert(&mut self, path: &str) {
        let mut segments: Vec<&str> = path
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();
        let Some(name) = segments.pop() else {
            return;
        };

        let mut level = self;
        for segment in segments {
            let node = level
                .entries
                .entry(segment.to_owned())
                .or_insert_with(|| NodeKind::Folder(Self::default()));
            if let NodeKind::File(_) = node {
                *node = NodeKind::Folder(Self::default());
            }
            let NodeKind::Folder(folder) = node else {
                return;
            };
            level = folder;
        }

        let normalized = path.trim_start_matches('/').to_owned();
        level
            .entries
            .entry(name.to_owned())
            .or_insert(NodeKind::File(normalized));
    }

    /// Whether the tree has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of this level in display order.
    #[must_use]
    pub fn sorted_entries(&self) -> Vec<(&str, &NodeKind)> {
        let mut entries: Vec<(&str, &NodeKind)> = self
            .entries
            .iter()
            .map(|(key, node)| (key.as_str(), node))
            .collect();
        entries.sort_by(|a, b| compare_entries(*a, *b));
        entries
    }

    /// Render the tree as nested markdown lists.
    ///
    /// Files become links to their absolute path; folders become plain list
    /// items with their entries indented below. With `static_export`, links
    /// point at the exported `.html` page instead of the markdown source.
    #[must_use]
    pub fn to_markdown(&self, static_export: bool) -> String {
        let mut markdown = String::new();
        self.write_level(0, static_export, &mut markdown);
        markdown
    }

    fn write_level(&self, depth: usize, static_export: bool, out: &mut String) {
        let indent = "  ".repeat(depth);
        for (key, node) in self.sorted_entries() {
            match node {
                NodeKind::File(path) => {
                    let target = if static_export {
                        exported_page(path)
                    } else {
                        path.clone()
                    };
                    writeln!(
                        out,
                        "{indent}- [{}](/{})",
                        escape_link_text(&humanize(display_name(key, node))),
                        utf8_percent_encode(&target, LINK_TARGET)
                    )
                    .unwrap();
                }
                NodeKind::Folder(folder) => {
                    writeln!(out, "{indent}- {}", escape_link_text(&humanize(key))).unwrap();
                    folder.write_level(depth + 1, static_export, out);
                }
            }
        }
    }
}

/// Path of the page a document is exported to: `guide/setup.md` becomes
/// `guide/setup.html`.
fn exported_page(path: &str) -> String {
    match extension(path) {
        Some(ext) => format!("{}html", &path[..path.len() - ext.len()]),
        None => format!("{path}.html"),
    }
}

/// Sort class of an entry within its folder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Rank {
    /// Canonical root file, by position in [`ROOT_FILES`].
    Root(usize),
    /// Name with a numeric prefix such as `002-intro`.
    Numbered(u64),
    Named,
}

fn rank(key: &str, node: &NodeKind) -> Rank {
    if let NodeKind::File(_) = node
        && let Some(pos) = ROOT_FILES.iter().position(|root| *root == key)
    {
        return Rank::Root(pos);
    }

    match numeric_prefix(display_name(key, node)) {
        Some((number, _)) => Rank::Numbered(number),
        None => Rank::Named,
    }
}

fn compare_entries(
    (a_key, a_node): (&str, &NodeKind),
    (b_key, b_node): (&str, &NodeKind),
) -> Ordering {
    let is_folder = |node: &NodeKind| matches!(node, NodeKind::Folder(_));

    rank(a_key, a_node)
        .cmp(&rank(b_key, b_node))
        .then_with(|| is_folder(a_node).cmp(&is_folder(b_node)))
        .then_with(|| display_name(a_key, a_node).cmp(display_name(b_key, b_node)))
        .then_with(|| a_key.cmp(b_key))
}

/// Name an entry is displayed and ordered by: files lose their extension.
fn display_name<'a>(key: &'a str, node: &NodeKind) -> &'a str {
    match node {
        NodeKind::File(_) => file_stem(key),
        NodeKind::Folder(_) => key,
    }
}

/// Split `002-intro` into `(2, "intro")`.
///
/// The prefix must be followed by `-` or `_`.
fn numeric_prefix(name: &str) -> Option<(u64, &str)> {
    let digits = name.len() - name.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }

    let rest = name[digits..].strip_prefix(['-', '_'])?;
    let number = name[..digits].parse().ok()?;
    Some((number, rest))
}

/// Turn a file or folder name into a label.
///
/// Drops a numeric prefix, replaces `-` and `_` with spaces, collapses
/// whitespace and capitalizes the first letter.
fn humanize(name: &str) -> String {
    let name = match numeric_prefix(name) {
        Some((_, rest)) if !rest.is_empty() => rest,
        _ => name,
    };

    let mut label = String::with_capacity(name.len());
    for (i, word) in name
        .split(['-', '_', ' ', '\t'])
        .filter(|w| !w.is_empty())
        .enumerate()
    {
        if i == 0 {
            capitalize_first_into(word, &mut label);
        } else {
            label.push(' ');
            label.push_str(word);
        }
    }
    label
}

/// Capitalize the first character of a word, appending to `buf`.
fn capitalize_first_into(word: &str, buf: &mut String) {
    let mut chars = word.chars();
    if let Some(first) = chars.next() {
        buf.extend(first.to_uppercase());
        buf.push_str(chars.as_str());
    }
}
