//! XML Ingestion
//!
//! Translates a `<configuration>` document into tree entries. Each element
//! is filtered against the platform identity, mapped to a path segment
//! (positional for `<group>`, implicit group zero beneath auto-grouped paths),
//! and then either coerced into a typed scalar, descended into, or stored as
//! a string leaf. Top-level `<include>` elements load another document into
//! the same tree.

pub mod document;
pub mod filter;
pub mod scalar;

use crate::error::{Result, StoreError};
use crate::loader::{self, FileVolume};
use crate::tree::{path, Tree};
use crate::value::Value;
use filter::PlatformIdentity;
use roxmltree::Node as XmlNode;
use scalar::LiteralTag;
use tracing::{debug, trace, warn};

/// Root element every configuration document must have
pub const ROOT_TAG: &str = "configuration";

/// Everything ingestion needs besides the target tree
#[derive(Clone, Copy)]
pub struct IngestContext<'a> {
    pub identity: &'a PlatformIdentity,
    /// Paths whose children are implicitly placed in group zero
    pub auto_groups: &'a [String],
    /// Deepest element level accepted before ingestion aborts
    pub max_depth: usize,
    /// Volume that `<include>` paths are read from
    pub volume: &'a dyn FileVolume,
    pub max_include_depth: usize,
    /// Number of includes between the top-level document and this one
    pub include_depth: usize,
}

impl<'a> IngestContext<'a> {
    fn nested(&self) -> Self {
        Self {
            include_depth: self.include_depth + 1,
            ..*self
        }
    }

    fn is_auto_group(&self, element_path: &str) -> bool {
        self.auto_groups
            .iter()
            .any(|group| path::names_match(group, element_path))
    }
}

/// Decode, parse, and ingest a document into the local tree
pub fn ingest_bytes(tree: &mut Tree, bytes: &[u8], context: &IngestContext<'_>) -> Result<()> {
    let text = document::decode_text(bytes)?;
    let document = document::parse_xml(&text)?;
    ingest_document(tree, &document, context)
}

/// Ingest every element beneath the document's `<configuration>` root.
///
/// Stops at the first hard failure; per-element problems are logged and
/// skipped.
pub fn ingest_document(
    tree: &mut Tree,
    document: &roxmltree::Document<'_>,
    context: &IngestContext<'_>,
) -> Result<()> {
    let root = document.root_element();
    if !path::names_match(root.tag_name().name(), ROOT_TAG) {
        return Err(StoreError::NotFound(format!(
            "Document root is <{}>, expected <{}>",
            root.tag_name().name(),
            ROOT_TAG
        )));
    }

    let mut ingestor = Ingestor { tree, context };
    for (index, child) in element_children(root).enumerate() {
        ingestor.visit(child, 1, index, None)?;
    }
    Ok(())
}

/// Path and grouping state an element passes to its children
struct Scope {
    path: String,
    auto_group: bool,
}

struct Ingestor<'t, 'c> {
    tree: &'t mut Tree,
    context: &'c IngestContext<'c>,
}

impl Ingestor<'_, '_> {
    fn visit(
        &mut self,
        element: XmlNode<'_, '_>,
        level: usize,
        index: usize,
        parent: Option<&Scope>,
    ) -> Result<()> {
        let tag = element.tag_name().name();
        let parent_path = parent.map_or("", |scope| scope.path.as_str());

        if level > self.context.max_depth {
            return Err(StoreError::DepthExceeded {
                path: path::join(parent_path, tag),
                limit: self.context.max_depth,
            });
        }

        let attributes = element.attributes().map(|a| (a.name(), a.value()));
        if !self.context.identity.admits(attributes) {
            trace!(parent = %parent_path, tag, "Skipped element for another platform");
            return Ok(());
        }

        let children: Vec<XmlNode<'_, '_>> = element_children(element).collect();
        let text = element_text(element);

        let segment = if path::names_match(tag, "group") {
            index.to_string()
        } else if level == 1 && children.is_empty() && path::names_match(tag, "include") {
            if let Some(include) = text {
                self.include(&include);
            }
            return Ok(());
        } else if parent.map_or(false, |scope| scope.auto_group) {
            format!("0{}{}", path::DELIMITER, tag)
        } else {
            tag.to_string()
        };
        let element_path = path::join(parent_path, &segment);

        if children.is_empty() {
            if let Some(text) = text {
                debug!("{}=\"{}\"", element_path, text);
                self.store(&element_path, Value::String(text))?;
            }
            return Ok(());
        }

        if let [only] = children.as_slice() {
            if !has_element_children(*only) {
                if let Some(literal_tag) = LiteralTag::from_tag(only.tag_name().name()) {
                    let literal_text = element_text(*only);
                    if let Some(literal) = scalar::parse_literal(literal_tag, literal_text.as_deref()) {
                        debug!("{}={}", element_path, literal.display());
                        self.store(&element_path, literal.value)?;
                    }
                    return Ok(());
                }
            }
        }

        let scope = Scope {
            auto_group: self.context.is_auto_group(&element_path),
            path: element_path,
        };
        for (child_index, child) in children.into_iter().enumerate() {
            self.visit(child, level + 1, child_index, Some(&scope))?;
        }
        Ok(())
    }

    /// Store one value; rejected assignments are logged and skipped
    fn store(&mut self, element_path: &str, value: Value) -> Result<()> {
        match self.tree.set_value(element_path, value) {
            Ok(()) => Ok(()),
            Err(e) if e.is_hard_ingest_failure() => Err(e),
            Err(e) => {
                warn!(path = %element_path, error = %e, "Skipped configuration value");
                Ok(())
            }
        }
    }

    /// Load an included document into the same tree. Failures never abort
    /// the including document.
    fn include(&mut self, include_path: &str) {
        if self.context.include_depth >= self.context.max_include_depth {
            warn!(
                include = %include_path,
                limit = self.context.max_include_depth,
                "Skipped include nested too deeply"
            );
            return;
        }

        let nested = self.context.nested();
        let result = loader::read_config(self.context.volume, include_path)
            .and_then(|bytes| ingest_bytes(self.tree, &bytes, &nested));
        match result {
            Ok(()) => debug!(include = %include_path, "Included configuration"),
            Err(e) => warn!(include = %include_path, error = %e, "Include failed"),
        }
    }
}

fn element_children<'a, 'input>(
    node: XmlNode<'a, 'input>,
) -> impl Iterator<Item = XmlNode<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

fn has_element_children(node: XmlNode<'_, '_>) -> bool {
    node.children().any(|child| child.is_element())
}

/// Trimmed direct text of an element, if any. Text runs split by comments
/// or processing instructions are joined.
fn element_text(node: XmlNode<'_, '_>) -> Option<String> {
    let text: String = node
        .children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
