//! Single-pass, composable per-node transforms.
//!
//! Every node of a subtree is visited pre-order, depth-first, and a fixed list
//! of independent filters runs against it: background-color inversion (the
//! source highlights target a light theme), hyperlink rewriting, and heading
//! text tagging. The filters touch disjoint node properties, so running them
//! as one combined pass is equivalent to running them one after another.

use url::Url;

use crate::tree::{NodeId, Tree};

/// Context the link-rewrite filter needs: where the document came from and
/// which language section it was carved down to.
#[derive(Debug, Clone)]
pub struct FilterContext {
    /// Origin the document was fetched from, e.g. `https://en.wiktionary.org`.
    pub origin: Url,
    /// Path prefix of in-wiki page links, e.g. `/wiki/`.
    pub wiki_path: String,
    /// The extracted language, used to spot language-scoped anchors.
    pub language: String,
}

impl FilterContext {
    /// Creates a context for the given origin and language with the standard
    /// `/wiki/` page prefix.
    #[must_use]
    pub fn new(origin: Url, language: impl Into<String>) -> FilterContext {
        FilterContext {
            origin,
            wiki_path: String::from("/wiki/"),
            language: language.into(),
        }
    }
}

/// Applies all filters to every node of the subtree rooted at `node`.
pub fn run_filters(tree: &mut Tree, node: NodeId, ctx: &FilterContext) {
    invert_colors(tree, node);
    rewrite_link(tree, node, ctx);
    tag_heading(tree, node);

    let children = tree.children(node).to_vec();
    for child in children {
        run_filters(tree, child, ctx);
    }
}

/// Replaces an explicit background color with its per-channel inverse,
/// `v -> 255 - v`. Supports `rgb(r, g, b)` and `#rrggbb` notations and writes
/// the result back in the notation it found. Nodes without an explicit
/// background are left alone.
fn invert_colors(tree: &mut Tree, node: NodeId) {
    let Some(style) = tree.attr(node, "style") else {
        return;
    };

    let declarations: Vec<String> = style
        .split(';')
        .map(|decl| {
            let Some((property, value)) = decl.split_once(':') else {
                return decl.to_string();
            };
            let name = property.trim();
            if name != "background-color" && name != "background" {
                return decl.to_string();
            }

            match invert_color_value(value.trim()) {
                Some(inverted) => format!("{property}:{inverted}"),
                None => decl.to_string(),
            }
        })
        .collect();

    tree.set_attr(node, "style", declarations.join(";"));
}

fn invert_color_value(value: &str) -> Option<String> {
    if let Some(channels) = value
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let parsed: Vec<u8> = channels
            .split(',')
            .filter_map(|c| c.trim().parse::<u8>().ok())
            .collect();
        let [r, g, b] = parsed.as_slice() else {
            return None;
        };

        return Some(format!("rgb({}, {}, {})", 255 - r, 255 - g, 255 - b));
    }

    if let Some(hex) = value.strip_prefix('#')
        && hex.len() == 6
    {
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        return Some(format!("#{:02x}{:02x}{:02x}", 255 - r, 255 - g, 255 - b));
    }

    None
}

/// Rewrites hyperlink targets for standalone viewing.
///
/// A link back into the wiki that ends in the current language's anchor
/// becomes a local in-page jump and is tagged `internal`; any other
/// same-origin link is absolutised against the origin and marked to open in a
/// new context; already-external links are only marked.
fn rewrite_link(tree: &mut Tree, node: NodeId, ctx: &FilterContext) {
    if tree.tag(node) != Some("a") {
        return;
    }
    let Some(href) = tree.attr(node, "href").map(str::to_string) else {
        return;
    };
    if href.is_empty() || href.starts_with('#') {
        return;
    }

    let language_anchor = format!("#{}", ctx.language);
    if let Some(rest) = href.strip_prefix(&ctx.wiki_path)
        && let Some(page) = rest.strip_suffix(&language_anchor)
    {
        tree.set_attr(node, "href", format!("#{page}"));
        tree.add_class(node, "internal");
        return;
    }

    if Url::parse(&href).is_ok() {
        // Already absolute, so it was external to begin with.
        tree.set_attr(node, "target", "_blank");
    } else if let Ok(absolute) = ctx.origin.join(&href) {
        tree.set_attr(node, "href", absolute.to_string());
        tree.set_attr(node, "target", "_blank");
    }
}

/// Copies a heading's rendered text into a `data-heading` attribute so later
/// lookups can match on the attribute instead of re-reading text content.
fn tag_heading(tree: &mut Tree, node: NodeId) {
    if tree.heading_level(node).is_some() {
        let text = tree.text_of(node).trim().to_string();
        tree.set_attr(node, "data-heading", text);
    }
}
