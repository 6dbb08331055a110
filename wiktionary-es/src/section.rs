//! Heading-scoped section delimiting and language-section extraction.
//!
//! Wiktionary pages lift all section content to top-level siblings; the only
//! structure is the heading elements interleaved with it. A "section" is the
//! contiguous run of siblings between a heading and the next sibling at an
//! equal-or-shallower heading level.

use crate::Error;
use crate::tree::{NodeId, Tree};

/// Returns the scope of `heading`: every following sibling up to, but not
/// including, the first sibling that is itself a heading with a level
/// less than or equal to the starting heading's level.
///
/// Non-heading siblings never terminate a scope. A heading with no following
/// siblings has an empty scope.
///
/// # Errors
///
/// Returns [`Error::NotAHeading`] if `heading` is not a heading element.
pub fn delimit(tree: &Tree, heading: NodeId) -> Result<Vec<NodeId>, Error> {
    delimit_until(tree, heading, |level, start| level <= start)
}

/// Like [`delimit`], but the scope ends at *any* heading regardless of level.
///
/// Used to carve nested sub-scopes such as per-etymology blocks, where a
/// deeper heading still marks the end of the run of interest.
///
/// # Errors
///
/// Returns [`Error::NotAHeading`] if `heading` is not a heading element.
pub fn delimit_inline(tree: &Tree, heading: NodeId) -> Result<Vec<NodeId>, Error> {
    delimit_until(tree, heading, |_, _| true)
}

fn delimit_until(
    tree: &Tree,
    heading: NodeId,
    stop: impl Fn(u8, u8) -> bool,
) -> Result<Vec<NodeId>, Error> {
    let start_level = tree.heading_level(heading).ok_or(Error::NotAHeading)?;
    let mut scope = Vec::new();
    let mut current = tree.next_sibling(heading);

    while let Some(sibling) = current {
        if let Some(level) = tree.heading_level(sibling)
            && stop(level, start_level)
        {
            break;
        }

        scope.push(sibling);
        current = tree.next_sibling(sibling);
    }

    Ok(scope)
}

/// Locates the heading anchored with `language` and prunes the tree down to
/// that heading's scope.
///
/// The anchor may be the heading element itself or a descendant span, which
/// covers both current and older Wiktionary markup. On success the scope's
/// nodes become the direct children of the root and everything else (other
/// languages, navigational chrome) is discarded; the returned ids are the
/// retained nodes in document order.
///
/// # Errors
///
/// Returns [`Error::LanguageNotFound`] if no heading carries the language
/// anchor; the tree is left unmodified in that case.
pub fn extract_language(tree: &mut Tree, language: &str) -> Result<Vec<NodeId>, Error> {
    let anchor = tree
        .find_by_anchor(language)
        .ok_or_else(|| Error::LanguageNotFound {
            language: language.to_string(),
        })?;
    let heading = tree
        .enclosing_heading(anchor)
        .ok_or_else(|| Error::LanguageNotFound {
            language: language.to_string(),
        })?;

    let scope = delimit(tree, heading)?;
    tree.retain_at_root(&scope);

    Ok(scope)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading_at(tree: &Tree, anchor: &str) -> NodeId {
        let span = tree.find_by_anchor(anchor).expect("anchor present");
        tree.enclosing_heading(span).expect("heading present")
    }

    const PAGE: &str = "\
        <h2><span id=\"English\">English</span></h2>\
        <p>english content</p>\
        <h2><span id=\"Spanish\">Spanish</span></h2>\
        <h3><span id=\"Etymology\">Etymology</span></h3>\
        <p>from latin</p>\
        <h4><span id=\"Noun\">Noun</span></h4>\
        <ol><li>a cat</li></ol>\
        <h2><span id=\"Swedish\">Swedish</span></h2>\
        <p>swedish content</p>";

    #[test]
    fn delimit_stops_at_equal_or_shallower_heading() {
        let tree = Tree::from_html(PAGE);
        let spanish = heading_at(&tree, "Spanish");

        let scope = delimit(&tree, spanish).unwrap();

        // etymology h3, paragraph, noun h4, list; the Swedish h2 ends it
        assert_eq!(scope.len(), 4);
        assert!(!scope.contains(&spanish));
        for &node in &scope {
            if let Some(level) = tree.heading_level(node) {
                assert!(level > 2);
            }
        }
    }

    #[test]
    fn delimit_includes_deeper_headings_in_order() {
        let tree = Tree::from_html(PAGE);
        let etymology = heading_at(&tree, "Etymology");

        let scope = delimit(&tree, etymology).unwrap();

        // paragraph, noun h4, list; the Swedish h2 (level 2 <= 3) ends it
        assert_eq!(scope.len(), 3);
        assert_eq!(tree.tag(scope[0]), Some("p"));
        assert_eq!(tree.tag(scope[1]), Some("h4"));
        assert_eq!(tree.tag(scope[2]), Some("ol"));
    }

    #[test]
    fn delimit_inline_stops_at_any_heading() {
        let tree = Tree::from_html(PAGE);
        let etymology = heading_at(&tree, "Etymology");

        let scope = delimit_inline(&tree, etymology).unwrap();

        // the h4 ends the inline scope even though it is deeper
        assert_eq!(scope.len(), 1);
        assert_eq!(tree.tag(scope[0]), Some("p"));
    }

    #[test]
    fn delimit_with_no_following_sibling_is_empty() {
        let tree = Tree::from_html("<h3><span id=\"Last\">Last</span></h3>");
        let last = heading_at(&tree, "Last");

        assert_eq!(delimit(&tree, last).unwrap(), vec![]);
    }

    #[test]
    fn delimit_rejects_non_headings() {
        let tree = Tree::from_html("<p>not a heading</p>");
        let p = tree.children(tree.root())[0];

        assert!(matches!(delimit(&tree, p), Err(Error::NotAHeading)));
    }

    #[test]
    fn extract_language_prunes_to_the_scope() {
        let mut tree = Tree::from_html(PAGE);

        let scope = extract_language(&mut tree, "Spanish").unwrap();

        assert_eq!(tree.children(tree.root()), scope.as_slice());
        let text = tree.text_of(tree.root());
        assert!(text.contains("a cat"));
        assert!(!text.contains("english content"));
        assert!(!text.contains("swedish content"));
    }

    #[test]
    fn extract_language_not_found_leaves_tree_unmodified() {
        let mut tree = Tree::from_html(PAGE);
        let before = tree.children(tree.root()).to_vec();

        let result = extract_language(&mut tree, "Basque");

        assert!(matches!(result, Err(Error::LanguageNotFound { .. })));
        assert_eq!(tree.children(tree.root()), before.as_slice());
    }
}
