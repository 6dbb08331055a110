//! Translation-table extraction for the reverse lookup direction.
//!
//! English entries group their translations into collapsible `NavFrame` boxes
//! under one or more "Translations" headings, one box per sense. Each box has
//! a `NavHead` carrying the English gloss and a `NavContent` with per-language
//! list items; the Spanish terms are the `lang="es"` spans inside those items.

use crate::filters::{FilterContext, run_filters};
use crate::tree::{NodeId, Tree};

/// Prefix of the anchor ids that mark translation headings.
const TRANSLATIONS_ANCHOR_PREFIX: &str = "Translations";
/// Gloss of the box that collects unreviewed translations; skipped.
const UNREVIEWED_GLOSS: &str = "Translations to be checked";
/// Marker rendered for a gloss with no Spanish terms.
pub const NO_TRANSLATIONS: &str = "No translations";

/// One sense's worth of translations: the English gloss and the Spanish terms
/// found under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationBlock {
    /// The English gloss the terms are grouped under.
    pub gloss: String,
    /// The Spanish terms, in document order. May be empty.
    pub terms: Vec<String>,
}

/// Collects one [`TranslationBlock`] per qualifying translation box in the
/// retained section.
///
/// An empty result is a normal outcome ("no translations available"), not an
/// error.
#[must_use]
pub fn extract_translations(tree: &Tree) -> Vec<TranslationBlock> {
    let mut blocks = Vec::new();

    for heading in translation_headings(tree) {
        let Ok(scope) = crate::section::delimit(tree, heading) else {
            continue;
        };

        for &node in &scope {
            for frame in tree.descendants(node) {
                if !tree.has_class(frame, "NavFrame") {
                    continue;
                }
                if let Some(block) = extract_block(tree, frame) {
                    blocks.push(block);
                }
            }
        }
    }

    blocks
}

fn translation_headings(tree: &Tree) -> Vec<NodeId> {
    let mut headings = Vec::new();

    for id in tree.descendants(tree.root()) {
        let Some(anchor) = tree.attr(id, "id") else {
            continue;
        };
        if !anchor.starts_with(TRANSLATIONS_ANCHOR_PREFIX) {
            continue;
        }
        if let Some(heading) = tree.enclosing_heading(id)
            && !headings.contains(&heading)
        {
            headings.push(heading);
        }
    }

    headings
}

fn extract_block(tree: &Tree, frame: NodeId) -> Option<TranslationBlock> {
    let head = tree
        .children(frame)
        .iter()
        .copied()
        .find(|&child| tree.has_class(child, "NavHead"))?;
    let content = tree
        .children(frame)
        .iter()
        .copied()
        .find(|&child| tree.has_class(child, "NavContent"))?;

    let gloss = tree.text_of(head).trim().to_string();
    if gloss == UNREVIEWED_GLOSS {
        return None;
    }

    let terms: Vec<String> = tree
        .descendants(content)
        .into_iter()
        .filter(|&id| tree.tag(id) == Some("li"))
        .flat_map(|li| tree.descendants(li))
        .filter(|&id| tree.attr(id, "lang") == Some("es"))
        .map(|id| tree.text_of(id).trim().to_string())
        .filter(|term| !term.is_empty())
        .collect();

    Some(TranslationBlock { gloss, terms })
}

/// Builds a renderable subtree for each block under `parent`: the gloss as a
/// heading, then the comma-joined terms (each tagged for styling) or the
/// no-translations marker. The tree filters run over every block before it is
/// returned.
pub fn build_blocks(
    tree: &mut Tree,
    parent: NodeId,
    blocks: &[TranslationBlock],
    ctx: &FilterContext,
) -> Vec<NodeId> {
    let mut built = Vec::with_capacity(blocks.len());

    for block in blocks {
        let container = tree.create_element("div");
        tree.add_class(container, "translation-block");

        let heading = tree.create_element("h3");
        let gloss = tree.create_text(block.gloss.clone());
        tree.append(heading, gloss);
        tree.append(container, heading);

        let body = tree.create_element("p");
        if block.terms.is_empty() {
            let marker = tree.create_text(NO_TRANSLATIONS);
            tree.append(body, marker);
        } else {
            for (index, term) in block.terms.iter().enumerate() {
                if index > 0 {
                    let separator = tree.create_text(", ");
                    tree.append(body, separator);
                }
                let span = tree.create_element("span");
                tree.add_class(span, "es-term");
                tree.set_attr(span, "lang", "es");
                let text = tree.create_text(term.clone());
                tree.append(span, text);
                tree.append(body, span);
            }
        }
        tree.append(container, body);

        run_filters(tree, container, ctx);
        tree.append(parent, container);
        built.push(container);
    }

    built
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    const SECTION: &str = "\
        <h3><span id=\"Noun\">Noun</span></h3>\
        <ol><li>dog</li></ol>\
        <h4><span id=\"Translations\">Translations</span></h4>\
        <div class=\"NavFrame\">\
        <div class=\"NavHead\">four-legged animal</div>\
        <div class=\"NavContent\"><table><tr><td><ul>\
        <li>French: <span lang=\"fr\">chien</span></li>\
        <li>Spanish: <span lang=\"es\">perro</span>, <span lang=\"es\">can</span></li>\
        </ul></td></tr></table></div>\
        </div>\
        <div class=\"NavFrame\">\
        <div class=\"NavHead\">contemptible person</div>\
        <div class=\"NavContent\"><table><tr><td><ul>\
        <li>French: <span lang=\"fr\">salaud</span></li>\
        </ul></td></tr></table></div>\
        </div>\
        <div class=\"NavFrame\">\
        <div class=\"NavHead\">Translations to be checked</div>\
        <div class=\"NavContent\"><table><tr><td><ul>\
        <li>Spanish: <span lang=\"es\">chucho</span></li>\
        </ul></td></tr></table></div>\
        </div>\
        <h3><span id=\"Verb\">Verb</span></h3>";

    #[test]
    fn one_block_per_qualifying_box() {
        let tree = Tree::from_html(SECTION);

        let blocks = extract_translations(&tree);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].gloss, "four-legged animal");
        assert_eq!(blocks[0].terms, vec!["perro", "can"]);
        assert_eq!(blocks[1].gloss, "contemptible person");
        assert!(blocks[1].terms.is_empty());
    }

    #[test]
    fn unreviewed_boxes_are_skipped() {
        let tree = Tree::from_html(SECTION);

        let blocks = extract_translations(&tree);

        assert!(blocks.iter().all(|b| b.gloss != UNREVIEWED_GLOSS));
    }

    #[test]
    fn section_without_translation_headings_yields_nothing() {
        let tree = Tree::from_html("<h3><span id=\"Noun\">Noun</span></h3><ol><li>dog</li></ol>");

        assert!(extract_translations(&tree).is_empty());
    }

    #[test]
    fn built_blocks_join_terms_and_mark_empty_glosses() {
        let mut tree = Tree::from_html(SECTION);
        let blocks = extract_translations(&tree);
        let ctx = FilterContext::new(Url::parse("https://en.wiktionary.org").unwrap(), "Spanish");

        let root = tree.root();
        let built = build_blocks(&mut tree, root, &blocks, &ctx);

        assert_eq!(built.len(), 2);
        assert_eq!(tree.text_of(built[0]), "four-legged animalperro, can");
        assert_eq!(
            tree.text_of(built[1]),
            format!("contemptible person{NO_TRANSLATIONS}")
        );
        // the filters tagged the synthesised gloss heading
        let heading = tree.children(built[0])[0];
        assert_eq!(tree.attr(heading, "data-heading"), Some("four-legged animal"));
    }
}
