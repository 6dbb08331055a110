//! Regional pronunciation disambiguation.
//!
//! Entries list pronunciations either as plain `IPA`-prefixed list items under
//! the "Pronunciation" heading, or split per region into collapsible
//! "switcher" boxes. Multi-region entries tend to have more, and more
//! specific, switcher items, so the switcher pool is preferred whenever it is
//! strictly larger. This is a proxy for "more specific", not a verified rule;
//! it is kept as-is because the upstream layout documents nothing better.

use tracing::warn;

use crate::section::delimit;
use crate::tree::{NodeId, Tree};

/// Heading text that marks the pronunciation sub-scope.
const PRONUNCIATION_HEADING: &str = "Pronunciation";
/// Prefix of inline pronunciation list items.
const IPA_PREFIX: &str = "IPA";
/// Regional labels used to pick among multiple candidates, most specific
/// first.
pub const DEFAULT_DIALECT_MARKERS: [&str; 2] =
    ["(Buenos Aires and environs)", "(Latin America)"];

/// Resolves a single phonemic string from the pronunciation sub-scope and
/// deletes that sub-scope from the tree.
///
/// Returns `None` when the section has no pronunciation heading, or when the
/// candidates cannot be disambiguated; the latter is logged and the entry
/// simply renders without a pronunciation. Expects heading tagging to have
/// run already (lookup is by the `data-heading` attribute).
pub fn resolve(tree: &mut Tree, markers: &[String]) -> Option<String> {
    let heading = find_pronunciation_heading(tree)?;
    let scope = delimit(tree, heading).ok()?;

    let inline = inline_candidates(tree, &scope);
    let switcher = switcher_candidates(tree);

    // Prefer the switcher pool only when it is strictly larger; some entries
    // have no switchers at all.
    let candidates = if switcher.len() > inline.len() {
        switcher
    } else {
        inline
    };

    let chosen = if candidates.len() == 1 {
        Some(candidates[0])
    } else {
        candidates.iter().copied().find(|&li| {
            let text = tree.text_of(li);
            markers.iter().any(|marker| text.contains(marker.as_str()))
        })
    };

    let Some(chosen) = chosen else {
        let choices: Vec<String> = candidates
            .iter()
            .map(|&li| tree.text_of(li).trim().to_string())
            .collect();
        warn!(?choices, "could not disambiguate the pronunciation");

        return None;
    };

    let ipa = extract_ipa(&tree.text_of(chosen));

    // The sub-scope is consumed; the string resurfaces in the entry title.
    tree.detach(heading);
    for node in scope {
        tree.detach(node);
    }

    Some(ipa)
}

fn find_pronunciation_heading(tree: &Tree) -> Option<NodeId> {
    tree.descendants(tree.root()).into_iter().find(|&id| {
        tree.heading_level(id).is_some()
            && tree.attr(id, "data-heading") == Some(PRONUNCIATION_HEADING)
    })
}

/// List items in the pronunciation scope whose text starts with the `IPA`
/// marker.
fn inline_candidates(tree: &Tree, scope: &[NodeId]) -> Vec<NodeId> {
    scope
        .iter()
        .flat_map(|&node| tree.descendants(node))
        .filter(|&id| {
            tree.tag(id) == Some("li") && tree.text_of(id).trim_start().starts_with(IPA_PREFIX)
        })
        .collect()
}

/// List items nested in collapsible switcher boxes anywhere in the retained
/// section: `.vsSwitcher > .vsHide > ul > li`.
fn switcher_candidates(tree: &Tree) -> Vec<NodeId> {
    let mut out = Vec::new();

    for switcher in tree.descendants(tree.root()) {
        if !tree.has_class(switcher, "vsSwitcher") {
            continue;
        }
        for &hidden in tree.children(switcher) {
            if !tree.has_class(hidden, "vsHide") {
                continue;
            }
            for &list in tree.children(hidden) {
                if tree.tag(list) != Some("ul") {
                    continue;
                }
                out.extend(
                    tree.children(list)
                        .iter()
                        .copied()
                        .filter(|&li| tree.tag(li) == Some("li")),
                );
            }
        }
    }

    out
}

/// Takes the final `)`-delimited segment of the candidate's text, trimmed and
/// stripped of one leading colon. Entries that do not vary by region are
/// formatted slightly differently upstream, hence the colon artifact.
fn extract_ipa(text: &str) -> String {
    let last = text.rsplit(')').next().unwrap_or(text).trim();

    last.strip_prefix(':').unwrap_or(last).trim().to_string()
}
