//! Terminal rendering of the transformed section tree.

use std::fmt::Write;

use wiktionary_es::Tree;
use wiktionary_es::conjugation::VerbFormTable;
use wiktionary_es::tree::NodeId;

/// Renders the retained tree as plain text. In compact mode only headings,
/// list items and tables are emitted; paragraphs are skipped.
#[must_use]
pub fn render_tree(tree: &Tree, compact: bool) -> String {
    let mut out = String::new();
    render_node(tree, tree.root(), compact, &mut out);

    // collapse the leading blank line the first heading produces
    out.trim_start_matches('\n').to_string()
}

fn render_node(tree: &Tree, node: NodeId, compact: bool, out: &mut String) {
    if let Some(level) = tree.heading_level(node) {
        let text = tree.text_of(node);
        let marker = "#".repeat(usize::from(level));
        let _ = writeln!(out, "\n{marker} {}", text.trim());

        return;
    }

    match tree.tag(node) {
        Some("ol") => {
            for (index, &item) in list_items(tree, node).iter().enumerate() {
                let _ = writeln!(out, "{}. {}", index + 1, tree.text_of(item).trim());
            }
        }
        Some("ul") => {
            for &item in &list_items(tree, node) {
                let _ = writeln!(out, "- {}", tree.text_of(item).trim());
            }
        }
        Some("p") => {
            if !compact {
                let text = tree.text_of(node);
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    let _ = writeln!(out, "{trimmed}");
                }
            }
        }
        Some("table") => render_table(tree, node, out),
        _ => {
            for &child in tree.children(node) {
                render_node(tree, child, compact, out);
            }
        }
    }
}

fn list_items(tree: &Tree, list: NodeId) -> Vec<NodeId> {
    tree.children(list)
        .iter()
        .copied()
        .filter(|&child| tree.tag(child) == Some("li"))
        .collect()
}

fn render_table(tree: &Tree, table: NodeId, out: &mut String) {
    for row in tree
        .descendants(table)
        .into_iter()
        .filter(|&id| tree.tag(id) == Some("tr"))
    {
        let cells: Vec<String> = tree
            .children(row)
            .iter()
            .copied()
            .filter(|&cell| matches!(tree.tag(cell), Some("td" | "th")))
            .map(|cell| tree.text_of(cell).trim().to_string())
            .collect();

        if !cells.is_empty() {
            let _ = writeln!(out, "{}", cells.join(" | "));
        }
    }
}

/// Renders the present-indicative quick table, one pronoun per line, with
/// footnotes in parentheses.
#[must_use]
pub fn render_quick_table(table: &VerbFormTable) -> String {
    let mut out = String::new();

    for (pronoun, forms) in table.rows() {
        let rendered: Vec<String> = forms
            .iter()
            .map(|form| {
                if form.footnotes.is_empty() {
                    form.form.clone()
                } else {
                    format!("{} ({})", form.form, form.footnotes.join("; "))
                }
            })
            .collect();

        let _ = writeln!(out, "{:>10}  {}", pronoun.label(), rendered.join(", "));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiktionary_es::conjugation::VerbForm;

    #[test]
    fn headings_lists_and_paragraphs_render_in_order() {
        let tree = Tree::from_html(
            "<h3>Noun</h3><p>a paragraph</p><ol><li>first sense</li><li>second sense</li></ol>",
        );

        let full = render_tree(&tree, false);
        assert_eq!(full, "### Noun\na paragraph\n1. first sense\n2. second sense\n");

        let compact = render_tree(&tree, true);
        assert_eq!(compact, "### Noun\n1. first sense\n2. second sense\n");
    }

    #[test]
    fn tables_render_rows_with_separators() {
        let tree = Tree::from_html(
            "<table><tbody><tr><th>present</th><td>hablo</td></tr></tbody></table>",
        );

        assert_eq!(render_tree(&tree, true), "present | hablo\n");
    }

    #[test]
    fn quick_table_lines_up_pronouns_and_footnotes() {
        let mut forms = std::collections::BTreeMap::new();
        for (key, form) in [
            ("pres_1s", "hablo"),
            ("pres_2s", "hablas"),
            ("pres_2sv", "hablás"),
            ("pres_3s", "habla"),
            ("pres_1p", "hablamos"),
            ("pres_3p", "hablan"),
        ] {
            forms.insert(key.to_string(), vec![VerbForm::plain(form)]);
        }
        let table = VerbFormTable::from_expansion(&forms).unwrap();

        let rendered = render_quick_table(&table);

        assert!(rendered.contains("        yo  hablo\n"));
        assert!(rendered.contains("       vos  hablás\n"));
    }
}
