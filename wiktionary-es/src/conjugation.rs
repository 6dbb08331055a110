//! Conjugation paradigm tables and their structural rewrites.
//!
//! The upstream paradigm table carries a `vosotros` column that is not wanted
//! downstream, plus person/number header rows repeated before every mood
//! block. Both transforms address cells positionally and tolerate tables that
//! do not match the expected shape by doing nothing for the rows they cannot
//! find.

use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::tree::{NodeId, Tree};

/// Per-row cell index of the dialect column to fold away. The index varies by
/// row because of the table's uneven column spans.
const VOSOTROS_FOLD_COLUMNS: [usize; 23] = [
    1, 1, 1, 0, 0, 2, 4, 6, 5, 5, 5, 5, 5, 0, 6, 5, 5, 5, 5, 0, 6, 5, 5,
];

/// Rows holding the person/number header repeated before the subjunctive and
/// imperative blocks; the first occurrence (rows 5-6) is kept.
const BOILERPLATE_ROWS: [usize; 2] = [14, 20];

/// Row index of the present-indicative paradigm after the dialect column is
/// folded away.
const PRESENT_INDICATIVE_ROW: usize = 8;

/// Third-person singular form of the one verb whose present-indicative row is
/// shaped differently, `haber`.
const IRREGULAR_HAY: &str = "hay";

/// Finds the primary paradigm table: the first child of the first collapsible
/// `NavContent` container.
#[must_use]
pub fn find_paradigm_table(tree: &Tree) -> Option<NodeId> {
    let content = tree
        .descendants(tree.root())
        .into_iter()
        .find(|&id| tree.has_class(id, "NavContent"))?;

    tree.children(content)
        .iter()
        .copied()
        .find(|&child| tree.tag(child) == Some("table"))
}

fn table_rows(tree: &Tree, table: NodeId) -> Vec<NodeId> {
    tree.descendants(table)
        .into_iter()
        .filter(|&id| tree.tag(id) == Some("tr"))
        .collect()
}

fn row_cells(tree: &Tree, row: NodeId) -> Vec<NodeId> {
    tree.children(row)
        .iter()
        .copied()
        .filter(|&cell| matches!(tree.tag(cell), Some("td" | "th")))
        .collect()
}

fn colspan(tree: &Tree, cell: NodeId) -> usize {
    tree.attr(cell, "colspan")
        .and_then(|span| span.parse().ok())
        .unwrap_or(1)
}

/// Folds the dialect-specific `vosotros` column out of the table.
///
/// For each row, the cell named by the per-row lookup is deleted outright if
/// it spans a single column, otherwise its span is decremented, preserving the
/// grid alignment of the remaining cells. Rows or cells missing from the
/// lookup are left untouched.
pub fn fold_dialect_column(tree: &mut Tree, table: NodeId) {
    for (index, row) in table_rows(tree, table).into_iter().enumerate() {
        let Some(&target) = VOSOTROS_FOLD_COLUMNS.get(index) else {
            continue;
        };
        let Some(&cell) = row_cells(tree, row).get(target) else {
            continue;
        };

        let span = colspan(tree, cell);
        if span <= 1 {
            tree.detach(cell);
        } else {
            tree.set_attr(cell, "colspan", (span - 1).to_string());
        }
    }
}

/// Collapses the repeated person/number header rows down to their leading
/// label cell.
pub fn compact_boilerplate_rows(tree: &mut Tree, table: NodeId) {
    let rows = table_rows(tree, table);

    for &index in &BOILERPLATE_ROWS {
        let Some(&row) = rows.get(index) else {
            continue;
        };

        for cell in row_cells(tree, row).into_iter().skip(1) {
            tree.detach(cell);
        }
    }
}

/// Reads the present-indicative surface forms from the folded table.
///
/// Forms live in `span` elements inside the row's data cells; the leading
/// label cell is a `th` and contributes nothing.
#[must_use]
pub fn present_indicative_forms(tree: &Tree, table: NodeId) -> Option<Vec<String>> {
    let rows = table_rows(tree, table);
    let row = *rows.get(PRESENT_INDICATIVE_ROW)?;

    let forms: Vec<String> = row_cells(tree, row)
        .into_iter()
        .filter(|&cell| tree.tag(cell) == Some("td"))
        .flat_map(|cell| tree.descendants(cell))
        .filter(|&node| tree.tag(node) == Some("span"))
        .map(|node| tree.text_of(node).trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();

    if forms.is_empty() { None } else { Some(forms) }
}

/// Aligns a row of extracted forms into the six-pronoun output shape.
///
/// Two grammatical persons share a surface form in the source table, so a
/// five-form row is padded by duplicating the tú form into the vos slot. The
/// impersonal `hay` row of `haber` is shaped differently and duplicates the
/// yo slot instead; that verb is enumerated explicitly rather than inferred.
#[must_use]
pub fn align_forms(mut forms: Vec<String>) -> Option<[String; 6]> {
    if forms.len() == 5 {
        if forms[2] == IRREGULAR_HAY {
            forms.insert(0, forms[0].clone());
        } else {
            forms.insert(1, forms[1].clone());
        }
    }

    forms.try_into().ok()
}

/// A grammatical person / pronoun label of the quick table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pronoun {
    /// First-person singular.
    Yo,
    /// Informal second-person singular.
    Tu,
    /// Rioplatense second-person singular.
    Vos,
    /// Third-person singular.
    El,
    /// First-person plural.
    Nosotros,
    /// Third-person plural.
    Ustedes,
}

impl Pronoun {
    /// All pronouns, in display order.
    pub const ALL: [Pronoun; 6] = [
        Pronoun::Yo,
        Pronoun::Tu,
        Pronoun::Vos,
        Pronoun::El,
        Pronoun::Nosotros,
        Pronoun::Ustedes,
    ];

    /// The pronoun as written.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Pronoun::Yo => "yo",
            Pronoun::Tu => "tú",
            Pronoun::Vos => "vos",
            Pronoun::El => "él",
            Pronoun::Nosotros => "nosotros",
            Pronoun::Ustedes => "ustedes",
        }
    }

    /// The grammatical-form identifier used by the template-expansion
    /// payload for this pronoun's present-indicative slot.
    #[must_use]
    pub const fn present_indicative_key(self) -> &'static str {
        match self {
            Pronoun::Yo => "pres_1s",
            Pronoun::Tu => "pres_2s",
            Pronoun::Vos => "pres_2sv",
            Pronoun::El => "pres_3s",
            Pronoun::Nosotros => "pres_1p",
            Pronoun::Ustedes => "pres_3p",
        }
    }
}

impl fmt::Display for Pronoun {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(self.label())
    }
}

/// A single surface form with its footnote annotations, as decoded from the
/// template-expansion payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct VerbForm {
    /// The surface form, e.g. `hablo`.
    pub form: String,
    /// Footnote annotations attached to this form.
    #[cfg_attr(feature = "serde", serde(default))]
    pub footnotes: Vec<String>,
}

impl VerbForm {
    /// A bare form with no footnotes.
    #[must_use]
    pub fn plain(form: impl Into<String>) -> VerbForm {
        VerbForm {
            form: form.into(),
            footnotes: Vec::new(),
        }
    }
}

/// The present-indicative paradigm as a fixed-arity mapping from pronoun to
/// an ordered list of surface forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerbFormTable {
    rows: [(Pronoun, Vec<VerbForm>); 6],
}

impl VerbFormTable {
    /// Builds the table from the decoded template-expansion payload, keyed by
    /// grammatical person rather than table position.
    ///
    /// Returns `None` if any of the six present-indicative slots is missing;
    /// the positional table extraction stays available as the fallback.
    #[must_use]
    pub fn from_expansion(forms: &BTreeMap<String, Vec<VerbForm>>) -> Option<VerbFormTable> {
        let mut rows = Vec::with_capacity(6);

        for pronoun in Pronoun::ALL {
            let entry = forms.get(pronoun.present_indicative_key())?;
            if entry.is_empty() {
                return None;
            }
            rows.push((pronoun, entry.clone()));
        }

        rows.try_into().ok().map(|rows| VerbFormTable { rows })
    }

    /// Builds the table from six positionally aligned forms, as extracted
    /// from the paradigm table row.
    #[must_use]
    pub fn from_aligned(forms: [String; 6]) -> VerbFormTable {
        let mut iter = Pronoun::ALL.into_iter().zip(forms);
        let rows = std::array::from_fn(|_| {
            let (pronoun, form) = iter.next().expect("exactly six pronouns");
            (pronoun, vec![VerbForm::plain(form)])
        });

        VerbFormTable { rows }
    }

    /// Iterates the rows in display order.
    pub fn rows(&self) -> impl Iterator<Item = (Pronoun, &[VerbForm])> {
        self.rows
            .iter()
            .map(|(pronoun, forms)| (*pronoun, forms.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_row(label: &str, forms: &[&str]) -> String {
        let cells: String = forms
            .iter()
            .map(|form| format!("<td><span>{form}</span></td>"))
            .collect();

        format!("<tr><th>{label}</th>{cells}</tr>")
    }

    /// A nine-row stand-in for the paradigm table, enough to cover the rows
    /// the pipeline addresses.
    fn paradigm_html(forms: &[&str]) -> String {
        let mut rows = String::new();
        // rows 0-4: title and non-finite forms; lookup values 1,1,1,0,0
        rows.push_str("<tr><th>conjugation</th><td colspan=\"2\">-ar verb</td></tr>");
        rows.push_str("<tr><th>infinitive</th><td>x</td><td>y</td></tr>");
        rows.push_str("<tr><th>gerund</th><td>x</td><td>y</td></tr>");
        rows.push_str("<tr><th colspan=\"7\">participles</th></tr>");
        rows.push_str("<tr><th colspan=\"7\">masculine</th></tr>");
        // row 5: singular/plural header; lookup 2
        rows.push_str(
            "<tr><th></th><th colspan=\"3\">singular</th><th colspan=\"3\">plural</th></tr>",
        );
        // row 6: person header; lookup 4
        rows.push_str(
            "<tr><th></th><th>1st</th><th>2nd</th><th>3rd</th><th>1st</th><th>2nd</th>\
             <th>3rd</th></tr>",
        );
        // row 7: pronoun header; lookup 6
        rows.push_str(
            "<tr><th></th><th>yo</th><th>tú/vos</th><th>él</th><th>nosotros</th>\
             <th>vosotros</th><th>ustedes</th></tr>",
        );
        // row 8: present indicative; lookup 5 deletes the vosotros form
        rows.push_str(&span_row("present", forms));

        format!("<table>{rows}</table>")
    }

    fn parsed_table(html: &str) -> (Tree, NodeId) {
        let tree = Tree::from_html(&format!("<div class=\"NavContent\">{html}</div>"));
        let table = find_paradigm_table(&tree).expect("table present");

        (tree, table)
    }

    #[test]
    fn fold_removes_single_span_cells() {
        let html = paradigm_html(&["hablo", "hablas", "habla", "hablamos", "habláis", "hablan"]);
        let (mut tree, table) = parsed_table(&html);
        let rows = table_rows(&tree, table);
        let before = row_cells(&tree, rows[8]).len();

        fold_dialect_column(&mut tree, table);

        let after = row_cells(&tree, rows[8]);
        assert_eq!(after.len(), before - 1);
        let text = tree.text_of(rows[8]);
        assert!(!text.contains("habláis"));
        assert!(text.contains("hablamos"));
    }

    #[test]
    fn fold_decrements_multi_span_cells() {
        let html = paradigm_html(&["a", "b", "c", "d", "e", "f"]);
        let (mut tree, table) = parsed_table(&html);
        let rows = table_rows(&tree, table);
        // row 3's lookup is cell 0, which spans 7 columns
        let cell = row_cells(&tree, rows[3])[0];
        assert_eq!(colspan(&tree, cell), 7);

        fold_dialect_column(&mut tree, table);

        assert_eq!(row_cells(&tree, rows[3]).len(), 1);
        assert_eq!(colspan(&tree, cell), 6);
    }

    #[test]
    fn fold_tolerates_short_rows_and_short_tables() {
        let (mut tree, table) = parsed_table("<table><tr><td>only</td></tr></table>");

        // row 0's lookup is cell 1, which does not exist
        fold_dialect_column(&mut tree, table);

        let rows = table_rows(&tree, table);
        assert_eq!(row_cells(&tree, rows[0]).len(), 1);
    }

    #[test]
    fn compaction_keeps_only_the_label_cell() {
        let mut rows: String = (0..14)
            .map(|i| format!("<tr><th>r{i}</th><td>a</td><td>b</td></tr>"))
            .collect();
        rows.push_str("<tr><th>persons</th><td>yo</td><td>tú</td><td>él</td></tr>");
        let (mut tree, table) = parsed_table(&format!("<table>{rows}</table>"));

        compact_boilerplate_rows(&mut tree, table);

        let rows = table_rows(&tree, table);
        assert_eq!(row_cells(&tree, rows[14]).len(), 1);
        assert_eq!(tree.text_of(rows[14]), "persons");
        // a non-listed row keeps its cells
        assert_eq!(row_cells(&tree, rows[13]).len(), 3);
    }

    #[test]
    fn present_indicative_forms_skip_the_label_cell() {
        let html = paradigm_html(&["hablo", "hablas", "habla", "hablamos", "habláis", "hablan"]);
        let (mut tree, table) = parsed_table(&html);

        fold_dialect_column(&mut tree, table);
        let forms = present_indicative_forms(&tree, table).unwrap();

        assert_eq!(forms, vec!["hablo", "hablas", "habla", "hablamos", "hablan"]);
    }

    #[test]
    fn five_forms_duplicate_the_tu_slot() {
        let forms = vec!["hablo", "hablas", "habla", "hablamos", "hablan"]
            .into_iter()
            .map(String::from)
            .collect();

        let aligned = align_forms(forms).unwrap();

        assert_eq!(
            aligned,
            ["hablo", "hablas", "hablas", "habla", "hablamos", "hablan"]
        );
    }

    #[test]
    fn hay_duplicates_the_yo_slot_instead() {
        let forms = vec!["ha", "has", "hay", "hemos", "han"]
            .into_iter()
            .map(String::from)
            .collect();

        let aligned = align_forms(forms).unwrap();

        assert_eq!(aligned, ["ha", "ha", "has", "hay", "hemos", "han"]);
    }

    #[test]
    fn unexpected_form_counts_do_not_align() {
        assert!(align_forms(vec![String::from("solo")]).is_none());
        assert!(align_forms(Vec::new()).is_none());
    }

    #[test]
    fn verb_form_table_from_expansion_is_keyed_by_person() {
        let mut forms = BTreeMap::new();
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
        let rows: Vec<_> = table.rows().collect();

        assert_eq!(rows[2].0, Pronoun::Vos);
        assert_eq!(rows[2].1[0].form, "hablás");
    }

    #[test]
    fn verb_form_table_requires_all_slots() {
        let mut forms = BTreeMap::new();
        forms.insert(String::from("pres_1s"), vec![VerbForm::plain("hablo")]);

        assert!(VerbFormTable::from_expansion(&forms).is_none());
    }
}
