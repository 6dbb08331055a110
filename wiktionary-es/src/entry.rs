//! The extraction pipeline for a single dictionary entry.

use url::Url;

use crate::conjugation::{self, VerbFormTable};
use crate::filters::{FilterContext, run_filters};
use crate::pronunciation::{self, DEFAULT_DIALECT_MARKERS};
use crate::section::extract_language;
use crate::tree::Tree;
use crate::{Error, translations};

/// Classes stripped from the document before extraction: per-section edit
/// links and footnote reference markers.
const CHROME_CLASSES: [&str; 2] = ["mw-editsection", "reference"];

/// Knobs for the extraction pipeline.
#[derive(Debug, Clone)]
pub struct EntryOptions {
    /// The language section to extract.
    pub language: String,
    /// Regional labels used to disambiguate pronunciations.
    pub dialect_markers: Vec<String>,
    /// Origin the document came from, for the link-rewrite filter.
    pub origin: Url,
}

impl Default for EntryOptions {
    fn default() -> Self {
        EntryOptions {
            language: String::from("Spanish"),
            dialect_markers: DEFAULT_DIALECT_MARKERS
                .iter()
                .map(ToString::to_string)
                .collect(),
            origin: Url::parse("https://en.wiktionary.org").expect("valid default origin"),
        }
    }
}

impl EntryOptions {
    /// Returns the filter context for these options.
    #[must_use]
    pub fn filter_context(&self) -> FilterContext {
        FilterContext::new(self.origin.clone(), self.language.clone())
    }
}

/// A fully transformed dictionary entry, ready to hand to a presenter.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Display title: `<word> ipa` when a pronunciation was resolved, the
    /// bare word otherwise.
    pub title: String,
    /// The pronunciation extracted from the consumed pronunciation scope.
    pub pronunciation: Option<String>,
    /// The present-indicative quick table, when a paradigm table was found.
    /// Built positionally here; callers may replace it with the
    /// person-tagged table from a template expansion.
    pub quick_table: Option<VerbFormTable>,
    /// The retained, transformed section tree.
    pub tree: Tree,
}

impl Entry {
    /// Runs the whole pipeline over a rendered page.
    ///
    /// Strips chrome, carves out the language section, rewrites the retained
    /// subtree in place, consumes the pronunciation scope and transforms the
    /// paradigm table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LanguageNotFound`] if the page has no section for the
    /// requested language.
    pub fn extract(html: &str, word: &str, options: &EntryOptions) -> Result<Entry, Error> {
        let mut tree = Tree::from_html(html);

        for class in CHROME_CLASSES {
            tree.remove_by_class(class);
        }

        extract_language(&mut tree, &options.language)?;

        let ctx = options.filter_context();
        let root = tree.root();
        run_filters(&mut tree, root, &ctx);

        let pronunciation = pronunciation::resolve(&mut tree, &options.dialect_markers);
        let title = match &pronunciation {
            Some(ipa) => format!("<{word}> {ipa}"),
            None => word.to_string(),
        };

        let quick_table = conjugation::find_paradigm_table(&tree).and_then(|table| {
            conjugation::fold_dialect_column(&mut tree, table);
            conjugation::compact_boilerplate_rows(&mut tree, table);

            conjugation::present_indicative_forms(&tree, table)
                .and_then(conjugation::align_forms)
                .map(VerbFormTable::from_aligned)
        });

        Ok(Entry {
            title,
            pronunciation,
            quick_table,
            tree,
        })
    }

    /// Extracts the translation blocks of a page, for the reverse lookup
    /// direction. The retained section is carved the same way; an empty
    /// result means no translations are available.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LanguageNotFound`] if the page has no section for the
    /// requested language.
    pub fn extract_translations(
        html: &str,
        options: &EntryOptions,
    ) -> Result<Vec<translations::TranslationBlock>, Error> {
        let mut tree = Tree::from_html(html);

        for class in CHROME_CLASSES {
            tree.remove_by_class(class);
        }

        extract_language(&mut tree, &options.language)?;
        let root = tree.root();
        run_filters(&mut tree, root, &options.filter_context());

        Ok(translations::extract_translations(&tree))
    }

    /// The first definition in the retained section, used as the primary
    /// meaning for flashcards.
    #[must_use]
    pub fn first_definition(&self) -> Option<String> {
        let list = self
            .tree
            .descendants(self.tree.root())
            .into_iter()
            .find(|&id| self.tree.tag(id) == Some("ol"))?;
        let item = self
            .tree
            .children(list)
            .iter()
            .copied()
            .find(|&child| self.tree.tag(child) == Some("li"))?;

        let text = self.tree.text_of(item).trim().to_string();
        if text.is_empty() { None } else { Some(text) }
    }
}
