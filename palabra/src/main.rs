use std::sync::Arc;

mod anki;
mod config;
mod error;
mod freq;
mod render;
mod session;

use argh::FromArgs;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

use wiktionary_es::conjugation::VerbFormTable;
use wiktionary_es::entry::EntryOptions;
use wiktionary_es::filters::FilterContext;
use wiktionary_es::translations::{TranslationBlock, build_blocks};
use wiktionary_es::{Client, Entry, Tree};

use anki::AnkiClient;
use config::Config;
use error::Error;
use freq::FrequencyList;
use session::{Completion, Outcome, Session};

/// Looks up Spanish words on the English Wiktionary. Queries ending in `?`
/// are treated as English words and answered with their Spanish translations.
#[derive(Debug, FromArgs)]
struct Opts {
    /// path to config file
    #[argh(option, default = "String::from(\"palabra.toml\")")]
    config_path: String,
    /// suppress paragraphs, showing only headings, lists and tables
    #[argh(switch)]
    compact: bool,
    /// words to look up; reads queries from standard input when omitted
    #[argh(positional)]
    queries: Vec<String>,
}

/// Everything the presentation side needs, shared across completions.
struct App {
    compact: bool,
    translation_options: EntryOptions,
    frequency: Option<FrequencyList>,
    anki: Option<AnkiClient>,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("palabra=info")),
        )
        .init();

    // Parse command-line arguments
    let opts: Opts = argh::from_env();

    let config = Config::load(&opts.config_path)?;

    let client = Arc::new(
        Client::try_new()
            .map_err(Error::Lookup)?
            .with_base_url(config.wiki.base_url.clone()),
    );
    let entry_options = Arc::new(config.entry_options()?);
    let translation_options = Arc::new(config.translation_options()?);

    let frequency = match &config.display.frequency_list {
        Some(path) => Some(FrequencyList::load(path).map_err(Error::FrequencyList)?),
        None => None,
    };

    let app = App {
        compact: opts.compact || config.display.compact,
        translation_options: (*translation_options).clone(),
        frequency,
        anki: connect_anki(&config).await,
    };

    let (mut session, mut rx) = Session::new();

    if opts.queries.is_empty() {
        // Interactive mode: each new line supersedes the in-flight lookup.
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.map_err(Error::Io)? else { break };
                    let query = line.trim();
                    if query.is_empty() {
                        continue;
                    }

                    session.dispatch(
                        query,
                        lookup(
                            Arc::clone(&client),
                            query.to_string(),
                            Arc::clone(&entry_options),
                            Arc::clone(&translation_options),
                        ),
                    );
                }
                Some(completion) = rx.recv() => {
                    present(&app, &session, completion).await;
                }
            }
        }
    } else {
        for query in &opts.queries {
            let token = session.dispatch(
                query.clone(),
                lookup(
                    Arc::clone(&client),
                    query.clone(),
                    Arc::clone(&entry_options),
                    Arc::clone(&translation_options),
                ),
            );

            while let Some(completion) = rx.recv().await {
                let done = completion.token == token;
                present(&app, &session, completion).await;
                if done {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Probes the flashcard endpoint once at startup so its permission prompt
/// appears before the first lookup, not after.
async fn connect_anki(config: &Config) -> Option<AnkiClient> {
    if !config.anki.enabled {
        return None;
    }

    let client = AnkiClient::new(&config.anki);
    match client.probe().await {
        Ok(()) => Some(client),
        Err(error) => {
            warn!(%error, "flashcard endpoint unreachable; disabling integration");

            None
        }
    }
}

/// Resolves one query end to end. A trailing `?` flips the direction: the
/// query is an English word and the answer is its Spanish translations.
async fn lookup(
    client: Arc<Client>,
    query: String,
    entry_options: Arc<EntryOptions>,
    translation_options: Arc<EntryOptions>,
) -> Result<Outcome, Error> {
    if let Some(word) = query.strip_suffix('?') {
        let page = client.fetch_page(word.trim()).await?;
        let blocks = Entry::extract_translations(&page.html, &translation_options)?;

        return Ok(Outcome::Translations(blocks));
    }

    let page = client.fetch_page(&query).await?;
    let mut entry = Entry::extract(&page.html, &page.title, &entry_options)?;

    // Prefer forms expanded straight from the conjugation template; fall back
    // to the table scraped out of the page when expansion fails.
    if let Some(wikitext) = &page.wikitext {
        match client.expand_conjugation(&page.title, wikitext).await {
            Ok(Some(forms)) => {
                if let Some(table) = VerbFormTable::from_expansion(&forms) {
                    entry.quick_table = Some(table);
                }
            }
            Ok(None) => {}
            Err(error) => {
                warn!(%error, title = %page.title, "template expansion failed, keeping scraped forms");
            }
        }
    }

    Ok(Outcome::Entry(Box::new(entry)))
}

async fn present(app: &App, session: &Session, completion: Completion) {
    if !session.is_current(completion.token) {
        debug!(
            token = completion.token,
            query = %completion.query,
            "discarding superseded completion",
        );

        return;
    }

    match completion.result {
        Ok(Outcome::Entry(entry)) => present_entry(app, &completion.query, &entry).await,
        Ok(Outcome::Translations(blocks)) => present_translations(app, &blocks),
        Err(error) => present_error(&completion.query, &error),
    }
}

async fn present_entry(app: &App, query: &str, entry: &Entry) {
    println!("{}", entry.title);

    if let Some(rank) = app.frequency.as_ref().and_then(|list| list.rank(query)) {
        println!("frequency rank: {rank}");
    }

    if let Some(table) = &entry.quick_table {
        print!("{}", render::render_quick_table(table));
    }

    println!("{}", render::render_tree(&entry.tree, app.compact));

    if let Some(anki) = &app.anki {
        record_flashcard(anki, query, entry).await;
    }
}

fn present_translations(app: &App, blocks: &[TranslationBlock]) {
    if blocks.is_empty() {
        println!("No translations available");

        return;
    }

    let ctx: FilterContext = app.translation_options.filter_context();
    let mut tree = Tree::from_html("");
    let root = tree.root();
    build_blocks(&mut tree, root, blocks, &ctx);

    println!("{}", render::render_tree(&tree, app.compact));
}

fn present_error(query: &str, error: &Error) {
    match error {
        Error::Lookup(wiktionary_es::Error::LanguageNotFound { language }) => {
            println!("no {language} entry for \"{query}\"");
        }
        Error::Lookup(wiktionary_es::Error::Api { code, info }) => {
            println!("wiki error {code}: {info}");
        }
        other => error!(%other, query, "lookup failed"),
    }
}

/// Adds the word to the configured deck unless a note for it already exists.
async fn record_flashcard(anki: &AnkiClient, word: &str, entry: &Entry) {
    let Some(meaning) = entry.first_definition() else {
        debug!(%word, "no definition to put on a flashcard");

        return;
    };

    match anki.has_note(word).await {
        Ok(true) => debug!(%word, "flashcard already exists"),
        Ok(false) => {
            if let Err(error) = anki.add_note(word, &meaning).await {
                warn!(%error, %word, "could not add flashcard");
            }
        }
        Err(error) => warn!(%error, %word, "could not check for existing flashcard"),
    }
}
