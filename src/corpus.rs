//! Book traversal (book → chapter → verse → word) and the corpus record store.

use std::io::BufRead;
use std::path::Path;

use quick_xml::events::BytesStart;

use crate::errors::{ExtractError, MarkupError};
use crate::frequency::FrequencyAggregate;
use crate::lemma::{extract_lemma_number, NO_NUMBER};
use crate::markup::{self, Node};
use crate::morphology::{MorphologyDictionary, ParsedMorph};
use crate::source;

/// One tagged word token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordRecord {
    pub word_text: String,
    pub lemma: String,
    pub lemma_number: String,
    pub raw_morph: String,
    pub parsed_morph: ParsedMorph,
}

impl WordRecord {
    pub fn new(
        lemma: String,
        raw_morph: String,
        word_text: String,
        dictionary: &MorphologyDictionary,
    ) -> Self {
        let lemma_number = extract_lemma_number(&lemma);
        let parsed_morph = dictionary.parse_morphology(&raw_morph);
        Self {
            word_text,
            lemma,
            lemma_number,
            raw_morph,
            parsed_morph,
        }
    }
}

/// Words of one verse, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseGroup {
    pub verse_id: String,
    pub words: Vec<WordRecord>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TraversalStats {
    pub books: usize,
    pub chapters: usize,
    pub verses: usize,
    pub words: usize,
    pub unknown_morphs: usize,
    pub lemmas_without_number: usize,
    pub missing_attributes: usize,
}

impl TraversalStats {
    fn absorb(&mut self, other: &TraversalStats) {
        self.books += other.books;
        self.chapters += other.chapters;
        self.verses += other.verses;
        self.words += other.words;
        self.unknown_morphs += other.unknown_morphs;
        self.lemmas_without_number += other.lemmas_without_number;
        self.missing_attributes += other.missing_attributes;
    }
}

/// Everything read from one book file, not yet committed to a [`Corpus`].
#[derive(Debug, Clone)]
pub struct BookExtract {
    pub label: String,
    pub verses: Vec<VerseGroup>,
    pub stats: TraversalStats,
}

/// Namespace of a file's root element, applied to every path step in that file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryContext {
    namespace: Option<String>,
}

impl QueryContext {
    pub fn new(namespace: Option<&str>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// True when `element` has local name `name` in this file's namespace.
    pub fn matches(&self, namespace: Option<&str>, element: &BytesStart<'_>, name: &str) -> bool {
        self.namespace() == namespace && element.local_name().as_ref() == name.as_bytes()
    }
}

struct PendingWord {
    depth: usize,
    lemma: Option<String>,
    morph: Option<String>,
    text: String,
    leading: bool,
}

struct Traversal<'d> {
    label: &'d str,
    dictionary: &'d MorphologyDictionary,
    context: Option<QueryContext>,
    book_depth: Option<usize>,
    chapter_depth: Option<usize>,
    verse: Option<(usize, VerseGroup)>,
    word: Option<PendingWord>,
    verses: Vec<VerseGroup>,
    stats: TraversalStats,
}

impl<'d> Traversal<'d> {
    fn new(label: &'d str, dictionary: &'d MorphologyDictionary) -> Self {
        Self {
            label,
            dictionary,
            context: None,
            book_depth: None,
            chapter_depth: None,
            verse: None,
            word: None,
            verses: Vec::new(),
            stats: TraversalStats::default(),
        }
    }

    fn open(
        &mut self,
        depth: usize,
        namespace: Option<&str>,
        element: &BytesStart<'_>,
    ) -> Result<(), MarkupError> {
        if depth == 0 {
            let context = QueryContext::new(namespace);
            tracing::debug!(
                "{}: namespace {}",
                self.label,
                context.namespace().unwrap_or("(none)")
            );
            self.context = Some(context);
            return Ok(());
        }
        if let Some(word) = self.word.as_mut() {
            word.leading = false;
            return Ok(());
        }
        let Some(context) = self.context.as_ref() else {
            return Ok(());
        };

        if self.book_depth.is_none() {
            if context.matches(namespace, element, "div")
                && markup::attribute(element, "type")?.as_deref() == Some("book")
            {
                let book_id = markup::attribute(element, "osisID")?.unwrap_or_default();
                tracing::info!("[BOOK] Processing book '{}'", book_id);
                self.book_depth = Some(depth);
                self.stats.books += 1;
            }
        } else if self.chapter_depth.is_none() {
            if context.matches(namespace, element, "chapter") {
                let chapter_id = markup::attribute(element, "osisID")?.unwrap_or_default();
                tracing::debug!("  [CHAPTER] Processing chapter '{}'", chapter_id);
                self.chapter_depth = Some(depth);
                self.stats.chapters += 1;
            }
        } else if self.verse.is_none() {
            if context.matches(namespace, element, "verse") {
                let verse_id = markup::attribute(element, "osisID")?.unwrap_or_default();
                tracing::trace!("    [VERSE] Processing verse '{}'", verse_id);
                self.verse = Some((
                    depth,
                    VerseGroup {
                        verse_id,
                        words: Vec::new(),
                    },
                ));
                self.stats.verses += 1;
            }
        } else if context.matches(namespace, element, "w") {
            self.word = Some(PendingWord {
                depth,
                lemma: markup::attribute(element, "lemma")?,
                morph: markup::attribute(element, "morph")?,
                text: String::new(),
                leading: true,
            });
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if let Some(word) = self.word.as_mut().filter(|w| w.leading) {
            word.text.push_str(text);
        }
    }

    fn close(&mut self, depth: usize) {
        if self.word.as_ref().is_some_and(|w| w.depth == depth) {
            if let Some(word) = self.word.take() {
                self.finish_word(word);
            }
        } else if self.verse.as_ref().is_some_and(|(d, _)| *d == depth) {
            if let Some((_, verse)) = self.verse.take() {
                self.verses.push(verse);
            }
        } else if self.chapter_depth == Some(depth) {
            self.chapter_depth = None;
        } else if self.book_depth == Some(depth) {
            self.book_depth = None;
        }
    }

    fn finish_word(&mut self, word: PendingWord) {
        let Some((_, verse)) = self.verse.as_mut() else {
            return;
        };

        let lemma = word.lemma.unwrap_or_else(|| {
            tracing::warn!("{}: word without lemma", verse.verse_id);
            self.stats.missing_attributes += 1;
            String::new()
        });
        let morph = word.morph.unwrap_or_else(|| {
            tracing::warn!("{}: word without morph code", verse.verse_id);
            self.stats.missing_attributes += 1;
            String::new()
        });

        let record = WordRecord::new(lemma, morph, word.text, self.dictionary);
        if !record.parsed_morph.known {
            tracing::debug!(
                "Morph code '{}' not found in morphology descriptions",
                record.raw_morph
            );
            self.stats.unknown_morphs += 1;
        }
        if record.lemma_number == NO_NUMBER {
            self.stats.lemmas_without_number += 1;
        }
        tracing::trace!(
            "      [WORD] Lemma: '{}', Lemma Number: '{}', Morph: '{}', Text: '{}', Parsed Morph: {}",
            record.lemma,
            record.lemma_number,
            record.raw_morph,
            record.word_text,
            record.parsed_morph
        );
        self.stats.words += 1;
        verse.words.push(record);
    }
}

/// Walk one book document and collect its verses.
///
/// Nothing is counted here; the result is committed with [`Corpus::ingest`]
/// only if the whole document parsed.
pub fn read_book<R: BufRead>(
    reader: R,
    label: &str,
    dictionary: &MorphologyDictionary,
) -> Result<BookExtract, MarkupError> {
    let mut traversal = Traversal::new(label, dictionary);

    markup::walk(reader, |node| {
        match node {
            Node::Open {
                depth,
                namespace,
                element,
            } => traversal.open(depth, namespace, element)?,
            Node::Text(text) => traversal.text(text),
            Node::Close { depth } => traversal.close(depth),
        }
        Ok(())
    })?;

    Ok(BookExtract {
        label: label.to_string(),
        verses: traversal.verses,
        stats: traversal.stats,
    })
}

pub fn load_book(
    path: &Path,
    label: &str,
    dictionary: &MorphologyDictionary,
) -> Result<BookExtract, ExtractError> {
    tracing::info!("Loading verses from {} for book '{}'", path.display(), label);
    let reader = source::open(path)?;
    read_book(reader, label, dictionary).map_err(|e| ExtractError::malformed(path, e))
}

/// Record store plus the frequency tallies for everything stored in it.
#[derive(Debug, Default, Clone)]
pub struct Corpus {
    verses: Vec<VerseGroup>,
    aggregate: FrequencyAggregate,
    stats: TraversalStats,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every word of `book` and append its verses after those already stored.
    pub fn ingest(&mut self, book: BookExtract) {
        for word in book.verses.iter().flat_map(|v| v.words.iter()) {
            self.aggregate.record(word);
        }
        tracing::info!(
            "{}: {} book(s), {} chapters, {} verses, {} words",
            book.label,
            book.stats.books,
            book.stats.chapters,
            book.stats.verses,
            book.stats.words
        );
        self.stats.absorb(&book.stats);
        self.verses.extend(book.verses);
    }

    pub fn verses(&self) -> &[VerseGroup] {
        &self.verses
    }

    pub fn words(&self) -> impl Iterator<Item = (&VerseGroup, &WordRecord)> {
        self.verses
            .iter()
            .flat_map(|verse| verse.words.iter().map(move |word| (verse, word)))
    }

    pub fn aggregate(&self) -> &FrequencyAggregate {
        &self.aggregate
    }

    pub fn stats(&self) -> &TraversalStats {
        &self.stats
    }

    pub fn word_count(&self) -> usize {
        self.stats.words
    }
}
