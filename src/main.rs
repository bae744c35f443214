use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;

use morphhb_hapax::books::BookMap;
use morphhb_hapax::pipeline::{self, ExtractConfig, RunSummary};
use morphhb_hapax::{logging, report};

#[derive(Parser)]
#[command(name = "morphhb-hapax")]
#[command(about = "Flatten OSIS-tagged Hebrew Bible books into a per-word morphology table with hapax flags")]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode - warnings only, no progress bar
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every word of every book into a CSV table
    Extract {
        /// Directory holding the book files
        #[arg(default_value = ".")]
        corpus_dir: PathBuf,

        /// Morphology dictionary (relative paths are taken from the corpus directory)
        #[arg(long, default_value = "Oshm.xml")]
        morphology: PathBuf,

        /// Output CSV file
        #[arg(short, long, default_value = "verse_morphology.csv")]
        output: PathBuf,

        /// Book map YAML replacing the canonical book order
        #[arg(long)]
        books: Option<PathBuf>,
    },

    /// Render a verse range of an extracted table as a XeLaTeX document
    Report {
        /// CSV produced by `extract`
        input: PathBuf,

        /// Verse ID prefix to keep
        #[arg(long, default_value = "Gen.1.")]
        prefix: String,

        /// Document title
        #[arg(long, default_value = "Genesis Chapter 1")]
        title: String,

        /// Output .tex file
        #[arg(long, default_value = "verses.tex")]
        tex: PathBuf,

        /// Run xelatex on the generated file
        #[arg(long)]
        compile: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Extract {
            corpus_dir,
            morphology,
            output,
            books,
        } => {
            let book_map = BookMap::resolve(books.as_deref(), &corpus_dir)
                .context("Failed to load book map")?;
            let config = ExtractConfig::new(corpus_dir, &morphology, output).with_books(book_map);
            run_extract(&config, cli.quiet)
        }
        Commands::Report {
            input,
            prefix,
            title,
            tex,
            compile,
        } => run_report(&input, report::ReportOptions { prefix, title }, &tex, compile),
    }
}

fn run_extract(config: &ExtractConfig, quiet: bool) -> Result<()> {
    if !quiet {
        println!("Corpus: {}", config.corpus_dir.display());
        println!("Morphology: {}", config.morphology.display());
        println!("Output: {}", config.output.display());
        println!("Books: {}", config.books.len());
        println!();
    }

    let start_time = Instant::now();
    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(config.books.len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner} [{bar:30}] {pos}/{len} {msg}")
            .context("Invalid progress template")?,
    );

    let summary = pipeline::run(config, |label| {
        pb.set_message(label.to_string());
        pb.inc(1);
    })
    .with_context(|| format!("Failed to write {}", config.output.display()))?;
    pb.finish_and_clear();

    if !quiet {
        print_stats(&summary, start_time);
    }
    Ok(())
}

fn print_stats(summary: &RunSummary, start_time: Instant) {
    let corpus = &summary.build.corpus;
    let stats = corpus.stats();
    let aggregate = corpus.aggregate();
    let elapsed = start_time.elapsed();

    println!("============================================================");
    println!("Morphology descriptions: {}", summary.dictionary_entries);
    println!("Books processed: {}", summary.build.books_processed);
    println!("Books skipped: {}", summary.build.skipped.len());
    for skipped in &summary.build.skipped {
        println!("  {}: {}", skipped.label, skipped.reason);
    }
    println!("Chapters: {}", stats.chapters);
    println!("Verses: {}", stats.verses);
    println!("Words: {}", stats.words);
    println!("Rows written: {}", summary.rows_written);
    println!(
        "Lemmas: {} distinct, {} hapax",
        aggregate.lemmas.distinct(),
        aggregate.lemmas.hapax_count()
    );
    println!(
        "Lemma numbers: {} distinct, {} hapax",
        aggregate.lemma_numbers.distinct(),
        aggregate.lemma_numbers.hapax_count()
    );
    println!("Unknown morph codes: {}", stats.unknown_morphs);
    println!("Lemmas without number: {}", stats.lemmas_without_number);
    println!("Missing attributes: {}", stats.missing_attributes);
    println!("Time: {}m {}s", elapsed.as_secs() / 60, elapsed.as_secs() % 60);
    println!("============================================================");
}

fn run_report(
    input: &Path,
    options: report::ReportOptions,
    tex: &Path,
    compile: bool,
) -> Result<()> {
    let rows = report::load_rows(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    report::write_tex(&rows, &options, tex)?;

    if compile {
        let status = report::compile(tex)?;
        if !status.success() {
            eprintln!("{} exited with {}", report::TYPESETTER, status);
        }
    }
    println!("LaTeX file created: {}", tex.display());
    Ok(())
}
