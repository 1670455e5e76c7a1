//! Command-line shell for the library catalog.
//!
//! # Responsibility
//! - Turn one invocation into exactly one `CatalogService` call.
//! - Render modeled outcomes; validation and uniqueness stay in core.

use clap::{Parser, Subcommand};
use library_core::{
    core_version, default_log_dir, default_log_level, init_logging, AddOutcome, BookRecord,
    CatalogError, CatalogService, CatalogStats, ConfigError, NewBook, ReadStatus, RecordStoreClient, RemoveOutcome,
    RestRecordStore, SearchOutcome, SqliteRecordStore, StoreConfig,
};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Manage a small catalog of books in a hosted table store.
#[derive(Parser, Debug)]
#[command(name = "library", version)]
struct Args {
    /// Log level: trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Use a local SQLite file instead of the hosted store
    #[arg(long, global = true)]
    local_db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a new book
    Add {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        author: String,
        /// Publication year
        #[arg(long, allow_negative_numbers = true)]
        year: Option<i32>,
        #[arg(long, default_value = "")]
        genre: String,
        /// Read status: yes|no
        #[arg(long)]
        read: Option<ReadStatus>,
    },

    /// Remove every book with this exact title
    Remove {
        title: String,
    },

    /// Display all books
    List,

    /// Search for a book by exact title
    Search {
        #[arg(default_value = "")]
        title: String,
    },

    /// Display read/unread statistics
    Stats,
}

fn main() -> ExitCode {
    let Args {
        log_level,
        log_dir,
        local_db,
        command,
    } = Args::parse();

    let level = log_level.unwrap_or_else(|| default_log_level().to_string());
    let log_dir = log_dir.unwrap_or_else(default_log_dir);
    if let Err(err) = init_logging(&level, &log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }
    info!(
        "event=cli_start module=cli status=ok core_version={} backend={}",
        core_version(),
        if local_db.is_some() { "sqlite" } else { "rest" }
    );

    match local_db {
        Some(path) => match SqliteRecordStore::open(&path) {
            Ok(store) => run(&CatalogService::new(store), command),
            Err(err) => {
                error!("event=cli_start module=cli status=error error_code=local_store_open_failed error={err}");
                eprintln!("error: failed to open local store `{}`: {err}", path.display());
                ExitCode::FAILURE
            }
        },
        None => {
            let config = match load_store_config(None) {
                Ok(config) => config,
                Err(err) => {
                    error!("event=cli_start module=cli status=error error_code=config_missing error={err}");
                    eprintln!("error: {err}");
                    return ExitCode::FAILURE;
                }
            };
            match RestRecordStore::new(&config) {
                Ok(store) => run(&CatalogService::with_table(store, config.table), command),
                Err(err) => {
                    eprintln!("error: failed to build store client: {err}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

/// Resolves store configuration, filling unset variables from a `.env` file.
///
/// `dotenv_file` defaults to `.env` in the working directory or a parent.
/// Variables already set in the process environment win over the file.
fn load_store_config(dotenv_file: Option<&Path>) -> Result<StoreConfig, ConfigError> {
    let loaded = match dotenv_file {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    match loaded {
        Ok(path) => info!(
            "event=dotenv_load module=cli status=ok path={}",
            path.display()
        ),
        Err(err) if err.not_found() => {
            info!("event=dotenv_load module=cli status=skipped reason=not_found")
        }
        Err(err) => warn!("event=dotenv_load module=cli status=error error={err}"),
    }
    StoreConfig::from_env()
}

fn run<C: RecordStoreClient>(service: &CatalogService<C>, command: Command) -> ExitCode {
    let result = match command {
        Command::Add {
            title,
            author,
            year,
            genre,
            read,
        } => {
            let book = NewBook {
                title,
                author,
                publication_year: year,
                genre,
                read_status: read,
            };
            service.add_book(&book).map(|outcome| render_add(&outcome))
        }
        Command::Remove { title } => service
            .remove_book(&title)
            .map(|outcome| render_remove(&title, outcome)),
        Command::List => service.list_all_books().map(|books| {
            if books.is_empty() {
                println!("No books found in the library.");
            } else {
                print_books(&books);
            }
        }),
        Command::Search { title } => service.search_by_title(&title).map(|outcome| match outcome {
            SearchOutcome::EmptyQuery => println!("warning: please enter a book title to search."),
            SearchOutcome::NoResults => println!("warning: no book found with this title."),
            SearchOutcome::Found(books) => {
                println!("Search results:");
                print_books(&books);
            }
        }),
        Command::Stats => service.compute_statistics().map(|stats| {
            for line in stats_lines(&stats) {
                println!("{line}");
            }
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => render_failure(&err),
    }
}

fn render_add(outcome: &AddOutcome) {
    match outcome {
        AddOutcome::Added(_) => println!("Book added successfully!"),
        AddOutcome::Duplicate => println!("warning: this book already exists in the library."),
        AddOutcome::InvalidInput(err) => {
            println!("warning: please fill all fields before adding the book ({err}).")
        }
    }
}

fn render_remove(title: &str, outcome: RemoveOutcome) {
    match outcome {
        RemoveOutcome::Removed { count: 1 } => println!("Book '{title}' removed successfully!"),
        RemoveOutcome::Removed { count } => {
            println!("{count} books titled '{title}' removed successfully!")
        }
        RemoveOutcome::NotFound => println!("warning: no book found with the title '{title}'."),
    }
}

fn stats_lines(stats: &CatalogStats) -> Vec<String> {
    if stats.total == 0 {
        return vec!["No books available to display statistics.".to_string()];
    }
    vec![
        format!("Total books:  {}", stats.total),
        format!("Read books:   {}", stats.read),
        format!("Unread books: {}", stats.unread),
    ]
}

fn render_failure(err: &CatalogError) -> ExitCode {
    error!("event=cli_command module=cli status=error error={err}");
    eprintln!("error: the library store could not complete the request.");
    eprintln!("  cause: {err}");
    ExitCode::FAILURE
}

const HEADERS: [&str; 5] = ["Title", "Author", "Publication Year", "Genre", "Read Status"];

fn print_books(books: &[BookRecord]) {
    let rows: Vec<[String; 5]> = books
        .iter()
        .map(|book| {
            [
                book.title.clone(),
                book.author.clone(),
                book.publication_year.to_string(),
                book.genre.clone(),
                book.read_status.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    println!("{}", format_line(&HEADERS.map(str::to_string), &widths));
    println!(
        "{}",
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-")
    );
    for row in &rows {
        println!("{}", format_line(row, &widths));
    }
}

fn format_line(cells: &[String; 5], widths: &[usize; 5]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}
