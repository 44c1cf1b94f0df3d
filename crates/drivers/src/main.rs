mod config;
mod logging;
mod ui;

use std::process::ExitCode;

use config::ShelfConfig;
use hondana_adapters::{
    present_progress_line, present_reading_now_row, present_search_row, GoogleBooksClient,
    SqliteProgressStore, NO_READING_NOW_MESSAGE, NO_RESULTS_MESSAGE, PROGRESS_SAVED_MESSAGE,
};
use hondana_application::{
    ApplicationService, BootstrapStoreCommand, ReadingNowQuery, SaveProgressCommand,
    SearchBooksCommand, StoredInfoQuery,
};
use hondana_domain::BookId;

fn main() -> ExitCode {
    logging::init_logging();
    let args: Vec<String> = std::env::args().collect();
    let config = ShelfConfig::default();

    let service = build_application_service(&config);
    if let Err(error) = service.bootstrap_store(BootstrapStoreCommand) {
        eprintln!("failed to bootstrap hondana: {error}");
        return ExitCode::from(1);
    }

    let command = parse_command(&args);
    match run_command(command, &service, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CommandError::Usage(msg)) => {
            eprintln!("{msg}");
            print_usage();
            ExitCode::from(2)
        }
        Err(CommandError::Runtime(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(1)
        }
    }
}

fn build_application_service(config: &ShelfConfig) -> ApplicationService {
    ApplicationService::new(
        Box::new(SqliteProgressStore::new(config.store_path.clone())),
        Box::new(GoogleBooksClient::new(
            config.catalog_endpoint.clone(),
            config.result_language.clone(),
            &config.user_agent,
        )),
    )
}

#[derive(Debug, Clone)]
enum Command {
    Ui,
    Search { query: String },
    Save { book_id: String, pages: i64 },
    ReadingNow,
}

#[derive(Debug, Clone)]
enum CommandError {
    Usage(String),
    Runtime(String),
}

fn parse_command(args: &[String]) -> Result<Command, CommandError> {
    if args.len() <= 1 {
        return Ok(Command::Ui);
    }

    match args[1].as_str() {
        "ui" => Ok(Command::Ui),
        "search" => {
            if args.len() < 3 {
                return Err(CommandError::Usage("missing search query".to_string()));
            }
            Ok(Command::Search {
                query: args[2..].join(" "),
            })
        }
        "save" => {
            if args.len() < 4 {
                return Err(CommandError::Usage(
                    "missing book id or page count".to_string(),
                ));
            }
            let pages = args[3]
                .parse::<i64>()
                .map_err(|_| CommandError::Usage(format!("invalid page count: {}", args[3])))?;
            Ok(Command::Save {
                book_id: args[2].clone(),
                pages,
            })
        }
        "reading-now" => Ok(Command::ReadingNow),
        other => Err(CommandError::Usage(format!("unknown command: {other}"))),
    }
}

fn run_command(
    command: Result<Command, CommandError>,
    service: &ApplicationService,
    config: &ShelfConfig,
) -> Result<(), CommandError> {
    match command? {
        Command::Ui => ui::launch_window(service, config).map_err(CommandError::Runtime),
        Command::Search { query } => {
            let records = service
                .search_books(SearchBooksCommand { query })
                .map_err(|error| CommandError::Runtime(format!("search failed: {error}")))?;
            if records.is_empty() {
                println!("{NO_RESULTS_MESSAGE}");
                return Ok(());
            }
            for record in records {
                println!("{}", present_search_row(&record));
            }
            Ok(())
        }
        Command::Save { book_id, pages } => {
            let id = BookId::new(book_id)
                .map_err(|error| CommandError::Usage(format!("invalid book id: {error}")))?;
            let info = service
                .stored_info(StoredInfoQuery { id: id.clone() })
                .map_err(|error| CommandError::Runtime(format!("save failed: {error}")))?
                .ok_or_else(|| {
                    CommandError::Runtime(format!(
                        "no stored metadata for {id}; run a search first"
                    ))
                })?;
            let saved = service
                .save_progress(SaveProgressCommand {
                    id,
                    total_pages: info.total_pages,
                    requested_pages: pages,
                })
                .map_err(|error| CommandError::Runtime(format!("save failed: {error}")))?;
            println!(
                "{PROGRESS_SAVED_MESSAGE} {}",
                present_progress_line(saved.pages_read, info.total_pages, saved.percent)
            );
            Ok(())
        }
        Command::ReadingNow => {
            let entries = service
                .reading_now(ReadingNowQuery)
                .map_err(|error| CommandError::Runtime(format!("reading-now failed: {error}")))?;
            if entries.is_empty() {
                println!("{NO_READING_NOW_MESSAGE}");
                return Ok(());
            }
            for entry in entries {
                println!("{}", present_reading_now_row(&entry));
            }
            Ok(())
        }
    }
}

fn print_usage() {
    println!("usage:");
    println!("  hondana ui");
    println!("  hondana search <query>");
    println!("  hondana save <book_id> <pages>");
    println!("  hondana reading-now");
}
