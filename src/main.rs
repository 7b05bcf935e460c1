use clap::Parser;
use tracing_subscriber::EnvFilter;
use zkss::cli::{Cli, Commands};
use zkss::commands;
use zkss::config::Config;
use zkss::notes::strip_ending;
use zkss::search::cascade::RenderStyle;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries results (and MCP frames), so logs go to stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Search {
            words,
            semantic,
            limit,
        }) => {
            let config = Config::load()?;
            let extension = config.notes.extension.clone();

            if semantic {
                let limit = limit.unwrap_or(config.search.limit);
                let results = commands::semantic_search(&config, &words.join(" "), limit)?;

                if results.is_empty() {
                    println!("No notes matched '{}'", words.join(" "));
                } else {
                    println!("Found {} relevant notes:", results.len());
                    for filename in &results {
                        println!("    {}", strip_ending(filename, &extension));
                    }
                }
            } else {
                let results = commands::keyword_search(&config, &words)?;

                if results.outcome.is_empty() {
                    println!("No notes matched '{}'", results.query.phrase());
                } else {
                    for line in results.lines(&extension, RenderStyle::Plain) {
                        println!("{line}");
                    }
                }
            }
            Ok(())
        }
        Some(Commands::Index { force }) => {
            let config = Config::load()?;
            let report = commands::reindex(&config, force)?;

            if report.is_noop() {
                println!("Index is up to date.");
            } else {
                println!(
                    "Index updated: {} added, {} updated, {} deleted, {} skipped",
                    report.added, report.updated, report.deleted, report.skipped
                );
            }
            Ok(())
        }
        Some(Commands::Read { filename }) => {
            let config = Config::load()?;
            let content = commands::read_note(&config, &filename)?;
            print!("{content}");
            Ok(())
        }
        #[cfg(feature = "mcp")]
        Some(Commands::Serve) => {
            let config = Config::load()?;
            tokio::runtime::Runtime::new()?.block_on(zkss::mcp::serve(config))
        }
        None => {
            Cli::parse_from(["zkss", "--help"]);
            Ok(())
        }
    }
}
