// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, written to stderr)
// 3. Build the HTTP fetcher and the crawler, then run one crawl
// 4. Print the results and exit with a proper code:
//      0 = every page downloaded, 1 = some pages failed,
//      2 = usage or internal error, 130 = interrupted with Ctrl-C
//
// Rust concepts used:
// - async/await: The crawler's worker pools run on the tokio runtime
// - Result<T, E>: For error handling (T = success type, E = error type)
// - tokio::signal: To stop waiting when the user presses Ctrl-C
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use web_crawler::{CrawlError, CrawlResult, HttpFetcher, WebCrawler};

const EXIT_INTERRUPTED: i32 = 130;

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    // clap prints usage and exits with code 2 on bad arguments
    let cli = Cli::parse();
    init_logging();

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so stdout only ever holds results (and valid JSON with --json)
// RUST_LOG overrides the default level, e.g. RUST_LOG=web_crawler=debug
fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "web_crawler=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// This is the main application logic
// Returns the exit code, or Err for errors main should report
async fn run(cli: Cli) -> Result<i32> {
    let fetcher =
        HttpFetcher::new(&cli.fetcher_config()).context("failed to create HTTP client")?;
    let crawler = WebCrawler::new(fetcher, cli.crawler_config())?;

    eprintln!("🔍 Crawling: {}", cli.url);
    eprintln!("📊 Max crawl depth: {}", cli.depth);

    let interrupt = async {
        // If the handler cannot be installed, just never interrupt
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let result = match crawler
        .crawl_until(&cli.url, cli.depth as usize, interrupt)
        .await
    {
        Ok(result) => result,
        Err(CrawlError::Interrupted) => {
            // Some tasks may still be running; don't wait for them
            eprintln!("⏹️  Interrupted");
            return Ok(EXIT_INTERRUPTED);
        }
        Err(e) => return Err(e.into()),
    };

    crawler.close().await;

    print_results(&result, cli.json)?;

    if result.is_clean() {
        Ok(0)
    } else {
        Ok(1)
    }
}

// Prints the results either as a summary or JSON
fn print_results(result: &CrawlResult, json: bool) -> Result<()> {
    if json {
        // Serialize results to JSON and print
        let json_output = serde_json::to_string_pretty(result)?;
        println!("{}", json_output);
    } else {
        print_summary(result);
    }
    Ok(())
}

// Prints results in a human-readable form
fn print_summary(result: &CrawlResult) {
    println!("Downloaded {} page(s):", result.downloaded.len());
    for url in &result.downloaded {
        println!("   {}", url);
    }

    println!();
    println!("Failed {} page(s):", result.errors.len());
    for failure in result.errors.values() {
        println!("   ❌ {}", failure);
    }

    println!();
    println!("📊 Summary:");
    println!("   ✅ Downloaded: {}", result.downloaded.len());
    println!("   ❌ Errors: {}", result.errors.len());
    println!("   📋 Total: {}", result.total());
}
