//! Serps CLI - Google search from the command line.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use serps::{GoogleSearch, SearchOptions};

/// Serps - Google search results as JSON
#[derive(Parser)]
#[command(name = "serps")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Make a google search
    #[command(name = "google-search", alias = "google:search")]
    GoogleSearch(SearchArgs),
}

#[derive(Args)]
struct SearchArgs {
    /// Keywords to search for
    keywords: Option<String>,

    /// Google tld to search, e.g "--tld=co.uk" to search google.co.uk
    #[arg(long, default_value = "com")]
    tld: String,

    /// Language restriction
    #[arg(long)]
    lr: Option<String>,

    /// Http client to use: curl/direct (default) or phantomjs/scripted
    #[arg(long = "http-client")]
    http_client: Option<String>,

    /// Use the given proxy, e.g "--proxy=http://my-proxy-host:8080"
    #[arg(long)]
    proxy: Option<String>,

    /// The google page number
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    page: i64,

    /// Dump the dom into the given file. Useful for debugging purpose.
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Force the dump option to override if the file exists.
    #[arg(long = "force-dump")]
    force_dump: bool,

    /// Use a mobile user agent string to get mobile results.
    #[arg(long)]
    mobile: bool,

    /// Custom user agent to set for the search
    #[arg(long = "user-agent")]
    user_agent: Option<String>,

    /// The number of results per page (max 100).
    #[arg(long = "res-per-page", default_value_t = 10, allow_negative_numbers = true)]
    res_per_page: i64,

    /// Parse a local file instead of doing a http call.
    #[arg(long)]
    file: Option<PathBuf>,
}

impl From<SearchArgs> for SearchOptions {
    fn from(args: SearchArgs) -> Self {
        Self {
            keywords: args.keywords,
            tld: args.tld,
            lr: args.lr,
            http_client: args.http_client,
            proxy: args.proxy,
            page: args.page,
            res_per_page: args.res_per_page,
            dump: args.dump,
            force_dump: args.force_dump,
            mobile: args.mobile,
            user_agent: args.user_agent,
            file: args.file,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; stdout is reserved for the JSON document.
    if cli.verbose {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    match cli.command {
        Commands::GoogleSearch(args) => run_search(args).await,
    }
}

async fn run_search(args: SearchArgs) -> Result<()> {
    let options = SearchOptions::from(args);
    let report = GoogleSearch::new().run(&options).await?;
    println!("{}", report.to_json_pretty()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> SearchArgs {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::GoogleSearch(args) => args,
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let options = SearchOptions::from(parse(&["serps", "google-search", "rust"]));
        assert_eq!(options.keywords.as_deref(), Some("rust"));
        assert_eq!(options.tld, "com");
        assert_eq!(options.page, 1);
        assert_eq!(options.res_per_page, 10);
        assert!(options.http_client.is_none());
        assert!(!options.force_dump);
    }

    #[test]
    fn test_colon_alias_and_all_options() {
        let options = SearchOptions::from(parse(&[
            "serps",
            "google:search",
            "simpsons",
            "--tld=co.uk",
            "--lr=lang_en",
            "--http-client=phantomjs",
            "--proxy=http://my-proxy-host:8080",
            "--page=2",
            "--dump=out.html",
            "--force-dump",
            "--mobile",
            "--user-agent=X",
            "--res-per-page=50",
        ]));
        assert_eq!(options.tld, "co.uk");
        assert_eq!(options.lr.as_deref(), Some("lang_en"));
        assert_eq!(options.http_client.as_deref(), Some("phantomjs"));
        assert_eq!(options.proxy.as_deref(), Some("http://my-proxy-host:8080"));
        assert_eq!(options.page, 2);
        assert_eq!(options.dump, Some(PathBuf::from("out.html")));
        assert!(options.force_dump);
        assert!(options.mobile);
        assert_eq!(options.user_agent.as_deref(), Some("X"));
        assert_eq!(options.res_per_page, 50);
    }

    #[test]
    fn test_file_without_keywords() {
        let options = SearchOptions::from(parse(&["serps", "google-search", "--file=serp.html"]));
        assert!(options.keywords.is_none());
        assert_eq!(options.file, Some(PathBuf::from("serp.html")));
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["serps", "google-search", "rust", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
