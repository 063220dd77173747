use dsnap::config::SnapshotOptions;
use dsnap::fetch::HttpFetcher;
use dsnap::models::record::Exchange;
use dsnap::services::snapshot_service::SnapshotService;

use anyhow::Context;
use clap::{App, Arg};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // 创建基本的命令行应用
    let matches = App::new("dsnap")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Captures stock price snapshots of the Dhaka and Chittagong Stock Exchanges as CSV")
        .arg(
            Arg::with_name("header")
                .short('e')
                .long("header")
                .help("Adds the header line to the CSV output")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("dse")
                .short('d')
                .long("dse")
                .help("Scrape data of the Dhaka Stock Exchange (default)")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("cse")
                .short('c')
                .long("cse")
                .help("Scrape data of the Chittagong Stock Exchange")
                .conflicts_with("dse")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .help("Write the CSV data to FILE instead of a derived name")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("out-dir")
                .short('o')
                .long("out-dir")
                .value_name("DIR")
                .help("Directory for timestamp-named output files")
                .takes_value(true)
                .default_value("csv"),
        )
        .arg(
            Arg::with_name("verbose")
                .short('v')
                .long("verbose")
                .help("Print status messages (default)")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("quiet")
                .short('q')
                .long("quiet")
                .help("Don't print status messages")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("print")
                .short('p')
                .long("print")
                .help("Print the captured data on screen")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("dont-prune")
                .short('n')
                .long("dont-prune")
                .help("Keep companies without any trading activity")
                .takes_value(false),
        )
        .get_matches();

    let verbose = !matches.is_present("quiet") || matches.is_present("verbose");
    let default_level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_level),
    )
    .init();

    if verbose {
        println!(
            "dsnap {} - stock price snapshots of the Dhaka & Chittagong exchanges",
            env!("CARGO_PKG_VERSION")
        );
    }

    let exchange = if matches.is_present("cse") {
        Exchange::Cse
    } else {
        Exchange::Dse
    };

    let mut options = SnapshotOptions::new(exchange)
        .with_emit_header(matches.is_present("header"))
        .with_verbose(verbose)
        .with_filter_inactive(!matches.is_present("dont-prune"))
        .with_dump_to_screen(matches.is_present("print"));
    if let Some(file) = matches.value_of("file") {
        options = options.with_output_path(PathBuf::from(file));
    }
    if let Some(dir) = matches.value_of("out-dir") {
        options = options.with_output_dir(dir);
    }

    if let Err(err) = run(options).await {
        eprintln!("ERROR! {:#}", err);
        std::process::exit(1);
    }
}

async fn run(options: SnapshotOptions) -> anyhow::Result<()> {
    let fetcher = Arc::new(HttpFetcher::new().context("building the HTTP client")?);
    let service =
        SnapshotService::new(options, fetcher).context("initializing the snapshot service")?;
    let path = service
        .write_csv()
        .await
        .context("capturing the snapshot")?;
    info!("Snapshot saved as {}", path.display());
    Ok(())
}
