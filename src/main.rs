mod cli;

use std::sync::Arc;

use clap::Parser;
use cli::{Cli, Commands, DownloadArgs, FetchArgs, ListArgs};
use trackbox::api::models::DownloadRequest;
use trackbox::client::DownloadClient;
use trackbox::config::{ClientConfig, Config};
use trackbox::observability::Metrics;
use trackbox::worker::{FetchEvent, JobRequest, Pipeline};

type AnyError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    trackbox::observability::init_tracing();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    if let Some(server) = cli.server {
        config.client.server_url = server;
    }

    match cli.command {
        Commands::Server(args) => {
            if let Some(address) = args.address {
                config.server.bind_addr = address;
            }
            trackbox::api::run(config).await?
        }
        Commands::Download(args) => download(config.client, args).await?,
        Commands::List(args) => list(config.client, args).await?,
        Commands::Fetch(args) => fetch(&config, args).await?,
    }

    Ok(())
}

async fn download(config: ClientConfig, args: DownloadArgs) -> Result<(), AnyError> {
    let client = DownloadClient::new(config)?;
    let request = DownloadRequest {
        soundcloud_url: args.url,
        output_directory: Some(args.output_dir),
        filename: args.filename,
    };

    let started = client.start(&request).await?;
    println!("Download started with ID: {}", started.download_id);
    println!("Status: {} - {}", started.status, started.message);
    println!("Monitoring download progress...");

    let done = client
        .wait_for(&started.download_id, |status| {
            println!(
                "Status: {} ({}%) - {}",
                status.status, status.progress_percent, status.message
            );
        })
        .await?;

    println!("Download completed successfully!");
    println!("File saved to: {}", done.file_path);
    println!("File size: {} bytes", done.file_size);
    Ok(())
}

async fn fetch(config: &Config, args: FetchArgs) -> Result<(), AnyError> {
    if !args.url.contains(&config.upstream.page_host) {
        return Err("invalid SoundCloud URL".into());
    }

    let pipeline = Pipeline::from_config(config, Arc::new(Metrics::new()))?;
    println!("Analyzing SoundCloud URL: {}", args.url);

    let request = JobRequest {
        source_url: args.url,
        output_directory: args.output,
        filename: args.filename,
    };
    let (_, bytes) = pipeline
        .fetch_direct(&request, |event| match event {
            FetchEvent::TrackResolved { track_id } => println!("Track ID: {track_id}"),
            FetchEvent::StreamFound => println!("Stream URL found"),
            FetchEvent::Downloading { path } => println!("Downloading to: {}", path.display()),
        })
        .await?;

    println!("Download completed successfully!");
    println!("File size: {bytes} bytes");
    Ok(())
}

async fn list(config: ClientConfig, args: ListArgs) -> Result<(), AnyError> {
    let client = DownloadClient::new(config)?;
    let response = client.list(args.limit, 0).await?;

    println!("Total downloads: {}", response.total_count);
    println!("{:<40} {:<12} FILE PATH", "ID", "STATUS");
    for download in response.downloads {
        println!(
            "{:<40} {:<12} {}",
            download.download_id, download.status, download.file_path
        );
    }
    Ok(())
}
