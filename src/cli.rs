use clap::{Parser, Subcommand};
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[command(name = "trackbox")]
#[command(about = "Track download service and client", long_about = None)]
pub struct Cli {
    /// Download service URL used by client commands (overrides config)
    #[arg(long, global = true)]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the download service
    Server(ServerArgs),
    /// Submit a track and wait until it finishes
    Download(DownloadArgs),
    /// List submitted downloads
    List(ListArgs),
    /// Download a track in this process, without a server
    Fetch(FetchArgs),
}

#[derive(clap::Args, Debug)]
pub struct ServerArgs {
    /// Address to bind to (defaults to server.bind_addr from config)
    #[arg(long)]
    pub address: Option<SocketAddr>,
}

#[derive(clap::Args, Debug)]
pub struct DownloadArgs {
    /// Track page URL
    pub url: String,
    /// Directory the file is written to on the server
    #[arg(default_value = "downloads")]
    pub output_dir: String,
    /// File name; `.mp3` is appended when missing
    pub filename: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct FetchArgs {
    /// Track page URL
    pub url: String,
    /// Output directory (defaults to downloads.default_output_dir from config)
    #[arg(short, long)]
    pub output: Option<String>,
    /// File name; `.mp3` is appended when missing
    #[arg(long)]
    pub filename: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Maximum number of entries (0 lists all)
    #[arg(default_value_t = 10)]
    pub limit: i32,
}
