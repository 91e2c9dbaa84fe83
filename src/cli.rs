use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tweetclip")]
#[command(author, version, about = "Self-hosted Twitter/X video download widget service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the action dispatcher
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 4000)]
        port: u16,
    },

    /// List the renditions available for a tweet URL
    Formats {
        /// Tweet URL (twitter.com or x.com)
        url: String,
    },

    /// Download one rendition of a tweet video
    Grab {
        /// Tweet URL (twitter.com or x.com)
        url: String,

        /// Quality token to fetch (e.g. 720p); defaults to the first
        /// listed rendition
        #[arg(short, long)]
        quality: Option<String>,

        /// 1-based video number within the tweet
        #[arg(short, long, default_value_t = 1)]
        video: usize,

        /// Directory to save into (defaults to the configured download dir)
        #[arg(short, long)]
        out: Option<String>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
