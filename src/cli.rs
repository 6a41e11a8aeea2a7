use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tubescript::output::Format;

#[derive(Parser)]
#[command(
    name = "tubescript",
    about = "YouTube transcript extractor and formatter",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Print config and log locations to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch and format the transcript of one video
    Transcript {
        /// YouTube video URL or video ID
        url: String,

        /// Preferred caption language [default: en, or config default_lang]
        #[arg(short, long)]
        lang: Option<String>,

        /// Output format [default: clean, or config default_format]
        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// Truncate output to roughly this many tokens
        #[arg(short = 't', long)]
        max_tokens: Option<usize>,
    },

    /// Show title, channel, duration, chapters and caption tracks
    Info {
        /// YouTube video URL or video ID
        url: String,
    },

    /// Fetch transcripts for several videos (reads URLs from stdin if none given)
    Batch {
        /// YouTube video URLs or video IDs
        urls: Vec<String>,

        #[arg(short, long)]
        lang: Option<String>,

        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// Token budget applied to each video
        #[arg(short = 't', long)]
        max_tokens: Option<usize>,
    },

    /// Fetch transcripts for the videos of a playlist
    Playlist {
        /// Playlist URL or playlist ID
        url: String,

        #[arg(short, long)]
        lang: Option<String>,

        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// Token budget applied to each video
        #[arg(short = 't', long)]
        max_tokens: Option<usize>,
    },

    /// Search a transcript for a phrase
    Search {
        /// YouTube video URL or video ID
        url: String,

        /// Text to look for (case-insensitive)
        query: String,

        #[arg(short, long)]
        lang: Option<String>,

        /// Segments of context around each match
        #[arg(short, long, default_value_t = 2)]
        context: usize,
    },

    /// Fetch top comments
    Comments {
        /// YouTube video URL or video ID
        url: String,

        /// Number of comments
        #[arg(short = 'n', long, default_value_t = 20)]
        count: usize,
    },
}
