use clap::{Args as ClapArgs, Parser, Subcommand};

/// Tool to prepare audiobook files: tag them and combine them into one chaptered file.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Show ffmpeg/ffprobe logs.
    #[arg(short = 'g', long, global = true)]
    pub debug: bool,

    /// Log diagnostics (overridden by RUST_LOG).
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the tags of each file in a table
    ShowTags {
        /// Files or glob patterns (e.g. "book/*.mp3")
        paths: Vec<String>,
    },
    /// Number the track tag of each file in sorted order
    Number {
        paths: Vec<String>,
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        start: i64,
    },
    /// Set each title from a naming scheme, where %n is replaced by the running number
    ChapterNumber {
        naming_scheme: String,
        paths: Vec<String>,
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        start: i64,
    },
    /// Set the title tag on every file
    ChangeTitle { title: String, paths: Vec<String> },
    /// Set the album tag on every file
    ChangeAlbum { album: String, paths: Vec<String> },
    /// Set the author (artist) tag on every file
    ChangeAuthor {
        author_name: String,
        paths: Vec<String>,
    },
    /// Set the narrator (composer) tag on every file
    ChangeNarrator {
        narrator_name: String,
        paths: Vec<String>,
    },
    /// Set any tag on every file, by name (e.g. composer) or ID3v2 frame id (e.g. TPE3)
    ChangeTag {
        tag: String,
        value: String,
        paths: Vec<String>,
    },
    /// Combine files into one chaptered audiobook, one chapter per file titled from its title tag
    CombineFiles(CombineArgs),
    /// Check FFmpeg installation and version compatibility
    CheckFfmpeg,
}

#[derive(ClapArgs, Debug)]
pub struct CombineArgs {
    /// Files or glob patterns, combined in sorted order
    pub paths: Vec<String>,

    /// Output file [default: audiobook.m4b]
    #[arg(short = 'o', long)]
    pub output: Option<String>,

    /// Output bitrate (e.g. 64k or 64000). If not provided, the first file's bitrate is used.
    #[arg(short = 'b', long)]
    pub bitrate: Option<String>,

    /// Title written to the combined file
    #[arg(long)]
    pub title: Option<String>,

    /// Author written to the combined file
    #[arg(long)]
    pub author: Option<String>,

    /// Path to a JSON file describing the job (files, output, bitrate, title, author). CLI arguments override values in the task file.
    #[arg(short = 't', long = "task")]
    pub task: Option<String>,

    /// Write the resolved job to this file as JSON. If no file is provided, the output file name with .json is used.
    #[arg(short = 'w', long = "write-task-file", num_args = 0..=1, value_name = "FILE")]
    pub write_task_file: Option<Option<String>>,

    /// Automatically confirm the chapter plan and proceed without prompting
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,
}
