use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the ascii-site binary.
#[derive(Debug, Parser)]
#[command(
    name = "ascii-site",
    version,
    about = "Terminal-friendly personal site server"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "ASCII_SITE_CONFIG_FILE",
        value_name = "PATH",
        value_hint = ValueHint::FilePath
    )]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve(Box<ServeArgs>),
    /// Print the plain-text rendition of the site to stdout.
    Text(TextArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ContentOverrides {
    /// Override the directory holding blog posts.
    #[arg(long = "content-blog-dir", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub blog_dir: Option<PathBuf>,

    /// Override the about page markdown file.
    #[arg(long = "content-about-file", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub about_file: Option<PathBuf>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub content: ContentOverrides,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the runtime environment (development|production).
    #[arg(long = "environment", value_name = "ENV")]
    pub environment: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct TextArgs {
    #[command(flatten)]
    pub content: ContentOverrides,

    /// Culture used for the hero tagline, e.g. `es-ES`.
    #[arg(long = "lang", value_name = "CULTURE")]
    pub lang: Option<String>,

    /// Leave a section out of the document; may be repeated.
    #[arg(long = "skip", value_name = "SECTION", value_enum)]
    pub skip: Vec<Section>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Section {
    Hero,
    Navigation,
    About,
    Blog,
    Github,
}
