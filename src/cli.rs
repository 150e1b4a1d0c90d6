use clap::Parser;

#[derive(Parser)]
#[command(name = "gallery-guide")]
#[command(about = "An interactive terminal guide to the gallery's exhibits")]
pub struct Cli {
    /// Start in this language, skipping the language picker
    #[arg(long)]
    pub lang: Option<String>,

    /// Wipe saved settings (language, unlocked mementos) before starting
    #[arg(long)]
    pub reset: bool,

    /// Log filter for gallery-guide.log (overrides RUST_LOG)
    #[arg(long)]
    pub log_level: Option<String>,
}
