use clap::{Args, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Subcommand, Debug, Clone)]
pub enum EnrichCommands {
    /// Annotate a draft plan with B-roll, motion cues, highlights and SFX
    Enrich(EnrichArgs),
    /// Report gaps and overlaps between consecutive plan segments
    Check(CheckArgs),
    /// Show the keyword phrase extracted from a piece of text
    Phrase(PhraseArgs),
}

#[derive(Args, Debug, Clone)]
pub struct EnrichArgs {
    /// Draft plan JSON
    #[arg(value_hint = ValueHint::FilePath)]
    pub plan: PathBuf,

    /// Where to write the enriched plan
    #[arg(value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Scene map JSON (`{"segments": [...]}` or a bare array)
    #[arg(short = 's', long = "scene-map", value_hint = ValueHint::FilePath)]
    pub scene_map: PathBuf,

    /// B-roll catalog JSON
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub broll_catalog: Option<PathBuf>,

    /// SFX catalog JSON
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub sfx_catalog: Option<PathBuf>,

    /// Motion rules JSON
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub motion_rules: Option<PathBuf>,

    /// Structured overlay catalog JSON
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub overlays: Option<PathBuf>,

    /// Subtitles as SRT, or JSON entries when the file ends in `.json`
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub subtitles: Option<PathBuf>,

    /// Minimum score for scene-driven B-roll (overrides the config file)
    #[arg(long)]
    pub broll_threshold: Option<f64>,

    /// Config file to use instead of the default location
    #[arg(short = 'c', long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Plan JSON to validate
    #[arg(value_hint = ValueHint::FilePath)]
    pub plan: PathBuf,

    /// Gaps and overlaps up to this many seconds are ignored
    #[arg(short = 't', long)]
    pub tolerance: Option<f64>,

    /// Exit with an error when any warning is found
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PhraseArgs {
    /// Text to extract a phrase from
    pub text: String,

    /// Maximum number of words in the phrase
    #[arg(long, default_value_t = 2)]
    pub max_tokens: usize,

    /// Maximum phrase length in characters (0 disables truncation)
    #[arg(long, default_value_t = 28)]
    pub max_chars: usize,
}
