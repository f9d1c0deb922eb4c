//! Command-line interface
//!
//! Argument surface mirrors the reference separation tool: one or more track
//! paths plus model selection, output layout and quality/memory trade-offs.

use clap::Parser;
use std::path::PathBuf;

/// Separate the sources for the given tracks
#[derive(Parser, Debug)]
#[command(name = "unmix")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Paths to the tracks to separate
    #[arg(required = true)]
    pub tracks: Vec<PathBuf>,

    /// Model name. See README for the list of pretrained models.
    #[arg(short, long, default_value = "demucs")]
    pub name: String,

    /// Load the quantized model variant. About 4 times smaller but might
    /// impact separation quality.
    #[arg(long)]
    pub quantized: bool,

    /// Folder where extracted tracks are put. A subfolder with the model
    /// name is created.
    #[arg(short, long, default_value = "separated")]
    pub out: PathBuf,

    /// Path to trained models. Also used to store downloaded pretrained
    /// models.
    #[arg(long, default_value = "models")]
    pub models: PathBuf,

    /// Automatically download the model if missing
    #[arg(long)]
    pub dl: bool,

    /// Device to use
    #[arg(short, long, default_value = "cpu")]
    pub device: String,

    /// Number of random shifts for equivariant stabilization. Increases
    /// separation time but improves quality.
    #[arg(long, default_value_t = 0)]
    pub shifts: u32,

    /// Apply the model to the entire input at once rather than splitting it
    /// into ~10 second chunks. Needs a lot of memory for long tracks.
    #[arg(long = "no-split", default_value_t = true, action = clap::ArgAction::SetFalse)]
    pub split: bool,

    /// Write output wav files in pcm f32 format instead of s16. Useful when
    /// computing exact metrics like SDR.
    #[arg(long)]
    pub float32: bool,

    /// Load the pretrained catalog from a JSON file instead of the built-in
    /// table
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["unmix", "song.wav"]);
        assert_eq!(cli.name, "demucs");
        assert!(!cli.quantized);
        assert_eq!(cli.out, PathBuf::from("separated"));
        assert_eq!(cli.models, PathBuf::from("models"));
        assert!(!cli.dl);
        assert_eq!(cli.device, "cpu");
        assert_eq!(cli.shifts, 0);
        assert!(cli.split);
        assert!(!cli.float32);
    }

    #[test]
    fn test_no_split_flag() {
        let cli = Cli::parse_from(["unmix", "--no-split", "song.wav"]);
        assert!(!cli.split);
    }

    #[test]
    fn test_requires_at_least_one_track() {
        assert!(Cli::try_parse_from(["unmix"]).is_err());
    }

    #[test]
    fn test_multiple_tracks() {
        let cli = Cli::parse_from(["unmix", "-n", "tasnet", "--dl", "a.wav", "b.wav"]);
        assert_eq!(cli.tracks.len(), 2);
        assert_eq!(cli.name, "tasnet");
        assert!(cli.dl);
    }
}
