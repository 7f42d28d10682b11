// recompress-cli/src/cli.rs
//
// Defines the command-line argument structure using clap.

use clap::Parser;
use recompress_core::config::{
    DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH, DEFAULT_QUALITY, MAX_QUALITY, MIN_MAX_HEIGHT,
    MIN_MAX_WIDTH, MIN_QUALITY, SpeedPreset,
};
use std::path::PathBuf;

/// Default install location for `-M`.
pub const DEFAULT_MAN_DIR: &str = "/usr/local/share/man/man1";

#[derive(Parser, Debug)]
#[command(
    name = "recompress",
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Re-encode video files to 10-bit HEVC, keeping every other stream",
    long_about = "Re-encodes each input's first video stream to 10-bit HEVC (libx265) and \
                  copies all other streams, metadata and chapters unchanged. Files that are \
                  already HEVC are skipped unless --force is given; larger videos are scaled \
                  down to fit the --width/--height box. Results are written to \
                  ./_recompressed/ with the original file name."
)]
pub struct Cli {
    /// Re-encode files even if they are already HEVC
    #[arg(short = 'f', long)]
    pub force: bool,

    /// CRF quality, 18-35 (lower is better quality and larger files)
    #[arg(
        short = 'q',
        long,
        value_name = "CRF",
        default_value_t = DEFAULT_QUALITY,
        value_parser = clap::value_parser!(u8).range(i64::from(MIN_QUALITY)..=i64::from(MAX_QUALITY))
    )]
    pub quality: u8,

    /// x265 speed preset: ultrafast, superfast, veryfast, faster, fast, medium, slow, slower, veryslow
    #[arg(
        short = 's',
        long,
        value_name = "PRESET",
        default_value_t = SpeedPreset::default(),
        value_parser = parse_speed
    )]
    pub speed: SpeedPreset,

    /// Maximum output width in pixels (minimum 100)
    #[arg(
        short = 'x',
        long,
        value_name = "PIXELS",
        default_value_t = DEFAULT_MAX_WIDTH,
        value_parser = clap::value_parser!(u32).range(i64::from(MIN_MAX_WIDTH)..)
    )]
    pub width: u32,

    /// Maximum output height in pixels (minimum 50)
    #[arg(
        short = 'y',
        long,
        value_name = "PIXELS",
        default_value_t = DEFAULT_MAX_HEIGHT,
        value_parser = clap::value_parser!(u32).range(i64::from(MIN_MAX_HEIGHT)..)
    )]
    pub height: u32,

    /// Install the recompress(1) manual page and exit
    #[arg(short = 'M', long = "installmanpage")]
    pub install_manpage: bool,

    /// Directory the manual page is installed into
    #[arg(long, value_name = "DIR", env = "RECOMPRESS_MAN_DIR", default_value = DEFAULT_MAN_DIR)]
    pub man_dir: PathBuf,

    /// Give up on ffprobe calls that take longer than this many seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub probe_timeout: Option<u64>,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Video files to re-encode, processed in the order given
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,
}

fn parse_speed(value: &str) -> Result<SpeedPreset, String> {
    value.parse::<SpeedPreset>().map_err(|e| match e {
        recompress_core::CoreError::Config(msg) => msg,
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["recompress", "a.mkv"]).unwrap();
        assert!(!cli.force);
        assert_eq!(cli.quality, 26);
        assert_eq!(cli.speed, SpeedPreset::Slower);
        assert_eq!((cli.width, cli.height), (1920, 1080));
        assert!(!cli.install_manpage);
        assert!(cli.probe_timeout.is_none());
        assert_eq!(cli.files, vec![PathBuf::from("a.mkv")]);
    }

    #[test]
    fn short_flags() {
        let cli = Cli::try_parse_from([
            "recompress", "-f", "-q", "20", "-s", "fast", "-x", "1280", "-y", "720", "a.mkv", "b.mp4",
        ])
        .unwrap();
        assert!(cli.force);
        assert_eq!(cli.quality, 20);
        assert_eq!(cli.speed, SpeedPreset::Fast);
        assert_eq!((cli.width, cli.height), (1280, 720));
        assert_eq!(cli.files.len(), 2);
    }

    #[test]
    fn quality_bounds_are_inclusive() {
        assert!(Cli::try_parse_from(["recompress", "-q", "18", "a"]).is_ok());
        assert!(Cli::try_parse_from(["recompress", "-q", "35", "a"]).is_ok());

        let err = Cli::try_parse_from(["recompress", "-q", "17", "a"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        let err = Cli::try_parse_from(["recompress", "-q", "36", "a"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn dimension_minimums() {
        assert!(Cli::try_parse_from(["recompress", "-x", "100", "-y", "50", "a"]).is_ok());
        assert!(Cli::try_parse_from(["recompress", "-x", "99", "a"]).is_err());
        assert!(Cli::try_parse_from(["recompress", "-y", "49", "a"]).is_err());
    }

    #[test]
    fn unknown_speed_lists_choices() {
        let err = Cli::try_parse_from(["recompress", "-s", "placebo", "a"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert!(err.to_string().contains("veryslow"));
    }

    #[test]
    fn double_dash_ends_options() {
        let cli = Cli::try_parse_from(["recompress", "--", "-q", "--force"]).unwrap();
        assert!(!cli.force);
        assert_eq!(cli.files, vec![PathBuf::from("-q"), PathBuf::from("--force")]);
    }

    #[test]
    fn manpage_flag_needs_no_files() {
        let cli = Cli::try_parse_from(["recompress", "-M", "--man-dir", "/tmp/man1"]).unwrap();
        assert!(cli.install_manpage);
        assert_eq!(cli.man_dir, PathBuf::from("/tmp/man1"));
        assert!(cli.files.is_empty());
    }

    #[test]
    fn probe_timeout_must_be_positive() {
        let cli = Cli::try_parse_from(["recompress", "--probe-timeout", "30", "a"]).unwrap();
        assert_eq!(cli.probe_timeout, Some(30));
        assert!(Cli::try_parse_from(["recompress", "--probe-timeout", "0", "a"]).is_err());
    }
}
