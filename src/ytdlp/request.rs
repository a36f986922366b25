//! Per-channel retrieval settings and their yt-dlp argument form

use crate::config::{ChannelOptions, Config, RetrievalOptions};
use std::ffi::OsString;
use std::path::PathBuf;

/// Everything yt-dlp needs to retrieve the items of one channel
///
/// A base request is built once per run from [`Config`]; each channel derives its
/// own copy with [`with_overrides`](Self::with_overrides).
#[derive(Clone, Debug, PartialEq)]
pub struct RetrievalRequest {
    /// Merged retrieval options
    pub options: RetrievalOptions,
    /// Directory the output template is relative to
    pub output_dir: PathBuf,
    /// yt-dlp download archive; items listed there are skipped
    pub archive_file: PathBuf,
    /// Resolve items without downloading them
    pub simulate: bool,
}

impl RetrievalRequest {
    /// Base request for a run
    pub fn from_config(config: &Config) -> Self {
        Self {
            options: config.download.clone(),
            output_dir: config.paths.video_dir.clone(),
            archive_file: config.paths.archive_file.clone(),
            simulate: config.dry_run,
        }
    }

    /// Copy of this request with channel overrides applied (overrides win)
    #[must_use]
    pub fn with_overrides(&self, overrides: &ChannelOptions) -> Self {
        Self {
            options: self.options.merged(overrides),
            ..self.clone()
        }
    }

    /// Full output path template
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.options.output_template)
    }

    /// yt-dlp arguments for retrieving `url`
    pub fn to_args(&self, url: &str) -> Vec<OsString> {
        let options = &self.options;
        let mut args: Vec<OsString> = vec![
            "--output".into(),
            self.output_path().into(),
            "--format".into(),
            options.format.clone().into(),
            "--download-archive".into(),
            self.archive_file.clone().into(),
        ];

        if options.write_subtitles {
            args.push("--write-subs".into());
        }
        if let Some(langs) = &options.subtitle_langs {
            args.push("--sub-langs".into());
            args.push(langs.into());
        }
        if options.no_part {
            args.push("--no-part".into());
        }
        if let Some(location) = &options.ffmpeg_location {
            args.push("--ffmpeg-location".into());
            args.push(location.into());
        }
        if !options.sponsorblock_remove.is_empty() {
            args.push("--sponsorblock-remove".into());
            args.push(options.sponsorblock_remove.join(",").into());
            if options.force_keyframes_at_cuts {
                args.push("--force-keyframes-at-cuts".into());
            }
        }
        if self.simulate {
            args.push("--simulate".into());
        }

        // Keep URLs starting with '-' from being read as options
        args.push("--".into());
        args.push(url.into());
        args
    }
}
