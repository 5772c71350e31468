use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use transcript_convert::{
    convert_file_with_options, determine_format, output::TranscriptDocument, CombineOptions,
    OptionOverrides, TranscriptFormat,
};

#[derive(Parser, Debug)]
#[command(
    about = "Convert SRT, WebVTT, JSON and HTML transcripts into timed speaker segments",
    version
)]
struct Args {
    /// Transcript file to convert
    file: PathBuf,

    /// Input format; detected from the content when omitted
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,

    /// JSON file of camelCase combine options applied before the flags below
    #[arg(long)]
    options: Option<PathBuf>,

    /// Merge consecutive segments with equal times and speaker
    #[arg(long)]
    combine_equal_times: bool,

    /// Separator used when merging equal-time segments
    #[arg(long)]
    combine_equal_times_separator: Option<String>,

    /// Merge same-speaker segments up to --combine-segments-length characters
    #[arg(long)]
    combine_segments: bool,

    #[arg(long)]
    combine_segments_length: Option<usize>,

    /// Merge every run of segments from the same speaker
    #[arg(long)]
    combine_speaker: bool,

    /// Only show a speaker when it differs from the previous segment
    #[arg(long)]
    speaker_change: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FormatChoice {
    Html,
    Json,
    Srt,
    #[value(alias = "webvtt")]
    Vtt,
}

impl From<FormatChoice> for TranscriptFormat {
    fn from(value: FormatChoice) -> Self {
        match value {
            FormatChoice::Html => TranscriptFormat::Html,
            FormatChoice::Json => TranscriptFormat::Json,
            FormatChoice::Srt => TranscriptFormat::Srt,
            FormatChoice::Vtt => TranscriptFormat::Vtt,
        }
    }
}

impl Args {
    fn combine_options(&self) -> Result<CombineOptions, Box<dyn std::error::Error>> {
        let mut options = match &self.options {
            Some(path) => CombineOptions::from_json_file(path)?,
            None => CombineOptions::default(),
        };

        options.apply(&OptionOverrides {
            combine_equal_times: self.combine_equal_times.then_some(true),
            combine_equal_times_separator: self.combine_equal_times_separator.clone(),
            combine_segments: self.combine_segments.then_some(true),
            combine_segments_length: self.combine_segments_length,
            combine_speaker: self.combine_speaker.then_some(true),
            speaker_change: self.speaker_change.then_some(true),
        });
        Ok(options)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let options = args.combine_options()?;
    let data = std::fs::read_to_string(&args.file)?;

    let format = match args.format {
        Some(choice) => choice.into(),
        None => determine_format(&data)?,
    };
    log::info!("Reading {} as {format}", args.file.display());

    let segments = convert_file_with_options(&data, Some(format), &options)?;
    send_document(&TranscriptDocument::new(format, &segments), args.pretty)
}

fn send_document(
    document: &TranscriptDocument,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = io::stdout();
    if pretty {
        serde_json::to_writer_pretty(&mut stdout, document)?;
    } else {
        serde_json::to_writer(&mut stdout, document)?;
    }
    stdout.write_all(b"\n")?;
    stdout.flush()?;
    Ok(())
}
