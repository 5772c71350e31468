use std::error::Error;
use std::path::Path;

use transcript_convert::{
    convert_file_with_options, determine_format, output::TranscriptDocument, CombineOptions,
    Segment, TranscriptError, TranscriptFormat,
};

fn fixture(name: &str) -> Result<String, Box<dyn Error>> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    Ok(std::fs::read_to_string(path)?)
}

fn hidden(start: f64, end: f64, body: &str) -> Segment {
    Segment {
        start_time: start,
        end_time: end,
        speaker: None,
        body: body.to_string(),
    }
}

#[test]
fn fixtures_are_detected() -> Result<(), Box<dyn Error>> {
    let cases = [
        ("sample.srt", TranscriptFormat::Srt),
        ("sample.vtt", TranscriptFormat::Vtt),
        ("sample.json", TranscriptFormat::Json),
        ("sample.html", TranscriptFormat::Html),
    ];
    for (name, expected) in cases {
        assert_eq!(determine_format(&fixture(name)?)?, expected, "{name}");
    }
    Ok(())
}

#[test]
fn srt_default_carries_speakers() -> Result<(), Box<dyn Error>> {
    let segments =
        convert_file_with_options(&fixture("sample.srt")?, None, &CombineOptions::default())?;
    let speakers: Vec<&str> = segments.iter().map(Segment::speaker_name).collect();
    assert_eq!(speakers, vec!["Adam Curry", "Adam Curry", "Dave Jones", "Dave Jones"]);
    assert_eq!(segments[3].end_time, 18.5);
    Ok(())
}

#[test]
fn srt_speaker_change_hides_repeats() -> Result<(), Box<dyn Error>> {
    let options = CombineOptions {
        speaker_change: true,
        ..CombineOptions::default()
    };
    let segments = convert_file_with_options(&fixture("sample.srt")?, None, &options)?;
    let speakers: Vec<Option<&str>> = segments.iter().map(|s| s.speaker.as_deref()).collect();
    assert_eq!(
        speakers,
        vec![Some("Adam Curry"), None, Some("Dave Jones"), None]
    );
    Ok(())
}

#[test]
fn srt_combine_speaker_merges_runs() -> Result<(), Box<dyn Error>> {
    let options = CombineOptions {
        combine_speaker: true,
        ..CombineOptions::default()
    };
    let segments = convert_file_with_options(&fixture("sample.srt")?, None, &options)?;
    assert_eq!(
        segments,
        vec![
            Segment::new(
                0.78,
                12.99,
                "Adam Curry",
                "podcasting 2.0 March\n4 2023 Episode 124 on D flat formable hello everybody welcome\nto a delayed board meeting of"
            ),
            Segment::new(12.99, 18.5, "Dave Jones", "yes indeed it is delayed"),
        ]
    );
    Ok(())
}

#[test]
fn vtt_voice_tags_and_metadata() -> Result<(), Box<dyn Error>> {
    let segments =
        convert_file_with_options(&fixture("sample.vtt")?, None, &CombineOptions::default())?;
    assert_eq!(
        segments,
        vec![
            Segment::new(0.0, 2.0, "Alban", "Hello"),
            Segment::new(2.0, 4.0, "Alban", "and welcome"),
            Segment::new(4.0, 5.5, "Kevin", "Thanks"),
        ]
    );
    Ok(())
}

#[test]
fn vtt_speaker_change_with_combine_segments() -> Result<(), Box<dyn Error>> {
    let options = CombineOptions {
        combine_segments: true,
        speaker_change: true,
        ..CombineOptions::default()
    };
    let segments = convert_file_with_options(&fixture("sample.vtt")?, None, &options)?;
    assert_eq!(
        segments,
        vec![
            Segment::new(0.0, 4.0, "Alban", "Hello and welcome"),
            Segment::new(4.0, 5.5, "Kevin", "Thanks"),
        ]
    );
    Ok(())
}

#[test]
fn json_combine_equal_times() -> Result<(), Box<dyn Error>> {
    let data = fixture("sample.json")?;

    let segments = convert_file_with_options(
        &data,
        None,
        &CombineOptions {
            combine_equal_times: true,
            ..CombineOptions::default()
        },
    )?;
    assert_eq!(
        segments,
        vec![
            Segment::new(0.0, 4.8, "Alban", "It is so stinking nice to"),
            Segment::new(4.8, 6.0, "Alban", "see you all.\nTruly."),
            Segment::new(6.0, 7.5, "Kevin", "Likewise!"),
        ]
    );

    let segments = convert_file_with_options(
        &data,
        None,
        &CombineOptions {
            combine_equal_times: true,
            combine_equal_times_separator: " | ".to_string(),
            ..CombineOptions::default()
        },
    )?;
    assert_eq!(segments[1].body, "see you all. | Truly.");
    Ok(())
}

#[test]
fn json_speaker_change_hides_repeats() -> Result<(), Box<dyn Error>> {
    let options = CombineOptions {
        speaker_change: true,
        ..CombineOptions::default()
    };
    let segments = convert_file_with_options(&fixture("sample.json")?, None, &options)?;
    assert_eq!(
        segments,
        vec![
            Segment::new(0.0, 4.8, "Alban", "It is so stinking nice to"),
            hidden(4.8, 6.0, "see you all."),
            hidden(4.8, 6.0, "Truly."),
            Segment::new(6.0, 7.5, "Kevin", "Likewise!"),
        ]
    );
    Ok(())
}

#[test]
fn html_end_times_follow_next_start() -> Result<(), Box<dyn Error>> {
    let segments =
        convert_file_with_options(&fixture("sample.html")?, None, &CombineOptions::default())?;
    assert_eq!(
        segments,
        vec![
            Segment::new(0.0, 30.0, "Alban", "It is so stinking nice to see you all."),
            Segment::new(30.0, 0.0, "Kevin", "Likewise!"),
        ]
    );
    Ok(())
}

#[test]
fn subtitle_array_converts_milliseconds() -> Result<(), Box<dyn Error>> {
    let data = r#"[{"start": 1, "end": 5000, "text": "Subtitles: @marlonrock1986 (^^V^^)"}]"#;
    let segments = convert_file_with_options(data, None, &CombineOptions::default())?;
    assert_eq!(
        segments,
        vec![Segment::new(0.001, 5.0, "Subtitles", "@marlonrock1986 (^^V^^)")]
    );
    Ok(())
}

#[test]
fn explicit_format_mismatch_fails() -> Result<(), Box<dyn Error>> {
    let cases = [
        ("sample.srt", TranscriptFormat::Vtt),
        ("sample.json", TranscriptFormat::Srt),
        ("sample.html", TranscriptFormat::Json),
        ("sample.vtt", TranscriptFormat::Json),
        ("sample.srt", TranscriptFormat::Html),
    ];
    for (name, format) in cases {
        let result =
            convert_file_with_options(&fixture(name)?, Some(format), &CombineOptions::default());
        match result {
            Err(err) => assert!(err.is_format_error(), "{name} as {format}: {err}"),
            Ok(segments) => panic!("{name} as {format} produced {segments:?}"),
        }
    }
    Ok(())
}

#[test]
fn unknown_json_shapes_fail() {
    for data in [
        r#"{"version":"1.0.0"}"#,
        r#"[{"startTime": 1,"endTime": 5000,"body": "Subtitles: @marlonrock1986 (^^V^^)"}]"#,
    ] {
        let err = convert_file_with_options(data, None, &CombineOptions::default()).unwrap_err();
        assert!(
            matches!(
                err,
                TranscriptError::Format {
                    format: TranscriptFormat::Json,
                    ..
                }
            ),
            "{data}: {err}"
        );
    }
}

#[test]
fn undetermined_format() {
    let err =
        convert_file_with_options("hello world", None, &CombineOptions::default()).unwrap_err();
    assert!(matches!(err, TranscriptError::UndeterminedFormat { .. }));
}

#[test]
fn document_output_reads_back_as_json() -> Result<(), Box<dyn Error>> {
    let segments =
        convert_file_with_options(&fixture("sample.srt")?, None, &CombineOptions::default())?;
    let document = TranscriptDocument::new(TranscriptFormat::Srt, &segments);
    let serialized = serde_json::to_string(&document)?;

    let reread = convert_file_with_options(&serialized, None, &CombineOptions::default())?;
    assert_eq!(reread, segments);
    Ok(())
}
