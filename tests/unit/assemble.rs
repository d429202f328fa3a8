use image::Rgb;

use super::*;
use crate::encode::sink::InMemorySink;
use crate::render::layout::CaptionStyle;

fn tmp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "burnin_assemble_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_frames(dir: &Path, n: usize, w: u32, h: u32) -> Vec<PathBuf> {
    (0..n)
        .map(|i| {
            let p = dir.join(format!("frame_{i:06}.png"));
            RgbImage::from_pixel(w, h, Rgb([120, 120, 120]))
                .save(&p)
                .unwrap();
            p
        })
        .collect()
}

fn assembler() -> VideoAssembler {
    VideoAssembler::new(CaptionRenderer::with_default_font(CaptionStyle::default()).unwrap())
}

fn rec(start: u64, end: u64, text: &str) -> CaptionRecord {
    CaptionRecord::new(start, end, text).unwrap()
}

fn fps30() -> Fps {
    Fps::new(30, 1).unwrap()
}

#[test]
fn captions_touch_only_covered_frames() {
    let dir = tmp_dir("covered");
    let frames = write_frames(&dir, 5, 160, 120);
    let plain = RgbImage::from_pixel(160, 120, Rgb([120, 120, 120]));

    let mut sink = InMemorySink::new();
    let report = assembler()
        .assemble_into(&frames, &[rec(1, 3, "world")], fps30(), &mut sink)
        .unwrap();

    assert_eq!(report.frames_written, 5);
    assert_eq!(report.frames_captioned, 3);
    assert_eq!(report.frames_skipped, 0);
    assert_eq!(report.output_path, None);
    assert!(sink.is_finished());
    assert_eq!(
        sink.config(),
        Some(SinkConfig {
            width: 160,
            height: 120,
            fps: fps30()
        })
    );

    let out = sink.frames();
    assert_eq!(out.len(), 5);
    assert_eq!(out[0].1, plain);
    assert_ne!(out[1].1, plain);
    assert_ne!(out[3].1, plain);
    assert_eq!(out[4].1, plain);
}

#[test]
fn ranges_past_the_end_are_harmless() {
    let dir = tmp_dir("past_end");
    let frames = write_frames(&dir, 2, 64, 48);

    let mut sink = InMemorySink::new();
    let report = assembler()
        .assemble_into(&frames, &[rec(1, 500, "tail"), rec(90, 99, "never")], fps30(), &mut sink)
        .unwrap();

    assert_eq!(report.frames_written, 2);
    assert_eq!(report.frames_captioned, 1);
}

#[test]
fn empty_listing_is_no_frames() {
    let mut sink = InMemorySink::new();
    let err = assembler()
        .assemble_into(&[], &[], fps30(), &mut sink)
        .unwrap_err();
    assert!(matches!(err, BurninError::NoFrames(_)));
    assert!(sink.config().is_none());
}

#[test]
fn undecodable_first_frame_is_fatal() {
    let dir = tmp_dir("bad_first");
    let bad = dir.join("frame_000000.png");
    std::fs::write(&bad, b"not a png").unwrap();

    let mut sink = InMemorySink::new();
    let err = assembler()
        .assemble_into(&[bad], &[], fps30(), &mut sink)
        .unwrap_err();
    assert!(matches!(err, BurninError::UnreadableFrame(_)));
}

#[test]
fn later_bad_frames_are_skipped() {
    let dir = tmp_dir("bad_later");
    let mut frames = write_frames(&dir, 3, 32, 24);

    std::fs::write(&frames[1], b"garbage").unwrap();
    let odd = dir.join("frame_000003.png");
    RgbImage::new(10, 10).save(&odd).unwrap();
    frames.push(odd);

    let mut sink = InMemorySink::new();
    let report = assembler()
        .assemble_into(&frames, &[], fps30(), &mut sink)
        .unwrap();

    assert_eq!(report.frames_written, 2);
    assert_eq!(report.frames_skipped, 2);
    let indices: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(indices, vec![0, 2]);
}

#[test]
fn assemble_missing_directory_errors() {
    let dir = tmp_dir("missing").join("nope");
    let err = assembler()
        .assemble(
            &dir,
            FrameFormat::Png,
            &[],
            &dir.join("out.mp4"),
            fps30(),
            "libx264",
        )
        .unwrap_err();
    assert!(matches!(err, BurninError::Other(_)));
}
