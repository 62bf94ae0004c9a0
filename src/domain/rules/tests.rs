// Unit tests for domain rules

use std::path::{Path, PathBuf};

use super::*;

#[test]
fn test_media_file_detection() {
    assert!(is_media_file(Path::new("/videos/clip.MKV")));
    assert!(is_media_file(Path::new("movie.m2ts")));
    assert!(!is_media_file(Path::new("notes.txt")));
    assert!(!is_media_file(Path::new("no_extension")));
}

#[test]
fn test_legacy_format_policy() {
    assert!(is_legacy_format(".avi"));
    assert!(is_legacy_format(".VOB"));
    assert!(!is_legacy_format(".mkv"));
    assert!(!is_legacy_format(""));
}

#[test]
fn test_contiguous_ordinals() {
    assert!(is_contiguous(&[1, 2, 3]));
    assert!(is_contiguous(&[3, 1, 2]));
    assert!(is_contiguous(&[7, 8]));
    assert!(!is_contiguous(&[1, 3]));
    assert!(!is_contiguous(&[1, 1, 2]));
    assert!(!is_contiguous(&[]));
}

#[test]
fn test_strict_pass_any_output_is_generic_fault() {
    let classifier = SignatureClassifier::new();
    assert_eq!(classifier.classify(CheckPass::Strict, ""), FaultKind::None);
    assert_eq!(classifier.classify(CheckPass::Strict, "  \n"), FaultKind::None);
    assert_eq!(
        classifier.classify(CheckPass::Strict, "[h264 @ 0x1] error while decoding MB 3 7"),
        FaultKind::Generic
    );
}

#[test]
fn test_stream_copy_pass_matches_timestamp_signatures() {
    let classifier = SignatureClassifier::new();
    let noisy = "Input #0, matroska\n[null @ 0x2] Application provided invalid, \
                 non monotonically increasing dts to muxer in stream 0";
    assert_eq!(classifier.classify(CheckPass::StreamCopy, noisy), FaultKind::Timestamp);
    assert_eq!(
        classifier.classify(CheckPass::StreamCopy, "Invalid DTS/PTS combination"),
        FaultKind::Timestamp
    );
    assert_eq!(
        classifier.classify(CheckPass::StreamCopy, "Stream mapping: copy"),
        FaultKind::None
    );
}

#[test]
fn test_custom_signature() {
    let classifier = SignatureClassifier::new().with_signature("pts has no value");
    assert_eq!(
        classifier.classify(CheckPass::StreamCopy, "Timestamps are unset: pts has no value"),
        FaultKind::Timestamp
    );
}

#[test]
fn test_ladder_clean_remux_finishes() {
    let mut ladder = RepairLadder::new(false, true);
    assert_eq!(ladder.advance(StageReport::Skipped), Transition::Enter(RepairStage::Remux));
    let remuxed = PathBuf::from("out/a_remux.mp4");
    assert_eq!(
        ladder.advance(StageReport::Healthy(remuxed.clone())),
        Transition::Finish(RepairOutcome::Remuxed { path: remuxed })
    );
    assert_eq!(ladder.stage(), RepairStage::Finished);
}

#[test]
fn test_ladder_faulty_goes_remux_then_reencode_then_extract() {
    let mut ladder = RepairLadder::new(false, true);
    ladder.advance(StageReport::Skipped);
    assert_eq!(
        ladder.advance(StageReport::Unhealthy(PathBuf::from("a_remux.mp4"))),
        Transition::Enter(RepairStage::Reencode)
    );
    assert_eq!(
        ladder.advance(StageReport::Unhealthy(PathBuf::from("a.mkv"))),
        Transition::Enter(RepairStage::Extract)
    );
    assert_eq!(
        ladder.advance(StageReport::InvocationFailed),
        Transition::Finish(RepairOutcome::Unrepairable {
            last_stage: RepairStage::Extract
        })
    );
}

#[test]
fn test_ladder_skipped_remux_counts_as_failed() {
    let mut ladder = RepairLadder::new(false, false);
    ladder.advance(StageReport::Skipped);
    assert_eq!(
        ladder.advance(StageReport::Skipped),
        Transition::Enter(RepairStage::Reencode)
    );
    assert_eq!(
        ladder.advance(StageReport::InvocationFailed),
        Transition::Finish(RepairOutcome::Unrepairable {
            last_stage: RepairStage::Reencode
        })
    );
}

#[test]
fn test_ladder_legacy_forces_reencode_after_clean_remux() {
    let mut ladder = RepairLadder::new(true, true);
    ladder.advance(StageReport::Skipped);
    let remuxed = PathBuf::from("a_remux.avi");
    assert_eq!(
        ladder.advance(StageReport::Healthy(remuxed.clone())),
        Transition::Enter(RepairStage::Reencode)
    );
    // re-encode did not come out clean: keep the clean remux, never extract
    assert_eq!(
        ladder.advance(StageReport::Unhealthy(PathBuf::from("a.mkv"))),
        Transition::Finish(RepairOutcome::Remuxed { path: remuxed })
    );
}

#[test]
fn test_ladder_legacy_prefers_reencoded_output() {
    let mut ladder = RepairLadder::new(true, true);
    ladder.advance(StageReport::Skipped);
    ladder.advance(StageReport::Healthy(PathBuf::from("a_remux.avi")));
    let encoded = PathBuf::from("a.mkv");
    assert_eq!(
        ladder.advance(StageReport::Healthy(encoded.clone())),
        Transition::Finish(RepairOutcome::Reencoded { path: encoded })
    );
}

#[test]
fn test_ladder_extraction_outcome() {
    let mut ladder = RepairLadder::new(false, true);
    ladder.advance(StageReport::Skipped);
    ladder.advance(StageReport::InvocationFailed);
    ladder.advance(StageReport::InvocationFailed);
    let video = PathBuf::from("a_video.mkv");
    assert_eq!(
        ladder.advance(StageReport::Extracted {
            video: video.clone(),
            audio: None
        }),
        Transition::Finish(RepairOutcome::StreamsExtracted { video, audio: None })
    );
}
