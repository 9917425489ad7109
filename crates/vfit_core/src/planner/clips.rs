//! Highlight clip planning.

use super::bitrate::split_bitrate;
use super::{require_positive, PlanError, PlanResult, BYTES_PER_MB};
use crate::config::PlannerSettings;
use crate::models::ClipSpec;

/// Plan clip `clip_index` of `num_clips`.
///
/// Each clip is at most `max_clip_secs` long and no longer than an equal
/// share of the source. Clip centers sit on the boundaries of `num_clips + 1`
/// equal slots, so clips spread across the whole file instead of clustering
/// at the start. Start times are clamped to zero. Clips are never rejected
/// for quality.
pub fn plan_clip(
    total_duration_secs: f64,
    target_size_mb: f64,
    num_clips: usize,
    clip_index: usize,
    max_clip_secs: f64,
    settings: &PlannerSettings,
) -> PlanResult<ClipSpec> {
    require_positive("duration", total_duration_secs)?;
    require_positive("target size", target_size_mb)?;
    require_positive("maximum clip duration", max_clip_secs)?;
    if num_clips == 0 {
        return Err(PlanError::invalid_input("clip count must be at least 1"));
    }
    if clip_index >= num_clips {
        return Err(PlanError::invalid_input(format!(
            "clip index {} out of range for {} clips",
            clip_index, num_clips
        )));
    }

    let clips = num_clips as f64;
    let duration = max_clip_secs.min(total_duration_secs / clips);

    let slot = total_duration_secs / (clips + 1.0);
    let start_time = (slot * (clip_index + 1) as f64 - duration / 2.0).max(0.0);

    let per_clip_bits = (target_size_mb * BYTES_PER_MB * 8.0) / clips;
    let clip_bitrate = (per_clip_bits / duration) as u64;

    Ok(ClipSpec {
        index: clip_index,
        start_time,
        duration,
        plan: split_bitrate(clip_bitrate, settings),
    })
}

/// Plan all clips in index order.
pub fn plan_clips(
    total_duration_secs: f64,
    target_size_mb: f64,
    num_clips: usize,
    max_clip_secs: f64,
    settings: &PlannerSettings,
) -> PlanResult<Vec<ClipSpec>> {
    (0..num_clips)
        .map(|i| {
            plan_clip(
                total_duration_secs,
                target_size_mb,
                num_clips,
                i,
                max_clip_secs,
                settings,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_CLIP: f64 = 30.0;

    fn settings() -> PlannerSettings {
        PlannerSettings::default()
    }

    #[test]
    fn two_minute_source_gives_three_thirty_second_clips() {
        let clips = plan_clips(120.0, 50.0, 3, MAX_CLIP, &settings()).unwrap();

        assert_eq!(clips.len(), 3);
        for clip in &clips {
            assert_eq!(clip.duration, 30.0);
        }
        let starts: Vec<f64> = clips.iter().map(|c| c.start_time).collect();
        assert_eq!(starts, vec![15.0, 45.0, 75.0]);
        assert_eq!(
            clips.iter().map(|c| c.number()).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn clip_bitrate_splits_budget_evenly() {
        let clip = plan_clip(120.0, 50.0, 3, 0, MAX_CLIP, &settings()).unwrap();
        // 50 MiB * 8 / 3 clips / 30s = 4660337 bps
        assert_eq!(clip.plan.total(), 4_660_337);
        assert_eq!(clip.plan.audio_bitrate, 128_000);
        assert_eq!(clip.plan.video_bitrate, 4_532_337);
    }

    #[test]
    fn short_source_shrinks_clips_and_clamps_start() {
        let clips = plan_clips(9.0, 50.0, 3, MAX_CLIP, &settings()).unwrap();
        for clip in &clips {
            assert_eq!(clip.duration, 3.0);
        }
        // slot = 2.25, first start = 2.25 - 1.5
        assert_eq!(clips[0].start_time, 0.75);

        let tiny = plan_clip(0.5, 50.0, 1, 0, MAX_CLIP, &settings()).unwrap();
        assert_eq!(tiny.duration, 0.5);
        assert_eq!(tiny.start_time, 0.0);
    }

    #[test]
    fn starts_increase_and_durations_are_bounded() {
        for duration in [1.0, 10.0, 61.0, 90.0, 120.0, 3_600.0, 86_400.0] {
            let clips = plan_clips(duration, 50.0, 3, MAX_CLIP, &settings()).unwrap();
            for clip in &clips {
                assert!(clip.start_time >= 0.0);
                assert!(clip.duration <= 30.0);
                assert!(clip.duration <= duration / 3.0);
            }
            for pair in clips.windows(2) {
                assert!(pair[1].start_time > pair[0].start_time, "{duration}s");
            }
        }
    }

    #[test]
    fn clips_are_never_rejected_for_quality() {
        let clip = plan_clip(36_000.0, 0.5, 3, 2, MAX_CLIP, &settings()).unwrap();
        assert!(clip.plan.video_bitrate < 200_000);
    }

    #[test]
    fn rejects_invalid_input() {
        assert!(matches!(
            plan_clip(0.0, 50.0, 3, 0, MAX_CLIP, &settings()),
            Err(PlanError::InvalidInput(_))
        ));
        assert!(matches!(
            plan_clip(120.0, 50.0, 0, 0, MAX_CLIP, &settings()),
            Err(PlanError::InvalidInput(_))
        ));
        assert!(matches!(
            plan_clip(120.0, 50.0, 3, 3, MAX_CLIP, &settings()),
            Err(PlanError::InvalidInput(_))
        ));
        assert!(matches!(
            plan_clip(120.0, -5.0, 3, 0, MAX_CLIP, &settings()),
            Err(PlanError::InvalidInput(_))
        ));
    }
}
