//! Full-length compression planning.

use super::{require_positive, PlanError, PlanResult, BYTES_PER_MB};
use crate::config::PlannerSettings;
use crate::models::BitratePlan;

/// Total bit rate that spends `target_size_mb` over `duration_secs`.
pub fn total_bitrate(duration_secs: f64, target_size_mb: f64) -> PlanResult<u64> {
    require_positive("duration", duration_secs)?;
    require_positive("target size", target_size_mb)?;

    let total_bits = target_size_mb * BYTES_PER_MB * 8.0;
    Ok((total_bits / duration_secs) as u64)
}

/// Split a total bit rate into audio and video.
///
/// Audio gets `min(max_audio_bitrate, total / audio_share_divisor)`, video
/// gets the rest, so the two always sum to `total`.
pub fn split_bitrate(total: u64, settings: &PlannerSettings) -> BitratePlan {
    let share = total / settings.audio_share_divisor.max(1);
    let audio_bitrate = share.min(settings.max_audio_bitrate);

    BitratePlan {
        video_bitrate: total - audio_bitrate,
        audio_bitrate,
    }
}

/// Plan a two-pass compression of the whole file.
///
/// Fails with [`PlanError::Rejected`] when the video bit rate would drop
/// below `min_video_bitrate`; callers fall back to clips in that case.
pub fn plan_full_compression(
    duration_secs: f64,
    target_size_mb: f64,
    settings: &PlannerSettings,
) -> PlanResult<BitratePlan> {
    let total = total_bitrate(duration_secs, target_size_mb)?;
    let plan = split_bitrate(total, settings);

    if plan.video_bitrate < settings.min_video_bitrate {
        return Err(PlanError::Rejected {
            video_bitrate: plan.video_bitrate,
            floor: settings.min_video_bitrate,
        });
    }

    Ok(plan)
}

/// Whether an output of `actual_mb` is acceptable for `target_mb`.
///
/// The boundary (`actual == target * tolerance`) is accepted.
pub fn within_size_budget(actual_mb: f64, target_mb: f64, tolerance: f64) -> bool {
    actual_mb <= target_mb * tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> PlannerSettings {
        PlannerSettings::default()
    }

    #[test]
    fn ten_minutes_at_fifty_mb_is_accepted() {
        let plan = plan_full_compression(600.0, 50.0, &settings()).unwrap();
        // 50 MiB * 8 / 600s = 699050 bps
        assert_eq!(plan.total(), 699_050);
        assert_eq!(plan.audio_bitrate, 69_905);
        assert_eq!(plan.video_bitrate, 629_145);
    }

    #[test]
    fn ten_hours_at_fifty_mb_is_rejected() {
        let err = plan_full_compression(36_000.0, 50.0, &settings()).unwrap_err();
        match err {
            PlanError::Rejected {
                video_bitrate,
                floor,
            } => {
                assert!(video_bitrate < 200_000);
                assert_eq!(floor, 200_000);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn audio_is_capped_for_large_budgets() {
        let plan = plan_full_compression(60.0, 500.0, &settings()).unwrap();
        assert_eq!(plan.audio_bitrate, 128_000);
        assert_eq!(plan.total(), total_bitrate(60.0, 500.0).unwrap());
    }

    #[test]
    fn split_invariants_hold_across_inputs() {
        let durations = [0.5, 1.0, 7.3, 60.0, 599.9, 3_600.0, 36_000.0, 250_000.0];
        let sizes = [0.1, 1.0, 8.0, 25.0, 50.0, 333.3, 4_096.0];

        for &duration in &durations {
            for &size in &sizes {
                let total = total_bitrate(duration, size).unwrap();
                let plan = split_bitrate(total, &settings());
                assert!(plan.audio_bitrate <= 128_000, "{duration}s {size}MB");
                assert!(plan.audio_bitrate <= total / 10, "{duration}s {size}MB");
                assert_eq!(plan.video_bitrate + plan.audio_bitrate, total);

                let accepted = plan_full_compression(duration, size, &settings()).is_ok();
                assert_eq!(accepted, plan.video_bitrate >= 200_000, "{duration}s {size}MB");
            }
        }
    }

    #[test]
    fn floor_boundary_is_inclusive() {
        let custom = PlannerSettings {
            min_video_bitrate: 629_145,
            ..settings()
        };
        assert!(plan_full_compression(600.0, 50.0, &custom).is_ok());

        let stricter = PlannerSettings {
            min_video_bitrate: 629_146,
            ..settings()
        };
        assert!(plan_full_compression(600.0, 50.0, &stricter).is_err());
    }

    #[test]
    fn rejects_invalid_input() {
        for (duration, size) in [(0.0, 50.0), (-1.0, 50.0), (f64::NAN, 50.0), (60.0, 0.0)] {
            let err = plan_full_compression(duration, size, &settings()).unwrap_err();
            assert!(matches!(err, PlanError::InvalidInput(_)));
        }
    }

    #[test]
    fn size_budget_boundary() {
        let limit = 50.0 * 1.1;
        assert!(within_size_budget(limit, 50.0, 1.1));
        assert!(within_size_budget(49.0, 50.0, 1.1));
        assert!(!within_size_budget(limit + 1e-6, 50.0, 1.1));
    }
}
