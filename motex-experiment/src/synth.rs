use motex_core::{
    ExperimentError, MotionKind, Rgba, StimulusCondition, SubfieldTracks, TrialDescriptor,
    SUBFIELDS,
};

use crate::config::ExperimentConfig;

/// Build the full per-frame attribute timeline for one trial.
///
/// Baseline: every subfield rotates per the layout; the non-delayed pair
/// shows its color throughout, the delayed pair is off until the onset frame
/// and switches on as a step, not a fade. The pair selected by the trial's
/// condition label is overridden over the translation window: its first slot
/// turns coherent along the trial heading, its second turns non-coherent.
///
/// Pure: identical trial and parameters produce an identical condition.
pub fn synthesize(
    trial: &TrialDescriptor,
    config: &ExperimentConfig,
) -> Result<StimulusCondition, ExperimentError> {
    let layout = &config.layout;
    layout.validate()?;
    let condition = config.condition(&trial.condition_label)?;

    if trial.translation_start_frame > trial.translation_end_frame
        || trial.translation_end_frame > trial.total_frames
    {
        return Err(ExperimentError::FrameOutOfRange {
            frame: trial.translation_end_frame,
            trial: trial.index,
            total_frames: trial.total_frames,
        });
    }

    let frames = trial.total_frames as usize;
    let onset = trial.onset_frame as usize;
    let delayed_color = trial.delayed_color.rgba();
    let non_delayed_color = trial.delayed_color.other().rgba();

    let mut subfields: [SubfieldTracks; SUBFIELDS] = std::array::from_fn(|slot| {
        let rotation = layout.rotation[slot].motion_kind();
        if layout.is_delayed(slot) {
            let mut tracks = SubfieldTracks::filled(frames, rotation, Rgba::BACKGROUND, false);
            for f in onset..frames {
                tracks.color[f] = delayed_color;
                tracks.visible[f] = true;
            }
            tracks
        } else {
            SubfieldTracks::filled(frames, rotation, non_delayed_color, true)
        }
    });

    let pair = layout.pair(condition.cued_field);
    for f in trial.translation_start_frame..trial.translation_end_frame {
        subfields[pair[0]].motion[f as usize] = MotionKind::Linear;
        subfields[pair[1]].motion[f as usize] = MotionKind::NonCoherent;
    }

    Ok(StimulusCondition {
        name: format!(
            "{}-{:03}-{}",
            trial.condition_label,
            trial.heading_deg as i32,
            trial.delayed_color.rgba().letter()
        ),
        total_frames: trial.total_frames,
        subfields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConditionSpec, FieldRole};
    use motex_core::FieldColor;

    fn trial(label: &str) -> TrialDescriptor {
        TrialDescriptor {
            index: 0,
            condition_label: label.to_string(),
            heading_deg: 90.0,
            onset_frame: 56,
            translation_start_frame: 79,
            translation_end_frame: 82,
            total_frames: 120,
            seeds: [1, 2, 3, 4],
            delayed_color: FieldColor::Green,
        }
    }

    #[test]
    fn delayed_pair_switches_on_at_onset_as_a_step() {
        let config = ExperimentConfig::default();
        let condition = synthesize(&trial("cued"), &config).unwrap();
        for &slot in &config.layout.delayed {
            let tracks = &condition.subfields[slot];
            assert!(!tracks.visible[55]);
            assert_eq!(tracks.color[55], Rgba::BACKGROUND);
            assert!(tracks.visible[56]);
            assert_eq!(tracks.color[56], Rgba::GREEN);
        }
        for &slot in &config.layout.non_delayed {
            let tracks = &condition.subfields[slot];
            assert!(tracks.visible[0]);
            assert_eq!(tracks.color[0], Rgba::RED);
        }
    }

    #[test]
    fn cued_condition_routes_translation_to_the_delayed_pair() {
        let config = ExperimentConfig::default();
        let condition = synthesize(&trial("cued"), &config).unwrap();
        let [coherent, non_coherent] = config.layout.delayed;
        for f in 79..82 {
            assert_eq!(condition.subfields[coherent].motion[f], MotionKind::Linear);
            assert_eq!(
                condition.subfields[non_coherent].motion[f],
                MotionKind::NonCoherent
            );
        }
        // outside the window the pair keeps its baseline rotation
        assert_eq!(
            condition.subfields[coherent].motion[78],
            config.layout.rotation[coherent].motion_kind()
        );
        assert_eq!(
            condition.subfields[coherent].motion[82],
            config.layout.rotation[coherent].motion_kind()
        );
        // the non-delayed pair never translates in a cued trial
        for &slot in &config.layout.non_delayed {
            for f in 0..120 {
                assert_eq!(
                    condition.subfields[slot].motion[f],
                    config.layout.rotation[slot].motion_kind()
                );
            }
        }
    }

    #[test]
    fn uncued_condition_routes_translation_to_the_non_delayed_pair() {
        let config = ExperimentConfig::default();
        let condition = synthesize(&trial("uncued"), &config).unwrap();
        let [coherent, non_coherent] = config.layout.non_delayed;
        assert_eq!(condition.subfields[coherent].motion[79], MotionKind::Linear);
        assert_eq!(
            condition.subfields[non_coherent].motion[79],
            MotionKind::NonCoherent
        );
    }

    #[test]
    fn synthesis_is_pure() {
        let config = ExperimentConfig::default();
        let a = synthesize(&trial("cued"), &config).unwrap();
        let b = synthesize(&trial("cued"), &config).unwrap();
        assert_eq!(a, b);
        assert!(a.is_consistent());
    }

    #[test]
    fn unknown_condition_label_is_rejected() {
        let config = ExperimentConfig::default();
        let err = synthesize(&trial("mystery"), &config).unwrap_err();
        assert_eq!(err, ExperimentError::UnknownCondition("mystery".into()));
    }

    #[test]
    fn translation_window_must_fit_the_trial() {
        let config = ExperimentConfig::default();
        let mut bad = trial("cued");
        bad.translation_end_frame = 200;
        assert!(matches!(
            synthesize(&bad, &config).unwrap_err(),
            ExperimentError::FrameOutOfRange { .. }
        ));
    }

    #[test]
    fn eye_and_depth_tracks_stay_per_frame() {
        let config = ExperimentConfig::default();
        let condition = synthesize(&trial("cued"), &config).unwrap();
        for tracks in &condition.subfields {
            assert_eq!(tracks.eye.len(), 120);
            assert_eq!(tracks.depth.len(), 120);
        }
    }

    #[test]
    fn custom_condition_labels_resolve_through_config() {
        let config = ExperimentConfig {
            conditions: vec![ConditionSpec::new("probe", FieldRole::NonDelayed)],
            ..Default::default()
        };
        let condition = synthesize(&trial("probe"), &config).unwrap();
        let [coherent, _] = config.layout.non_delayed;
        assert_eq!(condition.subfields[coherent].motion[80], MotionKind::Linear);
    }
}
