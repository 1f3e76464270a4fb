use motex_core::{ExperimentError, FieldColor, TrialDescriptor};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use crate::config::ExperimentConfig;

/// Build the balanced, shuffled trial list for one block.
///
/// Enumerates condition x heading x repetition cells (doubled into a
/// delayed-red and delayed-green instance when color balancing is on), draws
/// the four dot seeds per trial in a fixed order from `rng`, then shuffles
/// the whole list with the same stream and reindexes it. Re-running with an
/// identically seeded `rng` reproduces the list exactly.
pub fn plan<R: Rng + ?Sized>(
    config: &ExperimentConfig,
    rng: &mut R,
) -> Result<Vec<TrialDescriptor>, ExperimentError> {
    config.validate()?;
    let rate = config.sim_rate()?;

    let onset_frame = rate.frames_for_ms(config.delayed_onset_ms);
    let translation_start_frame = onset_frame + rate.frames_for_ms(config.pre_translation_ms);
    let translation_end_frame =
        translation_start_frame + rate.frames_for_ms(config.translation_duration_ms);
    let total_frames = translation_end_frame + rate.frames_for_ms(config.post_translation_ms);

    let colors: &[FieldColor] = if config.color_balanced {
        &[FieldColor::Red, FieldColor::Green]
    } else {
        std::slice::from_ref(&config.default_delayed_color)
    };

    let mut trials = Vec::new();
    for condition in &config.conditions {
        for heading_deg in ExperimentConfig::headings() {
            for _ in 0..config.repetitions {
                for &delayed_color in colors {
                    let seeds = [
                        rng.random::<u32>(),
                        rng.random::<u32>(),
                        rng.random::<u32>(),
                        rng.random::<u32>(),
                    ];
                    trials.push(TrialDescriptor {
                        index: 0,
                        condition_label: condition.label.clone(),
                        heading_deg,
                        onset_frame,
                        translation_start_frame,
                        translation_end_frame,
                        total_frames,
                        seeds,
                        delayed_color,
                    });
                }
            }
        }
    }

    trials.shuffle(rng);
    for (index, trial) in trials.iter_mut().enumerate() {
        trial.index = index;
    }

    info!(trials = trials.len(), "block planned");
    Ok(trials)
}
