use motex_core::{ExperimentError, FieldColor, RotationDir, DIRECTIONS, SUBFIELDS};
use motex_motion::meters_per_degree;
use motex_timing::SimRate;
use serde::{Deserialize, Serialize};

/// Which perceptual field a condition routes the translation pair to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldRole {
    Delayed,
    NonDelayed,
}

/// A named trial condition and the field its translation is cued to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSpec {
    pub label: String,
    pub cued_field: FieldRole,
}

impl ConditionSpec {
    pub fn new(label: impl Into<String>, cued_field: FieldRole) -> Self {
        Self {
            label: label.into(),
            cued_field,
        }
    }
}

/// Mapping of the four subfield slots onto the two perceptual fields. The
/// source asserted this pairing by convention and the convention drifted
/// between revisions, so it is configuration here, not a constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldLayout {
    /// Subfield slots of the non-delayed field. During a translation window
    /// routed here, the first listed slot carries the coherent stream and
    /// the second the non-coherent one.
    pub non_delayed: [usize; 2],
    /// Subfield slots of the delayed field, same ordering rule.
    pub delayed: [usize; 2],
    /// Baseline rotation direction per subfield slot.
    pub rotation: [RotationDir; SUBFIELDS],
}

impl Default for FieldLayout {
    fn default() -> Self {
        Self {
            non_delayed: [0, 1],
            delayed: [2, 3],
            rotation: [
                RotationDir::Cw,
                RotationDir::Cw,
                RotationDir::Ccw,
                RotationDir::Ccw,
            ],
        }
    }
}

impl FieldLayout {
    /// The two pairs together must cover each subfield slot exactly once.
    pub fn validate(&self) -> Result<(), ExperimentError> {
        let mut seen = [false; SUBFIELDS];
        for &slot in self.non_delayed.iter().chain(self.delayed.iter()) {
            if slot >= SUBFIELDS || seen[slot] {
                return Err(ExperimentError::InvalidLayout);
            }
            seen[slot] = true;
        }
        Ok(())
    }

    pub fn pair(&self, role: FieldRole) -> [usize; 2] {
        match role {
            FieldRole::Delayed => self.delayed,
            FieldRole::NonDelayed => self.non_delayed,
        }
    }

    pub fn is_delayed(&self, slot: usize) -> bool {
        self.delayed.contains(&slot)
    }
}

/// All experiment parameters. Millisecond fields are converted to
/// frame-exact tick counts against `sim_hz` at plan time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub sim_hz: f64,
    pub view_distance_m: f32,
    pub aperture_radius_deg: f32,
    pub dots_per_subfield: usize,
    pub rotation_speed_degps: f32,
    pub translation_speed_degps: f32,
    /// Delayed-field onset, from trial start.
    pub delayed_onset_ms: u64,
    /// Gap between onset and the translation window.
    pub pre_translation_ms: u64,
    pub translation_duration_ms: u64,
    /// Stimulus tail after the translation window closes.
    pub post_translation_ms: u64,
    /// Response window length in ticks; 0 disables the timeout.
    pub max_response_frames: u32,
    pub repetitions: usize,
    /// Double every (condition, heading) cell into a delayed-red and a
    /// delayed-green instance.
    pub color_balanced: bool,
    /// Delayed-field color used for every trial when balancing is off.
    pub default_delayed_color: FieldColor,
    pub conditions: Vec<ConditionSpec>,
    pub layout: FieldLayout,
    /// Rewind the shuffled trial list when the queue drains instead of
    /// ending the block.
    pub loop_block: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            sim_hz: 75.0,
            view_distance_m: 0.573,
            aperture_radius_deg: 8.0,
            dots_per_subfield: 50,
            rotation_speed_degps: 120.0,
            translation_speed_degps: 8.0,
            delayed_onset_ms: 750,
            pre_translation_ms: 300,
            translation_duration_ms: 40,
            post_translation_ms: 500,
            max_response_frames: 450,
            repetitions: 10,
            color_balanced: true,
            default_delayed_color: FieldColor::Red,
            conditions: vec![
                ConditionSpec::new("cued", FieldRole::Delayed),
                ConditionSpec::new("uncued", FieldRole::NonDelayed),
            ],
            layout: FieldLayout::default(),
            loop_block: false,
        }
    }
}

impl ExperimentConfig {
    /// The eight response headings, 45 degrees apart.
    pub fn headings() -> [f32; DIRECTIONS] {
        std::array::from_fn(|i| i as f32 * 45.0)
    }

    pub fn sim_rate(&self) -> Result<SimRate, ExperimentError> {
        SimRate::new(self.sim_hz).map_err(|e| ExperimentError::InvalidRate(e.0))
    }

    pub fn aperture_radius_m(&self) -> f32 {
        self.aperture_radius_deg * meters_per_degree(self.view_distance_m)
    }

    pub fn translation_speed_mps(&self) -> f32 {
        self.translation_speed_degps * meters_per_degree(self.view_distance_m)
    }

    pub fn condition(&self, label: &str) -> Result<&ConditionSpec, ExperimentError> {
        self.conditions
            .iter()
            .find(|c| c.label == label)
            .ok_or_else(|| ExperimentError::UnknownCondition(label.to_string()))
    }

    /// Fatal-at-block-start checks.
    pub fn validate(&self) -> Result<(), ExperimentError> {
        self.sim_rate()?;
        self.layout.validate()?;
        if self.dots_per_subfield == 0 {
            return Err(ExperimentError::NoDots);
        }
        if !(self.aperture_radius_deg > 0.0) {
            return Err(ExperimentError::InvalidAperture(self.aperture_radius_deg));
        }
        if self.conditions.is_empty() || self.repetitions == 0 {
            return Err(ExperimentError::EmptyPlan {
                conditions: self.conditions.len(),
                headings: DIRECTIONS,
                repetitions: self.repetitions,
            });
        }
        Ok(())
    }
}
