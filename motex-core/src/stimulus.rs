use serde::{Deserialize, Serialize};

use crate::SUBFIELDS;

/// Per-frame motion assignment for one subfield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionKind {
    None,
    RotationCw,
    RotationCcw,
    Linear,
    NonCoherent,
}

impl MotionKind {
    /// Stable one-character code used in motion payload rows.
    pub fn code(self) -> char {
        match self {
            MotionKind::None => '0',
            MotionKind::RotationCw => '1',
            MotionKind::RotationCcw => '2',
            MotionKind::Linear => '3',
            MotionKind::NonCoherent => '4',
        }
    }
}

/// Sense of a field rotation step, in the stimulus plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationDir {
    Cw,
    Ccw,
}

impl RotationDir {
    pub fn motion_kind(self) -> MotionKind {
        match self {
            RotationDir::Cw => MotionKind::RotationCw,
            RotationDir::Ccw => MotionKind::RotationCcw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const RED: Rgba = Rgba([255, 0, 0, 255]);
    pub const GREEN: Rgba = Rgba([0, 255, 0, 255]);
    pub const BACKGROUND: Rgba = Rgba([0, 0, 0, 255]);

    /// One-letter code used in color payload rows. `?` marks a value outside
    /// the experiment palette.
    pub fn letter(self) -> char {
        match self {
            Rgba::RED => 'R',
            Rgba::GREEN => 'G',
            Rgba::BACKGROUND => 'K',
            _ => '?',
        }
    }
}

/// Color assigned to the delayed field of a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldColor {
    Red,
    Green,
}

impl FieldColor {
    pub fn rgba(self) -> Rgba {
        match self {
            FieldColor::Red => Rgba::RED,
            FieldColor::Green => Rgba::GREEN,
        }
    }

    /// The color of the opposite field.
    pub fn other(self) -> FieldColor {
        match self {
            FieldColor::Red => FieldColor::Green,
            FieldColor::Green => FieldColor::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Eye {
    Both,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepthPlane {
    Fixation,
    Near,
    Far,
}

/// Per-frame attribute tracks for one subfield. All five tracks run over the
/// same frame range; index `f` describes the stimulus exactly at simulation
/// tick `f`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubfieldTracks {
    pub motion: Vec<MotionKind>,
    pub color: Vec<Rgba>,
    pub visible: Vec<bool>,
    pub eye: Vec<Eye>,
    pub depth: Vec<DepthPlane>,
}

impl SubfieldTracks {
    /// Uniform tracks of `frames` entries.
    pub fn filled(frames: usize, motion: MotionKind, color: Rgba, visible: bool) -> Self {
        Self {
            motion: vec![motion; frames],
            color: vec![color; frames],
            visible: vec![visible; frames],
            eye: vec![Eye::Both; frames],
            depth: vec![DepthPlane::Fixation; frames],
        }
    }

    pub fn len(&self) -> usize {
        self.motion.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motion.is_empty()
    }

    /// All five tracks have the same length.
    pub fn is_consistent(&self) -> bool {
        let n = self.motion.len();
        self.color.len() == n
            && self.visible.len() == n
            && self.eye.len() == n
            && self.depth.len() == n
    }
}

/// The full per-frame timeline of one trial's stimulus, one track set per
/// subfield. Built fresh for every trial attempt and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StimulusCondition {
    pub name: String,
    pub total_frames: u32,
    pub subfields: [SubfieldTracks; SUBFIELDS],
}

impl StimulusCondition {
    /// Every subfield carries consistent tracks spanning `total_frames`.
    pub fn is_consistent(&self) -> bool {
        self.subfields
            .iter()
            .all(|s| s.is_consistent() && s.len() == self.total_frames as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motion_codes_are_distinct() {
        let kinds = [
            MotionKind::None,
            MotionKind::RotationCw,
            MotionKind::RotationCcw,
            MotionKind::Linear,
            MotionKind::NonCoherent,
        ];
        for a in kinds {
            for b in kinds {
                assert_eq!(a == b, a.code() == b.code());
            }
        }
    }

    #[test]
    fn palette_letters() {
        assert_eq!(Rgba::RED.letter(), 'R');
        assert_eq!(Rgba::GREEN.letter(), 'G');
        assert_eq!(Rgba::BACKGROUND.letter(), 'K');
        assert_eq!(Rgba([1, 2, 3, 4]).letter(), '?');
    }

    #[test]
    fn filled_tracks_are_consistent() {
        let tracks = SubfieldTracks::filled(120, MotionKind::RotationCw, Rgba::RED, true);
        assert!(tracks.is_consistent());
        assert_eq!(tracks.len(), 120);
    }
}
