use glam::Vec2;
use motex_core::RotationDir;

/// Direction count of the balanced non-coherent set.
pub const COMPASS_DIRECTIONS: usize = 8;

/// Shrink factor applied after a boundary reflection. Keeps the reflected
/// dot strictly inside the aperture so the reflection test cannot re-trigger
/// on the same tick at floating-point equality.
const CONTAINMENT_SHRINK: f32 = 0.999;

/// Visual-degree to stimulus-plane-meter conversion at a given viewing
/// distance.
pub fn meters_per_degree(view_distance_m: f32) -> f32 {
    view_distance_m * 1.0_f32.to_radians().tan()
}

/// Rotate every dot about the plane origin by one tick's angle. Rotation
/// preserves radii; the re-clamp only absorbs floating-point drift.
pub fn step_rotation(
    dots: &mut [Vec2],
    radius: f32,
    speed_deg_per_sec: f32,
    dir: RotationDir,
    dt: f32,
) {
    let sign = match dir {
        RotationDir::Cw => -1.0,
        RotationDir::Ccw => 1.0,
    };
    let rot = Vec2::from_angle((speed_deg_per_sec * dt).to_radians() * sign);
    for p in dots.iter_mut() {
        *p = rot.rotate(*p);
        let len = p.length();
        if len > radius {
            *p *= radius / len;
        }
    }
}

/// Move every dot by the same displacement vector along `heading_deg`.
pub fn step_coherent(dots: &mut [Vec2], radius: f32, heading_deg: f32, speed_mps: f32, dt: f32) {
    let heading = heading_deg.to_radians();
    let v = Vec2::new(heading.cos(), heading.sin()) * speed_mps * dt;
    for p in dots.iter_mut() {
        *p = reflect_into_aperture(*p + v, radius);
    }
}

/// Balanced non-coherent translation: dot `i` moves along compass direction
/// `i % 8`, so every tick's net displacement over the population is zero by
/// construction. The assignment is stable for the whole trial.
pub fn step_non_coherent(dots: &mut [Vec2], radius: f32, speed_mps: f32, dt: f32) {
    let step = speed_mps * dt;
    for (i, p) in dots.iter_mut().enumerate() {
        let angle =
            (i % COMPASS_DIRECTIONS) as f32 * (std::f32::consts::TAU / COMPASS_DIRECTIONS as f32);
        *p = reflect_into_aperture(*p + Vec2::from_angle(angle) * step, radius);
    }
}

/// Specular reflection about the aperture boundary: the excess distance
/// beyond the radius is folded back twice along the outward normal, then the
/// result is shrunk for strict containment.
fn reflect_into_aperture(p: Vec2, radius: f32) -> Vec2 {
    let len = p.length();
    if len <= radius {
        return p;
    }
    let normal = p / len;
    let excess = len - radius;
    (p - normal * (2.0 * excess)) * CONTAINMENT_SHRINK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::DotField;

    const R: f32 = 0.08;
    const DT: f32 = 1.0 / 75.0;

    fn max_radius(dots: &[Vec2]) -> f32 {
        dots.iter().map(|p| p.length()).fold(0.0, f32::max)
    }

    #[test]
    fn rotation_preserves_radii() {
        let mut field = DotField::new(128, R, 7);
        let before: Vec<f32> = field.positions().iter().map(|p| p.length()).collect();
        for _ in 0..300 {
            step_rotation(field.positions_mut(), R, 120.0, RotationDir::Ccw, DT);
        }
        for (p, r0) in field.positions().iter().zip(before) {
            assert!((p.length() - r0).abs() < 1e-4);
        }
    }

    #[test]
    fn coherent_translation_stays_inside_aperture() {
        let mut field = DotField::new(128, R, 7);
        // long enough to sweep every dot across the boundary several times
        for _ in 0..2000 {
            step_coherent(field.positions_mut(), R, 45.0, 0.02, DT);
        }
        assert!(max_radius(field.positions()) <= R);
    }

    #[test]
    fn non_coherent_translation_stays_inside_aperture() {
        let mut field = DotField::new(128, R, 11);
        for _ in 0..2000 {
            step_non_coherent(field.positions_mut(), R, 0.02, DT);
        }
        assert!(max_radius(field.positions()) <= R);
    }

    #[test]
    fn non_coherent_net_displacement_is_balanced() {
        // multiple of 8 dots, none near the boundary, so no reflections
        let mut dots = vec![Vec2::ZERO; 64];
        let before = dots.clone();
        step_non_coherent(&mut dots, R, 0.02, DT);
        let net: Vec2 = dots
            .iter()
            .zip(&before)
            .map(|(a, b)| *a - *b)
            .fold(Vec2::ZERO, |acc, d| acc + d);
        assert!(net.length() < 1e-6);
    }

    #[test]
    fn direction_assignment_is_stable_per_dot() {
        let mut a = vec![Vec2::ZERO; 16];
        step_non_coherent(&mut a, R, 0.02, DT);
        let first = a.clone();
        let mut b = vec![Vec2::ZERO; 16];
        step_non_coherent(&mut b, R, 0.02, DT);
        assert_eq!(first, b);
        // a second tick doubles each dot's offset along its own direction
        step_non_coherent(&mut a, R, 0.02, DT);
        for (two, one) in a.iter().zip(&first) {
            assert!((*two - *one * 2.0).length() < 1e-6);
        }
    }

    #[test]
    fn reflection_folds_excess_back() {
        // a dot pushed straight out past the boundary comes back inside
        let mut dots = vec![Vec2::new(R - 1e-4, 0.0)];
        step_coherent(&mut dots, R, 0.0, 0.05, DT);
        let p = dots[0];
        assert!(p.length() < R);
        assert!(p.x < R);
    }

    #[test]
    fn meters_per_degree_scales_with_distance() {
        let near = meters_per_degree(0.5);
        let far = meters_per_degree(1.0);
        assert!((far / near - 2.0).abs() < 1e-5);
        // 57.3 cm viewing distance puts one degree at about one centimeter
        assert!((meters_per_degree(0.573) - 0.01).abs() < 2e-4);
    }
}
