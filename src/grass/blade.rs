//! A single deformable grass blade.
//!
//! Blades start upright in a randomized rest pose. Bending flattens the blade
//! away from the actor that stepped on it. Each restore tick advances a bend
//! timer: the blade stays flat for a hold period, then ramps linearly back
//! to its rest pose and becomes upright again.

use std::f32::consts::{FRAC_PI_3, TAU};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{Vec2, Vec3};

/// Tilt applied to a flattened blade (radians about its local X axis).
const BENT_TILT: f32 = -FRAC_PI_3;
/// Vertical scale of a flattened blade.
const BENT_SCALE_Y: f32 = 0.6;
/// Trampled olive tint (0x6b8e23).
const TRAMPLED_COLOR: [f32; 3] = [107.0 / 255.0, 142.0 / 255.0, 35.0 / 255.0];
/// How far a bend pulls the blade color toward the trampled tint.
const TRAMPLED_TINT: f32 = 0.7;

/// Orientation and scale of a blade.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BladePose {
    /// Rotation about local X (lean forward/back).
    pub tilt: f32,
    /// Rotation about Y.
    pub yaw: f32,
    /// Rotation about local Z (lean sideways).
    pub roll: f32,
    pub scale: Vec3,
}

impl Default for BladePose {
    fn default() -> Self {
        Self {
            tilt: 0.0,
            yaw: 0.0,
            roll: 0.0,
            scale: Vec3::ONE,
        }
    }
}

impl BladePose {
    /// Randomized rest pose: slight lean, random yaw, uniform scale 0.8-1.4.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let scale = 0.8 + rng.r#gen::<f32>() * 0.6;
        Self {
            tilt: (rng.r#gen::<f32>() - 0.5) * 0.4,
            roll: (rng.r#gen::<f32>() - 0.5) * 0.2,
            yaw: rng.r#gen::<f32>() * TAU,
            scale: Vec3::splat(scale),
        }
    }

    /// Flattened pose for a bend along ground-plane `direction`.
    ///
    /// Yaw and the horizontal scale axes are kept from the rest pose.
    pub fn flattened(rest: &Self, direction: Vec2) -> Self {
        Self {
            tilt: BENT_TILT,
            yaw: rest.yaw,
            roll: direction.y.atan2(direction.x) * 0.5,
            scale: Vec3::new(rest.scale.x, BENT_SCALE_Y, rest.scale.z),
        }
    }

    /// Linearly interpolate between two poses.
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            tilt: self.tilt + (other.tilt - self.tilt) * t,
            yaw: self.yaw + (other.yaw - self.yaw) * t,
            roll: self.roll + (other.roll - self.roll) * t,
            scale: self.scale.lerp(other.scale, t),
        }
    }

    /// Approximate equality, used to confirm a blade is back at rest.
    pub fn approx_eq(&self, other: &Self, tolerance: f32) -> bool {
        (self.tilt - other.tilt).abs() <= tolerance
            && (self.yaw - other.yaw).abs() <= tolerance
            && (self.roll - other.roll).abs() <= tolerance
            && self.scale.abs_diff_eq(other.scale, tolerance)
    }
}

/// Whether a blade is standing or flattened.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BendState {
    #[default]
    Upright,
    Bent,
}

/// Result of one restore tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Blade was already upright; nothing happened.
    Untouched,
    /// Still holding flat or ramping back.
    Recovering,
    /// Finished ramping this tick and is upright again.
    Restored,
}

impl RestoreOutcome {
    pub fn is_restored(self) -> bool {
        self == RestoreOutcome::Restored
    }
}

/// Hold-then-ramp durations, in restore ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryTiming {
    pub hold_ticks: u32,
    pub recovery_ticks: u32,
}

impl Default for RecoveryTiming {
    fn default() -> Self {
        Self {
            hold_ticks: 240,
            recovery_ticks: 60,
        }
    }
}

impl RecoveryTiming {
    /// Restore ticks from bend until the blade is upright again.
    pub fn total_ticks(&self) -> u32 {
        self.hold_ticks + self.recovery_ticks
    }
}

/// One grass blade.
#[derive(Clone, Debug)]
pub struct GrassBlade {
    position: Vec3,
    rest: BladePose,
    pose: BladePose,
    /// Pose at the moment of bending, start of the recovery ramp.
    bent_pose: BladePose,
    base_color: [f32; 3],
    color: [f32; 3],
    bent_color: [f32; 3],
    state: BendState,
    bend_direction: Vec2,
    bend_elapsed: u32,
    opacity: f32,
}

impl GrassBlade {
    pub fn new(position: Vec3, rest: BladePose, base_color: [f32; 3]) -> Self {
        Self {
            position,
            rest,
            pose: rest,
            bent_pose: rest,
            base_color,
            color: base_color,
            bent_color: base_color,
            state: BendState::Upright,
            bend_direction: Vec2::ZERO,
            bend_elapsed: 0,
            opacity: 1.0,
        }
    }

    /// Blade with a randomized rest pose and green shade.
    pub fn random<R: Rng + ?Sized>(position: Vec3, rng: &mut R) -> Self {
        let hue = 0.3 + rng.r#gen::<f32>() * 0.1;
        let saturation = 0.6 + rng.r#gen::<f32>() * 0.3;
        let lightness = 0.3 + rng.r#gen::<f32>() * 0.2;
        let rest = BladePose::random(rng);
        Self::new(position, rest, hsl_to_rgb(hue, saturation, lightness))
    }

    /// Flatten the blade along ground-plane `direction`.
    ///
    /// Returns `false` without touching any state if the blade is already
    /// bent, so a blade is never counted twice.
    pub fn bend(&mut self, direction: Vec2) -> bool {
        if self.state == BendState::Bent {
            return false;
        }

        self.state = BendState::Bent;
        self.bend_direction = direction;
        self.bend_elapsed = 0;
        self.pose = BladePose::flattened(&self.rest, direction);
        self.bent_pose = self.pose;
        self.color = lerp_color(self.base_color, TRAMPLED_COLOR, TRAMPLED_TINT);
        self.bent_color = self.color;
        true
    }

    /// Advance the bend timer by one tick.
    ///
    /// The blade holds flat for `hold_ticks`, then ramps linearly over
    /// `recovery_ticks` back to its rest pose. Returns `Restored` on the
    /// tick it becomes upright.
    pub fn restore(&mut self, timing: RecoveryTiming) -> RestoreOutcome {
        if self.state != BendState::Bent {
            return RestoreOutcome::Untouched;
        }

        self.bend_elapsed += 1;
        if self.bend_elapsed <= timing.hold_ticks {
            return RestoreOutcome::Recovering;
        }

        let progress =
            (self.bend_elapsed - timing.hold_ticks) as f32 / timing.recovery_ticks as f32;
        if progress < 1.0 {
            self.pose = self.bent_pose.lerp(&self.rest, progress);
            self.color = lerp_color(self.bent_color, self.base_color, progress);
            RestoreOutcome::Recovering
        } else {
            self.pose = self.rest;
            self.color = self.base_color;
            self.state = BendState::Upright;
            RestoreOutcome::Restored
        }
    }

    /// Snap straight back to the rest pose (level reset).
    pub fn reset(&mut self) {
        self.pose = self.rest;
        self.color = self.base_color;
        self.state = BendState::Upright;
        self.bend_direction = Vec2::ZERO;
        self.bend_elapsed = 0;
        self.opacity = 1.0;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rest_pose(&self) -> &BladePose {
        &self.rest
    }

    pub fn pose(&self) -> &BladePose {
        &self.pose
    }

    pub fn color(&self) -> [f32; 3] {
        self.color
    }

    pub fn state(&self) -> BendState {
        self.state
    }

    pub fn is_bent(&self) -> bool {
        self.state == BendState::Bent
    }

    pub fn bend_direction(&self) -> Vec2 {
        self.bend_direction
    }

    /// Restore ticks since the last successful bend.
    pub fn bend_elapsed(&self) -> u32 {
        self.bend_elapsed
    }

    /// Rendering hint written by the view-cone pass.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub(crate) fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
    }
}

fn lerp_color(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

/// HSL (all components in `[0, 1]`) to linear RGB.
fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    if s <= 0.0 {
        return [l; 3];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    [
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    ]
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn blade() -> GrassBlade {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        GrassBlade::random(Vec3::new(1.0, 1.25, 0.0), &mut rng)
    }

    #[test]
    fn test_bend_then_full_restore_returns_to_rest() {
        let mut b = blade();
        let rest = *b.rest_pose();
        let base = b.color();
        let timing = RecoveryTiming::default();

        assert!(b.bend(Vec2::new(1.0, 0.0)));
        assert!(b.is_bent());
        assert!(!b.pose().approx_eq(&rest, 1e-3));

        let mut restored_at = None;
        for tick in 1..=timing.total_ticks() + 10 {
            if b.restore(timing).is_restored() {
                restored_at = Some(tick);
                break;
            }
        }

        assert_eq!(restored_at, Some(timing.total_ticks()));
        assert_eq!(b.state(), BendState::Upright);
        assert!(b.pose().approx_eq(&rest, 1e-5));
        assert_eq!(b.color(), base);
    }

    #[test]
    fn test_second_bend_is_rejected() {
        let mut b = blade();
        let timing = RecoveryTiming::default();
        assert!(b.bend(Vec2::X));
        b.restore(timing);
        b.restore(timing);
        assert_eq!(b.bend_elapsed(), 2);

        assert!(!b.bend(Vec2::Y));
        assert_eq!(b.bend_elapsed(), 2);
        assert_eq!(b.bend_direction(), Vec2::X);
    }

    #[test]
    fn test_holds_flat_before_ramping() {
        let mut b = blade();
        let timing = RecoveryTiming { hold_ticks: 10, recovery_ticks: 4 };
        b.bend(Vec2::Y);
        let flat = *b.pose();

        for _ in 0..10 {
            assert_eq!(b.restore(timing), RestoreOutcome::Recovering);
            assert_eq!(*b.pose(), flat);
        }

        // Halfway through the ramp
        b.restore(timing);
        b.restore(timing);
        let halfway = flat.lerp(b.rest_pose(), 0.5);
        assert!(b.pose().approx_eq(&halfway, 1e-5));
    }

    #[test]
    fn test_restore_on_upright_is_noop() {
        let mut b = blade();
        assert_eq!(b.restore(RecoveryTiming::default()), RestoreOutcome::Untouched);
        assert_eq!(b.bend_elapsed(), 0);
    }

    #[test]
    fn test_flattened_pose_depends_on_direction() {
        let rest = BladePose::default();
        let east = BladePose::flattened(&rest, Vec2::X);
        let north = BladePose::flattened(&rest, Vec2::Y);
        assert_eq!(east.tilt, BENT_TILT);
        assert_eq!(east.scale.y, BENT_SCALE_Y);
        assert!(east.roll.abs() < 1e-6);
        assert!((north.roll - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
    }

    #[test]
    fn test_random_rest_pose_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..100 {
            let p = BladePose::random(&mut rng);
            assert!(p.tilt.abs() <= 0.2);
            assert!(p.roll.abs() <= 0.1);
            assert!((0.8..=1.4).contains(&p.scale.x));
            assert_eq!(p.scale.x, p.scale.y);
        }
    }

    #[test]
    fn test_hsl_to_rgb() {
        let red = hsl_to_rgb(0.0, 1.0, 0.5);
        assert!((red[0] - 1.0).abs() < 1e-6 && red[1].abs() < 1e-6 && red[2].abs() < 1e-6);
        let grey = hsl_to_rgb(0.3, 0.0, 0.4);
        assert_eq!(grey, [0.4; 3]);
    }
}
