//! The per-animation state machine
//!
//! An [`Animation`] is one scheduled transition of one property domain on
//! exactly one target. Start state is captured once at creation; from then
//! on the animation is a pure function of its elapsed time, and
//! [`Animation::frame`] never mutates the animation or the target. All target
//! mutation happens in the manager's apply phase.

use crate::easing::Easing;
use drift_core::{target_key, Interpolate, Point, SharedTarget, Size};

/// Which facet of a target an animation drives, with the captured
/// start/end state for that facet
#[derive(Clone, Copy, Debug)]
pub enum Domain {
    /// Top-left position transition
    Move { from: Point, to: Point },
    /// Size transition by relative multipliers (1.0 = unchanged), anchored
    /// at the center of the starting box
    Scale {
        origin: Point,
        start_size: Size,
        to_scale_x: f32,
        to_scale_y: f32,
    },
    /// Opacity transition
    Fade { from: f32, to: f32 },
    /// Rotation transition in radians; `origin` is the unchanged top-left,
    /// re-emitted so an in-progress rotation does not drift
    Rotate { origin: Point, from: f32, to: f32 },
}

/// Sparse per-tick output of an animation: only the fields its domain
/// drives are present. Merged field-by-field across animations that share
/// a target before anything touches the target itself.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Frame {
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub opacity: Option<f32>,
    pub rotation: Option<f32>,
}

impl Frame {
    /// Overlay a later frame onto this one. Fields the later frame defines
    /// win; everything else is kept (last-writer-wins per field).
    pub fn merge(&mut self, later: Frame) {
        if later.position.is_some() {
            self.position = later.position;
        }
        if later.size.is_some() {
            self.size = later.size;
        }
        if later.opacity.is_some() {
            self.opacity = later.opacity;
        }
        if later.rotation.is_some() {
            self.rotation = later.rotation;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.size.is_none()
            && self.opacity.is_none()
            && self.rotation.is_none()
    }
}

/// One scheduled property transition on one target
pub struct Animation {
    target: SharedTarget,
    domain: Domain,
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

impl Animation {
    /// Build an animation from already-captured start/end state.
    ///
    /// Callers are expected to have validated `duration > 0`; the manager's
    /// `animate_*` entry points do so before constructing.
    pub fn new(target: SharedTarget, domain: Domain, duration: f32, easing: Easing) -> Self {
        debug_assert!(duration > 0.0);
        Self {
            target,
            domain,
            duration,
            elapsed: 0.0,
            easing,
        }
    }

    /// Advance elapsed time, clamped to the duration. A no-op once
    /// finished, so calling past completion never changes state.
    pub fn advance(&mut self, delta: f32) {
        if self.is_finished() {
            return;
        }
        self.elapsed = (self.elapsed + delta).min(self.duration);
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Normalized progress in `[0, 1]`
    pub fn progress(&self) -> f32 {
        (self.elapsed / self.duration).min(1.0)
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub fn target(&self) -> &SharedTarget {
        &self.target
    }

    /// Pointer identity of the target, used for grouping
    pub fn group_key(&self) -> usize {
        target_key(&self.target)
    }

    /// Compute the current eased output for this animation's domain.
    ///
    /// Pure read: mutates neither the animation nor the target.
    pub fn frame(&self) -> Frame {
        let eased = self.easing.apply(self.progress());
        let mut frame = Frame::default();

        match self.domain {
            Domain::Move { from, to } => {
                frame.position = Some(from.lerp(&to, eased));
            }
            Domain::Scale {
                origin,
                start_size,
                to_scale_x,
                to_scale_y,
            } => {
                let scale_x = 1.0 + (to_scale_x - 1.0) * eased;
                let scale_y = 1.0 + (to_scale_y - 1.0) * eased;
                let size = Size::new(start_size.width * scale_x, start_size.height * scale_y);
                // Shift the origin so the scaled box stays centered on the
                // starting box's center.
                let position = Point::new(
                    origin.x + (start_size.width - size.width) / 2.0,
                    origin.y + (start_size.height - size.height) / 2.0,
                );
                frame.size = Some(size);
                frame.position = Some(position);
            }
            Domain::Fade { from, to } => {
                frame.opacity = Some(from + (to - from) * eased);
            }
            Domain::Rotate { origin, from, to } => {
                frame.rotation = Some(from + (to - from) * eased);
                frame.position = Some(origin);
            }
        }

        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::{shared, BasicTarget};

    fn move_anim(duration: f32, easing: Easing) -> Animation {
        let target = shared(BasicTarget::new(0.0, 0.0, 10.0, 10.0));
        let domain = Domain::Move {
            from: Point::new(0.0, 0.0),
            to: Point::new(100.0, 0.0),
        };
        Animation::new(target, domain, duration, easing)
    }

    #[test]
    fn test_advance_clamps_to_duration() {
        let mut anim = move_anim(2.0, Easing::Linear);
        anim.advance(5.0);
        assert!(anim.is_finished());
        assert_eq!(anim.progress(), 1.0);
    }

    #[test]
    fn test_advance_is_idempotent_past_completion() {
        let mut anim = move_anim(1.0, Easing::EaseOutBounce);
        anim.advance(1.0);
        let frame = anim.frame();
        anim.advance(0.5);
        anim.advance(100.0);
        assert_eq!(anim.frame(), frame);
    }

    #[test]
    fn test_move_frame_midway() {
        let mut anim = move_anim(2.0, Easing::Linear);
        anim.advance(1.0);
        let frame = anim.frame();
        assert_eq!(frame.position, Some(Point::new(50.0, 0.0)));
        assert_eq!(frame.size, None);
        assert_eq!(frame.opacity, None);
        assert_eq!(frame.rotation, None);
    }

    #[test]
    fn test_terminal_frame_is_exact_for_every_curve() {
        for easing in Easing::ALL {
            if easing.is_periodic() {
                continue;
            }
            let mut anim = move_anim(1.0, easing);
            anim.advance(1.0);
            assert_eq!(
                anim.frame().position,
                Some(Point::new(100.0, 0.0)),
                "{easing:?} missed the end value"
            );
        }
    }

    #[test]
    fn test_scale_emits_centered_position_and_size() {
        let target = shared(BasicTarget::new(0.0, 0.0, 100.0, 50.0));
        let domain = Domain::Scale {
            origin: Point::ZERO,
            start_size: Size::new(100.0, 50.0),
            to_scale_x: 2.0,
            to_scale_y: 2.0,
        };
        let mut anim = Animation::new(target, domain, 1.0, Easing::Linear);
        anim.advance(1.0);

        let frame = anim.frame();
        assert_eq!(frame.size, Some(Size::new(200.0, 100.0)));
        assert_eq!(frame.position, Some(Point::new(-50.0, -25.0)));
    }

    #[test]
    fn test_rotate_emits_unchanged_position() {
        let target = shared(BasicTarget::new(7.0, 9.0, 10.0, 10.0));
        let domain = Domain::Rotate {
            origin: Point::new(7.0, 9.0),
            from: 0.0,
            to: std::f32::consts::PI,
        };
        let mut anim = Animation::new(target, domain, 1.0, Easing::Linear);
        anim.advance(0.5);

        let frame = anim.frame();
        assert!((frame.rotation.unwrap() - std::f32::consts::PI / 2.0).abs() < 1e-5);
        assert_eq!(frame.position, Some(Point::new(7.0, 9.0)));
    }

    #[test]
    fn test_frame_is_a_pure_read() {
        let anim = move_anim(2.0, Easing::Linear);
        let first = anim.frame();
        assert_eq!(anim.frame(), first);
        assert_eq!(anim.progress(), 0.0);
    }

    #[test]
    fn test_merge_later_wins_per_field() {
        let mut merged = Frame {
            position: Some(Point::new(1.0, 1.0)),
            opacity: Some(0.5),
            ..Frame::default()
        };
        merged.merge(Frame {
            position: Some(Point::new(9.0, 9.0)),
            rotation: Some(1.0),
            ..Frame::default()
        });

        assert_eq!(merged.position, Some(Point::new(9.0, 9.0)));
        assert_eq!(merged.opacity, Some(0.5));
        assert_eq!(merged.rotation, Some(1.0));
        assert_eq!(merged.size, None);
    }
}
