use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// 2D vector for agent poses and steering
///
/// Headings are measured in degrees counter-clockwise from +X, so
/// `Vec2::from_heading(0.0)` is `Vec2::RIGHT`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const ONE: Vec2 = Vec2 { x: 1.0, y: 1.0 };
    pub const UP: Vec2 = Vec2 { x: 0.0, y: 1.0 };
    pub const RIGHT: Vec2 = Vec2 { x: 1.0, y: 0.0 };

    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along a heading in degrees
    #[inline]
    pub fn from_heading(degrees: f32) -> Self {
        let radians = degrees.to_radians();
        Self {
            x: radians.cos(),
            y: radians.sin(),
        }
    }

    /// Heading of this vector in degrees, in (-180, 180]
    #[inline]
    pub fn heading(&self) -> f32 {
        self.y.atan2(self.x).to_degrees()
    }

    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    #[inline]
    pub fn length_sq(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        } else {
            Self::ZERO
        }
    }

    /// Returns normalized vector and original length
    pub fn normalize_with_length(&self) -> (Self, f32) {
        let len = self.length();
        if len > 0.0 {
            (
                Self {
                    x: self.x / len,
                    y: self.y / len,
                },
                len,
            )
        } else {
            (Self::ZERO, 0.0)
        }
    }

    #[inline]
    pub fn dot(&self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (returns scalar z-component)
    #[inline]
    pub fn cross(&self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn distance_to(&self, other: Vec2) -> f32 {
        (*self - other).length()
    }

    #[inline]
    pub fn distance_sq_to(&self, other: Vec2) -> f32 {
        (*self - other).length_sq()
    }

    pub fn clamp_length(&self, max: f32) -> Self {
        let len = self.length();
        if len > max && len > 0.0 {
            *self * (max / len)
        } else {
            *self
        }
    }

    pub fn lerp(&self, other: Vec2, t: f32) -> Self {
        *self + (other - *self) * t
    }

    /// Rotate counter-clockwise by `degrees`
    pub fn rotate_degrees(&self, degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    /// Returns perpendicular vector (rotated 90 degrees counter-clockwise)
    pub fn perpendicular(&self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }

    /// Unsigned angle between two vectors in degrees, in [0, 180]
    pub fn angle_between(&self, other: Vec2) -> f32 {
        self.signed_angle_to(other).abs()
    }

    /// Signed angle in degrees that rotates `self` onto `other`
    pub fn signed_angle_to(&self, other: Vec2) -> f32 {
        self.cross(other).atan2(self.dot(other)).to_degrees()
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Check if vector is approximately zero
    pub fn is_zero(&self, epsilon: f32) -> bool {
        self.x.abs() < epsilon && self.y.abs() < epsilon
    }

    /// Check if vector is approximately equal to another
    pub fn approx_eq(&self, other: Vec2, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}

/// Shortest signed difference `to - from` between two headings, in [-180, 180)
pub fn delta_angle(from: f32, to: f32) -> f32 {
    (to - from + 180.0).rem_euclid(360.0) - 180.0
}

/// Wrap a heading into [0, 360)
pub fn wrap_heading(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Step `current` toward `target` by at most `max_step` degrees along the short arc
pub fn move_towards_angle(current: f32, target: f32, max_step: f32) -> f32 {
    let delta = delta_angle(current, target);
    if delta.abs() <= max_step {
        wrap_heading(target)
    } else {
        wrap_heading(current + max_step.copysign(delta))
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl Mul<Vec2> for f32 {
    type Output = Vec2;
    fn mul(self, rhs: Vec2) -> Vec2 {
        Vec2 {
            x: self * rhs.x,
            y: self * rhs.y,
        }
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl MulAssign<f32> for Vec2 {
    fn mul_assign(&mut self, rhs: f32) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_length() {
        let v = Vec2::new(3.0, 4.0);
        assert!(approx_eq(v.length(), 5.0));
        assert!(approx_eq(v.length_sq(), 25.0));
    }

    #[test]
    fn test_normalize_zero() {
        assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
    }

    #[test]
    fn test_heading_round_trip_axes() {
        assert!(Vec2::from_heading(0.0).approx_eq(Vec2::RIGHT, EPSILON));
        assert!(Vec2::from_heading(90.0).approx_eq(Vec2::UP, EPSILON));
        assert!(approx_eq(Vec2::new(0.0, -2.0).heading(), -90.0));
    }

    #[test]
    fn test_rotate_degrees() {
        let rotated = Vec2::RIGHT.rotate_degrees(90.0);
        assert!(rotated.approx_eq(Vec2::UP, EPSILON));

        let back = Vec2::RIGHT.rotate_degrees(180.0);
        assert!(back.approx_eq(Vec2::new(-1.0, 0.0), EPSILON));
    }

    #[test]
    fn test_angle_between_is_unsigned() {
        let a = Vec2::RIGHT;
        assert!(approx_eq(a.angle_between(Vec2::UP), 90.0));
        assert!(approx_eq(a.angle_between(Vec2::new(0.0, -1.0)), 90.0));
        assert!(approx_eq(a.signed_angle_to(Vec2::new(0.0, -1.0)), -90.0));
    }

    #[test]
    fn test_delta_angle_takes_short_arc() {
        assert!(approx_eq(delta_angle(350.0, 10.0), 20.0));
        assert!(approx_eq(delta_angle(10.0, 350.0), -20.0));
        assert!(approx_eq(delta_angle(0.0, 90.0), 90.0));
        assert!(approx_eq(delta_angle(0.0, 180.0), -180.0));
    }

    #[test]
    fn test_move_towards_angle_is_rate_limited() {
        assert!(approx_eq(move_towards_angle(0.0, 90.0, 30.0), 30.0));
        assert!(approx_eq(move_towards_angle(0.0, -90.0, 30.0), 330.0));
        assert!(approx_eq(move_towards_angle(80.0, 90.0, 30.0), 90.0));
    }

    #[test]
    fn test_clamp_length() {
        let clamped = Vec2::new(6.0, 8.0).clamp_length(5.0);
        assert!(approx_eq(clamped.length(), 5.0));
        assert!(approx_eq(clamped.x, 3.0));
    }

    #[test]
    fn test_is_finite() {
        assert!(Vec2::new(1.0, 2.0).is_finite());
        assert!(!Vec2::new(f32::NAN, 0.0).is_finite());
        assert!(!Vec2::new(0.0, f32::INFINITY).is_finite());
    }

    #[test]
    fn test_operators() {
        let mut a = Vec2::new(1.0, 2.0);
        a += Vec2::new(3.0, 4.0);
        assert_eq!(a, Vec2::new(4.0, 6.0));
        a -= Vec2::new(1.0, 1.0);
        assert_eq!(a, Vec2::new(3.0, 5.0));
        a *= 2.0;
        assert_eq!(a, Vec2::new(6.0, 10.0));
        assert_eq!(-a, Vec2::new(-6.0, -10.0));
        assert_eq!(0.5 * a, Vec2::new(3.0, 5.0));
    }
}
