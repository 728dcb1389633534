//! Two- and three-component numeric vectors used as record sub-fields.

use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A pair of values, e.g. a position or a tile coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub struct Vec2<T> {
    pub x: T,
    pub y: T,
}

/// A triple of values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub struct Vec3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

pub type Vec2i = Vec2<i32>;
pub type Vec2f = Vec2<f32>;
pub type Vec3i = Vec3<i32>;
pub type Vec3f = Vec3<f32>;

impl<T> Vec2<T> {
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T> Vec3<T> {
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }
}

/// Implements a component-wise binary operator for both vector types.
macro_rules! componentwise {
    ($trait:ident, $method:ident) => {
        impl<T: $trait<Output = T>> $trait for Vec2<T> {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self {
                Self::new(self.x.$method(rhs.x), self.y.$method(rhs.y))
            }
        }

        impl<T: $trait<Output = T>> $trait for Vec3<T> {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self {
                Self::new(
                    self.x.$method(rhs.x),
                    self.y.$method(rhs.y),
                    self.z.$method(rhs.z),
                )
            }
        }
    };
}

componentwise!(Add, add);
componentwise!(Sub, sub);
componentwise!(Mul, mul);
componentwise!(Div, div);

impl<T: fmt::Display> fmt::Display for Vec2<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x -> {}, y -> {}", self.x, self.y)
    }
}

impl<T: fmt::Display> fmt::Display for Vec3<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x -> {}, y -> {}, z -> {}", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_default_is_zero() {
        assert_eq!(Vec2i::default(), Vec2::new(0, 0));
        assert_eq!(Vec2f::default(), Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_vec2_componentwise_ops() {
        let a = Vec2i::new(6, 8);
        let b = Vec2i::new(2, 4);
        assert_eq!(a + b, Vec2::new(8, 12));
        assert_eq!(a - b, Vec2::new(4, 4));
        assert_eq!(a * b, Vec2::new(12, 32));
        assert_eq!(a / b, Vec2::new(3, 2));
    }

    #[test]
    fn test_vec3_componentwise_ops() {
        let a = Vec3f::new(1.0, 2.0, 3.0);
        let b = Vec3f::new(0.5, 0.5, 0.5);
        assert_eq!(a + b, Vec3::new(1.5, 2.5, 3.5));
        assert_eq!(a * b, Vec3::new(0.5, 1.0, 1.5));
    }

    #[test]
    fn test_vec3_inequality_checks_every_component() {
        // Only z differs.
        assert_ne!(Vec3i::new(1, 2, 3), Vec3i::new(1, 2, 4));
    }

    #[test]
    fn test_vec_display() {
        assert_eq!(Vec2i::new(3, -4).to_string(), "x -> 3, y -> -4");
        assert_eq!(Vec3f::new(1.5, 0.0, 2.0).to_string(), "x -> 1.5, y -> 0, z -> 2");
    }
}
