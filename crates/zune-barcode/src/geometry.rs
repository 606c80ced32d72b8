/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Points, quadrilaterals and the projective mapping used for sampling
use core::ops::{Add, Mul, Sub};

/// A point with sub pixel precision
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PointF {
    pub x: f64,
    pub y: f64
}

impl PointF {
    pub const fn new(x: f64, y: f64) -> PointF {
        PointF { x, y }
    }

    pub fn distance(self, other: PointF) -> f64 {
        (self - other).length()
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// z component of the cross product of `self` and `other`
    pub fn cross(self, other: PointF) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn round(self) -> PointI {
        PointI::new(self.x.round() as i32, self.y.round() as i32)
    }
}

impl Add for PointF {
    type Output = PointF;

    fn add(self, rhs: PointF) -> PointF {
        PointF::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for PointF {
    type Output = PointF;

    fn sub(self, rhs: PointF) -> PointF {
        PointF::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for PointF {
    type Output = PointF;

    fn mul(self, rhs: f64) -> PointF {
        PointF::new(self.x * rhs, self.y * rhs)
    }
}

/// An integer pixel coordinate
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointI {
    pub x: i32,
    pub y: i32
}

impl PointI {
    pub const fn new(x: i32, y: i32) -> PointI {
        PointI { x, y }
    }

    pub fn to_f(self) -> PointF {
        PointF::new(f64::from(self.x), f64::from(self.y))
    }
}

/// Four corners of a located symbol in image coordinates
///
/// Corners are ordered as they appear in the upright symbol, so
/// for a rotated symbol `top_left` need not be the top-left-most pixel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub top_left:     PointI,
    pub top_right:    PointI,
    pub bottom_right: PointI,
    pub bottom_left:  PointI
}

impl Position {
    pub const fn new(
        top_left: PointI, top_right: PointI, bottom_right: PointI, bottom_left: PointI
    ) -> Position {
        Position {
            top_left,
            top_right,
            bottom_right,
            bottom_left
        }
    }

    /// An axis aligned rectangle
    pub const fn rect(left: i32, top: i32, right: i32, bottom: i32) -> Position {
        Position::new(
            PointI::new(left, top),
            PointI::new(right, top),
            PointI::new(right, bottom),
            PointI::new(left, bottom)
        )
    }

    pub fn corners(&self) -> [PointI; 4] {
        [self.top_left, self.top_right, self.bottom_right, self.bottom_left]
    }

    /// Orientation of the symbol's top edge in degrees, clockwise
    /// in image coordinates, rounded to the nearest integer
    pub fn orientation(&self) -> i32 {
        let dx = f64::from(self.top_right.x - self.top_left.x)
            + f64::from(self.bottom_right.x - self.bottom_left.x);
        let dy = f64::from(self.top_right.y - self.top_left.y)
            + f64::from(self.bottom_right.y - self.bottom_left.y);
        if dx == 0.0 && dy == 0.0 {
            return 0;
        }
        dy.atan2(dx).to_degrees().round() as i32
    }

    /// Center of the quadrilateral
    pub fn center(&self) -> PointF {
        let sum = self
            .corners()
            .iter()
            .fold(PointF::default(), |acc, p| acc + p.to_f());
        sum * 0.25
    }

    /// Map every corner through `f`, used to undo image transforms
    pub fn map(&self, mut f: impl FnMut(PointI) -> PointI) -> Position {
        Position::new(
            f(self.top_left),
            f(self.top_right),
            f(self.bottom_right),
            f(self.bottom_left)
        )
    }
}

/// A projective transform between two quadrilaterals
///
/// Maps the unit square (or any quad) onto another quad, so that sample
/// points given in module coordinates can be looked up in the image.
#[derive(Copy, Clone, Debug)]
pub struct PerspectiveTransform {
    a11: f64,
    a12: f64,
    a13: f64,
    a21: f64,
    a22: f64,
    a23: f64,
    a31: f64,
    a32: f64,
    a33: f64
}

impl PerspectiveTransform {
    /// Build the transform sending each `src` corner to the matching `dst` corner
    pub fn quad_to_quad(src: [PointF; 4], dst: [PointF; 4]) -> Option<PerspectiveTransform> {
        let q_to_s = Self::square_to_quad(src)?.adjoint();
        let s_to_q = Self::square_to_quad(dst)?;
        Some(s_to_q.times(&q_to_s))
    }

    fn square_to_quad(p: [PointF; 4]) -> Option<PerspectiveTransform> {
        let [p0, p1, p2, p3] = p;
        let dx3 = p0.x - p1.x + p2.x - p3.x;
        let dy3 = p0.y - p1.y + p2.y - p3.y;

        if dx3 == 0.0 && dy3 == 0.0 {
            // affine
            return Some(PerspectiveTransform {
                a11: p1.x - p0.x,
                a21: p2.x - p1.x,
                a31: p0.x,
                a12: p1.y - p0.y,
                a22: p2.y - p1.y,
                a32: p0.y,
                a13: 0.0,
                a23: 0.0,
                a33: 1.0
            });
        }
        let dx1 = p1.x - p2.x;
        let dx2 = p3.x - p2.x;
        let dy1 = p1.y - p2.y;
        let dy2 = p3.y - p2.y;
        let denominator = dx1 * dy2 - dx2 * dy1;
        if denominator.abs() < f64::EPSILON {
            return None;
        }
        let a13 = (dx3 * dy2 - dx2 * dy3) / denominator;
        let a23 = (dx1 * dy3 - dx3 * dy1) / denominator;

        Some(PerspectiveTransform {
            a11: p1.x - p0.x + a13 * p1.x,
            a21: p3.x - p0.x + a23 * p3.x,
            a31: p0.x,
            a12: p1.y - p0.y + a13 * p1.y,
            a22: p3.y - p0.y + a23 * p3.y,
            a32: p0.y,
            a13,
            a23,
            a33: 1.0
        })
    }

    fn adjoint(&self) -> PerspectiveTransform {
        PerspectiveTransform {
            a11: self.a22 * self.a33 - self.a23 * self.a32,
            a21: self.a23 * self.a31 - self.a21 * self.a33,
            a31: self.a21 * self.a32 - self.a22 * self.a31,
            a12: self.a13 * self.a32 - self.a12 * self.a33,
            a22: self.a11 * self.a33 - self.a13 * self.a31,
            a32: self.a12 * self.a31 - self.a11 * self.a32,
            a13: self.a12 * self.a23 - self.a13 * self.a22,
            a23: self.a13 * self.a21 - self.a11 * self.a23,
            a33: self.a11 * self.a22 - self.a12 * self.a21
        }
    }

    fn times(&self, other: &PerspectiveTransform) -> PerspectiveTransform {
        PerspectiveTransform {
            a11: self.a11 * other.a11 + self.a21 * other.a12 + self.a31 * other.a13,
            a21: self.a11 * other.a21 + self.a21 * other.a22 + self.a31 * other.a23,
            a31: self.a11 * other.a31 + self.a21 * other.a32 + self.a31 * other.a33,
            a12: self.a12 * other.a11 + self.a22 * other.a12 + self.a32 * other.a13,
            a22: self.a12 * other.a21 + self.a22 * other.a22 + self.a32 * other.a23,
            a32: self.a12 * other.a31 + self.a22 * other.a32 + self.a32 * other.a33,
            a13: self.a13 * other.a11 + self.a23 * other.a12 + self.a33 * other.a13,
            a23: self.a13 * other.a21 + self.a23 * other.a22 + self.a33 * other.a23,
            a33: self.a13 * other.a31 + self.a23 * other.a32 + self.a33 * other.a33
        }
    }

    /// Map a single point
    pub fn apply(&self, p: PointF) -> PointF {
        let denominator = self.a13 * p.x + self.a23 * p.y + self.a33;
        PointF::new(
            (self.a11 * p.x + self.a21 * p.y + self.a31) / denominator,
            (self.a12 * p.x + self.a22 * p.y + self.a32) / denominator
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: PointF, b: PointF) -> bool {
        a.distance(b) < 1e-6
    }

    #[test]
    fn quad_to_quad_maps_corners() {
        let src = [
            PointF::new(0.0, 0.0),
            PointF::new(10.0, 0.0),
            PointF::new(10.0, 10.0),
            PointF::new(0.0, 10.0)
        ];
        let dst = [
            PointF::new(5.0, 7.0),
            PointF::new(40.0, 3.0),
            PointF::new(44.0, 52.0),
            PointF::new(2.0, 41.0)
        ];
        let t = PerspectiveTransform::quad_to_quad(src, dst).unwrap();
        for (s, d) in src.iter().zip(dst.iter()) {
            assert!(close(t.apply(*s), *d), "{:?} -> {:?}", s, t.apply(*s));
        }
    }

    #[test]
    fn orientation_of_rotated_quad() {
        let upright = Position::rect(0, 0, 10, 10);
        assert_eq!(upright.orientation(), 0);

        let quarter = Position::new(
            PointI::new(10, 0),
            PointI::new(10, 10),
            PointI::new(0, 10),
            PointI::new(0, 0)
        );
        assert_eq!(quarter.orientation(), 90);
    }
}
