/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Locating QR symbols in a binarized image
//!
//! Finder patterns are found by scanning rows for the 1:1:3:1:1
//! dark/light ratio and cross checking each hit vertically and
//! horizontally. Any three finders forming a right angled isosceles
//! triangle are a symbol candidate, which allows several symbols in
//! one image.
use crate::binarizer::runs;
use crate::bitmatrix::BitMatrix;
use crate::geometry::{PerspectiveTransform, PointF, Position};
use crate::log::trace;
use crate::qr::version::{version_for_dimension, MAX_VERSION};

/// Upper bound on finder candidates considered for triples
const MAX_CANDIDATES: usize = 24;
/// Largest tolerated ratio between the legs of a finder triangle
const MAX_LEG_RATIO: f64 = 1.4;
/// Largest tolerated cosine of the angle at the corner finder
const MAX_CORNER_COSINE: f64 = 0.3;

/// A finder pattern center with its estimated module size
#[derive(Copy, Clone, Debug)]
pub struct FinderPattern {
    pub center: PointF,
    pub module: f64,
    /// How many scan lines confirmed it
    pub count:  u32
}

impl FinderPattern {
    fn about_equals(&self, center: PointF, module: f64) -> bool {
        if (center.x - self.center.x).abs() > self.module || (center.y - self.center.y).abs() > self.module {
            return false;
        }
        let diff = (module - self.module).abs();
        diff <= 1.0 || diff <= self.module
    }

    fn merge(&mut self, center: PointF, module: f64) {
        let n = f64::from(self.count);
        let total = n + 1.0;
        self.center = PointF::new(
            (self.center.x * n + center.x) / total,
            (self.center.y * n + center.y) / total
        );
        self.module = (self.module * n + module) / total;
        self.count += 1;
    }
}

/// Three finder patterns in symbol order plus the estimated dimension
#[derive(Copy, Clone, Debug)]
pub struct FinderTriple {
    /// Indices into the candidate list: top left, top right, bottom left
    pub indices:   [usize; 3],
    pub top_left:  PointF,
    pub top_right: PointF,
    pub bottom_left: PointF,
    pub module:    f64,
    pub dimension: usize,
    score:         f64
}

/// A sampled module grid and where it was found
#[derive(Clone, Debug)]
pub struct Detection {
    pub grid:     BitMatrix,
    pub position: Position
}

fn finder_ratio(counts: &[usize; 5]) -> bool {
    let total: usize = counts.iter().sum();
    if total < 7 {
        return false;
    }
    let module = total as f64 / 7.0;
    let variance = module / 2.0;

    (module - counts[0] as f64).abs() < variance
        && (module - counts[1] as f64).abs() < variance
        && (3.0 * module - counts[2] as f64).abs() < 3.0 * variance
        && (module - counts[3] as f64).abs() < variance
        && (module - counts[4] as f64).abs() < variance
}

/// Walk through a finder from `(cx, cy)` along `(dx, dy)` in both
/// directions, returning the refined center and the pattern length
fn cross_check(
    matrix: &BitMatrix, cx: usize, cy: usize, dx: isize, dy: isize, max_count: usize
) -> Option<(PointF, usize)> {
    let (w, h) = (matrix.width() as isize, matrix.height() as isize);
    let at = |t: isize| (cx as isize + t * dx, cy as isize + t * dy);
    let inside = |t: isize| {
        let (x, y) = at(t);
        x >= 0 && y >= 0 && x < w && y < h
    };
    let dark = |t: isize| {
        let (x, y) = at(t);
        matrix.get_checked(x, y)
    };
    let mut counts = [0usize; 5];

    let mut t = 0;
    while inside(t) && dark(t) {
        counts[2] += 1;
        t -= 1;
    }
    if !inside(t) {
        return None;
    }
    while inside(t) && !dark(t) && counts[1] <= max_count {
        counts[1] += 1;
        t -= 1;
    }
    if !inside(t) || counts[1] > max_count {
        return None;
    }
    while inside(t) && dark(t) && counts[0] <= max_count {
        counts[0] += 1;
        t -= 1;
    }
    if counts[0] > max_count {
        return None;
    }

    t = 1;
    while inside(t) && dark(t) {
        counts[2] += 1;
        t += 1;
    }
    if !inside(t) {
        return None;
    }
    while inside(t) && !dark(t) && counts[3] <= max_count {
        counts[3] += 1;
        t += 1;
    }
    if !inside(t) || counts[3] > max_count {
        return None;
    }
    while inside(t) && dark(t) && counts[4] <= max_count {
        counts[4] += 1;
        t += 1;
    }
    if counts[4] > max_count || !finder_ratio(&counts) {
        return None;
    }
    let offset = t as f64 - (counts[4] + counts[3]) as f64 - counts[2] as f64 / 2.0;
    let center = PointF::new(
        cx as f64 + 0.5 * (1 - dx.abs()) as f64 + offset * dx as f64,
        cy as f64 + 0.5 * (1 - dy.abs()) as f64 + offset * dy as f64
    );
    Some((center, counts.iter().sum()))
}

/// Scan the matrix for finder patterns
pub fn find_finder_patterns(matrix: &BitMatrix, try_harder: bool) -> Vec<FinderPattern> {
    let height = matrix.height();
    let step = if try_harder {
        1
    } else {
        (3 * height / (4 * 97)).max(2)
    };
    let mut found: Vec<FinderPattern> = Vec::new();

    for y in (0..height).step_by(step) {
        let row_runs = runs(matrix.row(y));
        let mut starts = Vec::with_capacity(row_runs.len());
        let mut position = 0;
        for run in &row_runs {
            starts.push(position);
            position += run;
        }
        // dark runs sit at odd indices
        let mut i = 1;
        while i + 4 < row_runs.len() {
            let counts = [row_runs[i], row_runs[i + 1], row_runs[i + 2], row_runs[i + 3], row_runs[i + 4]];
            if finder_ratio(&counts) {
                let total: usize = counts.iter().sum();
                let cx = starts[i + 2] + counts[2] / 2;
                if let Some(found_pattern) = confirm(matrix, cx, y, total) {
                    match found.iter_mut().find(|f| f.about_equals(found_pattern.0, found_pattern.1)) {
                        Some(existing) => existing.merge(found_pattern.0, found_pattern.1),
                        None => found.push(FinderPattern {
                            center: found_pattern.0,
                            module: found_pattern.1,
                            count:  1
                        })
                    }
                }
            }
            i += 2;
        }
    }
    trace!("found {} finder pattern candidates", found.len());
    found
}

fn confirm(matrix: &BitMatrix, cx: usize, cy: usize, row_total: usize) -> Option<(PointF, f64)> {
    let (vertical, v_total) = cross_check(matrix, cx, cy, 0, 1, row_total)?;
    // vertical and horizontal extents must roughly agree
    if 5 * v_total.abs_diff(row_total) >= 2 * row_total {
        return None;
    }
    let vy = vertical.y.floor().max(0.0) as usize;
    let (horizontal, h_total) = cross_check(matrix, cx, vy.min(matrix.height() - 1), 1, 0, row_total)?;
    let center = PointF::new(horizontal.x, vertical.y);
    Some((center, (v_total + h_total) as f64 / 14.0))
}

fn snap_dimension(estimate: f64) -> Option<usize> {
    let k = ((estimate - 17.0) / 4.0).round();
    if k < 1.0 || k > f64::from(MAX_VERSION) {
        return None;
    }
    Some(4 * k as usize + 17)
}

/// Every plausible triple, best first
pub fn finder_triples(patterns: &[FinderPattern]) -> Vec<FinderTriple> {
    let mut candidates: Vec<(usize, &FinderPattern)> = patterns.iter().enumerate().collect();
    candidates.sort_by(|a, b| b.1.count.cmp(&a.1.count));
    if candidates.iter().filter(|(_, p)| p.count >= 2).count() >= 3 {
        candidates.retain(|(_, p)| p.count >= 2);
    }
    candidates.truncate(MAX_CANDIDATES);

    let mut triples = Vec::new();
    let n = candidates.len();
    for a in 0..n {
        for b in a + 1..n {
            for c in b + 1..n {
                if let Some(triple) = evaluate([candidates[a], candidates[b], candidates[c]]) {
                    triples.push(triple);
                }
            }
        }
    }
    triples.sort_by(|a, b| a.score.total_cmp(&b.score));
    triples
}

fn evaluate(points: [(usize, &FinderPattern); 3]) -> Option<FinderTriple> {
    let modules = points.map(|(_, p)| p.module);
    let (min, max) = modules
        .iter()
        .fold((f64::MAX, 0.0f64), |(lo, hi), m| (lo.min(*m), hi.max(*m)));
    if max > 1.5 * min {
        return None;
    }
    // the corner is opposite the longest side
    let d = |i: usize, j: usize| points[i].1.center.distance(points[j].1.center);
    let sides = [d(1, 2), d(0, 2), d(0, 1)];
    let corner = (0..3).max_by(|a, b| sides[*a].total_cmp(&sides[*b]))?;
    let (first, second) = ((corner + 1) % 3, (corner + 2) % 3);

    let origin = points[corner].1.center;
    let mut right = points[first];
    let mut down = points[second];
    let (v1, v2) = (right.1.center - origin, down.1.center - origin);
    let (l1, l2) = (v1.length(), v2.length());
    if l1.max(l2) > MAX_LEG_RATIO * l1.min(l2) {
        return None;
    }
    let cosine = (v1.x * v2.x + v1.y * v2.y) / (l1 * l2);
    if cosine.abs() > MAX_CORNER_COSINE {
        return None;
    }
    // image y grows downward, so top right x bottom left is positive
    if v1.cross(v2) < 0.0 {
        core::mem::swap(&mut right, &mut down);
    }
    let module = modules.iter().sum::<f64>() / 3.0;
    let dimension = snap_dimension((l1 + l2) / 2.0 / module + 7.0)?;

    Some(FinderTriple {
        indices: [points[corner].0, right.0, down.0],
        top_left: origin,
        top_right: right.1.center,
        bottom_left: down.1.center,
        module,
        dimension,
        score: (l1 - l2).abs() / l1.max(l2) + cosine.abs()
    })
}

/// Look for the bottom right alignment pattern near `estimate`
fn find_alignment(matrix: &BitMatrix, estimate: PointF, module: f64) -> Option<PointF> {
    let radius = (module * 5.0).ceil() as isize;
    let (ex, ey) = (estimate.x as isize, estimate.y as isize);
    let left = (ex - radius).max(0) as usize;
    let right = ((ex + radius).max(0) as usize).min(matrix.width().saturating_sub(1));
    let top = (ey - radius).max(0) as usize;
    let bottom = ((ey + radius).max(0) as usize).min(matrix.height().saturating_sub(1));
    if left >= right || top >= bottom {
        return None;
    }
    let close = |count: usize| (count as f64 - module).abs() < module / 2.0 + 0.5;
    let mut best: Option<(f64, PointF)> = None;

    for y in top..=bottom {
        let row = &matrix.row(y)[left..=right];
        let row_runs = runs(row);
        let mut position = 0;
        for (i, run) in row_runs.iter().enumerate() {
            // a dark run flanked by light runs of one module each
            if i % 2 == 1 && i + 1 < row_runs.len() && close(*run) && close(row_runs[i - 1]) && close(row_runs[i + 1]) {
                let cx = left + position + run / 2;
                if let Some(cy) = alignment_vertical(matrix, cx, y, module, &close) {
                    let candidate = PointF::new(left as f64 + position as f64 + *run as f64 / 2.0, cy);
                    let distance = candidate.distance(estimate);
                    if best.map_or(true, |(d, _)| distance < d) {
                        best = Some((distance, candidate));
                    }
                }
            }
            position += run;
        }
    }
    best.map(|(_, p)| p)
}

fn alignment_vertical(
    matrix: &BitMatrix, cx: usize, cy: usize, module: f64, close: &dyn Fn(usize) -> bool
) -> Option<f64> {
    let limit = (module * 2.0).ceil() as isize + 1;
    let at = |y: isize| matrix.get_checked(cx as isize, y);
    let (mut up, mut down) = (cy as isize, cy as isize);
    while at(up - 1) && cy as isize - up < limit {
        up -= 1;
    }
    while at(down + 1) && down - (cy as isize) < limit {
        down += 1;
    }
    let dark = (down - up + 1) as usize;
    let mut light_up = 0;
    while !at(up - 1 - light_up as isize) && up - 1 - (light_up as isize) >= 0 && light_up < limit as usize {
        light_up += 1;
    }
    let mut light_down = 0;
    while !at(down + 1 + light_down as isize)
        && down + 1 + (light_down as isize) < matrix.height() as isize
        && light_down < limit as usize
    {
        light_down += 1;
    }
    (close(dark) && close(light_up) && close(light_down)).then(|| up as f64 + dark as f64 / 2.0)
}

/// Sample the module grid described by a finder triple
pub fn sample_triple(matrix: &BitMatrix, triple: &FinderTriple) -> Option<Detection> {
    let dim = triple.dimension;
    let far = dim as f64 - 3.5;
    let span = dim as f64 - 7.0;
    let (tl, tr, bl) = (triple.top_left, triple.top_right, triple.bottom_left);

    let mut src = [
        PointF::new(3.5, 3.5),
        PointF::new(far, 3.5),
        PointF::new(far, far),
        PointF::new(3.5, far)
    ];
    let mut dst = [tl, tr, tr + bl - tl, bl];

    if dim > 21 {
        // alignment pattern center sits three modules in from the finder centers
        let inset = dim as f64 - 6.5;
        let along = (inset - 3.5) / span;
        let estimate = tl + (tr - tl) * along + (bl - tl) * along;
        if let Some(alignment) = find_alignment(matrix, estimate, triple.module) {
            src[2] = PointF::new(inset, inset);
            dst[2] = alignment;
        }
    }
    let transform = PerspectiveTransform::quad_to_quad(src, dst)?;
    sample_grid(matrix, &transform, dim)
}

fn sample_grid(matrix: &BitMatrix, transform: &PerspectiveTransform, dim: usize) -> Option<Detection> {
    let mut grid = BitMatrix::square(dim);
    let mut outside = 0;

    for y in 0..dim {
        for x in 0..dim {
            let p = transform.apply(PointF::new(x as f64 + 0.5, y as f64 + 0.5));
            if !p.x.is_finite() || !p.y.is_finite() {
                return None;
            }
            let (px, py) = (p.x.floor() as isize, p.y.floor() as isize);
            if px < 0 || py < 0 || px >= matrix.width() as isize || py >= matrix.height() as isize {
                outside += 1;
                continue;
            }
            grid.set(x, y, matrix.get(px as usize, py as usize));
        }
    }
    // a few modules may fall off a symbol touching the image border
    if outside > dim {
        return None;
    }
    let corner = |x: f64, y: f64| transform.apply(PointF::new(x, y)).round();
    let d = dim as f64;
    let position = Position::new(corner(0.0, 0.0), corner(d, 0.0), corner(d, d), corner(0.0, d));
    Some(Detection { grid, position })
}

/// Treat the whole matrix as one upright symbol without skew
///
/// The top edge of the top left finder gives the module size.
pub fn detect_pure(matrix: &BitMatrix) -> Option<Detection> {
    let (left, top, width, height) = matrix.enclosing_rect()?;
    let finder_edge = matrix.row(top)[left..].iter().take_while(|x| **x).count();
    if finder_edge == 0 {
        return None;
    }
    let module = finder_edge as f64 / 7.0;
    let dim = (width as f64 / module).round() as usize;
    version_for_dimension(dim)?;
    if (height as f64 / module).round() as usize != dim {
        return None;
    }
    let (mw, mh) = (width as f64 / dim as f64, height as f64 / dim as f64);

    let mut grid = BitMatrix::square(dim);
    for y in 0..dim {
        for x in 0..dim {
            let px = left + ((x as f64 + 0.5) * mw) as usize;
            let py = top + ((y as f64 + 0.5) * mh) as usize;
            grid.set(x, y, matrix.get(px, py));
        }
    }
    let (right, bottom) = ((left + width) as i32, (top + height) as i32);
    Some(Detection {
        grid,
        position: Position::rect(left as i32, top as i32, right, bottom)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::encoder::{encode, QrOptions};

    fn scaled(matrix: &BitMatrix, scale: usize, margin: usize) -> BitMatrix {
        let size = matrix.width() * scale + 2 * margin;
        let mut out = BitMatrix::square(size);
        for y in 0..matrix.height() {
            for x in 0..matrix.width() {
                if matrix.get(x, y) {
                    out.set_region(margin + x * scale, margin + y * scale, scale, scale);
                }
            }
        }
        out
    }

    #[test]
    fn finds_three_finders() {
        let symbol = encode(b"FINDER", &QrOptions::default()).unwrap();
        let image = scaled(&symbol.modules, 4, 16);
        let patterns = find_finder_patterns(&image, true);
        assert!(patterns.len() >= 3);
        for p in patterns.iter().filter(|p| p.count > 2) {
            assert!((p.module - 4.0).abs() < 0.5, "module {}", p.module);
        }
        let triples = finder_triples(&patterns);
        assert_eq!(triples[0].dimension, 21);
        assert!(triples[0].top_left.distance(PointF::new(30.0, 30.0)) < 1.0);
    }

    #[test]
    fn samples_the_original_grid() {
        let symbol = encode(&[b'7'; 120], &QrOptions::default()).unwrap();
        assert!(symbol.version > 1);
        let image = scaled(&symbol.modules, 3, 12);
        let patterns = find_finder_patterns(&image, false);
        let triple = finder_triples(&patterns)[0];
        let detection = sample_triple(&image, &triple).unwrap();
        assert_eq!(detection.grid, symbol.modules);
        assert_eq!(detection.position.top_left.x, 12);
    }

    #[test]
    fn pure_symbol() {
        let symbol = encode(b"PURE", &QrOptions::default()).unwrap();
        let image = scaled(&symbol.modules, 5, 3);
        let detection = detect_pure(&image).unwrap();
        assert_eq!(detection.grid, symbol.modules);
        assert_eq!(detection.position, Position::rect(3, 3, 3 + 21 * 5, 3 + 21 * 5));
    }
}
