/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Reed-Solomon coding over GF(256) with the QR field polynomial
//!
//! The generator has roots `α^0 .. α^(n-1)`, polynomials are stored
//! with the highest degree coefficient first.
use crate::errors::BarcodeError;

/// x^8 + x^4 + x^3 + x^2 + 1
const PRIMITIVE: u32 = 0x11D;

struct Field {
    exp: [u8; 512],
    log: [u8; 256]
}

const fn build_field() -> Field {
    let mut exp = [0u8; 512];
    let mut log = [0u8; 256];
    let mut x = 1u32;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE;
        }
        i += 1;
    }
    // second copy so products need no modulo
    while i < 512 {
        exp[i] = exp[i - 255];
        i += 1;
    }
    Field { exp, log }
}

static FIELD: Field = build_field();

#[inline]
fn exp(power: usize) -> u8 {
    FIELD.exp[power % 255]
}

#[inline]
fn log(value: u8) -> usize {
    usize::from(FIELD.log[usize::from(value)])
}

#[inline]
pub(crate) fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    FIELD.exp[log(a) + log(b)]
}

#[inline]
fn inverse(a: u8) -> u8 {
    // callers never pass zero, it has no inverse
    FIELD.exp[255 - log(a)]
}

/// Generator polynomial of the given degree, without its leading 1
fn generator(degree: usize) -> Vec<u8> {
    let mut result = vec![0u8; degree];
    result[degree - 1] = 1;
    let mut root = 1u8;

    for _ in 0..degree {
        for j in 0..degree {
            result[j] = mul(result[j], root);
            if j + 1 < degree {
                result[j] ^= result[j + 1];
            }
        }
        root = mul(root, 2);
    }
    result
}

/// Compute `ec_len` error correction codewords for `data`
pub fn encode(data: &[u8], ec_len: usize) -> Vec<u8> {
    if ec_len == 0 {
        return Vec::new();
    }
    let divisor = generator(ec_len);
    let mut remainder = vec![0u8; ec_len];

    for &byte in data {
        let factor = byte ^ remainder[0];
        remainder.rotate_left(1);
        remainder[ec_len - 1] = 0;
        for (r, d) in remainder.iter_mut().zip(divisor.iter()) {
            *r ^= mul(*d, factor);
        }
    }
    remainder
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Poly {
    coefficients: Vec<u8>
}

impl Poly {
    fn new(coefficients: &[u8]) -> Poly {
        let first = coefficients.iter().position(|x| *x != 0);
        match first {
            Some(start) => Poly {
                coefficients: coefficients[start..].to_vec()
            },
            None => Poly::zero()
        }
    }

    fn zero() -> Poly {
        Poly { coefficients: vec![0] }
    }

    fn monomial(degree: usize, coefficient: u8) -> Poly {
        if coefficient == 0 {
            return Poly::zero();
        }
        let mut coefficients = vec![0u8; degree + 1];
        coefficients[0] = coefficient;
        Poly { coefficients }
    }

    fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    fn is_zero(&self) -> bool {
        self.coefficients[0] == 0
    }

    /// Coefficient of the `x^degree` term
    fn coefficient(&self, degree: usize) -> u8 {
        self.coefficients[self.coefficients.len() - 1 - degree]
    }

    fn evaluate_at(&self, a: u8) -> u8 {
        if a == 0 {
            return self.coefficient(0);
        }
        if a == 1 {
            return self.coefficients.iter().fold(0, |acc, x| acc ^ x);
        }
        self.coefficients
            .iter()
            .fold(0, |acc, x| mul(a, acc) ^ x)
    }

    fn add(&self, other: &Poly) -> Poly {
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }
        let (small, large) = if self.coefficients.len() > other.coefficients.len() {
            (other, self)
        } else {
            (self, other)
        };
        let diff = large.coefficients.len() - small.coefficients.len();
        let mut sum = large.coefficients.clone();
        for (i, c) in small.coefficients.iter().enumerate() {
            sum[diff + i] ^= c;
        }
        Poly::new(&sum)
    }

    fn multiply(&self, other: &Poly) -> Poly {
        if self.is_zero() || other.is_zero() {
            return Poly::zero();
        }
        let mut product = vec![0u8; self.coefficients.len() + other.coefficients.len() - 1];
        for (i, a) in self.coefficients.iter().enumerate() {
            for (j, b) in other.coefficients.iter().enumerate() {
                product[i + j] ^= mul(*a, *b);
            }
        }
        Poly::new(&product)
    }

    fn scale(&self, scalar: u8) -> Poly {
        let scaled: Vec<u8> = self.coefficients.iter().map(|x| mul(*x, scalar)).collect();
        Poly::new(&scaled)
    }

    fn multiply_by_monomial(&self, degree: usize, coefficient: u8) -> Poly {
        if coefficient == 0 {
            return Poly::zero();
        }
        let mut product: Vec<u8> = self
            .coefficients
            .iter()
            .map(|x| mul(*x, coefficient))
            .collect();
        product.resize(product.len() + degree, 0);
        Poly::new(&product)
    }
}

fn uncorrectable() -> BarcodeError {
    BarcodeError::Checksum("Reed-Solomon error correction failed".to_string())
}

/// Correct `codewords` in place, the last `ec_len` of which are
/// error correction codewords
///
/// Returns the number of corrected codewords.
pub fn decode(codewords: &mut [u8], ec_len: usize) -> Result<usize, BarcodeError> {
    if ec_len == 0 {
        return Ok(0);
    }
    let received = Poly::new(codewords);
    let mut syndromes = vec![0u8; ec_len];
    let mut clean = true;

    for i in 0..ec_len {
        let eval = received.evaluate_at(exp(i));
        syndromes[ec_len - 1 - i] = eval;
        clean &= eval == 0;
    }
    if clean {
        return Ok(0);
    }
    let syndrome = Poly::new(&syndromes);
    let (sigma, omega) = euclidean(Poly::monomial(ec_len, 1), syndrome, ec_len)?;
    let locations = error_locations(&sigma)?;
    let magnitudes = error_magnitudes(&omega, &locations);

    for (location, magnitude) in locations.iter().zip(magnitudes.iter()) {
        if *location == 0 {
            return Err(uncorrectable());
        }
        let position = codewords
            .len()
            .checked_sub(1 + log(*location))
            .ok_or_else(uncorrectable)?;
        codewords[position] ^= magnitude;
    }
    Ok(locations.len())
}

fn euclidean(a: Poly, b: Poly, r: usize) -> Result<(Poly, Poly), BarcodeError> {
    let (a, b) = if a.degree() < b.degree() { (b, a) } else { (a, b) };

    let mut r_last = a;
    let mut r_cur = b;
    let mut t_last = Poly::zero();
    let mut t_cur = Poly::new(&[1]);

    while 2 * r_cur.degree() >= r {
        let r_last_last = r_last;
        let t_last_last = t_last;
        r_last = r_cur;
        t_last = t_cur;

        if r_last.is_zero() {
            return Err(uncorrectable());
        }
        r_cur = r_last_last;
        let mut quotient = Poly::zero();
        let dlt_inverse = inverse(r_last.coefficient(r_last.degree()));

        while r_cur.degree() >= r_last.degree() && !r_cur.is_zero() {
            let degree_diff = r_cur.degree() - r_last.degree();
            let scale = mul(r_cur.coefficient(r_cur.degree()), dlt_inverse);
            quotient = quotient.add(&Poly::monomial(degree_diff, scale));
            r_cur = r_cur.add(&r_last.multiply_by_monomial(degree_diff, scale));
        }
        t_cur = quotient.multiply(&t_last).add(&t_last_last);

        if r_cur.degree() >= r_last.degree() && !r_cur.is_zero() {
            return Err(uncorrectable());
        }
    }
    let sigma_at_zero = t_cur.coefficient(0);
    if sigma_at_zero == 0 {
        return Err(uncorrectable());
    }
    let inv = inverse(sigma_at_zero);
    Ok((t_cur.scale(inv), r_cur.scale(inv)))
}

fn error_locations(locator: &Poly) -> Result<Vec<u8>, BarcodeError> {
    let count = locator.degree();
    if count == 1 {
        return Ok(vec![locator.coefficient(1)]);
    }
    let mut out = Vec::with_capacity(count);
    for i in 1..=255u8 {
        if out.len() >= count {
            break;
        }
        if locator.evaluate_at(i) == 0 {
            out.push(inverse(i));
        }
    }
    if out.len() != count {
        return Err(uncorrectable());
    }
    Ok(out)
}

fn error_magnitudes(evaluator: &Poly, locations: &[u8]) -> Vec<u8> {
    locations
        .iter()
        .enumerate()
        .map(|(i, location)| {
            let xi_inverse = inverse(*location);
            let mut denominator = 1u8;
            for (j, other) in locations.iter().enumerate() {
                if i != j {
                    let term = mul(*other, xi_inverse);
                    let term_plus_1 = if term & 1 == 0 { term | 1 } else { term & !1 };
                    denominator = mul(denominator, term_plus_1);
                }
            }
            mul(evaluator.evaluate_at(xi_inverse), inverse(denominator))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use nanorand::{Rng, WyRand};

    use super::*;

    #[test]
    fn known_codewords() {
        // version 1-M "01234567" from the standard's worked example
        let data = [
            0x10, 0x20, 0x0C, 0x56, 0x61, 0x80, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11,
            0xEC, 0x11
        ];
        let ec = encode(&data, 10);
        assert_eq!(ec, vec![0xA5, 0x24, 0xD4, 0xC1, 0xED, 0x36, 0xC7, 0x87, 0x2C, 0x55]);
    }

    #[test]
    fn corrects_up_to_half_the_ec_codewords() {
        let mut rng = WyRand::new_seed(42);
        for round in 0..50 {
            let data: Vec<u8> = (0..20).map(|_| rng.generate::<u8>()).collect();
            let mut block = data.clone();
            block.extend(encode(&data, 10));

            let errors = round % 6;
            let mut corrupted = block.clone();
            for k in 0..errors {
                let pos = (k * 7 + round) % corrupted.len();
                corrupted[pos] ^= 0x5A;
            }
            let result = decode(&mut corrupted, 10);
            assert!(result.is_ok(), "round {round} with {errors} errors");
            assert_eq!(corrupted, block);
        }
    }

    #[test]
    fn rejects_too_many_errors() {
        let data = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let mut block = data.to_vec();
        block.extend(encode(&data, 4));
        for x in block.iter_mut().take(5) {
            *x ^= 0xFF;
        }
        // either detected as uncorrectable or "corrected" into something else
        match decode(&mut block, 4) {
            Err(_) => {}
            Ok(_) => assert_ne!(block[..8], data)
        }
    }
}
