//! Modular arithmetic over 64-bit integers.
//!
//! All operations work on `u64` operands and reduce through a 128-bit
//! intermediate, so no product of two residues can overflow regardless of
//! the size of the modulus.
//!
//! ## Provided operations
//!
//! - [`mod_mul`] and [`mod_pow`]: multiplication and exponentiation modulo `m`
//! - [`is_prime`]: deterministic Miller–Rabin for the full `u64` range
//! - [`prime_factors`]: distinct prime factors by trial division
//! - [`is_primitive_root`] and [`primitive_roots`]: generator tests for the
//!   multiplicative group modulo a prime

/// Miller–Rabin witnesses that are sufficient for every `n < 2^64`.
const MILLER_RABIN_WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Computes `(a * b) mod modulus` without overflow.
///
/// # Panics
///
/// Panics if `modulus` is zero.
#[inline]
pub fn mod_mul(a: u64, b: u64, modulus: u64) -> u64 {
    ((a as u128 * b as u128) % modulus as u128) as u64
}

/// Computes `base^exponent mod modulus` by square-and-multiply.
///
/// The result always lies in `[0, modulus - 1]`, and a zero exponent yields
/// `1 % modulus`. Intermediate products are reduced through [`mod_mul`], so
/// large operands never overflow.
///
/// # Panics
///
/// Panics if `modulus` is zero, in the same way integer `%` does.
pub fn mod_pow(base: u64, exponent: u64, modulus: u64) -> u64 {
    let mut result = 1 % modulus;
    let mut base = base % modulus;
    let mut exponent = exponent;

    while exponent > 0 {
        if exponent & 1 == 1 {
            result = mod_mul(result, base, modulus);
        }

        base = mod_mul(base, base, modulus);
        exponent >>= 1;
    }

    result
}

/// Returns `true` if `n` is prime.
///
/// Deterministic for every 64-bit input: the fixed witness set
/// `2, 3, 5, ..., 37` has no strong liars below `2^64`.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }

    for &p in &MILLER_RABIN_WITNESSES {
        if n % p == 0 {
            return n == p;
        }
    }

    // n - 1 = d * 2^s with d odd
    let s = (n - 1).trailing_zeros();
    let d = (n - 1) >> s;

    'witness: for &a in &MILLER_RABIN_WITNESSES {
        let mut x = mod_pow(a, d, n);

        if x == 1 || x == n - 1 {
            continue;
        }

        for _ in 1..s {
            x = mod_mul(x, x, n);

            if x == n - 1 {
                continue 'witness;
            }
        }

        return false;
    }

    true
}

/// Returns the distinct prime factors of `n` in ascending order.
///
/// Uses trial division, so the cost grows with the square root of the
/// largest prime factor. `0` and `1` have no prime factors.
pub fn prime_factors(mut n: u64) -> Vec<u64> {
    let mut factors = Vec::new();

    if n < 2 {
        return factors;
    }

    if n % 2 == 0 {
        factors.push(2);
        while n % 2 == 0 {
            n /= 2;
        }
    }

    let mut q = 3u64;
    while q <= n / q {
        if n % q == 0 {
            factors.push(q);
            while n % q == 0 {
                n /= q;
            }
        }
        q += 2;
    }

    if n > 1 {
        factors.push(n);
    }

    factors
}

/// Returns `true` if `candidate` is a primitive root modulo `modulus`.
///
/// A primitive root is an element whose powers `candidate^k mod modulus`
/// for `k = 1..modulus-1` enumerate every value in `[1, modulus - 1]`
/// exactly once, i.e. whose multiplicative order is `modulus - 1`.
///
/// Rather than enumerating all powers, the order is checked against every
/// prime factor `q` of `modulus - 1`: the order is maximal iff
/// `candidate^((modulus - 1) / q) != 1` for all such `q`.
///
/// Never panics. Returns `false` when:
/// - `modulus` is not prime (this includes `0` and `1`)
/// - `candidate` is zero or not below `modulus`
pub fn is_primitive_root(modulus: u64, candidate: u64) -> bool {
    if candidate == 0 || candidate >= modulus || !is_prime(modulus) {
        return false;
    }

    has_full_order(modulus, candidate, &prime_factors(modulus - 1))
}

/// Returns every primitive root modulo `modulus`, in ascending order.
///
/// The result is empty if `modulus` is not prime. For a prime `p` it holds
/// exactly `phi(p - 1)` elements.
pub fn primitive_roots(modulus: u64) -> Vec<u64> {
    if !is_prime(modulus) {
        return Vec::new();
    }

    let factors = prime_factors(modulus - 1);

    (1..modulus)
        .filter(|&candidate| has_full_order(modulus, candidate, &factors))
        .collect()
}

/// Order test shared by [`is_primitive_root`] and [`primitive_roots`].
///
/// `factors` must be the distinct prime factors of `modulus - 1`.
#[inline]
fn has_full_order(modulus: u64, candidate: u64, factors: &[u64]) -> bool {
    let order = modulus - 1;

    factors
        .iter()
        .all(|&q| mod_pow(candidate, order / q, modulus) != 1)
}
