//! Modular checksum aggregation.
//!
//! Variables:
//!   S(n) = Σ_{i=1..n} Σ_{j=1..n} ((i mod j) + (j mod i))  mod p,  p = 1e9+7
//!
//! Equations:
//!   symmetry:       S = 2·T with T the (i mod j) half of the sum
//!   i mod j       = i − j·⌊i/j⌋
//!   Σ_{i=1..n} i  = n(n+1)/2          (via INV2)
//!   Σ_{i=1..n} i² = n(n+1)(2n+1)/6    (via INV6)
//!
//! ⌊n/j⌋ is constant on O(√n) runs of j; each run contributes a closed
//! form in Σj and Σj², so the whole sum is O(√n) multiplications.
//! Products go through u128 so no operand needs a pre-reduction.

pub const MODULUS: u64 = 1_000_000_007;
const INV2: u64 = 500_000_004;
const INV6: u64 = 166_666_668;

#[inline]
fn mul(a: u64, b: u64) -> u64 {
    ((u128::from(a) * u128::from(b)) % u128::from(MODULUS)) as u64
}

#[inline]
fn add(a: u64, b: u64) -> u64 {
    let sum = a + b;
    if sum >= MODULUS {
        sum - MODULUS
    } else {
        sum
    }
}

#[inline]
fn sub(a: u64, b: u64) -> u64 {
    if a >= b {
        a - b
    } else {
        a + MODULUS - b
    }
}

/// 1 + 2 + ... + x (mod p).
fn sum_1_to(x: u64) -> u64 {
    if x == 0 {
        return 0;
    }
    let x_mod = x % MODULUS;
    mul(mul(x_mod, add(x_mod, 1)), INV2)
}

/// 1² + 2² + ... + x² (mod p).
fn sum_squares_1_to(x: u64) -> u64 {
    if x == 0 {
        return 0;
    }
    let x_mod = x % MODULUS;
    let two_x_plus_1 = add(mul(2, x_mod), 1);
    mul(mul(mul(x_mod, add(x_mod, 1)), two_x_plus_1), INV6)
}

fn sum_range(left: u64, right: u64) -> u64 {
    sub(sum_1_to(right), sum_1_to(left - 1))
}

fn sum_squares_range(left: u64, right: u64) -> u64 {
    sub(sum_squares_1_to(right), sum_squares_1_to(left - 1))
}

/// Σ_{i,j=1..n} ((i mod j) + (j mod i)) mod p, by quotient blocks.
pub fn compute(n: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    let n = u64::from(n);

    let mut total: u64 = 0;
    let n_mod = n % MODULUS;
    let n_squared_plus_n = add(mul(n_mod, n_mod), n_mod);
    let n_plus_1 = add(n_mod, 1);

    let mut j = 1u64;
    while j <= n {
        let quotient = n / j;
        let block_end = n / quotient;

        let sum_j = sum_range(j, block_end);
        let sum_j_squared = sum_squares_range(j, block_end);

        let q_mod = quotient % MODULUS;
        // Per-block contribution of the (i mod j) half, doubled at the end:
        //   [ q(q+1)·Σj² − 2q(n+1)·Σj + (n²+n)·|block| ] / 2
        let term1 = mul(mul(q_mod, add(q_mod, 1)), sum_j_squared);
        let term2 = mul(mul(mul(2, q_mod), n_plus_1), sum_j);
        let term3 = mul(n_squared_plus_n, (block_end - j + 1) % MODULUS);

        let bracket = add(sub(term1, term2), term3);
        total = add(total, mul(INV2, bracket));

        j = block_end + 1;
    }

    mul(2, total) as u32
}
