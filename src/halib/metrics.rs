use ordered_float::OrderedFloat;

/// Number of unordered diploid genotypes over `n` alleles, self-pairs included
pub fn genotype_count(n: usize) -> usize {
    n * (n + 1) / 2
}

/// Position of allele pair (i, j) in the canonical likelihood ordering
/// AA, AB, BB, AC, BC, CC, ...
pub fn genotype_index(i: usize, j: usize) -> usize {
    let (hi, lo) = if i >= j { (i, j) } else { (j, i) };
    hi * (hi + 1) / 2 + lo
}

/// Inverse of `genotype_index`.
/// Returns (i, j) with j <= i where i(i+1)/2 <= index < (i+1)(i+2)/2
pub fn genotype_pair(index: usize) -> (usize, usize) {
    let mut i = (((8 * index + 1) as f64).sqrt() as usize).saturating_sub(1) / 2;
    // correct for float rounding at large indices
    while i * (i + 1) / 2 > index {
        i -= 1;
    }
    while (i + 1) * (i + 2) / 2 <= index {
        i += 1;
    }
    (i, index - i * (i + 1) / 2)
}

/// Converts log10 genotype likelihoods into phred-scaled likelihoods
/// normalized so the most likely genotype is 0.
///
/// # Returns
/// One PL per likelihood. Non-finite or unrepresentable values saturate to i32::MAX.
pub fn log10_to_pls(log10: &[f64]) -> Vec<i32> {
    let best = match log10
        .iter()
        .copied()
        .filter(|x| x.is_finite())
        .max_by_key(|&x| OrderedFloat(x))
    {
        Some(best) => best,
        None => return vec![i32::MAX; log10.len()],
    };

    log10
        .iter()
        .map(|&x| {
            let pl = (-10.0 * (x - best)).round();
            if pl.is_finite() && pl < i32::MAX as f64 {
                pl as i32
            } else {
                i32::MAX
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_ordering() {
        // AA, AB, BB, AC, BC, CC
        let expected = [(0, 0), (1, 0), (1, 1), (2, 0), (2, 1), (2, 2)];
        for (k, pair) in expected.iter().enumerate() {
            assert_eq!(genotype_pair(k), *pair);
            assert_eq!(genotype_index(pair.0, pair.1), k);
        }
        assert_eq!(genotype_index(0, 2), 3);
    }

    #[test]
    fn index_and_pair_agree() {
        for n in 1..40 {
            let mut k = 0;
            for i in 0..n {
                for j in 0..=i {
                    assert_eq!(genotype_pair(k), (i, j));
                    k += 1;
                }
            }
            assert_eq!(k, genotype_count(n));
        }
    }

    #[test]
    fn pls_are_normalized() {
        let pls = log10_to_pls(&[-1.0, -0.5, -3.0]);
        assert_eq!(pls, vec![5, 0, 25]);
        assert_eq!(log10_to_pls(&[f64::NEG_INFINITY, -2.0]), vec![i32::MAX, 0]);
        assert!(log10_to_pls(&[]).is_empty());
    }
}
