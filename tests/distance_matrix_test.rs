//! Materialised distance matrix against direct recomputation.

use anytime_mp::core::naive;
use anytime_mp::{AnytimeCalculator, DistanceMatrix, Euclidean, MatrixProfile, ZNormEuclidean};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn series(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|i| (i as f64 * 0.21).cos() * 1.5 + rng.gen_range(-0.4..0.4))
        .collect()
}

#[test]
fn test_full_run_matches_direct_distances() {
    let ts = series(90, 3);
    let m = 10;
    let mut calc = AnytimeCalculator::new(m, vec![ts.clone()]).unwrap();
    let gen = calc.add_generator(0, &ZNormEuclidean::default()).unwrap();
    let dm = calc.add_consumer(&[gen], DistanceMatrix::new()).unwrap();
    calc.calculate_diagonals(1.0, false).unwrap();

    let radius = calc.exclusion_radius();
    let matrix = dm.lock().distance_matrix();
    assert_eq!(matrix.len(), calc.n_subsequences());
    for (i, row) in matrix.iter().enumerate() {
        for (j, &d) in row.iter().enumerate() {
            if i.abs_diff(j) < radius {
                assert!(d.is_infinite(), "({i}, {j}) inside exclusion zone holds {d}");
            } else {
                let direct = naive::znorm_euclidean(&ts[i..i + m], &ts[j..j + m], 0.0);
                assert!((d - direct).abs() < 1e-6, "({i}, {j}): {d} vs {direct}");
            }
        }
    }
}

#[test]
fn test_partial_run_leaves_pending_diagonals_infinite() {
    let ts = series(120, 5);
    let m = 8;
    let mut calc = AnytimeCalculator::new(m, vec![ts.clone()]).unwrap();
    let gen = calc.add_generator(0, &Euclidean).unwrap();
    let dm = calc.add_consumer(&[gen], DistanceMatrix::new()).unwrap();
    calc.calculate_diagonals(0.3, false).unwrap();
    assert!(!calc.is_complete());

    let dm = dm.lock();
    let n_subs = dm.n_subsequences();
    let mut filled_diagonals = 0;
    for offset in 0..n_subs {
        let cells: Vec<Option<f64>> = (0..n_subs - offset).map(|i| dm.get(i, i + offset)).collect();
        if cells.iter().all(Option::is_none) {
            continue;
        }
        filled_diagonals += 1;
        assert!(offset >= calc.exclusion_radius(), "diagonal {offset} filled");
        for (i, cell) in cells.into_iter().enumerate() {
            let j = i + offset;
            let direct = naive::euclidean(&ts[i..i + m], &ts[j..j + m]);
            let d = cell.expect("a processed diagonal is filled completely");
            assert!((d - direct).abs() < 1e-6, "({i}, {j}): {d} vs {direct}");
            assert_eq!(dm.get(j, i), Some(d));
        }
    }
    assert_eq!(filled_diagonals, calc.completed_diagonals());
}

#[test]
fn test_row_minima_equal_matrix_profile() {
    let ts = series(100, 7);
    let mut calc = AnytimeCalculator::new(12, vec![ts]).unwrap();
    let gen = calc.add_generator(0, &ZNormEuclidean::default()).unwrap();
    let dm = calc.add_consumer(&[gen], DistanceMatrix::new()).unwrap();
    let mp = calc.add_consumer(&[gen], MatrixProfile::bidirectional()).unwrap();
    calc.calculate_diagonals(0.5, false).unwrap();
    calc.calculate_diagonals(1.0, false).unwrap();

    let profile = mp.lock().matrix_profile();
    for (i, row) in dm.lock().distance_matrix().iter().enumerate() {
        let min = row.iter().copied().fold(f64::INFINITY, f64::min);
        assert_eq!(min, profile[i], "row {i}");
    }
}
