use std::cmp::Ordering;

// Many-objective machinery shared by MOSA. All functions work on a fitness
// matrix: one row per chromosome, one column per goal that still lacks an
// archive entry. Covered goals are excluded before the matrix is built,
// which is the defining property of preference sorting.

/// Dominance order between two fitness rows. `Less` means the first row
/// dominates: no worse on every goal and strictly better on at least one.
pub(crate) fn dominance_ord(a: &[f64], b: &[f64]) -> Ordering {
    debug_assert_eq!(a.len(), b.len());

    let mut better = 0usize;
    let mut worse = 0usize;
    for (x, y) in a.iter().zip(b.iter()) {
        match x.total_cmp(y) {
            Ordering::Greater => better += 1,
            Ordering::Less => worse += 1,
            Ordering::Equal => {}
        }
    }

    if better > 0 && worse == 0 {
        Ordering::Less
    } else if worse > 0 && better == 0 {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// Fast non-dominated sort over the given rows, returning complete fronts
/// in order. Index-based domination-count sweep.
pub(crate) fn fast_non_dominated_sort(matrix: &[Vec<f64>], rows: &[usize]) -> Vec<Vec<usize>> {
    let mut dominated_solutions: Vec<Vec<usize>> = vec![Vec::new(); rows.len()];
    let mut domination_count: Vec<usize> = vec![0; rows.len()];
    let mut current_front: Vec<usize> = Vec::new();

    for (p_i, &p) in rows.iter().enumerate() {
        for (q_i, &q) in rows.iter().enumerate().skip(p_i + 1) {
            match dominance_ord(&matrix[p], &matrix[q]) {
                Ordering::Less => {
                    dominated_solutions[p_i].push(q_i);
                    domination_count[q_i] += 1;
                }
                Ordering::Greater => {
                    dominated_solutions[q_i].push(p_i);
                    domination_count[p_i] += 1;
                }
                Ordering::Equal => {}
            }
        }
        if domination_count[p_i] == 0 {
            current_front.push(p_i);
        }
    }

    let mut fronts: Vec<Vec<usize>> = Vec::new();
    while !current_front.is_empty() {
        let mut next_front = Vec::new();
        for &p_i in current_front.iter() {
            for &q_i in dominated_solutions[p_i].iter() {
                debug_assert!(domination_count[q_i] > 0);
                domination_count[q_i] -= 1;
                if domination_count[q_i] == 0 {
                    next_front.push(q_i);
                }
            }
        }
        fronts.push(current_front.iter().map(|&i| rows[i]).collect());
        current_front = next_front;
    }

    fronts
}

/// Sub-vector dominance score for every member of a front: against each
/// peer, count the goals on which the peer is strictly better; the score is
/// the maximum over peers. Lower is better.
pub(crate) fn sub_vector_dominance(matrix: &[Vec<f64>], front: &[usize]) -> Vec<usize> {
    front
        .iter()
        .map(|&a| {
            front
                .iter()
                .filter(|&&b| b != a)
                .map(|&b| {
                    matrix[a]
                        .iter()
                        .zip(matrix[b].iter())
                        .filter(|(own, peer)| peer.total_cmp(own) == Ordering::Greater)
                        .count()
                })
                .max()
                .unwrap_or(0)
        })
        .collect()
}

/// Preference sorting: the preferred front holds, per uncovered goal, the
/// single best row (highest fitness, ties to the shorter chromosome, then
/// to the earlier row); each row appears at most once. Remaining rows are
/// non-dominated-sorted -- unless the preferred front alone already exceeds
/// the population size, in which case the remainder is kept as one unsorted
/// front.
pub(crate) fn preference_sort(
    matrix: &[Vec<f64>],
    lengths: &[usize],
    population_size: usize,
) -> Vec<Vec<usize>> {
    debug_assert_eq!(matrix.len(), lengths.len());

    let goal_count = matrix.first().map_or(0, Vec::len);
    let mut preferred: Vec<usize> = Vec::new();

    for goal in 0..goal_count {
        let mut best: Option<usize> = None;
        for row in 0..matrix.len() {
            best = Some(match best {
                None => row,
                Some(current) => match matrix[row][goal].total_cmp(&matrix[current][goal]) {
                    Ordering::Greater => row,
                    Ordering::Equal if lengths[row] < lengths[current] => row,
                    _ => current,
                },
            });
        }
        if let Some(best) = best {
            if !preferred.contains(&best) {
                preferred.push(best);
            }
        }
    }

    let remaining: Vec<usize> = (0..matrix.len())
        .filter(|row| !preferred.contains(row))
        .collect();

    let mut fronts = vec![preferred];
    if fronts[0].len() > population_size {
        if !remaining.is_empty() {
            fronts.push(remaining);
        }
    } else if !remaining.is_empty() {
        fronts.extend(fast_non_dominated_sort(matrix, &remaining));
    }

    fronts
}
