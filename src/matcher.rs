//! Maximum-weight bipartite matching via the Hungarian algorithm (spec §4.C).
//!
//! This is one of the four subsystems the task is explicitly about building,
//! not importing, so there is no assignment-problem crate dependency here:
//! a rectangular matrix is padded to a square with implicit zero-similarity
//! cells, negated into a minimization problem, and solved with the classic
//! O(n^3) Kuhn-Munkres shortest-augmenting-path method (row/column
//! potentials `u`/`v`, `way[]` backpointers). Internal arrays are 1-indexed
//! (size `n+1`) to match the textbook recurrence exactly; the public API is
//! 0-indexed.

/// Sentinel column index meaning "this row was matched only to a padding
/// column" — i.e., it has no real counterpart in the original matrix.
pub const UNASSIGNED: usize = usize::MAX;

/// Solve the assignment problem that maximizes total similarity over a
/// rectangular `sim[r][c]` matrix (entries assumed in `[0, 1]`; ragged rows
/// are treated as implicitly zero in the missing cells).
///
/// Returns `(assignment, total)` where `assignment[i]` is the column index
/// row `i` was matched to, or [`UNASSIGNED`] if row `i` matched a padding
/// column (i.e. there were more rows than columns). `total` is the sum of
/// `sim[i][assignment[i]]` over assigned real cells — the global maximum
/// achievable by any one-to-one matching.
pub fn max_weight_assignment(sim: &[Vec<f64>]) -> (Vec<usize>, f64) {
    let n_rows = sim.len();
    if n_rows == 0 {
        return (Vec::new(), 0.0);
    }
    let n_cols = sim.iter().map(|row| row.len()).max().unwrap_or(0);
    if n_cols == 0 {
        return (vec![UNASSIGNED; n_rows], 0.0);
    }

    let n = n_rows.max(n_cols);

    // cost[i][j] for i,j in 1..=n (1-indexed); padding cells cost 0 (best
    // case, since similarity 0 negates to 0).
    let mut cost = vec![vec![0.0_f64; n + 1]; n + 1];
    for i in 0..n_rows {
        for j in 0..sim[i].len().min(n_cols) {
            cost[i + 1][j + 1] = -sim[i][j];
        }
    }

    const INF: f64 = f64::INFINITY;
    let mut u = vec![0.0_f64; n + 1];
    let mut v = vec![0.0_f64; n + 1];
    let mut p = vec![0usize; n + 1]; // p[j] = row matched to column j (1-indexed row, 0 = unmatched)
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![INF; n + 1];
        let mut used = vec![false; n + 1];
        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = INF;
            let mut j1 = 0usize;
            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let cur = cost[i0][j] - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }
            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    // p[j] = row matched to column j, for j in 1..=n. Invert into row -> col.
    let mut row_to_col = vec![UNASSIGNED; n];
    for j in 1..=n {
        if p[j] != 0 {
            row_to_col[p[j] - 1] = j - 1;
        }
    }

    let mut assignment = vec![UNASSIGNED; n_rows];
    let mut total = 0.0;
    for i in 0..n_rows {
        let j = row_to_col[i];
        if j < n_cols {
            assignment[i] = j;
            total += sim[i].get(j).copied().unwrap_or(0.0);
        }
    }
    (assignment, total)
}
