/// Every subset of `items` with at least two members: smaller subsets first, each size in
/// lexicographic index order. Template formulas are laid out in exactly this order.
pub fn channel_combinations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    let mut out = Vec::with_capacity(combination_count(items.len()));
    for size in 2..=items.len() {
        let mut idx: Vec<usize> = (0..size).collect();
        loop {
            out.push(idx.iter().map(|&i| items[i].clone()).collect());
            let Some(pos) = (0..size).rev().find(|&i| idx[i] != i + items.len() - size) else {
                break;
            };
            idx[pos] += 1;
            for j in pos + 1..size {
                idx[j] = idx[j - 1] + 1;
            }
        }
    }
    out
}

pub fn combination_name<S: AsRef<str>>(combination: &[S]) -> String {
    combination
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join("+")
}

pub fn combination_names<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    let refs: Vec<&str> = labels.iter().map(|s| s.as_ref()).collect();
    channel_combinations(&refs)
        .iter()
        .map(|c| combination_name(c))
        .collect()
}

/// `2^k - k - 1`
pub fn combination_count(k: usize) -> usize {
    if k < 2 {
        return 0;
    }
    (1usize << k) - k - 1
}

#[cfg(test)]
#[path = "../../tests/src_inline/layout/combos.rs"]
mod tests;
