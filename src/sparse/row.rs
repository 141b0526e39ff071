use std::cmp::Ordering;

/// A stored `(index, value)` entry of a sparse row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparseElement {
    pub index: usize,
    pub value: f64,
}

impl SparseElement {
    pub fn new(index: usize, value: f64) -> Self {
        Self { index, value }
    }
}

/// Elements of one matrix row, strictly ascending by `index`.
///
/// Missing indices are implicit zeros. Stored zeros are allowed and are only
/// removed by an explicit compaction pass on the owning matrix. The row has
/// no notion of its logical width; bounds are checked by the matrix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseRow {
    elems: Vec<SparseElement>,
}

impl SparseRow {
    pub fn new() -> Self {
        Self { elems: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elems: Vec::with_capacity(capacity),
        }
    }

    /// Builds a row from a dense slice, storing only non-zero cells.
    pub fn from_dense(values: &[f64]) -> Self {
        let elems = values
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v != 0.0)
            .map(|(i, &v)| SparseElement::new(i, v))
            .collect();
        Self { elems }
    }

    pub(crate) fn from_sorted(elems: Vec<SparseElement>) -> Self {
        debug_assert!(elems.windows(2).all(|w| w[0].index < w[1].index));
        Self { elems }
    }

    pub fn len(&self) -> usize {
        self.elems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.elems.capacity()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SparseElement> {
        self.elems.iter()
    }

    pub fn as_slice(&self) -> &[SparseElement] {
        &self.elems
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [SparseElement] {
        &mut self.elems
    }

    pub fn last_index(&self) -> Option<usize> {
        self.elems.last().map(|e| e.index)
    }

    /// Appends an element whose index is above every stored index.
    pub(crate) fn push(&mut self, index: usize, value: f64) {
        debug_assert!(self.last_index().map_or(true, |last| index > last));
        self.elems.push(SparseElement::new(index, value));
    }

    pub(crate) fn extend_from_slice(&mut self, elems: &[SparseElement]) {
        debug_assert!(match (self.last_index(), elems.first()) {
            (Some(last), Some(first)) => first.index > last,
            _ => true,
        });
        self.elems.extend_from_slice(elems);
    }

    pub(crate) fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&SparseElement) -> bool,
    {
        self.elems.retain(f);
    }

    /// Truncates to zero length, keeping the allocation.
    pub fn clear(&mut self) {
        self.elems.clear();
    }

    fn search(&self, index: usize) -> Result<usize, usize> {
        self.elems.binary_search_by(|e| e.index.cmp(&index))
    }

    /// Value at `index`, `0.0` when nothing is stored there.
    pub fn at(&self, index: usize) -> f64 {
        match self.search(index) {
            Ok(pos) => self.elems[pos].value,
            Err(_) => 0.0,
        }
    }

    /// Stores `value` at `index`. Zero is stored like any other value.
    pub fn set(&mut self, index: usize, value: f64) {
        match self.last_index() {
            None => return self.elems.push(SparseElement::new(index, value)),
            Some(last) if index > last => return self.elems.push(SparseElement::new(index, value)),
            _ => {}
        }
        match self.search(index) {
            Ok(pos) => self.elems[pos].value = value,
            Err(pos) => self.elems.insert(pos, SparseElement::new(index, value)),
        }
    }

    /// Smallest stored value, ignoring implicit zeros.
    pub fn min(&self) -> Option<f64> {
        self.elems.iter().map(|e| e.value).reduce(f64::min)
    }

    /// Largest stored value, ignoring implicit zeros.
    pub fn max(&self) -> Option<f64> {
        self.elems.iter().map(|e| e.value).reduce(f64::max)
    }

    /// Smallest stored non-zero value; `None` if every stored value is zero.
    pub fn min_non_zero(&self) -> Option<f64> {
        self.elems
            .iter()
            .map(|e| e.value)
            .filter(|&v| v != 0.0)
            .reduce(f64::min)
    }

    /// Largest stored non-zero value; `None` if every stored value is zero.
    pub fn max_non_zero(&self) -> Option<f64> {
        self.elems
            .iter()
            .map(|e| e.value)
            .filter(|&v| v != 0.0)
            .reduce(f64::max)
    }

    pub fn sum(&self) -> f64 {
        self.elems.iter().map(|e| e.value).sum()
    }

    /// Union merge of two rows. `right` maps a value present only in `b`.
    fn fold_union<F, R>(&self, b: &SparseRow, both: F, right: R) -> SparseRow
    where
        F: Fn(f64, f64) -> f64,
        R: Fn(f64) -> f64,
    {
        let (a, b) = (&self.elems, &b.elems);
        let mut out = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].index.cmp(&b[j].index) {
                Ordering::Less => {
                    out.push(a[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    out.push(SparseElement::new(b[j].index, right(b[j].value)));
                    j += 1;
                }
                Ordering::Equal => {
                    out.push(SparseElement::new(a[i].index, both(a[i].value, b[j].value)));
                    i += 1;
                    j += 1;
                }
            }
        }
        out.extend_from_slice(&a[i..]);
        out.extend(b[j..].iter().map(|e| SparseElement::new(e.index, right(e.value))));
        SparseRow { elems: out }
    }

    /// Calls `f` for every index stored in both rows, in ascending order.
    fn for_each_shared<F>(&self, b: &SparseRow, mut f: F)
    where
        F: FnMut(usize, f64, f64),
    {
        let (a, b) = (&self.elems, &b.elems);
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].index.cmp(&b[j].index) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    f(a[i].index, a[i].value, b[j].value);
                    i += 1;
                    j += 1;
                }
            }
        }
    }

    /// Merges two rows, testing every index present in either one. Missing
    /// values compare as zero. Stops at the first mismatch.
    fn fold_all<F>(&self, b: &SparseRow, eq: F) -> bool
    where
        F: Fn(f64, f64) -> bool,
    {
        let (a, b) = (&self.elems, &b.elems);
        let (mut i, mut j) = (0, 0);
        while i < a.len() || j < b.len() {
            let ok = match (a.get(i), b.get(j)) {
                (Some(x), Some(y)) if x.index == y.index => {
                    i += 1;
                    j += 1;
                    eq(x.value, y.value)
                }
                (Some(x), Some(y)) if x.index < y.index => {
                    i += 1;
                    eq(x.value, 0.0)
                }
                (Some(x), None) => {
                    i += 1;
                    eq(x.value, 0.0)
                }
                (_, Some(y)) => {
                    j += 1;
                    eq(0.0, y.value)
                }
                (None, None) => unreachable!(),
            };
            if !ok {
                return false;
            }
        }
        true
    }

    pub fn fold_add(&self, b: &SparseRow) -> SparseRow {
        self.fold_union(b, |x, y| x + y, |y| y)
    }

    pub fn fold_sub(&self, b: &SparseRow) -> SparseRow {
        self.fold_union(b, |x, y| x - y, |y| -y)
    }

    /// Element-wise product; only indices stored in both rows are emitted.
    pub fn fold_mul(&self, b: &SparseRow) -> SparseRow {
        let mut out = Vec::with_capacity(self.len().min(b.len()));
        self.for_each_shared(b, |index, x, y| out.push(SparseElement::new(index, x * y)));
        SparseRow { elems: out }
    }

    /// Sparse dot product of two rows.
    pub fn fold_mul_sum(&self, b: &SparseRow) -> f64 {
        let mut sum = 0.0;
        self.for_each_shared(b, |_, x, y| sum += x * y);
        sum
    }

    pub fn fold_equal(&self, b: &SparseRow) -> bool {
        self.fold_all(b, |x, y| x == y)
    }

    pub fn fold_approx(&self, b: &SparseRow, epsilon: f64) -> bool {
        self.fold_all(b, |x, y| (x - y).abs() <= epsilon)
    }

    /// Multiplies every stored value by `f`. Scaling by zero keeps the entries.
    pub fn scale(&self, f: f64) -> SparseRow {
        SparseRow {
            elems: self
                .elems
                .iter()
                .map(|e| SparseElement::new(e.index, e.value * f))
                .collect(),
        }
    }

    /// Elements with index `>= i`.
    pub fn upper_from(&self, i: usize) -> &[SparseElement] {
        match self.elems.iter().position(|e| e.index >= i) {
            Some(pos) => &self.elems[pos..],
            None => &[],
        }
    }

    /// Elements with index `<= i`.
    pub fn lower_to(&self, i: usize) -> &[SparseElement] {
        match self.elems.iter().rposition(|e| e.index <= i) {
            Some(pos) => &self.elems[..=pos],
            None => &[],
        }
    }
}

impl<'a> IntoIterator for &'a SparseRow {
    type Item = &'a SparseElement;
    type IntoIter = std::slice::Iter<'a, SparseElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elems.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn row(pairs: &[(usize, f64)]) -> SparseRow {
        SparseRow::from_sorted(pairs.iter().map(|&(i, v)| SparseElement::new(i, v)).collect())
    }

    fn random_row(rng: &mut ChaCha8Rng, width: usize) -> SparseRow {
        let mut r = SparseRow::new();
        for i in 0..width {
            if rng.random::<f64>() < 0.4 {
                r.set(i, rng.random_range(-3..=3) as f64);
            }
        }
        r
    }

    fn is_strictly_ascending(r: &SparseRow) -> bool {
        r.as_slice().windows(2).all(|w| w[0].index < w[1].index)
    }

    #[test]
    fn test_at_and_set() {
        let mut r = SparseRow::new();
        r.set(4, 1.0);
        r.set(1, 2.0);
        r.set(9, 3.0);
        r.set(6, 4.0);
        r.set(4, 0.0);

        let idx: Vec<usize> = r.iter().map(|e| e.index).collect();
        assert_eq!(idx, vec![1, 4, 6, 9]);
        assert_eq!(r.at(1), 2.0);
        assert_eq!(r.at(4), 0.0);
        assert_eq!(r.len(), 4, "setting zero keeps the stored element");
        assert_eq!(r.at(5), 0.0);
        assert_eq!(r.at(100), 0.0);
    }

    #[test]
    fn test_from_dense_skips_zeros() {
        let r = SparseRow::from_dense(&[0.0, 1.5, 0.0, -2.0]);
        assert_eq!(r.as_slice(), &[SparseElement::new(1, 1.5), SparseElement::new(3, -2.0)]);
    }

    #[test]
    fn test_min_max() {
        let r = row(&[(0, 0.0), (2, 3.0), (5, -1.0)]);
        assert_eq!(r.min(), Some(-1.0));
        assert_eq!(r.max(), Some(3.0));
        assert_eq!(r.sum(), 2.0);

        let zeros = row(&[(1, 0.0), (3, 0.0)]);
        assert_eq!(zeros.min(), Some(0.0));
        assert_eq!(zeros.min_non_zero(), None);
        assert_eq!(zeros.max_non_zero(), None);
        assert_eq!(SparseRow::new().min(), None);

        let mixed = row(&[(0, 0.0), (1, 4.0), (2, 2.0)]);
        assert_eq!(mixed.min_non_zero(), Some(2.0));
        assert_eq!(mixed.max_non_zero(), Some(4.0));
    }

    #[test]
    fn test_fold_sub_keeps_explicit_zero() {
        let a = row(&[(0, 2.0), (3, 1.0)]);
        let b = row(&[(0, 2.0), (1, 5.0)]);
        let d = a.fold_sub(&b);
        assert_eq!(
            d.as_slice(),
            &[
                SparseElement::new(0, 0.0),
                SparseElement::new(1, -5.0),
                SparseElement::new(3, 1.0)
            ]
        );
    }

    #[test]
    fn test_fold_mul_is_intersection() {
        let a = row(&[(0, 2.0), (2, 3.0), (4, 1.0)]);
        let b = row(&[(1, 7.0), (2, 2.0), (4, -1.0)]);
        let p = a.fold_mul(&b);
        assert_eq!(p.as_slice(), &[SparseElement::new(2, 6.0), SparseElement::new(4, -1.0)]);
        assert_eq!(a.fold_mul_sum(&b), 5.0);
    }

    #[test]
    fn test_fold_equal_treats_absent_as_zero() {
        let a = row(&[(0, 1.0), (2, 0.0)]);
        let b = row(&[(0, 1.0)]);
        assert!(a.fold_equal(&b));
        assert!(b.fold_equal(&a));

        let c = row(&[(0, 1.0), (2, 1e-9)]);
        assert!(!a.fold_equal(&c));
        assert!(a.fold_approx(&c, 1e-6));
        assert!(!a.fold_approx(&c, 1e-12));
    }

    #[test]
    fn test_scale_by_zero_keeps_entries() {
        let r = row(&[(1, 2.0), (3, -4.0)]).scale(0.0);
        assert_eq!(r.len(), 2);
        assert_eq!(r.sum(), 0.0);
    }

    #[test]
    fn test_triangular_slices() {
        let r = row(&[(0, 1.0), (2, 2.0), (5, 3.0)]);
        assert_eq!(r.upper_from(2).len(), 2);
        assert_eq!(r.upper_from(3).len(), 1);
        assert!(r.upper_from(6).is_empty());
        assert_eq!(r.lower_to(2).len(), 2);
        assert_eq!(r.lower_to(1).len(), 1);
        assert!(row(&[(3, 1.0)]).lower_to(2).is_empty());
    }

    #[test]
    fn test_fold_laws_hold_pointwise() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let width = 24;
        for _ in 0..200 {
            let a = random_row(&mut rng, width);
            let b = random_row(&mut rng, width);
            let sum = a.fold_add(&b);
            let diff = a.fold_sub(&b);
            let prod = a.fold_mul(&b);
            for r in [&sum, &diff, &prod] {
                assert!(is_strictly_ascending(r));
            }
            let mut dot = 0.0;
            for i in 0..width {
                assert_eq!(sum.at(i), a.at(i) + b.at(i));
                assert_eq!(diff.at(i), a.at(i) - b.at(i));
                assert_eq!(prod.at(i), a.at(i) * b.at(i));
                dot += a.at(i) * b.at(i);
            }
            assert_eq!(a.fold_mul_sum(&b), dot);
            let dense_equal = (0..width).all(|i| a.at(i) == b.at(i));
            assert_eq!(a.fold_equal(&b), dense_equal);
            assert!(a.fold_equal(&a.clone()));
        }
    }
}
