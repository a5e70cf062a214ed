use std::ops::{Index, IndexMut};

/// A dense, row-major `n_outer × n_inner` buffer of pairwise results.
///
/// A `PairMatrix` is scratch space owned by the caller and filled by the group
/// distance kernels of a [`Space`](crate::core::space::Space): after a call,
/// element `(i, j)` holds the value for point `i` of the outer group and point
/// `j` of the inner group. It is meant to be reused across many calls, so
/// [`redimension`](Self::redimension) only allocates when the requested size
/// exceeds everything the matrix has held before.
///
/// # Access
///
/// - Checked, by position: [`get`](Self::get), `matrix[(i, j)]`, [`row`](Self::row).
/// - Checked, through an outer-index cursor: [`set_outer_index`](Self::set_outer_index)
///   followed by [`inner`](Self::inner) / [`set_inner`](Self::set_inner), which
///   avoids recomputing the row offset in a tight inner loop.
/// - Unchecked: [`get_unchecked`](Self::get_unchecked),
///   [`inner_unchecked`](Self::inner_unchecked) and
///   [`set_unchecked`](Self::set_unchecked). These are `unsafe`; passing an
///   index outside the current dimensions is undefined behaviour.
///
/// A matrix is not meant to be shared between concurrent writers: every thread
/// evaluating energies should own its own.
#[derive(Debug, Clone)]
pub struct PairMatrix<T = f64> {
    data: Vec<T>,
    n_outer: usize,
    n_inner: usize,
    outer_offset: usize,
}

impl<T> Default for PairMatrix<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PairMatrix<T> {
    /// Creates an empty matrix without allocating.
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            n_outer: 0,
            n_inner: 0,
            outer_offset: 0,
        }
    }

    #[inline]
    pub fn n_outer(&self) -> usize {
        self.n_outer
    }

    #[inline]
    pub fn n_inner(&self) -> usize {
        self.n_inner
    }

    /// Number of elements in the current `n_outer × n_inner` view.
    #[inline]
    pub fn len(&self) -> usize {
        self.n_outer * self.n_inner
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of elements the matrix can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Pointer to the start of the storage, to observe buffer reuse.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.data.as_ptr()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data[..self.len()]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.len();
        &mut self.data[..len]
    }

    /// Resets the dimensions to `0 × 0`. Storage is kept; contents are
    /// meaningless until the matrix is filled again.
    pub fn clear(&mut self) {
        self.n_outer = 0;
        self.n_inner = 0;
        self.outer_offset = 0;
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Option<&T> {
        if i < self.n_outer && j < self.n_inner {
            self.data.get(i * self.n_inner + j)
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, i: usize, j: usize) -> Option<&mut T> {
        if i < self.n_outer && j < self.n_inner {
            self.data.get_mut(i * self.n_inner + j)
        } else {
            None
        }
    }

    /// The `n_inner` values of outer row `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n_outer`.
    #[inline]
    pub fn row(&self, i: usize) -> &[T] {
        assert!(i < self.n_outer, "row {i} out of range ({} rows)", self.n_outer);
        let start = i * self.n_inner;
        &self.data[start..start + self.n_inner]
    }

    /// Mutable access to outer row `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n_outer`.
    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [T] {
        assert!(i < self.n_outer, "row {i} out of range ({} rows)", self.n_outer);
        let start = i * self.n_inner;
        &mut self.data[start..start + self.n_inner]
    }

    /// Points the cursor at outer row `i` for subsequent [`inner`](Self::inner)
    /// and [`set_inner`](Self::set_inner) calls.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n_outer`.
    #[inline]
    pub fn set_outer_index(&mut self, i: usize) {
        assert!(i < self.n_outer, "outer index {i} out of range ({} rows)", self.n_outer);
        self.outer_offset = i * self.n_inner;
    }

    /// Unchecked counterpart of [`get`](Self::get).
    ///
    /// # Safety
    ///
    /// `i` must be less than `n_outer` and `j` less than `n_inner`.
    #[inline(always)]
    pub unsafe fn get_unchecked(&self, i: usize, j: usize) -> &T {
        debug_assert!(i < self.n_outer && j < self.n_inner);
        // SAFETY: the caller guarantees the index lies in the current view, which
        // is never larger than the allocated storage.
        unsafe { self.data.get_unchecked(i * self.n_inner + j) }
    }

    /// Unchecked write at `(i, j)`.
    ///
    /// # Safety
    ///
    /// `i` must be less than `n_outer` and `j` less than `n_inner`.
    #[inline(always)]
    pub unsafe fn set_unchecked(&mut self, i: usize, j: usize, value: T) {
        debug_assert!(i < self.n_outer && j < self.n_inner);
        // SAFETY: see `get_unchecked`.
        unsafe {
            *self.data.get_unchecked_mut(i * self.n_inner + j) = value;
        }
    }

    /// Unchecked read of column `j` in the row selected by
    /// [`set_outer_index`](Self::set_outer_index).
    ///
    /// # Safety
    ///
    /// `j` must be less than `n_inner`, and the dimensions must not have changed
    /// since the cursor was set.
    #[inline(always)]
    pub unsafe fn inner_unchecked(&self, j: usize) -> &T {
        debug_assert!(j < self.n_inner);
        // SAFETY: the cursor always points at the start of a valid row and the
        // caller guarantees `j` lies within it.
        unsafe { self.data.get_unchecked(self.outer_offset + j) }
    }
}

impl<T: Copy> PairMatrix<T> {
    /// Reads column `j` in the row selected by [`set_outer_index`](Self::set_outer_index).
    ///
    /// # Panics
    ///
    /// Panics if `j >= n_inner`.
    #[inline]
    pub fn inner(&self, j: usize) -> T {
        assert!(j < self.n_inner, "inner index {j} out of range ({} columns)", self.n_inner);
        self.data[self.outer_offset + j]
    }

    /// Writes column `j` in the row selected by [`set_outer_index`](Self::set_outer_index).
    ///
    /// # Panics
    ///
    /// Panics if `j >= n_inner`.
    #[inline]
    pub fn set_inner(&mut self, j: usize, value: T) {
        assert!(j < self.n_inner, "inner index {j} out of range ({} columns)", self.n_inner);
        self.data[self.outer_offset + j] = value;
    }

    /// Sets every element of the current view to `value`.
    pub fn fill(&mut self, value: T) {
        self.as_mut_slice().fill(value);
    }

    /// Changes the dimensions to `n_outer × n_inner`.
    ///
    /// If the new size fits in the storage already allocated, the storage is
    /// reused as is and its contents are unspecified. Otherwise it grows to exactly
    /// the new size, padded with `value`, and that size becomes the new capacity.
    /// The capacity never shrinks. The outer-index cursor is reset to row 0.
    pub fn redimension_with(&mut self, n_outer: usize, n_inner: usize, value: T) {
        let needed = n_outer * n_inner;
        if needed > self.data.len() {
            self.data.reserve_exact(needed - self.data.len());
            self.data.resize(needed, value);
        }
        self.n_outer = n_outer;
        self.n_inner = n_inner;
        self.outer_offset = 0;
    }
}

impl<T: Copy + Default> PairMatrix<T> {
    /// Creates a matrix with the given dimensions, default-filled.
    pub fn with_dimensions(n_outer: usize, n_inner: usize) -> Self {
        let mut matrix = Self::new();
        matrix.redimension(n_outer, n_inner);
        matrix
    }

    /// Changes the dimensions to `n_outer × n_inner`, filling newly allocated
    /// storage with `T::default()`. See [`redimension_with`](Self::redimension_with).
    pub fn redimension(&mut self, n_outer: usize, n_inner: usize) {
        self.redimension_with(n_outer, n_inner, T::default());
    }
}

impl<T> Index<(usize, usize)> for PairMatrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        assert!(
            i < self.n_outer && j < self.n_inner,
            "index ({i}, {j}) out of range for a {}x{} matrix",
            self.n_outer,
            self.n_inner
        );
        &self.data[i * self.n_inner + j]
    }
}

impl<T> IndexMut<(usize, usize)> for PairMatrix<T> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        assert!(
            i < self.n_outer && j < self.n_inner,
            "index ({i}, {j}) out of range for a {}x{} matrix",
            self.n_outer,
            self.n_inner
        );
        &mut self.data[i * self.n_inner + j]
    }
}
