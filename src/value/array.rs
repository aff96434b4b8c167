//! Rectangular arrays.

/// A rectangular array of rank `R`, stored in row-major order.
///
/// On the wire such an array is nested `<array>` elements, one level per
/// rank, where all arrays on a level have the same length.
///
/// ```
/// use quick_xmlrpc::MultiArray;
///
/// let grid = MultiArray::from_fn([3, 2], |[row, col]| (row * 10 + col) as i32);
/// assert_eq!(grid.lengths(), [3, 2]);
/// assert_eq!(grid.get([2, 1]), Some(&21));
/// assert_eq!(grid.get([3, 0]), None);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MultiArray<T, const R: usize> {
    lengths: [usize; R],
    items: Vec<T>,
}

impl<T, const R: usize> MultiArray<T, R> {
    /// Creates an array from its lengths and its items in row-major order.
    /// Returns `None` if the number of items does not match the lengths.
    pub fn new(lengths: [usize; R], items: Vec<T>) -> Option<Self> {
        if lengths.iter().product::<usize>() != items.len() {
            return None;
        }
        Some(Self { lengths, items })
    }

    /// Creates an array calling `f` with the index of each item.
    pub fn from_fn<F>(lengths: [usize; R], mut f: F) -> Self
    where
        F: FnMut([usize; R]) -> T,
    {
        let count = lengths.iter().product::<usize>();
        let mut items = Vec::with_capacity(count);
        for flat in 0..count {
            let mut index = [0; R];
            let mut rest = flat;
            for dim in (0..R).rev() {
                index[dim] = rest % lengths[dim];
                rest /= lengths[dim];
            }
            items.push(f(index));
        }
        Self { lengths, items }
    }

    /// Length of each dimension.
    #[inline]
    pub fn lengths(&self) -> [usize; R] {
        self.lengths
    }

    /// Items in row-major order.
    #[inline]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consumes the array, returning the items in row-major order.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Returns the item at `index`, or `None` if it is out of bounds.
    pub fn get(&self, index: [usize; R]) -> Option<&T> {
        self.offset(index).and_then(|i| self.items.get(i))
    }

    /// Returns the item at `index` for modification.
    pub fn get_mut(&mut self, index: [usize; R]) -> Option<&mut T> {
        let offset = self.offset(index)?;
        self.items.get_mut(offset)
    }

    fn offset(&self, index: [usize; R]) -> Option<usize> {
        let mut offset = 0;
        for (i, len) in index.iter().zip(self.lengths.iter()) {
            if i >= len {
                return None;
            }
            offset = offset * len + i;
        }
        Some(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn row_major() {
        let array = MultiArray::new([2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(array.get([0, 2]), Some(&3));
        assert_eq!(array.get([1, 0]), Some(&4));
        assert_eq!(array.get([0, 3]), None);
    }

    #[test]
    fn wrong_item_count() {
        assert_eq!(MultiArray::new([2, 2], vec![1, 2, 3]), None);
    }

    #[test]
    fn from_fn() {
        let array = MultiArray::from_fn([2, 2, 2], |[a, b, c]| a * 4 + b * 2 + c);
        assert_eq!(array.into_items(), (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn empty_dimension() {
        let array = MultiArray::<i32, 2>::from_fn([0, 3], |_| unreachable!());
        assert!(array.items().is_empty());
    }
}
