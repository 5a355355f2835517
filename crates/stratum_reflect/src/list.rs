use crate::facet::Facet;

// -----------------------------------------------------------------------------
// FacetList

/// An ordered, index-accessible sequence of [`Facet`] values.
///
/// Implemented for `Vec<T>`; the engine serializes a list by visiting
/// `0..len()` in order.
pub trait FacetList: Send + Sync {
    /// Returns the number of elements.
    fn len(&self) -> usize;

    /// Returns the element at `index`, or `None` when out of bounds.
    fn get(&self, index: usize) -> Option<&dyn Facet>;
}

impl<T: Facet> FacetList for Vec<T> {
    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&dyn Facet> {
        self.as_slice().get(index).map(|item| item as &dyn Facet)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::FacetList;

    #[test]
    fn vec_indexing() {
        let values = vec![1_u32, 2, 3];
        let list: &dyn FacetList = &values;

        assert_eq!(list.len(), 3);
        assert_eq!(list.get(1).unwrap().downcast_ref::<u32>(), Some(&2));
        assert!(list.get(3).is_none());
    }
}
