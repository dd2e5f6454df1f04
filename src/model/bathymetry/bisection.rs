/*
Copyright 2025 The armsprop Authors

This file is part of ARMS Propagation Toolkit (armsprop).

ARMS Propagation Toolkit (armsprop) is a free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation; either version 3 of the License, or
(at your option) any later version.

ARMS Propagation Toolkit (armsprop) is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with ARMS Propagation Toolkit (armsprop). If not, see https://www.gnu.org/licenses/.
*/

//! Module containg methods for conducting
//! binary search (bisection) of grid nodes closest
//! to searched coordinates.

use crate::errors::SearchError;

/// Core bisection function, a binary search adapted to
/// searching values in-between the items of an ascending axis.
///
/// Returns the index of the first item not smaller than `x`.
fn binary_search<T: PartialOrd>(array: &[T], x: &T) -> Result<usize, SearchError> {
    let (first, last) = match (array.first(), array.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(SearchError::EmptyArray),
    };

    if x < first || x > last {
        return Err(SearchError::OutOfBounds);
    }

    let mut lo = 0;
    let mut hi = array.len() - 1;

    while lo < hi {
        let mid = (lo + hi) / 2;

        if array[mid] >= *x {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }

    Ok(lo)
}

/// Finds the index of the axis node closest to `x`
/// from the left (not greater than `x`).
pub fn find_left_closest<T: PartialOrd>(array: &[T], x: &T) -> Result<usize, SearchError> {
    let found_index = binary_search(array, x)?;

    if array[found_index] <= *x {
        Ok(found_index)
    } else {
        Ok(found_index - 1)
    }
}

/// Finds the left node of the axis cell containing `x`,
/// so that both `index` and `index + 1` are valid.
///
/// Points on the last node belong to the last cell.
pub fn find_cell<T: PartialOrd>(array: &[T], x: &T) -> Result<usize, SearchError> {
    if array.len() < 2 {
        return Err(SearchError::OutOfBounds);
    }

    let index = find_left_closest(array, x)?;

    Ok(index.min(array.len() - 2))
}

#[cfg(test)]
mod tests {
    use super::{find_cell, find_left_closest};
    use crate::errors::SearchError;

    #[test]
    fn left_closest() {
        let axis = [47.70, 47.72, 47.74, 47.76];

        assert_eq!(find_left_closest(&axis, &47.70).unwrap(), 0);
        assert_eq!(find_left_closest(&axis, &47.73).unwrap(), 1);
        assert_eq!(find_left_closest(&axis, &47.74).unwrap(), 2);
        assert_eq!(find_left_closest(&axis, &47.76).unwrap(), 3);
    }

    #[test]
    fn cells() {
        let axis = [0.0, 1.0, 2.0];

        assert_eq!(find_cell(&axis, &0.5).unwrap(), 0);
        assert_eq!(find_cell(&axis, &2.0).unwrap(), 1);
        assert!(matches!(find_cell(&axis, &2.5), Err(SearchError::OutOfBounds)));
        assert!(matches!(
            find_left_closest::<f64>(&[], &0.0),
            Err(SearchError::EmptyArray)
        ));
    }
}
