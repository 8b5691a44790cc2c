//! Which of loading / error / empty / rows the row area shows.

/// The state of the row area, in priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GridSurface {
    Loading,
    Error,
    Empty,
    Ready,
}

impl GridSurface {
    /// Loading wins over an error, an error over an empty data set.
    pub fn resolve(loading: bool, has_error: bool, row_count: usize) -> Self {
        if loading {
            Self::Loading
        } else if has_error {
            Self::Error
        } else if row_count == 0 {
            Self::Empty
        } else {
            Self::Ready
        }
    }

    #[inline]
    pub fn is_ready(self) -> bool {
        self == Self::Ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_order() {
        assert_eq!(GridSurface::resolve(true, true, 0), GridSurface::Loading);
        assert_eq!(GridSurface::resolve(true, false, 10), GridSurface::Loading);
        assert_eq!(GridSurface::resolve(false, true, 10), GridSurface::Error);
        assert_eq!(GridSurface::resolve(false, false, 0), GridSurface::Empty);
        assert_eq!(GridSurface::resolve(false, false, 3), GridSurface::Ready);
    }
}
