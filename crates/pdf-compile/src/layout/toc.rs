//! Table of contents capacity model

use super::Geometry;
use crate::constants::{TOC_HEADER_HEIGHT_MM, TOC_ITEM_HEIGHT_MM};
use crate::types::{CompileError, Result};
use std::ops::Range;

/// How many TOC rows fit on each TOC page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TocCapacity {
    /// Rows on the first page, below the title block
    pub first_page: usize,
    /// Rows on every following page
    pub later_pages: usize,
}

impl TocCapacity {
    pub fn for_geometry(geometry: &Geometry) -> Result<Self> {
        let available = geometry.drawable_height_mm;
        let first_page = ((available - TOC_HEADER_HEIGHT_MM) / TOC_ITEM_HEIGHT_MM)
            .floor()
            .max(0.0) as usize;
        let later_pages = (available / TOC_ITEM_HEIGHT_MM).floor().max(0.0) as usize;
        if later_pages == 0 {
            return Err(CompileError::config(
                "includeTOC",
                "page is too short to hold a single table of contents row",
            ));
        }
        Ok(Self {
            first_page,
            later_pages,
        })
    }

    /// Number of TOC pages needed for `entries` rows (always at least one)
    pub fn page_count(&self, entries: usize) -> usize {
        let overflow = entries.saturating_sub(self.first_page);
        1 + overflow.div_ceil(self.later_pages)
    }

    /// Entry index ranges drawn on each TOC page, in page order
    pub fn page_ranges(&self, entries: usize) -> Vec<Range<usize>> {
        let mut ranges = Vec::with_capacity(self.page_count(entries));
        let mut start = 0;
        for page in 0..self.page_count(entries) {
            let capacity = if page == 0 {
                self.first_page
            } else {
                self.later_pages
            };
            let end = (start + capacity).min(entries);
            ranges.push(start..end);
            start = end;
        }
        ranges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_boundaries() {
        let capacity = TocCapacity {
            first_page: 16,
            later_pages: 19,
        };
        assert_eq!(capacity.page_count(0), 1);
        assert_eq!(capacity.page_count(16), 1);
        assert_eq!(capacity.page_count(17), 2);
        assert_eq!(capacity.page_count(35), 2);
        assert_eq!(capacity.page_count(36), 3);
    }

    #[test]
    fn test_page_ranges_cover_every_entry_once() {
        let capacity = TocCapacity {
            first_page: 2,
            later_pages: 3,
        };
        let ranges = capacity.page_ranges(7);
        assert_eq!(ranges, vec![0..2, 2..5, 5..7]);
    }
}
