//! Translation from unified pages to provider-native pages.
//!
//! A unified page covers the absolute item range
//! `[(page - 1) * size, page * size)`. Each provider pages its corpus with its
//! own fixed size, so one unified page may start in the middle of a native
//! page and spill into the following ones.

use std::fmt;

/// Items per provider in one unified page.
pub const UNIFIED_PAGE_SIZE: usize = 25;

/// Which native page to fetch and which slice of it to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPlan {
    /// 1-based native page number.
    pub native_page: u64,
    pub first_index: usize,
    /// Exclusive.
    pub last_index: usize,
}

impl FetchPlan {
    /// Number of items this plan contributes.
    pub fn len(&self) -> usize {
        self.last_index - self.first_index
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for FetchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} [{}:{}]", self.native_page, self.first_index, self.last_index)
    }
}

/// Plan the native-page fetches needed to cover one unified page.
///
/// Plans come back ordered by native page, contiguous and non-overlapping.
/// Page 0 is treated as page 1; a zero size on either side yields no plans.
pub fn translate(unified_page: u32, unified_page_size: usize, native_page_size: usize) -> Vec<FetchPlan> {
    if unified_page_size == 0 || native_page_size == 0 {
        return Vec::new();
    }

    let size = unified_page_size as u64;
    let native = native_page_size as u64;

    let start = (u64::from(unified_page.max(1)) - 1) * size;
    let end = start + size;

    let first_page = 1 + start / native;
    let page_origin = (first_page - 1) * native;

    let mut plans = vec![FetchPlan {
        native_page: first_page,
        first_index: (start - page_origin) as usize,
        last_index: native.min(end - page_origin) as usize,
    }];

    let mut covered = page_origin + native;
    let mut page = first_page;
    while covered < end {
        page += 1;
        plans.push(FetchPlan { native_page: page, first_index: 0, last_index: native.min(end - covered) as usize });
        covered += native;
    }

    plans
}
