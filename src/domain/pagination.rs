//! Pagination domain logic centralization.
//!
//! Responsibility:
//! - one `PageQuery` per fetch (band + page index + page size)
//! - when a band counts as exhausted
//! - how many pages the per-query result cap allows

use serde::{Deserialize, Serialize};

use super::price_band::PriceBand;

/// Everything needed to issue one page request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageQuery {
    pub band: PriceBand,
    pub page_index: u32,
    pub page_size: u32,
}

impl PageQuery {
    pub const fn new(band: PriceBand, page_index: u32, page_size: u32) -> Self {
        Self {
            band,
            page_index,
            page_size,
        }
    }

    pub const fn next(&self) -> Self {
        Self {
            page_index: self.page_index + 1,
            ..*self
        }
    }
}

/// Which signal decides that a band has no further pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionSignal {
    /// A page with fewer than `page_size` records is the last one
    #[default]
    ShortPage,
    /// Stop once fetched pages cover the reported total (capped)
    ReportedTotal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationCalculator {
    page_size: u32,
    result_cap: u32,
}

impl PaginationCalculator {
    pub const fn new(page_size: u32, result_cap: u32) -> Self {
        Self {
            page_size,
            result_cap,
        }
    }

    /// Pages the API will serve for one query before truncating at the cap
    pub const fn max_servable_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        self.result_cap.div_ceil(self.page_size)
    }

    /// Pages required to cover `total` results, never more than the cap allows
    pub fn pages_for_total(&self, total: u64) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        let reachable = total.min(u64::from(self.result_cap));
        let pages = reachable.div_ceil(u64::from(self.page_size));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Whether the band is done after receiving page `page_index` with `received` records
    ///
    /// An empty page always ends the band, whichever signal is authoritative.
    pub fn is_exhausted(
        &self,
        signal: ExhaustionSignal,
        page_index: u32,
        received: usize,
        reported_total: Option<u64>,
    ) -> bool {
        if received == 0 {
            return true;
        }
        if self.is_last_servable_page(page_index) {
            return true;
        }
        match signal {
            ExhaustionSignal::ShortPage => received < self.page_size as usize,
            ExhaustionSignal::ReportedTotal => match reported_total {
                Some(total) => page_index + 1 >= self.pages_for_total(total),
                // Without a total fall back to the page length
                None => received < self.page_size as usize,
            },
        }
    }

    const fn is_last_servable_page(&self, page_index: u32) -> bool {
        page_index + 1 >= self.max_servable_pages()
    }

    /// A full page at the last servable index: the API may hold more results
    /// than it will ever return for this query
    pub fn hit_result_cap(&self, page_index: u32, received: usize) -> bool {
        received > 0
            && received >= self.page_size as usize
            && self.is_last_servable_page(page_index)
    }
}
