/// Rows returned by every list and report page.
pub const PAGE_SIZE: u32 = 10;

/// Resolved `LIMIT`/`OFFSET` window for a 1-indexed page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Effective page number after clamping.
    pub number: i64,
    pub limit: i64,
    pub offset: i64,
}

impl PageWindow {
    /// Resolves a caller-supplied page number.
    ///
    /// Page numbers below 1 are treated as page 1. Very large page numbers
    /// saturate instead of overflowing; they simply select no rows.
    pub fn for_page(page_number: i64) -> Self {
        let number = page_number.max(1);
        let limit = i64::from(PAGE_SIZE);
        Self {
            number,
            limit,
            offset: (number - 1).saturating_mul(limit),
        }
    }
}
