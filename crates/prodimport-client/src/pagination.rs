//! Offset/limit pagination for admin list endpoints.
//!
//! Admin list responses carry `count` (total matches), `offset` and `limit`.
//! A listing is exhausted when the next offset reaches `count`, or when the
//! backend omits `count` and returns a short or empty page.

/// Computes the offset of the next page, or `None` when the listing is done.
///
/// `offset` and `limit` are the values sent with the current request,
/// `page_len` the number of items it returned, and `total` the `count`
/// reported by the backend, if any.
#[must_use]
pub fn next_offset(offset: u32, limit: u32, page_len: usize, total: Option<u64>) -> Option<u32> {
    if page_len == 0 {
        return None;
    }

    let page_len = u32::try_from(page_len).unwrap_or(u32::MAX);
    let next = offset.checked_add(page_len)?;

    match total {
        Some(total) if u64::from(next) >= total => None,
        Some(_) => Some(next),
        None if page_len < limit => None,
        None => Some(next),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_ends_listing() {
        assert_eq!(next_offset(0, 100, 0, Some(10)), None);
        assert_eq!(next_offset(200, 100, 0, None), None);
    }

    #[test]
    fn stops_when_count_is_reached() {
        assert_eq!(next_offset(0, 100, 100, Some(100)), None);
        assert_eq!(next_offset(100, 100, 50, Some(150)), None);
    }

    #[test]
    fn continues_while_count_not_reached() {
        assert_eq!(next_offset(0, 100, 100, Some(250)), Some(100));
        assert_eq!(next_offset(100, 100, 100, Some(250)), Some(200));
    }

    #[test]
    fn advances_by_items_returned_not_by_limit() {
        // Backend capped the page below the requested limit.
        assert_eq!(next_offset(0, 1000, 100, Some(250)), Some(100));
    }

    #[test]
    fn without_count_short_page_ends_listing() {
        assert_eq!(next_offset(0, 100, 40, None), None);
        assert_eq!(next_offset(0, 100, 100, None), Some(100));
    }

    #[test]
    fn offset_overflow_ends_listing() {
        assert_eq!(next_offset(u32::MAX - 1, 100, 10, None), None);
    }
}
