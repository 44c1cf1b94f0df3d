use crate::BookId;

/// Stored page counts at or above this are treated as corrupt data and
/// excluded from derived views instead of crashing anything.
pub const PLAUSIBLE_MAX_PAGES: u32 = 1_000_000;

/// Upper bound for the pages input widget when the total is unknown.
pub const FALLBACK_PAGES_INPUT_MAX: u32 = 10_000;

/// Persisted pages-read count for one book. Written only on an explicit
/// save action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressRecord {
    pub pages_read: u32,
}

impl ProgressRecord {
    pub fn is_plausible(self) -> bool {
        self.pages_read < PLAUSIBLE_MAX_PAGES
    }
}

/// Percent read, rounded. The min guard matters: a stored pages value can
/// exceed a smaller total written by a later search.
pub fn progress_percent(pages_read: u32, total_pages: u32) -> u8 {
    if total_pages == 0 {
        return 0;
    }
    let percent = (f64::from(pages_read) * 100.0 / f64::from(total_pages)).round() as u32;
    percent.min(100) as u8
}

/// Write-time clamp for a raw pages value. Negative input collapses to 0;
/// a known total caps the value; an unknown total passes it through.
pub fn clamp_pages(requested: i64, total_pages: u32) -> u32 {
    if requested < 0 {
        return 0;
    }
    if total_pages > 0 && requested > i64::from(total_pages) {
        return total_pages;
    }
    requested.min(i64::from(u32::MAX)) as u32
}

/// One row of the derived "currently reading" list. Recomputed on demand,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingNowEntry {
    pub id: BookId,
    pub title: String,
    pub thumbnail: String,
    pub pages_read: u32,
    pub total_pages: u32,
    pub percent: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_stays_in_bounds() {
        for total in [1_u32, 7, 300, 1234] {
            for pages in 0..=total {
                let percent = progress_percent(pages, total);
                assert!(percent <= 100, "pages={pages} total={total}");
            }
            assert_eq!(progress_percent(0, total), 0);
            assert_eq!(progress_percent(total, total), 100);
        }
    }

    #[test]
    fn percent_rounds_to_nearest() {
        assert_eq!(progress_percent(150, 300), 50);
        assert_eq!(progress_percent(1, 300), 0);
        assert_eq!(progress_percent(2, 300), 1);
        assert_eq!(progress_percent(299, 300), 100);
    }

    #[test]
    fn percent_is_zero_when_total_unknown() {
        assert_eq!(progress_percent(400, 0), 0);
    }

    #[test]
    fn percent_caps_when_stored_pages_exceed_total() {
        assert_eq!(progress_percent(500, 300), 100);
    }

    #[test]
    fn clamp_collapses_negative_input() {
        assert_eq!(clamp_pages(-5, 200), 0);
        assert_eq!(clamp_pages(-1, 0), 0);
    }

    #[test]
    fn clamp_caps_at_known_total() {
        assert_eq!(clamp_pages(500, 300), 300);
        assert_eq!(clamp_pages(300, 300), 300);
        assert_eq!(clamp_pages(150, 300), 150);
    }

    #[test]
    fn clamp_passes_through_when_total_unknown() {
        assert_eq!(clamp_pages(9_999, 0), 9_999);
    }

    #[test]
    fn plausibility_cutoff() {
        assert!(ProgressRecord { pages_read: 999_999 }.is_plausible());
        assert!(!ProgressRecord {
            pages_read: 1_000_000
        }
        .is_plausible());
    }
}
