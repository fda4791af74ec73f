use std::collections::BTreeSet;
use std::num::IntErrorKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageRangeError {
    #[error("Invalid page range token {token:?} (expected a page number, \"end\", or START-END)")]
    InvalidToken { token: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRef {
    Number(u64),
    End,
}

impl PageRef {
    fn value(self, max_pages: u64) -> u64 {
        match self {
            PageRef::Number(n) => n,
            PageRef::End => max_pages,
        }
    }
}

/// One comma-separated token of a page range expression, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRange {
    Single(PageRef),
    Span(PageRef, PageRef),
}

impl PageRange {
    /// Parse a token like "5", "1-5", "3-end"
    pub fn parse(token: &str) -> Result<Self, PageRangeError> {
        let token = token.trim();
        let invalid = || PageRangeError::InvalidToken {
            token: token.to_string(),
        };

        match token.split_once('-') {
            Some((start, end)) => {
                let start = parse_page_ref(start).ok_or_else(invalid)?;
                let end = parse_page_ref(end).ok_or_else(invalid)?;
                Ok(PageRange::Span(start, end))
            }
            None => parse_page_ref(token)
                .map(PageRange::Single)
                .ok_or_else(invalid),
        }
    }

    /// Zero-based indices this token selects in a document of `max_pages` pages.
    ///
    /// Spans are clamped to `[1, max_pages]`; a span that is empty after clamping
    /// (including a reversed one) selects nothing. Single pages out of bounds are dropped.
    pub fn indices(&self, max_pages: usize) -> std::ops::Range<usize> {
        let max = max_pages as u64;
        let (start, end) = match *self {
            PageRange::Single(page) => {
                let n = page.value(max);
                if n == 0 || n > max {
                    return 0..0;
                }
                (n, n)
            }
            PageRange::Span(start, end) => (start.value(max).max(1), end.value(max).min(max)),
        };

        if start > end {
            return 0..0;
        }
        // both ends are within 1..=max_pages here, so the casts are lossless
        (start as usize - 1)..(end as usize)
    }
}

fn parse_page_ref(s: &str) -> Option<PageRef> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("end") {
        return Some(PageRef::End);
    }
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match s.parse::<u64>() {
        Ok(n) => Some(PageRef::Number(n)),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(PageRef::Number(u64::MAX)),
        Err(_) => None,
    }
}

/// Parse a comma-separated list of page ranges like "1-3,5,9-end". Empty tokens are ignored.
pub fn parse_page_ranges(spec: &str) -> Result<Vec<PageRange>, PageRangeError> {
    spec.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(PageRange::parse)
        .collect()
}

/// Resolve a page range expression against a document with `max_pages` pages.
///
/// Returns zero-based page indices, deduplicated and sorted ascending. An empty
/// expression selects every page. A malformed token fails the whole expression.
pub fn resolve(spec: &str, max_pages: usize) -> Result<Vec<usize>, PageRangeError> {
    if spec.trim().is_empty() {
        return Ok((0..max_pages).collect());
    }

    let mut pages = BTreeSet::new();
    for range in parse_page_ranges(spec)? {
        pages.extend(range.indices(max_pages));
    }
    Ok(pages.into_iter().collect())
}

/// Like [`resolve`], for an optional expression as it arrives from the CLI or a tool request.
pub fn resolve_opt(spec: Option<&str>, max_pages: usize) -> Result<Vec<usize>, PageRangeError> {
    resolve(spec.unwrap_or_default(), max_pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_selects_all() {
        assert_eq!(resolve("", 4).unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(resolve("   ", 2).unwrap(), vec![0, 1]);
        assert_eq!(resolve_opt(None, 3).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_ranges_and_singles() {
        assert_eq!(resolve("1-3,5", 10).unwrap(), vec![0, 1, 2, 4]);
    }

    #[test]
    fn test_reversed_range_is_empty() {
        assert_eq!(resolve("5-3", 10).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn test_duplicates_removed() {
        assert_eq!(resolve("1,1,2", 10).unwrap(), vec![0, 1]);
        assert_eq!(resolve("3-5,4-6", 10).unwrap(), vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_output_sorted() {
        assert_eq!(resolve("9,2-3,1", 10).unwrap(), vec![0, 1, 2, 8]);
    }

    #[test]
    fn test_out_of_range_single_dropped() {
        assert_eq!(resolve("100", 10).unwrap(), Vec::<usize>::new());
        assert_eq!(resolve("0", 10).unwrap(), Vec::<usize>::new());
        assert_eq!(resolve("2,100", 10).unwrap(), vec![1]);
    }

    #[test]
    fn test_range_clamped() {
        assert_eq!(resolve("1-100", 10).unwrap(), (0..10).collect::<Vec<_>>());
        assert_eq!(resolve("0-2", 10).unwrap(), vec![0, 1]);
        assert_eq!(resolve("15-20", 10).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn test_whitespace_and_empty_tokens() {
        assert_eq!(resolve(" 1 - 2 , 4 ", 10).unwrap(), vec![0, 1, 3]);
        assert_eq!(resolve("1,,3,", 10).unwrap(), vec![0, 2]);
    }

    #[test]
    fn test_end_keyword() {
        assert_eq!(resolve("8-end", 10).unwrap(), vec![7, 8, 9]);
        assert_eq!(resolve("END", 10).unwrap(), vec![9]);
    }

    #[test]
    fn test_huge_numbers_saturate() {
        assert_eq!(resolve("99999999999999999999999", 10).unwrap(), Vec::<usize>::new());
        assert_eq!(resolve("9-99999999999999999999999", 10).unwrap(), vec![8, 9]);
    }

    #[test]
    fn test_zero_pages() {
        assert_eq!(resolve("", 0).unwrap(), Vec::<usize>::new());
        assert_eq!(resolve("1-5", 0).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn test_invalid_tokens_fail_whole_spec() {
        for spec in ["abc", "x-y", "1,abc", "-3", "3-", "1-2-3", "+4", "2.5"] {
            let err = resolve(spec, 10).unwrap_err();
            assert!(matches!(err, PageRangeError::InvalidToken { .. }), "{spec}");
        }
    }

    #[test]
    fn test_error_names_token() {
        let err = resolve("1, x-y ,3", 10).unwrap_err();
        assert_eq!(
            err,
            PageRangeError::InvalidToken {
                token: "x-y".to_string()
            }
        );
        assert!(err.to_string().contains("\"x-y\""));
    }

    proptest! {
        #[test]
        fn prop_in_bounds_and_strictly_ascending(
            tokens in proptest::collection::vec((0u64..40, proptest::option::of(0u64..40)), 0..8),
            max_pages in 0usize..30,
        ) {
            let spec = tokens
                .iter()
                .map(|(start, end)| match end {
                    Some(end) => format!("{start}-{end}"),
                    None => start.to_string(),
                })
                .collect::<Vec<_>>()
                .join(",");

            let pages = resolve(&spec, max_pages).unwrap();
            prop_assert!(pages.iter().all(|&p| p < max_pages));
            prop_assert!(pages.windows(2).all(|w| w[0] < w[1]));
            prop_assert_eq!(&pages, &resolve(&spec, max_pages).unwrap());
        }

        #[test]
        fn prop_empty_spec_is_every_page(max_pages in 0usize..500) {
            prop_assert_eq!(resolve("", max_pages).unwrap(), (0..max_pages).collect::<Vec<_>>());
        }
    }
}
