//! URL handling for the listing site
//!
//! The site paginates its search results in two shapes: the first page has a
//! canonical search URL, every later page is addressed by a `firstRow` offset
//! of 20 listings per page.

use url::Url;

/// Number of listings the site shows per result page
pub const LISTINGS_PER_PAGE: u32 = 20;

/// Builds the listing-page URL for a 1-based page number
///
/// Page 0 is treated as the first page.
///
/// # Examples
///
/// ```
/// use listing_ripple::site::listing_page_url;
///
/// let first = listing_page_url("https://store.example.com/", 8, 1);
/// assert_eq!(
///     first,
///     "https://store.example.com/house-rentSale.html?storeType=1&regionid=8&search=1"
/// );
///
/// let third = listing_page_url("https://store.example.com/", 8, 3);
/// assert!(third.contains("firstRow=40"));
/// ```
pub fn listing_page_url(root_url: &str, region_id: u32, page: u32) -> String {
    if page <= 1 {
        format!(
            "{}house-rentSale.html?storeType=1&regionid={}&search=1",
            root_url, region_id
        )
    } else {
        format!(
            "{}index.php?firstRow={}&storeType=1&regionid={}&search=1&module=house&action=rentSale",
            root_url,
            first_row(page),
            region_id
        )
    }
}

/// Offset of the first listing shown on `page`
pub fn first_row(page: u32) -> u32 {
    LISTINGS_PER_PAGE * page.saturating_sub(1)
}

/// Resolves a detail-page href found on a listing page against the site root
///
/// Returns None for empty hrefs, fragment-only links, non-navigational
/// schemes, and anything that does not resolve to an HTTP(S) URL.
pub fn resolve_detail_url(root_url: &Url, href: &str) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:") || href.starts_with("mailto:") {
        return None;
    }

    match root_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}
