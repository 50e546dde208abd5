//! Product catalog documents and derived catalog data.
//!
//! A [`Product`] mirrors one document in the `products` collection. Field
//! names follow the stored camelCase shape, and every field defaults when
//! absent so partially written documents still load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::pricing::Discount;
use crate::types::{Price, ProductId};

/// Sizes offered when a product document lists none.
pub const DEFAULT_SIZES: [&str; 9] = [
    "40.5", "41", "42", "43", "43.5", "44", "44.5", "45", "46",
];

/// Number of reviews shown per page on the product page.
pub const REVIEWS_PER_PAGE: usize = 2;

/// A product document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    /// Document ID. Not part of the stored body.
    #[serde(skip)]
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub categories: Vec<String>,
    pub colors: Vec<String>,
    /// Image URLs keyed by color.
    pub image_urls: BTreeMap<String, Vec<String>>,
    pub default_image: String,
    /// Free-form discount such as `"10%"` or `"150"`.
    pub discount: String,
    pub features: Vec<String>,
    pub sizes: Vec<String>,
    pub description: String,
    pub rating: RatingHistogram,
    pub reviews: Vec<Review>,
}

impl Product {
    /// Attach the document ID after loading.
    #[must_use]
    pub fn with_id(mut self, id: ProductId) -> Self {
        self.id = id;
        self
    }

    /// The parsed discount.
    #[must_use]
    pub fn discount(&self) -> Discount {
        Discount::parse(&self.discount)
    }

    /// Unit price after the discount is applied.
    #[must_use]
    pub fn discounted_price(&self) -> Price {
        self.price - self.discount().per_unit(self.price)
    }

    /// Whether any category matches `category`, ignoring case and padding.
    #[must_use]
    pub fn in_category(&self, category: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.trim().eq_ignore_ascii_case(category))
    }

    /// Sizes to offer, falling back to [`DEFAULT_SIZES`].
    #[must_use]
    pub fn sizes_or_default(&self) -> Vec<String> {
        if self.sizes.iter().any(|s| !s.trim().is_empty()) {
            self.sizes.clone()
        } else {
            DEFAULT_SIZES.iter().map(|s| (*s).to_owned()).collect()
        }
    }

    /// Image URLs for a color, empty when the color has none.
    #[must_use]
    pub fn images_for(&self, color: &str) -> &[String] {
        self.image_urls.get(color).map_or(&[], Vec::as_slice)
    }

    /// The image used on listing cards: the default image, else the first
    /// color image.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        if !self.default_image.is_empty() {
            return Some(&self.default_image);
        }
        self.colors
            .iter()
            .find_map(|c| self.images_for(c).first())
            .or_else(|| self.image_urls.values().flatten().next())
            .map(String::as_str)
    }

    /// Remove an image URL wherever it appears. Returns whether anything
    /// was removed.
    pub fn remove_image(&mut self, url: &str) -> bool {
        let mut removed = false;
        if self.default_image == url {
            self.default_image.clear();
            removed = true;
        }
        for urls in self.image_urls.values_mut() {
            let before = urls.len();
            urls.retain(|u| u != url);
            removed |= urls.len() != before;
        }
        removed
    }

    /// A page of reviews (zero-based) and whether more pages follow.
    #[must_use]
    pub fn reviews_page(&self, page: usize) -> (&[Review], bool) {
        let start = page.saturating_mul(REVIEWS_PER_PAGE).min(self.reviews.len());
        let end = (start + REVIEWS_PER_PAGE).min(self.reviews.len());
        let slice = self.reviews.get(start..end).unwrap_or(&[]);
        (slice, end < self.reviews.len())
    }
}

/// A customer review embedded in a product document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Review {
    pub name: String,
    pub profile_image: String,
    pub time: String,
    pub rating: u8,
    pub comment: String,
}

/// Star label to number of ratings, e.g. `{"5": 2, "4": 1}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatingHistogram(BTreeMap<String, u64>);

/// Average rating and the number of people who rated.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatingSummary {
    pub average: f64,
    pub total: u64,
}

/// One bar of the rating histogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingBar {
    pub stars: String,
    pub count: u64,
    /// Share of all ratings, 0-100.
    pub percent: u64,
}

impl RatingHistogram {
    #[must_use]
    pub const fn new(counts: BTreeMap<String, u64>) -> Self {
        Self(counts)
    }

    /// Entries whose star label parses as a number.
    fn valid_entries(&self) -> impl Iterator<Item = (&str, f64, u64)> {
        self.0
            .iter()
            .filter_map(|(label, count)| {
                let stars: f64 = label.trim().parse().ok()?;
                stars.is_finite().then_some((label.as_str(), stars, *count))
            })
    }

    /// Weighted average over parseable entries; zero when nobody rated.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn summary(&self) -> RatingSummary {
        let (weighted, total) = self
            .valid_entries()
            .fold((0.0_f64, 0_u64), |(weighted, total), (_, stars, count)| {
                (weighted + stars * count as f64, total + count)
            });

        let average = if total == 0 {
            0.0
        } else {
            weighted / total as f64
        };
        RatingSummary { average, total }
    }

    /// Histogram bars, highest star first.
    #[must_use]
    pub fn bars(&self) -> Vec<RatingBar> {
        let total = self.summary().total;
        let mut bars: Vec<(f64, RatingBar)> = self
            .valid_entries()
            .map(|(label, stars, count)| {
                let percent = if total == 0 { 0 } else { count * 100 / total };
                (
                    stars,
                    RatingBar {
                        stars: label.to_owned(),
                        count,
                        percent,
                    },
                )
            })
            .collect();
        bars.sort_by(|a, b| b.0.total_cmp(&a.0));
        bars.into_iter().map(|(_, bar)| bar).collect()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for RatingHistogram {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Storefront listing pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    All,
    Woman,
    Man,
    Kids,
    Sports,
    Sale,
}

impl Section {
    pub const ALL: [Self; 6] = [
        Self::All,
        Self::Woman,
        Self::Man,
        Self::Kids,
        Self::Sports,
        Self::Sale,
    ];

    /// Category a product must carry to appear here; `None` shows everything.
    #[must_use]
    pub const fn category(&self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Woman => Some("woman"),
            Self::Man => Some("man"),
            Self::Kids => Some("kids"),
            Self::Sports => Some("sports"),
            Self::Sale => Some("sale"),
        }
    }

    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::All => "/",
            Self::Woman => "/woman",
            Self::Man => "/man",
            Self::Kids => "/kids",
            Self::Sports => "/sports",
            Self::Sale => "/sale",
        }
    }

    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::All => "All Shoes",
            Self::Woman => "Woman",
            Self::Man => "Man",
            Self::Kids => "Kids",
            Self::Sports => "Sports",
            Self::Sale => "Sale",
        }
    }

    #[must_use]
    pub fn includes(&self, product: &Product) -> bool {
        self.category().is_none_or(|c| product.in_category(c))
    }

    /// Products belonging to this section, in input order.
    #[must_use]
    pub fn filter<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.includes(p)).collect()
    }
}

/// Split a comma-separated form field into trimmed, non-empty items.
#[must_use]
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Deduplicate colors, keeping the first occurrence of each.
#[must_use]
pub fn unique_colors<I, S>(colors: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for color in colors {
        let color = color.as_ref().trim();
        if !color.is_empty() && !out.iter().any(|c| c == color) {
            out.push(color.to_owned());
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn histogram(entries: &[(&str, u64)]) -> RatingHistogram {
        entries.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_rating_average_weighted() {
        let summary = histogram(&[("5", 2), ("4", 1)]).summary();
        assert_eq!(summary.total, 3);
        assert!((summary.average - 14.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_rating_average_empty_is_zero() {
        let summary = RatingHistogram::default().summary();
        assert_eq!(summary.average, 0.0);
        assert_eq!(summary.total, 0);
    }

    #[test]
    fn test_rating_all_zero_counts_is_zero() {
        let summary = histogram(&[("5", 0), ("1", 0)]).summary();
        assert_eq!(summary.average, 0.0);
    }

    #[test]
    fn test_rating_skips_unparseable_labels() {
        let summary = histogram(&[("five", 10), ("3", 2)]).summary();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.average, 3.0);
    }

    #[test]
    fn test_rating_bars_sorted_with_percent() {
        let bars = histogram(&[("4", 1), ("5", 3)]).bars();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].stars, "5");
        assert_eq!(bars[0].percent, 75);
        assert_eq!(bars[1].percent, 25);
    }

    #[test]
    fn test_product_deserializes_with_missing_fields() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "name": "Runner",
            "price": 2499,
            "imageUrls": {"red": ["https://cdn/r1.jpg"]}
        }))
        .unwrap();
        assert_eq!(product.name, "Runner");
        assert_eq!(product.price, Price::from_rupees(2499));
        assert_eq!(product.primary_image(), Some("https://cdn/r1.jpg"));
        assert!(product.reviews.is_empty());
    }

    #[test]
    fn test_sizes_default_when_empty() {
        let product = Product::default();
        assert_eq!(product.sizes_or_default().len(), DEFAULT_SIZES.len());

        let sized = Product {
            sizes: vec!["7".into()],
            ..Product::default()
        };
        assert_eq!(sized.sizes_or_default(), vec!["7".to_string()]);
    }

    #[test]
    fn test_section_filtering() {
        let products = vec![
            Product {
                name: "A".into(),
                categories: vec!["Woman".into(), "sale".into()],
                ..Product::default()
            },
            Product {
                name: "B".into(),
                categories: vec!["man".into()],
                ..Product::default()
            },
        ];
        assert_eq!(Section::All.filter(&products).len(), 2);
        assert_eq!(Section::Woman.filter(&products)[0].name, "A");
        assert_eq!(Section::Sale.filter(&products).len(), 1);
        assert!(Section::Kids.filter(&products).is_empty());
    }

    #[test]
    fn test_reviews_paging() {
        let product = Product {
            reviews: (0..5)
                .map(|i| Review {
                    name: format!("r{i}"),
                    ..Review::default()
                })
                .collect(),
            ..Product::default()
        };
        let (first, more) = product.reviews_page(0);
        assert_eq!(first.len(), 2);
        assert!(more);
        let (last, more) = product.reviews_page(2);
        assert_eq!(last.len(), 1);
        assert!(!more);
        let (beyond, more) = product.reviews_page(9);
        assert!(beyond.is_empty());
        assert!(!more);
    }

    #[test]
    fn test_remove_image() {
        let mut product = Product {
            default_image: "d.jpg".into(),
            image_urls: BTreeMap::from([("red".into(), vec!["a.jpg".into(), "b.jpg".into()])]),
            ..Product::default()
        };
        assert!(product.remove_image("a.jpg"));
        assert_eq!(product.images_for("red"), ["b.jpg".to_string()]);
        assert!(product.remove_image("d.jpg"));
        assert!(product.default_image.is_empty());
        assert!(!product.remove_image("missing.jpg"));
    }

    #[test]
    fn test_split_list_and_unique_colors() {
        assert_eq!(split_list(" man, sports ,,"), vec!["man", "sports"]);
        assert_eq!(
            unique_colors(["red", "blue", "red", " ", "blue"]),
            vec!["red", "blue"]
        );
    }
}
