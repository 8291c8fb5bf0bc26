use std::fmt;

use serde::{Deserialize, Serialize};

/// Envelope of the search endpoint response: `{"data": {...}}`.
#[derive(Deserialize, Debug, Clone)]
pub struct SearchEnvelope {
    pub data: SearchPage,
}

/// One page of search results as returned by the endpoint.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct SearchPage {
    #[serde(default)]
    pub products: Vec<RawProduct>,
    #[serde(default)]
    pub total: u64,
}

impl SearchPage {
    /// The upstream API sometimes answers with a single stray item instead of
    /// a real page; only pages with more than one product are trusted.
    pub fn is_valid(&self) -> bool {
        self.products.len() > 1
    }

    /// 1-based position and record of `item_id` on this page.
    pub fn find_item(&self, item_id: u64) -> Option<(u32, &RawProduct)> {
        let idx = self.products.iter().position(|product| product.id == item_id)?;
        let position = u32::try_from(idx + 1).ok()?;
        Some((position, &self.products[idx]))
    }
}

/// Product record as it appears in the search payload. Extra fields are ignored.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawProduct {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub supplier: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub brand: String,
    pub supplier: String,
}

impl From<&RawProduct> for Product {
    fn from(raw: &RawProduct) -> Self {
        Product {
            id: raw.id,
            name: raw.name.clone(),
            brand: raw.brand.clone(),
            supplier: raw.supplier.clone(),
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Item id: {}", self.id)?;
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Brand: {}", self.brand)?;
        write!(f, "Supplier: {}", self.supplier)
    }
}

/// Where a product sits in the results of a query.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProductRankResult {
    pub product: Product,
    pub query: String,
    /// 1-based page number.
    pub page: u32,
    /// 1-based index within the page.
    pub position: u32,
}

impl ProductRankResult {
    pub fn new(product: Product, query: String, page: u32, position: u32) -> ProductRankResult {
        ProductRankResult {
            product,
            query,
            page,
            position,
        }
    }

    /// Rank across all pages, assuming every earlier page was full.
    pub fn absolute_position(&self, page_item_count: u32) -> u64 {
        u64::from(self.page - 1) * u64::from(page_item_count) + u64::from(self.position)
    }
}

impl fmt::Display for ProductRankResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.product)?;
        writeln!(f, "Search query: {}", self.query)?;
        write!(f, "Placement: page {}, position {}", self.page, self.position)
    }
}
