//! Product listing and product detail pages.

use std::fmt;

use popacart_core::{Product, ProductId, ProductPage, ProductQuery, ProductSummary};
use rust_decimal::Decimal;
use tracing::instrument;

use super::format::{money, page_label};
use super::{LoadState, Navigation};
use crate::api::ApiClient;
use crate::error::{AppError, add_breadcrumb};

/// Product card display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub brand: Option<String>,
    pub price: String,
    pub image_url: Option<String>,
}

impl ProductCard {
    /// Card for a product whose details are unknown.
    #[must_use]
    pub fn placeholder(id: &ProductId) -> Self {
        Self {
            id: id.clone(),
            name: id.to_string(),
            brand: None,
            price: String::new(),
            image_url: None,
        }
    }
}

impl From<&ProductSummary> for ProductCard {
    fn from(summary: &ProductSummary) -> Self {
        Self {
            id: summary.id.clone(),
            name: summary.name.clone(),
            brand: summary.brand.clone(),
            price: money(summary.price),
            image_url: summary.image_url.clone(),
        }
    }
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self::from(&product.summary())
    }
}

impl fmt::Display for ProductCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(brand) = &self.brand {
            write!(f, "{brand} ")?;
        }
        write!(f, "{}", self.name)?;
        if !self.price.is_empty() {
            write!(f, "  {}", self.price)?;
        }
        write!(f, "  [{}]", self.id)
    }
}

// =============================================================================
// Product List
// =============================================================================

/// What the product list shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductListView {
    Loading,
    Error {
        message: String,
    },
    Empty,
    Items {
        cards: Vec<ProductCard>,
        page_label: String,
        has_previous: bool,
        has_next: bool,
    },
}

impl fmt::Display for ProductListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => writeln!(f, "Loading products..."),
            Self::Error { message } => writeln!(f, "{message}"),
            Self::Empty => writeln!(f, "No products found"),
            Self::Items {
                cards, page_label, ..
            } => {
                for card in cards {
                    writeln!(f, "{card}")?;
                }
                writeln!(f, "{page_label}")
            }
        }
    }
}

/// Paged catalog listing with search and filters.
pub struct ProductListPage {
    client: ApiClient,
    query: ProductQuery,
    page: Option<ProductPage>,
    status: LoadState,
}

impl ProductListPage {
    #[must_use]
    pub fn new(client: ApiClient, query: ProductQuery) -> Self {
        Self {
            client,
            query,
            page: None,
            status: LoadState::Loading,
        }
    }

    #[must_use]
    pub const fn query(&self) -> &ProductQuery {
        &self.query
    }

    #[instrument(skip(self), fields(page = self.query.page))]
    pub async fn mount(&mut self) -> Navigation {
        self.status = LoadState::Loading;
        match self.client.list_products(&self.query).await {
            Ok(page) => {
                self.page = Some(page);
                self.status = LoadState::Ready;
            }
            Err(err) => {
                let err = AppError::from(err);
                err.report();
                self.status = LoadState::Failed(err.user_message());
            }
        }
        Navigation::Stay
    }

    /// Search from the first page.
    pub async fn search(&mut self, term: &str) -> Navigation {
        add_breadcrumb("catalog", "Searched products", Some(&[("term", term)]));
        self.query = self.query.with_search(term);
        self.mount().await
    }

    /// Filter by category from the first page.
    pub async fn filter_category(&mut self, category: Option<String>) -> Navigation {
        self.query.category = category;
        self.query.page = 1;
        self.mount().await
    }

    /// Filter by product type from the first page.
    pub async fn filter_kind(&mut self, kind: Option<String>) -> Navigation {
        self.query.kind = kind;
        self.query.page = 1;
        self.mount().await
    }

    /// Filter by price range from the first page. A reversed range is
    /// swapped.
    pub async fn filter_price(
        &mut self,
        min: Option<Decimal>,
        max: Option<Decimal>,
    ) -> Navigation {
        let (min, max) = match (min, max) {
            (Some(low), Some(high)) if low > high => (Some(high), Some(low)),
            range => range,
        };
        self.query.min_price = min;
        self.query.max_price = max;
        self.query.page = 1;
        self.mount().await
    }

    pub async fn next(&mut self) -> Navigation {
        match self.page.as_ref() {
            Some(page) if page.has_next() => {
                self.query.page = page.page + 1;
                self.mount().await
            }
            _ => Navigation::Stay,
        }
    }

    pub async fn previous(&mut self) -> Navigation {
        match self.page.as_ref() {
            Some(page) if page.has_previous() => {
                self.query.page = page.page - 1;
                self.mount().await
            }
            _ => Navigation::Stay,
        }
    }

    /// Open the product at `index` on the current page.
    #[must_use]
    pub fn open(&self, index: usize) -> Navigation {
        self.page
            .as_ref()
            .and_then(|page| page.products.get(index))
            .map_or(Navigation::Stay, |product| {
                Navigation::ProductDetail(product.id.clone())
            })
    }

    #[must_use]
    pub fn render(&self) -> ProductListView {
        match (&self.status, &self.page) {
            (LoadState::Failed(message), _) => ProductListView::Error {
                message: message.clone(),
            },
            (LoadState::Ready, Some(page)) if page.products.is_empty() => ProductListView::Empty,
            (LoadState::Ready, Some(page)) => ProductListView::Items {
                cards: page.products.iter().map(ProductCard::from).collect(),
                page_label: page_label(page.page, page.total_pages),
                has_previous: page.has_previous(),
                has_next: page.has_next(),
            },
            _ => ProductListView::Loading,
        }
    }
}

// =============================================================================
// Product Detail
// =============================================================================

/// Product detail display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDetailView {
    pub id: ProductId,
    pub name: String,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub price: String,
    /// List price, shown struck through when a discount applies.
    pub original_price: Option<String>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub image_url: Option<String>,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        let price = product.display_price();
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            description: product.description.clone(),
            price: money(price),
            original_price: (price < product.price).then(|| money(product.price)),
            colors: product.colors.iter().map(|color| color.name.clone()).collect(),
            sizes: product.sizes.clone(),
            image_url: product.primary_image().map(str::to_owned),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductDetailState {
    Loading,
    NotFound,
    Error { message: String },
    Ready(Box<ProductDetailView>),
}

impl fmt::Display for ProductDetailState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => writeln!(f, "Loading..."),
            Self::NotFound => writeln!(f, "Product not found."),
            Self::Error { message } => writeln!(f, "{message}"),
            Self::Ready(detail) => {
                if let Some(brand) = &detail.brand {
                    writeln!(f, "{brand}")?;
                }
                writeln!(f, "{}", detail.name)?;
                match &detail.original_price {
                    Some(original) => writeln!(f, "{} (was {original})", detail.price)?,
                    None => writeln!(f, "{}", detail.price)?,
                }
                if !detail.colors.is_empty() {
                    writeln!(f, "Colors: {}", detail.colors.join(", "))?;
                }
                if !detail.sizes.is_empty() {
                    writeln!(f, "Sizes: {}", detail.sizes.join(", "))?;
                }
                if let Some(description) = &detail.description {
                    writeln!(f, "\n{description}")?;
                }
                Ok(())
            }
        }
    }
}

/// A single product.
pub struct ProductDetailPage {
    client: ApiClient,
    id: ProductId,
    product: Option<Product>,
    state: ProductDetailState,
}

impl ProductDetailPage {
    #[must_use]
    pub const fn new(client: ApiClient, id: ProductId) -> Self {
        Self {
            client,
            id,
            product: None,
            state: ProductDetailState::Loading,
        }
    }

    #[instrument(skip(self), fields(product_id = %self.id))]
    pub async fn mount(&mut self) -> Navigation {
        add_breadcrumb(
            "navigation",
            "Viewed product page",
            Some(&[("product_id", self.id.as_str())]),
        );
        self.state = ProductDetailState::Loading;
        match self.client.get_product(&self.id).await {
            Ok(Some(product)) => {
                self.state = ProductDetailState::Ready(Box::new(ProductDetailView::from(&product)));
                self.product = Some(product);
            }
            Ok(None) => self.state = ProductDetailState::NotFound,
            Err(err) => {
                let err = AppError::from(err);
                err.report();
                self.state = ProductDetailState::Error {
                    message: err.user_message(),
                };
            }
        }
        Navigation::Stay
    }

    /// The loaded product, once available.
    #[must_use]
    pub const fn product(&self) -> Option<&Product> {
        self.product.as_ref()
    }

    #[must_use]
    pub fn render(&self) -> ProductDetailState {
        self.state.clone()
    }
}
