use async_trait::async_trait;

use crate::models::{
    attraction_page::AttractionPage,
    destination::Destination,
    discount::Discount,
    order::Order,
    stop_sale::StopSale,
    tour::{DestinationRef, Tour},
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, Default)]
pub struct TourQuery {
    /// Case-insensitive match on the title or destination name.
    pub search: Option<String>,
    pub destination_id: Option<String>,
    pub published_only: bool,
    pub limit: Option<u32>,
}

impl TourQuery {
    pub fn matches(&self, tour: &Tour) -> bool {
        if self.published_only && !tour.is_published {
            return false;
        }
        if let Some(destination_id) = &self.destination_id {
            if tour.destination.as_ref().map(|d| &d.id) != Some(destination_id) {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(search) if !search.is_empty() => {
                let needle = search.to_lowercase();
                tour.title.to_lowercase().contains(&needle)
                    || tour
                        .destination
                        .as_ref()
                        .is_some_and(|d| d.name.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }
}

/// Persistence for everything the booking service owns. Every lookup is scoped by tenant.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    async fn list_tours(&self, tenant: &str, query: &TourQuery) -> Result<Vec<Tour>, StoreError>;
    async fn get_tour(&self, tenant: &str, id: &str) -> Result<Option<Tour>, StoreError>;
    async fn insert_tour(&self, tour: &Tour) -> Result<(), StoreError>;
    async fn replace_tour(&self, tour: &Tour) -> Result<bool, StoreError>;
    async fn delete_tour(&self, tenant: &str, id: &str) -> Result<bool, StoreError>;
    async fn set_tour_destination(
        &self,
        tenant: &str,
        tour_id: &str,
        destination: Option<&DestinationRef>,
    ) -> Result<bool, StoreError>;

    async fn list_destinations(&self, tenant: &str) -> Result<Vec<Destination>, StoreError>;
    async fn get_destination(&self, tenant: &str, id: &str)
        -> Result<Option<Destination>, StoreError>;
    async fn find_destination_by_slug(
        &self,
        tenant: &str,
        slug: &str,
    ) -> Result<Option<Destination>, StoreError>;
    async fn insert_destination(&self, destination: &Destination) -> Result<(), StoreError>;
    async fn replace_destination(&self, destination: &Destination) -> Result<bool, StoreError>;
    async fn delete_destination(&self, tenant: &str, id: &str) -> Result<bool, StoreError>;

    async fn list_attraction_pages(
        &self,
        tenant: &str,
        published_only: bool,
    ) -> Result<Vec<AttractionPage>, StoreError>;
    async fn get_attraction_page(
        &self,
        tenant: &str,
        id: &str,
    ) -> Result<Option<AttractionPage>, StoreError>;
    async fn find_attraction_page_by_slug(
        &self,
        tenant: &str,
        slug: &str,
    ) -> Result<Option<AttractionPage>, StoreError>;
    async fn insert_attraction_page(&self, page: &AttractionPage) -> Result<(), StoreError>;
    async fn replace_attraction_page(&self, page: &AttractionPage) -> Result<bool, StoreError>;
    async fn delete_attraction_page(&self, tenant: &str, id: &str) -> Result<bool, StoreError>;

    async fn list_stop_sales(
        &self,
        tenant: &str,
        tour_id: Option<&str>,
    ) -> Result<Vec<StopSale>, StoreError>;
    async fn insert_stop_sale(&self, stop_sale: &StopSale) -> Result<(), StoreError>;
    async fn delete_stop_sale(&self, tenant: &str, id: &str) -> Result<bool, StoreError>;

    async fn list_discounts(&self, tenant: &str) -> Result<Vec<Discount>, StoreError>;
    async fn find_discount_by_code(
        &self,
        tenant: &str,
        code: &str,
    ) -> Result<Option<Discount>, StoreError>;
    async fn insert_discount(&self, discount: &Discount) -> Result<(), StoreError>;
    /// Counts one use in a single step. `false` when `maxUses` is already reached.
    async fn record_discount_use(&self, tenant: &str, id: &str) -> Result<bool, StoreError>;
    async fn release_discount_use(&self, tenant: &str, id: &str) -> Result<(), StoreError>;

    async fn insert_order(&self, order: &Order) -> Result<(), StoreError>;
    async fn get_order(&self, tenant: &str, id: &str) -> Result<Option<Order>, StoreError>;
}
