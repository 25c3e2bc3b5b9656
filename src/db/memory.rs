use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::db::store::{Store, StoreError, TourQuery};
use crate::models::{
    attraction_page::AttractionPage,
    destination::Destination,
    discount::{normalize_code, Discount},
    order::Order,
    stop_sale::StopSale,
    tour::{DestinationRef, Tour},
};

/// Process-local store keyed by document id. Used for local runs without
/// `MONGODB_URI` and by the HTTP tests.
#[derive(Default)]
pub struct MemoryStore {
    tours: RwLock<HashMap<String, Tour>>,
    destinations: RwLock<HashMap<String, Destination>>,
    attraction_pages: RwLock<HashMap<String, AttractionPage>>,
    stop_sales: RwLock<HashMap<String, StopSale>>,
    discounts: RwLock<HashMap<String, Discount>>,
    orders: RwLock<HashMap<String, Order>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

trait Tenanted {
    fn tenant(&self) -> &str;
}

macro_rules! tenanted {
    ($($ty:ty),*) => {
        $(impl Tenanted for $ty {
            fn tenant(&self) -> &str {
                &self.tenant_id
            }
        })*
    };
}

tenanted!(Tour, Destination, AttractionPage, StopSale, Discount, Order);

async fn insert<T: Clone>(
    map: &RwLock<HashMap<String, T>>,
    id: &str,
    value: &T,
) -> Result<(), StoreError> {
    let mut guard = map.write().await;
    if guard.contains_key(id) {
        return Err(StoreError::Duplicate(id.to_string()));
    }
    guard.insert(id.to_string(), value.clone());
    Ok(())
}

/// Same as `insert`, plus a per-tenant unique key (slug or code).
async fn insert_keyed<T, K>(
    map: &RwLock<HashMap<String, T>>,
    id: &str,
    value: &T,
    key: K,
) -> Result<(), StoreError>
where
    T: Clone + Tenanted,
    K: Fn(&T) -> &str,
{
    let mut guard = map.write().await;
    if guard.contains_key(id) {
        return Err(StoreError::Duplicate(id.to_string()));
    }
    check_key(&guard, id, value, &key)?;
    guard.insert(id.to_string(), value.clone());
    Ok(())
}

async fn replace_keyed<T, K>(
    map: &RwLock<HashMap<String, T>>,
    id: &str,
    value: &T,
    key: K,
) -> Result<bool, StoreError>
where
    T: Clone + Tenanted,
    K: Fn(&T) -> &str,
{
    let mut guard = map.write().await;
    if !guard
        .get(id)
        .is_some_and(|existing| existing.tenant() == value.tenant())
    {
        return Ok(false);
    }
    check_key(&guard, id, value, &key)?;
    guard.insert(id.to_string(), value.clone());
    Ok(true)
}

fn check_key<T, K>(map: &HashMap<String, T>, id: &str, value: &T, key: &K) -> Result<(), StoreError>
where
    T: Tenanted,
    K: Fn(&T) -> &str,
{
    let wanted = key(value);
    let taken = map
        .iter()
        .any(|(other_id, other)| {
            other_id != id && other.tenant() == value.tenant() && key(other) == wanted
        });
    if taken {
        return Err(StoreError::Duplicate(format!("{}/{}", value.tenant(), wanted)));
    }
    Ok(())
}

async fn get<T: Clone + Tenanted>(
    map: &RwLock<HashMap<String, T>>,
    tenant: &str,
    id: &str,
) -> Option<T> {
    map.read()
        .await
        .get(id)
        .filter(|value| value.tenant() == tenant)
        .cloned()
}

async fn replace<T: Clone + Tenanted>(
    map: &RwLock<HashMap<String, T>>,
    id: &str,
    value: &T,
) -> bool {
    let mut guard = map.write().await;
    match guard.get_mut(id) {
        Some(existing) if existing.tenant() == value.tenant() => {
            *existing = value.clone();
            true
        }
        _ => false,
    }
}

async fn remove<T: Tenanted>(map: &RwLock<HashMap<String, T>>, tenant: &str, id: &str) -> bool {
    let mut guard = map.write().await;
    if guard.get(id).is_some_and(|value| value.tenant() == tenant) {
        guard.remove(id);
        true
    } else {
        false
    }
}

async fn filtered<T, F>(map: &RwLock<HashMap<String, T>>, tenant: &str, keep: F) -> Vec<T>
where
    T: Clone + Tenanted,
    F: Fn(&T) -> bool,
{
    map.read()
        .await
        .values()
        .filter(|value| value.tenant() == tenant && keep(value))
        .cloned()
        .collect()
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_tours(&self, tenant: &str, query: &TourQuery) -> Result<Vec<Tour>, StoreError> {
        let mut tours = filtered(&self.tours, tenant, |tour| query.matches(tour)).await;
        tours.sort_by(|a, b| a.title.cmp(&b.title));
        if let Some(limit) = query.limit {
            tours.truncate(limit as usize);
        }
        Ok(tours)
    }

    async fn get_tour(&self, tenant: &str, id: &str) -> Result<Option<Tour>, StoreError> {
        Ok(get(&self.tours, tenant, id).await)
    }

    async fn insert_tour(&self, tour: &Tour) -> Result<(), StoreError> {
        insert(&self.tours, &tour.id, tour).await
    }

    async fn replace_tour(&self, tour: &Tour) -> Result<bool, StoreError> {
        Ok(replace(&self.tours, &tour.id, tour).await)
    }

    async fn delete_tour(&self, tenant: &str, id: &str) -> Result<bool, StoreError> {
        Ok(remove(&self.tours, tenant, id).await)
    }

    async fn set_tour_destination(
        &self,
        tenant: &str,
        tour_id: &str,
        destination: Option<&DestinationRef>,
    ) -> Result<bool, StoreError> {
        let mut tours = self.tours.write().await;
        match tours.get_mut(tour_id) {
            Some(tour) if tour.tenant_id == tenant => {
                tour.destination = destination.cloned();
                tour.updated_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_destinations(&self, tenant: &str) -> Result<Vec<Destination>, StoreError> {
        let mut destinations = filtered(&self.destinations, tenant, |_| true).await;
        destinations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(destinations)
    }

    async fn get_destination(
        &self,
        tenant: &str,
        id: &str,
    ) -> Result<Option<Destination>, StoreError> {
        Ok(get(&self.destinations, tenant, id).await)
    }

    async fn find_destination_by_slug(
        &self,
        tenant: &str,
        slug: &str,
    ) -> Result<Option<Destination>, StoreError> {
        Ok(filtered(&self.destinations, tenant, |d| d.slug == slug)
            .await
            .into_iter()
            .next())
    }

    async fn insert_destination(&self, destination: &Destination) -> Result<(), StoreError> {
        insert_keyed(&self.destinations, &destination.id, destination, |d| d.slug.as_str()).await
    }

    async fn replace_destination(&self, destination: &Destination) -> Result<bool, StoreError> {
        replace_keyed(&self.destinations, &destination.id, destination, |d| {
            d.slug.as_str()
        })
        .await
    }

    async fn delete_destination(&self, tenant: &str, id: &str) -> Result<bool, StoreError> {
        Ok(remove(&self.destinations, tenant, id).await)
    }

    async fn list_attraction_pages(
        &self,
        tenant: &str,
        published_only: bool,
    ) -> Result<Vec<AttractionPage>, StoreError> {
        let mut pages = filtered(&self.attraction_pages, tenant, |page| {
            !published_only || page.is_published()
        })
        .await;
        pages.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(pages)
    }

    async fn get_attraction_page(
        &self,
        tenant: &str,
        id: &str,
    ) -> Result<Option<AttractionPage>, StoreError> {
        Ok(get(&self.attraction_pages, tenant, id).await)
    }

    async fn find_attraction_page_by_slug(
        &self,
        tenant: &str,
        slug: &str,
    ) -> Result<Option<AttractionPage>, StoreError> {
        Ok(filtered(&self.attraction_pages, tenant, |p| p.slug == slug)
            .await
            .into_iter()
            .next())
    }

    async fn insert_attraction_page(&self, page: &AttractionPage) -> Result<(), StoreError> {
        insert_keyed(&self.attraction_pages, &page.id, page, |p| p.slug.as_str()).await
    }

    async fn replace_attraction_page(&self, page: &AttractionPage) -> Result<bool, StoreError> {
        replace_keyed(&self.attraction_pages, &page.id, page, |p| p.slug.as_str()).await
    }

    async fn delete_attraction_page(&self, tenant: &str, id: &str) -> Result<bool, StoreError> {
        Ok(remove(&self.attraction_pages, tenant, id).await)
    }

    async fn list_stop_sales(
        &self,
        tenant: &str,
        tour_id: Option<&str>,
    ) -> Result<Vec<StopSale>, StoreError> {
        let mut stop_sales = filtered(&self.stop_sales, tenant, |stop| {
            tour_id.map_or(true, |tour_id| stop.tour_id == tour_id)
        })
        .await;
        stop_sales.sort_by_key(|stop| stop.date);
        Ok(stop_sales)
    }

    async fn insert_stop_sale(&self, stop_sale: &StopSale) -> Result<(), StoreError> {
        insert(&self.stop_sales, &stop_sale.id, stop_sale).await
    }

    async fn delete_stop_sale(&self, tenant: &str, id: &str) -> Result<bool, StoreError> {
        Ok(remove(&self.stop_sales, tenant, id).await)
    }

    async fn list_discounts(&self, tenant: &str) -> Result<Vec<Discount>, StoreError> {
        let mut discounts = filtered(&self.discounts, tenant, |_| true).await;
        discounts.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(discounts)
    }

    async fn find_discount_by_code(
        &self,
        tenant: &str,
        code: &str,
    ) -> Result<Option<Discount>, StoreError> {
        let code = normalize_code(code);
        Ok(filtered(&self.discounts, tenant, |d| d.code == code)
            .await
            .into_iter()
            .next())
    }

    async fn insert_discount(&self, discount: &Discount) -> Result<(), StoreError> {
        insert_keyed(&self.discounts, &discount.id, discount, |d| d.code.as_str()).await
    }

    async fn record_discount_use(&self, tenant: &str, id: &str) -> Result<bool, StoreError> {
        let mut discounts = self.discounts.write().await;
        match discounts.get_mut(id).filter(|d| d.tenant_id == tenant) {
            Some(discount) if discount.max_uses.map_or(true, |max| discount.used_count < max) => {
                discount.used_count += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_discount_use(&self, tenant: &str, id: &str) -> Result<(), StoreError> {
        let mut discounts = self.discounts.write().await;
        if let Some(discount) = discounts.get_mut(id).filter(|d| d.tenant_id == tenant) {
            discount.used_count = discount.used_count.saturating_sub(1);
        }
        Ok(())
    }

    async fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        insert(&self.orders, &order.id, order).await
    }

    async fn get_order(&self, tenant: &str, id: &str) -> Result<Option<Order>, StoreError> {
        Ok(get(&self.orders, tenant, id).await)
    }
}
