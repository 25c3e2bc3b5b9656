use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    error::{ErrorKind, WriteFailure},
    options::{ClientOptions, FindOptions, IndexOptions, ServerApi, ServerApiVersion},
    Client, Collection, Cursor, Database, IndexModel,
};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::db::store::{Store, StoreError, TourQuery};
use crate::models::{
    attraction_page::{AttractionPage, PageStatus},
    destination::Destination,
    discount::{normalize_code, Discount},
    order::Order,
    stop_sale::StopSale,
    tour::{DestinationRef, Tour},
};

const DUPLICATE_KEY: i32 = 11000;

pub async fn create_mongo_client(uri: &str) -> Result<Client, StoreError> {
    log::info!("Connecting to MongoDB");

    let mut client_options = ClientOptions::parse(uri).await?;

    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);

    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    let client = Client::with_options(client_options)?;

    // A failed ping is not fatal; the health endpoint reports it.
    if let Err(e) = client.database("admin").run_command(doc! {"ping": 1}).await {
        log::warn!("Connected to MongoDB but ping failed: {}", e);
    } else {
        log::info!("MongoDB connection verified");
    }

    Ok(client)
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        if let ErrorKind::Write(WriteFailure::WriteError(write_error)) = err.kind.as_ref() {
            if write_error.code == DUPLICATE_KEY {
                return StoreError::Duplicate(write_error.message.clone());
            }
        }
        StoreError::Backend(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for StoreError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(client: &Client, database: &str) -> Self {
        Self {
            db: client.database(database),
        }
    }

    /// Unique `{tenantId, slug}` and `{tenantId, code}` keys. Safe to run on every start.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        self.destinations()
            .create_index(unique_index(doc! { "tenantId": 1, "slug": 1 }))
            .await?;
        self.attraction_pages()
            .create_index(unique_index(doc! { "tenantId": 1, "slug": 1 }))
            .await?;
        self.discounts()
            .create_index(unique_index(doc! { "tenantId": 1, "code": 1 }))
            .await?;
        log::info!("MongoDB indexes ensured");
        Ok(())
    }

    fn tours(&self) -> Collection<Tour> {
        self.db.collection("Tours")
    }

    fn destinations(&self) -> Collection<Destination> {
        self.db.collection("Destinations")
    }

    fn attraction_pages(&self) -> Collection<AttractionPage> {
        self.db.collection("AttractionPages")
    }

    fn stop_sales(&self) -> Collection<StopSale> {
        self.db.collection("StopSales")
    }

    fn discounts(&self) -> Collection<Discount> {
        self.db.collection("Discounts")
    }

    fn orders(&self) -> Collection<Order> {
        self.db.collection("Orders")
    }
}

fn unique_index(keys: Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

fn by_id(tenant: &str, id: &str) -> Document {
    doc! { "_id": id, "tenantId": tenant }
}

async fn collect<T>(cursor: Cursor<T>) -> Result<Vec<T>, StoreError>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    Ok(cursor.try_collect::<Vec<T>>().await?)
}

fn sorted_by(field: &str, limit: Option<u32>) -> FindOptions {
    let mut sort = Document::new();
    sort.insert(field, 1);
    let mut options = FindOptions::default();
    options.sort = Some(sort);
    options.limit = limit.map(i64::from);
    options
}

#[async_trait]
impl Store for MongoStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! {"ping": 1}).await?;
        Ok(())
    }

    async fn list_tours(&self, tenant: &str, query: &TourQuery) -> Result<Vec<Tour>, StoreError> {
        let mut filter = doc! { "tenantId": tenant };
        if query.published_only {
            filter.insert("isPublished", true);
        }
        if let Some(destination_id) = &query.destination_id {
            filter.insert("destination.id", destination_id);
        }
        if let Some(search) = query.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                let pattern = regex::escape(search);
                filter.insert(
                    "$or",
                    vec![
                        doc! { "title": { "$regex": &pattern, "$options": "i" } },
                        doc! { "destination.name": { "$regex": &pattern, "$options": "i" } },
                    ],
                );
            }
        }

        let cursor = self
            .tours()
            .find(filter)
            .with_options(sorted_by("title", query.limit))
            .await?;
        collect(cursor).await
    }

    async fn get_tour(&self, tenant: &str, id: &str) -> Result<Option<Tour>, StoreError> {
        Ok(self.tours().find_one(by_id(tenant, id)).await?)
    }

    async fn insert_tour(&self, tour: &Tour) -> Result<(), StoreError> {
        self.tours().insert_one(tour).await?;
        Ok(())
    }

    async fn replace_tour(&self, tour: &Tour) -> Result<bool, StoreError> {
        let result = self
            .tours()
            .replace_one(by_id(&tour.tenant_id, &tour.id), tour)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_tour(&self, tenant: &str, id: &str) -> Result<bool, StoreError> {
        let result = self.tours().delete_one(by_id(tenant, id)).await?;
        Ok(result.deleted_count > 0)
    }

    async fn set_tour_destination(
        &self,
        tenant: &str,
        tour_id: &str,
        destination: Option<&DestinationRef>,
    ) -> Result<bool, StoreError> {
        let now = mongodb::bson::to_bson(&Utc::now())?;
        let update = match destination {
            Some(destination) => doc! {
                "$set": { "destination": mongodb::bson::to_bson(destination)?, "updatedAt": now }
            },
            None => doc! {
                "$unset": { "destination": "" },
                "$set": { "updatedAt": now }
            },
        };
        let result = self
            .tours()
            .update_one(by_id(tenant, tour_id), update)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn list_destinations(&self, tenant: &str) -> Result<Vec<Destination>, StoreError> {
        let cursor = self
            .destinations()
            .find(doc! { "tenantId": tenant })
            .with_options(sorted_by("name", None))
            .await?;
        collect(cursor).await
    }

    async fn get_destination(
        &self,
        tenant: &str,
        id: &str,
    ) -> Result<Option<Destination>, StoreError> {
        Ok(self.destinations().find_one(by_id(tenant, id)).await?)
    }

    async fn find_destination_by_slug(
        &self,
        tenant: &str,
        slug: &str,
    ) -> Result<Option<Destination>, StoreError> {
        Ok(self
            .destinations()
            .find_one(doc! { "tenantId": tenant, "slug": slug })
            .await?)
    }

    async fn insert_destination(&self, destination: &Destination) -> Result<(), StoreError> {
        self.destinations().insert_one(destination).await?;
        Ok(())
    }

    async fn replace_destination(&self, destination: &Destination) -> Result<bool, StoreError> {
        let result = self
            .destinations()
            .replace_one(by_id(&destination.tenant_id, &destination.id), destination)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_destination(&self, tenant: &str, id: &str) -> Result<bool, StoreError> {
        let result = self.destinations().delete_one(by_id(tenant, id)).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_attraction_pages(
        &self,
        tenant: &str,
        published_only: bool,
    ) -> Result<Vec<AttractionPage>, StoreError> {
        let mut filter = doc! { "tenantId": tenant };
        if published_only {
            filter.insert("status", mongodb::bson::to_bson(&PageStatus::Published)?);
        }
        let cursor = self
            .attraction_pages()
            .find(filter)
            .with_options(sorted_by("title", None))
            .await?;
        collect(cursor).await
    }

    async fn get_attraction_page(
        &self,
        tenant: &str,
        id: &str,
    ) -> Result<Option<AttractionPage>, StoreError> {
        Ok(self.attraction_pages().find_one(by_id(tenant, id)).await?)
    }

    async fn find_attraction_page_by_slug(
        &self,
        tenant: &str,
        slug: &str,
    ) -> Result<Option<AttractionPage>, StoreError> {
        Ok(self
            .attraction_pages()
            .find_one(doc! { "tenantId": tenant, "slug": slug })
            .await?)
    }

    async fn insert_attraction_page(&self, page: &AttractionPage) -> Result<(), StoreError> {
        self.attraction_pages().insert_one(page).await?;
        Ok(())
    }

    async fn replace_attraction_page(&self, page: &AttractionPage) -> Result<bool, StoreError> {
        let result = self
            .attraction_pages()
            .replace_one(by_id(&page.tenant_id, &page.id), page)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_attraction_page(&self, tenant: &str, id: &str) -> Result<bool, StoreError> {
        let result = self.attraction_pages().delete_one(by_id(tenant, id)).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_stop_sales(
        &self,
        tenant: &str,
        tour_id: Option<&str>,
    ) -> Result<Vec<StopSale>, StoreError> {
        let mut filter = doc! { "tenantId": tenant };
        if let Some(tour_id) = tour_id {
            filter.insert("tourId", tour_id);
        }
        let cursor = self
            .stop_sales()
            .find(filter)
            .with_options(sorted_by("date", None))
            .await?;
        collect(cursor).await
    }

    async fn insert_stop_sale(&self, stop_sale: &StopSale) -> Result<(), StoreError> {
        self.stop_sales().insert_one(stop_sale).await?;
        Ok(())
    }

    async fn delete_stop_sale(&self, tenant: &str, id: &str) -> Result<bool, StoreError> {
        let result = self.stop_sales().delete_one(by_id(tenant, id)).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_discounts(&self, tenant: &str) -> Result<Vec<Discount>, StoreError> {
        let cursor = self
            .discounts()
            .find(doc! { "tenantId": tenant })
            .with_options(sorted_by("code", None))
            .await?;
        collect(cursor).await
    }

    async fn find_discount_by_code(
        &self,
        tenant: &str,
        code: &str,
    ) -> Result<Option<Discount>, StoreError> {
        Ok(self
            .discounts()
            .find_one(doc! { "tenantId": tenant, "code": normalize_code(code) })
            .await?)
    }

    async fn insert_discount(&self, discount: &Discount) -> Result<(), StoreError> {
        self.discounts().insert_one(discount).await?;
        Ok(())
    }

    async fn record_discount_use(&self, tenant: &str, id: &str) -> Result<bool, StoreError> {
        let mut filter = by_id(tenant, id);
        filter.insert(
            "$or",
            vec![
                doc! { "maxUses": null },
                doc! { "$expr": { "$lt": ["$usedCount", "$maxUses"] } },
            ],
        );
        let result = self
            .discounts()
            .update_one(filter, doc! { "$inc": { "usedCount": 1 } })
            .await?;
        Ok(result.modified_count == 1)
    }

    async fn release_discount_use(&self, tenant: &str, id: &str) -> Result<(), StoreError> {
        let mut filter = by_id(tenant, id);
        filter.insert("usedCount", doc! { "$gt": 0 });
        self.discounts()
            .update_one(filter, doc! { "$inc": { "usedCount": -1 } })
            .await?;
        Ok(())
    }

    async fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        self.orders().insert_one(order).await?;
        Ok(())
    }

    async fn get_order(&self, tenant: &str, id: &str) -> Result<Option<Order>, StoreError> {
        Ok(self.orders().find_one(by_id(tenant, id)).await?)
    }
}
