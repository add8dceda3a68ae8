//! Catalog Store: product list, product detail and admin mutations

use std::sync::{Arc, Mutex};

use validator::Validate;

use crate::api::StorefrontApi;
use crate::domain::aggregates::{CatalogStats, CreateProductRequest, Product};
use crate::domain::events::{ProductEvent, StoreEvent};
use crate::domain::value_objects::ProductId;
use crate::store::cache::{read_through, QueryCache, QueryKey, QueryStatus};
use crate::store::{lock, run_mutation, BusyFlag, Confirmed};
use crate::{MutationKind, Result, StorefrontError};

pub struct CatalogStore<A> {
    api: Arc<A>,
    lists: Mutex<QueryCache<Arc<Vec<Product>>>>,
    details: Mutex<QueryCache<Product>>,
    creating: BusyFlag,
    updating: BusyFlag,
    deleting: BusyFlag,
}

impl<A: StorefrontApi> CatalogStore<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            lists: Mutex::default(),
            details: Mutex::default(),
            creating: BusyFlag::default(),
            updating: BusyFlag::default(),
            deleting: BusyFlag::default(),
        }
    }

    /// All products, in the order the server returned them.
    pub async fn list_products(&self) -> Result<Arc<Vec<Product>>> {
        let api = Arc::clone(&self.api);
        let cached = read_through(&self.lists, QueryKey::Products, || async move {
            api.list_products().await.map(Arc::new)
        })
        .await
        .map_err(|source| {
            tracing::error!(error = %source, "product list unavailable");
            StorefrontError::Fetch { resource: "products", source }
        })?;
        tracing::info!(count = cached.value.len(), generation = cached.generation, "products loaded");
        Ok(cached.value)
    }

    /// Drops the cached list and fetches it again.
    pub async fn reload_products(&self) -> Result<Arc<Vec<Product>>> {
        lock(&self.lists).invalidate(QueryKey::Products.provides());
        self.list_products().await
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Product> {
        let api = Arc::clone(&self.api);
        let result = read_through(&self.details, QueryKey::Product(id), || async move {
            api.get_product(id).await
        })
        .await;
        match result {
            Ok(cached) => Ok(cached.value),
            Err(source) if source.is_not_found() => {
                tracing::warn!(product_id = %id, "product not found");
                lock(&self.details).evict(&QueryKey::Product(id));
                Err(StorefrontError::NotFound(id))
            }
            Err(source) => {
                tracing::error!(product_id = %id, error = %source, "product detail unavailable");
                Err(StorefrontError::Fetch { resource: "product", source })
            }
        }
    }

    /// Product list from the most recent completed fetch, empty before the first.
    pub fn products(&self) -> Arc<Vec<Product>> {
        lock(&self.lists)
            .latest(&QueryKey::Products)
            .map(|c| c.value)
            .unwrap_or_default()
    }

    /// Last fetched record for `id`: the detail entry if present, else the list's copy.
    pub fn product(&self, id: ProductId) -> Option<Product> {
        let detail = lock(&self.details).latest(&QueryKey::Product(id)).map(|c| c.value);
        detail.or_else(|| self.products().iter().find(|p| p.id == id).cloned())
    }

    /// Generation of the product list currently held; changes whenever a fetch completes.
    pub fn products_generation(&self) -> Option<u64> {
        lock(&self.lists).latest(&QueryKey::Products).map(|c| c.generation)
    }

    pub fn products_status(&self) -> QueryStatus { lock(&self.lists).status(&QueryKey::Products) }
    pub fn product_status(&self, id: ProductId) -> QueryStatus { lock(&self.details).status(&QueryKey::Product(id)) }

    pub fn stats(&self) -> CatalogStats { CatalogStats::from_products(&self.products()) }

    pub fn is_creating(&self) -> bool { self.creating.is_set() }
    pub fn is_updating(&self) -> bool { self.updating.is_set() }
    pub fn is_deleting(&self) -> bool { self.deleting.is_set() }

    /// Creates a product. Invalid requests are rejected before any request is sent.
    pub async fn create(&self, request: &CreateProductRequest) -> Result<Product> {
        request.validate()?;
        let created = run_mutation(MutationKind::CreateProduct, &self.creating, self.api.create_product(request)).await?;
        self.apply(StoreEvent::Product(ProductEvent::Created { product_id: created.id }));
        Ok(created)
    }

    /// Replaces a product's fields on the server, validated like a create.
    pub async fn update(&self, product: &Product) -> Result<Product> {
        product.draft().validate()?;
        let updated = run_mutation(MutationKind::UpdateProduct, &self.updating, self.api.update_product(product)).await?;
        self.apply(StoreEvent::Product(ProductEvent::Updated { product_id: product.id }));
        Ok(updated)
    }

    pub async fn delete(&self, id: ProductId, _confirmed: Confirmed) -> Result<()> {
        run_mutation(MutationKind::DeleteProduct, &self.deleting, self.api.delete_product(id)).await?;
        self.apply(StoreEvent::Product(ProductEvent::Deleted { product_id: id }));
        Ok(())
    }

    fn apply(&self, event: StoreEvent) {
        let mut stale = 0;
        for tag in event.invalidates() {
            stale += lock(&self.lists).invalidate(tag);
            stale += lock(&self.details).invalidate(tag);
        }
        tracing::info!(?event, stale, "catalog invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{product, FakeApi};
    use crate::api::ApiError;
    use crate::domain::value_objects::{Price, Quantity};

    fn store(products: Vec<Product>) -> (Arc<FakeApi>, CatalogStore<FakeApi>) {
        let api = Arc::new(FakeApi::with_products(products));
        (Arc::clone(&api), CatalogStore::new(api))
    }

    fn request(name: &str) -> CreateProductRequest {
        CreateProductRequest {
            name: name.into(),
            description: "Hand-thrown stoneware".into(),
            price: Price::zero(),
            category: "Kitchen".into(),
            quantity: Quantity::new(2),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_list_is_cached_until_invalidated() {
        let (api, store) = store(vec![product(2, 5, 1), product(1, 5, 1)]);
        assert_eq!(store.products_status(), QueryStatus::Idle);

        let first = store.list_products().await.unwrap();
        let ids: Vec<_> = first.iter().map(|p| p.id.value()).collect();
        assert_eq!(ids, vec![2, 1]);
        store.list_products().await.unwrap();
        assert_eq!(api.calls("list_products"), 1);
        assert_eq!(store.products_status(), QueryStatus::Ready);

        store.create(&request("Bowl")).await.unwrap();
        assert_eq!(store.products().len(), 2);
        assert_eq!(store.list_products().await.unwrap().len(), 3);
        assert_eq!(api.calls("list_products"), 2);
    }

    #[tokio::test]
    async fn test_generation_changes_on_refetch() {
        let (_api, store) = store(vec![product(1, 5, 1)]);
        assert_eq!(store.products_generation(), None);
        store.list_products().await.unwrap();
        let first = store.products_generation();
        store.reload_products().await.unwrap();
        assert_ne!(store.products_generation(), first);
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let (_api, store) = store(vec![product(1, 5, 1)]);
        assert_eq!(store.get_product(ProductId::new(1)).await.unwrap().id, ProductId::new(1));
        let err = store.get_product(ProductId::new(99)).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(store.product(ProductId::new(99)).is_none());
    }

    #[tokio::test]
    async fn test_fetch_error() {
        let (api, store) = store(vec![]);
        api.fail_next(ApiError::Status { status: 500, body: "boom".into() });
        let err = store.list_products().await.unwrap_err();
        assert!(matches!(err, StorefrontError::Fetch { resource: "products", .. }));
        assert!(matches!(store.products_status(), QueryStatus::Failed(_)));
        // retry by reload
        assert!(store.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_create_never_reaches_server() {
        let (api, store) = store(vec![]);
        let err = store.create(&request("X")).await.unwrap_err();
        assert!(matches!(err, StorefrontError::Validation(_)));
        assert_eq!(api.calls("create_product"), 0);
    }

    #[tokio::test]
    async fn test_update_refreshes_detail() {
        let (api, store) = store(vec![product(1, 5, 1)]);
        let mut p = store.get_product(ProductId::new(1)).await.unwrap();
        p.quantity = Quantity::new(40);
        store.update(&p).await.unwrap();
        assert_eq!(store.get_product(ProductId::new(1)).await.unwrap().quantity.value(), 40);
        assert_eq!(api.calls("get_product"), 2);
    }

    #[tokio::test]
    async fn test_delete_and_mutation_error() {
        let (_api, store) = store(vec![product(1, 5, 1), product(2, 5, 0)]);
        store.list_products().await.unwrap();
        assert_eq!(store.stats().out_of_stock, 1);

        store.delete(ProductId::new(2), Confirmed::pre_approved()).await.unwrap();
        assert_eq!(store.list_products().await.unwrap().len(), 1);

        let err = store.delete(ProductId::new(2), Confirmed::pre_approved()).await.unwrap_err();
        assert!(matches!(err, StorefrontError::Mutation { kind: MutationKind::DeleteProduct, .. }));
        assert!(!store.is_deleting());
    }
}
