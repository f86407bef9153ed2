//! # Sale Commands

use tracing::{debug, info, warn};

use crate::dto::{CreateSaleRequest, UpdateSaleRequest};
use crate::error::{ApiError, ApiResult};
use tally_core::{reconcile_line_items, CoreError, LineItem, Money, Sale, SaleEvent, SaleView};
use tally_db::{Database, SaleEventRecord};

/// Creates a sale, applies the quantity discounts and stores it.
///
/// Any line over the quantity limit aborts the whole request and nothing
/// is stored.
pub async fn create_sale(db: &Database, request: CreateSaleRequest) -> ApiResult<SaleView> {
    debug!(sale_number = %request.sale_number, "create_sale command");
    request.validate()?;

    let items = request
        .products
        .iter()
        .map(|p| {
            LineItem::create(
                p.product_id.clone(),
                "",
                p.quantity,
                Money::from_cents(p.unit_price_cents),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut sale = Sale::create(
        request.sale_number,
        request.sale_date,
        request.customer_id,
        request.branch_id,
        items,
    )?;
    sale.apply_discount_rules().map_err(CoreError::RuleViolations)?;

    let stored = db.sales().create(&sale).await?;
    record_events(db, sale.drain_events()).await;

    info!(
        sale_id = %stored.id(),
        total = %stored.total(),
        items = stored.line_items().len(),
        "Sale created"
    );

    Ok(SaleView::from(&stored))
}

/// Replaces the header and line items of an existing sale.
///
/// Lines whose id matches a stored line keep their identity; the rest are
/// created. Stored lines missing from the request are dropped.
pub async fn update_sale(
    db: &Database,
    id: &str,
    request: UpdateSaleRequest,
) -> ApiResult<SaleView> {
    debug!(sale_id = %id, "update_sale command");
    request.validate()?;

    let mut sale = load(db, id).await?;

    let items = reconcile_line_items(sale.id(), sale.line_items(), &request.incoming_items())?;
    sale.update(
        request.sale_number,
        request.sale_date,
        request.customer_id,
        request.branch_id,
        items,
    )?;
    sale.apply_discount_rules().map_err(CoreError::RuleViolations)?;

    let stored = db.sales().update_with_line_items(&sale).await?;
    record_events(db, sale.drain_events()).await;

    info!(sale_id = %stored.id(), total = %stored.total(), "Sale updated");

    Ok(SaleView::from(&stored))
}

pub async fn checkout_sale(db: &Database, id: &str) -> ApiResult<SaleView> {
    debug!(sale_id = %id, "checkout_sale command");

    let mut sale = load(db, id).await?;
    sale.complete_checkout()?;

    let stored = db.sales().update(&sale).await?;

    info!(sale_id = %stored.id(), total = %stored.total(), "Checkout completed");

    Ok(SaleView::from(&stored))
}

/// Cancels a sale. Cancelling twice succeeds and logs nothing new.
pub async fn cancel_sale(db: &Database, id: &str) -> ApiResult<SaleView> {
    debug!(sale_id = %id, "cancel_sale command");

    let mut sale = load(db, id).await?;
    if sale.is_cancelled() {
        debug!(sale_id = %id, "Sale already cancelled");
        return Ok(SaleView::from(&sale));
    }

    sale.cancel();
    let stored = db.sales().update(&sale).await?;
    record_events(db, sale.drain_events()).await;

    info!(sale_id = %stored.id(), "Sale cancelled");

    Ok(SaleView::from(&stored))
}

pub async fn get_sale(db: &Database, id: &str) -> ApiResult<SaleView> {
    let sale = load(db, id).await?;
    Ok(SaleView::from(&sale))
}

pub async fn list_sales(db: &Database) -> ApiResult<Vec<SaleView>> {
    let sales = db.sales().get_all().await?;
    debug!(count = sales.len(), "Listed sales");
    Ok(sales.iter().map(SaleView::from).collect())
}

/// Event log for one sale, oldest first.
pub async fn list_sale_events(db: &Database, id: &str) -> ApiResult<Vec<SaleEventRecord>> {
    load(db, id).await?;
    Ok(db.sale_events().list_for_sale(id).await?)
}

async fn load(db: &Database, id: &str) -> ApiResult<Sale> {
    db.sales()
        .get_by_id(id)
        .await?
        .ok_or_else(ApiError::sale_not_found)
}

/// The sale is already committed at this point, so a failed log write is
/// reported but does not fail the request.
async fn record_events(db: &Database, events: Vec<SaleEvent>) {
    if events.is_empty() {
        return;
    }
    match db.sale_events().record_all(&events).await {
        Ok(count) => debug!(count, "Recorded sale events"),
        Err(e) => warn!(error = %e, count = events.len(), "Failed to record sale events"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{SaleProductRequest, UpdateSaleProductRequest};
    use crate::error::ErrorCode;
    use chrono::Utc;
    use tally_core::SaleEventKind;
    use tally_db::DbConfig;

    async fn setup_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn product(product_id: &str, quantity: i64, unit_price_cents: i64) -> SaleProductRequest {
        SaleProductRequest {
            product_id: product_id.to_string(),
            quantity,
            unit_price_cents,
        }
    }

    fn create_request(products: Vec<SaleProductRequest>) -> CreateSaleRequest {
        CreateSaleRequest {
            sale_number: "S-1001".to_string(),
            sale_date: Utc::now(),
            customer_id: "cust-1".to_string(),
            branch_id: "branch-1".to_string(),
            products,
        }
    }

    fn update_request(view: &SaleView, products: Vec<UpdateSaleProductRequest>) -> UpdateSaleRequest {
        UpdateSaleRequest {
            id: view.id.clone(),
            sale_number: "S-1001-B".to_string(),
            sale_date: view.sale_date,
            customer_id: view.customer_id.clone(),
            branch_id: view.branch_id.clone(),
            products,
        }
    }

    #[tokio::test]
    async fn test_create_applies_discount_tiers() {
        let db = setup_db().await;

        let view = create_sale(
            &db,
            create_request(vec![
                product("prod-1", 3, 1_000),
                product("prod-2", 5, 1_000),
                product("prod-3", 10, 10_000),
            ]),
        )
        .await
        .unwrap();

        let discounts: Vec<u32> = view.items.iter().map(|i| i.discount_bps).collect();
        assert_eq!(discounts, vec![0, 1_000, 2_000]);
        // 30.00 + 45.00 + 800.00
        assert_eq!(view.total_cents, 87_500);

        let events = list_sale_events(&db, &view.id).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, SaleEventKind::Created);
        assert_eq!(events[0].message, "Sale created successfully!");
    }

    #[tokio::test]
    async fn test_create_over_limit_stores_nothing() {
        let db = setup_db().await;

        let err = create_sale(
            &db,
            create_request(vec![product("prod-1", 2, 500), product("prod-2", 21, 100)]),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.errors.len(), 1);
        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert_eq!(db.sale_events().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_keeps_matched_lines_and_adds_new_ones() {
        let db = setup_db().await;
        let created = create_sale(&db, create_request(vec![product("prod-1", 2, 1_000)]))
            .await
            .unwrap();
        let kept_id = created.items[0].id.clone();

        let updated = update_sale(
            &db,
            &created.id,
            update_request(
                &created,
                vec![
                    UpdateSaleProductRequest {
                        id: Some(kept_id.clone()),
                        product_id: "prod-1".to_string(),
                        quantity: 6,
                        unit_price_cents: 1_000,
                    },
                    UpdateSaleProductRequest {
                        id: None,
                        product_id: "prod-9".to_string(),
                        quantity: 1,
                        unit_price_cents: 250,
                    },
                ],
            ),
        )
        .await
        .unwrap();

        assert_eq!(updated.sale_number, "S-1001-B");
        assert_eq!(updated.items.len(), 2);
        assert_eq!(updated.items[0].id, kept_id);
        assert_eq!(updated.items[0].discount_bps, 1_000);
        // 54.00 + 2.50
        assert_eq!(updated.total_cents, 5_650);

        let kinds: Vec<SaleEventKind> = list_sale_events(&db, &created.id)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.event_type)
            .collect();
        assert_eq!(kinds, vec![SaleEventKind::Created, SaleEventKind::Modified]);
    }

    #[tokio::test]
    async fn test_update_over_limit_leaves_stored_sale_alone() {
        let db = setup_db().await;
        let created = create_sale(&db, create_request(vec![product("prod-1", 4, 1_000)]))
            .await
            .unwrap();

        let err = update_sale(
            &db,
            &created.id,
            update_request(
                &created,
                vec![UpdateSaleProductRequest {
                    id: Some(created.items[0].id.clone()),
                    product_id: "prod-1".to_string(),
                    quantity: 25,
                    unit_price_cents: 1_000,
                }],
            ),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let stored = get_sale(&db, &created.id).await.unwrap();
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn test_update_unknown_sale() {
        let db = setup_db().await;
        let created = create_sale(&db, create_request(vec![product("prod-1", 1, 100)]))
            .await
            .unwrap();
        let mut request = update_request(&created, vec![]);
        request.products.push(UpdateSaleProductRequest {
            id: None,
            product_id: "prod-1".to_string(),
            quantity: 1,
            unit_price_cents: 100,
        });

        let err = update_sale(&db, "8a4f9b44-0000-4000-8000-00000000beef", request)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Sale not found.");
    }

    #[tokio::test]
    async fn test_checkout_then_checkout_again() {
        let db = setup_db().await;
        let created = create_sale(&db, create_request(vec![product("prod-1", 1, 999)]))
            .await
            .unwrap();

        let view = checkout_sale(&db, &created.id).await.unwrap();
        assert!(view.is_checkout_completed);

        let err = checkout_sale(&db, &created.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert_eq!(err.message, "The sale has already been checked out.");
    }

    #[tokio::test]
    async fn test_cancelled_sale_cannot_check_out() {
        let db = setup_db().await;
        let created = create_sale(&db, create_request(vec![product("prod-1", 1, 999)]))
            .await
            .unwrap();

        let view = cancel_sale(&db, &created.id).await.unwrap();
        assert!(view.is_cancelled);

        let err = checkout_sale(&db, &created.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert_eq!(err.message, "Cannot finalize a cancelled sale.");
    }

    #[tokio::test]
    async fn test_cancel_twice_logs_once() {
        let db = setup_db().await;
        let created = create_sale(&db, create_request(vec![product("prod-1", 1, 999)]))
            .await
            .unwrap();

        cancel_sale(&db, &created.id).await.unwrap();
        let again = cancel_sale(&db, &created.id).await.unwrap();
        assert!(again.is_cancelled);

        let events = list_sale_events(&db, &created.id).await.unwrap();
        let cancelled = events
            .iter()
            .filter(|e| e.event_type == SaleEventKind::Cancelled)
            .count();
        assert_eq!(cancelled, 1);
    }

    #[tokio::test]
    async fn test_get_and_list() {
        let db = setup_db().await;
        assert!(list_sales(&db).await.unwrap().is_empty());

        let created = create_sale(&db, create_request(vec![product("prod-1", 1, 100)]))
            .await
            .unwrap();

        assert_eq!(get_sale(&db, &created.id).await.unwrap(), created);
        assert_eq!(list_sales(&db).await.unwrap().len(), 1);

        let err = get_sale(&db, "missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
