//! Collectible item handlers.

use axum::{
    Extension,
    extract::rejection::JsonRejection,
    response::Json,
};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    database::Database,
    errors::AppError,
    geo_math::Coordinate,
    models::CollectibleItem,
    types::{CollectibleItemRow, ImportReport, ImportRowError},
};

#[utoipa::path(
    get,
    path = "/collectible_items",
    tag = "collectibles",
    responses(
        (status = 200, description = "All collectible items", body = Vec<CollectibleItem>)
    )
)]
pub async fn list_collectibles(
    Extension(db): Extension<Database>,
) -> Result<Json<Vec<CollectibleItem>>, AppError> {
    let items = db.list_collectibles().await?;
    Ok(Json(items))
}

/// Bulk import. Valid rows are upserted by `uid`; invalid rows are reported
/// and skipped.
#[utoipa::path(
    post,
    path = "/collectible_items/import",
    tag = "collectibles",
    request_body = Vec<CollectibleItemRow>,
    responses(
        (status = 200, description = "Import report", body = ImportReport),
        (status = 400, description = "Malformed body")
    )
)]
pub async fn import_collectibles(
    Extension(db): Extension<Database>,
    payload: Result<Json<Vec<CollectibleItemRow>>, JsonRejection>,
) -> Result<Json<ImportReport>, AppError> {
    let Json(rows) = payload?;
    let (items, errors) = partition_rows(rows);

    let imported = db.upsert_collectibles(&items).await?;
    if !errors.is_empty() {
        warn!("Skipped {} invalid collectible rows", errors.len());
    }
    info!("Imported {imported} collectible items");

    Ok(Json(ImportReport { imported, errors }))
}

pub(crate) fn partition_rows(
    rows: Vec<CollectibleItemRow>,
) -> (Vec<CollectibleItem>, Vec<ImportRowError>) {
    let mut items = Vec::new();
    let mut errors = Vec::new();

    for (idx, row) in rows.into_iter().enumerate() {
        match row_to_item(row) {
            Ok(item) => items.push(item),
            Err(e) => errors.push(ImportRowError {
                row: idx + 1,
                message: e.to_string(),
            }),
        }
    }

    (items, errors)
}

fn row_to_item(row: CollectibleItemRow) -> Result<CollectibleItem, AppError> {
    row.validate()?;
    let coordinate = Coordinate::new(row.latitude, row.longitude)?;
    Ok(CollectibleItem {
        id: Uuid::new_v4(),
        name: row.name,
        uid: row.uid,
        value: row.value,
        latitude: coordinate.latitude,
        longitude: coordinate.longitude,
        picture: row.picture,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(uid: &str, lat: f64, picture: &str) -> CollectibleItemRow {
        CollectibleItemRow {
            name: format!("Item {uid}"),
            uid: uid.to_string(),
            value: 5,
            latitude: lat,
            longitude: 37.6,
            picture: picture.to_string(),
        }
    }

    #[test]
    fn test_partition_reports_bad_rows() {
        let rows = vec![
            row("a1", 55.7, "https://example.com/a1.png"),
            row("a2", 95.0, "https://example.com/a2.png"),
            row("a3", 55.8, "not a url"),
        ];

        let (items, errors) = partition_rows(rows);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].uid, "a1");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].row, 2);
        assert_eq!(errors[1].row, 3);
        assert!(errors[1].message.contains("Picture must be a URL"));
    }
}
