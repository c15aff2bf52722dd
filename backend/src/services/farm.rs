//! Farm management service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{GpsCoordinates, Milestone};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::GeocodingClient;
use crate::services::badge_award::BadgeCoordinator;

/// Farm service for managing a user's farms
#[derive(Clone)]
pub struct FarmService {
    db: PgPool,
    geocoder: GeocodingClient,
}

/// Farm information
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Farm {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub location_text: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub size_acres: Option<Decimal>,
    pub current_crop: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Farm {
    /// Coordinates, when the farm has been geocoded
    pub fn coordinates(&self) -> Option<GpsCoordinates> {
        Some(GpsCoordinates::new(self.latitude?, self.longitude?))
    }
}

/// Input for creating a farm
#[derive(Debug, Deserialize)]
pub struct CreateFarmInput {
    pub name: String,
    pub location_text: String,
    pub size_acres: Option<Decimal>,
    pub current_crop: Option<String>,
}

/// Partial farm update
#[derive(Debug, Default, Deserialize)]
pub struct UpdateFarmInput {
    pub name: Option<String>,
    pub location_text: Option<String>,
    pub size_acres: Option<Decimal>,
    pub current_crop: Option<String>,
}

const FARM_COLUMNS: &str = "id, owner_id, name, location_text, latitude, longitude, size_acres, current_crop, created_at";

/// Load a farm and check that `user_id` owns it.
///
/// Missing farms are `NotFound`; farms owned by someone else are `Forbidden`.
pub async fn find_owned_farm(db: &PgPool, user_id: Uuid, farm_id: Uuid) -> AppResult<Farm> {
    let farm = sqlx::query_as::<_, Farm>(&format!("SELECT {} FROM farms WHERE id = $1", FARM_COLUMNS))
        .bind(farm_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Farm".to_string()))?;

    if farm.owner_id != user_id {
        return Err(AppError::Forbidden("Not authorized to access this farm".to_string()));
    }

    Ok(farm)
}

fn validate_size(size_acres: Option<Decimal>) -> AppResult<()> {
    if let Some(size) = size_acres {
        shared::validate_farm_size(size).map_err(|msg| AppError::validation("size_acres", msg))?;
    }
    Ok(())
}

impl FarmService {
    pub fn new(db: PgPool, geocoder: GeocodingClient) -> Self {
        Self { db, geocoder }
    }

    async fn geocode(&self, location_text: &str) -> AppResult<GpsCoordinates> {
        self.geocoder.lookup(location_text).await.ok_or_else(|| {
            AppError::NotFound(format!("Coordinates for location '{}'", location_text))
        })
    }

    /// Create a farm for the user, geocoding its location
    pub async fn create_farm(&self, owner_id: Uuid, input: CreateFarmInput) -> AppResult<Farm> {
        let name = input.name.trim();
        shared::validate_farm_name(name).map_err(|msg| AppError::validation("name", msg))?;
        validate_size(input.size_acres)?;

        let coords = self.geocode(&input.location_text).await?;

        let farm = sqlx::query_as::<_, Farm>(&format!(
            r#"
            INSERT INTO farms (owner_id, name, location_text, latitude, longitude, size_acres, current_crop)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            FARM_COLUMNS
        ))
        .bind(owner_id)
        .bind(name)
        .bind(&input.location_text)
        .bind(coords.latitude)
        .bind(coords.longitude)
        .bind(input.size_acres)
        .bind(&input.current_crop)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(farm_id = %farm.id, owner_id = %owner_id, "Farm created");

        self.record_farm_milestone(owner_id).await;

        Ok(farm)
    }

    async fn record_farm_milestone(&self, owner_id: Uuid) {
        let farm_count = match sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM farms WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.db)
            .await
        {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(user_id = %owner_id, "Failed to count farms for badges: {}", e);
                return;
            }
        };

        BadgeCoordinator::new(self.db.clone())
            .record_milestone(owner_id, Milestone::FarmCreated { farm_count })
            .await;
    }

    /// List the user's farms
    pub async fn list_farms(&self, owner_id: Uuid) -> AppResult<Vec<Farm>> {
        let farms = sqlx::query_as::<_, Farm>(&format!(
            "SELECT {} FROM farms WHERE owner_id = $1 ORDER BY created_at ASC",
            FARM_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;

        Ok(farms)
    }

    pub async fn get_farm(&self, owner_id: Uuid, farm_id: Uuid) -> AppResult<Farm> {
        find_owned_farm(&self.db, owner_id, farm_id).await
    }

    /// Update a farm. A changed location is geocoded again.
    pub async fn update_farm(
        &self,
        owner_id: Uuid,
        farm_id: Uuid,
        input: UpdateFarmInput,
    ) -> AppResult<Farm> {
        let farm = find_owned_farm(&self.db, owner_id, farm_id).await?;

        if let Some(name) = &input.name {
            shared::validate_farm_name(name.trim()).map_err(|msg| AppError::validation("name", msg))?;
        }
        validate_size(input.size_acres)?;

        let coords = match &input.location_text {
            Some(location) if *location != farm.location_text => Some(self.geocode(location).await?),
            _ => None,
        };

        let updated = sqlx::query_as::<_, Farm>(&format!(
            r#"
            UPDATE farms SET
                name = COALESCE($2, name),
                location_text = COALESCE($3, location_text),
                latitude = COALESCE($4, latitude),
                longitude = COALESCE($5, longitude),
                size_acres = COALESCE($6, size_acres),
                current_crop = COALESCE($7, current_crop)
            WHERE id = $1
            RETURNING {}
            "#,
            FARM_COLUMNS
        ))
        .bind(farm_id)
        .bind(input.name.as_deref().map(str::trim))
        .bind(&input.location_text)
        .bind(coords.map(|c| c.latitude))
        .bind(coords.map(|c| c.longitude))
        .bind(input.size_acres)
        .bind(&input.current_crop)
        .fetch_one(&self.db)
        .await?;

        Ok(updated)
    }

    /// Delete a farm with its activities and soil reports
    pub async fn delete_farm(&self, owner_id: Uuid, farm_id: Uuid) -> AppResult<()> {
        find_owned_farm(&self.db, owner_id, farm_id).await?;

        sqlx::query("DELETE FROM farms WHERE id = $1")
            .bind(farm_id)
            .execute(&self.db)
            .await?;

        tracing::info!(farm_id = %farm_id, owner_id = %owner_id, "Farm deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn farm(latitude: Option<Decimal>, longitude: Option<Decimal>) -> Farm {
        Farm {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Shamba".to_string(),
            location_text: "Nakuru".to_string(),
            latitude,
            longitude,
            size_acres: None,
            current_crop: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_coordinates_require_both_values() {
        assert!(farm(Some(Decimal::ONE), None).coordinates().is_none());
        let coords = farm(Some(Decimal::ONE), Some(Decimal::TWO)).coordinates().unwrap();
        assert_eq!(coords.longitude, Decimal::TWO);
    }

    #[test]
    fn test_validate_size_rejects_zero() {
        assert!(validate_size(None).is_ok());
        assert!(validate_size(Some(Decimal::ONE)).is_ok());
        assert!(matches!(
            validate_size(Some(Decimal::ZERO)),
            Err(AppError::Validation { .. })
        ));
    }
}
