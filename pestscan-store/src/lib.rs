use async_trait::async_trait;
use pestscan_types::{Agrovet, Crop, Farm, NewCrop, NewFarm, Pest};
use thiserror::Error;

pub mod memory;
pub use memory::InMemoryRecordStore;

pub mod seed;
pub use seed::Seed;

#[derive(Debug, Error)]
#[error("record store error: {message}")]
pub struct StoreError {
    pub message: String,
}

/// All pest, agrovet, farm and crop records flow through this trait.
///
/// Every method is async so a durable backend can slot in behind the same API.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn pests(&self) -> Result<Vec<Pest>, StoreError>;

    async fn agrovets(&self) -> Result<Vec<Agrovet>, StoreError>;

    async fn farms(&self) -> Result<Vec<Farm>, StoreError>;

    /// Append a farm, assigning the next id and stamping `created_at`.
    async fn create_farm(&self, farm: NewFarm) -> Result<Farm, StoreError>;

    /// Crops whose `farm_id` equals `farm_id`; empty when the farm is unknown.
    async fn crops_by_farm_id(&self, farm_id: u64) -> Result<Vec<Crop>, StoreError>;

    /// Append a crop under `farm_id`. The farm is not required to exist.
    async fn create_crop(&self, farm_id: u64, crop: NewCrop) -> Result<Crop, StoreError>;
}
