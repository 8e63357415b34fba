use async_trait::async_trait;
use chrono::Utc;
use pestscan_types::{Agrovet, Crop, Farm, NewCrop, NewFarm, Pest};
use tokio::sync::Mutex;

use crate::{RecordStore, Seed, StoreError};

/// Process-lifetime record store.
///
/// Append-only: records are never updated or removed. Ids come from per-table
/// counters starting at 1, so they match "table length + 1" while staying
/// unique if two writers race.
///
/// NOTE: nothing here survives a restart.
pub struct InMemoryRecordStore {
    inner: Mutex<Tables>,
}

struct Tables {
    pests: Vec<Pest>,
    agrovets: Vec<Agrovet>,
    farms: Vec<Farm>,
    crops: Vec<Crop>,
    next_farm_id: u64,
    next_crop_id: u64,
}

impl InMemoryRecordStore {
    pub fn new(seed: Seed) -> Self {
        Self {
            inner: Mutex::new(Tables {
                pests: seed.pests,
                agrovets: seed.agrovets,
                farms: Vec::new(),
                crops: Vec::new(),
                next_farm_id: 1,
                next_crop_id: 1,
            }),
        }
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new(Seed::default())
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn pests(&self) -> Result<Vec<Pest>, StoreError> {
        Ok(self.inner.lock().await.pests.clone())
    }

    async fn agrovets(&self) -> Result<Vec<Agrovet>, StoreError> {
        Ok(self.inner.lock().await.agrovets.clone())
    }

    async fn farms(&self) -> Result<Vec<Farm>, StoreError> {
        Ok(self.inner.lock().await.farms.clone())
    }

    async fn create_farm(&self, farm: NewFarm) -> Result<Farm, StoreError> {
        let mut inner = self.inner.lock().await;
        let id = inner.next_farm_id;
        inner.next_farm_id += 1;

        let farm = Farm {
            id,
            name: farm.name,
            boundaries: farm.boundaries,
            area: farm.area,
            location: farm.location,
            created_at: Utc::now(),
        };
        inner.farms.push(farm.clone());
        tracing::debug!(farm_id = id, name = %farm.name, "farm created");
        Ok(farm)
    }

    async fn crops_by_farm_id(&self, farm_id: u64) -> Result<Vec<Crop>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .crops
            .iter()
            .filter(|c| c.farm_id == farm_id)
            .cloned()
            .collect())
    }

    async fn create_crop(&self, farm_id: u64, crop: NewCrop) -> Result<Crop, StoreError> {
        let mut inner = self.inner.lock().await;
        let id = inner.next_crop_id;
        inner.next_crop_id += 1;

        let crop = Crop {
            id,
            farm_id,
            name: crop.name,
            planting_date: crop.planting_date,
            indices: crop.indices,
            soil_data: crop.soil_data,
        };
        inner.crops.push(crop.clone());
        tracing::debug!(crop_id = id, farm_id, "crop created");
        Ok(crop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pestscan_types::CropIndices;

    fn new_farm(name: &str) -> NewFarm {
        NewFarm {
            name: name.into(),
            boundaries: serde_json::json!({
                "type": "Polygon",
                "coordinates": [[[36.82, -1.29], [36.83, -1.29], [36.83, -1.28], [36.82, -1.29]]]
            }),
            area: 1200.0,
            location: "Kenya".into(),
        }
    }

    fn new_crop(name: &str) -> NewCrop {
        NewCrop {
            name: name.into(),
            planting_date: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            indices: CropIndices::default(),
            soil_data: None,
        }
    }

    #[tokio::test]
    async fn seeded_catalog_is_served() {
        let store = InMemoryRecordStore::default();
        assert_eq!(store.pests().await.unwrap().len(), 2);
        assert_eq!(store.agrovets().await.unwrap().len(), 3);
        assert!(store.farms().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn farm_ids_follow_collection_length() {
        let store = InMemoryRecordStore::default();
        for expected in 1..=3u64 {
            let before = store.farms().await.unwrap().len() as u64;
            let farm = store.create_farm(new_farm("plot")).await.unwrap();
            assert_eq!(farm.id, before + 1);
            assert_eq!(farm.id, expected);
            assert!(farm.created_at <= Utc::now());
        }
        assert_eq!(store.farms().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn crops_are_filtered_by_farm() {
        let store = InMemoryRecordStore::default();
        store.create_crop(1, new_crop("Maize")).await.unwrap();
        store.create_crop(2, new_crop("Beans")).await.unwrap();
        let c = store.create_crop(1, new_crop("Kale")).await.unwrap();
        assert_eq!(c.id, 3);

        let farm_one = store.crops_by_farm_id(1).await.unwrap();
        assert_eq!(farm_one.len(), 2);
        assert!(farm_one.iter().all(|c| c.farm_id == 1));

        assert!(store.crops_by_farm_id(99).await.unwrap().is_empty());
    }
}
