//! Process-local store with the same contract as the PostgreSQL one.
//!
//! Every operation runs under a single lock acquisition, which gives the
//! increment the same all-or-nothing behaviour the database provides.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::dto::category::UpsertCategoryRequest;
use crate::dto::common::PageRequest;
use crate::error::{Result, StorageError};
use crate::models::{NewWasteScan, RankedProfile, UserProfile, WasteCategory, WasteScan};
use crate::store::{CategoryStore, ProfileStore, ScanStore};

#[derive(Default)]
struct State {
    categories: BTreeMap<String, WasteCategory>,
    scans: Vec<WasteScan>,
    credited: HashSet<Uuid>,
    profiles: HashMap<Uuid, UserProfile>,
    clock: Option<DateTime<Utc>>,
}

impl State {
    // Strictly increasing timestamps keep creation order observable even when
    // two rows are written within the clock's resolution.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.clock {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.clock = Some(ts);
        ts
    }

    fn ranked(&self) -> Vec<RankedProfile> {
        let mut profiles: Vec<&UserProfile> = self.profiles.values().collect();
        profiles.sort_by_key(|p| (Reverse(p.total_points), p.created_at, p.user_id));

        profiles
            .into_iter()
            .enumerate()
            .map(|(idx, profile)| RankedProfile {
                rank: idx as i64 + 1,
                profile: profile.clone(),
            })
            .collect()
    }

    fn profile_entry(&mut self, user_id: Uuid, now: DateTime<Utc>) -> &mut UserProfile {
        self.profiles.entry(user_id).or_insert_with(|| UserProfile {
            user_id,
            username: None,
            total_points: 0,
            total_co2_saved_kg: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of scan rows recorded for a user
    pub async fn scan_count(&self, user_id: Uuid) -> usize {
        let state = self.state.lock().await;
        state.scans.iter().filter(|s| s.user_id == user_id).count()
    }
}

#[async_trait::async_trait]
impl CategoryStore for InMemoryStore {
    async fn find_category_by_name(&self, name: &str) -> Result<Option<WasteCategory>> {
        let state = self.state.lock().await;
        Ok(state.categories.get(name).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<WasteCategory>> {
        let state = self.state.lock().await;
        Ok(state.categories.values().cloned().collect())
    }

    async fn upsert_category(&self, request: &UpsertCategoryRequest) -> Result<WasteCategory> {
        if request.points_value < 0 || request.co2_impact_kg < Decimal::ZERO {
            return Err(StorageError::ConstraintViolation(format!(
                "Category '{}' has negative point or CO2 values",
                request.name
            )));
        }

        let mut state = self.state.lock().await;
        let existing = state
            .categories
            .get(&request.name)
            .map(|c| (c.category_id, c.created_at));
        let (category_id, created_at) = match existing {
            Some(ids) => ids,
            None => (Uuid::new_v4(), state.next_timestamp()),
        };

        let category = WasteCategory {
            category_id,
            name: request.name.clone(),
            description: request.description.clone(),
            disposal_instructions: request.disposal_instructions.clone(),
            environmental_impact: request.environmental_impact.clone(),
            points_value: request.points_value,
            co2_impact_kg: request.co2_impact_kg,
            icon_name: request.icon_name.clone(),
            color: request.color.clone(),
            created_at,
        };

        state
            .categories
            .insert(request.name.clone(), category.clone());

        Ok(category)
    }
}

#[async_trait::async_trait]
impl ScanStore for InMemoryStore {
    async fn insert_scan(&self, scan: &NewWasteScan) -> Result<WasteScan> {
        let mut state = self.state.lock().await;

        if let Some(key) = scan.idempotency_key.as_deref() {
            let duplicate = state.scans.iter().any(|existing| {
                existing.user_id == scan.user_id && existing.idempotency_key.as_deref() == Some(key)
            });
            if duplicate {
                return Err(StorageError::DuplicateKey(format!(
                    "Scan with idempotency key '{}' already recorded",
                    key
                )));
            }
        }

        if let Some(category_id) = scan.category_id
            && !state.categories.values().any(|c| c.category_id == category_id)
        {
            return Err(StorageError::ConstraintViolation(format!(
                "Unknown category reference {}",
                category_id
            )));
        }

        let created_at = state.next_timestamp();
        let row = WasteScan {
            scan_id: Uuid::new_v4(),
            user_id: scan.user_id,
            category_id: scan.category_id,
            category_name: scan.category_name.clone(),
            confidence: scan.confidence,
            points_awarded: scan.points_awarded,
            co2_saved_kg: scan.co2_saved_kg,
            image_url: scan.image_url.clone(),
            location: scan.location.clone(),
            disposal_confirmed: scan.disposal_confirmed,
            idempotency_key: scan.idempotency_key.clone(),
            created_at,
        };
        state.scans.push(row.clone());

        Ok(row)
    }

    async fn list_scans_for_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<WasteScan>, i64)> {
        let state = self.state.lock().await;
        let mut scans: Vec<WasteScan> = state
            .scans
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        scans.sort_by_key(|s| (Reverse(s.created_at), s.scan_id));

        let total_items = scans.len() as i64;
        let page_items = scans
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();

        Ok((page_items, total_items))
    }
}

#[async_trait::async_trait]
impl ProfileStore for InMemoryStore {
    async fn credit_scan(&self, user_id: Uuid, scan_id: Uuid) -> Result<UserProfile> {
        let mut state = self.state.lock().await;
        let (points, co2_saved_kg) = state
            .scans
            .iter()
            .find(|s| s.scan_id == scan_id && s.user_id == user_id)
            .map(|s| (i64::from(s.points_awarded), s.co2_saved_kg))
            .ok_or(StorageError::NotFound)?;

        let now = state.next_timestamp();
        let newly_credited = state.credited.insert(scan_id);
        let profile = state.profile_entry(user_id, now);
        if newly_credited {
            profile.total_points += points;
            profile.total_co2_saved_kg += co2_saved_kg;
            profile.updated_at = now;
        }

        Ok(profile.clone())
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        let state = self.state.lock().await;
        Ok(state.profiles.get(&user_id).cloned())
    }

    async fn set_username(&self, user_id: Uuid, username: &str) -> Result<UserProfile> {
        let mut state = self.state.lock().await;
        let now = state.next_timestamp();
        let profile = state.profile_entry(user_id, now);
        profile.username = Some(username.to_string());
        profile.updated_at = now;

        Ok(profile.clone())
    }

    async fn top_profiles(&self, limit: i64) -> Result<Vec<RankedProfile>> {
        let state = self.state.lock().await;
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(state.ranked().into_iter().take(limit).collect())
    }

    async fn rank_of(&self, user_id: Uuid) -> Result<Option<RankedProfile>> {
        let state = self.state.lock().await;
        Ok(state
            .ranked()
            .into_iter()
            .find(|entry| entry.profile.user_id == user_id))
    }

    async fn recompute_totals(&self, user_id: Uuid) -> Result<UserProfile> {
        let mut state = self.state.lock().await;

        let scan_ids: Vec<Uuid> = state
            .scans
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.scan_id)
            .collect();
        let (points, co2) = state
            .scans
            .iter()
            .filter(|s| s.user_id == user_id)
            .fold((0i64, Decimal::ZERO), |(p, c), s| {
                (p + i64::from(s.points_awarded), c + s.co2_saved_kg)
            });

        if scan_ids.is_empty() && !state.profiles.contains_key(&user_id) {
            return Err(StorageError::NotFound);
        }

        state.credited.extend(scan_ids);

        let now = state.next_timestamp();
        let profile = state.profile_entry(user_id, now);
        profile.total_points = points;
        profile.total_co2_saved_kg = co2;
        profile.updated_at = now;

        Ok(profile.clone())
    }
}
