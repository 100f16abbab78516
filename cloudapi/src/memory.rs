//! In-memory mocks of the external collaborators, for engine tests. Not
//! used by the production binary.
use std::sync::Mutex;

use async_trait::async_trait;
use capacity::{Instance, Variety};

use crate::error::CloudError;
use crate::traits::{AmiResolver, CloudClient, MetricSource};
use crate::types::SpotPrices;

pub struct InMemoryCloudClient {
    instances: Mutex<Vec<Instance>>,
    prices: Mutex<SpotPrices>,
    next_id: Mutex<u64>,
    owner_id: String,
}

impl InMemoryCloudClient {
    pub fn new(owner_id: impl Into<String>, instances: Vec<Instance>, prices: SpotPrices) -> Self {
        Self {
            instances: Mutex::new(instances),
            prices: Mutex::new(prices),
            next_id: Mutex::new(0),
            owner_id: owner_id.into(),
        }
    }

    pub fn instances_snapshot(&self) -> Vec<Instance> {
        self.instances.lock().unwrap().clone()
    }
}

#[async_trait]
impl CloudClient for InMemoryCloudClient {
    async fn list_working_instances(&self) -> Result<Vec<Instance>, CloudError> {
        Ok(self.instances.lock().unwrap().clone())
    }

    async fn current_spot_prices(&self, varieties: &[Variety]) -> Result<SpotPrices, CloudError> {
        let prices = self.prices.lock().unwrap();
        let mut out = SpotPrices::new();
        for v in varieties {
            if let Some(p) = prices.get(v) {
                out.insert(v.clone(), *p);
            }
        }
        Ok(out)
    }

    async fn launch(&self, variety: &Variety, count: u32, _ami: &str) -> Result<(), CloudError> {
        let capacity = {
            let guard = self.instances.lock().unwrap();
            guard
                .iter()
                .find(|i| i.variety == *variety)
                .map(|i| i.capacity)
                .unwrap_or(1.0)
        };

        let mut next_id = self.next_id.lock().unwrap();
        let mut guard = self.instances.lock().unwrap();
        for _ in 0..count {
            *next_id += 1;
            guard.push(
                Instance::new(format!("i-{next_id}"), variety.clone(), capacity, capacity::Market::Spot)
                    .with_tag("ManagedBy", &self.owner_id),
            );
        }
        Ok(())
    }

    async fn terminate_by_count(
        &self,
        managed_instances: &[Instance],
        variety: &Variety,
        count: u32,
    ) -> Result<(), CloudError> {
        let victims: Vec<String> = managed_instances
            .iter()
            .filter(|i| i.variety == *variety)
            .take(count as usize)
            .map(|i| i.id.clone())
            .collect();

        let mut guard = self.instances.lock().unwrap();
        guard.retain(|i| !victims.contains(&i.id));
        Ok(())
    }
}

pub struct FixedMetricSource(pub f64);

#[async_trait]
impl MetricSource for FixedMetricSource {
    async fn read(&self) -> Result<f64, CloudError> {
        Ok(self.0)
    }
}

pub struct FixedAmiResolver(pub String);

#[async_trait]
impl AmiResolver for FixedAmiResolver {
    async fn resolve(&self) -> Result<String, CloudError> {
        Ok(self.0.clone())
    }
}

pub struct NoOpHookRunner {
    pub invocations: Mutex<Vec<crate::types::HookEvent>>,
}

impl NoOpHookRunner {
    pub fn new() -> Self {
        Self {
            invocations: Mutex::new(Vec::new()),
        }
    }
}

impl Default for NoOpHookRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl crate::traits::HookRunner for NoOpHookRunner {
    async fn run(&self, event: &crate::types::HookEvent) -> Result<(), CloudError> {
        self.invocations.lock().unwrap().push(event.clone());
        Ok(())
    }
}
