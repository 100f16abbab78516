//! Applies an `engine::ScalingPlan` through a `CloudClient` (§4.4 step
//! 16). Kept out of the `engine` crate so the decision itself never
//! needs write access to the cloud backend, mirroring the teacher's
//! `executor::swap_builder` adapter sitting downstream of the scheduler.
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use capacity::filter_managed;
use cloudapi::CloudClient;
use engine::ScalingPlan;
use store::StatusStore;

use crate::error::DispatchError;
use crate::timer_rule::TimerRule;

/// The event name the original arms after any launch dispatch
/// (original_source `lib/runner.go`'s `r.updateTimer("LaunchingInstances")`).
pub const LAUNCHING_INSTANCES_EVENT: &str = "LaunchingInstances";

pub struct DispatchConfig {
    pub owner_id: String,
    pub timer_rules: Vec<TimerRule>,
}

pub struct Dispatcher<C, S>
where
    C: CloudClient,
    S: StatusStore,
{
    config: DispatchConfig,
    cloud: Arc<C>,
    store: Arc<S>,
}

impl<C, S> Dispatcher<C, S>
where
    C: CloudClient,
    S: StatusStore,
{
    pub fn new(config: DispatchConfig, cloud: Arc<C>, store: Arc<S>) -> Self {
        Self { config, cloud, store }
    }

    /// Launches and terminates per `plan.delta`, arming the
    /// `LaunchingInstances` timer before each launch call (§4.4 step 16).
    /// Each variety's launch/terminate call is independent: a failure on
    /// one variety does not prevent the others from being attempted, so
    /// a partial failure leaves the fleet partway reconciled for the
    /// next tick to pick up (§7: "failed fulfilments are observed on the
    /// next tick").
    pub async fn apply(&self, plan: &ScalingPlan, now: DateTime<Utc>) -> Result<(), DispatchError> {
        let managed: Vec<_> = filter_managed(&plan.instances, &self.config.owner_id)
            .into_iter()
            .cloned()
            .collect();

        let mut first_err = None;

        for (variety, count) in plan.delta.iter() {
            if count > 0 {
                if let Err(e) = self.arm_timers_for_event(LAUNCHING_INSTANCES_EVENT, now).await {
                    warn!(error = %e, "failed to arm LaunchingInstances timer");
                    first_err.get_or_insert(e);
                }

                info!(instance_type = %variety.instance_type, count, "launching instances");
                if let Err(e) = self.cloud.launch(variety, count as u32, &plan.ami).await {
                    warn!(instance_type = %variety.instance_type, error = %e, "launch failed");
                    first_err.get_or_insert(e.into());
                }
            } else if count < 0 {
                info!(instance_type = %variety.instance_type, count, "terminating instances");
                if let Err(e) = self
                    .cloud
                    .terminate_by_count(&managed, variety, (-count) as u32)
                    .await
                {
                    warn!(instance_type = %variety.instance_type, error = %e, "termination failed");
                    first_err.get_or_insert(e.into());
                }
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn arm_timers_for_event(&self, event: &str, now: DateTime<Utc>) -> Result<(), DispatchError> {
        for rule in &self.config.timer_rules {
            if rule.after != event {
                continue;
            }
            let span = chrono::Duration::from_std(rule.duration).map_err(|source| DispatchError::InvalidDuration {
                name: rule.key.clone(),
                source,
            })?;
            self.store.update_timer(&rule.key, now + span).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capacity::{Instance, Market, Subnet, Variety};
    use cloudapi::{InMemoryCloudClient, SpotPrices};
    use engine::ScalingPlan;
    use std::time::Duration;
    use store::InMemoryStatusStore;

    fn v(ty: &str) -> Variety {
        Variety::new(ty, Subnet { subnet_id: "s1".into(), availability_zone: "az-a".into() })
    }

    fn plan(delta: capacity::Delta, instances: Vec<Instance>) -> ScalingPlan {
        ScalingPlan {
            delta,
            ami: "ami-123".to_string(),
            instances,
        }
    }

    #[tokio::test]
    async fn launching_arms_the_configured_timer() {
        let cloud = Arc::new(InMemoryCloudClient::new("my-asg", vec![], SpotPrices::new()));
        let store = Arc::new(InMemoryStatusStore::new());
        let dispatcher = Dispatcher::new(
            DispatchConfig {
                owner_id: "my-asg".into(),
                timer_rules: vec![TimerRule::new(
                    "launchingInstances",
                    LAUNCHING_INSTANCES_EVENT,
                    Duration::from_secs(300),
                )],
            },
            cloud.clone(),
            store.clone(),
        );

        let mut delta = std::collections::HashMap::new();
        delta.insert(v("c4.large"), 2i64);
        let delta = capacity::diff(
            &capacity::CapacityMap::empty(),
            &capacity::CapacityMap::from_map(std::collections::HashMap::from([(v("c4.large"), 20.0)])),
            &capacity::CapacityTable::new(std::collections::HashMap::from([("c4.large".to_string(), 10.0)])).unwrap(),
        )
        .unwrap();

        let now = Utc::now();
        dispatcher.apply(&plan(delta, vec![]), now).await.unwrap();

        let timers = store.list_timers().await.unwrap();
        assert_eq!(timers.len(), 1);
        assert_eq!(timers[0].name, "launchingInstances");

        let launched = cloud.instances_snapshot();
        assert_eq!(launched.len(), 2);
    }

    #[tokio::test]
    async fn terminating_only_touches_managed_instances() {
        let managed = Instance::new("i-1", v("c4.large"), 10.0, Market::Spot).with_tag("ManagedBy", "my-asg");
        let unmanaged = Instance::new("i-2", v("c4.large"), 10.0, Market::Spot);
        let seed = vec![managed.clone(), unmanaged.clone()];

        let cloud = Arc::new(InMemoryCloudClient::new("my-asg", seed.clone(), SpotPrices::new()));
        let store = Arc::new(InMemoryStatusStore::new());
        let dispatcher = Dispatcher::new(
            DispatchConfig { owner_id: "my-asg".into(), timer_rules: vec![] },
            cloud.clone(),
            store,
        );

        let mut by_variety = std::collections::HashMap::new();
        by_variety.insert(v("c4.large"), -1i64);
        let delta = capacity::diff(
            &capacity::CapacityMap::from_map(std::collections::HashMap::from([(v("c4.large"), 20.0)])),
            &capacity::CapacityMap::from_map(std::collections::HashMap::from([(v("c4.large"), 10.0)])),
            &capacity::CapacityTable::new(std::collections::HashMap::from([("c4.large".to_string(), 10.0)])).unwrap(),
        )
        .unwrap();
        let _ = by_variety;

        dispatcher.apply(&plan(delta, seed), Utc::now()).await.unwrap();

        let remaining = cloud.instances_snapshot();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "i-2");
    }
}
