//! The reconciler tick (§4.4): sixteen strictly ordered steps. Any step
//! returning an error aborts the tick, not the process — the reconciler
//! loop (in the `autoscaler` binary) is the retry mechanism.
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, field, info, instrument, warn};

use capacity::{Instance, capacity_map_of, diff};
use cloudapi::{AmiResolver, CloudClient, HookEvent, HookRunner, MetricSource};
use store::StatusStore;

use crate::caps;
use crate::config::EngineConfig;
use crate::eligibility::{self, CooldownGate};
use crate::error::EngineError;
use crate::metrics;
use crate::price_filter;
use crate::search;
use crate::thresholds;
use crate::types::{NoOpReason, ScalingPlan, TickReport};

/// Owns the tick-relevant collaborators. Generic (rather than trait
/// objects) so a binary target monomorphises to its concrete
/// implementations, mirroring `SchedulerEngine<S: SessionStore>`.
pub struct Engine<C, M, A, H, S>
where
    C: CloudClient,
    M: MetricSource,
    A: AmiResolver,
    H: HookRunner,
    S: StatusStore,
{
    config: EngineConfig,
    cloud: Arc<C>,
    metric: Arc<M>,
    ami: Arc<A>,
    hooks: Arc<H>,
    store: Arc<S>,
}

impl<C, M, A, H, S> Engine<C, M, A, H, S>
where
    C: CloudClient,
    M: MetricSource,
    A: AmiResolver,
    H: HookRunner,
    S: StatusStore,
{
    pub fn new(
        config: EngineConfig,
        cloud: Arc<C>,
        metric: Arc<M>,
        ami: Arc<A>,
        hooks: Arc<H>,
        store: Arc<S>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            cloud,
            metric,
            ami,
            hooks,
            store,
        })
    }

    #[instrument(
        skip(self),
        target = "engine",
        fields(outcome = field::Empty)
    )]
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<TickReport, EngineError> {
        // Step 1: expire schedules.
        for schedule in self.store.list_schedules().await? {
            if schedule.is_expired_at(now) {
                debug!(key = %schedule.key, "expiring schedule");
                self.store.remove_schedule(&schedule.key).await?;
            }
        }

        // Step 2: fire expired timers.
        for name in self.store.get_expired_timer_names(now).await? {
            self.fire_timer(&name).await?;
        }

        // Step 3: tag propagation is an external-collaborator concern;
        // `CloudClient::launch` is treated as a single atomic fulfilment
        // unit, so there is nothing to reconcile here (see DESIGN.md).

        // Step 4: gather observations.
        let instances = self.cloud.list_working_instances().await?;
        let on_demand = capacity_map_of(capacity::filter_market(&instances, capacity::Market::OnDemand).iter());
        let spot = capacity_map_of(capacity::filter_market(&instances, capacity::Market::Spot).iter());
        let prices = self.cloud.current_spot_prices(&self.config.configured_varieties).await?;
        let allowed = price_filter::allowed_varieties(
            &self.config.configured_varieties,
            &prices,
            &self.config.bidding_price_by_type,
            self.config.max_terminated_varieties,
        )?;
        let u = self.metric.read().await?;

        // Step 5: publish observability, regardless of what follows.
        let spot_worst_case = spot.total_in_worst_case(self.config.max_terminated_varieties);
        let scale_thresholds = thresholds::derive(
            on_demand.total(),
            spot_worst_case,
            spot.total(),
            self.config.max_cpu_util,
            self.config.scale_in_threshold,
        );
        let snapshot = metrics::snapshot(
            on_demand.total(),
            spot.total(),
            allowed.len(),
            self.config.configured_varieties.len() - allowed.len(),
            spot_worst_case,
            &scale_thresholds,
            u,
        );
        self.store.store_metrics(snapshot).await?;

        // Step 6: cooldown gate.
        let cooldown_ends_at = self.store.fetch_cooldown_ends_at().await?;
        if eligibility::check_cooldown(now, cooldown_ends_at) == CooldownGate::Active {
            info!(ends_at = %cooldown_ends_at, "tick suppressed by cooldown");
            tracing::Span::current().record("outcome", "cooldown_active");
            return Ok(TickReport::NoOp(NoOpReason::CooldownActive));
        }

        // Step 7: resolve active schedule.
        let schedules = self.store.list_schedules().await?;
        let active_schedule = eligibility::resolve_active_schedule(&schedules, now).cloned();

        // Step 9: decide.
        let schedule_plan = match &active_schedule {
            Some(schedule) => Some(search::schedule_driven(
                &allowed,
                &self.config.capacity_table,
                schedule.capacity,
                on_demand.total(),
                self.config.max_terminated_varieties,
            )?),
            None => None,
        };

        let metric_applies = active_schedule.is_some()
            || u <= scale_thresholds.scale_in
            || u >= scale_thresholds.scale_out;
        let metric_plan = if metric_applies {
            Some(search::metric_driven(
                &allowed,
                &self.config.capacity_table,
                u,
                self.config.max_cpu_util,
                self.config.scale_in_threshold,
                on_demand.total(),
                spot.total(),
                self.config.max_terminated_varieties,
            )?)
        } else {
            None
        };

        let desired = search::combine(self.config.max_terminated_varieties, metric_plan, schedule_plan);
        let Some(desired) = desired else {
            debug!("no scaling signal this tick");
            tracing::Span::current().record("outcome", "no_scaling_signal");
            return Ok(TickReport::NoOp(NoOpReason::NoScalingSignal));
        };

        // Step 10: enforce global caps.
        caps::enforce(&desired, self.config.min_capacity, self.config.max_capacity)?;

        // Step 11: compute delta.
        let mut delta = diff(&spot, &desired, &self.config.capacity_table)?;
        if active_schedule.is_some() || self.config.prohibit_scale_in {
            delta = delta.strip_negatives();
        }

        // Step 12: early exit.
        if delta.is_empty() {
            debug!("delta is empty; nothing to do");
            tracing::Span::current().record("outcome", "empty_delta");
            return Ok(TickReport::NoOp(NoOpReason::EmptyDelta));
        }

        // Step 13: resolve AMI.
        let ami = self.ami.resolve().await?;
        if ami.is_empty() {
            warn!("AMI resolver returned an empty string; aborting tick");
            return Err(EngineError::Transient("AMI resolver returned an empty string".to_string()));
        }

        // Step 14: run the scaling hook.
        let detail = serde_json::to_value(
            delta
                .iter()
                .map(|(v, c)| (format!("{}/{}", v.instance_type, v.subnet.subnet_id), c))
                .collect::<std::collections::HashMap<_, _>>(),
        )
        .map_err(|e| EngineError::Fatal(format!("encoding scaling hook detail: {e}")))?;
        self.hooks
            .run(&HookEvent {
                event: "scaling".to_string(),
                message: format!("applying {} variety changes", delta.len()),
                detail,
            })
            .await
            .map_err(|e| EngineError::HookFailure(e.to_string()))?;

        // Step 15: arm cooldown before dispatch, so a partial failure
        // still consumes it.
        let cooldown = chrono::Duration::from_std(self.config.cooldown)
            .map_err(|e| EngineError::Configuration(format!("invalid cooldown duration: {e}")))?;
        let new_cooldown = cooldown_ends_at.max(now) + cooldown;
        self.store.store_cooldown_ends_at(new_cooldown).await?;

        info!(changes = delta.len(), "tick produced a scaling plan");
        tracing::Span::current().record("outcome", "scale");
        Ok(TickReport::Scale(ScalingPlan { delta, ami, instances }))
    }

    async fn fire_timer(&self, name: &str) -> Result<(), EngineError> {
        match self.config.timers.get(name) {
            Some(command) => {
                if let Err(e) = command.get_string().await {
                    warn!(timer = name, error = %e, "timer command failed");
                }
            }
            None => {
                warn!(timer = name, "no command configured for expired timer");
            }
        }
        self.store.delete_timer(name).await?;
        Ok(())
    }

    /// Used by the dispatch crate to know which instances are eligible
    /// for termination (§9 "Managed filter").
    pub fn managed_instances<'a>(&self, instances: &'a [Instance]) -> Vec<&'a Instance> {
        capacity::filter_managed(instances, &self.config.owner_id)
    }
}
