//! §4.4 step 8: derive the scale-out/scale-in CPU-utilisation
//! thresholds from the current worst-case spot headroom.
pub struct ScaleThresholds {
    pub scale_out: f64,
    pub scale_in: f64,
}

pub fn derive(on_demand_total: f64, spot_worst_case: f64, spot_total: f64, max_cpu_util: f64, delta: f64) -> ScaleThresholds {
    let scale_out = max_cpu_util * (on_demand_total + spot_worst_case) / (on_demand_total + spot_total);
    ScaleThresholds {
        scale_out,
        scale_in: scale_out - delta,
    }
}
