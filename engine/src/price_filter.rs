//! Price filter (§4.3): excludes varieties whose current spot price
//! exceeds the configured bid for their instance type.
use std::collections::HashMap;

use capacity::Variety;
use cloudapi::SpotPrices;
use tracing::{debug, warn};

use crate::error::EngineError;

/// Returns the subset of `configured_varieties` whose current price is
/// at or below the configured bid. A variety with no configured bid is
/// a fatal configuration error, not merely excluded.
pub fn allowed_varieties(
    configured_varieties: &[Variety],
    prices: &SpotPrices,
    bidding_price_by_type: &HashMap<String, f64>,
    k: usize,
) -> Result<Vec<Variety>, EngineError> {
    let mut allowed = Vec::new();
    let mut unavailable = 0usize;

    for variety in configured_varieties {
        let bid = bidding_price_by_type
            .get(&variety.instance_type)
            .ok_or_else(|| {
                EngineError::Configuration(format!(
                    "bidding price for {} is unknown",
                    variety.instance_type
                ))
            })?;

        match prices.get(variety) {
            Some(price) if price <= bid => allowed.push(variety.clone()),
            Some(price) => {
                debug!(instance_type = %variety.instance_type, price, bid, "excluded from allowed: price above bid");
                unavailable += 1;
            }
            None => {
                debug!(instance_type = %variety.instance_type, "excluded from allowed: no current price observed");
                unavailable += 1;
            }
        }
    }

    debug!(available = allowed.len(), unavailable, "price filter applied");

    if allowed.len().saturating_sub(k) < 1 {
        warn!(
            available = allowed.len(),
            k, "too few available varieties for the worst-case guarantee to hold"
        );
    }

    Ok(allowed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use capacity::Subnet;

    fn v(ty: &str) -> Variety {
        Variety::new(ty, Subnet { subnet_id: "s".into(), availability_zone: "az-a".into() })
    }

    #[test]
    fn excludes_varieties_above_bid() {
        let configured = vec![v("c4.large"), v("m4.large")];
        let prices = SpotPrices::from([(v("c4.large"), 0.05), (v("m4.large"), 0.20)]);
        let bids = HashMap::from([("c4.large".to_string(), 0.10), ("m4.large".to_string(), 0.10)]);

        let allowed = allowed_varieties(&configured, &prices, &bids, 1).unwrap();

        assert_eq!(allowed, vec![v("c4.large")]);
    }

    #[test]
    fn missing_bid_is_fatal_configuration_error() {
        let configured = vec![v("c4.large")];
        let prices = SpotPrices::from([(v("c4.large"), 0.05)]);
        let bids = HashMap::new();

        let err = allowed_varieties(&configured, &prices, &bids, 1).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn missing_price_excludes_without_erroring() {
        let configured = vec![v("c4.large")];
        let prices = SpotPrices::new();
        let bids = HashMap::from([("c4.large".to_string(), 0.10)]);

        let allowed = allowed_varieties(&configured, &prices, &bids, 1).unwrap();
        assert!(allowed.is_empty());
    }
}
