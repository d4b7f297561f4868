//! Rehydrating stored orders without re-running admission.

#[cfg(test)]
mod recovery_tests {
    use crate::common::*;
    use rust_decimal::Decimal;
    use venue_core::order::{
        Account, ExecutionReport, OrderId, OrderInfo, OrderStatus, SequencedOrderRecord,
    };
    use venue_core::{EngineConfig, ServiceError};

    fn record(id: u64, side: Side, quantity: u64, filled: u64) -> SequencedOrderRecord {
        let info = OrderInfo::new(
            limit("buyer", side, quantity, price(100)),
            Account::new("buyer"),
            OrderId(id),
            false,
            10,
        );
        let initial = ExecutionReport::initial(OrderId(id), 10);
        let accepted = ExecutionReport::updated(&initial, OrderStatus::New, 11);
        let mut reports = vec![initial, accepted];
        if filled > 0 {
            let last = reports[1].clone();
            reports.push(
                ExecutionReport::updated(&last, OrderStatus::PartiallyFilled, 12)
                    .with_fill(filled, price(100)),
            );
        }
        SequencedOrderRecord {
            sequence: id,
            info,
            reports,
        }
    }

    #[test]
    fn test_recovered_order_counts_against_buying_power() {
        let venue = venue();
        let order = venue
            .service
            .recover(&record(500, Side::Buy, 1000, 0))
            .unwrap();
        assert_eq!(order.status(), OrderStatus::New);
        assert_eq!(
            venue.buying_power.buying_power_used(&Account::new("buyer")),
            Decimal::new(1000, 0)
        );
        // Nothing was submitted again.
        assert!(venue.driver.submissions().is_empty());
    }

    #[test]
    fn test_recovered_fills_rebuild_positions() {
        let venue = venue();
        let order = venue
            .service
            .recover(&record(500, Side::Buy, 1000, 400))
            .unwrap();
        assert_eq!(order.remaining_quantity(), 600);
        assert_eq!(venue.service.position(&Account::new("buyer"), &security()), 400);
        assert_eq!(
            venue.risk_state.position(&Account::new("buyer"), &security()),
            400
        );

        venue.driver.fill(OrderId(500), 600, price(100)).unwrap();
        assert!(wait_until(|| order.status() == OrderStatus::Filled));
        assert_eq!(venue.service.position(&Account::new("buyer"), &security()), 1000);
        assert_eq!(
            venue.buying_power.buying_power_used(&Account::new("buyer")),
            Decimal::new(1000, 0)
        );
    }

    #[test]
    fn test_gapped_record_is_refused() {
        let venue = venue_with(EngineConfig::default());
        let mut broken = record(500, Side::Buy, 1000, 400);
        broken.reports.remove(1);
        assert!(matches!(
            venue.service.recover(&broken),
            Err(ServiceError::Recovery(_))
        ));
        assert!(venue.service.order(OrderId(500)).is_none());
    }
}
