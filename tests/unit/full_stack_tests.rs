//! Orders travelling service -> admission -> matcher -> external venue.

#[cfg(test)]
mod full_stack_tests {
    use crate::common::*;
    use rust_decimal::Decimal;
    use venue_core::admission::{RiskParameters, RiskState};
    use venue_core::matcher::INTERNAL_MARKET;
    use venue_core::order::{Account, CurrencyId, OrderStatus};

    #[test]
    fn test_internal_cross_updates_both_accounts() {
        let venue = venue();
        let bid = venue
            .service
            .submit(&session("buyer"), limit("buyer", Side::Buy, 1000, price(100)));
        assert!(wait_until(|| bid.status() == OrderStatus::New));

        let ask = venue
            .service
            .submit(&session("seller"), limit("seller", Side::Sell, 100, price(100)));
        assert!(wait_until(|| ask.status() == OrderStatus::Filled));
        assert!(wait_until(|| bid.status() == OrderStatus::PartiallyFilled));
        assert_eq!(bid.remaining_quantity(), 900);
        assert_eq!(ask.last_report().last_market, INTERNAL_MARKET);

        // The seller held nothing, so the ask was short.
        assert_eq!(venue.service.is_short_sale(ask.id()), Some(true));
        assert_eq!(venue.service.is_short_sale(bid.id()), Some(false));
        assert_eq!(venue.service.position(&Account::new("buyer"), &security()), 100);
        assert_eq!(venue.service.position(&Account::new("seller"), &security()), -100);

        // 900 pending at 1.00 plus 100 paid for.
        assert_eq!(
            venue.buying_power.buying_power_used(&Account::new("buyer")),
            Decimal::new(1000, 0)
        );
        assert_eq!(
            venue.buying_power.buying_power_used(&Account::new("seller")),
            Decimal::new(100, 0)
        );

        // The remainder went back out under the routing account.
        assert!(wait_until(|| venue.driver.submissions().len() == 2));
        assert_eq!(
            venue.driver.submissions()[1].submission_account,
            Account::new("root")
        );
        assert_eq!(venue.engine.snapshot(&security()).bid_quantity(), 900);
    }

    #[test]
    fn test_rejections_carry_reason() {
        let venue = venue();
        let odd_lot = venue
            .service
            .submit(&session("buyer"), limit("buyer", Side::Buy, 150, price(100)));
        assert_eq!(odd_lot.status(), OrderStatus::Rejected);
        assert_eq!(odd_lot.last_report().text, "Quantity must be a multiple of 100.");

        venue.buying_power.set_risk_parameters(
            &Account::new("buyer"),
            RiskParameters::new(CurrencyId::new("USD"), Decimal::new(500, 0)),
        );
        let too_large = venue
            .service
            .submit(&session("buyer"), limit("buyer", Side::Buy, 1000, price(100)));
        assert_eq!(too_large.status(), OrderStatus::Rejected);
        assert_eq!(
            too_large.last_report().text,
            "Order exceeds available buying power."
        );
        assert!(venue.driver.submissions().is_empty());
    }

    #[test]
    fn test_later_rejection_rolls_back_buying_power() {
        let venue = venue();
        venue
            .risk_state
            .set_state(&Account::new("buyer"), RiskState::Disabled);
        let order = venue
            .service
            .submit(&session("buyer"), limit("buyer", Side::Buy, 1000, price(100)));
        assert_eq!(order.status(), OrderStatus::Rejected);
        assert_eq!(order.last_report().text, "Account is disabled.");
        assert_eq!(
            venue.buying_power.buying_power_used(&Account::new("buyer")),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_missing_quote_rejects() {
        let venue = venue();
        venue.quotes.clear(&security());
        let order = venue
            .service
            .submit(&session("buyer"), limit("buyer", Side::Buy, 100, price(100)));
        assert_eq!(order.status(), OrderStatus::Rejected);
        assert_eq!(order.last_report().text, "No BBO quote available.");
    }

    #[test]
    fn test_self_cross_is_refused() {
        let venue = venue();
        let ask = venue
            .service
            .submit(&session("trader"), limit("trader", Side::Sell, 100, price(101)));
        assert!(wait_until(|| ask.status() == OrderStatus::New));

        let bid = venue
            .service
            .submit(&session("trader"), limit("trader", Side::Buy, 100, price(101)));
        assert_eq!(bid.status(), OrderStatus::Rejected);
        assert_eq!(
            bid.last_report().text,
            format!("Order would cross the account's own order {}.", ask.id())
        );
    }

    #[test]
    fn test_cancel_releases_buying_power() {
        let venue = venue();
        let bid = venue
            .service
            .submit(&session("buyer"), limit("buyer", Side::Buy, 1000, price(100)));
        assert!(wait_until(|| bid.status() == OrderStatus::New));
        assert_eq!(
            venue.buying_power.buying_power_used(&Account::new("buyer")),
            Decimal::new(1000, 0)
        );

        venue.service.cancel(&session("buyer"), bid.id()).unwrap();
        assert!(wait_until(|| bid.status() == OrderStatus::Canceled));
        assert_eq!(
            venue.buying_power.buying_power_used(&Account::new("buyer")),
            Decimal::ZERO
        );
        assert!(venue.engine.snapshot(&security()).bids.is_empty());
    }

    #[test]
    fn test_external_fill_enables_closing_orders() {
        let venue = venue();
        let bid = venue
            .service
            .submit(&session("buyer"), limit("buyer", Side::Buy, 100, price(100)));
        assert!(wait_until(|| bid.status() == OrderStatus::New));

        venue.driver.fill(bid.id(), 100, price(100)).unwrap();
        assert!(wait_until(|| bid.status() == OrderStatus::Filled));
        assert!(wait_until(|| {
            venue.risk_state.position(&Account::new("buyer"), &security()) == 100
        }));

        venue
            .risk_state
            .set_state(&Account::new("buyer"), RiskState::CloseOrders);
        let opening = venue
            .service
            .submit(&session("buyer"), limit("buyer", Side::Buy, 100, price(100)));
        assert_eq!(
            opening.last_report().text,
            "Only orders closing the current position are permitted."
        );

        let closing = venue
            .service
            .submit(&session("buyer"), limit("buyer", Side::Sell, 100, price(101)));
        assert!(wait_until(|| closing.status() == OrderStatus::New));
        assert_eq!(venue.service.is_short_sale(closing.id()), Some(false));
    }
}
