#[cfg(test)]
mod tests {
    use crate::admission::{AdmissionPipeline, SubmissionCheck, SubmissionCheckError};
    use crate::matcher::{ExecutionDriver, SimulatedExecutionDriver};
    use crate::order::{
        Account, CurrencyId, ExecutionReport, Order, OrderFields, OrderId, OrderInfo, OrderStatus,
        SequencedOrderRecord, Security,
    };
    use crate::utils::ManualClock;
    use parking_lot::Mutex;
    use pricelevel::Side;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    struct RecordingCheck {
        name: String,
        fail: bool,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingCheck {
        fn new(name: &str, fail: bool, log: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                fail,
                log: Arc::clone(log),
            })
        }
    }

    impl SubmissionCheck for RecordingCheck {
        fn name(&self) -> &str {
            &self.name
        }

        fn submit(&self, _info: &OrderInfo) -> Result<(), SubmissionCheckError> {
            self.log.lock().push(format!("{}:submit", self.name));
            if self.fail {
                return Err(SubmissionCheckError::Compliance {
                    rule: self.name.clone(),
                    reason: "refused".to_string(),
                });
            }
            Ok(())
        }

        fn add(&self, _order: &Arc<Order>) {
            self.log.lock().push(format!("{}:add", self.name));
        }

        fn reject(&self, _info: &OrderInfo) {
            self.log.lock().push(format!("{}:reject", self.name));
        }
    }

    fn info(id: u64) -> OrderInfo {
        let fields = OrderFields::limit(
            Account::new("trader_a"),
            Security::new("TST", "XNAS"),
            CurrencyId::new("USD"),
            Side::Buy,
            "XNAS",
            100,
            Decimal::ONE,
        );
        OrderInfo::new(fields, Account::new("trader_a"), OrderId(id), false, 1)
    }

    fn pipeline(
        checks: Vec<Arc<RecordingCheck>>,
    ) -> (AdmissionPipeline, Arc<SimulatedExecutionDriver>) {
        let clock = Arc::new(ManualClock::new(1, 1));
        let driver = Arc::new(SimulatedExecutionDriver::new(clock.clone()));
        let mut pipeline = AdmissionPipeline::new(driver.clone(), clock);
        for check in checks {
            pipeline = pipeline.with_check(check);
        }
        (pipeline, driver)
    }

    #[test]
    fn test_admitted_order_reaches_driver_and_every_check() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (pipeline, driver) = pipeline(vec![
            RecordingCheck::new("a", false, &log),
            RecordingCheck::new("b", false, &log),
        ]);
        let order = pipeline.submit(&info(1));

        assert_eq!(order.status(), OrderStatus::New);
        assert_eq!(driver.submissions().len(), 1);
        assert_eq!(*log.lock(), vec!["a:submit", "b:submit", "a:add", "b:add"]);
        assert_eq!(pipeline.check_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_failure_rolls_back_passed_checks_in_reverse() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (pipeline, driver) = pipeline(vec![
            RecordingCheck::new("a", false, &log),
            RecordingCheck::new("b", false, &log),
            RecordingCheck::new("c", true, &log),
            RecordingCheck::new("d", false, &log),
        ]);
        let order = pipeline.submit(&info(1));

        assert_eq!(order.status(), OrderStatus::Rejected);
        assert_eq!(order.last_report().text, "refused");
        assert!(driver.submissions().is_empty());
        assert_eq!(
            *log.lock(),
            vec!["a:submit", "b:submit", "c:submit", "b:reject", "a:reject"]
        );
    }

    #[test]
    fn test_first_check_failing_rejects_nothing() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (pipeline, _) = pipeline(vec![
            RecordingCheck::new("a", true, &log),
            RecordingCheck::new("b", false, &log),
        ]);
        let order = pipeline.submit(&info(1));
        assert_eq!(order.status(), OrderStatus::Rejected);
        assert_eq!(*log.lock(), vec!["a:submit"]);
    }

    #[test]
    fn test_recover_skips_submission_checks() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (pipeline, _) = pipeline(vec![RecordingCheck::new("a", true, &log)]);
        let initial = ExecutionReport::initial(OrderId(7), 1);
        let accepted = ExecutionReport::updated(&initial, OrderStatus::New, 2);
        let record = SequencedOrderRecord {
            sequence: 3,
            info: info(7),
            reports: vec![initial, accepted],
        };

        let order = pipeline.recover(&record).unwrap();
        assert_eq!(order.status(), OrderStatus::New);
        assert_eq!(*log.lock(), vec!["a:add"]);
    }
}
