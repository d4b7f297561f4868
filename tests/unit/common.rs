//! Assembles the full order path over an in-memory external venue.

use rust_decimal::Decimal;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use venue_core::admission::{
    BoardLotCheck, BuyingPowerCheck, ComplianceCheck, MaxOrderQuantityRule, OpposingOrderRule,
    RiskStateCheck,
};
use venue_core::matcher::{
    BboQuote, CachedQuoteSource, SimulatedExecutionDriver, TaggingMatchReportBuilder,
};
use venue_core::order::{Account, CurrencyId, OrderFields, Security, Session};
use venue_core::{
    AdmissionPipeline, EngineConfig, InternalMatchingEngine, ManualClock, MatcherContext,
    OrderSubmissionService, SequentialIdentitySource,
};

pub use pricelevel::Side;

pub struct Venue {
    pub service: OrderSubmissionService,
    pub engine: Arc<InternalMatchingEngine>,
    pub driver: Arc<SimulatedExecutionDriver>,
    pub quotes: Arc<CachedQuoteSource>,
    pub buying_power: Arc<BuyingPowerCheck>,
    pub risk_state: Arc<RiskStateCheck>,
}

pub fn security() -> Security {
    Security::new("TST", "XNAS")
}

pub fn price(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

pub fn session(account: &str) -> Session {
    Session::new(Account::new(account))
}

pub fn limit(account: &str, side: Side, quantity: u64, price: Decimal) -> OrderFields {
    OrderFields::limit(
        Account::new(account),
        security(),
        CurrencyId::new("USD"),
        side,
        "XNAS",
        quantity,
        price,
    )
}

pub fn venue() -> Venue {
    venue_with(EngineConfig::default())
}

pub fn venue_with(config: EngineConfig) -> Venue {
    let clock = Arc::new(ManualClock::new(1_000, 1));
    let quotes = Arc::new(CachedQuoteSource::new());
    quotes.publish(&security(), BboQuote::new(price(100), price(101), 0));
    let driver = Arc::new(SimulatedExecutionDriver::new(clock.clone()));
    let engine = Arc::new(InternalMatchingEngine::new(MatcherContext {
        root_account: config.root_account.clone(),
        report_builder: Arc::new(TaggingMatchReportBuilder::default()),
        quotes: quotes.clone(),
        clock: clock.clone(),
        identities: Arc::new(SequentialIdentitySource::new(1_000_000)),
        driver: driver.clone(),
        timeout: config.match_timeout(),
    }));
    let buying_power = Arc::new(BuyingPowerCheck::new(
        config.exchange_rate_table(),
        quotes.clone(),
        config.risk.clone(),
    ));
    let risk_state = Arc::new(RiskStateCheck::new());
    let compliance = ComplianceCheck::new()
        .with_rule(Arc::new(MaxOrderQuantityRule::new(100_000)))
        .with_rule(Arc::new(OpposingOrderRule::new()));
    let pipeline = AdmissionPipeline::new(engine.clone(), clock.clone())
        .with_check(Arc::new(BoardLotCheck::new(
            config.board_lots.clone(),
            config.default_lot_size,
            quotes.clone(),
        )))
        .with_check(buying_power.clone())
        .with_check(risk_state.clone())
        .with_check(Arc::new(compliance));
    let service = OrderSubmissionService::new(
        Arc::new(SequentialIdentitySource::new(1)),
        clock,
        Arc::new(pipeline),
    );
    Venue {
        service,
        engine,
        driver,
        quotes,
        buying_power,
        risk_state,
    }
}

pub fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}
