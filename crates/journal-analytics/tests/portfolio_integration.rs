//! 포트폴리오 파이프라인 통합 테스트.
//!
//! 거래/입출금 스냅샷 → 회계 해석 → 자본 원장 → 가치 시계열 → 위험 지표/XIRR
//! 전체 흐름을 검증합니다.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use journal_analytics::{
    CapitalLedger, MonthlyActivity, PortfolioTimeSeriesBuilder, RiskMetricsEngine,
    TradeAccountingResolver, XirrSolver,
};
use journal_core::{
    midnight_utc, AccountingBasis, CapitalBaselines, CapitalChange, JournalTrade,
    PortfolioSnapshot, PositionStatus, Side, YearMonth,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ym(y: i32, m: u32) -> YearMonth {
    YearMonth::new(y, m).unwrap()
}

#[test]
fn test_basis_switch_moves_pl_date() {
    let trade = JournalTrade::new("INFY", Side::Buy, date(2023, 1, 10), dec!(100), dec!(10))
        .with_exit(dec!(120), dec!(10), Some(date(2023, 2, 5)));
    let trades = vec![trade];
    let builder = PortfolioTimeSeriesBuilder::new();

    let cash = builder.build_time_series(&trades, &[], AccountingBasis::Cash);
    let cash_map = cash.to_map();
    assert_eq!(cash.len(), 2);
    assert_eq!(cash_map[&midnight_utc(date(2023, 1, 10))], dec!(100000));
    assert_eq!(cash_map[&midnight_utc(date(2023, 2, 5))], dec!(100200));

    let accrual = builder.build_time_series(&trades, &[], AccountingBasis::Accrual);
    assert_eq!(accrual.len(), 1);
    assert_eq!(accrual.to_map()[&midnight_utc(date(2023, 1, 10))], dec!(100200));

    // 기준과 무관하게 최종 값은 같음
    assert_eq!(cash.current_value(), accrual.current_value());
}

#[test]
fn test_capital_cascade_from_yearly_baseline() {
    let trades = vec![
        JournalTrade::new("TCS", Side::Buy, date(2023, 1, 3), dec!(50), dec!(100))
            .with_exit(dec!(55), dec!(100), Some(date(2023, 1, 20))),
        JournalTrade::new("HDFC", Side::Sell, date(2023, 2, 6), dec!(200), dec!(10))
            .with_exit(dec!(210), dec!(10), Some(date(2023, 2, 17))),
    ];
    let changes = vec![CapitalChange::deposit(date(2023, 2, 1), dec!(5000))];

    let activity = MonthlyActivity::collect(
        &trades,
        &changes,
        AccountingBasis::Cash,
        &TradeAccountingResolver::default(),
    );
    let ledger = CapitalLedger::new(CapitalBaselines::new().with_yearly_capital(2023, dec!(100000)));

    let net_jan = activity.net(ym(2023, 1));
    let net_feb = activity.net(ym(2023, 2));
    assert_eq!(net_jan, dec!(500));
    assert_eq!(net_feb, dec!(4900));
    assert_eq!(
        ledger.starting_capital(3, 2023, &activity),
        dec!(100000) + net_jan + net_feb
    );
}

#[test]
fn test_closed_trade_legs_counted_once() {
    let trade = JournalTrade::new("INFY", Side::Buy, date(2023, 1, 10), dec!(100), dec!(20))
        .with_exit(dec!(120), dec!(10), Some(date(2023, 2, 5)))
        .with_exit(dec!(130), dec!(10), Some(date(2023, 3, 1)));
    assert_eq!(trade.position_status, PositionStatus::Closed);
    assert_eq!(trade.pl_rs, dec!(500));

    let resolver = TradeAccountingResolver::default();
    let legs = resolver.explode_to_exit_events(&trade);
    let leg_total: Decimal = legs.iter().map(|leg| resolver.leg_pl(leg)).sum();
    assert_eq!(legs.len(), 2);
    assert_eq!(leg_total, trade.pl_rs);
    assert_eq!(resolver.reconcile_closed(&trade), Some(Decimal::ZERO));

    // 같은 거래가 두 번 들어와도 한 번만 반영
    let trades = vec![trade.clone(), trade];
    let builder = PortfolioTimeSeriesBuilder::new();
    let series = builder.build_time_series(&trades, &[], AccountingBasis::Cash);
    assert_eq!(series.current_value(), dec!(100500));

    let report = builder.build_monthly(&trades, &[], AccountingBasis::Cash);
    let pls: Vec<Decimal> = report.rows.iter().map(|row| row.pl).collect();
    assert_eq!(pls, vec![Decimal::ZERO, dec!(200), dec!(300)]);
}

#[test]
fn test_series_idempotent() {
    let trades = vec![
        JournalTrade::new("INFY", Side::Buy, date(2023, 1, 10), dec!(100), dec!(10))
            .with_pyramid(dec!(110), dec!(10), Some(date(2023, 1, 15)))
            .with_exit(dec!(120), dec!(15), Some(date(2023, 2, 5))),
        JournalTrade::new("TCS", Side::Sell, date(2023, 3, 1), dec!(50), dec!(40)),
    ];
    let changes = vec![
        CapitalChange::deposit(date(2023, 1, 2), dec!(20000)),
        CapitalChange::withdrawal(date(2023, 4, 1), dec!(-3000)),
    ];
    let builder = PortfolioTimeSeriesBuilder::new();

    for basis in [AccountingBasis::Cash, AccountingBasis::Accrual] {
        let first = builder.build_time_series(&trades, &changes, basis);
        let second = builder.build_time_series(&trades, &changes, basis);
        assert_eq!(first.to_map(), second.to_map());
        assert_eq!(
            builder.build_monthly(&trades, &changes, basis).rows,
            builder.build_monthly(&trades, &changes, basis).rows
        );
    }
}

#[test]
fn test_drawdown_and_risk_summary() {
    let summary = RiskMetricsEngine::default().summarize_values(&[100.0, 120.0, 90.0, 130.0]);
    assert!((summary.max_drawdown - 0.25).abs() < 1e-9);

    // 시계열 경로에서도 같은 낙폭
    let trades = vec![
        JournalTrade::new("A", Side::Buy, date(2023, 1, 2), dec!(100), dec!(1000))
            .with_exit(dec!(120), dec!(1000), Some(date(2023, 1, 3))),
        JournalTrade::new("B", Side::Buy, date(2023, 1, 4), dec!(100), dec!(1500))
            .with_exit(dec!(80), dec!(1500), Some(date(2023, 1, 5))),
    ];
    let series = PortfolioTimeSeriesBuilder::new()
        .with_default_capital(dec!(100000))
        .build_time_series(&trades, &[], AccountingBasis::Cash);

    // 100000 → 120000 → 120000 → 90000
    assert_eq!(series.current_value(), dec!(90000));
    assert_eq!(series.max_drawdown(), dec!(0.25));

    let summary = RiskMetricsEngine::default().summarize(&series);
    assert!((summary.max_drawdown - 0.25).abs() < 1e-9);
    assert_eq!(summary.observations, series.len());
}

#[test]
fn test_xirr_from_portfolio() {
    let trades = vec![
        JournalTrade::new("INFY", Side::Buy, date(2023, 6, 1), dec!(100), dec!(100))
            .with_exit(dec!(200), dec!(100), Some(date(2024, 1, 1))),
    ];
    let changes = vec![CapitalChange::deposit(date(2023, 1, 1), dec!(100000))];
    let builder = PortfolioTimeSeriesBuilder::new();

    let flows = builder.cash_flows(&trades, &changes, AccountingBasis::Cash);
    assert_eq!(flows.len(), 2);
    assert_eq!(flows[0].amount, dec!(-100000));
    assert_eq!(flows[1].amount, dec!(110000));

    let pct = XirrSolver::default().xirr_percentage(&flows);
    assert!((pct - 10.0).abs() < 0.5, "xirr = {pct}");
}

#[test]
fn test_xirr_undefined_without_history() {
    let trades = vec![JournalTrade::new("INFY", Side::Buy, date(2023, 6, 1), dec!(100), dec!(10))];
    let builder = PortfolioTimeSeriesBuilder::new();

    // 단일 날짜: 시작 출자와 최종 평가액이 같은 날
    let flows = builder.cash_flows(&trades, &[], AccountingBasis::Cash);
    assert!(XirrSolver::default().solve(&flows).is_none());
    assert_eq!(XirrSolver::default().xirr_percentage(&flows), 0.0);

    assert!(builder.cash_flows(&[], &[], AccountingBasis::Cash).is_empty());
}

#[test]
fn test_snapshot_end_to_end() {
    let json = r#"{
        "trades": [{
            "id": "6f1c2b7e-3d4a-4b8f-9c2d-1e5f7a9b0c11",
            "symbol": "INFY",
            "date": "2023-01-10",
            "side": "buy",
            "position_status": "closed",
            "entry": { "price": "100", "quantity": "10", "date": "2023-01-10" },
            "exits": [{ "price": "120", "quantity": "10", "date": "2023-02-05" }],
            "avg_entry": "100",
            "avg_exit_price": "120",
            "open_qty": "0",
            "exited_qty": "10",
            "pl_rs": "200"
        }],
        "capital_changes": [{
            "id": "0b8e3c43-53a1-4c7d-8a1b-2a7f1a5e9d10",
            "date": "2023-03-01",
            "amount": "10000",
            "type": "deposit"
        }],
        "yearly_capital": [{ "year": 2023, "capital": "50000" }]
    }"#;

    let snapshot = PortfolioSnapshot::from_json_str(json).unwrap();
    assert!(snapshot.validation_errors().is_empty());

    let builder = PortfolioTimeSeriesBuilder::new().with_baselines(snapshot.baselines());
    let report = builder.build_monthly(
        &snapshot.trades,
        &snapshot.capital_changes,
        AccountingBasis::Cash,
    );

    let finals: Vec<Decimal> = report.rows.iter().map(|row| row.final_capital).collect();
    assert_eq!(report.rows[0].starting_capital, dec!(50000));
    assert_eq!(finals, vec![dec!(50000), dec!(50200), dec!(60200)]);

    // 첫 월 시작 상태 + 월말 3개
    assert_eq!(report.curve.len(), 4);
    assert_eq!(report.curve.initial_value(), dec!(50000));

    let encoded = serde_json::to_string(&report).unwrap();
    assert!(encoded.contains("\"final_capital\""));
}

proptest! {
    /// 청산이 모두 끝난 거래는 회계 기준과 무관하게 최종 가치가 같습니다.
    #[test]
    fn prop_basis_changes_timing_not_total(
        legs in prop::collection::vec((0i64..200, 1u32..30, 1u32..500, 1u32..500, 1u32..100), 1..6)
    ) {
        let origin = date(2023, 1, 2);
        let trades: Vec<JournalTrade> = legs
            .iter()
            .enumerate()
            .map(|(i, &(offset, hold, entry, exit, qty))| {
                let entry_date = origin + chrono::Duration::days(offset);
                let exit_date = entry_date + chrono::Duration::days(i64::from(hold));
                let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
                JournalTrade::new(format!("SYM{i}"), side, entry_date, Decimal::from(entry), Decimal::from(qty))
                    .with_exit(Decimal::from(exit), Decimal::from(qty), Some(exit_date))
            })
            .collect();

        let builder = PortfolioTimeSeriesBuilder::new();
        let cash = builder.build_time_series(&trades, &[], AccountingBasis::Cash);
        let accrual = builder.build_time_series(&trades, &[], AccountingBasis::Accrual);

        prop_assert_eq!(cash.current_value(), accrual.current_value());
        prop_assert_eq!(
            cash.to_map(),
            builder.build_time_series(&trades, &[], AccountingBasis::Cash).to_map()
        );
    }
}
