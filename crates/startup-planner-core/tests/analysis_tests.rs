use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use startup_planner_core::break_even::{analyze_break_even, default_profit_simulation, BreakEvenInput};
use startup_planner_core::kpi::{analyze_kpi, compare_to_targets, KpiAnalysisInput, KpiTargetInput};
use startup_planner_core::monte_carlo::{run_profit_simulation, ProfitSimulationInput};
use startup_planner_core::ratios::health::{assess_health, HealthCategory, HealthLabel};
use startup_planner_core::ratios::statement::{
    analyze_financial_health, compute_ratios, BalanceSheet, FinancialStatementInputs, RatioSet,
};
use startup_planner_core::reports::business::Period;
use startup_planner_core::reports::{
    build_business_report, build_financial_report, render_markdown, BusinessReportInput,
    FinancialReportInput,
};
use startup_planner_core::strategy::growth::{analyze_growth, GrowthInput, GrowthStage};
use startup_planner_core::strategy::pmf::{analyze_pmf, PmfInput, PmfStage, PmfVerdict};
use startup_planner_core::tabular::RawTable;
use startup_planner_core::unit_economics::metrics::{analyze_unit_economics, UnitEconomicsInput};
use startup_planner_core::unit_economics::viability::Verdict;
use startup_planner_core::{PlannerError, RatioValue};

fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
    RawTable::new(
        headers.iter().map(|s| s.to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect(),
    )
    .unwrap()
}

// ===========================================================================
// Financial health
// ===========================================================================

#[test]
fn test_all_strong_health_scores_eight() {
    let f = RatioValue::Finite;
    let ratios = RatioSet {
        gross_margin: f(dec!(0.45)),
        operating_margin: f(dec!(0.2)),
        net_profit_margin: f(dec!(0.1)),
        roa: f(dec!(0.08)),
        roe: f(dec!(0.2)),
        asset_turnover: f(dec!(0.8)),
        cost_to_revenue: f(dec!(0.6)),
        operating_cost_ratio: f(dec!(0.25)),
        current_ratio: f(dec!(2.0)),
        cash_ratio: f(dec!(0.6)),
        debt_to_equity: f(dec!(0.8)),
        debt_ratio: f(dec!(0.4)),
        equity_ratio: f(dec!(0.5)),
    };
    let assessment = assess_health(&ratios);
    assert_eq!(assessment.score, 8);
    assert_eq!(assessment.max_score, 10);
    assert!(assessment.categories.iter().all(|c| c.label == HealthLabel::Strong));
}

#[test]
fn test_ratios_are_idempotent_and_handle_zero_liabilities() {
    let inputs = FinancialStatementInputs::from_operations(
        dec!(100000),
        dec!(40000),
        dec!(20000),
        BalanceSheet {
            total_assets: dec!(200000),
            equity: dec!(120000),
            current_assets: dec!(50000),
            current_liabilities: Decimal::ZERO,
            cash: dec!(30000),
            total_debt: dec!(80000),
        },
    );
    assert_eq!(compute_ratios(&inputs), compute_ratios(&inputs));

    let out = analyze_financial_health(&inputs).unwrap();
    let r = &out.result.ratios;
    assert_eq!(r.current_ratio, RatioValue::Infinite);
    assert_eq!(r.cash_ratio, RatioValue::Infinite);
    assert_eq!(r.gross_margin, RatioValue::Finite(dec!(0.6)));
    assert_eq!(
        out.result.assessment.label_for(HealthCategory::Liquidity),
        Some(HealthLabel::Strong)
    );
    assert_eq!(out.warnings.len(), 2);
}

// ===========================================================================
// Unit economics
// ===========================================================================

#[test]
fn test_unit_economics_sentinels() {
    let out = analyze_unit_economics(&UnitEconomicsInput {
        arpu: dec!(50),
        cac: Decimal::ZERO,
        churn: Decimal::ZERO,
        gross_margin: dec!(0.7),
    })
    .unwrap();
    let m = &out.result.metrics;
    assert_eq!(m.ltv, Decimal::ZERO);
    assert_eq!(m.ltv_to_cac, RatioValue::Infinite);
    assert_eq!(out.warnings.len(), 2);
}

#[test]
fn test_healthy_saas_is_highly_viable() {
    let out = analyze_unit_economics(&UnitEconomicsInput {
        arpu: dec!(100),
        cac: dec!(300),
        churn: dec!(0.03),
        gross_margin: dec!(0.8),
    })
    .unwrap();
    // LTV = 100 * 0.8 / 0.03 = 2666.67; LTV/CAC = 8.89; payback = 3.75 months
    assert_eq!(out.result.metrics.ltv, dec!(2666.67));
    assert_eq!(out.result.verdict, Verdict::HighlyViable);
}

// ===========================================================================
// Break-even and Monte Carlo
// ===========================================================================

#[test]
fn test_break_even_feeds_profit_simulation() {
    let input = BreakEvenInput {
        fixed_cost: dec!(10000),
        price: dec!(50),
        variable_cost: dec!(30),
        curve_points: 100,
    };
    let be = analyze_break_even(&input).unwrap();
    assert_eq!(be.result.break_even_units, Some(dec!(500)));
    assert_eq!(be.result.break_even_revenue, Some(dec!(25000)));
    assert_eq!(be.result.curve.len(), 100);

    let sim = default_profit_simulation(&input, 2000, Some(7));
    assert_eq!(sim.demand_mean, 500.0);
    let out = run_profit_simulation(&sim).unwrap();
    // Demand centred on break-even: losses roughly half the time.
    let p = out.result.probability_of_loss;
    assert!(p > 0.3 && p < 0.7, "probability of loss {p}");
}

#[test]
fn test_zero_std_simulation_is_deterministic() {
    let input = ProfitSimulationInput {
        price_mean: 50.0,
        price_std: 0.0,
        demand_mean: 1000.0,
        demand_std: 0.0,
        fixed_cost: 10000.0,
        variable_cost: 30.0,
        num_simulations: 10_000,
        seed: None,
        include_samples: true,
    };
    let out = run_profit_simulation(&input).unwrap();
    let expected = 50.0 * 1000.0 - 10000.0 - 30.0 * 1000.0;
    let profits = out.result.profits.unwrap();
    assert_eq!(profits.len(), 10_000);
    assert!(profits.iter().all(|p| (*p - expected).abs() < 1e-9));
    assert_eq!(out.result.probability_of_loss, 0.0);
    assert!(out.result.std_dev.abs() < 1e-9);
}

// ===========================================================================
// Strategy
// ===========================================================================

#[test]
fn test_strong_pmf_and_scaling_growth() {
    let pmf = analyze_pmf(&PmfInput {
        retention_90d: dec!(0.7),
        repeat_usage: dec!(0.6),
        very_disappointed: dec!(0.45),
        somewhat_disappointed: dec!(0.3),
        organic_revenue_growth: dec!(0.3),
        ltv_cac_ratio: dec!(4),
    })
    .unwrap();
    assert_eq!(pmf.result.verdict, PmfVerdict::Strong);
    assert_eq!(pmf.result.stage, PmfStage::ScaleReady);

    let growth = analyze_growth(&GrowthInput {
        revenue_growth_rate: dec!(0.9),
        organic_ratio: dec!(0.8),
        cac_growth_rate: dec!(0.1),
        burn_rate_pressure: dec!(0.2),
    })
    .unwrap();
    assert_eq!(growth.result.stage, GrowthStage::Scale);
}

// ===========================================================================
// KPI tracking
// ===========================================================================

#[test]
fn test_kpi_pipeline_from_unsorted_upload() {
    let actual = table(
        &["date", "revenue", "channel", "users"],
        &[
            &["2024/03/01", "130", "ads", "40"],
            &["2024-01-01", "100", "seo", "20"],
            &["01/02/2024", "120", "ads", ""],
        ],
    );
    let out = analyze_kpi(&KpiAnalysisInput {
        table: actual.clone(),
        kpi: Some("users".into()),
        lag: 1,
    })
    .unwrap();
    let a = &out.result;
    assert_eq!(a.available_kpis, vec!["revenue".to_string(), "users".to_string()]);
    assert_eq!(a.comparison[1].value, None);
    assert_eq!(a.comparison[2].relative_change_pct, None);
    assert_eq!(a.summary.latest, Some(dec!(40)));

    let targets = compare_to_targets(&KpiTargetInput {
        actual,
        targets: table(&["users", "revenue"], &[&["50", "200"]]),
    })
    .unwrap();
    let rows = &targets.result.rows;
    assert_eq!(rows[0].kpi, "revenue");
    assert_eq!(rows[0].achievement_pct, Some(dec!(65)));
    assert_eq!(rows[1].remaining, dec!(10));
}

#[test]
fn test_kpi_without_date_column() {
    let err = analyze_kpi(&KpiAnalysisInput {
        table: table(&["month", "revenue"], &[&["1", "100"]]),
        kpi: None,
        lag: 1,
    })
    .unwrap_err();
    assert!(matches!(err, PlannerError::MissingColumn { ref column } if column == "date"));
}

// ===========================================================================
// Reports
// ===========================================================================

#[test]
fn test_business_report_to_markdown() {
    let input = BusinessReportInput {
        table: table(
            &[
                "Date",
                "Revenue",
                "COGS",
                "Operating_Cost",
                "Marketing_Cost",
                "Other_Cost",
                "Cash_Balance",
            ],
            &[
                &["2023-12-31", "8000", "3000", "2000", "1000", "500", "50000"],
                &["2024-01-31", "10000", "4000", "2000", "1000", "500", "48000"],
            ],
        ),
        period: Period::Yearly,
        targets: None,
    };
    let report = build_business_report(&input).unwrap().result;
    let years: Vec<&str> = report.periods.iter().map(|p| p.period.as_str()).collect();
    assert_eq!(years, vec!["2023", "2024"]);

    let generated = chrono::NaiveDate::from_ymd_opt(2024, 2, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let artifact = render_markdown(&report, generated);
    assert_eq!(artifact.file_name, "business_report.md");
    assert!(artifact.as_str().contains("## Period Totals"));
}

#[test]
fn test_financial_report_missing_optional_columns() {
    let input = FinancialReportInput {
        table: table(
            &[
                "Date",
                "Revenue",
                "COGS",
                "Operating_Expense",
                "Financial_Expense",
                "Tax",
                "Total_Assets",
            ],
            &[&["2024-01-31", "1000", "400", "200", "50", "70", "5000"]],
        ),
        targets: None,
    };
    let out = build_financial_report(&input).unwrap();
    let r = &out.result;
    assert_eq!(r.rows[0].net_profit, dec!(280));
    assert_eq!(r.rows[0].total_debt, Decimal::ZERO);
    let missing: Vec<&str> = r
        .ratios
        .iter()
        .filter(|x| x.value.is_none())
        .map(|x| x.name.as_str())
        .collect();
    assert_eq!(
        missing,
        vec![
            "Current Ratio",
            "Debt to Equity",
            "ROE",
            "Receivable Turnover",
            "Inventory Turnover"
        ]
    );
    assert_eq!(out.warnings.len(), 5);
}
