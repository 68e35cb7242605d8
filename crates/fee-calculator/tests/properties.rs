use fee_calculator::{
    compute_fees, weighted_value, Decimal, FeeBreakdown, FeeConfiguration, SuccessFee,
    SuccessFeeBase, SuccessFeeBreakdown, Tranche,
};
use itertools::Itertools;
use rust_decimal_macros::dec;

fn accelerator_tranches() -> Vec<Tranche> {
    vec![
        Tranche::new(None, Some(dec!(10000000)), dec!(1.0)),
        Tranche::new(Some(dec!(10000000)), Some(dec!(20000000)), dec!(1.5)),
        Tranche::new(Some(dec!(20000000)), None, dec!(2.0)),
    ]
}

fn mandate(success_fee: SuccessFee) -> FeeConfiguration {
    FeeConfiguration {
        operation_value: dec!(30000000),
        pipeline_weight: 80,
        retainer: Some(dec!(50000)),
        flat_fee: Some(dec!(15000)),
        success_fee,
    }
}

#[test]
fn no_operation_value_means_no_components() {
    for operation_value in [Decimal::ZERO, dec!(-0.01), dec!(-1000000)] {
        let breakdown = compute_fees(&FeeConfiguration {
            operation_value,
            ..mandate(SuccessFee::Progressive {
                tranches: accelerator_tranches(),
            })
        });
        assert_eq!(breakdown.total, Decimal::ZERO);
        assert!(breakdown.is_empty());
    }
}

#[test]
fn total_is_the_sum_of_enabled_components() {
    let success_fees = [
        SuccessFee::Simple {
            percentage: dec!(1.5),
            base: SuccessFeeBase::EnterpriseValue,
        },
        SuccessFee::Simple {
            percentage: Decimal::ZERO,
            base: SuccessFeeBase::EnterpriseValue,
        },
        SuccessFee::Progressive {
            tranches: accelerator_tranches(),
        },
    ];
    let fixed_amounts = [None, Some(dec!(50000)), Some(dec!(12345.67))];

    for success_fee in &success_fees {
        for (retainer, flat_fee) in fixed_amounts.iter().cartesian_product(fixed_amounts.iter()) {
            let config = FeeConfiguration {
                retainer: *retainer,
                flat_fee: *flat_fee,
                ..mandate(success_fee.clone())
            };
            let breakdown = compute_fees(&config);
            let expected = retainer.unwrap_or_default()
                + flat_fee.unwrap_or_default()
                + breakdown
                    .success_fee
                    .as_ref()
                    .map(SuccessFeeBreakdown::total)
                    .unwrap_or_default();
            assert_eq!(breakdown.total, expected);
        }
    }
}

#[test]
fn simple_success_fee_is_a_percentage_of_the_weighted_value() {
    for percentage in [dec!(0.5), dec!(1.5), dec!(3), dec!(100)] {
        let config = mandate(SuccessFee::Simple {
            percentage,
            base: SuccessFeeBase::TransactionValue,
        });
        let breakdown = compute_fees(&config);
        let Some(SuccessFeeBreakdown::Simple { amount, .. }) = breakdown.success_fee else {
            panic!("expected a simple success fee for {percentage}%");
        };
        assert_eq!(amount, weighted_value(&config) * percentage / dec!(100));
    }
}

#[test]
fn progressive_bands_do_not_overlap() {
    let config = FeeConfiguration {
        operation_value: dec!(150),
        pipeline_weight: 100,
        retainer: None,
        flat_fee: None,
        success_fee: SuccessFee::Progressive {
            tranches: vec![
                Tranche::new(Some(dec!(0)), Some(dec!(100)), dec!(10)),
                Tranche::new(Some(dec!(100)), None, dec!(20)),
            ],
        },
    };
    let breakdown = compute_fees(&config);
    let Some(SuccessFeeBreakdown::Progressive { total, line_items }) = &breakdown.success_fee else {
        panic!("expected a progressive success fee");
    };
    assert_eq!(line_items[0].fee, dec!(10));
    assert_eq!(line_items[1].fee, dec!(10));
    assert_eq!(*total, dec!(20));
    assert_ne!(*total, dec!(30));
}

#[test]
fn tranche_order_does_not_matter() {
    let mut tranches = accelerator_tranches();
    // a tie on the lower bound exercises the secondary ordering
    tranches.push(Tranche::new(Some(dec!(20000000)), Some(dec!(22000000)), dec!(0.5)));
    let reference = compute_fees(&mandate(SuccessFee::Progressive {
        tranches: tranches.clone(),
    }));

    for permutation in tranches.iter().cloned().permutations(tranches.len()) {
        let breakdown = compute_fees(&mandate(SuccessFee::Progressive {
            tranches: permutation,
        }));
        assert_eq!(breakdown, reference);
    }
}

#[test]
fn repeated_calls_are_bit_identical() -> anyhow::Result<()> {
    let config = mandate(SuccessFee::Progressive {
        tranches: accelerator_tranches(),
    });
    let first = compute_fees(&config);
    let second = compute_fees(&config);
    assert_eq!(first, second);
    assert_eq!(serde_json::to_string(&first)?, serde_json::to_string(&second)?);
    Ok(())
}

#[test]
fn retainer_plus_simple_success_fee_scenario() {
    let config = FeeConfiguration {
        operation_value: dec!(30000000),
        pipeline_weight: 80,
        retainer: Some(dec!(50000)),
        flat_fee: None,
        success_fee: SuccessFee::Simple {
            percentage: dec!(1.5),
            base: SuccessFeeBase::EnterpriseValue,
        },
    };
    assert_eq!(weighted_value(&config), dec!(24000000));

    let breakdown = compute_fees(&config);
    assert_eq!(breakdown.retainer, Some(dec!(50000)));
    assert_eq!(breakdown.flat_fee, None);
    assert_eq!(
        breakdown.success_fee.as_ref().map(SuccessFeeBreakdown::total),
        Some(dec!(360000))
    );
    assert_eq!(breakdown.total, dec!(410000));
}

#[test]
fn progressive_unbounded_top_band_scenario() {
    let config = FeeConfiguration {
        operation_value: dec!(30000000),
        pipeline_weight: 80,
        retainer: None,
        flat_fee: None,
        success_fee: SuccessFee::Progressive {
            tranches: vec![
                Tranche::new(None, Some(dec!(10000000)), dec!(1.0)),
                Tranche::new(Some(dec!(10000000)), None, dec!(2.0)),
            ],
        },
    };
    let breakdown = compute_fees(&config);
    let Some(SuccessFeeBreakdown::Progressive { total, line_items }) = &breakdown.success_fee else {
        panic!("expected a progressive success fee");
    };

    assert_eq!(line_items.len(), 2);
    assert_eq!(line_items[0].range_label, "0 – 10000000");
    assert_eq!(line_items[0].applicable_amount, dec!(10000000));
    assert_eq!(line_items[0].fee, dec!(100000));
    assert_eq!(line_items[1].range_label, "above 10000000");
    assert_eq!(line_items[1].applicable_amount, dec!(14000000));
    assert_eq!(line_items[1].fee, dec!(280000));
    assert_eq!(*total, dec!(380000));
    assert_eq!(breakdown.total, dec!(380000));
}

#[test]
fn empty_breakdown_serializes_without_components() -> anyhow::Result<()> {
    let breakdown = compute_fees(&FeeConfiguration::default());
    assert_eq!(breakdown, FeeBreakdown::empty());
    assert_eq!(serde_json::to_string(&breakdown)?, r#"{"total":"0"}"#);
    Ok(())
}
