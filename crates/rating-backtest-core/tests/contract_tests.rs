use pretty_assertions::assert_eq;
use rating_backtest_core::calibration::binomial::{binomial_test, BinomialTestInput};
use rating_backtest_core::calibration::spiegelhalter::{spiegelhalter_test, SpiegelhalterTestInput};
use rating_backtest_core::calibration::traffic_lights::{traffic_lights, TrafficLightsInput};
use rating_backtest_core::discrimination::concordance::{
    coefficient_of_concordance, ConcordanceInput,
};
use rating_backtest_core::discrimination::information_value::{
    information_value, information_value_unbinned, InformationValueInput,
};
use rating_backtest_core::discrimination::loss_capture::{loss_capture_ratio, LossCaptureInput};
use rating_backtest_core::discrimination::somers_d::{somers_d, SomersDInput};
use rating_backtest_core::stability::migration::{migration_matrix_statistics, MigrationInput};
use rating_backtest_core::stability::psi::{population_stability_index, PsiInput};
use rating_backtest_core::{BacktestError, Column, Table, Value};

// ===========================================================================
// Every test refuses an empty table before looking at anything else
// ===========================================================================

#[test]
fn test_empty_table_rejected_everywhere() {
    let df = Table::new();
    assert_eq!(
        binomial_test(
            &df,
            &BinomialTestInput::new("default_flag", "ratings", "prob_default")
        )
        .unwrap_err(),
        BacktestError::EmptyInput
    );
    assert_eq!(
        somers_d(
            &df,
            &SomersDInput::new("ratings", "prob_default", "default_flag")
        )
        .unwrap_err(),
        BacktestError::EmptyInput
    );
    assert_eq!(
        population_stability_index(&df, &PsiInput::new("ratings", "ratings2")).unwrap_err(),
        BacktestError::EmptyInput
    );
    assert_eq!(
        loss_capture_ratio(&df, &LossCaptureInput::new("LGD", "EAD", "PRED_LGD")).unwrap_err(),
        BacktestError::EmptyInput
    );
    assert_eq!(
        spiegelhalter_test(
            &df,
            &SpiegelhalterTestInput::new("ratings", "default_flag", "prob_default")
        )
        .unwrap_err(),
        BacktestError::EmptyInput
    );
    assert_eq!(
        information_value(
            &df,
            &InformationValueInput::new("default_flag", "prob_default", "ratings")
        )
        .unwrap_err(),
        BacktestError::EmptyInput
    );
}

#[test]
fn test_zero_row_columns_count_as_empty() {
    let df = Table::from_columns(vec![
        Column::dense("ratings", Vec::<i64>::new()),
        Column::dense("default_flag", Vec::<i64>::new()),
    ])
    .unwrap();
    let err = traffic_lights(&df, &TrafficLightsInput::new("ratings", "default_flag"))
        .unwrap_err();
    assert_eq!(err, BacktestError::EmptyInput);
}

// ===========================================================================
// Argument presence and type
// ===========================================================================

fn small_table() -> Table {
    Table::from_columns(vec![
        Column::dense("ratings", vec![1i64, 1, 2]),
        Column::dense("default_flag", vec![0i64, 1, 0]),
        Column::dense("prob_default", vec![0.1, 0.1, 0.2]),
    ])
    .unwrap()
}

#[test]
fn test_unset_column_argument_reported_by_name() {
    let df = small_table();
    let input = BinomialTestInput {
        ratings_col: None,
        ..BinomialTestInput::new("default_flag", "ratings", "prob_default")
    };
    assert_eq!(
        binomial_test(&df, &input).unwrap_err(),
        BacktestError::MissingArgument {
            argument: "ratings_col"
        }
    );
}

#[test]
fn test_numeric_column_argument_rejected() {
    let df = small_table();
    let input = BinomialTestInput {
        pds_col: Some(Value::Int(2)),
        ..BinomialTestInput::new("default_flag", "ratings", "prob_default")
    };
    assert_eq!(
        binomial_test(&df, &input).unwrap_err(),
        BacktestError::InvalidArgumentType {
            argument: "pds_col",
            found: "integer"
        }
    );
}

#[test]
fn test_json_caller_hits_the_type_check() {
    // A config-driven caller can hand over any JSON scalar; only strings
    // survive to the column lookup.
    let df = small_table();
    let input: BinomialTestInput = serde_json::from_str(
        r#"{"defaults_col": "default_flag", "ratings_col": 3.5, "pds_col": "prob_default"}"#,
    )
    .unwrap();
    assert_eq!(
        binomial_test(&df, &input).unwrap_err(),
        BacktestError::InvalidArgumentType {
            argument: "ratings_col",
            found: "number"
        }
    );
}

// ===========================================================================
// Column existence and missing values
// ===========================================================================

#[test]
fn test_unknown_column_rejected_everywhere() {
    let df = small_table();
    assert_eq!(
        binomial_test(
            &df,
            &BinomialTestInput::new("default_flag", "grade", "prob_default")
        )
        .unwrap_err(),
        BacktestError::UnknownColumn {
            column: "grade".into()
        }
    );
    assert_eq!(
        population_stability_index(&df, &PsiInput::new("ratings", "ratings2")).unwrap_err(),
        BacktestError::UnknownColumn {
            column: "ratings2".into()
        }
    );
    assert_eq!(
        migration_matrix_statistics(&df, &MigrationInput::new("ratings", "ratings2"))
            .unwrap_err(),
        BacktestError::UnknownColumn {
            column: "ratings2".into()
        }
    );
    assert_eq!(
        coefficient_of_concordance(
            &df,
            &ConcordanceInput::new("default_flag", "pd_estimate", "ratings")
        )
        .unwrap_err(),
        BacktestError::UnknownColumn {
            column: "pd_estimate".into()
        }
    );
}

#[test]
fn test_missing_values_rejected_per_column() {
    let df = Table::from_columns(vec![
        Column::dense("ratings", vec![1i64, 1, 2]),
        Column::new(
            "default_flag",
            vec![Some(Value::Int(0)), None, Some(Value::Int(1))],
        ),
        Column::dense("prob_default", vec![0.1, 0.1, 0.2]),
    ])
    .unwrap();
    let err = binomial_test(
        &df,
        &BinomialTestInput::new("default_flag", "ratings", "prob_default"),
    )
    .unwrap_err();
    assert_eq!(
        err,
        BacktestError::MissingValue {
            column: "default_flag".into()
        }
    );
    let err = spiegelhalter_test(
        &df,
        &SpiegelhalterTestInput::new("ratings", "default_flag", "prob_default"),
    )
    .unwrap_err();
    assert_eq!(
        err,
        BacktestError::MissingValue {
            column: "default_flag".into()
        }
    );
    let err = information_value_unbinned(
        &df,
        &InformationValueInput::new("default_flag", "prob_default", "ratings"),
    )
    .unwrap_err();
    assert_eq!(
        err,
        BacktestError::MissingValue {
            column: "default_flag".into()
        }
    );
}

#[test]
fn test_first_failing_check_wins() {
    // Both an unknown column and a missing value are present; the column
    // lookup happens first.
    let df = Table::from_columns(vec![
        Column::dense("ratings", vec![1i64, 2]),
        Column::new("default_flag", vec![Some(Value::Int(0)), None]),
    ])
    .unwrap();
    let err = binomial_test(
        &df,
        &BinomialTestInput::new("default_flag", "ratings", "prob_default"),
    )
    .unwrap_err();
    assert_eq!(
        err,
        BacktestError::UnknownColumn {
            column: "prob_default".into()
        }
    );
}

// ===========================================================================
// Purity: the input table is never touched
// ===========================================================================

#[test]
fn test_input_table_unchanged_after_derived_column_work() {
    let df = Table::from_columns(vec![
        Column::dense("LGD", vec![0.2, 0.8]),
        Column::dense("EAD", vec![100.0, 100.0]),
        Column::dense("PRED_LGD", vec![0.1, 0.9]),
    ])
    .unwrap();
    let before: Vec<String> = df.column_names().map(String::from).collect();
    loss_capture_ratio(&df, &LossCaptureInput::new("LGD", "EAD", "PRED_LGD")).unwrap();
    let after: Vec<String> = df.column_names().map(String::from).collect();
    assert_eq!(before, after);
    assert!(df.column("loss").is_none());
}
