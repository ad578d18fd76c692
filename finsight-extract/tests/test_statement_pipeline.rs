use chrono::NaiveDate;
use finsight_core::Category;
use finsight_core::transaction::RawCandidate;
use finsight_extract::{ExtractOptions, extract_transactions};

fn opts() -> ExtractOptions {
    ExtractOptions {
        run_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        drift_tolerance: 0.10,
    }
}

const CARD_STATEMENT: &str = "\
BANKA A.S. MART 2025 EKSTRESI
Kart Limiti: 450.000,00 TL
Asgari Odeme Tutari: 3.200,00 TL

Harcama Detayi
01/03/2025 MIGROS SANAL MARKET 2.500,00 TL
02/03/2025 STREAMINGCO UYELIK 149,00 TL
05/03/2025 TEKNOSA TAKSIT 3/6 2.000,00 TL (12.000,00 TL)
09/03/2025 STREAMINGCO UYELIK 149,00 TL
12/03/2025 YEMEKSEPETI SIPARIS 450,00 TL
";

#[test]
fn test_full_statement_extraction() {
    let result = extract_transactions(CARD_STATEMENT, &[], &opts()).unwrap();
    assert!(result.failure.is_none());
    assert_eq!(result.transactions.len(), 5);

    // Limit and minimum-payment lines never become transactions.
    assert!(
        result
            .transactions
            .iter()
            .all(|t| !t.description().contains("Limiti") && t.amount() < 200_000.0)
    );

    // Default currency for a Turkish statement.
    assert!(
        result
            .transactions
            .iter()
            .all(|t| t.transaction.currency == "TRY")
    );
}

#[test]
fn test_installment_row_is_reconciled() {
    let result = extract_transactions(CARD_STATEMENT, &[], &opts()).unwrap();
    let row = result
        .transactions
        .iter()
        .find(|t| t.description().contains("TEKNOSA"))
        .unwrap();

    assert!(row.transaction.is_installment);
    assert_eq!(row.transaction.installment_current, Some(3));
    assert_eq!(row.transaction.installment_total, Some(6));
    assert_eq!(row.transaction.total_amount, Some(12_000.0));
    // The listed monthly figure agrees with total / count and is kept.
    assert_eq!(row.amount(), 2_000.0);
    // Installment notation is stripped from the display description.
    assert!(!row.description().contains("3/6"));
    assert!(row.transaction.original_description.contains("3/6"));
}

#[test]
fn test_rows_are_categorized() {
    let result = extract_transactions(CARD_STATEMENT, &[], &opts()).unwrap();
    let migros = result
        .transactions
        .iter()
        .find(|t| t.description().contains("MIGROS"))
        .unwrap();
    assert_eq!(migros.category, Category::Groceries);

    let yemek = result
        .transactions
        .iter()
        .find(|t| t.description().contains("YEMEKSEPETI"))
        .unwrap();
    assert_eq!(yemek.category, Category::Dining);
}

#[test]
fn test_extra_candidates_merge_and_dedupe() {
    let dup = RawCandidate {
        date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        description: "MIGROS SANAL MARKET".to_string(),
        amount: 2_500.0,
        currency: "TRY".to_string(),
        secondary_amount: None,
    };
    let fresh = RawCandidate {
        date: NaiveDate::from_ymd_opt(2025, 3, 13).unwrap(),
        description: "HAVALIMANI OTOPARK".to_string(),
        amount: 320.0,
        currency: "TRY".to_string(),
        secondary_amount: None,
    };

    let result =
        extract_transactions(CARD_STATEMENT, &[dup, fresh], &opts()).unwrap();
    // The duplicate collapses, the new row survives.
    assert_eq!(result.transactions.len(), 6);
    assert_eq!(
        result
            .transactions
            .iter()
            .filter(|t| t.description().contains("MIGROS"))
            .count(),
        1
    );
}

#[test]
fn test_extraction_is_idempotent() {
    let a = extract_transactions(CARD_STATEMENT, &[], &opts()).unwrap();
    let b = extract_transactions(CARD_STATEMENT, &[], &opts()).unwrap();
    assert_eq!(a.transactions, b.transactions);
    assert_eq!(a.strategy, b.strategy);
}

#[test]
fn test_exact_format_wins_on_regular_statements() {
    let text = "\
Islem Tarihi
01.03.2025 KAHVE DUKKANI 85,50 TL
03.03.2025 AKARYAKIT ISTASYONU 1.250,00 TL
";
    let result = extract_transactions(text, &[], &opts()).unwrap();
    assert_eq!(result.strategy, "exact-format");
    assert_eq!(result.transactions.len(), 2);
    assert_eq!(result.transactions[0].amount(), 85.5);
    assert_eq!(
        result.transactions[0].date(),
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    );
}

#[test]
fn test_dateless_statement_falls_back_to_run_date() {
    let text = "\
KIRTASIYE ALISVERIS 220,00
NALBUR MALZEME 540,00
";
    let result = extract_transactions(text, &[], &opts()).unwrap();
    assert_eq!(result.transactions.len(), 2);
    assert!(
        result
            .transactions
            .iter()
            .all(|t| t.date() == opts().run_date)
    );
}

#[test]
fn test_empty_input_is_terminal() {
    let result = extract_transactions("  \n ", &[], &opts()).unwrap();
    assert!(result.failure.is_some());
    assert!(result.transactions.is_empty());
    assert_eq!(result.strategy, "none");
}
