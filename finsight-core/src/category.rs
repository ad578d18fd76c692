//! Closed spending-category set and the keyword table that drives
//! classification.
//!
//! The keyword table is an ordered list of `(category, keywords)` pairs
//! evaluated top to bottom; descriptions routinely match several
//! categories' keywords, so iteration order is part of the contract.

use serde::{Deserialize, Serialize};

/// Spending categories matched deterministically from descriptions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Groceries,
    Dining,
    Transport,
    Clothing,
    Electronics,
    Subscriptions,
    Health,
    Education,
    Utilities,
    Entertainment,
    Travel,
    Cash,
    Fees,
    Other,
}

impl Category {
    /// Display label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Groceries => "Market & Groceries",
            Category::Dining => "Dining & Cafes",
            Category::Transport => "Transport",
            Category::Clothing => "Clothing",
            Category::Electronics => "Electronics",
            Category::Subscriptions => "Subscriptions",
            Category::Health => "Health",
            Category::Education => "Education",
            Category::Utilities => "Bills & Utilities",
            Category::Entertainment => "Entertainment",
            Category::Travel => "Travel",
            Category::Cash => "Cash Withdrawal",
            Category::Fees => "Fees & Interest",
            Category::Other => "Other",
        }
    }

    /// Hex color used by chart consumers.
    pub fn color(&self) -> &'static str {
        match self {
            Category::Groceries => "#22c55e",
            Category::Dining => "#f97316",
            Category::Transport => "#3b82f6",
            Category::Clothing => "#ec4899",
            Category::Electronics => "#6366f1",
            Category::Subscriptions => "#a855f7",
            Category::Health => "#ef4444",
            Category::Education => "#0ea5e9",
            Category::Utilities => "#eab308",
            Category::Entertainment => "#d946ef",
            Category::Travel => "#14b8a6",
            Category::Cash => "#64748b",
            Category::Fees => "#f43f5e",
            Category::Other => "#9ca3af",
        }
    }

    /// Icon name for UI consumers.
    pub fn icon(&self) -> &'static str {
        match self {
            Category::Groceries => "shopping-cart",
            Category::Dining => "utensils",
            Category::Transport => "bus",
            Category::Clothing => "shirt",
            Category::Electronics => "cpu",
            Category::Subscriptions => "repeat",
            Category::Health => "heart-pulse",
            Category::Education => "graduation-cap",
            Category::Utilities => "receipt",
            Category::Entertainment => "clapperboard",
            Category::Travel => "plane",
            Category::Cash => "banknote",
            Category::Fees => "percent",
            Category::Other => "tag",
        }
    }
}

/// Ordered keyword table. Earlier rows win when a description matches
/// several rows, so specific brands come before generic words.
pub static CATEGORY_RULES: &[(Category, &[&str])] = &[
    (
        Category::Subscriptions,
        &[
            "netflix", "spotify", "youtube", "apple.com", "icloud", "google one",
            "amazon prime", "prime video", "exxen", "blutv", "disney", "gain",
            "tod tv", "mubi", "storytel", "abonelik",
        ],
    ),
    (
        Category::Groceries,
        &[
            "migros", "carrefour", "a101", "bim ", "sok market", "şok", "macrocenter",
            "getir", "istegelsin", "market", "bakkal", "grocery", "şarküteri",
        ],
    ),
    (
        Category::Dining,
        &[
            "yemeksepeti", "starbucks", "mcdonald", "burger king", "kfc", "dominos",
            "restoran", "restaurant", "cafe", "kafe", "lokanta", "pastane",
            "kahve", "trendyol yemek",
        ],
    ),
    (
        Category::Transport,
        &[
            "shell", "opet", "bp ", "petrol ofisi", "total", "istanbulkart",
            "akbil", "metro", "ido", "uber", "bitaksi", "marti", "otopark",
            "hgs", "ogs", "taksi", "benzin", "akaryakit",
        ],
    ),
    (
        Category::Clothing,
        &[
            "zara", "h&m", "lcw", "lc waikiki", "defacto", "koton", "mavi",
            "boyner", "flo ", "nike", "adidas", "decathlon", "giyim",
        ],
    ),
    (
        Category::Electronics,
        &[
            "teknosa", "mediamarkt", "vatan bilgisayar", "apple store", "samsung",
            "hepsiburada", "amazon", "trendyol", "n11", "elektronik",
        ],
    ),
    (
        Category::Health,
        &[
            "eczane", "pharmacy", "hastane", "hospital", "klinik", "medikal",
            "optik", "dis hekimi", "saglik",
        ],
    ),
    (
        Category::Education,
        &[
            "udemy", "coursera", "kitap", "kirtasiye", "okul", "universite",
            "üniversite", "kurs", "egitim", "eğitim",
        ],
    ),
    (
        Category::Utilities,
        &[
            "turkcell", "vodafone", "turk telekom", "türk telekom", "superonline",
            "elektrik", "dogalgaz", "doğalgaz", "igdas", "iski", "su fatura",
            "aidat", "fatura", "bill payment",
        ],
    ),
    (
        Category::Entertainment,
        &[
            "sinema", "cinema", "cinemaximum", "paribu cineverse", "tiyatro",
            "konser", "biletix", "steam", "playstation", "oyun",
        ],
    ),
    (
        Category::Travel,
        &[
            "thy ", "turkish airlines", "pegasus", "anadolujet", "sunexpress",
            "otel", "hotel", "booking", "airbnb", "obilet", "enuygun",
        ],
    ),
    (
        Category::Cash,
        &["atm", "nakit", "para cekme", "para çekme", "cash withdrawal"],
    ),
    (
        Category::Fees,
        &[
            "faiz", "ucret", "ücret", "komisyon", "kart aidat", "gecikme",
            "bsmv", "kkdf", "fee", "interest",
        ],
    ),
];

/// Classify a normalized description. First table row with a substring
/// hit wins; nothing matching falls through to `Other`.
pub fn categorize(description: &str) -> Category {
    let desc = description.to_lowercase();
    for (category, keywords) in CATEGORY_RULES {
        if keywords.iter().any(|k| desc.contains(k)) {
            return *category;
        }
    }
    Category::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groceries() {
        assert_eq!(categorize("MIGROS SANAL MARKET ISTANBUL"), Category::Groceries);
        assert_eq!(categorize("A101 YENI MAGAZACILIK"), Category::Groceries);
    }

    #[test]
    fn test_subscription_beats_electronics() {
        // "amazon prime" appears before "amazon" in the table.
        assert_eq!(categorize("AMAZON PRIME UYELIK"), Category::Subscriptions);
        assert_eq!(categorize("AMAZON.COM.TR SIPARIS"), Category::Electronics);
    }

    #[test]
    fn test_dining_and_transport() {
        assert_eq!(categorize("YEMEKSEPETI*LEZZET DURAGI"), Category::Dining);
        assert_eq!(categorize("SHELL PETROL MASLAK"), Category::Transport);
    }

    #[test]
    fn test_default_category() {
        assert_eq!(categorize("XYZZY UNKNOWN MERCHANT"), Category::Other);
    }

    #[test]
    fn test_order_is_stable() {
        // "market" (groceries) and "fatura" (utilities) both match here;
        // groceries is declared first and must win.
        assert_eq!(categorize("MARKET FATURA ODEMESI"), Category::Groceries);
    }

    #[test]
    fn test_metadata_lookup() {
        assert_eq!(Category::Cash.label(), "Cash Withdrawal");
        assert!(Category::Dining.color().starts_with('#'));
        assert_eq!(Category::Travel.icon(), "plane");
    }
}
