//! Sales totals for one product in one city, with misspelled city names
//! grouped by their Soundex code.

use std::{collections::BTreeSet, path::PathBuf};

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parameters accepted by `analyze_sales_with_phonetic_clustering`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SalesQuery {
    /// JSON array of [`SalesRecord`]s.
    pub file_path: PathBuf,
    pub product: String,
    pub city: String,
    /// Only transactions with at least this many units are counted.
    #[serde(default)]
    pub min_sales: u64,
}

/// One transaction in the sales file. Extra fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct SalesRecord {
    pub city: String,
    pub product: String,
    pub sales: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesSummary {
    pub city: String,
    pub product: String,
    pub min_sales: u64,
    pub total_sales: u64,
    pub transactions: usize,
    /// Distinct spellings that fell into the target city's cluster.
    pub matched_cities: Vec<String>,
}

/// Reads the sales file named by `query.file_path` and summarizes it.
pub async fn analyze(query: &SalesQuery) -> anyhow::Result<SalesSummary> {
    let raw = tokio::fs::read(&query.file_path)
        .await
        .with_context(|| format!("failed to read sales file {}", query.file_path.display()))?;
    let records: Vec<SalesRecord> = serde_json::from_slice(&raw)
        .context("sales file must be a JSON array of {city, product, sales} records")?;
    summarize(query, &records)
}

/// Sums `sales` over records in the target city's cluster that match the product.
pub fn summarize(query: &SalesQuery, records: &[SalesRecord]) -> anyhow::Result<SalesSummary> {
    let target = soundex(&query.city)
        .ok_or_else(|| anyhow!("city `{}` has no letters to cluster on", query.city))?;
    let product = query.product.trim();

    let mut total_sales = 0u64;
    let mut transactions = 0usize;
    let mut matched = BTreeSet::new();

    for record in records {
        if !record.product.trim().eq_ignore_ascii_case(product) || record.sales < query.min_sales {
            continue;
        }
        if soundex(&record.city).as_deref() != Some(target.as_str()) {
            continue;
        }
        total_sales = total_sales.saturating_add(record.sales);
        transactions += 1;
        matched.insert(record.city.trim().to_string());
    }

    debug!(%target, total_sales, transactions, "sales cluster summarized");
    Ok(SalesSummary {
        city: query.city.clone(),
        product: query.product.clone(),
        min_sales: query.min_sales,
        total_sales,
        transactions,
        matched_cities: matched.into_iter().collect(),
    })
}

/// American Soundex over the ASCII letters of `word`.
///
/// Returns `None` when `word` has no ASCII letters.
pub fn soundex(word: &str) -> Option<String> {
    let mut letters = word
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase());

    let first = letters.next()?;
    let mut out = String::with_capacity(4);
    out.push(first);
    let mut last = soundex_digit(first);

    for c in letters {
        match soundex_digit(c) {
            Some(d) if Some(d) != last => {
                out.push(d);
                if out.len() == 4 {
                    break;
                }
                last = Some(d);
            }
            Some(_) => {}
            // H and W do not separate equal codes; vowels (and Y) do.
            None if c == 'H' || c == 'W' => {}
            None => last = None,
        }
    }

    while out.len() < 4 {
        out.push('0');
    }
    Some(out)
}

fn soundex_digit(c: char) -> Option<char> {
    match c {
        'B' | 'F' | 'P' | 'V' => Some('1'),
        'C' | 'G' | 'J' | 'K' | 'Q' | 'S' | 'X' | 'Z' => Some('2'),
        'D' | 'T' => Some('3'),
        'L' => Some('4'),
        'M' | 'N' => Some('5'),
        'R' => Some('6'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(city: &str, product: &str, sales: u64) -> SalesRecord {
        SalesRecord {
            city: city.into(),
            product: product.into(),
            sales,
        }
    }

    fn query(city: &str, product: &str, min_sales: u64) -> SalesQuery {
        SalesQuery {
            file_path: PathBuf::from("unused.json"),
            product: product.into(),
            city: city.into(),
            min_sales,
        }
    }

    #[test]
    fn soundex_reference_codes() {
        assert_eq!(soundex("Robert").as_deref(), Some("R163"));
        assert_eq!(soundex("Rupert").as_deref(), Some("R163"));
        assert_eq!(soundex("Ashcraft").as_deref(), Some("A261"));
        assert_eq!(soundex("Tymczak").as_deref(), Some("T522"));
        assert_eq!(soundex("Pfister").as_deref(), Some("P236"));
        assert_eq!(soundex("Lee").as_deref(), Some("L000"));
        assert_eq!(soundex("123"), None);
    }

    #[test]
    fn misspellings_share_a_code() {
        let codes: BTreeSet<_> = ["Shanghai", "Shanghi", "Shangai", "shanghai "]
            .iter()
            .filter_map(|c| soundex(c))
            .collect();
        assert_eq!(codes.len(), 1);
    }

    #[test]
    fn summarize_filters_product_threshold_and_cluster() {
        let records = vec![
            rec("Shanghai", "Shirt", 100),
            rec("Shanghi", "shirt", 95),
            rec("Shangai", "Shirt", 10),
            rec("Beijing", "Shirt", 500),
            rec("Shanghai", "Jeans", 300),
        ];
        let s = summarize(&query("Shanghai", "Shirt", 91), &records).unwrap();
        assert_eq!(s.total_sales, 195);
        assert_eq!(s.transactions, 2);
        assert_eq!(s.matched_cities, vec!["Shanghai", "Shanghi"]);
    }

    #[test]
    fn city_without_letters_is_an_error() {
        assert!(summarize(&query("42", "Shirt", 0), &[]).is_err());
    }

    #[tokio::test]
    async fn analyze_reads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.json");
        std::fs::write(
            &path,
            r#"[{"city":"Lagos","product":"Soap","sales":7,"id":1},{"city":"Lagoss","product":"Soap","sales":3}]"#,
        )
        .unwrap();
        let mut q = query("Lagos", "Soap", 0);
        q.file_path = path;
        let s = analyze(&q).await.unwrap();
        assert_eq!(s.total_sales, 10);
    }

    #[test]
    fn unknown_parameters_are_rejected() {
        let v = serde_json::json!({"file_path": "x", "product": "p", "city": "c", "oops": 1});
        assert!(serde_json::from_value::<SalesQuery>(v).is_err());
    }
}
