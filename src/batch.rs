//! Batch quoting against one pre-loaded engine
//!
//! Loads the underwriting dataset once, then prices many client requests
//! without re-reading it. Each request succeeds or fails on its own.

use crate::dataset::{load_dataset_from_path, load_dataset_from_reader};
use crate::error::{LoadError, QuoteError};
use crate::quote::{Quote, QuoteEngine, QuoteRequest};
use rayon::prelude::*;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// Outcome of one request in a batch
pub type BatchResult = Result<Vec<Quote>, QuoteError>;

/// Pre-loaded batch quoter
///
/// # Example
/// ```ignore
/// let quoter = BatchQuoter::from_path("carrier_underwriting.json")?;
/// let requests = load_requests("requests.csv")?;
/// for (request, result) in requests.iter().zip(quoter.run_batch_parallel(&requests)) {
///     println!("{:?}: {:?}", request, result.map(|q| q.len()));
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BatchQuoter {
    engine: QuoteEngine,
}

impl BatchQuoter {
    pub fn new(engine: QuoteEngine) -> Self {
        Self { engine }
    }

    /// Create a quoter by loading a dataset file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let value = load_dataset_from_path(path)?;
        Ok(Self::new(QuoteEngine::from_value(value)?))
    }

    pub fn engine(&self) -> &QuoteEngine {
        &self.engine
    }

    /// Price requests one after another
    pub fn run_batch(&self, requests: &[QuoteRequest]) -> Vec<BatchResult> {
        requests
            .iter()
            .map(|request| self.engine.calculate_quotes(request))
            .collect()
    }

    /// Price requests across the rayon thread pool; output order matches input order
    pub fn run_batch_parallel(&self, requests: &[QuoteRequest]) -> Vec<BatchResult> {
        requests
            .par_iter()
            .map(|request| self.engine.calculate_quotes(request))
            .collect()
    }

    /// Cheapest quote for a request, if any product is eligible
    pub fn cheapest(&self, request: &QuoteRequest) -> Result<Option<Quote>, QuoteError> {
        Ok(self.engine.calculate_quotes(request)?.into_iter().next())
    }
}

/// Raw CSV row of a request file
#[derive(Debug, Deserialize)]
struct CsvRow {
    age: f64,
    gender: String,
    state: String,
    coverage: f64,
    #[serde(default)]
    term: Option<u32>,
    #[serde(default)]
    product: Option<String>,
    #[serde(default)]
    health: Option<String>,
    #[serde(default)]
    nicotine: Option<bool>,
    #[serde(default)]
    modality: Option<String>,
}

impl CsvRow {
    fn into_request(self) -> QuoteRequest {
        QuoteRequest {
            term_years: self.term,
            product_type: self.product,
            health_class: self.health,
            nicotine_use: self.nicotine.unwrap_or(false),
            modality: self.modality,
            ..QuoteRequest::new(self.age, self.coverage, &self.gender, &self.state)
        }
    }
}

/// Load quote requests from a CSV file with columns
/// `age,gender,state,coverage,term,product,health,nicotine,modality`
pub fn load_requests<P: AsRef<Path>>(path: P) -> Result<Vec<QuoteRequest>, csv::Error> {
    let reader = csv::Reader::from_path(path)?;
    read_requests(reader)
}

/// Load quote requests from any reader
pub fn load_requests_from_reader<R: Read>(reader: R) -> Result<Vec<QuoteRequest>, csv::Error> {
    read_requests(csv::Reader::from_reader(reader))
}

fn read_requests<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<QuoteRequest>, csv::Error> {
    let mut requests = Vec::new();
    for result in reader.deserialize() {
        let row: CsvRow = result?;
        requests.push(row.into_request());
    }
    Ok(requests)
}

/// Build a quoter from a dataset held in any reader
pub fn quoter_from_reader<R: Read>(reader: R) -> Result<BatchQuoter, LoadError> {
    let value = load_dataset_from_reader(reader)?;
    Ok(BatchQuoter::new(QuoteEngine::from_value(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATASET: &str = r#"{
        "carriers": [
            { "name": "Alpha", "products": [
                { "name": "Alpha Term", "type": "term", "term_years": 20,
                  "rate_table": [{ "min_age": 18, "max_age": 70, "rates": { "male": 0.3, "female": 0.25 } }] }
            ] },
            { "name": "Beta", "products": [
                { "name": "Beta Term", "type": "term", "term_years": 20,
                  "rate_table": [{ "min_age": 18, "max_age": 60, "rates": { "male": 0.2, "female": 0.18 } }] }
            ] }
        ]
    }"#;

    const REQUESTS: &str = "age,gender,state,coverage,term,product,health,nicotine,modality
35,male,TX,100000,20,term,preferred plus,false,monthly
65,female,CA,50000,,,,true,
40,alien,TX,100000,,,,,
";

    #[test]
    fn test_load_requests() {
        let requests = load_requests_from_reader(REQUESTS.as_bytes()).unwrap();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].term_years, Some(20));
        assert_eq!(requests[0].health_class.as_deref(), Some("preferred plus"));
        assert_eq!(requests[1].term_years, None);
        assert!(requests[1].nicotine_use);
        assert_eq!(requests[1].modality, None);
    }

    #[test]
    fn test_run_batch_matches_parallel() {
        let quoter = quoter_from_reader(DATASET.as_bytes()).unwrap();
        let requests = load_requests_from_reader(REQUESTS.as_bytes()).unwrap();

        let serial = quoter.run_batch(&requests);
        let parallel = quoter.run_batch_parallel(&requests);
        assert_eq!(serial.len(), 3);

        for (a, b) in serial.iter().zip(parallel.iter()) {
            match (a, b) {
                (Ok(a), Ok(b)) => assert_eq!(a, b),
                (Err(_), Err(_)) => {}
                _ => panic!("serial and parallel runs disagree"),
            }
        }

        // Age 35 qualifies for both carriers; Beta is cheaper
        let first = serial[0].as_ref().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].carrier, "Beta");

        // Age 65 only fits Alpha's band
        assert_eq!(serial[1].as_ref().unwrap().len(), 1);

        // Bad gender fails its own row only
        assert!(matches!(serial[2], Err(QuoteError::UnsupportedGender(_))));
    }

    #[test]
    fn test_fixture_block() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        let quoter = BatchQuoter::from_path(root.join("carrier_underwriting.json")).unwrap();
        let requests = load_requests(root.join("sample_requests.csv")).unwrap();
        let results = quoter.run_batch_parallel(&requests);
        assert_eq!(results.len(), requests.len());
        assert!(results.iter().all(|r| r.is_ok()));

        // Final expense regression row
        let fe = results[3].as_ref().unwrap();
        assert_eq!(fe.len(), 1);
        assert_eq!(fe[0].carrier, "Acme");
        assert_eq!(fe[0].premium, 119.92);

        // Keystone IUL excludes NY
        assert!(results[4].as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_cheapest() {
        let quoter = quoter_from_reader(DATASET.as_bytes()).unwrap();
        let best = quoter.cheapest(&QuoteRequest::new(35.0, 100_000.0, "male", "TX")).unwrap();
        assert_eq!(best.map(|q| q.carrier), Some("Beta".to_string()));

        let none = quoter.cheapest(&QuoteRequest::new(90.0, 100_000.0, "male", "TX")).unwrap();
        assert!(none.is_none());
    }
}
