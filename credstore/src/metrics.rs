use std::sync::Mutex;

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter_vec, Histogram, IntCounterVec,
};

const DEFAULT_SERVICE: &str = "credstore";
const NAMESPACE: &str = "table";

// Allow the SERVICE to be dynamically configurable
lazy_static! {
    static ref SERVICE: Mutex<String> = Mutex::new(DEFAULT_SERVICE.to_string());
}

pub const STATUS_HIT: &str = "hit";
pub const STATUS_MISS: &str = "miss";

pub const REASON_LOAD: &str = "load";
pub const REASON_TOMBSTONES: &str = "tombstones";
pub const REASON_EXHAUSTED: &str = "exhausted";

// ProbingTable metrics
lazy_static! {
    // status values: [hit, miss]
    pub static ref LOOKUPS: IntCounterVec = register_int_counter_vec!(
        prefix_name(NAMESPACE, "lookup_count").as_str(),
        "count of table lookups broken down by status",
        &["status"]
    )
    .unwrap();
    // reason values: [load, tombstones, exhausted]
    pub static ref REHASHES: IntCounterVec = register_int_counter_vec!(
        prefix_name(NAMESPACE, "rehash_count").as_str(),
        "count of table rehashes broken down by what triggered them",
        &["reason"]
    )
    .unwrap();
    pub static ref PROBE_LENGTH: Histogram = register_histogram!(
        prefix_name(NAMESPACE, "probe_length").as_str(),
        "number of slots visited by a lookup or an insertion",
        vec!(1.0, 2.0, 3.0, 4.0, 6.0, 8.0, 16.0, 32.0, 64.0)
    )
    .unwrap();
}

fn prefix_name(namespace: &str, name: &str) -> String {
    let service = SERVICE
        .lock()
        .expect("Couldn't get service name for table metrics");
    format!("{service}_{namespace}_{name}")
}

/// Sets the name for the "service" field of table metrics. Needs to be set as
/// part of application startup before table metrics are initialized.
pub fn set_metrics_service_name(service_name: String) {
    let mut contents = SERVICE
        .lock()
        .expect("FATAL: couldn't lock table metrics service name");
    *contents = service_name;
}
