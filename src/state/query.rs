//! Batched state query engine
//!
//! One batched read per device covers every live spec; history-backed
//! specs are resolved through the event feed and merged on top. Every
//! normalized key is present in the result no matter what the server
//! returned: missing attributes keep their spec defaults.

use crate::client::{AqaraApi, QueryRequest};
use crate::error::Result;
use crate::registry::{AttrValue, AttributeSpec};
use crate::state::{coerce, extract, history, Snapshot};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Fetch a normalized snapshot for one device over one spec set
///
/// A non-zero status code from the server aborts the whole fetch; partial
/// success is not represented. Per-attribute problems never do, since an
/// absent or unparseable value falls back to the spec default.
pub async fn fetch_states(
    api: &dyn AqaraApi,
    did: &str,
    specs: &[AttributeSpec],
) -> Result<Snapshot> {
    let mut snapshot = Snapshot::new();

    // Total coverage first: every normalized key gets its default
    for spec in specs {
        snapshot.insert(spec.normalized_key, spec.default.clone());
    }

    let live: Vec<&AttributeSpec> = specs.iter().filter(|s| s.wire_key.is_some()).collect();
    let history_backed: Vec<&AttributeSpec> = specs
        .iter()
        .filter(|s| s.history_resource.is_some())
        .collect();

    if !live.is_empty() {
        let by_wire_key: HashMap<&str, &AttributeSpec> = live
            .iter()
            .filter_map(|s| s.wire_key.map(|k| (k, *s)))
            .collect();

        let request = QueryRequest::batched(did, by_wire_key.keys().copied());
        let response = api.res_query(&request).await?;
        let result = response.ensure_success("query device states")?;

        let items = extract::result_items(&result);
        debug!("query for {did} returned {} items", items.len());
        for item in items {
            let Some(key) = extract::item_attr(item) else {
                continue;
            };
            let Some(spec) = by_wire_key.get(key) else {
                continue;
            };
            let value = extract::item_value(item).unwrap_or(&Value::Null);
            snapshot.insert(spec.normalized_key, coerce::coerce(spec, value));
        }
    }

    if !history_backed.is_empty() {
        let signals = history::resolve_history_signals(api, did, &history_backed).await?;
        for (key, ts) in signals {
            snapshot.insert(key, AttrValue::Float(ts));
        }
    }

    Ok(snapshot)
}
