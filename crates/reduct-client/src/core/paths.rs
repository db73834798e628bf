//! Request paths and query parameters of the storage API.

use crate::data::QueryOptions;

pub const INFO_PATH: &str = "/info";
pub const LIST_PATH: &str = "/list";
pub const REFRESH_PATH: &str = "/auth/refresh";

pub fn bucket_path(bucket: &str) -> String {
    format!("/b/{bucket}")
}

pub fn entry_path(bucket: &str, entry: &str) -> String {
    format!("/b/{bucket}/{entry}")
}

pub fn query_path(entry_path: &str) -> String {
    format!("{entry_path}/q")
}

/// Parameters of the open-query call. Unset bounds are omitted.
///
/// The TTL is sent in whole seconds, rounding any partial second up.
pub fn query_params(options: &QueryOptions) -> Vec<(String, String)> {
    let mut params = Vec::with_capacity(3);
    if let Some(start) = options.start {
        params.push(("start".to_string(), start.to_string()));
    }
    if let Some(stop) = options.stop {
        params.push(("stop".to_string(), stop.to_string()));
    }
    if let Some(ttl) = options.ttl {
        let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
        params.push(("ttl".to_string(), secs.to_string()));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn builds_paths() {
        assert_eq!(bucket_path("data"), "/b/data");
        assert_eq!(entry_path("data", "temp"), "/b/data/temp");
        assert_eq!(query_path("/b/data/temp"), "/b/data/temp/q");
    }

    #[test]
    fn omits_unset_query_params() {
        assert!(query_params(&QueryOptions::default()).is_empty());

        let params = query_params(&QueryOptions::default().stop(5000));
        assert_eq!(params, vec![("stop".to_string(), "5000".to_string())]);
    }

    #[test]
    fn ttl_is_sent_in_seconds() {
        let options = QueryOptions::default()
            .start(1000)
            .stop(5000)
            .ttl(Duration::from_millis(2500));
        assert_eq!(
            query_params(&options),
            vec![
                ("start".to_string(), "1000".to_string()),
                ("stop".to_string(), "5000".to_string()),
                ("ttl".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn sub_second_ttl_rounds_up() {
        let ttl = |d: Duration| query_params(&QueryOptions::default().ttl(d));
        assert_eq!(ttl(Duration::from_millis(500))[0].1, "1");
        assert_eq!(ttl(Duration::from_secs(30))[0].1, "30");
        assert_eq!(ttl(Duration::ZERO)[0].1, "0");
    }
}
