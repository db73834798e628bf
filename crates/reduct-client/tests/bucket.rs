use reduct_client::{
    BucketSettings, Client, ClientOptions, Method, MockHttpClient, MockResponse, QuotaType,
};

const DETAILS: &str = r#"{
    "settings": {"max_block_size": 64000000, "quota_type": "FIFO", "quota_size": "1000000000"},
    "info": {"name": "data", "entry_count": 1, "size": 300, "oldest_record": 1000, "latest_record": 4000},
    "entries": [
        {"name": "temp", "size": 300, "record_count": 2, "block_count": 1, "oldest_record": 1000, "latest_record": 4000}
    ]
}"#;

fn client(mock: &MockHttpClient) -> Client<MockHttpClient> {
    Client::with_transport(mock.clone(), ClientOptions::default().access_token("T1"))
}

#[tokio::test]
async fn server_info_and_bucket_list() {
    let mock = MockHttpClient::new(|req| {
        Ok(match req.path.as_str() {
            "/info" => MockResponse::new(200).body(
                r#"{"version": "1.9.0", "bucket_count": "2", "usage": 300, "uptime": 60,
                    "oldest_record": 1000, "latest_record": 4000}"#,
            ),
            "/list" => MockResponse::new(200).body(
                r#"{"buckets": [{"name": "data", "entry_count": 1, "size": 300},
                                {"name": "logs", "entry_count": 0, "size": 0}]}"#,
            ),
            _ => MockResponse::new(404),
        })
    });
    let client = client(&mock);

    let info = client.info().await.unwrap();
    assert_eq!(info.bucket_count, 2);
    assert_eq!(info.latest_record, 4000);

    let names: Vec<_> = client
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.name)
        .collect();
    assert_eq!(names, ["data", "logs"]);
    assert_eq!(
        mock.requests()[0].header_value("authorization"),
        Some("Bearer T1")
    );
}

#[tokio::test]
async fn create_bucket_sends_settings() {
    let mock = MockHttpClient::sequence([MockResponse::new(200)]);
    let settings = BucketSettings::default()
        .quota_type(QuotaType::Fifo)
        .quota_size(1_000);

    let bucket = client(&mock)
        .create_bucket("data", Some(&settings))
        .await
        .unwrap();
    assert_eq!(bucket.name(), "data");

    let request = &mock.requests()[0];
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.path, "/b/data");
    let body: serde_json::Value = serde_json::from_slice(request.body.as_deref().unwrap()).unwrap();
    assert_eq!(
        body,
        serde_json::json!({"quota_type": "FIFO", "quota_size": 1000})
    );
}

#[tokio::test]
async fn get_or_create_falls_back_to_existing_bucket() {
    let mock = MockHttpClient::new(|req| {
        Ok(match req.method {
            Method::Post => {
                MockResponse::new(409).header("x-reduct-error", "Bucket 'data' already exists")
            }
            _ => MockResponse::new(200).body(DETAILS),
        })
    });

    let bucket = client(&mock)
        .get_or_create_bucket("data", None)
        .await
        .unwrap();
    assert_eq!(bucket.name(), "data");
    assert_eq!(mock.requests().len(), 2);
    assert_eq!(mock.requests()[1].method, Method::Get);
}

#[tokio::test]
async fn get_missing_bucket_is_not_found() {
    let mock = MockHttpClient::sequence([
        MockResponse::new(404).header("x-reduct-error", "Bucket 'nope' is not found"),
    ]);

    let err = client(&mock).get_bucket("nope").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("Bucket 'nope' is not found"));
}

#[tokio::test]
async fn bucket_details() {
    let mock = MockHttpClient::new(|_| Ok(MockResponse::new(200).body(DETAILS)));
    let bucket = client(&mock).get_bucket("data").await.unwrap();

    let settings = bucket.settings().await.unwrap();
    assert_eq!(settings.quota_type, Some(QuotaType::Fifo));
    assert_eq!(settings.quota_size, Some(1_000_000_000));

    let info = bucket.info().await.unwrap();
    assert_eq!(info.entry_count, 1);

    let entries = bucket.entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].record_count, 2);
}

#[tokio::test]
async fn write_read_and_remove() {
    let mock = MockHttpClient::new(|req| {
        Ok(match (req.method, req.path.as_str()) {
            (Method::Get, "/b/data/temp") => MockResponse::new(200)
                .header("x-reduct-time", "1000")
                .chunks(["ab", "c"]),
            _ => MockResponse::new(200),
        })
    });
    let bucket = client(&mock).get_bucket("data").await.unwrap();

    bucket.write("temp", "abc", Some(1000)).await.unwrap();
    assert_eq!(bucket.read("temp", Some(1000)).await.unwrap(), "abc");
    bucket.remove().await.unwrap();

    let requests = mock.requests();
    let write = &requests[1];
    assert_eq!(write.method, Method::Post);
    assert_eq!(write.query_value("ts"), Some("1000"));
    assert_eq!(write.header_value("content-length"), Some("3"));
    assert_eq!(write.body.as_deref(), Some(&b"abc"[..]));

    assert_eq!(requests[2].query_value("ts"), Some("1000"));
    assert_eq!(requests[3].method, Method::Delete);
    assert_eq!(requests[3].path, "/b/data");
}

#[tokio::test]
async fn set_settings_sends_only_given_fields() {
    let mock = MockHttpClient::new(|_| Ok(MockResponse::new(200)));
    let bucket = client(&mock).get_bucket("data").await.unwrap();

    bucket
        .set_settings(&BucketSettings::default().max_block_size(1024))
        .await
        .unwrap();

    let request = &mock.requests()[1];
    assert_eq!(request.method, Method::Put);
    assert_eq!(request.body.as_deref(), Some(&br#"{"max_block_size":1024}"#[..]));
}
