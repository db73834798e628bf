use bytes::Bytes;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use futures_util::StreamExt;
use reduct_client::{Client, ClientOptions, MockHttpClient, MockResponse, QueryOptions};

const CHUNK_SIZE: usize = 64 * 1024;

// One-record query whose body is `size` bytes in 64 KiB chunks.
fn server(size: usize) -> MockHttpClient {
    let chunk = Bytes::from(vec![0u8; CHUNK_SIZE]);
    let chunks: Vec<Bytes> = (0..size / CHUNK_SIZE).map(|_| chunk.clone()).collect();
    MockHttpClient::new(move |req| {
        Ok(match req.path.as_str() {
            "/b/bench/data/q" => MockResponse::new(200).body(r#"{"id": 1}"#),
            "/b/bench/data" if req.query_value("q").is_some() => MockResponse::new(200)
                .header("x-reduct-time", "1")
                .header("x-reduct-last", "1")
                .header("content-length", size.to_string())
                .chunks(chunks.clone()),
            _ => MockResponse::new(200),
        })
    })
}

fn bench_record_body(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_body");
    let rt = tokio::runtime::Runtime::new().unwrap();

    for size in [CHUNK_SIZE, 1024 * 1024, 16 * 1024 * 1024] {
        let client = Client::with_transport(server(size), ClientOptions::default());
        let bucket = rt.block_on(client.get_bucket("bench")).unwrap();
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("stream", size), &size, |b, _| {
            b.iter(|| {
                rt.block_on(async {
                    let mut query = bucket.query("data", QueryOptions::default()).await.unwrap();
                    let record = query.next().await.unwrap().unwrap();
                    let mut stream = Box::pin(record.into_stream());
                    let mut total = 0;
                    while let Some(chunk) = stream.next().await {
                        total += black_box(chunk.unwrap()).len();
                    }
                    total
                })
            });
        });

        group.bench_with_input(BenchmarkId::new("bytes", size), &size, |b, _| {
            b.iter(|| {
                rt.block_on(async {
                    let mut query = bucket.query("data", QueryOptions::default()).await.unwrap();
                    let record = query.next().await.unwrap().unwrap();
                    black_box(record.bytes().await.unwrap())
                })
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_record_body);
criterion_main!(benches);
