// SPDX-License-Identifier: Apache-2.0

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::time::Duration;

use serde_json::Value;
use tempfile::TempDir;
use tidewatch_server::{build_router, AppState, ServerConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

async fn spawn_server() -> (SocketAddr, TempDir) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = ServerConfig {
        data_root: tmp.path().join("data"),
        upstream_base_url: "http://127.0.0.1:9".to_string(),
        upstream_timeout: Duration::from_millis(200),
        ..ServerConfig::default()
    };
    let state = AppState::new(config);
    state.ready.store(true, Ordering::Relaxed);
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    (addr, tmp)
}

async fn send_raw(addr: SocketAddr, request: String) -> (u16, Value) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    stream
        .write_all(request.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("status");
    let body_json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body).unwrap_or(Value::String(body.to_string()))
    };
    (status, body_json)
}

async fn get(addr: SocketAddr, path: &str) -> (u16, Value) {
    send_raw(
        addr,
        format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n"),
    )
    .await
}

async fn bare(addr: SocketAddr, method: &str, path: &str) -> (u16, Value) {
    send_raw(
        addr,
        format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n"),
    )
    .await
}

async fn send_json(addr: SocketAddr, method: &str, path: &str, payload: &str) -> (u16, Value) {
    send_raw(
        addr,
        format!(
            "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
            payload.len()
        ),
    )
    .await
}

#[tokio::test]
async fn species_crud_round_trip() {
    let (addr, _tmp) = spawn_server().await;
    let new_species = r#"{"species":"전갱이","impact":55,"previousPopulation":9000,"currentPopulation":9450,"populationChange":5.0,"trend":"개선"}"#;

    let (status, body) = send_json(addr, "POST", "/species", new_species).await;
    assert_eq!(status, 201);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "새 어종이 성공적으로 추가되었습니다.");
    assert_eq!(body["data"]["id"], 7);
    assert_eq!(body["data"]["species"], "전갱이");
    assert!(body["data"]["lastUpdated"].is_string());

    let (status, body) = send_json(addr, "POST", "/species", new_species).await;
    assert_eq!(status, 409);
    assert_eq!(body["error"], "이미 존재하는 어종입니다.");
    assert_eq!(body["code"], "conflict");

    let missing_impact = r#"{"species":"청새치","previousPopulation":100,"currentPopulation":90,"populationChange":-10.0,"trend":"악화"}"#;
    let (status, body) = send_json(addr, "POST", "/species", missing_impact).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "필수 필드가 누락되었습니다: impact");

    let (status, body) = get(addr, "/species/7").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["species"], "전갱이");

    let (status, body) = get(addr, "/species/abc").await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "어종을 찾을 수 없습니다.");

    let (status, body) = send_json(addr, "PUT", "/species/7", r#"{"impact":61}"#).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "어종 데이터가 성공적으로 업데이트되었습니다.");
    assert_eq!(body["data"]["impact"], 61);

    // ids are immutable, so the patch schema rejects them outright
    let (status, body) = send_json(addr, "PUT", "/species/7", r#"{"id":9}"#).await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "validation_failed");

    let (status, body) = send_json(addr, "PUT", "/species/999", r#"{"impact":10}"#).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "어종을 찾을 수 없습니다.");

    let (status, body) = send_json(addr, "PUT", "/species/7", r#"{"species":"고등어"}"#).await;
    assert_eq!(status, 409);
    assert_eq!(body["error"], "이미 존재하는 어종입니다.");

    let (status, body) = bare(addr, "DELETE", "/species/7").await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "어종이 성공적으로 삭제되었습니다.");
    assert_eq!(body["data"]["id"], 7);

    let (status, _) = get(addr, "/species/7").await;
    assert_eq!(status, 404);

    let (status, body) = get(addr, "/species").await;
    assert_eq!(status, 200);
    assert_eq!(body["total"], 6);
}

#[tokio::test]
async fn region_snapshot_update_persists() {
    let (addr, _tmp) = spawn_server().await;

    let (status, body) = send_json(
        addr,
        "PUT",
        "/regions?region=west&timeRange=1month",
        r#"{"risk":"중간","concentration":"2.9"}"#,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "데이터가 성공적으로 업데이트되었습니다.");
    assert_eq!(body["data"]["risk"], "중간");
    assert_eq!(body["data"]["concentration"], "2.9");
    assert_eq!(body["data"]["species"], 67);

    let (status, body) = get(addr, "/regions?region=west&timeRange=1month").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["risk"], "중간");
    assert_eq!(body["data"]["concentration"], "2.9");

    let (status, body) = bare(addr, "PUT", "/regions").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "지역과 기간을 모두 지정해야 합니다.");

    let (status, body) = send_json(
        addr,
        "PUT",
        "/regions?region=west&timeRange=1month",
        r#"{"concentraton":"1.0"}"#,
    )
    .await;
    assert_eq!(status, 400);
    let message = body["error"].as_str().unwrap_or_default();
    assert!(message.contains("invalid snapshot patch"), "{message}");

    let (status, body) = send_json(
        addr,
        "PUT",
        "/regions?region=ghost&timeRange=1month",
        "{}",
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "지역을 찾을 수 없습니다.");
}

#[tokio::test]
async fn admin_overview_and_backup_receipt() {
    let (addr, tmp) = spawn_server().await;

    let (status, body) = get(addr, "/admin").await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["stats"]["regions"], 5);
    assert_eq!(body["stats"]["species"], 6);
    assert_eq!(body["stats"]["pollutionSources"], 5);
    assert_eq!(body["stats"]["chartDataPoints"], 12);
    assert_eq!(body["stats"]["totalRecords"], 43);
    assert_eq!(body["stats"]["version"], "1.0.0");
    assert_eq!(body["riskDistribution"]["매우높음"], 3);
    assert_eq!(body["riskDistribution"]["높음"], 4);
    assert_eq!(body["riskDistribution"]["중간"], 7);
    assert_eq!(body["riskDistribution"]["낮음"], 5);
    assert_eq!(body["riskDistribution"]["매우낮음"], 1);
    let recent = body["recentSpecies"].as_array().expect("recent species");
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0]["id"], 1);
    assert_eq!(body["systemInfo"]["runtime"], "axum");
    assert_eq!(body["systemInfo"]["environment"], "development");

    let (status, body) = bare(addr, "POST", "/admin").await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "데이터 백업이 성공적으로 생성되었습니다.");
    let file_name = body["backupFile"].as_str().expect("backup file name");
    assert!(file_name.starts_with("backup-"), "{file_name}");
    assert!(file_name.ends_with(".json"), "{file_name}");
    assert!(body["bytesWritten"].as_u64().unwrap_or(0) > 0);
    assert_eq!(body["sha256"].as_str().map(str::len), Some(64));

    let backup_path = tmp.path().join("data").join("backups").join(file_name);
    assert!(backup_path.is_file(), "missing {}", backup_path.display());
}

#[tokio::test]
async fn real_data_surface_with_local_fixture() {
    let (addr, _tmp) = spawn_server().await;

    // Network sources point at a closed local port; only the bundled research
    // fixture contributes records, which still counts as a valid bundle.
    let (status, body) = get(addr, "/real-data").await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "실제 해양 데이터를 성공적으로 가져왔습니다.");
    assert_eq!(body["statistics"]["oceanStations"], 0);
    assert_eq!(body["statistics"]["qualityMeasurements"], 0);
    assert_eq!(body["statistics"]["microplasticSamples"], 4);
    assert_eq!(body["statistics"]["dataSources"], 4);
    assert_eq!(body["data"]["regions"]["all"]["name"], "전체 해역");
    let snapshot = &body["data"]["regions"]["all"]["timeRanges"]["1month"];
    assert_eq!(snapshot["risk"], "높음");
    assert_eq!(snapshot["concentration"], "2.1");
    assert_eq!(snapshot["species"], 145);
    assert_eq!(snapshot["points"], 0);
    assert_eq!(body["data"]["metadata"]["version"], "2.0.0-real");
    assert_eq!(body["data"]["metadata"]["isRealData"], true);
    assert_eq!(
        body["data"]["metadata"]["dataSource"],
        "실제 해양 관측 데이터"
    );
    assert_eq!(
        body["rawData"]["oceanObservations"].as_array().map(Vec::len),
        Some(0)
    );
    assert_eq!(
        body["rawData"]["microplasticResearch"]
            .as_array()
            .map(Vec::len),
        Some(4)
    );

    let (status, body) = bare(addr, "POST", "/real-data").await;
    assert_eq!(status, 200);
    assert_eq!(
        body["message"],
        "실제 데이터가 성공적으로 새로고침되었습니다."
    );
    assert_eq!(body["data"]["dataSources"].as_array().map(Vec::len), Some(4));
    assert_eq!(
        body["data"]["microplasticResearch"]
            .as_array()
            .map(Vec::len),
        Some(4)
    );
}
