use anyhow::Result;
use httpmock::prelude::*;
use std::time::Duration;
use stock_finder::{
    BatchScanner, HttpInventoryProber, NoPacing, ProbeOutcome, ScanSettings,
};
use stock_finder::domain::ports::InventoryProbe;

const CHECK_PATH: &str = "/api/InventoryCheck/CheckInventory";

fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn mock_branch<'a>(
    server: &'a MockServer,
    branch_json: &str,
    status: u16,
    items: serde_json::Value,
) -> httpmock::Mock<'a> {
    let needle = format!("\"BranchNumber\":{},", branch_json);
    server.mock(|when, then| {
        when.method(POST).path(CHECK_PATH).body_contains(needle.as_str());
        then.status(status)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"inventoryData": {"items": items}}));
    })
}

fn scanner(server: &MockServer, settings: ScanSettings) -> BatchScanner<HttpInventoryProber, NoPacing> {
    let prober = HttpInventoryProber::new(server.url(CHECK_PATH), Duration::from_secs(5))
        .expect("client builds");
    BatchScanner::new(prober, NoPacing, settings)
}

#[tokio::test]
async fn test_two_branches_one_in_stock() -> Result<()> {
    let server = MockServer::start();
    let a = mock_branch(
        &server,
        "\"A\"",
        200,
        serde_json::json!([
            {"productId": "P1", "branchNumber": "A", "availableInStock": 3},
            {"productId": "P2", "branchNumber": "A", "availableInStock": 0}
        ]),
    );
    let b = mock_branch(
        &server,
        "\"B\"",
        200,
        serde_json::json!([
            {"productId": "P1", "branchNumber": "B", "availableInStock": 0},
            {"productId": "P2", "branchNumber": "B", "availableInStock": 0}
        ]),
    );

    let report = scanner(&server, ScanSettings::default())
        .scan(&codes(&["A", "B"]), &codes(&["P1", "P2"]))
        .await?;

    a.assert_hits(1);
    b.assert_hits(1);
    assert_eq!(
        serde_json::to_value(&report.inventory)?,
        serde_json::json!({"P1": ["A"], "P2": []})
    );
    assert!(report.failed.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_server_error_branch_lands_in_failed_list() -> Result<()> {
    let server = MockServer::start();
    mock_branch(
        &server,
        "101",
        200,
        serde_json::json!([{"productId": "P1", "branchNumber": 101, "availableInStock": 2}]),
    );
    mock_branch(
        &server,
        "102",
        200,
        serde_json::json!([{"productId": "P1", "branchNumber": 102, "availableInStock": 1}]),
    );
    let c = server.mock(|when, then| {
        when.method(POST)
            .path(CHECK_PATH)
            .body_contains("\"BranchNumber\":103,");
        then.status(500);
    });

    let report = scanner(
        &server,
        ScanSettings {
            batch_count: 2,
            chunk_count: 2,
        },
    )
    .scan(&codes(&["101", "102", "103"]), &codes(&["P1"]))
    .await?;

    c.assert_hits(1);
    assert_eq!(report.failed.codes(), codes(&["103"]));
    let mut p1 = report.inventory.branches_for("P1").unwrap().to_vec();
    p1.sort();
    assert_eq!(p1, codes(&["101", "102"]));
    Ok(())
}

#[tokio::test]
async fn test_malformed_body_treated_as_failure() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(CHECK_PATH);
        then.status(200).json_body(serde_json::json!({"unexpected": true}));
    });

    let report = scanner(&server, ScanSettings::default())
        .scan(&codes(&["5"]), &codes(&["P1"]))
        .await?;

    assert_eq!(report.failed.codes(), codes(&["5"]));
    assert!(report.failed.iter().next().unwrap().reason.starts_with("malformed response"));
    assert_eq!(report.inventory.hit_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_same_responses_give_same_result() -> Result<()> {
    let server = MockServer::start();
    for code in 1..=9 {
        let stock = if code % 2 == 0 { 4 } else { 0 };
        mock_branch(
            &server,
            &code.to_string(),
            200,
            serde_json::json!([
                {"productId": "P1", "branchNumber": code, "availableInStock": stock},
                {"productId": "P2", "branchNumber": code, "availableInStock": 1}
            ]),
        );
    }
    let branches: Vec<String> = (1..=9).map(|n| n.to_string()).collect();
    let products = codes(&["P1", "P2"]);
    let settings = ScanSettings {
        batch_count: 3,
        chunk_count: 3,
    };

    let first = scanner(&server, settings).scan(&branches, &products).await?;
    let second = scanner(&server, settings).scan(&branches, &products).await?;

    assert_eq!(first.inventory.normalized(), second.inventory.normalized());
    assert_eq!(first.inventory.normalized()["P1"], codes(&["2", "4", "6", "8"]));
    assert_eq!(first.inventory.branches_for("P2").unwrap().len(), 9);
    Ok(())
}

#[tokio::test]
async fn test_rescanning_failed_branches() -> Result<()> {
    let server = MockServer::start();
    let mut flaky = server.mock(|when, then| {
        when.method(POST)
            .path(CHECK_PATH)
            .body_contains("\"BranchNumber\":42,");
        then.status(429);
    });

    let scanner = scanner(&server, ScanSettings::default());
    let first = scanner.scan(&codes(&["42"]), &codes(&["P1"])).await?;
    assert_eq!(first.failed.codes(), codes(&["42"]));

    flaky.delete();
    mock_branch(
        &server,
        "42",
        200,
        serde_json::json!([{"productId": "P1", "branchNumber": 42, "availableInStock": 1}]),
    );

    let retry = scanner.scan(&first.failed.codes(), &codes(&["P1"])).await?;
    assert!(retry.failed.is_empty());
    assert_eq!(retry.inventory.branches_for("P1").unwrap(), ["42".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_prober_sends_full_product_list() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path(CHECK_PATH).json_body(serde_json::json!({
            "BranchNumber": 77,
            "ProductIds": [
                "6c95eb2a-ec6f-4b4f-b08e-9befcd3334f9",
                "c7439982-7dfa-4614-bcf1-cccbf842e68d"
            ]
        }));
        then.status(200)
            .json_body(serde_json::json!({"inventoryData": {"items": []}}));
    });

    let prober = HttpInventoryProber::new(server.url(CHECK_PATH), Duration::from_secs(5))?;
    let outcome = prober
        .probe(
            &"77".to_string(),
            &codes(&[
                "6c95eb2a-ec6f-4b4f-b08e-9befcd3334f9",
                "c7439982-7dfa-4614-bcf1-cccbf842e68d",
            ]),
        )
        .await;

    api_mock.assert();
    assert_eq!(outcome, ProbeOutcome::InStock(vec![]));
    Ok(())
}
