//! ブートストラップHTTP経路の結合テスト。
//!
//! マニフェストとWASMバイナリを配信するモックサーバーを起動し、
//! 3世代それぞれのシーケンスを最後まで駆動する。

use axum::routing::get;
use axum::Json;

use hibana_core::{descriptor, Bootstrap, BootstrapError};
use hibana_types::LoadDescriptor;
use hibana_wasm_host::{HttpFetcher, HttpShimLoader, WasmtimePlatform};

/// env.logを呼ぶ最小のテストモジュール。
fn test_wasm() -> Vec<u8> {
    wat::parse_str(
        r#"
        (module
          (import "env" "log" (func $log (param i32 i32)))
          (memory (export "memory") 1)
          (data (i32.const 8) "hibana boot")
          (func (export "main")
            (call $log (i32.const 8) (i32.const 11))))
        "#,
    )
    .unwrap()
}

/// モックサーバーを起動し、ベースURLを返す。
async fn serve(manifest: serde_json::Value) -> String {
    let app = axum::Router::new()
        .route("/app.wasm", get(|| async { test_wasm() }))
        .route("/shim.json", get(move || async move { Json(manifest) }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    format!("http://{addr}")
}

fn bootstrap() -> Bootstrap {
    let engine = wasmtime::Engine::default();
    let client = reqwest::Client::new();
    Bootstrap::new(
        Box::new(HttpShimLoader::new(client.clone(), engine.clone())),
        Box::new(HttpFetcher::new(client)),
        Box::new(WasmtimePlatform::new(engine)),
    )
}

fn descriptor_for(base: &str) -> LoadDescriptor {
    LoadDescriptor {
        wasm_url: format!("{base}/app.wasm"),
        shim_url: format!("{base}/shim.json"),
    }
}

/// 最新リビジョン（自己インスタンス化成果物）のシーケンスが通ることを確認
#[tokio::test]
async fn test_http_bootstrap_newest_revision() {
    let base = serve(serde_json::json!({
        "exports": ["compile_streaming"],
        "artifact_exports": ["instantiate"],
    }))
    .await;

    bootstrap().run(&descriptor_for(&base)).await.unwrap();
}

/// 中間リビジョン（シムコンパイル + 2引数instantiate + invoke）を確認
#[tokio::test]
async fn test_http_bootstrap_middle_revision() {
    let base = serve(serde_json::json!({
        "exports": ["compile_streaming", "instantiate", "invoke"],
    }))
    .await;

    bootstrap().run(&descriptor_for(&base)).await.unwrap();
}

/// 最古リビジョン（プラットフォームコンパイルへのフォールバック）を確認
#[tokio::test]
async fn test_http_bootstrap_oldest_revision() {
    let base = serve(serde_json::json!({
        "exports": ["instantiate", "invoke"],
    }))
    .await;

    bootstrap().run(&descriptor_for(&base)).await.unwrap();
}

/// バイナリの取得失敗がそのまま伝播することを確認
#[tokio::test]
async fn test_http_fetch_failure() {
    let base = serve(serde_json::json!({
        "exports": ["compile_streaming", "instantiate", "invoke"],
    }))
    .await;

    let descriptor = LoadDescriptor {
        wasm_url: format!("{base}/missing.wasm"),
        shim_url: format!("{base}/shim.json"),
    };
    let err = bootstrap().run(&descriptor).await.unwrap_err();
    assert!(matches!(err, BootstrapError::Fetch(_)));
}

/// どの世代の要件も満たさないマニフェストはケイパビリティ欠落で
/// 失敗することを確認
#[tokio::test]
async fn test_http_unrecognized_shape() {
    let base = serve(serde_json::json!({
        "exports": ["compile_streaming"],
    }))
    .await;

    let err = bootstrap().run(&descriptor_for(&base)).await.unwrap_err();
    assert!(matches!(
        err,
        BootstrapError::MissingCapability("instantiate")
    ));
}

/// マークアップの起動情報要素から読み取った記述子で一括実行できることを確認
#[tokio::test]
async fn test_markup_to_run() {
    let base = serve(serde_json::json!({
        "exports": ["instantiate", "invoke"],
    }))
    .await;

    let markup = format!(
        r#"<div id="wasm-bootstrap-info" data-wasm-url="{base}/app.wasm" data-shim-url="{base}/shim.json"></div>"#
    );
    let descriptor = descriptor::from_markup(&markup).unwrap();
    bootstrap().run(&descriptor).await.unwrap();
}
