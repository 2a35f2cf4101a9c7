//! # Hibana CLI
//!
//! 1回のロード・実行シーケンスを行うエントリポイント。
//!
//! ページマークアップ（またはロケータの直接指定）から起動記述子を読み取り、
//! ブートストラップディスパッチャを駆動して終了する。どの段階の失敗も
//! 捕捉せず、そのままプロセスの失敗として報告される。

use anyhow::Context;
use clap::Parser;

use hibana_core::{descriptor, ArtifactFetcher, Bootstrap, ShimLoader};
use hibana_types::LoadDescriptor;
use hibana_wasm_host::{
    FileFetcher, FileShimLoader, HttpFetcher, HttpShimLoader, WasmtimePlatform,
};

/// コマンドライン引数。
#[derive(Debug, Parser)]
#[command(name = "hibana", about = "WASMモジュールのブートストラップローダー")]
struct Args {
    /// 起動情報要素を含むページマークアップ（ファイルパスまたはURL）。
    /// 省略時は環境変数 HIBANA_PAGE を参照する。
    #[arg(long)]
    page: Option<String>,
    /// WASMバイナリのロケータ（--pageの代わりに直接指定）
    #[arg(long, requires = "shim_url")]
    wasm_url: Option<String>,
    /// シムマニフェストのロケータ（--pageの代わりに直接指定）
    #[arg(long, requires = "wasm_url")]
    shim_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let descriptor = resolve_descriptor(&args).await?;
    tracing::info!(
        wasm_url = %descriptor.wasm_url,
        shim_url = %descriptor.shim_url,
        "ブートストラップを開始"
    );

    let bootstrap = build_bootstrap(&descriptor);
    bootstrap.run(&descriptor).await?;

    Ok(())
}

/// 引数から起動記述子を組み立てる。
/// マークアップ経由の場合、相対ロケータはページの位置を基準に解決する。
async fn resolve_descriptor(args: &Args) -> anyhow::Result<LoadDescriptor> {
    if let (Some(wasm_url), Some(shim_url)) = (&args.wasm_url, &args.shim_url) {
        return Ok(LoadDescriptor {
            wasm_url: wasm_url.clone(),
            shim_url: shim_url.clone(),
        });
    }

    let page = match &args.page {
        Some(page) => page.clone(),
        None => std::env::var("HIBANA_PAGE").map_err(|_| {
            anyhow::anyhow!("--page または --wasm-url/--shim-url を指定してください")
        })?,
    };

    let (markup, base) = load_page(&page).await?;
    let descriptor = descriptor::from_markup(&markup)?;
    Ok(LoadDescriptor {
        wasm_url: resolve_against(base.as_ref(), &descriptor.wasm_url)?,
        shim_url: resolve_against(base.as_ref(), &descriptor.shim_url)?,
    })
}

/// ページマークアップを読み込む。URLならHTTP、それ以外はファイルとして扱う。
async fn load_page(page: &str) -> anyhow::Result<(String, Option<url::Url>)> {
    if is_http(page) {
        let base =
            url::Url::parse(page).with_context(|| format!("ページURLのパースに失敗: {page}"))?;
        let markup = reqwest::get(page)
            .await
            .with_context(|| format!("ページの取得に失敗: {page}"))?
            .error_for_status()
            .with_context(|| format!("ページ取得でHTTPエラー: {page}"))?
            .text()
            .await
            .with_context(|| format!("ページの読み取りに失敗: {page}"))?;
        Ok((markup, Some(base)))
    } else {
        let markup = tokio::fs::read_to_string(page)
            .await
            .with_context(|| format!("ページの読み込みに失敗: {page}"))?;
        let base = std::fs::canonicalize(page)
            .ok()
            .and_then(|path| url::Url::from_file_path(path).ok());
        Ok((markup, base))
    }
}

/// ロケータを解決する。絶対URLはそのまま、相対ロケータはページ基準で解決する。
fn resolve_against(base: Option<&url::Url>, raw: &str) -> anyhow::Result<String> {
    match url::Url::parse(raw) {
        Ok(absolute) => Ok(absolute.into()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = base.ok_or_else(|| {
                anyhow::anyhow!("相対ロケータ {raw} を解決する基準URLがありません")
            })?;
            let resolved = base
                .join(raw)
                .with_context(|| format!("相対ロケータの解決に失敗: {raw}"))?;
            Ok(resolved.into())
        }
        Err(e) => Err(anyhow::anyhow!("ロケータのパースに失敗 ({raw}): {e}")),
    }
}

/// 記述子のスキームに応じてコラボレータを組み立てる。
fn build_bootstrap(descriptor: &LoadDescriptor) -> Bootstrap {
    let engine = wasmtime::Engine::default();
    let client = reqwest::Client::new();

    let shim_loader: Box<dyn ShimLoader> = if is_http(&descriptor.shim_url) {
        Box::new(HttpShimLoader::new(client.clone(), engine.clone()))
    } else {
        Box::new(FileShimLoader::new(engine.clone()))
    };
    let fetcher: Box<dyn ArtifactFetcher> = if is_http(&descriptor.wasm_url) {
        Box::new(HttpFetcher::new(client))
    } else {
        Box::new(FileFetcher)
    };

    Bootstrap::new(
        shim_loader,
        fetcher,
        Box::new(WasmtimePlatform::new(engine)),
    )
}

fn is_http(locator: &str) -> bool {
    locator.starts_with("http://") || locator.starts_with("https://")
}
