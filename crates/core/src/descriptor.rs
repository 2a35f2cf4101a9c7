//! # 起動記述子の読み取り
//!
//! ページマークアップの起動情報要素から2つのロケータを取り出す。
//! 起動時に一度だけ読み取り、再検証・再読み込みはしない。

use once_cell::sync::Lazy;
use regex::Regex;

use hibana_types::LoadDescriptor;

use crate::error::DescriptorError;

/// 起動情報要素のid。
pub const BOOTSTRAP_ELEMENT_ID: &str = "wasm-bootstrap-info";

static BOOTSTRAP_ELEMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<[^>]*\bid\s*=\s*"wasm-bootstrap-info"[^>]*>"#).expect("valid element regex")
});
static WASM_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bdata-wasm-url\s*=\s*"([^"]*)""#).expect("valid wasm-url regex"));
static SHIM_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bdata-shim-url\s*=\s*"([^"]*)""#).expect("valid shim-url regex"));

/// マークアップから起動記述子を読み取る。
///
/// `id="wasm-bootstrap-info"` の要素を探し、`data-wasm-url` /
/// `data-shim-url` 属性の値を取り出す。
pub fn from_markup(markup: &str) -> Result<LoadDescriptor, DescriptorError> {
    let element = BOOTSTRAP_ELEMENT_RE
        .find(markup)
        .ok_or(DescriptorError::ElementNotFound(BOOTSTRAP_ELEMENT_ID))?
        .as_str();

    let wasm_url =
        attr_value(element, &WASM_URL_RE).ok_or(DescriptorError::MissingAttribute("data-wasm-url"))?;
    let shim_url =
        attr_value(element, &SHIM_URL_RE).ok_or(DescriptorError::MissingAttribute("data-shim-url"))?;

    Ok(LoadDescriptor { wasm_url, shim_url })
}

fn attr_value(element: &str, re: &Regex) -> Option<String> {
    re.captures(element).map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 起動情報要素から両方のロケータが読み取れることを確認
    #[test]
    fn test_from_markup() {
        let markup = r#"
            <html><body>
            <div id="wasm-bootstrap-info"
                 data-wasm-url="app.wasm"
                 data-shim-url="shim.json"></div>
            </body></html>
        "#;
        let descriptor = from_markup(markup).unwrap();
        assert_eq!(descriptor.wasm_url, "app.wasm");
        assert_eq!(descriptor.shim_url, "shim.json");
    }

    /// 属性の並び順に依存しないことを確認
    #[test]
    fn test_attribute_order() {
        let markup = r#"<script data-shim-url="https://cdn.example/shim.json" id="wasm-bootstrap-info" data-wasm-url="https://cdn.example/app.wasm"></script>"#;
        let descriptor = from_markup(markup).unwrap();
        assert_eq!(descriptor.wasm_url, "https://cdn.example/app.wasm");
        assert_eq!(descriptor.shim_url, "https://cdn.example/shim.json");
    }

    /// 起動情報要素がない場合のエラーを確認
    #[test]
    fn test_element_not_found() {
        let err = from_markup("<html><body></body></html>").unwrap_err();
        assert!(matches!(err, DescriptorError::ElementNotFound(_)));
    }

    /// 属性が欠けている場合のエラーを確認
    #[test]
    fn test_missing_attribute() {
        let markup = r#"<div id="wasm-bootstrap-info" data-wasm-url="app.wasm"></div>"#;
        let err = from_markup(markup).unwrap_err();
        assert!(matches!(
            err,
            DescriptorError::MissingAttribute("data-shim-url")
        ));
    }

    /// 別要素の属性を拾わないことを確認
    #[test]
    fn test_ignores_other_elements() {
        let markup = r#"
            <div id="other" data-wasm-url="wrong.wasm"></div>
            <div id="wasm-bootstrap-info" data-wasm-url="app.wasm" data-shim-url="shim.json"></div>
        "#;
        let descriptor = from_markup(markup).unwrap();
        assert_eq!(descriptor.wasm_url, "app.wasm");
    }
}
