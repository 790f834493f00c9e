//! Thin wrappers over browser APIs used by the pages.

use js_sys::{Function, Promise};
use log::{debug, info, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Response, Window};

use crate::config::{CONFIG_URL, DashboardConfig};
use crate::error::{DashboardError, Result};

pub fn window() -> Result<Window> {
	web_sys::window().ok_or_else(|| DashboardError::Browser("no global window".to_string()))
}

fn js_reason(value: JsValue) -> String {
	value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// GETs `url` and returns the body as text. Non-2xx statuses are errors.
pub async fn fetch_text(url: &str) -> Result<String> {
	let fetch_error = |reason: String| DashboardError::Fetch {
		url: url.to_string(),
		reason,
	};
	let response = JsFuture::from(window()?.fetch_with_str(url))
		.await
		.map_err(|e| fetch_error(js_reason(e)))?;
	let response: Response = response
		.dyn_into()
		.map_err(|_| fetch_error("not a Response".to_string()))?;
	if !response.ok() {
		return Err(fetch_error(format!("HTTP {}", response.status())));
	}
	let body = response.text().map_err(|e| fetch_error(js_reason(e)))?;
	let text = JsFuture::from(body).await.map_err(|e| fetch_error(js_reason(e)))?;
	text.as_string().ok_or_else(|| fetch_error("body is not text".to_string()))
}

/// Loads the optional settings override, falling back to defaults.
pub async fn load_config() -> DashboardConfig {
	let text = match fetch_text(CONFIG_URL).await {
		Ok(text) => text,
		Err(e) => {
			info!("using default dashboard config ({e})");
			return DashboardConfig::default();
		}
	};
	match DashboardConfig::from_json(&text) {
		Ok(config) => {
			debug!("dashboard config loaded from {CONFIG_URL}");
			config
		}
		Err(e) => {
			warn!("ignoring malformed {CONFIG_URL}: {e}");
			DashboardConfig::default()
		}
	}
}

/// Resolves after `ms` milliseconds via `setTimeout`.
pub async fn sleep_ms(ms: u32) {
	let promise = Promise::new(&mut |resolve: Function, _reject: Function| {
		let scheduled = web_sys::window().and_then(|w| {
			w.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms as i32)
				.ok()
		});
		if scheduled.is_none() {
			let _ = resolve.call0(&JsValue::NULL);
		}
	});
	let _ = JsFuture::from(promise).await;
}
