//! Cross-sectoral systems map for the India climate dashboard.
//!
//! The core (model, layouts, aggregation, table, filters, interaction and
//! page controllers) is plain data and runs natively; `components` and
//! `pages` wire it into a Leptos client-side app drawing on canvas.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

pub mod aggregate;
pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod interaction;
pub mod layout;
pub mod model;
pub mod scene;
pub mod table;

mod browser;
mod components;
mod pages;

use crate::error::{DashboardError, Result};
use crate::pages::explorer::Explorer;
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// Catalog maps at `/`, the sector explorer at `/explorer`.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />
		<Title text="Systems Map | India Climate Dashboard" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<nav class="dashboard-nav">
				<A href="/">"Systems Maps"</A>
				<A href="/explorer">"Sector Explorer"</A>
			</nav>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
				<Route path=path!("/explorer") view=Explorer />
			</Routes>
		</Router>
	}
}

/// A mounted dashboard. Dropping it unmounts the app; [`Dashboard::teardown`]
/// also clears the container.
pub struct Dashboard {
	container: HtmlElement,
	unmount: Option<Box<dyn FnOnce()>>,
}

impl Dashboard {
	/// Unmounts every view and empties the container.
	pub fn teardown(mut self) {
		if let Some(unmount) = self.unmount.take() {
			unmount();
		}
		self.container.set_inner_html("");
		info!("dashboard torn down");
	}

	/// Keeps the app mounted for the lifetime of the page.
	pub fn forget(mut self) {
		if let Some(unmount) = self.unmount.take() {
			std::mem::forget(unmount);
		}
	}
}

/// Mounts the app into the element with id `container_id`, replacing its
/// content.
pub fn mount_dashboard(container_id: &str) -> Result<Dashboard> {
	let container: HtmlElement = web_sys::window()
		.and_then(|w| w.document())
		.and_then(|d| d.get_element_by_id(container_id))
		.ok_or_else(|| DashboardError::MissingContainer(container_id.to_string()))?
		.dyn_into()
		.map_err(|_| DashboardError::MissingContainer(container_id.to_string()))?;
	container.set_inner_html("");
	let handle = leptos::mount::mount_to(container.clone(), App);
	info!("dashboard mounted into #{container_id}");
	Ok(Dashboard {
		container,
		unmount: Some(Box::new(move || drop(handle))),
	})
}
