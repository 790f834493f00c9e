use climate_systems_map::{App, init_logging, mount_dashboard};
use leptos::mount::mount_to_body;
use log::error;

fn main() {
	init_logging();
	match mount_dashboard("app") {
		Ok(dashboard) => dashboard.forget(),
		Err(e) => {
			error!("{e}; mounting on <body>");
			mount_to_body(App);
		}
	}
}
