use artist_graph::{App, init_logging};
use console_error_panic_hook as _;
use thiserror as _;

fn main() {
	init_logging();
	leptos::mount::mount_to_body(App);
}
