use leptos::prelude::*;

use super::force_graph::ActiveDetail;

const CARD_STYLE: &str = "position: absolute; z-index: 10; width: 200px; padding: 10px; \
	border-radius: 10px; background-color: #4C4646; color: #E8DED3; text-align: center; \
	box-shadow: 0 0 10px rgba(0, 0, 0, 0.5); font-family: sans-serif;";

/// Contact card of an activated identity node, anchored next to the pointer.
#[component]
pub fn DetailCard(card: ActiveDetail) -> impl IntoView {
	let ActiveDetail { detail, x, y, .. } = card;
	let style = format!("{CARD_STYLE} left: {}px; top: {}px;", x + 20.0, y - 20.0);

	let telegram = detail.telegram.map(|handle| {
		let handle = handle.trim_start_matches('@').to_owned();
		let href = format!("https://t.me/{handle}");
		view! {
			<a class="detail-telegram" href=href target="_blank" rel="noopener">
				"@"
				{handle}
			</a>
		}
	});
	let (name, alt) = (detail.name.clone(), detail.name);
	let email = detail.email.map(|email| {
		let href = format!("mailto:{email}");
		view! {
			<a class="detail-email" href=href>
				{email}
			</a>
		}
	});

	view! {
		<div class="detail-card" style=style>
			<strong>{name}</strong>
			<img
				src=detail.photo
				alt=alt
				style="max-width: 100%; border-radius: 5px; margin-top: 8px;"
			/>
			<div class="detail-contacts">{telegram} <br /> {email}</div>
		</div>
	}
}
