use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::ForceGraphState;
use crate::graph::color::{EDGE_COLOR, HIGHLIGHT_COLOR};

const BACKGROUND: &str = "#262123";
const LABEL_COLOR: &str = "#E8DED3";

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let t = ease_out_cubic(state.selection.highlight_t);

	state.graph.visit_edges(|n1, n2, _| {
		let (x1, y1, x2, y2) = (n1.x() as f64, n1.y() as f64, n2.x() as f64, n2.y() as f64);
		if (x2 - x1).hypot(y2 - y1) < 0.001 {
			return;
		}

		let highlighted = state.is_highlighted_edge(n1.index(), n2.index());
		let (color, alpha, width) = if highlighted {
			(HIGHLIGHT_COLOR, 0.6 + 0.4 * t, (1.5 + 1.0 * t) / k)
		} else {
			(EDGE_COLOR, 0.6, 1.5 / k)
		};

		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(color);
		ctx.set_line_width(width);
		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2, y2);
		ctx.stroke();
	});
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let base = state.simulation.config.node_radius;
	let (t, k) = (ease_out_cubic(state.selection.highlight_t), state.transform.k);
	let font = format!("{}px sans-serif", 11.0 / k.max(0.5));

	state.graph.visit_nodes(|node| {
		let (x, y) = (node.x() as f64, node.y() as f64);
		let info = &node.data.user_data;
		let selected = state.is_selected(node.index());
		let radius = if selected { base * (1.0 + 0.4 * t) } else { base };

		if selected && t > 0.01 {
			let glow_radius = radius * 2.2;
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow_radius) {
				let _ = gradient.add_color_stop(0.0, &format!("rgba(106, 80, 255, {})", 0.45 * t));
				let _ = gradient.add_color_stop(1.0, "rgba(106, 80, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&info.color);
		ctx.fill();

		if selected {
			ctx.set_stroke_style_str(HIGHLIGHT_COLOR);
			ctx.set_line_width(2.0 / k);
			ctx.stroke();
		} else if state.is_neighbor(node.index()) {
			ctx.set_global_alpha(t);
			ctx.set_stroke_style_str(HIGHLIGHT_COLOR);
			ctx.set_line_width(1.0 / k);
			ctx.stroke();
			ctx.set_global_alpha(1.0);
		}

		ctx.set_fill_style_str(LABEL_COLOR);
		ctx.set_font(&font);
		let _ = ctx.fill_text(&info.label, x + radius + 3.0, y + 3.0);
	});
}
