//! Removal of presentational attributes left behind by third-party markup.

use tracing::{debug, warn};

/// Attributes removed by [`strip_presentational`].
pub const PRESENTATIONAL_ATTRIBUTES: &[&str] = &[
	"align",
	"background",
	"bgcolor",
	"border",
	"cellpadding",
	"cellspacing",
	"color",
	"face",
	"height",
	"hspace",
	"marginheight",
	"marginwidth",
	"noshade",
	"nowrap",
	"valign",
	"vspace",
	"width",
	"vlink",
	"alink",
	"text",
	"link",
	"frame",
	"frameborder",
	"clear",
	"scrolling",
	"style",
];

/// An element whose attributes can be stripped.
pub trait StyledElement {
	/// Returns true if the element's inline style is `display: none`.
	fn is_hidden(&self) -> bool;

	fn remove_attribute(&self, name: &str);

	/// Sets inline `display: none`.
	fn hide(&self);
}

/// Element queries needed by [`strip_inline_style`].
pub trait ElementLookup {
	type Element: StyledElement;

	fn element_by_id(&self, id: &str) -> Option<Self::Element>;

	/// Descendants of `root` with the given tag name, in document order.
	fn descendants_by_tag(&self, root: &Self::Element, tag: &str) -> Vec<Self::Element>;
}

/// Removes every [`PRESENTATIONAL_ATTRIBUTES`] entry from each element.
///
/// Hidden elements stay hidden so scripts can still toggle them.
pub fn strip_presentational<'a, E, I>(elements: I) -> usize
where
	E: StyledElement + 'a,
	I: IntoIterator<Item = &'a E>,
{
	let mut count = 0;
	for element in elements {
		let hidden = element.is_hidden();
		for attribute in PRESENTATIONAL_ATTRIBUTES {
			element.remove_attribute(attribute);
		}
		if hidden {
			element.hide();
		}
		count += 1;
	}
	count
}

/// Strips the element with `id` and, if `tag` is given, its descendants with
/// that tag name. Returns how many elements were stripped.
pub fn strip_inline_style<L: ElementLookup>(lookup: &L, id: Option<&str>, tag: Option<&str>) -> usize {
	let Some(id) = id else {
		return 0;
	};
	let Some(root) = lookup.element_by_id(id) else {
		warn!(id, "no element to strip inline style from");
		return 0;
	};

	let mut count = strip_presentational([&root]);
	if let Some(tag) = tag {
		let descendants = lookup.descendants_by_tag(&root, tag);
		count += strip_presentational(&descendants);
	}
	debug!(id, count, "stripped inline style");
	count
}
