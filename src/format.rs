//! Content formatting applied to imported job HTML.

// std
use std::sync::LazyLock;
// crates.io
use regex::Regex;
// self
use crate::{_prelude::*, host::ImageStore, store::StoreError};

static IMG_TAG: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)<img[^>]+>").expect("Image tag pattern is valid."));
static IMG_SRC: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r#"src="([^"]+)""#).expect("Image src pattern is valid."));

/// Strips leading and trailing single quotes, then double quotes, from a title.
///
/// Both ends are trimmed independently; an unbalanced quote on one side is still
/// removed. Applied once, not recursively across alternating quote styles.
pub fn trim_quotes(title: &str) -> &str {
	title.trim_matches('\'').trim_matches('"')
}

/// Rewrites every `<img>` tag's `src` to a locally stored copy resolved through the
/// host's [`ImageStore`].
///
/// Tags without a resolvable `src` are left untouched. Any store failure degrades
/// gracefully: the original, un-rewritten content is returned rather than an error.
pub async fn rewrite_content_images(content: &str, images: &dyn ImageStore) -> String {
	match try_rewrite(content, images).await {
		Ok(rewritten) => rewritten,
		Err(e) => {
			crate::obs::log_swallowed_error(crate::obs::FlowKind::CreateDraft, &e);

			content.to_owned()
		},
	}
}

async fn try_rewrite(content: &str, images: &dyn ImageStore) -> Result<String, StoreError> {
	let mut replacements: Vec<(String, String)> = Vec::new();

	for tag in IMG_TAG.find_iter(content) {
		let tag = tag.as_str();
		let Some(src) = IMG_SRC.captures(tag).and_then(|captures| captures.get(1)) else {
			continue;
		};
		let src = src.as_str();
		let Some(file_name) = derive_file_name(src) else {
			continue;
		};
		let local = images.resolve(&file_name, src).await?;

		replacements.push((tag.to_owned(), tag.replace(src, &local)));
	}

	let mut rewritten = content.to_owned();

	for (original, replacement) in replacements {
		rewritten = rewritten.replace(&original, &replacement);
	}

	Ok(rewritten)
}

/// Derives the attachment filename from the source URL's path, `/` mapped to `_`.
///
/// Path-based (not content-hash-based), so the same path on two hosts collides onto
/// one attachment; hosts needing stronger dedup can key on `source_url` instead.
pub(crate) fn derive_file_name(src: &str) -> Option<String> {
	let url = Url::parse(src).ok()?;
	let path = url.path();

	if path.is_empty() || path == "/" {
		return None;
	}

	Some(path.replace('/', "_"))
}
