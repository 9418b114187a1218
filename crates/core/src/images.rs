//! Image URL resolution.
//!
//! The backend stores images either as absolute URLs, as `/assets/...` paths,
//! or as bare file names under a per-kind folder. [`resolve_image_url`] turns
//! any of these into something a client can fetch.

/// What an image belongs to; decides the folder bare file names live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Product,
    Banner,
    Category,
}

impl ImageKind {
    const fn folder(self) -> &'static str {
        match self {
            Self::Product => "Products",
            Self::Banner => "Banners",
            Self::Category => "Categories",
        }
    }
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

fn has_image_extension(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(stem, ext)| {
        !stem.is_empty()
            && IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
    })
}

/// Resolve a stored image reference against the backend `base_url`.
///
/// - empty input stays empty;
/// - `http://` and `https://` URLs are returned unchanged;
/// - `/assets/...` paths are joined onto the base URL;
/// - product paths containing a `products/` folder go under `/assets/images/`;
/// - bare file names go under `/assets/images/<Kind>/` (products only accept
///   numeric names such as `12.jpg`);
/// - anything else is returned unchanged.
#[must_use]
pub fn resolve_image_url(base_url: &str, kind: ImageKind, image: &str) -> String {
    if image.is_empty() {
        return String::new();
    }
    if image.starts_with("http://") || image.starts_with("https://") {
        return image.to_owned();
    }

    let base = base_url.trim_end_matches('/');
    if image.starts_with("/assets/") {
        return format!("{base}{image}");
    }

    match kind {
        ImageKind::Product => {
            if image.contains("Products/") || image.contains("products/") {
                return format!("{base}/assets/images/{image}");
            }
            let numeric_name = image
                .rsplit_once('.')
                .is_some_and(|(stem, _)| !stem.is_empty() && stem.bytes().all(|b| b.is_ascii_digit()));
            if numeric_name && has_image_extension(image) {
                return format!("{base}/assets/images/{}/{image}", kind.folder());
            }
        }
        ImageKind::Banner | ImageKind::Category => {
            if !image.contains('/') && has_image_extension(image) {
                return format!("{base}/assets/images/{}/{image}", kind.folder());
            }
        }
    }

    image.to_owned()
}
