//! Scale-factor detection from `name@<scale>x.ext` file names.

use tracing::warn;

const SCALE_START: char = '@';
const SCALE_END: &str = "x.";

/// Splits a file name into its logical name and declared scale factor.
///
/// `google_search@2x.png` yields `("google_search.png", 2.0)` and
/// `amazon_logo@2.5x.png` yields `("amazon_logo.png", 2.5)`. Names without
/// `@` have scale 1. A malformed scale token (missing `x.`, unparsable,
/// non-finite or below 1) logs a warning and yields `(full_name, 1.0)`.
pub fn parse_name(full_name: &str) -> (String, f64) {
    let Some(start) = full_name.find(SCALE_START) else {
        return (full_name.to_string(), 1.0);
    };

    let token_start = start + SCALE_START.len_utf8();
    let parsed = full_name[token_start..]
        .find(SCALE_END)
        .map(|rel| token_start + rel)
        .and_then(|end| {
            let scale = full_name[token_start..end].parse::<f64>().ok()?;
            (scale.is_finite() && scale >= 1.0).then_some((end, scale))
        });

    match parsed {
        Some((end, scale)) => {
            // Keep the extension's leading dot: "name" + ".png".
            let name = format!("{}{}", &full_name[..start], &full_name[end + 1..]);
            (name, scale)
        }
        None => {
            warn!(file = full_name, "invalid file name format");
            (full_name.to_string(), 1.0)
        }
    }
}
