use chardetng::EncodingDetector;
use encoding_rs::Encoding;

use engine_logging::engine_trace;

use crate::{SourceError, SourceErrorKind};

/// Decode a fetched page into UTF-8: BOM, then Content-Type charset, then chardetng.
pub fn decode_page(bytes: &[u8], content_type: Option<&str>) -> Result<String, SourceError> {
    let encoding = Encoding::for_bom(bytes)
        .map(|(encoding, _)| encoding)
        .or_else(|| {
            content_type
                .and_then(charset_label)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
        })
        .unwrap_or_else(|| {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            detector.guess(None, true)
        });

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(SourceError::new(
            SourceErrorKind::Decode,
            format!("malformed {} content", encoding.name()),
        ));
    }
    engine_trace!("decoded {} bytes as {}", bytes.len(), encoding.name());
    Ok(text.into_owned())
}

fn charset_label(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']).to_string())
    })
}
