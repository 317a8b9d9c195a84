//! Content-type detection from leading bytes, after the WHATWG
//!  mime sniffing rules. The file name is never consulted.

use mime::Mime;

/// At most this many leading bytes are inspected
pub const SNIFF_LEN: usize = 512;

enum Pattern {
    /// Exact prefix
    Prefix(&'static [u8]),
    /// `pattern & mask == data & mask` over the pattern length
    Masked {
        pattern: &'static [u8],
        mask: &'static [u8],
        skip_whitespace: bool,
    },
    /// Case-insensitive html tag followed by a space or `>`
    Html(&'static [u8]),
    Mp4,
}

const SIGNATURES: &[(Pattern, &str)] = &[
    (Pattern::Html(b"<!DOCTYPE HTML"), "text/html; charset=utf-8"),
    (Pattern::Html(b"<HTML"), "text/html; charset=utf-8"),
    (Pattern::Html(b"<HEAD"), "text/html; charset=utf-8"),
    (Pattern::Html(b"<SCRIPT"), "text/html; charset=utf-8"),
    (Pattern::Html(b"<IFRAME"), "text/html; charset=utf-8"),
    (Pattern::Html(b"<H1"), "text/html; charset=utf-8"),
    (Pattern::Html(b"<DIV"), "text/html; charset=utf-8"),
    (Pattern::Html(b"<FONT"), "text/html; charset=utf-8"),
    (Pattern::Html(b"<TABLE"), "text/html; charset=utf-8"),
    (Pattern::Html(b"<A"), "text/html; charset=utf-8"),
    (Pattern::Html(b"<STYLE"), "text/html; charset=utf-8"),
    (Pattern::Html(b"<TITLE"), "text/html; charset=utf-8"),
    (Pattern::Html(b"<B"), "text/html; charset=utf-8"),
    (Pattern::Html(b"<BODY"), "text/html; charset=utf-8"),
    (Pattern::Html(b"<BR"), "text/html; charset=utf-8"),
    (Pattern::Html(b"<P"), "text/html; charset=utf-8"),
    (Pattern::Html(b"<!--"), "text/html; charset=utf-8"),
    (
        Pattern::Masked {
            pattern: b"<?xml",
            mask: b"\xFF\xFF\xFF\xFF\xFF",
            skip_whitespace: true,
        },
        "text/xml; charset=utf-8",
    ),
    (Pattern::Prefix(b"%PDF-"), "application/pdf"),
    (Pattern::Prefix(b"%!PS-Adobe-"), "application/postscript"),
    (Pattern::Prefix(b"\xFE\xFF"), "text/plain; charset=utf-16be"),
    (Pattern::Prefix(b"\xFF\xFE"), "text/plain; charset=utf-16le"),
    (Pattern::Prefix(b"\xEF\xBB\xBF"), "text/plain; charset=utf-8"),
    (Pattern::Prefix(b"\x00\x00\x01\x00"), "image/x-icon"),
    (Pattern::Prefix(b"\x00\x00\x02\x00"), "image/x-icon"),
    (Pattern::Prefix(b"BM"), "image/bmp"),
    (Pattern::Prefix(b"GIF87a"), "image/gif"),
    (Pattern::Prefix(b"GIF89a"), "image/gif"),
    (
        Pattern::Masked {
            pattern: b"RIFF\x00\x00\x00\x00WEBPVP",
            mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF\xFF\xFF",
            skip_whitespace: false,
        },
        "image/webp",
    ),
    (Pattern::Prefix(b"\x89PNG\x0D\x0A\x1A\x0A"), "image/png"),
    (Pattern::Prefix(b"\xFF\xD8\xFF"), "image/jpeg"),
    (
        Pattern::Masked {
            pattern: b"FORM\x00\x00\x00\x00AIFF",
            mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
            skip_whitespace: false,
        },
        "audio/aiff",
    ),
    (Pattern::Prefix(b"ID3"), "audio/mpeg"),
    (Pattern::Prefix(b"OggS\x00"), "application/ogg"),
    (Pattern::Prefix(b"MThd\x00\x00\x00\x06"), "audio/midi"),
    (
        Pattern::Masked {
            pattern: b"RIFF\x00\x00\x00\x00AVI ",
            mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
            skip_whitespace: false,
        },
        "video/avi",
    ),
    (
        Pattern::Masked {
            pattern: b"RIFF\x00\x00\x00\x00WAVE",
            mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
            skip_whitespace: false,
        },
        "audio/wave",
    ),
    (Pattern::Mp4, "video/mp4"),
    (Pattern::Prefix(b"\x1A\x45\xDF\xA3"), "video/webm"),
    (Pattern::Prefix(b"wOFF"), "font/woff"),
    (Pattern::Prefix(b"wOF2"), "font/woff2"),
    (Pattern::Prefix(b"\x1F\x8B\x08"), "application/x-gzip"),
    (Pattern::Prefix(b"PK\x03\x04"), "application/zip"),
    (Pattern::Prefix(b"Rar!\x1A\x07\x00"), "application/x-rar-compressed"),
    (Pattern::Prefix(b"Rar!\x1A\x07\x01\x00"), "application/x-rar-compressed"),
    (Pattern::Prefix(b"\x00\x61\x73\x6D"), "application/wasm"),
];

fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

fn skip_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !is_whitespace(*b))
        .unwrap_or(data.len());
    &data[start..]
}

fn is_binary(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

impl Pattern {
    fn matches(&self, data: &[u8]) -> bool {
        match self {
            Pattern::Prefix(prefix) => data.starts_with(prefix),
            Pattern::Masked {
                pattern,
                mask,
                skip_whitespace: skip,
            } => {
                let data = if *skip { skip_whitespace(data) } else { data };
                data.len() >= pattern.len()
                    && pattern
                        .iter()
                        .zip(mask.iter())
                        .zip(data.iter())
                        .all(|((p, m), d)| p & m == d & m)
            }
            Pattern::Html(tag) => {
                let data = skip_whitespace(data);
                if data.len() < tag.len() + 1 {
                    return false;
                }
                let head_matches = tag
                    .iter()
                    .zip(data.iter())
                    .all(|(t, d)| t.eq_ignore_ascii_case(d));
                head_matches && matches!(data[tag.len()], b' ' | b'>')
            }
            Pattern::Mp4 => is_mp4(data),
        }
    }
}

/// An ISO base media file whose `ftyp` box names an mp4 brand
fn is_mp4(data: &[u8]) -> bool {
    if data.len() < 12 {
        return false;
    }
    let box_size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if box_size < 12 || data.len() < box_size || box_size % 4 != 0 {
        return false;
    }
    if &data[4..8] != b"ftyp" {
        return false;
    }
    let mut offset = 8;
    while offset + 4 <= box_size {
        // bytes 12..16 are the minor version, not a brand
        if offset != 12 && &data[offset..offset + 3] == b"mp4" {
            return true;
        }
        offset += 4;
    }
    false
}

/// The content type of `data`, judged from its first [`SNIFF_LEN`] bytes.
///  Falls back to `text/plain; charset=utf-8` when nothing binary is
///  seen and `application/octet-stream` otherwise.
pub fn detect_content_type(data: &[u8]) -> Mime {
    let data = &data[..data.len().min(SNIFF_LEN)];

    let detected = SIGNATURES
        .iter()
        .find(|(pattern, _)| pattern.matches(data))
        .map(|(_, content_type)| *content_type);

    match detected {
        Some(content_type) => content_type
            .parse()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM),
        None if data.iter().any(|b| is_binary(*b)) => mime::APPLICATION_OCTET_STREAM,
        None => mime::TEXT_PLAIN_UTF_8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sniff(data: &[u8]) -> String {
        detect_content_type(data).to_string()
    }

    #[test]
    fn test_images() {
        assert_eq!(sniff(b"\x89PNG\x0D\x0A\x1A\x0A\x00\x00\x00\x0DIHDR"), "image/png");
        assert_eq!(sniff(b"\xFF\xD8\xFF\xE0\x00\x10JFIF"), "image/jpeg");
        assert_eq!(sniff(b"GIF89a\x01\x00"), "image/gif");
        assert_eq!(sniff(b"RIFF\x24\x00\x00\x00WEBPVP8 "), "image/webp");
    }

    #[test]
    fn test_documents() {
        assert_eq!(sniff(b"%PDF-1.7\n"), "application/pdf");
        assert_eq!(sniff(b"  \n<!DOCTYPE html><html>"), "text/html; charset=utf-8");
        assert_eq!(sniff(b"<p>hello</p>"), "text/html; charset=utf-8");
        assert_eq!(sniff(b"<?xml version=\"1.0\"?>"), "text/xml; charset=utf-8");
    }

    #[test]
    fn test_html_tag_needs_terminator() {
        // "<Bxyz" is not a <B> tag
        assert_eq!(sniff(b"<Bxyz"), "text/plain; charset=utf-8");
    }

    #[test]
    fn test_archives() {
        assert_eq!(sniff(b"PK\x03\x04\x14\x00"), "application/zip");
        assert_eq!(sniff(b"\x1F\x8B\x08\x00"), "application/x-gzip");
        assert_eq!(sniff(b"\x00asm\x01\x00\x00\x00"), "application/wasm");
    }

    #[test]
    fn test_mp4() {
        let mut data = vec![0x00, 0x00, 0x00, 0x18];
        data.extend_from_slice(b"ftypisom");
        data.extend_from_slice(&[0, 0, 2, 0]);
        data.extend_from_slice(b"isommp41");
        assert_eq!(sniff(&data), "video/mp4");
    }

    #[test]
    fn test_text_fallbacks() {
        assert_eq!(sniff(b"just some words\n"), "text/plain; charset=utf-8");
        assert_eq!(sniff(b""), "text/plain; charset=utf-8");
        assert_eq!(sniff(b"\x00\x01\x02\x03"), "application/octet-stream");
    }

    #[test]
    fn test_only_leading_bytes_are_inspected() {
        let mut data = vec![b'a'; SNIFF_LEN];
        data.push(0x00);
        assert_eq!(sniff(&data), "text/plain; charset=utf-8");
    }
}
