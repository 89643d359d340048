//! Flatten raw caption payloads into plain text.
//!
//! Both cleaners strip markup literally: named entities such as `&amp;` are removed,
//! not decoded. Neither function can fail; input without captions yields `""`.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag pattern must compile"));

static NAMED_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&[a-zA-Z]+;").expect("entity pattern must compile"));

static XML_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<text[^>]*>(.*?)</text>").expect("caption text pattern must compile")
});

/// Caption payload formats understood by [`clean`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionFormat {
    Vtt,
    Srt,
    /// YouTube timedtext XML (`<transcript><text ...>`)
    Xml,
}

impl CaptionFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "vtt" => Some(CaptionFormat::Vtt),
            "srt" => Some(CaptionFormat::Srt),
            "xml" | "srv1" => Some(CaptionFormat::Xml),
            _ => None,
        }
    }
}

/// Clean a payload with the cleaner matching its format
pub fn clean(content: &str, format: CaptionFormat) -> String {
    match format {
        CaptionFormat::Vtt | CaptionFormat::Srt => clean_subtitle_blocks(content),
        CaptionFormat::Xml => clean_xml_captions(content),
    }
}

/// Clean WebVTT or SRT content.
///
/// Headers, timing lines, cue numbers and `NOTE`/`STYLE` blocks are dropped, tags and
/// named entities are stripped from what remains, and surviving lines are joined
/// with single spaces.
pub fn clean_subtitle_blocks(content: &str) -> String {
    content
        .split('\n')
        .map(str::trim)
        .filter(|line| !is_subtitle_noise(line))
        .map(|line| NAMED_ENTITY.replace_all(&TAG.replace_all(line, ""), "").into_owned())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_subtitle_noise(line: &str) -> bool {
    line.is_empty()
        || line.starts_with("WEBVTT")
        || line.contains("-->")
        || line.chars().all(|c| c.is_ascii_digit())
        || line.starts_with("NOTE")
        || line.starts_with("STYLE")
}

/// Clean YouTube's XML caption format by joining the bodies of all `<text>` elements
pub fn clean_xml_captions(xml: &str) -> String {
    XML_TEXT
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|body| {
            let without_entities = NAMED_ENTITY.replace_all(body.as_str(), "");
            TAG.replace_all(&without_entities, "").trim().to_string()
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_vtt_block() {
        let vtt = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nHello <b>world</b>\n";
        assert_eq!(clean_subtitle_blocks(vtt), "Hello world");
    }

    #[test]
    fn test_srt_block() {
        let srt = "1\r\n00:00:01,000 --> 00:00:02,000\r\nFirst line\r\n\r\n2\r\n00:00:02,500 --> 00:00:04,000\r\n<i>Second</i> line\r\n";
        assert_eq!(clean_subtitle_blocks(srt), "First line Second line");
    }

    #[test]
    fn test_vtt_directives_and_entities() {
        let vtt = "WEBVTT\nKind: captions\n\nNOTE produced by a tool\n\nSTYLE\n::cue { color: red }\n\n00:00:00.000 --> 00:00:01.000 align:start\nrock &amp; roll<00:00:00.500><c> baby</c>\n";
        assert_eq!(clean_subtitle_blocks(vtt), "Kind: captions ::cue { color: red } rock  roll baby");
    }

    #[test]
    fn test_subtitle_line_emptied_by_stripping_is_dropped() {
        assert_eq!(clean_subtitle_blocks("<b></b>\nkept\n&nbsp;"), "kept");
    }

    #[test]
    fn test_xml_captions() {
        let xml = "<text start=\"0\">Hello &amp; world</text>";
        assert_eq!(clean_xml_captions(xml), "Hello  world");
    }

    #[test]
    fn test_xml_captions_multiline_and_nested() {
        let xml = "<?xml version=\"1.0\" encoding=\"utf-8\" ?><transcript>\
                   <text start=\"0.1\" dur=\"1.2\">first\nline</text>\
                   <text start=\"1.3\" dur=\"1\"><font color=\"#fff\">second</font></text>\
                   <text start=\"2.3\" dur=\"1\">   </text></transcript>";
        assert_eq!(clean_xml_captions(xml), "first\nline second");
    }

    #[test]
    fn test_no_matches_yield_empty() {
        assert_eq!(clean_xml_captions("<html>nothing here</html>"), "");
        assert_eq!(clean_subtitle_blocks("WEBVTT\n\n"), "");
        assert_eq!(clean("", CaptionFormat::Vtt), "");
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(CaptionFormat::from_extension("VTT"), Some(CaptionFormat::Vtt));
        assert_eq!(CaptionFormat::from_extension("srt"), Some(CaptionFormat::Srt));
        assert_eq!(CaptionFormat::from_extension("json3"), None);
    }

    proptest! {
        #[test]
        fn subtitle_cleaning_is_idempotent(text in "[a-z0-9 .,!?\n]{0,200}") {
            let once = clean_subtitle_blocks(&text);
            prop_assert_eq!(clean_subtitle_blocks(&once), once);
        }
    }
}
