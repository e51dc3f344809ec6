//! Description derivation from raw Markdown bodies.

use crate::constants::FALLBACK_DESCRIPTION;

/// Derive a short description from raw Markdown content.
///
/// Takes the first non-heading paragraph, strips inline markup, and returns
/// its first sentence. Headings anywhere are skipped; a blank line ends the
/// paragraph once collection has started.
///
/// # Returns
/// The first sentence of the first paragraph, or a fixed fallback string when
/// the content has no paragraph at all.
pub fn generate_description(markdown: &str) -> String {
    let paragraph = first_paragraph(markdown);
    if paragraph.is_empty() {
        return FALLBACK_DESCRIPTION.to_string();
    }

    let joined = paragraph.join(" ");
    let cleaned = strip_paired_markers(&joined, &["**", "__"]);
    let cleaned = strip_paired_markers(&cleaned, &["*", "_"]);
    let cleaned = strip_code_spans(&cleaned);
    let cleaned = strip_images(&cleaned);
    let cleaned = strip_links(&cleaned);
    let cleaned = collapse_whitespace(&cleaned);

    first_sentence(&cleaned).to_string()
}

fn first_paragraph(markdown: &str) -> Vec<&str> {
    let mut paragraph = Vec::new();
    let mut in_paragraph = false;

    for line in markdown.lines() {
        let trimmed = line.trim();
        if is_heading_line(trimmed) {
            continue;
        }
        if trimmed.is_empty() {
            if in_paragraph {
                break;
            }
            continue;
        }
        in_paragraph = true;
        paragraph.push(trimmed);
    }

    paragraph
}

fn is_heading_line(trimmed: &str) -> bool {
    let rest = trimmed.trim_start_matches('#');
    rest.len() != trimmed.len() && rest.starts_with(char::is_whitespace)
}

/// Strip paired emphasis markers, keeping the inner text.
///
/// Scans left to right; an opener without a matching closer stays literal.
/// All delimiters are ASCII, so byte offsets stay on char boundaries.
fn strip_paired_markers(input: &str, delimiters: &[&str]) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while !rest.is_empty() {
        let earliest = delimiters
            .iter()
            .filter_map(|delim| rest.find(delim).map(|pos| (pos, *delim)))
            .min_by_key(|(pos, _)| *pos);

        let Some((pos, delim)) = earliest else {
            output.push_str(rest);
            break;
        };

        let after_open = pos + delim.len();
        match rest[after_open..].find(delim) {
            Some(close) => {
                output.push_str(&rest[..pos]);
                output.push_str(&rest[after_open..after_open + close]);
                rest = &rest[after_open + close + delim.len()..];
            }
            None => {
                output.push_str(&rest[..pos + 1]);
                rest = &rest[pos + 1..];
            }
        }
    }

    output
}

fn strip_code_spans(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find('`') {
        let after_open = open + 1;
        match rest[after_open..].find('`') {
            // Empty spans stay literal, matching the non-empty inner requirement.
            Some(close) if close > 0 => {
                output.push_str(&rest[..open]);
                output.push_str(&rest[after_open..after_open + close]);
                rest = &rest[after_open + close + 1..];
            }
            _ => {
                output.push_str(&rest[..after_open]);
                rest = &rest[after_open..];
            }
        }
    }

    output.push_str(rest);
    output
}

/// Parse `text](url)` after an opening bracket.
///
/// Returns the inner text and the byte length consumed through the closing
/// paren. The url must be non-empty; the text may be empty only for images.
fn parse_bracket_target(after_bracket: &str, allow_empty_text: bool) -> Option<(&str, usize)> {
    let close_bracket = after_bracket.find(']')?;
    let text = &after_bracket[..close_bracket];
    if !allow_empty_text && text.is_empty() {
        return None;
    }

    let after_close = &after_bracket[close_bracket + 1..];
    if !after_close.starts_with('(') {
        return None;
    }
    let url_len = after_close[1..].find(')')?;
    if url_len == 0 {
        return None;
    }

    Some((text, close_bracket + 2 + url_len + 1))
}

fn strip_images(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("![") {
        match parse_bracket_target(&rest[start + 2..], true) {
            Some((alt, consumed)) => {
                output.push_str(&rest[..start]);
                output.push_str(alt);
                rest = &rest[start + 2 + consumed..];
            }
            None => {
                output.push_str(&rest[..start + 1]);
                rest = &rest[start + 1..];
            }
        }
    }

    output.push_str(rest);
    output
}

fn strip_links(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('[') {
        match parse_bracket_target(&rest[start + 1..], false) {
            Some((text, consumed)) => {
                output.push_str(&rest[..start]);
                output.push_str(text);
                rest = &rest[start + 1 + consumed..];
            }
            None => {
                output.push_str(&rest[..start + 1]);
                rest = &rest[start + 1..];
            }
        }
    }

    output.push_str(rest);
    output
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_sentence(cleaned: &str) -> &str {
    for (idx, ch) in cleaned.char_indices() {
        if matches!(ch, '.' | '!' | '?') {
            let after = idx + ch.len_utf8();
            if after >= cleaned.len() || cleaned[after..].starts_with(char::is_whitespace) {
                return &cleaned[..after];
            }
        }
    }
    cleaned
}
