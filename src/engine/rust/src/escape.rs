/* src/engine/rust/src/escape.rs */

/// Escape text for HTML element content and double-quoted attribute values.
pub fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for ch in s.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(ch),
    }
  }
  out
}

/// Decode the entities `escape_html` produces, plus numeric references.
/// Unknown entities are kept verbatim.
pub fn unescape_html(s: &str) -> String {
  if !s.contains('&') {
    return s.to_string();
  }
  let mut out = String::with_capacity(s.len());
  let mut rest = s;
  while let Some(amp) = rest.find('&') {
    out.push_str(&rest[..amp]);
    rest = &rest[amp..];
    let Some(semi) = rest.find(';') else { break };
    let entity = &rest[1..semi];
    let decoded = match entity {
      "amp" => Some('&'),
      "lt" => Some('<'),
      "gt" => Some('>'),
      "quot" => Some('"'),
      "apos" => Some('\''),
      _ => decode_numeric(entity),
    };
    match decoded {
      Some(ch) => {
        out.push(ch);
        rest = &rest[semi + 1..];
      }
      None => {
        out.push('&');
        rest = &rest[1..];
      }
    }
  }
  out.push_str(rest);
  out
}

fn decode_numeric(entity: &str) -> Option<char> {
  let digits = entity.strip_prefix('#')?;
  let code = match digits.strip_prefix(['x', 'X']) {
    Some(hex) => u32::from_str_radix(hex, 16).ok()?,
    None => digits.parse::<u32>().ok()?,
  };
  char::from_u32(code)
}

/// Make serialized JSON safe to place verbatim inside a `<script>` element.
///
/// Walks the JSON text tracking whether the current position is inside a
/// JSON string (handling `\"` and `\\` correctly). Inside strings, `<`, `>`
/// and `&` become `\u003c`, `\u003e` and `\u0026`, so neither `</script>` nor
/// `<!--` can appear in the output; U+2028 and U+2029 are escaped as well.
/// With `ascii_only`, every other non-ASCII codepoint is replaced with its
/// `\uXXXX` form, using surrogate pairs outside the BMP.
pub fn escape_script_json(json: &str, ascii_only: bool) -> String {
  let mut out = String::with_capacity(json.len());
  let mut in_string = false;
  let mut chars = json.chars();

  while let Some(ch) = chars.next() {
    if !in_string {
      if ch == '"' {
        in_string = true;
      }
      out.push(ch);
      continue;
    }
    match ch {
      '\\' => {
        // Escaped character inside string -- push both and skip next
        out.push(ch);
        if let Some(next) = chars.next() {
          out.push(next);
        }
      }
      '"' => {
        in_string = false;
        out.push(ch);
      }
      '<' | '>' | '&' | '\u{2028}' | '\u{2029}' => push_unicode_escape(&mut out, ch),
      _ if ascii_only && !ch.is_ascii() => push_unicode_escape(&mut out, ch),
      _ => out.push(ch),
    }
  }
  out
}

fn push_unicode_escape(out: &mut String, ch: char) {
  let code = ch as u32;
  if code > 0xFFFF {
    let adjusted = code - 0x1_0000;
    let hi = (adjusted >> 10) + 0xD800;
    let lo = (adjusted & 0x3FF) + 0xDC00;
    out.push_str(&format!("\\u{hi:04x}\\u{lo:04x}"));
  } else {
    out.push_str(&format!("\\u{code:04x}"));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn html_escape_covers_markup_chars() {
    assert_eq!(escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#), {
      "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
    });
  }

  #[test]
  fn unescape_reverses_escape() {
    let raw = r#"<b>"fish" & 'chips'</b>"#;
    assert_eq!(unescape_html(&escape_html(raw)), raw);
  }

  #[test]
  fn unescape_numeric_and_unknown() {
    assert_eq!(unescape_html("&#65;&#x42;&copy;"), "AB&copy;");
    assert_eq!(unescape_html("a & b"), "a & b");
    assert_eq!(unescape_html("trailing &amp"), "trailing &amp");
  }

  #[test]
  fn script_close_tag_neutralized() {
    let input = r#"{"title":"</script><script>alert(1)</script>"}"#;
    let escaped = escape_script_json(input, false);
    assert!(!escaped.contains("</script"));
    assert!(!escaped.contains('<'));
    let back: serde_json::Value = serde_json::from_str(&escaped).unwrap();
    assert_eq!(back["title"], "</script><script>alert(1)</script>");
  }

  #[test]
  fn comment_opener_and_ampersand_neutralized() {
    let escaped = escape_script_json(r#"{"a":"<!-- x && y -->"}"#, false);
    assert_eq!(escaped, r#"{"a":"\u003c!-- x \u0026\u0026 y --\u003e"}"#);
  }

  #[test]
  fn line_separators_escaped() {
    let escaped = escape_script_json("{\"a\":\"x\u{2028}y\u{2029}\"}", false);
    assert_eq!(escaped, r#"{"a":"x\u2028y\u2029"}"#);
  }

  #[test]
  fn ascii_passthrough() {
    let input = r#"{"key":"hello","n":[1,2.5,true,null]}"#;
    assert_eq!(escape_script_json(input, true), input);
  }

  #[test]
  fn preserves_existing_escapes() {
    let input = r#"{"a":"line\nbreak","b":"say \"hi\"","c":"back\\slash"}"#;
    assert_eq!(escape_script_json(input, false), input);
  }

  #[test]
  fn non_ascii_kept_unless_ascii_only() {
    let input = r#"{"msg":"café"}"#;
    assert_eq!(escape_script_json(input, false), input);
    assert_eq!(escape_script_json(input, true), r#"{"msg":"caf\u00e9"}"#);
  }

  #[test]
  fn surrogate_pair_for_emoji() {
    // U+1F600 (grinning face) -> \uD83D\uDE00
    let input = "{\"emoji\":\"\u{1F600}\"}";
    assert_eq!(escape_script_json(input, true), r#"{"emoji":"\ud83d\ude00"}"#);
  }
}
