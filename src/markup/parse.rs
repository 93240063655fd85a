//! Tolerant HTML fragment parser.
//!
//! DESIGN
//! ======
//! Single forward pass over the input with an explicit stack of open
//! elements. Every input produces a node sequence. Unknown constructs
//! degrade to text and stray close tags are dropped. Elements still open at
//! end of input are closed implicitly. This follows the browser fragment
//! algorithm closely enough for template output, without its insertion
//! modes or adoption-agency repairs.

use super::node::{Element, Node, RAW_TEXT_ELEMENTS, VOID_ELEMENTS};

/// Longest character reference name accepted, `#x10FFFF` included.
const MAX_REFERENCE_LEN: usize = 10;

/// Parse a markup fragment into sibling nodes. Never fails.
#[must_use]
pub fn parse_fragment(input: &str) -> Vec<Node> {
    let mut parser = Parser { input, pos: 0, stack: Vec::new(), roots: Vec::new() };
    parser.run();
    parser.pop_to(0);
    parser.roots
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    stack: Vec<Element>,
    roots: Vec<Node>,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn run(&mut self) {
        while self.pos < self.input.len() {
            let rest = self.rest();
            if rest.starts_with("<!--") {
                self.comment();
            } else if rest.starts_with("</") && starts_with_alpha(&rest[2..]) {
                self.close_tag();
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                self.skip_declaration();
            } else if rest.starts_with('<') && starts_with_alpha(&rest[1..]) {
                self.open_tag();
            } else {
                self.text();
            }
        }
    }

    // =========================================================================
    // TREE BUILDING
    // =========================================================================

    fn append(&mut self, node: Node) {
        let children = match self.stack.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.roots,
        };
        if let Node::Text(text) = &node {
            if let Some(Node::Text(prev)) = children.last_mut() {
                prev.push_str(text);
                return;
            }
        }
        children.push(node);
    }

    /// Close every open element above `depth`, attaching each to its parent.
    fn pop_to(&mut self, depth: usize) {
        while self.stack.len() > depth {
            if let Some(el) = self.stack.pop() {
                self.append(Node::Element(el));
            }
        }
    }

    // =========================================================================
    // TOKENS
    // =========================================================================

    fn text(&mut self) {
        let rest = self.rest();
        // A '<' that reached here does not start a tag and is literal.
        let skip = usize::from(rest.starts_with('<'));
        let len = rest[skip..].find('<').map_or(rest.len(), |i| i + skip);
        let text = decode_entities(&rest[..len]);
        self.pos += len;
        self.append(Node::Text(text));
    }

    fn comment(&mut self) {
        let body = &self.rest()[4..];
        let (text, consumed) = match body.find("-->") {
            Some(end) => (&body[..end], 4 + end + 3),
            None => (body, 4 + body.len()),
        };
        let node = Node::Comment(text.to_owned());
        self.pos += consumed;
        self.append(node);
    }

    fn skip_declaration(&mut self) {
        self.pos = self.rest().find('>').map_or(self.input.len(), |i| self.pos + i + 1);
    }

    fn close_tag(&mut self) {
        let rest = &self.rest()[2..];
        let name_len = rest
            .find(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
            .unwrap_or(rest.len());
        let name = rest[..name_len].to_ascii_lowercase();
        self.pos = self.rest().find('>').map_or(self.input.len(), |i| self.pos + i + 1);

        if let Some(index) = self.stack.iter().rposition(|el| el.tag == name) {
            self.pop_to(index);
        }
    }

    fn open_tag(&mut self) {
        self.pos += 1;
        let name_len = self
            .rest()
            .find(|c: char| c.is_ascii_whitespace() || c == '/' || c == '>')
            .unwrap_or(self.rest().len());
        let mut el = Element::new(self.rest()[..name_len].to_ascii_lowercase());
        self.pos += name_len;

        let Some(self_closing) = self.attributes(&mut el) else {
            // End of input inside a tag drops the tag.
            self.pos = self.input.len();
            return;
        };

        if RAW_TEXT_ELEMENTS.contains(&el.tag.as_str()) {
            let content = self.raw_text(&el.tag);
            if !content.is_empty() {
                el.children.push(Node::Text(content));
            }
            self.append(Node::Element(el));
        } else if self_closing || VOID_ELEMENTS.contains(&el.tag.as_str()) {
            self.append(Node::Element(el));
        } else {
            self.stack.push(el);
        }
    }

    /// Read attributes up to the end of the tag. Returns `Some(self_closing)`
    /// once `>` is consumed, `None` if input ran out first.
    fn attributes(&mut self, el: &mut Element) -> Option<bool> {
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                return None;
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                return Some(true);
            }
            if rest.starts_with('>') {
                self.pos += 1;
                return Some(false);
            }
            if rest.starts_with('/') || rest.starts_with('=') {
                self.pos += 1;
                continue;
            }

            let name_len = rest
                .find(|c: char| c.is_ascii_whitespace() || matches!(c, '/' | '>' | '='))
                .unwrap_or(rest.len());
            let name = rest[..name_len].to_ascii_lowercase();
            self.pos += name_len;

            self.skip_whitespace();
            let value = if self.rest().starts_with('=') {
                self.pos += 1;
                self.skip_whitespace();
                self.attribute_value()?
            } else {
                String::new()
            };

            if el.attr(&name).is_none() {
                el.attrs.push((name, value));
            }
        }
    }

    fn attribute_value(&mut self) -> Option<String> {
        let rest = self.rest();
        let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'');
        if let Some(quote) = quote {
            let body = &rest[1..];
            let end = body.find(quote)?;
            let value = decode_entities(&body[..end]);
            self.pos += end + 2;
            Some(value)
        } else {
            let len = rest
                .find(|c: char| c.is_ascii_whitespace() || c == '>')
                .unwrap_or(rest.len());
            let value = decode_entities(&rest[..len]);
            self.pos += len;
            Some(value)
        }
    }

    /// Consume raw text up to and including `</tag ...>`.
    fn raw_text(&mut self, tag: &str) -> String {
        let rest = self.rest();
        let needle = format!("</{tag}");
        let Some(end) = rest.to_ascii_lowercase().find(&needle) else {
            self.pos = self.input.len();
            return rest.to_owned();
        };
        let after = &rest[end..];
        let consumed = end + after.find('>').map_or(after.len(), |i| i + 1);
        self.pos += consumed;
        rest[..end].to_owned()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_whitespace()).len();
    }
}

fn starts_with_alpha(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_alphabetic())
}

// =============================================================================
// CHARACTER REFERENCES
// =============================================================================

/// Decode character references; unknown references stay literal.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        if let Some((ch, used)) = decode_reference(rest) {
            out.push(ch);
            rest = &rest[used..];
        } else {
            out.push('&');
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Decode one reference at the start of `s` (which begins with `&`).
/// Returns the character and the number of bytes consumed.
fn decode_reference(s: &str) -> Option<(char, usize)> {
    let end = s[1..].find(';')?;
    if end == 0 || end > MAX_REFERENCE_LEN {
        return None;
    }
    let name = &s[1..=end];

    let ch = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        numeric_reference(u32::from_str_radix(hex, 16).ok()?)
    } else if let Some(dec) = name.strip_prefix('#') {
        if !dec.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        numeric_reference(dec.parse::<u32>().ok()?)
    } else {
        match name {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            "nbsp" => '\u{a0}',
            _ => return None,
        }
    };

    Some((ch, end + 2))
}

fn numeric_reference(code: u32) -> char {
    match code {
        0 => char::REPLACEMENT_CHARACTER,
        _ => char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER),
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
