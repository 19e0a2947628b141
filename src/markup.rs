//! Markup escaping and description rendering

/// Escape text for inclusion in XML/HTML content or attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// List item marker at the start of a description line
fn list_item(line: &str) -> Option<&str> {
    ["* ", "- ", "+ "]
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
        .map(str::trim)
}

/// Render description lines as markup
///
/// Blank lines separate paragraphs. Runs of lines starting with `* `, `- `
/// or `+ ` become a `<ul>` list; other lines in a paragraph are joined with
/// spaces into a `<p>`.
pub fn description_markup(lines: &[String]) -> String {
    let mut blocks: Vec<String> = Vec::new();
    let mut para: Vec<&str> = Vec::new();
    let mut items: Vec<&str> = Vec::new();

    fn flush_para(para: &mut Vec<&str>, blocks: &mut Vec<String>) {
        if !para.is_empty() {
            blocks.push(format!("<p>{}</p>", escape(&para.join(" "))));
            para.clear();
        }
    }

    fn flush_list(items: &mut Vec<&str>, blocks: &mut Vec<String>) {
        if !items.is_empty() {
            let mut s = String::from("<ul>\n");
            for item in items.iter() {
                s.push_str(&format!("    <li>{}</li>\n", escape(item)));
            }
            s.push_str("</ul>");
            blocks.push(s);
            items.clear();
        }
    }

    for line in lines.iter().map(|l| l.trim()) {
        if line.is_empty() {
            flush_para(&mut para, &mut blocks);
            flush_list(&mut items, &mut blocks);
        } else if let Some(item) = list_item(line) {
            flush_para(&mut para, &mut blocks);
            items.push(item);
        } else {
            flush_list(&mut items, &mut blocks);
            para.push(line);
        }
    }

    flush_para(&mut para, &mut blocks);
    flush_list(&mut items, &mut blocks);
    blocks.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("a & b"), "a &amp; b");
        assert_eq!(escape("<x y=\"1\">"), "&lt;x y=&quot;1&quot;&gt;");
        assert_eq!(escape("it's"), "it&apos;s");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_description_paragraphs() {
        let lines: Vec<String> = ["First line", "continues", "", "Second & last"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            description_markup(&lines),
            "<p>First line continues</p>\n<p>Second &amp; last</p>"
        );
    }

    #[test]
    fn test_description_list() {
        let lines: Vec<String> = ["Features:", "* One", "- Two"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            description_markup(&lines),
            "<p>Features:</p>\n<ul>\n    <li>One</li>\n    <li>Two</li>\n</ul>"
        );
    }

    #[test]
    fn test_description_empty() {
        assert_eq!(description_markup(&[]), "");
    }
}
