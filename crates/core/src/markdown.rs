//! Clean-up of generated slide markup.

/// Strip code-fence markers a language model may wrap its answer in.
///
/// Looks for the first and the last line starting with three backticks. If
/// both exist and are distinct lines, only the lines strictly between them
/// are kept. Otherwise the text is returned unchanged.
pub fn strip_code_fences(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();

    let mut first = None;
    let mut last = None;
    for (i, line) in lines.iter().enumerate() {
        if line.starts_with("```") {
            first.get_or_insert(i);
            last = Some(i);
        }
    }

    match (first, last) {
        (Some(start), Some(end)) if end > start => lines[start + 1..end].join("\n"),
        _ => text.to_string(),
    }
}
