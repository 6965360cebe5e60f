/// Lead-ins the model tends to prepend to its answer.
pub const BOILERPLATE_PREFIXES: &[&str] = &[
    "Here is an expanded version of the message:",
    "Here's an expanded version:",
    "Here\u{2019}s an expanded version:",
];

/// Strips known boilerplate lead-ins from a completion and trims it.
///
/// Prefixes are matched case-insensitively at the start of the text and
/// removed repeatedly, so stacked lead-ins are removed too. When nothing is
/// left the original message is returned instead.
pub fn clean_response(raw: &str, original: &str) -> String {
    let mut text = raw.trim_start();

    while let Some(rest) = strip_boilerplate(text) {
        text = rest.trim_start();
    }

    let text = text.trim();
    if text.is_empty() {
        original.to_string()
    } else {
        text.to_string()
    }
}

fn strip_boilerplate(text: &str) -> Option<&str> {
    BOILERPLATE_PREFIXES.iter().find_map(|prefix| {
        text.get(..prefix.len())
            .filter(|head| head.eq_ignore_ascii_case(prefix))
            .map(|_| &text[prefix.len()..])
    })
}
