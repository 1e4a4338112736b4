use std::collections::VecDeque;

/// Escapes raw newlines that appear inside JSON string literals.
pub fn remove_multiline(s: &str) -> String {
    let mut cleaned = String::with_capacity(s.len());
    let mut inside_string = false;
    let mut escaped = false;

    for c in s.chars() {
        match c {
            '"' if !escaped => {
                inside_string = !inside_string;
                cleaned.push(c);
            }
            '\\' if inside_string => {
                escaped = !escaped;
                cleaned.push(c);
                continue;
            }
            '\n' if inside_string => cleaned.push_str("\\n"),
            _ => cleaned.push(c),
        }
        escaped = false;
    }

    cleaned
}

/// Removes commas directly followed by `}` or `]`.
pub fn remove_trailing_commas(s: &str) -> String {
    let mut cleaned = String::with_capacity(s.len());
    let mut chars = s.chars();
    let mut inside_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        match c {
            '"' if !escaped => inside_string = !inside_string,
            '\\' if inside_string => {
                escaped = !escaped;
                cleaned.push(c);
                continue;
            }
            ',' if !inside_string => {
                let next_non_ws = chars.clone().find(|c| !c.is_whitespace());
                if matches!(next_non_ws, Some('}') | Some(']')) {
                    continue;
                }
            }
            _ => {}
        }
        escaped = false;
        cleaned.push(c);
    }

    cleaned
}

/// Closes unterminated objects and arrays. Mismatched input is returned as-is.
pub fn balance_parenthesis(s: &str) -> String {
    let mut new_s = String::with_capacity(s.len());
    let mut stack: VecDeque<char> = VecDeque::new();
    let mut is_inside_string = false;
    let mut escaped = false;

    for c in s.chars() {
        match c {
            '"' if !escaped => is_inside_string = !is_inside_string,
            '{' if !is_inside_string => stack.push_back('}'),
            '[' if !is_inside_string => stack.push_back(']'),
            '}' | ']' if !is_inside_string => match stack.pop_back() {
                Some(expected) if expected == c => {}
                _ => return s.into(),
            },
            '\\' if is_inside_string => {
                escaped = !escaped;
                new_s.push(c);
                continue;
            }
            _ => {}
        }
        escaped = false;
        new_s.push(c);
    }

    if is_inside_string {
        new_s.push('"');
    }
    while let Some(c) = stack.pop_back() {
        new_s.push(c);
    }

    new_s
}
