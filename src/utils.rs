//! Utility functions for path normalization

use std::path::PathBuf;

/// Expand a user-supplied path, resolving `~` and environment variables
///
/// Expansion follows shell conventions:
/// - A leading `~` or `~/` is replaced with `$HOME`
/// - `$NAME` and `${NAME}` are replaced with the variable's value
///
/// Variables that are not set are left untouched, as is `~` when `HOME` is not set.
///
/// # Examples
///
/// ```
/// use ytsub_dl::utils::expand_path;
/// use std::path::PathBuf;
///
/// assert_eq!(expand_path("/srv/videos"), PathBuf::from("/srv/videos"));
/// ```
pub fn expand_path(input: &str) -> PathBuf {
    expand_path_with(input, |name| std::env::var(name).ok())
}

/// Expand a path with an explicit variable lookup
///
/// Same rules as [`expand_path`], but variables (including `HOME`) are resolved
/// through `lookup` instead of the process environment.
pub fn expand_path_with<F>(input: &str, lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    let with_home = expand_home(input, &lookup);
    PathBuf::from(expand_vars(&with_home, &lookup))
}

fn expand_home<F>(input: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let Some(rest) = input.strip_prefix('~') else {
        return input.to_string();
    };

    // `~user` forms are not supported
    if !(rest.is_empty() || rest.starts_with('/')) {
        return input.to_string();
    }

    match lookup("HOME") {
        Some(home) => format!("{}{}", home.trim_end_matches('/'), rest),
        None => input.to_string(),
    }
}

fn expand_vars<F>(input: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            }
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], end)
        };

        match (name.is_empty(), lookup(name)) {
            (false, Some(value)) => out.push_str(&value),
            _ => {
                // Unknown or malformed reference: keep it verbatim
                out.push('$');
                out.push_str(&after[..consumed]);
            }
        }
        rest = &after[consumed..];
    }

    out.push_str(rest);
    out
}
