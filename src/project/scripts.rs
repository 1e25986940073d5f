//! Commands declared in MSBuild `Exec` tasks.
//!
//! Project files are scanned as text: any `<Exec Command="...">` element
//! counts, wherever it sits in the file.

use regex::Regex;
use std::sync::LazyLock;

static EXEC_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<Exec\b[^>]*?\bCommand\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("EXEC_COMMAND must compile")
});

/// All `Exec` command lines in a project file, in document order.
pub fn exec_commands(content: &str) -> Vec<String> {
    EXEC_COMMAND
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

/// The tool each `Exec` command invokes (its first word).
pub fn invoked_tools(content: &str) -> Vec<String> {
    exec_commands(content)
        .iter()
        .filter_map(|cmd| cmd.split_whitespace().next().map(String::from))
        .collect()
}
