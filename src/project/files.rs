//! Project file discovery.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Extensions of MSBuild project files.
pub const PROJECT_EXTENSIONS: &[&str] = &["csproj", "fsproj", "vbproj"];

/// Suffix of the runtime configuration written by `dotnet publish`.
pub const RUNTIME_CONFIG_SUFFIX: &str = ".runtimeconfig.json";

/// Directories never searched for project files.
const SKIPPED_DIRS: &[&str] = &[".cloudfoundry", "node_modules"];

/// Root-level files ending in `.runtimeconfig.json`.
pub fn runtime_config_files(project_root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(project_root)? {
        let entry = entry?;
        let name = entry.file_name();
        if entry.file_type()?.is_file() && name.to_string_lossy().ends_with(RUNTIME_CONFIG_SUFFIX)
        {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

/// Whether a path has a project file extension.
pub fn is_project_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| PROJECT_EXTENSIONS.contains(&e))
}

/// All project files below `project_root`, sorted.
///
/// Hidden directories, `.cloudfoundry` and `node_modules` are not searched.
pub fn project_files(project_root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    walk(project_root, &mut found)?;
    found.sort();
    Ok(found)
}

fn walk(dir: &Path, found: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref()) {
                continue;
            }
            walk(&path, found)?;
        } else if file_type.is_file() && is_project_file(&path) {
            found.push(path);
        }
    }
    Ok(())
}
