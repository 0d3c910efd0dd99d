//! Launcher config naming.
//!
//! Affected native launchers look up `<name up to the first dot>.cfg`, while the
//! toolchain writes `<full name>.cfg`. Configs live in an `app` directory under
//! each launcher's image, so they are located by that parent name.

use std::path::{Path, PathBuf};

/// Directory holding launcher configs inside an application image.
pub const CONFIG_DIR: &str = "app";

/// Config file extension.
pub const CONFIG_EXTENSION: &str = "cfg";

/// Name the launcher will actually look for, or `None` if `name` needs no rename.
pub fn truncated_name(name: &str) -> Option<&str> {
    let (head, _) = name.rsplit_once('.')?;
    (!head.is_empty()).then_some(head)
}

/// Every `<name>.cfg` sitting directly inside an `app` directory.
pub fn find_configs<'a>(files: &'a [PathBuf], name: &'a str) -> impl Iterator<Item = &'a Path> + 'a {
    let file_name = format!("{name}.{CONFIG_EXTENSION}");
    files
        .iter()
        .filter(move |path| {
            path.file_name().is_some_and(|f| f == file_name.as_str())
                && path
                    .parent()
                    .and_then(Path::file_name)
                    .is_some_and(|d| d == CONFIG_DIR)
        })
        .map(PathBuf::as_path)
}

/// Path the config at `path` should be renamed to.
pub fn renamed_path(path: &Path, truncated: &str) -> PathBuf {
    path.with_file_name(format!("{truncated}.{CONFIG_EXTENSION}"))
}
