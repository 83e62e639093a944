use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// Weekly data files look like `data_week_12.csv`: literal prefix, one or
/// more digits, literal extension. Case-sensitive, anchored.
static WEEK_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^data_week_[0-9]+\.csv$").expect("pattern is valid"));

/// Returns true if the path's base name is a weekly data file.
pub fn is_week_data_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| WEEK_FILE.is_match(name))
}
