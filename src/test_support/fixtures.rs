//! Model file fixtures.

use std::path::{Path, PathBuf};

/// The date/time scenario as a TOML model file. Parses to the same program
/// as [`super::date_time_program`].
pub const DATE_TIME_MODEL: &str = r#"
[[types]]
name = "IDateTime"
kind = "interface"
shim = { kind = "instance", target = "System.DateTime" }

[[types.members]]
kind = "property"
name = "Year"
type = "int"

[[types.members]]
kind = "method"
name = "Subtract"
returns = "ITimeSpan"
params = [{ name = "value", type = "IDateTime", unwrap_to = "System.DateTime" }]

[[types.members]]
kind = "method"
name = "AddDays"
returns = "IDateTime"
params = [{ name = "value", type = "double" }]

[[types]]
name = "ITimeSpan"
kind = "interface"

[[types.members]]
kind = "property"
name = "TotalDays"
type = "double"

[[types.members]]
kind = "property"
name = "Days"
type = "int"

[[types]]
name = "IDateTimeFactory"
kind = "interface"
shim = { kind = "constructor-factory", target = "System.DateTime" }

[[types.members]]
kind = "method"
name = "Create"
returns = "IDateTime"
params = [{ name = "ticks", type = "long" }]

[[types]]
name = "System.DateTime"
kind = "struct"

[[types.members]]
kind = "constructor"
params = [{ name = "ticks", type = "long" }]

[[types.members]]
kind = "constructor"
params = [
    { name = "year", type = "int" },
    { name = "month", type = "int" },
    { name = "day", type = "int" },
]

[[types.members]]
kind = "property"
name = "Year"
type = "int"

[[types.members]]
kind = "method"
name = "Subtract"
returns = "System.TimeSpan"
params = [{ name = "value", type = "System.DateTime" }]

[[types.members]]
kind = "method"
name = "Subtract"
returns = "System.DateTime"
params = [{ name = "value", type = "System.TimeSpan" }]

[[types.members]]
kind = "method"
name = "AddDays"
returns = "System.DateTime"
params = [{ name = "value", type = "double" }]

[[types.members]]
kind = "property"
name = "Now"
type = "System.DateTime"
static = true

[[types]]
name = "System.TimeSpan"
kind = "struct"

[[types.members]]
kind = "property"
name = "TotalDays"
type = "double"

[[types.members]]
kind = "property"
name = "Days"
type = "int"

[[call_sites]]
interface = "IDateTime"
argument_type = "System.DateTime"
location = "Program.cs:12"
"#;

/// Write a model file below `dir`, returning its path.
pub fn write_model(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("create {}: {}", parent.display(), e));
    }
    std::fs::write(&path, contents).unwrap_or_else(|e| panic!("write {}: {}", path.display(), e));
    path
}
