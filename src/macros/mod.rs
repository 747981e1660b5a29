//! Named text fragments substituted wherever `macro{name}` appears in a command line.

use crate::error::{Error, Result};
use parking_lot::RwLock;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::info;

static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"macro\{(.*?)\}").expect("valid macro reference pattern"));

static DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^macro\s+(\w+)\s*=\s*(.+)$").expect("valid macro definition pattern")
});

#[derive(Default)]
pub struct MacroTable {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles `macro <name> = <value>`, returning the defined name.
    pub fn define_from_line(&self, line: &str) -> Result<String> {
        let line = line.trim();
        let caps = DEFINITION
            .captures(line)
            .ok_or_else(|| Error::InvalidMacroSyntax(line.to_string()))?;
        let name = caps[1].to_string();
        self.define(&name, caps[2].trim());
        Ok(name)
    }

    pub fn define(&self, name: &str, value: &str) {
        self.entries
            .write()
            .insert(name.to_string(), value.to_string());
        info!(name, "macro defined");
    }

    pub fn clear(&self) {
        self.entries.write().clear();
        info!("macros cleared");
    }

    /// Replaces every `macro{name}` with its current value in one pass. Replacement
    /// text is never rescanned, and unknown names are left exactly as written.
    pub fn expand(&self, src: &str) -> String {
        let entries = self.entries.read();
        REFERENCE
            .replace_all(src, |caps: &Captures| match entries.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Listing in the form shown by `show_macros`.
    pub fn render(&self) -> String {
        let mut out = String::from("Defined Macros:\n\n");
        for (name, value) in self.entries.read().iter() {
            out.push_str(&format!("macro{{{name}}} = {value}\n\n"));
        }
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_define() {
        let macros = MacroTable::new();
        assert_eq!(
            macros.define_from_line("macro db =  w::d::s ").unwrap(),
            "db"
        );
        assert_eq!(macros.expand("macro{db}::t"), "w::d::s::t");
        macros.define_from_line("macro db = other").unwrap();
        assert_eq!(macros.expand("macro{db}"), "other");
    }

    #[test]
    fn test_value_kept_verbatim() {
        let macros = MacroTable::new();
        macros.define_from_line("macro x = a;").unwrap();
        assert_eq!(macros.expand("macro{x}"), "a;");
        macros.define_from_line("macro y = ;").unwrap();
        assert_eq!(macros.expand("[macro{y}]"), "[;]");
    }

    #[test]
    fn test_invalid_definition() {
        let macros = MacroTable::new();
        for bad in ["macro = x", "macro a-b = x", "macro name x", "macro name ="] {
            assert!(
                matches!(macros.define_from_line(bad), Err(Error::InvalidMacroSyntax(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_expand() {
        let macros = MacroTable::new();
        macros.define("t", "w::d::s::people");
        macros.define("n", "1 + 2");
        assert_eq!(
            macros.expand("#>{macro{t}}#->filter(x | $x.id > macro{n})"),
            "#>{w::d::s::people}#->filter(x | $x.id > 1 + 2)"
        );
    }

    #[test]
    fn test_undefined_is_inert() {
        let macros = MacroTable::new();
        assert_eq!(macros.expand("a macro{z} b"), "a macro{z} b");
    }

    #[test]
    fn test_single_pass() {
        let macros = MacroTable::new();
        macros.define("x", "macro{y}");
        assert_eq!(macros.expand("macro{x}"), "macro{y}");
        macros.define("y", "deep");
        assert_eq!(macros.expand("macro{x}"), "macro{y}");
        assert_eq!(macros.expand("macro{x} macro{y}"), "macro{y} deep");
    }

    #[test]
    fn test_render_and_clear() {
        let macros = MacroTable::new();
        macros.define("b", "2");
        macros.define("a", "1");
        assert_eq!(
            macros.render(),
            "Defined Macros:\n\nmacro{a} = 1\n\nmacro{b} = 2\n\n"
        );
        macros.clear();
        assert_eq!(macros.render(), "Defined Macros:\n\n");
        assert_eq!(macros.expand("macro{a}"), "macro{a}");
    }
}
