#[cfg(test)]
pub mod test {
    use std::collections::HashMap;
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;

    use tempfile::TempDir;

    use crate::builder::EditorConfig;
    use crate::cache::CachedSections;
    use crate::error::EditorConfigError;
    use crate::file::MemorySource;
    use crate::types::{PropertyMap, PropertyValue};

    /// Root-level configuration shared by the tests below.
    pub const PROJECT: &str = "\
root = true

[*]
indent_style = space
indent_size = 2
end_of_line = lf
charset = utf-8
trim_trailing_whitespace = true
insert_final_newline = true

[*.md]
indent_size = 4
";

    /// A three-level tree under `/p`: the project root, a `lib` directory
    /// with its own overrides and a directory whose name is all glob
    /// metacharacters.
    pub fn tree() -> MemorySource {
        MemorySource::new()
            .with("/.editorconfig", "[*]\nouter = yes\n")
            .with("/p/.editorconfig", PROJECT)
            .with(
                "/p/lib/.editorconfig",
                "[*.json]\nindent_size = unset\n\n[!(package).json]\nquote_type = double\n",
            )
            .with("/p/#?*+@!()|[]{}/.editorconfig", "[*]\nfoo = null\n")
    }

    fn resolve(target: &str) -> PropertyMap {
        EditorConfig::builder().resolve_with(target, &tree()).unwrap()
    }

    #[test]
    fn output_never_has_unset_or_root() {
        for target in [
            "/p/a.js",
            "/p/README.md",
            "/p/lib/package.json",
            "/p/lib/x.json",
            "/p/#?*+@!()|[]{}/f.txt",
        ] {
            let props = resolve(target);
            assert!(!props.contains_key("root"), "{target}");
            assert!(
                props.values().all(|v| v != &PropertyValue::from("unset")),
                "{target}"
            );
        }
    }

    #[test]
    fn nothing_above_root_marker_is_read() {
        assert!(!resolve("/p/a.js").contains_key("outer"));
    }

    #[test]
    fn lone_indent_size_fills_tab_width() {
        let source = MemorySource::new().with("/q/.editorconfig", "[*]\nindent_size = 2\n");
        let props = EditorConfig::builder()
            .resolve_with("/q/f", &source)
            .unwrap();
        let mut expected = PropertyMap::new();
        expected.insert("indent_size".into(), PropertyValue::Number(2));
        expected.insert("tab_width".into(), PropertyValue::Number(2));
        assert_eq!(props, expected);
    }

    #[test]
    fn negated_extglob_relative_to_declaring_dir() {
        let foo = resolve("/p/lib/foo.json");
        assert_eq!(foo["quote_type"], PropertyValue::from("double"));
        assert!(!foo.contains_key("indent_size"));

        let package = resolve("/p/lib/package.json");
        assert!(!package.contains_key("quote_type"));
    }

    #[test]
    fn unset_cascades_across_files() {
        assert_eq!(resolve("/p/lib/a.js")["indent_size"], PropertyValue::Number(2));
        assert!(!resolve("/p/lib/a.json").contains_key("indent_size"));
    }

    #[test]
    fn metacharacter_directory_is_literal() {
        let props = resolve("/p/#?*+@!()|[]{}/f.txt");
        assert_eq!(props["foo"], PropertyValue::from("null"));
        assert_eq!(props["charset"], PropertyValue::from("utf-8"));
    }

    #[test]
    fn shared_cache_matches_uncached_and_skips_reparse() {
        let cache: Mutex<HashMap<String, CachedSections>> = Mutex::default();
        let source = tree();
        let targets = ["/p/lib/foo.json", "/p/README.md", "/p/#?*+@!()|[]{}/f"];

        for target in targets {
            let cached = EditorConfig::builder()
                .cache(&cache)
                .resolve_with(target, &source)
                .unwrap();
            assert_eq!(cached, resolve(target));
        }

        let unreachable = |_: &Path| -> Result<Option<Vec<u8>>, EditorConfigError> {
            panic!("warm cache must answer every lookup")
        };
        for target in targets {
            let warm = EditorConfig::builder()
                .cache(&cache)
                .resolve_with(target, &unreachable)
                .unwrap();
            assert_eq!(warm, resolve(target));
        }
    }

    #[test]
    fn filesystem_walk_honors_root_marker() {
        let dir = TempDir::new().unwrap();
        let outer = dir.path().join("outer");
        let inner = outer.join("inner");
        fs::create_dir_all(&inner).unwrap();
        fs::write(dir.path().join(".editorconfig"), "[*]\nleaked = yes\n").unwrap();
        fs::write(outer.join(".editorconfig"), PROJECT).unwrap();
        fs::write(inner.join(".editorconfig"), "[*.md]\nmax_line_length = off\n").unwrap();

        let props = EditorConfig::builder().resolve(inner.join("notes.md")).unwrap();
        assert_eq!(props["indent_size"], PropertyValue::Number(4));
        assert_eq!(props["max_line_length"], PropertyValue::from("off"));
        assert!(!props.contains_key("leaked"));
    }
}
