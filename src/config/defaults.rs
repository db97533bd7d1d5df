//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [site] Section Defaults
// ============================================================================

pub mod site {
    pub fn title() -> String {
        "My Site".into()
    }

    pub fn author() -> String {
        "<YOUR_NAME>".into()
    }

    pub fn language() -> String {
        "en".into()
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn content() -> PathBuf {
        "posts".into()
    }

    pub fn pages() -> PathBuf {
        "pages".into()
    }

    pub fn public() -> PathBuf {
        "public".into()
    }

    pub fn output() -> PathBuf {
        "dist".into()
    }

    pub fn extra_files() -> Vec<PathBuf> {
        vec!["favicon.ico".into(), "CNAME".into()]
    }

    pub mod sass {
        use std::path::PathBuf;

        pub fn command() -> Vec<String> {
            vec!["sass".into()]
        }

        pub fn input() -> PathBuf {
            "src/style.scss".into()
        }

        pub fn output() -> PathBuf {
            "public/style.css".into()
        }
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    use super::super::StaticRoot;
    use std::path::PathBuf;

    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        8181
    }

    pub fn reload_port() -> u16 {
        8182
    }

    pub fn watch() -> Vec<PathBuf> {
        ["public", "posts", "pages", "data"]
            .into_iter()
            .map(PathBuf::from)
            .collect()
    }

    pub fn static_roots() -> Vec<StaticRoot> {
        vec![
            StaticRoot {
                prefix: "/public/".into(),
                dir: "public".into(),
            },
            StaticRoot {
                prefix: "/src/".into(),
                dir: "src".into(),
            },
        ]
    }
}
