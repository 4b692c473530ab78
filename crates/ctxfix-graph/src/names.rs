//! Short names derived from analysis node strings
//!
//! Whole-program analyses name functions the way `go/ssa` prints them:
//!
//! - `example.com/app/server.Start`
//! - `(*example.com/app/server.Server).Run`
//! - `example.com/app/server.Start$1` for the first closure inside `Start`
//!
//! The short form keeps the last path segment only, drops closure suffixes
//! (a closure's calls belong to the function that encloses it) and writes
//! methods as `Receiver@Method`. Type arguments of generic functions and
//! receivers (`(*p.Server[T]).Run`, `p.Map[int]`) are dropped, since
//! declarations are keyed by their base name.

use crate::GraphError;

/// Split an analysis node string into `(package, name)`
pub fn short_name(node: &str) -> Result<(String, String), GraphError> {
    let bare = strip_type_args(node);
    let last = bare.rsplit('/').next().unwrap_or(bare.as_str());
    let last = last.split('$').next().unwrap_or(last);
    let last = last.trim_start_matches(['(', '*']).replace(").", "@");

    match last.split_once('.') {
        Some((package, name)) if !package.is_empty() && !name.is_empty() => {
            Ok((package.to_string(), name.to_string()))
        }
        _ => Err(GraphError::UnqualifiedName {
            name: node.to_string(),
        }),
    }
}

/// The function name of `node` when its package path is known.
///
/// Unlike [`short_name`] this copes with package paths whose last segment
/// contains dots, such as a module rooted at `example.com`.
pub fn short_name_in(node: &str, package_path: &str) -> Option<String> {
    if package_path.is_empty() {
        return None;
    }
    let bare = strip_type_args(node);
    let inner = bare.trim_start_matches(['(', '*']);
    let rest = inner.strip_prefix(package_path)?.strip_prefix('.')?;
    let rest = rest.split('$').next().unwrap_or(rest);
    Some(rest.replace(").", "@"))
}

/// Remove bracketed type argument lists, which may nest and contain paths
fn strip_type_args(node: &str) -> String {
    let mut out = String::with_capacity(node.len());
    let mut depth = 0usize;
    for c in node.chars() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// The analysis node string for a function in `package_path`
pub fn node_name(package_path: &str, receiver: Option<(&str, bool)>, name: &str) -> String {
    match receiver {
        Some((ty, true)) => format!("(*{}.{}).{}", package_path, ty, name),
        Some((ty, false)) => format!("({}.{}).{}", package_path, ty, name),
        None => format!("{}.{}", package_path, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(node: &str) -> (String, String) {
        short_name(node).expect("qualified")
    }

    #[test]
    fn test_free_function() {
        assert_eq!(
            split("example.com/app/server.Start"),
            ("server".into(), "Start".into())
        );
        assert_eq!(split("main.main"), ("main".into(), "main".into()));
    }

    #[test]
    fn test_pointer_method() {
        assert_eq!(
            split("(*example.com/app/server.Server).Run"),
            ("server".into(), "Server@Run".into())
        );
    }

    #[test]
    fn test_value_method_without_path() {
        assert_eq!(split("(main.T).M"), ("main".into(), "T@M".into()));
    }

    #[test]
    fn test_closure_suffix_is_stripped() {
        assert_eq!(
            split("example.com/app/server.Start$1"),
            ("server".into(), "Start".into())
        );
        assert_eq!(
            split("(*example.com/app/server.Server).Run$2"),
            ("server".into(), "Server@Run".into())
        );
    }

    #[test]
    fn test_unqualified_is_rejected() {
        assert!(short_name("init").is_err());
    }

    #[test]
    fn test_known_package_path_with_dots() {
        assert_eq!(
            short_name_in("(*example.com.T).M$1", "example.com"),
            Some("T@M".to_string())
        );
        assert_eq!(short_name_in("other.F", "example.com"), None);
    }

    #[test]
    fn test_generic_type_arguments_are_dropped() {
        assert_eq!(
            short_name_in("(*example.com/p.Server[T]).Run", "example.com/p"),
            Some("Server@Run".to_string())
        );
        assert_eq!(
            split("(*example.com/p.Pair[example.com/q.K, map[string]int]).Get$1"),
            ("p".into(), "Pair@Get".into())
        );
        assert_eq!(split("example.com/p.Map[int]"), ("p".into(), "Map".into()));
    }

    #[test]
    fn test_node_name_round_trips_through_short_name() {
        let node = node_name("example.com/app/server", Some(("Server", true)), "Run");
        assert_eq!(node, "(*example.com/app/server.Server).Run");
        assert_eq!(split(&node), ("server".into(), "Server@Run".into()));
    }
}
