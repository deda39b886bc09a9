//! Path and identifier normalization for generated build files.
//!
//! Paths in build descriptions are relative to the directory holding the
//! context's `*.cbuild.yml`. Generated CMake files reference them through
//! `${SOLUTION_ROOT}` so the output stays relocatable.

use std::sync::LazyLock;

use regex::Regex;

/// Variable holding the solution root in generated CMake files.
pub const SOLUTION_ROOT: &str = "${SOLUTION_ROOT}";

static DELIMITERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"::|:|&|@>=|@|\.|/|\(|\)| ").expect("valid delimiter pattern"));

static RELATIVE_OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\./.*|\.\./.*").expect("valid relative path pattern"));

/// Lexically clean a slash-separated path (no filesystem access).
///
/// Collapses `.` segments, duplicate slashes and `name/..` pairs. Leading
/// `..` segments of relative paths are kept. An empty result is `.`.
pub fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Parent directory of a slash-separated path, `.` when there is none.
pub fn parent_dir(path: &str) -> String {
    let cleaned = clean_path(path);
    match cleaned.rfind('/') {
        Some(0) => "/".to_string(),
        Some(index) => cleaned[..index].to_string(),
        None => ".".to_string(),
    }
}

/// Whether a path is absolute on any supported host (`/x` or `C:/x`).
pub fn is_absolute(path: &str) -> bool {
    let bytes = path.as_bytes();
    path.starts_with('/')
        || (bytes.len() >= 3
            && bytes[0].is_ascii_alphabetic()
            && bytes[1] == b':'
            && (bytes[2] == b'/' || bytes[2] == b'\\'))
}

/// Prefix a description path with `${SOLUTION_ROOT}/<base>`.
///
/// Paths already starting with a CMake variable reference (`${...}`) and
/// absolute paths are returned unchanged.
pub fn add_root_prefix(base: &str, input: &str) -> String {
    let input = input.replace('\\', "/");
    if input.starts_with("${") || is_absolute(&input) {
        return input;
    }

    let joined = if base.is_empty() {
        clean_path(&input)
    } else {
        clean_path(&format!("{}/{}", base, input))
    };

    if joined == "." {
        SOLUTION_ROOT.to_string()
    } else {
        format!("{}/{}", SOLUTION_ROOT, joined)
    }
}

/// [`add_root_prefix`] applied to every element.
pub fn add_root_prefixes(base: &str, inputs: &[String]) -> Vec<String> {
    inputs.iter().map(|input| add_root_prefix(base, input)).collect()
}

/// Rewrite the first `./` or `../` path embedded in a tool option.
///
/// `-map=./out/file.map` becomes `-map=${SOLUTION_ROOT}/<base>/out/file.map`.
pub fn adjust_relative_path(base: &str, option: &str) -> String {
    match RELATIVE_OPTION.find(option) {
        Some(found) => {
            let prefixed = add_root_prefix(base, found.as_str());
            format!("{}{}", &option[..found.start()], prefixed)
        }
        None => option.to_string(),
    }
}

/// Turn a component or group identifier into a valid CMake target name.
pub fn replace_delimiters(identifier: &str) -> String {
    DELIMITERS.replace_all(identifier, "_").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_delimiters() {
        assert_eq!(
            replace_delimiters("Cvendor&Cbundle::Cclass:Cgroup&Cvariant@Cversion"),
            "Cvendor_Cbundle_Cclass_Cgroup_Cvariant_Cversion"
        );
        assert_eq!(replace_delimiters("ARM::CMSIS.CORE A"), "ARM_CMSIS_CORE_A");
        assert_eq!(replace_delimiters("AC6@>=6.16.0"), "AC6_6_16_0");
        assert_eq!(replace_delimiters("path/with spaces"), "path_with_spaces");
        assert_eq!(replace_delimiters("Handlers (GCC)"), "Handlers__GCC_");
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path("./headers/header.h"), "headers/header.h");
        assert_eq!(clean_path("a//b/./c/.."), "a/b");
        assert_eq!(clean_path("../x/../../y"), "../../y");
        assert_eq!(clean_path("/a/../../b"), "/b");
        assert_eq!(clean_path("./"), ".");
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir("./headers/header.h"), "headers");
        assert_eq!(parent_dir("header.h"), ".");
        assert_eq!(parent_dir("/header.h"), "/");
    }

    #[test]
    fn test_add_root_prefixes() {
        let inputs = vec![
            "relative/path".to_string(),
            "../solution/path".to_string(),
            "${CMSIS_PACK_ROOT}/Pack/Name/0.0.0".to_string(),
            "/absolute/path".to_string(),
            "C:\\absolute\\win".to_string(),
        ];
        assert_eq!(
            add_root_prefixes("project", &inputs),
            vec![
                "${SOLUTION_ROOT}/project/relative/path",
                "${SOLUTION_ROOT}/solution/path",
                "${CMSIS_PACK_ROOT}/Pack/Name/0.0.0",
                "/absolute/path",
                "C:/absolute/win",
            ]
        );
        assert_eq!(add_root_prefix("", "."), "${SOLUTION_ROOT}");
    }

    #[test]
    fn test_adjust_relative_path() {
        assert_eq!(
            adjust_relative_path("./context/folder", "-map=./out/file.map"),
            "-map=${SOLUTION_ROOT}/context/folder/out/file.map"
        );
        assert_eq!(
            adjust_relative_path("./context/folder", "-map=../../out/file.map"),
            "-map=${SOLUTION_ROOT}/out/file.map"
        );
        assert_eq!(
            adjust_relative_path("./context/folder", "-map=${SOLUTION_ROOT}/out/file.map"),
            "-map=${SOLUTION_ROOT}/out/file.map"
        );
        assert_eq!(adjust_relative_path("ctx", "-O2"), "-O2");
    }
}
